use serde::{Deserialize, Serialize};

/// Start and end of a requested clip as `HH:MM:SS` offsets into the video.
///
/// Either both timestamps are set and `error` is `None`, or `error` is set
/// and both timestamps are empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipTimeRange {
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClipTimeRange {
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_no_error() {
        let range = ClipTimeRange::new("00:00:00", "00:03:00");
        assert_eq!(range.start_time, "00:00:00");
        assert_eq!(range.end_time, "00:03:00");
        assert_eq!(range.error, None);
    }

    #[test]
    fn test_serializes_without_error_field_on_success() {
        let json = serde_json::to_string(&ClipTimeRange::new("00:00:00", "00:03:00")).unwrap();
        assert_eq!(json, r#"{"start_time":"00:00:00","end_time":"00:03:00"}"#);
    }
}
