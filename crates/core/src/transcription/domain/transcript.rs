/// Transcript produced by one successful transcription run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptResult {
    pub text: String,
    pub language: Option<String>,
}

impl TranscriptResult {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_fields() {
        let t = TranscriptResult {
            text: "[00:00] Hello there".to_string(),
            language: Some("en".to_string()),
        };
        assert_eq!(t.text, "[00:00] Hello there");
        assert_eq!(t.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_word_count() {
        let t = TranscriptResult {
            text: "one two\nthree   four".to_string(),
            language: None,
        };
        assert_eq!(t.word_count(), 4);
    }
}
