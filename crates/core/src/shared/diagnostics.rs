use super::constants::BODY_EXCERPT_CHARS;

/// Cross-cutting observer for the HTTP exchanges made by backend clients.
///
/// Injected into each client at construction so request logic never consults
/// process-wide flags. Implementations must never print a full credential;
/// use [`redact_secret`] for anything derived from one.
pub trait Diagnostics: Send + Sync {
    /// An outbound request is about to be sent.
    fn request(&self, method: &str, url: &str, body: Option<&str>);

    /// A response arrived, before any decoding.
    fn response(&self, url: &str, status: u16, body: &str);

    /// Free-form status line (selected backend, upload target, ...).
    fn info(&self, message: &str);
}

/// Silent diagnostics used unless the caller asks for verbose output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn request(&self, _method: &str, _url: &str, _body: Option<&str>) {}
    fn response(&self, _url: &str, _status: u16, _body: &str) {}
    fn info(&self, _message: &str) {}
}

/// Verbose diagnostics printed through `log::debug!`.
///
/// Bodies are cut to `max_body_chars` so a multi-megabyte response does not
/// flood the terminal.
#[derive(Debug)]
pub struct LogDiagnostics {
    max_body_chars: usize,
}

impl LogDiagnostics {
    pub fn new(max_body_chars: usize) -> Self {
        Self { max_body_chars }
    }
}

impl Default for LogDiagnostics {
    fn default() -> Self {
        Self::new(BODY_EXCERPT_CHARS)
    }
}

impl Diagnostics for LogDiagnostics {
    fn request(&self, method: &str, url: &str, body: Option<&str>) {
        match body {
            Some(body) => log::debug!(
                "-> {method} {url}\n{}",
                excerpt(body, self.max_body_chars)
            ),
            None => log::debug!("-> {method} {url}"),
        }
    }

    fn response(&self, url: &str, status: u16, body: &str) {
        log::debug!(
            "<- {status} {url}\n{}",
            excerpt(body, self.max_body_chars)
        );
    }

    fn info(&self, message: &str) {
        log::debug!("{message}");
    }
}

/// Records every event in memory for assertions on what a client sent.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingDiagnostics {
    events: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn push(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
impl Diagnostics for RecordingDiagnostics {
    fn request(&self, method: &str, url: &str, body: Option<&str>) {
        self.push(format!("request {method} {url} {}", body.unwrap_or("")));
    }

    fn response(&self, url: &str, status: u16, body: &str) {
        self.push(format!("response {status} {url} {body}"));
    }

    fn info(&self, message: &str) {
        self.push(format!("info {message}"));
    }
}

/// Shows only the first and last four characters of a secret.
///
/// Secrets of eight characters or fewer are fully masked.
pub fn redact_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Truncates `text` to at most `max_chars` characters on a char boundary.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}... [truncated]", &text[..cut]),
        None => text.to_string(),
    }
}
