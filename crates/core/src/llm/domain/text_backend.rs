use crate::shared::cancellation::CancellationToken;

use super::backend_config::ProviderKind;
use super::backend_error::BackendError;

/// Domain interface for "ask the model" over a synchronous-text backend.
///
/// Implementations perform exactly one network exchange per call, never
/// retry, and never return empty text on success.
pub trait TextBackend: Send + Sync {
    fn ask_text(
        &self,
        system_instruction: &str,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Result<String, BackendError>;

    fn kind(&self) -> ProviderKind;
}
