pub mod chat_completion_client;
pub(crate) mod http_exchange;
pub mod llm_client;
pub mod provider_selector;
pub mod responses_client;
pub mod wire_codec;
