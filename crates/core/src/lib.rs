pub mod clip;
pub mod llm;
pub mod pipeline;
pub mod shared;
pub mod transcription;
pub mod video;
