pub mod content_type;
pub mod media_backend;
pub mod remote_file;
pub mod transcript;
