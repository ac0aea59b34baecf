pub mod backend_config;
pub mod backend_error;
pub mod text_backend;
