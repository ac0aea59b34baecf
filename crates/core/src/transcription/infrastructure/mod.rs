pub mod gemini_media_client;
