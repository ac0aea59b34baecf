pub mod parse_clip_request_use_case;
pub mod transcribe_video_use_case;
