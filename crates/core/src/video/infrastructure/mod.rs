pub mod ffmpeg_duration_probe;
