use std::path::Path;

use crate::video::domain::duration_probe::DurationProbe;

/// Reads the container duration via ffmpeg-next (libavformat).
///
/// Falls back to the best video stream's duration when the container
/// does not carry one.
#[derive(Default)]
pub struct FfmpegDurationProbe;

impl FfmpegDurationProbe {
    pub fn new() -> Self {
        Self
    }
}

impl DurationProbe for FfmpegDurationProbe {
    fn duration_secs(&self, path: &Path) -> Result<f64, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let container = ictx.duration();
        if container > 0 {
            return Ok(container as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE));
        }

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;
        let seconds = stream.duration() as f64 * f64::from(stream.time_base());
        if seconds > 0.0 {
            Ok(seconds)
        } else {
            Err(format!("Could not determine duration of {}", path.display()).into())
        }
    }
}
