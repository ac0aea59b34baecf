pub mod clip_time_range;
