pub mod duration_probe;
