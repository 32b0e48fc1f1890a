pub mod frame;
pub mod paint;
pub mod picture;
pub mod scheduler;
pub mod waveform;
