use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "annotator", about = "Annotate audio waveforms and images, render frames, export notes")]
pub struct Cli {
    /// Audio file to annotate (WAV, MP3, FLAC, OGG)
    pub audio: Option<PathBuf>,

    /// Image file to annotate (PNG, JPEG, ...)
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Interaction script (JSON list of events) replayed after loading
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Add an audio annotation at surface x, in pixels. Repeatable.
    #[arg(long = "mark")]
    pub marks: Vec<f64>,

    /// Add an image annotation at X,Y in image pixels. Repeatable.
    #[arg(long = "pin", value_parser = parse_point)]
    pub pins: Vec<(f64, f64)>,

    /// Hover the pointer at surface x before drawing
    #[arg(long)]
    pub hover: Option<f64>,

    /// Start playback at this position (seconds) before the snapshot frame
    #[arg(long)]
    pub play_at: Option<f64>,

    /// Frames to run before the snapshot
    #[arg(long, default_value_t = 1)]
    pub frames: u64,

    /// Write the waveform surface as PNG
    #[arg(long)]
    pub frame: Option<PathBuf>,

    /// Write the image surface as PNG
    #[arg(long)]
    pub image_frame: Option<PathBuf>,

    /// Render the whole playback to a video file (needs ffmpeg)
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Directory for the JSON and Markdown exports
    #[arg(short, long)]
    pub export_dir: Option<PathBuf>,

    /// Waveform surface width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Waveform surface height in pixels
    #[arg(long, default_value_t = 300)]
    pub height: u32,

    /// Number of waveform bars
    #[arg(long, default_value_t = 1200)]
    pub bars: usize,

    /// Frames per second for playback rendering
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// H.264 CRF quality (0-51, lower = better). Ignored when --bitrate is set.
    #[arg(long, default_value_t = 18)]
    pub crf: u32,

    /// Video bitrate (e.g. 2400k, 5M). When set, uses -b:v instead of -crf.
    #[arg(short, long)]
    pub bitrate: Option<String>,

    /// FFmpeg video codec
    #[arg(long, default_value = "libx264")]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = "yuv420p")]
    pub pix_fmt: String,

    /// Config file (defaults to ./annotator.toml or the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("bad coordinate '{}': {}", v, e))
    };
    Ok((parse(x)?, parse(y)?))
}
