use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub waveform: WaveformConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct SurfaceConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

#[derive(Debug, Deserialize)]
pub struct WaveformConfig {
    #[serde(default = "default_bars")]
    pub bars: usize,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_codec")]
    pub codec: String,
    #[serde(default = "default_pix_fmt")]
    pub pix_fmt: String,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self { bars: default_bars() }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            crf: default_crf(),
            codec: default_codec(),
            pix_fmt: default_pix_fmt(),
        }
    }
}

pub fn default_width() -> u32 { 800 }
pub fn default_height() -> u32 { 300 }
pub fn default_bars() -> usize { 1200 }
pub fn default_fps() -> u32 { 60 }
pub fn default_crf() -> u32 { 18 }
pub fn default_codec() -> String { "libx264".into() }
pub fn default_pix_fmt() -> String { "yuv420p".into() }

/// Explicit path first, then `./annotator.toml`, then the user config dirs.
pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("annotator.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("annotator").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    dirs::config_dir()
        .map(|dir| dir.join("annotator").join("config.toml"))
        .filter(|platform| platform.exists())
}

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            log::debug!("Config parse error in {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_sections_take_defaults() {
        let cfg: Config = toml::from_str("[surface]\nwidth = 1024\n").unwrap();
        assert_eq!(cfg.surface.width, 1024);
        assert_eq!(cfg.surface.height, 300);
        assert_eq!(cfg.waveform.bars, 1200);
        assert_eq!(cfg.output.fps, 60);
        assert_eq!(cfg.output.pix_fmt, "yuv420p");
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[waveform]\nbars = 600\n\n[output]\ncodec = \"libx265\"").unwrap();
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.waveform.bars, 600);
        assert_eq!(cfg.output.codec, "libx265");
    }

    #[test]
    fn malformed_or_missing_file_yields_none() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[surface\nwidth = ").unwrap();
        assert!(load_config(file.path()).is_none());
        assert!(load_config(Path::new("/no/such/annotator.toml")).is_none());
    }

    #[test]
    fn explicit_path_wins() {
        let path = Path::new("/tmp/custom.toml");
        assert_eq!(discover(Some(path)), Some(path.to_path_buf()));
    }
}
