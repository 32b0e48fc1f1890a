use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

#[derive(Debug, Clone)]
pub struct EncoderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: String,
    pub pix_fmt: String,
    pub crf: u32,
    pub bitrate: Option<String>,
}

/// Pipes raw RGBA frames into an ffmpeg child process. The output carries
/// video only.
pub struct FfmpegEncoder {
    child: Child,
    frame_bytes: usize,
    frames_written: u64,
}

impl FfmpegEncoder {
    pub fn new(output_path: &Path, settings: &EncoderSettings) -> Result<Self> {
        let args = build_args(output_path, settings);

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

        log::info!(
            "FFmpeg encoder started: {}x{} @ {}fps, codec={}",
            settings.width, settings.height, settings.fps, settings.codec
        );

        Ok(Self {
            child,
            frame_bytes: settings.width as usize * settings.height as usize * 4,
            frames_written: 0,
        })
    }

    pub fn write_frame(&mut self, rgba_pixels: &[u8]) -> Result<()> {
        if rgba_pixels.len() != self.frame_bytes {
            anyhow::bail!(
                "Frame is {} bytes, encoder expects {}",
                rgba_pixels.len(),
                self.frame_bytes
            );
        }
        let stdin = self.child.stdin.as_mut().context("FFmpeg stdin not available")?;
        stdin.write_all(rgba_pixels).context("Failed to write frame to ffmpeg")?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn finish(mut self) -> Result<()> {
        // EOF on stdin ends the stream
        drop(self.child.stdin.take());

        let output = self.child.wait_with_output().context("Failed to wait for ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("FFmpeg exited with error:\n{}", stderr);
        }

        log::info!("FFmpeg encoding complete ({} frames)", self.frames_written);
        Ok(())
    }
}

fn build_args(output_path: &Path, settings: &EncoderSettings) -> Vec<OsString> {
    let size = format!("{}x{}", settings.width, settings.height);
    let fps = settings.fps.to_string();
    let mut args = Vec::new();

    extend(&mut args, &["-y", "-loglevel", "error"]);
    extend(&mut args, &["-f", "rawvideo", "-pixel_format", "rgba"]);
    extend(&mut args, &["-video_size", size.as_str(), "-framerate", fps.as_str()]);
    extend(&mut args, &["-i", "pipe:0", "-an"]);
    extend(&mut args, &["-c:v", settings.codec.as_str(), "-pix_fmt", settings.pix_fmt.as_str()]);

    match &settings.bitrate {
        Some(br) => extend(&mut args, &["-b:v", br.as_str()]),
        None => {
            let crf = settings.crf.to_string();
            extend(&mut args, &["-crf", crf.as_str(), "-preset", "medium"]);
        }
    }

    args.push(output_path.as_os_str().to_os_string());
    args
}

fn extend(args: &mut Vec<OsString>, items: &[&str]) {
    args.extend(items.iter().map(|s| OsString::from(*s)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EncoderSettings {
        EncoderSettings {
            width: 800,
            height: 300,
            fps: 60,
            codec: "libx264".into(),
            pix_fmt: "yuv420p".into(),
            crf: 18,
            bitrate: None,
        }
    }

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    fn window(args: &[String], pair: [&str; 2]) -> bool {
        args.windows(2).any(|w| w[0] == pair[0] && w[1] == pair[1])
    }

    #[test]
    fn rawvideo_from_stdin_without_audio() {
        let args = strings(build_args(Path::new("out.mp4"), &settings()));
        assert!(window(&args, ["-video_size", "800x300"]));
        assert!(window(&args, ["-framerate", "60"]));
        assert!(window(&args, ["-i", "pipe:0"]));
        assert!(window(&args, ["-crf", "18"]));
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 1);
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"-c:a".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn bitrate_replaces_crf() {
        let mut s = settings();
        s.bitrate = Some("5M".into());
        let args = strings(build_args(Path::new("out.mp4"), &s));
        assert!(window(&args, ["-b:v", "5M"]));
        assert!(!args.contains(&"-crf".to_string()));
    }
}
