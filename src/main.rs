mod audio;
mod cli;
mod config;
mod encode;
mod error;
mod export;
mod picture;
mod playback;
mod render;
mod script;
mod session;
mod studio;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::Cli;
use encode::ffmpeg::{EncoderSettings, FfmpegEncoder};
use error::{notify, AnnotatorError};
use export::json::ExportDocument;
use render::frame::{readback, save_png};
use session::{format_time, Surface};
use studio::Studio;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    if let Some(ref path) = config::discover(cli.config.as_deref()) {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            // Merge: config values apply only when CLI is at its default
            if cli.width == config::default_width() { cli.width = cfg.surface.width; }
            if cli.height == config::default_height() { cli.height = cfg.surface.height; }
            if cli.bars == config::default_bars() { cli.bars = cfg.waveform.bars; }
            if cli.fps == config::default_fps() { cli.fps = cfg.output.fps; }
            if cli.crf == config::default_crf() { cli.crf = cfg.output.crf; }
            if cli.codec == config::default_codec() { cli.codec = cfg.output.codec; }
            if cli.pix_fmt == config::default_pix_fmt() { cli.pix_fmt = cfg.output.pix_fmt; }
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    if cli.width == 0 || cli.height == 0 || cli.bars == 0 {
        anyhow::bail!(
            "Surface {}x{} with {} bars cannot be drawn",
            cli.width, cli.height, cli.bars
        );
    }

    log::info!("annotator - waveform and image annotation");
    log::info!("Surface: {}x{}, {} bars", cli.width, cli.height, cli.bars);

    let surface = Surface {
        width: cli.width,
        height: cli.height,
    };
    let mut studio = Studio::new(surface, cli.bars, cli.fps);

    // 1. Load media; a failed load is reported and the session carries on
    if let Some(ref path) = cli.audio {
        log::info!("Decoding audio {}...", path.display());
        if let Err(err) = studio.open_audio(path) {
            notify("Load audio", &err);
        }
    }
    if let Some(ref path) = cli.image {
        if let Err(err) = studio.open_image(path) {
            notify("Load image", &err);
        }
    }
    if cli.audio.is_none() && cli.image.is_none() && cli.script.is_none() {
        notify("Load", &AnnotatorError::NoFileSelected);
    }

    // 2. Annotate from the command line
    for x in &cli.marks {
        match studio.session_mut().click_audio(*x) {
            Ok(ann) => log::info!("{} at {}", ann.title, ann.time().map(format_time).unwrap_or_default()),
            Err(err) => notify("Add audio annotation", &err),
        }
    }
    for (x, y) in &cli.pins {
        match studio.session_mut().click_image(*x, *y) {
            Ok(ann) => log::info!("{} at ({}, {})", ann.title, x, y),
            Err(err) => notify("Add image annotation", &err),
        }
    }

    // 3. Replay the interaction script
    if let Some(ref path) = cli.script {
        let events = script::load_script(path)?;
        studio.replay(&events)?;
    }

    // 4. Snapshot frame
    if let Some(x) = cli.hover {
        studio.session_mut().hover(x);
        if let Some(time) = studio.session().hover_time() {
            log::info!("Hover at {}", format_time(time));
        }
    }
    if let Some(time) = cli.play_at {
        studio.seek(time);
        studio.play();
    }

    if cli.frame.is_some() || cli.image_frame.is_some() {
        let frame = match studio.run_frames(cli.frames)? {
            Some(frame) => frame,
            None => studio.draw()?,
        };

        if let Some(ref path) = cli.frame {
            match frame.waveform {
                Some(ref pixmap) => save_png(pixmap, path)?,
                None => log::warn!("No audio loaded; waveform frame not written"),
            }
        }
        if let Some(ref path) = cli.image_frame {
            match frame.image {
                Some(ref pixmap) => save_png(pixmap, path)?,
                None => log::warn!("No image loaded; image frame not written"),
            }
        }
    }

    log::info!("Position: {}", studio.readout());

    // 5. Playback video
    if let Some(ref output) = cli.video {
        render_video(&mut studio, &cli, output)?;
    }

    // 6. Export
    if let Some(ref dir) = cli.export_dir {
        export_annotations(&studio, dir)?;
    }

    Ok(())
}

fn render_video(studio: &mut Studio, cli: &Cli, output: &std::path::Path) -> Result<()> {
    if studio.session().audio().is_none() {
        notify("Render video", &AnnotatorError::NothingToAnnotate("no audio loaded"));
        return Ok(());
    }

    log::info!("Rendering playback to {}", output.display());
    let settings = EncoderSettings {
        width: cli.width,
        height: cli.height,
        fps: cli.fps,
        codec: cli.codec.clone(),
        pix_fmt: cli.pix_fmt.clone(),
        crf: cli.crf,
        bitrate: cli.bitrate.clone(),
    };
    let mut encoder = FfmpegEncoder::new(output, &settings)?;

    let pb = ProgressBar::new(studio.playback_frames());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .context("Invalid progress template")?
            .progress_chars("=>-"),
    );

    studio.record(|pixmap| {
        encoder.write_frame(&readback(pixmap))?;
        pb.inc(1);
        Ok(())
    })?;
    pb.finish_with_message("done");

    log::info!("Encoded {} frames", encoder.frames_written());
    encoder.finish()?;
    log::info!("Done! Output: {}", output.display());
    Ok(())
}

fn export_annotations(studio: &Studio, dir: &std::path::Path) -> Result<()> {
    let session = studio.session();
    if session.annotations().is_empty() {
        log::info!("No annotations to export");
    }
    let now = Utc::now();

    let json = ExportDocument::new(session, now)
        .to_json()
        .context("Failed to serialize annotations")?;
    if let Err(err) = export::write(dir, &export::file_name("json", now), &json) {
        notify("Export JSON", &err);
    }

    let markdown = export::markdown::render(session.annotations(), now.with_timezone(&Local));
    if let Err(err) = export::write(dir, &export::file_name("md", now), &markdown) {
        notify("Export Markdown", &err);
    }
    Ok(())
}
