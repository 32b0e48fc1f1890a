use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::session::{AnnotationColor, AnnotationPatch};

/// One recorded user interaction.
///
/// Scripts are JSON arrays of objects tagged by `event`, e.g.
/// `{"event": "click_audio", "x": 400}`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    LoadAudio { path: PathBuf },
    LoadImage { path: PathBuf },
    ClickAudio { x: f64 },
    ClickImage { x: f64, y: f64 },
    Update {
        id: String,
        title: Option<String>,
        note: Option<String>,
        color: Option<AnnotationColor>,
    },
    Delete { id: String },
    Play,
    Pause,
    Toggle,
    Seek { time: f64 },
    Hover { x: f64 },
    Leave,
    Frames { count: u64 },
}

impl ScriptEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadAudio { .. } => "load_audio",
            Self::LoadImage { .. } => "load_image",
            Self::ClickAudio { .. } => "click_audio",
            Self::ClickImage { .. } => "click_image",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Toggle => "toggle",
            Self::Seek { .. } => "seek",
            Self::Hover { .. } => "hover",
            Self::Leave => "leave",
            Self::Frames { .. } => "frames",
        }
    }

    /// The edit carried by an `update` event.
    pub fn patch(&self) -> Option<AnnotationPatch> {
        match self {
            Self::Update {
                title, note, color, ..
            } => Some(AnnotationPatch {
                title: title.clone(),
                note: note.clone(),
                color: *color,
            }),
            _ => None,
        }
    }
}

pub fn parse_script(json: &str) -> Result<Vec<ScriptEvent>> {
    serde_json::from_str(json).context("Invalid interaction script")
}

pub fn load_script(path: &Path) -> Result<Vec<ScriptEvent>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let events = parse_script(&json)?;
    log::info!("Loaded {} script events from {}", events.len(), path.display());
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_event_kind() {
        let events = parse_script(
            r##"[
                {"event": "load_audio", "path": "song.wav"},
                {"event": "load_image", "path": "cover.png"},
                {"event": "click_audio", "x": 400},
                {"event": "click_image", "x": 12.5, "y": 30},
                {"event": "update", "id": "1", "note": "chorus", "color": "#ec4899"},
                {"event": "delete", "id": "2"},
                {"event": "play"},
                {"event": "pause"},
                {"event": "toggle"},
                {"event": "seek", "time": 3.5},
                {"event": "hover", "x": 120},
                {"event": "leave"},
                {"event": "frames", "count": 30}
            ]"##,
        )
        .unwrap();

        assert_eq!(events.len(), 13);
        assert_eq!(events[0], ScriptEvent::LoadAudio { path: "song.wav".into() });
        assert_eq!(events[3], ScriptEvent::ClickImage { x: 12.5, y: 30.0 });
        assert_eq!(events[12], ScriptEvent::Frames { count: 30 });
        let names: Vec<_> = events.iter().map(ScriptEvent::name).collect();
        assert_eq!(names[4], "update");
        assert_eq!(names[11], "leave");
    }

    #[test]
    fn update_carries_only_given_fields() {
        let events = parse_script(r#"[{"event": "update", "id": "7", "title": "Intro"}]"#).unwrap();
        let patch = events[0].patch().unwrap();
        assert_eq!(patch.title.as_deref(), Some("Intro"));
        assert!(patch.note.is_none());
        assert!(patch.color.is_none());
        assert!(ScriptEvent::Play.patch().is_none());
    }

    #[test]
    fn unknown_events_and_bad_colors_are_rejected() {
        assert!(parse_script(r#"[{"event": "explode"}]"#).is_err());
        assert!(parse_script(r##"[{"event": "update", "id": "1", "color": "#123456"}]"##).is_err());
        assert!(parse_script(r#"{"event": "play"}"#).is_err());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        std::fs::write(&path, r#"[{"event": "hover", "x": 5}]"#).unwrap();
        assert_eq!(load_script(&path).unwrap(), vec![ScriptEvent::Hover { x: 5.0 }]);
        assert!(load_script(&dir.path().join("missing.json")).is_err());
    }
}
