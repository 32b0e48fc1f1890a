use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::session::{Annotation, AnnotationColor, AnnotationKind, Session};

#[derive(Debug, Serialize)]
pub struct ExportedAnnotation<'a> {
    pub id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    pub x: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    pub title: &'a str,
    pub note: &'a str,
    pub color: AnnotationColor,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
}

impl<'a> From<&'a Annotation> for ExportedAnnotation<'a> {
    fn from(a: &'a Annotation) -> Self {
        Self {
            id: &a.id,
            time: a.time(),
            x: a.x(),
            y: a.y(),
            title: &a.title,
            note: &a.note,
            color: a.color,
            kind: a.kind(),
        }
    }
}

/// The one-shot JSON export of a session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<'a> {
    pub annotations: Vec<ExportedAnnotation<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_file: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub timestamp: String,
}

impl<'a> ExportDocument<'a> {
    pub fn new(session: &'a Session, now: DateTime<Utc>) -> Self {
        Self {
            annotations: super::sorted(session.annotations())
                .into_iter()
                .map(ExportedAnnotation::from)
                .collect(),
            audio_file: session.audio().map(|a| a.source.as_str()),
            image_file: session.image().map(|i| i.source.as_str()),
            duration: session.audio().map(|a| a.duration).filter(|d| *d > 0.0),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
