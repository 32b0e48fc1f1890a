pub mod json;
pub mod markdown;

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::error::AnnotatorError;
use crate::session::{Annotation, AnnotationKind};

/// Export order: every audio mark by time, then every image mark by x, then y.
/// The session's own insertion order is left alone.
pub fn sorted(annotations: &[Annotation]) -> Vec<&Annotation> {
    let mut out: Vec<&Annotation> = annotations.iter().collect();
    out.sort_by(|a, b| compare(a, b));
    out
}

fn compare(a: &Annotation, b: &Annotation) -> Ordering {
    match (a.kind(), b.kind()) {
        (AnnotationKind::Audio, AnnotationKind::Audio) => a
            .time()
            .unwrap_or_default()
            .total_cmp(&b.time().unwrap_or_default()),
        (AnnotationKind::Image, AnnotationKind::Image) => a
            .x()
            .total_cmp(&b.x())
            .then_with(|| a.y().unwrap_or_default().total_cmp(&b.y().unwrap_or_default())),
        (AnnotationKind::Audio, AnnotationKind::Image) => Ordering::Less,
        (AnnotationKind::Image, AnnotationKind::Audio) => Ordering::Greater,
    }
}

/// `annotations_YYYY-MM-DD.<ext>`, dated in UTC.
pub fn file_name(extension: &str, now: DateTime<Utc>) -> String {
    format!("annotations_{}.{}", now.format("%Y-%m-%d"), extension)
}

pub fn write(dir: &Path, name: &str, contents: &str) -> Result<PathBuf, AnnotatorError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, contents)?;
    log::info!("Exported {} ({} bytes)", path.display(), contents.len());
    Ok(path)
}
