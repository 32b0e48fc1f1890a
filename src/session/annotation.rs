use serde::{Deserialize, Serialize};

use crate::error::AnnotatorError;

/// Marker colors, in the order new annotations cycle through them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AnnotationColor {
    Indigo,
    Green,
    Orange,
    Apricot,
    Slate,
    Pink,
    Emerald,
    Amber,
}

pub const PALETTE: [AnnotationColor; 8] = [
    AnnotationColor::Indigo,
    AnnotationColor::Green,
    AnnotationColor::Orange,
    AnnotationColor::Apricot,
    AnnotationColor::Slate,
    AnnotationColor::Pink,
    AnnotationColor::Emerald,
    AnnotationColor::Amber,
];

impl AnnotationColor {
    /// Color for the annotation created when the collection holds `count` entries.
    pub fn for_index(count: usize) -> Self {
        PALETTE[count % PALETTE.len()]
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::Indigo => [0x63, 0x66, 0xf1],
            Self::Green => [0x15, 0x80, 0x3d],
            Self::Orange => [0xea, 0x58, 0x0c],
            Self::Apricot => [0xff, 0x97, 0x38],
            Self::Slate => [0x4b, 0x55, 0x63],
            Self::Pink => [0xec, 0x48, 0x99],
            Self::Emerald => [0x10, 0xb9, 0x81],
            Self::Amber => [0xf5, 0x9e, 0x0b],
        }
    }

    pub fn hex(self) -> String {
        let [r, g, b] = self.rgb();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// Accepts `#rrggbb` (case-insensitive) for a palette entry, or its name.
    pub fn parse(value: &str) -> Result<Self, AnnotatorError> {
        let needle = value.trim().to_ascii_lowercase();
        PALETTE
            .iter()
            .copied()
            .find(|c| c.hex() == needle || format!("{:?}", c).to_ascii_lowercase() == needle)
            .ok_or_else(|| AnnotatorError::UnknownColor(value.to_string()))
    }
}

impl From<AnnotationColor> for String {
    fn from(color: AnnotationColor) -> Self {
        color.hex()
    }
}

impl TryFrom<String> for AnnotationColor {
    type Error = AnnotatorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Audio,
    Image,
}

/// Where an annotation is pinned. Audio marks keep the clicked x so they are
/// drawn exactly where they were placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    Audio { time: f64, x: f64 },
    Image { x: f64, y: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub id: String,
    pub anchor: Anchor,
    pub title: String,
    pub note: String,
    pub color: AnnotationColor,
}

impl Annotation {
    pub fn kind(&self) -> AnnotationKind {
        match self.anchor {
            Anchor::Audio { .. } => AnnotationKind::Audio,
            Anchor::Image { .. } => AnnotationKind::Image,
        }
    }

    pub fn time(&self) -> Option<f64> {
        match self.anchor {
            Anchor::Audio { time, .. } => Some(time),
            Anchor::Image { .. } => None,
        }
    }

    pub fn x(&self) -> f64 {
        match self.anchor {
            Anchor::Audio { x, .. } | Anchor::Image { x, .. } => x,
        }
    }

    pub fn y(&self) -> Option<f64> {
        match self.anchor {
            Anchor::Audio { .. } => None,
            Anchor::Image { y, .. } => Some(y),
        }
    }
}

/// Partial edit applied by `Session::update_annotation`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AnnotationPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub color: Option<AnnotationColor>,
}

impl AnnotationPatch {
    pub fn apply_to(&self, annotation: &mut Annotation) {
        if let Some(ref title) = self.title {
            annotation.title = title.clone();
        }
        if let Some(ref note) = self.note {
            annotation.note = note.clone();
        }
        if let Some(color) = self.color {
            annotation.color = color;
        }
    }
}
