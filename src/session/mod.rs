pub mod annotation;
pub mod playback;
pub mod state;

pub use annotation::{Annotation, AnnotationColor, AnnotationKind, AnnotationPatch};
pub use playback::{format_time, PlaybackState};
pub use state::{FrameInputs, Session, Surface};
