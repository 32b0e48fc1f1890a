use thiserror::Error;

/// Failures of a single user action. None of these end the session: the
/// caller reports them through [`notify`] and carries on with the prior state.
#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("failed to load image: {0}")]
    Load(String),

    #[error("no file selected")]
    NoFileSelected,

    #[error("audio buffer is empty")]
    DegenerateInput,

    #[error("no annotation with id '{0}'")]
    UnknownAnnotation(String),

    #[error("nothing to annotate: {0}")]
    NothingToAnnotate(&'static str),

    #[error("unknown annotation color '{0}'")]
    UnknownColor(String),

    #[error("export failed: {0}")]
    Export(#[from] std::io::Error),
}

/// Surface a failed action as a transient notification.
pub fn notify(action: &str, err: &AnnotatorError) {
    log::warn!("{} failed: {}", action, err);
}
