use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read model {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse OBJ: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("model contains no geometry")]
    Empty,
    #[error("model has no node named {0:?}")]
    MissingNode(String),
    #[error("model fetch failed: {0}")]
    Fetch(String),
    #[error("scene loader failed: {0}")]
    Worker(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    #[error("no debug control labelled {0:?}")]
    Unknown(String),
    #[error("control {label:?} expects a {expected} value")]
    KindMismatch {
        label: &'static str,
        expected: &'static str,
    },
    #[error("cannot parse {0:?} as a control value")]
    BadValue(String),
}
