use thiserror::Error;

#[derive(Error, Debug)]
pub enum SprError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Stimulus load error: {0}")]
    Load(#[from] crate::loader::LoadError),

    #[error("Submission error: {0}")]
    Submit(#[from] crate::results::submit::SubmitError),

    #[error("Presentation error: {0}")]
    Presentation(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SprError>;
