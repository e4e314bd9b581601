use std::path::PathBuf;

pub type MonitorResult<T> = Result<T, MonitorError>;

#[derive(thiserror::Error, Debug)]
pub enum MonitorError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("monitor state error: {0}")]
    State(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("failed to delete {failed} of {total} files in '{}'", dir.display())]
    Reset {
        dir: PathBuf,
        failed: usize,
        total: usize,
    },

    #[error("failed to write image '{}'", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MonitorError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
