use dropshare_files::StoreError;
use dropshare_types::NameError;

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("no file uploaded")]
    MissingFile,
    #[error("file not specified")]
    MissingName,
    #[error("invalid file name: {0}")]
    InvalidName(#[from] NameError),
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("file not found or already deleted: {0}")]
    NotFound(String),
    #[error("no free opaque id after {attempts} attempts")]
    IdSpaceExhausted { attempts: usize },
    #[error("storage error: {0}")]
    Storage(StoreError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<StoreError> for ShareError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(name) => ShareError::NotFound(name),
            other => ShareError::Storage(other),
        }
    }
}

pub type ShareResult<T> = std::result::Result<T, ShareError>;
