use thiserror::Error;

#[derive(Error, Debug)]
pub enum VfsError {
    #[error("no usable search path in {0:?}")]
    NoSearchPath(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("operation not valid for this handle's mode")]
    WrongMode,

    #[error("seek past end of buffer")]
    SeekPastEnd,

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VfsError>;
