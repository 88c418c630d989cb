use std::{error::Error, fmt::Display, io, path::PathBuf};

#[derive(Clone, Debug, PartialEq)]
pub enum StartupError {
    InvalidParameter(String),
}

impl Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl Error for StartupError {}

#[derive(Clone, Debug, PartialEq)]
pub enum KeyGenerationError {
    UnsupportedKeySize(usize),
    GenerationFailed(String),
}

impl Display for KeyGenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl Error for KeyGenerationError {}

/// Failure of a single encode-and-write call.
///
/// `Encoding` is raised before anything reaches the sink. `SinkWrite` means
/// the sink may hold a partial artifact and must be discarded.
#[derive(Debug)]
pub enum EncodeError {
    Encoding(String),
    SinkWrite(io::Error),
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::Encoding(message) => write!(f, "encoding failed: {}", message),
            EncodeError::SinkWrite(e) => write!(f, "write failed: {}", e),
        }
    }
}

impl Error for EncodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EncodeError::Encoding(_) => None,
            EncodeError::SinkWrite(e) => Some(e),
        }
    }
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> Self {
        EncodeError::SinkWrite(e)
    }
}

#[derive(Debug)]
pub enum SetupError {
    KeyGeneration(KeyGenerationError),
    CreateDirectory { path: PathBuf, source: io::Error },
    CreateFile { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: EncodeError },
    CloseFailed { path: PathBuf, source: io::Error },
}

impl Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::KeyGeneration(e) => write!(f, "cannot generate a key pair: {}", e),
            SetupError::CreateDirectory { path, source } => {
                write!(f, "cannot create directory {}: {}", path.display(), source)
            }
            SetupError::CreateFile { path, source } => {
                write!(f, "cannot create {}: {}", path.display(), source)
            }
            SetupError::Write { path, source } => {
                write!(f, "cannot write {}: {}", path.display(), source)
            }
            SetupError::CloseFailed { path, source } => {
                write!(f, "cannot close {}: {}", path.display(), source)
            }
        }
    }
}

impl Error for SetupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SetupError::KeyGeneration(e) => Some(e),
            SetupError::CreateDirectory { source, .. }
            | SetupError::CreateFile { source, .. }
            | SetupError::CloseFailed { source, .. } => Some(source),
            SetupError::Write { source, .. } => Some(source),
        }
    }
}
