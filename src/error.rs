use std::fmt;
use std::io;
use std::path::PathBuf;

/// Coarse grouping of [`TileError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A texture, rules file or level file could not be opened or decoded.
    Load,
    /// A field inside a sub-texture record could not be parsed.
    Parse,
    /// A tile, sub-texture or slice was addressed with an invalid index.
    Index,
}

/// Error type for every fallible tile, atlas and loader operation.
#[derive(Debug)]
pub enum TileError {
    /// File I/O error
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The sub-texture rules file contained no records
    EmptyRules {
        /// Rules file.
        path: PathBuf,
    },
    /// JSON decode error
    Json {
        /// File being decoded.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// The backing texture image could not be loaded
    Texture {
        /// Image file.
        path: PathBuf,
        /// Loader message.
        reason: String,
    },
    /// Unsupported file format (non-JSON level file)
    UnsupportedFormat(String),
    /// A numeric field could not be parsed
    Parse {
        /// Offending field.
        text: String,
    },
    /// A rules line does not carry the four `left,top,width,height` fields
    MalformedRecord {
        /// One-based line number.
        line: usize,
        /// Line contents.
        text: String,
    },
    /// No tile at this index
    TileOutOfRange {
        /// Requested index.
        index: usize,
        /// Tile count.
        len: usize,
    },
    /// No sub-texture at this index
    SubTextureOutOfRange {
        /// Requested index.
        index: usize,
        /// Table length.
        len: usize,
    },
    /// The slice handle was issued before the arena was reset or compacted
    StaleSlice {
        /// Slot the handle names.
        slot: usize,
        /// Generation it was issued in.
        generation: u32,
    },
}

impl TileError {
    /// Which of the three failure kinds this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TileError::Io { .. }
            | TileError::EmptyRules { .. }
            | TileError::Json { .. }
            | TileError::Texture { .. }
            | TileError::UnsupportedFormat(_) => ErrorKind::Load,
            TileError::Parse { .. } | TileError::MalformedRecord { .. } => ErrorKind::Parse,
            TileError::TileOutOfRange { .. }
            | TileError::SubTextureOutOfRange { .. }
            | TileError::StaleSlice { .. } => ErrorKind::Index,
        }
    }
}

impl fmt::Display for TileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            TileError::EmptyRules { path } => {
                write!(f, "No sub-texture records in {}", path.display())
            }
            TileError::Json { path, source } => {
                write!(f, "JSON parse error in {}: {}", path.display(), source)
            }
            TileError::Texture { path, reason } => {
                write!(f, "Failed to load texture {}: {}", path.display(), reason)
            }
            TileError::UnsupportedFormat(path) => write!(f, "Unsupported file format: {}", path),
            TileError::Parse { text } => write!(f, "Unable to parse '{}' as a number", text),
            TileError::MalformedRecord { line, text } => write!(
                f,
                "Line {}: expected left,top,width,height but got '{}'",
                line, text
            ),
            TileError::TileOutOfRange { index, len } => {
                write!(f, "Tile index {} out of range ({} tiles)", index, len)
            }
            TileError::SubTextureOutOfRange { index, len } => write!(
                f,
                "Sub-texture index {} out of range ({} sub-textures)",
                index, len
            ),
            TileError::StaleSlice { slot, generation } => write!(
                f,
                "Slice handle {} from generation {} is no longer valid",
                slot, generation
            ),
        }
    }
}

impl std::error::Error for TileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TileError::Io { source, .. } => Some(source),
            TileError::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}
