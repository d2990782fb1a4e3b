use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Fewer bytes remained than the fixed-width decode required.
    #[error("truncated read at offset {offset}: wanted {wanted} bytes")]
    Truncated { offset: u64, wanted: usize },

    /// ASCII content of a numeric field did not parse as the requested type.
    #[error("invalid numeric field at offset {offset}: {text:?}")]
    InvalidNumeric { offset: u64, text: String },

    /// A record declared a length too small to contain itself.
    #[error("bad record length {length} at offset {offset}")]
    BadRecordLength { offset: u64, length: i64 },

    /// A catalog field or payload extends past the record's declared length.
    #[error("field {name:?} extends past declared record length {length}")]
    FieldRange { name: String, length: i32 },

    /// Decoded payload does not match the shape the catalog declares.
    #[error("payload {name:?} has unexpected shape")]
    PayloadShape { name: String },

    /// Band index outside the mission's valid range. Checked before any I/O.
    #[error("band {band} outside valid range 1..={count}")]
    BandRange { band: usize, count: usize },

    /// Sample index outside a record's populated range. Checked before any I/O.
    #[error("index {index} outside valid range 1..={count}")]
    IndexRange { index: usize, count: usize },

    #[error("record has no field named {0:?}")]
    UnknownField(String),

    #[error("record has no payload named {0:?}")]
    UnknownPayload(String),

    #[error("record has no locator named {0:?}")]
    UnknownLocator(String),

    #[error("field {name:?} is not {expected}")]
    WrongFieldType { name: String, expected: &'static str },

    #[error("product file has no {0} record")]
    MissingRecord(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Top-level wrapper identifying the file and byte offset at which
    /// decoding failed.
    #[error("cannot decode product file {path:?} at offset {offset}: {source}")]
    Product {
        path: PathBuf,
        offset: u64,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Byte offset at which decoding failed, for errors that carry one.
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::Truncated { offset, .. }
            | Error::InvalidNumeric { offset, .. }
            | Error::BadRecordLength { offset, .. } => Some(*offset),
            Error::Product { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    pub(crate) fn product(path: PathBuf, err: Error) -> Error {
        let offset = err.offset().unwrap_or_default();
        Error::Product {
            path,
            offset,
            source: Box::new(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
