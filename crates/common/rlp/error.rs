use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RLPDecodeError {
    #[error("malformed hex input")]
    MalformedHex,
    #[error("input truncated")]
    Truncated,
    #[error("extra data after item")]
    ExtraData,
    #[error("non-canonical item prefix")]
    InvalidPrefix,
    #[error("item size field overflows")]
    SizeOverflow,
    #[error("list nesting deeper than {0} levels")]
    DepthExceeded(usize),
    #[error("MalformedData")]
    MalformedData,
    #[error("MalformedBoolean")]
    MalformedBoolean,
    #[error("UnexpectedList")]
    UnexpectedList,
    #[error("UnexpectedString")]
    UnexpectedString,
    #[error("Error decoding field '{name}' of type {typ}: {source}")]
    Field {
        name: String,
        typ: &'static str,
        source: Box<RLPDecodeError>,
    },
    #[error("{0}")]
    Custom(String),
}

impl RLPDecodeError {
    /// Returns the innermost error, looking through field context.
    pub fn root(&self) -> &RLPDecodeError {
        match self {
            RLPDecodeError::Field { source, .. } => source.root(),
            other => other,
        }
    }
}
