use ethwire_rlp::error::RLPDecodeError;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum EthError {
    #[error("Malformed hex string: {0}")]
    MalformedHex(String),
    #[error("Length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("RLP error: {0}")]
    Rlp(#[from] RLPDecodeError),
    #[error("Unsupported transaction type: {0:#04x}")]
    UnsupportedType(u8),
    #[error("Unsigned transactions are not supported")]
    UnsupportedUnsignedTx,
    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),
    #[error("Chain id is not part of the signature")]
    ChainIdUnavailable,
    #[error("Invalid flavor: {0}")]
    InvalidFlavor(String),
    #[error("Invalid list shape for {what}: got {items} items")]
    InvalidListShape { what: &'static str, items: usize },
    #[error("Transaction type requires a recipient")]
    MissingRecipient,
}

/// Structural RLP fault classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RlpErrorKind {
    Truncated,
    ExtraData,
    InvalidPrefix,
    SizeOverflow,
    Other,
}

impl EthError {
    /// Classifies a wrapped RLP error, looking through field context.
    pub fn rlp_kind(&self) -> Option<RlpErrorKind> {
        let EthError::Rlp(err) = self else {
            return None;
        };
        Some(match err.root() {
            RLPDecodeError::Truncated => RlpErrorKind::Truncated,
            RLPDecodeError::ExtraData => RlpErrorKind::ExtraData,
            RLPDecodeError::InvalidPrefix => RlpErrorKind::InvalidPrefix,
            RLPDecodeError::SizeOverflow => RlpErrorKind::SizeOverflow,
            _ => RlpErrorKind::Other,
        })
    }

    pub(crate) fn list_shape(what: &'static str, items: usize) -> Self {
        EthError::InvalidListShape { what, items }
    }
}
