pub const RLP_NULL: u8 = 0x80;
pub const RLP_EMPTY_LIST: u8 = 0xC0;

/// Prefix base for byte strings longer than 55 bytes.
pub const RLP_LONG_STRING: u8 = 0xB7;
/// Prefix base for lists whose payload is longer than 55 bytes.
pub const RLP_LONG_LIST: u8 = 0xF7;
/// Longest payload that still fits in a single-byte prefix.
pub const RLP_SHORT_MAX_LEN: usize = 55;

/// Upper bound for any size field read from a long-form prefix.
pub const MAX_RLP_ITEM_SIZE: usize = u32::MAX as usize;

/// Deepest list nesting accepted when decoding a dynamic [`Value`](crate::value::Value).
pub const MAX_RLP_DEPTH: usize = 1024;
