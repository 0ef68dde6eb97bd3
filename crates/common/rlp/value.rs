//! Dynamic RLP tree.
//!
//! [`Value`] is the untyped view of an RLP item: either a byte string or a
//! list of further values. Typed entities go through [`RLPEncode`] and
//! [`RLPDecode`] directly; the tree is used where the shape of the input is
//! only known at runtime, such as raw blocks and command-line inspection.

use bytes::{BufMut, Bytes};
use ethereum_types::H256;

use crate::{
    constants::MAX_RLP_DEPTH,
    decode::{decode_rlp_item, RLPDecode},
    encode::{encode_length, RLPEncode},
    error::RLPDecodeError,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Bytes(Bytes),
    List(Vec<Value>),
}

impl Value {
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Value::Bytes(data.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items)
    }

    pub fn empty_bytes() -> Self {
        Value::Bytes(Bytes::new())
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            Value::Bytes(_) => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Canonical encoding as a lowercase `0x`-prefixed hex string.
    pub fn encode_hex(&self) -> String {
        format!("0x{}", hex::encode(self.encode_to_vec()))
    }

    /// Parses a `0x`-prefixed hex string holding exactly one RLP item.
    pub fn decode_hex(text: &str) -> Result<Self, RLPDecodeError> {
        let raw = decode_hex_prefixed(text)?;
        Self::decode(&raw)
    }

    /// keccak256 of the canonical encoding.
    pub fn hash(&self) -> H256 {
        keccak_hash::keccak(self.encode_to_vec())
    }
}

/// Decodes `0x`-prefixed hex, accepting either letter case.
pub fn decode_hex_prefixed(text: &str) -> Result<Vec<u8>, RLPDecodeError> {
    let digits = text
        .strip_prefix("0x")
        .ok_or(RLPDecodeError::MalformedHex)?;
    hex::decode(digits).map_err(|_| RLPDecodeError::MalformedHex)
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl RLPEncode for Value {
    fn encode(&self, buf: &mut dyn BufMut) {
        match self {
            Value::Bytes(bytes) => bytes.encode(buf),
            Value::List(items) => {
                let total_len = items.iter().map(RLPEncode::length).sum();
                encode_length(total_len, buf);
                for item in items {
                    item.encode(buf);
                }
            }
        }
    }
}

impl RLPDecode for Value {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        decode_nested(rlp, 0)
    }
}

fn decode_nested(rlp: &[u8], depth: usize) -> Result<(Value, &[u8]), RLPDecodeError> {
    let (is_list, payload, rest) = decode_rlp_item(rlp)?;
    if !is_list {
        return Ok((Value::Bytes(Bytes::copy_from_slice(payload)), rest));
    }
    if depth >= MAX_RLP_DEPTH {
        return Err(RLPDecodeError::DepthExceeded(MAX_RLP_DEPTH));
    }
    let mut items = Vec::new();
    let mut current = payload;
    while !current.is_empty() {
        let (item, remaining) = decode_nested(current, depth + 1)?;
        items.push(item);
        current = remaining;
    }
    Ok((Value::List(items), rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use proptest::{collection::vec, prelude::*};

    fn value_from_hex(text: &str) -> Value {
        Value::bytes(decode_hex_prefixed(text).unwrap())
    }

    #[test]
    fn encode_primitive_values() {
        assert_eq!(value_from_hex("0x646f67").encode_hex(), "0x83646f67");
        assert_eq!(
            Value::list(vec![value_from_hex("0x636174"), value_from_hex("0x646f67")]).encode_hex(),
            "0xc88363617483646f67"
        );
        assert_eq!(value_from_hex("0x").encode_hex(), "0x80");
        assert_eq!(Value::list(vec![]).encode_hex(), "0xc0");
        assert_eq!(value_from_hex("0x0400").encode_hex(), "0x820400");
    }

    #[test]
    fn empty_bytes_and_empty_list_are_distinct() {
        assert_ne!(Value::empty_bytes(), Value::list(vec![]));
        assert_eq!(Value::decode_hex("0x80").unwrap(), Value::empty_bytes());
        assert_eq!(Value::decode_hex("0xc0").unwrap(), Value::list(vec![]));
    }

    #[test]
    fn decode_nested_lists() {
        // [ [], [[]], [ [], [[]] ] ]
        let decoded = Value::decode_hex("0xc7c0c1c0c3c0c1c0").unwrap();
        let empty = Value::list(vec![]);
        let expected = Value::list(vec![
            empty.clone(),
            Value::list(vec![empty.clone()]),
            Value::list(vec![empty.clone(), Value::list(vec![empty])]),
        ]);
        assert_eq!(decoded, expected);
        assert_eq!(decoded.encode_hex(), "0xc7c0c1c0c3c0c1c0");
    }

    #[test]
    fn decode_accepts_uppercase_hex() {
        let decoded = Value::decode_hex("0xC88363617483646F67").unwrap();
        assert_eq!(decoded.encode_hex(), "0xc88363617483646f67");
    }

    #[test]
    fn decode_rejects_malformed_hex() {
        assert_eq!(
            Value::decode_hex("83646f67"),
            Err(RLPDecodeError::MalformedHex)
        );
        assert_eq!(Value::decode_hex("0x8"), Err(RLPDecodeError::MalformedHex));
        assert_eq!(
            Value::decode_hex("0x83646f6g"),
            Err(RLPDecodeError::MalformedHex)
        );
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        assert_eq!(
            Value::decode_hex("0x83646f6701"),
            Err(RLPDecodeError::ExtraData)
        );
    }

    #[test]
    fn decode_rejects_truncated_body() {
        assert_eq!(
            Value::decode_hex("0x83646f"),
            Err(RLPDecodeError::Truncated)
        );
        assert_eq!(Value::decode_hex("0xc2c0"), Err(RLPDecodeError::Truncated));
    }

    #[test]
    fn long_string_uses_long_prefix() {
        let value = Value::bytes(vec![0x61u8; 60]);
        let encoded = value.encode_to_vec();
        assert_eq!(&encoded[..2], &hex!("b83c"));
        assert_eq!(Value::decode(&encoded).unwrap(), value);
    }

    #[test]
    fn hash_is_keccak_of_encoding() {
        // keccak256(0xc0), the empty ommers hash
        assert_eq!(
            Value::list(vec![]).hash(),
            H256(hex!(
                "1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347"
            ))
        );
    }

    /// `depth` lists, each wrapping the next, around an empty string.
    fn nested_lists(depth: usize) -> Vec<u8> {
        let mut prefixes = Vec::with_capacity(depth);
        let mut inner_len = 1;
        for _ in 0..depth {
            let mut prefix = Vec::new();
            encode_length(inner_len, &mut prefix);
            inner_len += prefix.len();
            prefixes.push(prefix);
        }
        let mut encoded: Vec<u8> = prefixes.into_iter().rev().flatten().collect();
        encoded.push(0x80);
        encoded
    }

    #[test]
    fn decode_accepts_nesting_up_to_limit() {
        let value = Value::decode(&nested_lists(MAX_RLP_DEPTH)).unwrap();
        let mut current = &value;
        let mut depth = 0;
        while let Value::List(items) = current {
            assert_eq!(items.len(), 1);
            current = &items[0];
            depth += 1;
        }
        assert_eq!(depth, MAX_RLP_DEPTH);
        assert_eq!(current, &Value::empty_bytes());
    }

    #[test]
    fn decode_rejects_excessive_nesting() {
        assert_eq!(
            Value::decode(&nested_lists(MAX_RLP_DEPTH + 1)),
            Err(RLPDecodeError::DepthExceeded(MAX_RLP_DEPTH))
        );
        // Far deeper input fails cleanly instead of exhausting the stack.
        assert_eq!(
            Value::decode(&nested_lists(200_000)),
            Err(RLPDecodeError::DepthExceeded(MAX_RLP_DEPTH))
        );
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = vec(any::<u8>(), 0..80).prop_map(Value::bytes);
        leaf.prop_recursive(4, 64, 8, |inner| vec(inner, 0..8).prop_map(Value::List))
    }

    proptest! {
        #[test]
        fn proptest_value_round_trip(value in arb_value()) {
            let encoded = value.encode_hex();
            let decoded = Value::decode_hex(&encoded).unwrap();
            prop_assert_eq!(&decoded, &value);
            prop_assert_eq!(decoded.encode_hex(), encoded);
        }
    }
}
