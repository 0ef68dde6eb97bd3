use std::{fmt, str::FromStr};

use bytes::{BufMut, Bytes};
use ethereum_types::{Bloom, H160, H256, H32, H64, U256};
use ethwire_rlp::{
    decode::{decode_bytes, RLPDecode},
    encode::RLPEncode,
    error::RLPDecodeError,
    Value,
};
use num_bigint::BigUint;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::{crypto, errors::EthError};

pub type Data4 = H32;
pub type Data8 = H64;
pub type Data20 = H160;
pub type Data32 = H256;
pub type Data256 = Bloom;
pub type Hash = H256;
pub type Topic = H256;

/// Decodes `0x`-prefixed hex. When `expected_len` is given the payload must
/// be exactly that many bytes.
pub fn parse_hex(text: &str, expected_len: Option<usize>) -> Result<Vec<u8>, EthError> {
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| EthError::MalformedHex(text.to_string()))?;
    if digits.len() % 2 != 0 || !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::MalformedHex(text.to_string()));
    }
    if let Some(expected) = expected_len {
        if digits.len() != expected * 2 {
            return Err(EthError::LengthMismatch {
                expected,
                actual: digits.len() / 2,
            });
        }
    }
    hex::decode(digits).map_err(|_| EthError::MalformedHex(text.to_string()))
}

/// Byte-string values with a canonical `0x` hex text form.
pub trait HexData: Sized {
    /// Parses the `0x` hex form, enforcing the width of fixed-size types.
    fn parse_hex(text: &str) -> Result<Self, EthError>;

    fn to_bytes(&self) -> &[u8];

    fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    fn to_rlp(&self) -> Value {
        Value::bytes(Bytes::copy_from_slice(self.to_bytes()))
    }

    fn hash(&self) -> H256 {
        crypto::keccak256(self.to_bytes())
    }
}

macro_rules! impl_hex_data_fixed {
    ($($t:ident => $len:literal),*) => {
        $(
            impl HexData for $t {
                fn parse_hex(text: &str) -> Result<Self, EthError> {
                    let bytes = parse_hex(text, Some($len))?;
                    Ok($t::from_slice(&bytes))
                }

                fn to_bytes(&self) -> &[u8] {
                    self.as_bytes()
                }
            }
        )*
    };
}

impl_hex_data_fixed!(H32 => 4, H64 => 8, H160 => 20, H256 => 32, Bloom => 256);

/// Variable-length byte string.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Data(pub Bytes);

impl Data {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Data(bytes.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl HexData for Data {
    fn parse_hex(text: &str) -> Result<Self, EthError> {
        Ok(Data(parse_hex(text, None)?.into()))
    }

    fn to_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Data {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Data {
    fn from(bytes: Vec<u8>) -> Self {
        Data(bytes.into())
    }
}

impl From<Bytes> for Data {
    fn from(bytes: Bytes) -> Self {
        Data(bytes)
    }
}

impl From<&[u8]> for Data {
    fn from(bytes: &[u8]) -> Self {
        Data(Bytes::copy_from_slice(bytes))
    }
}

impl FromStr for Data {
    type Err = EthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Data::parse_hex(s)
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Data({})", self.to_hex())
    }
}

impl Serialize for Data {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Data {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Data::parse_hex(&text).map_err(D::Error::custom)
    }
}

impl RLPEncode for Data {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.0.encode(buf)
    }
}

impl RLPDecode for Data {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (bytes, rest) = Bytes::decode_unfinished(rlp)?;
        Ok((Data(bytes), rest))
    }
}

/// 20-byte account identifier.
///
/// Equality is on the bytes. [`Display`](fmt::Display) renders the EIP-55
/// checksummed form, while JSON emission uses lowercase hex.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub H160);

impl Address {
    pub const fn zero() -> Self {
        Address(H160([0; 20]))
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        Address(H160::from_slice(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// EIP-55 mixed-case form.
    pub fn to_checksum(&self) -> String {
        crypto::checksum(&hex::encode(self.0.as_bytes()))
    }
}

impl HexData for Address {
    fn parse_hex(text: &str) -> Result<Self, EthError> {
        Ok(Address(H160::parse_hex(text)?))
    }

    fn to_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<H160> for Address {
    fn from(value: H160) -> Self {
        Address(value)
    }
}

impl From<[u8; 20]> for Address {
    fn from(value: [u8; 20]) -> Self {
        Address(H160(value))
    }
}

impl From<Address> for H160 {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl FromStr for Address {
    type Err = EthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse_hex(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Address::parse_hex(&text).map_err(D::Error::custom)
    }
}

impl RLPEncode for Address {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.0.encode(buf)
    }
}

impl RLPDecode for Address {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (address, rest) = H160::decode_unfinished(rlp)?;
        Ok((Address(address), rest))
    }
}

/// Non-negative integer of unbounded size, `0x`-prefixed minimal hex on the wire.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quantity(BigUint);

impl Quantity {
    pub fn zero() -> Self {
        Quantity(BigUint::default())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }

    /// Parses `0x` followed by hex digits without superfluous leading zeros.
    pub fn parse(text: &str) -> Result<Self, EthError> {
        let digits = text
            .strip_prefix("0x")
            .ok_or_else(|| EthError::MalformedHex(text.to_string()))?;
        if digits.is_empty() {
            return Err(EthError::InvalidQuantity(format!("{text}: no digits")));
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(EthError::InvalidQuantity(format!("{text}: leading zero")));
        }
        if !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(EthError::InvalidQuantity(format!("{text}: non-hex digit")));
        }
        BigUint::parse_bytes(digits.as_bytes(), 16)
            .map(Quantity)
            .ok_or_else(|| EthError::InvalidQuantity(text.to_string()))
    }

    pub fn to_text(&self) -> String {
        format!("0x{:x}", self.0)
    }

    /// Minimal big-endian bytes; zero is the empty slice.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        if self.is_zero() {
            Vec::new()
        } else {
            self.0.to_bytes_be()
        }
    }

    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        Quantity(BigUint::from_bytes_be(bytes))
    }

    pub fn to_rlp(&self) -> Value {
        Value::bytes(self.to_be_bytes())
    }

    pub fn as_u64(&self) -> Option<u64> {
        u64::try_from(&self.0).ok()
    }

    pub fn as_u256(&self) -> Option<U256> {
        let bytes = self.to_be_bytes();
        (bytes.len() <= 32).then(|| U256::from_big_endian(&bytes))
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Quantity(BigUint::from(value))
    }
}

impl From<u8> for Quantity {
    fn from(value: u8) -> Self {
        Quantity(BigUint::from(value))
    }
}

impl TryFrom<i64> for Quantity {
    type Error = EthError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Quantity::from)
            .map_err(|_| EthError::InvalidQuantity(format!("negative value {value}")))
    }
}

impl From<BigUint> for Quantity {
    fn from(value: BigUint) -> Self {
        Quantity(value)
    }
}

impl From<U256> for Quantity {
    fn from(value: U256) -> Self {
        let mut bytes = [0u8; 32];
        value.to_big_endian(&mut bytes);
        Quantity::from_be_bytes(&bytes)
    }
}

impl FromStr for Quantity {
    type Err = EthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quantity::parse(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quantity({})", self.to_text())
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Quantity::parse(&text).map_err(D::Error::custom)
    }
}

impl RLPEncode for Quantity {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.to_be_bytes().as_slice().encode(buf)
    }
}

impl RLPDecode for Quantity {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (bytes, rest) = decode_bytes(rlp)?;
        if bytes.first() == Some(&0) {
            return Err(RLPDecodeError::MalformedData);
        }
        Ok((Quantity::from_be_bytes(bytes), rest))
    }
}
