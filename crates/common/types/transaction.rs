use bytes::{BufMut, Bytes};
use ethereum_types::{H256, U256};
use ethwire_rlp::{
    constants::RLP_NULL,
    decode::{decode_list_items, is_list, RLPDecode},
    encode::RLPEncode,
    error::RLPDecodeError,
    structs::{Decoder, Encoder},
};
use num_bigint::BigUint;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, trace};

use super::{
    decode_access_list, decode_authorization_list, parse_hex, AccessList, AccessListEntry,
    Address, AuthorizationList, BlobsBundle, Data, Quantity,
};
use crate::{crypto, errors::EthError};

/// Highest first byte of an EIP-2718 typed envelope. Anything above starts a legacy RLP list.
pub const MAX_TX_TYPE: u8 = 0x7f;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    LegacyTransaction(LegacyTransaction),
    EIP2930Transaction(EIP2930Transaction),
    EIP1559Transaction(EIP1559Transaction),
    EIP4844Transaction(EIP4844Transaction),
    EIP7702Transaction(EIP7702Transaction),
}

/// Pre-EIP-2718 transaction. `v` packs the chain id when EIP-155 applies.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LegacyTransaction {
    pub nonce: Quantity,
    pub gas_price: Quantity,
    pub gas: Quantity,
    pub to: TxKind,
    pub value: Quantity,
    pub data: Data,
    pub v: Quantity,
    pub r: U256,
    pub s: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EIP2930Transaction {
    pub chain_id: Quantity,
    pub nonce: Quantity,
    pub gas_price: Quantity,
    pub gas_limit: Quantity,
    pub to: TxKind,
    pub value: Quantity,
    pub data: Data,
    pub access_list: AccessList,
    pub signature_y_parity: bool,
    pub signature_r: U256,
    pub signature_s: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EIP1559Transaction {
    pub chain_id: Quantity,
    pub nonce: Quantity,
    pub max_priority_fee_per_gas: Quantity,
    pub max_fee_per_gas: Quantity,
    pub gas_limit: Quantity,
    pub to: TxKind,
    pub value: Quantity,
    pub data: Data,
    pub access_list: AccessList,
    pub signature_y_parity: bool,
    pub signature_r: U256,
    pub signature_s: U256,
}

/// Blob transaction in payload-body form. The sidecar travels separately, see [`BlobsBundle`].
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EIP4844Transaction {
    pub chain_id: Quantity,
    pub nonce: Quantity,
    pub max_priority_fee_per_gas: Quantity,
    pub max_fee_per_gas: Quantity,
    pub gas: Quantity,
    pub to: TxKind,
    pub value: Quantity,
    pub data: Data,
    pub access_list: AccessList,
    pub max_fee_per_blob_gas: Quantity,
    pub blob_versioned_hashes: Vec<H256>,
    pub signature_y_parity: bool,
    pub signature_r: U256,
    pub signature_s: U256,
}

/// Set-code transaction. The destination is mandatory.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EIP7702Transaction {
    pub chain_id: Quantity,
    pub nonce: Quantity,
    pub max_priority_fee_per_gas: Quantity,
    pub max_fee_per_gas: Quantity,
    pub gas_limit: Quantity,
    pub destination: Address,
    pub value: Quantity,
    pub data: Data,
    pub access_list: AccessList,
    pub authorization_list: AuthorizationList,
    pub signature_y_parity: bool,
    pub signature_r: U256,
    pub signature_s: U256,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TxType {
    #[default]
    Legacy = 0x00,
    EIP2930 = 0x01,
    EIP1559 = 0x02,
    EIP4844 = 0x03,
    EIP7702 = 0x04,
}

impl TxType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Legacy),
            0x01 => Some(Self::EIP2930),
            0x02 => Some(Self::EIP1559),
            0x03 => Some(Self::EIP4844),
            0x04 => Some(Self::EIP7702),
            _ => None,
        }
    }
}

impl Serialize for TxType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#x}", *self as u8))
    }
}

impl<'de> Deserialize<'de> for TxType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let quantity = Quantity::deserialize(deserializer)?;
        quantity
            .as_u64()
            .and_then(|ty| u8::try_from(ty).ok())
            .and_then(TxType::from_u8)
            .ok_or_else(|| D::Error::custom(format!("unsupported transaction type {quantity}")))
    }
}

/// The transaction's kind: call or create.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TxKind {
    Call(Address),
    #[default]
    Create,
}

impl TxKind {
    pub fn to_address(&self) -> Option<Address> {
        match self {
            TxKind::Call(address) => Some(*address),
            TxKind::Create => None,
        }
    }
}

impl From<Option<Address>> for TxKind {
    fn from(value: Option<Address>) -> Self {
        value.map_or(TxKind::Create, TxKind::Call)
    }
}

impl RLPEncode for TxKind {
    fn encode(&self, buf: &mut dyn BufMut) {
        match self {
            Self::Call(address) => address.encode(buf),
            Self::Create => buf.put_u8(RLP_NULL),
        }
    }
}

impl RLPDecode for TxKind {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let first_byte = rlp.first().ok_or(RLPDecodeError::Truncated)?;
        if *first_byte == RLP_NULL {
            return Ok((Self::Create, &rlp[1..]));
        }
        Address::decode_unfinished(rlp).map(|(t, rest)| (Self::Call(t), rest))
    }
}

impl RLPEncode for Transaction {
    /// Transactions inside a block body are encoded in the following formats:
    /// A) Legacy transactions: rlp(LegacyTransaction)
    /// B) Non legacy transactions: rlp(Bytes) where Bytes is the raw `type || rlp(payload)` envelope.
    fn encode(&self, buf: &mut dyn BufMut) {
        match self {
            Transaction::LegacyTransaction(t) => t.encode(buf),
            tx => Bytes::from(tx.encode_raw()).encode(buf),
        };
    }
}

impl RLPEncode for LegacyTransaction {
    fn encode(&self, buf: &mut dyn BufMut) {
        Encoder::new(buf)
            .encode_field(&self.nonce)
            .encode_field(&self.gas_price)
            .encode_field(&self.gas)
            .encode_field(&self.to)
            .encode_field(&self.value)
            .encode_field(&self.data)
            .encode_field(&self.v)
            .encode_field(&self.r)
            .encode_field(&self.s)
            .finish();
    }
}

impl RLPEncode for EIP2930Transaction {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.encode_unsigned_fields(Encoder::new(buf))
            .encode_field(&self.signature_y_parity)
            .encode_field(&self.signature_r)
            .encode_field(&self.signature_s)
            .finish();
    }
}

impl RLPEncode for EIP1559Transaction {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.encode_unsigned_fields(Encoder::new(buf))
            .encode_field(&self.signature_y_parity)
            .encode_field(&self.signature_r)
            .encode_field(&self.signature_s)
            .finish();
    }
}

impl RLPEncode for EIP4844Transaction {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.encode_unsigned_fields(Encoder::new(buf))
            .encode_field(&self.signature_y_parity)
            .encode_field(&self.signature_r)
            .encode_field(&self.signature_s)
            .finish();
    }
}

impl RLPEncode for EIP7702Transaction {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.encode_unsigned_fields(Encoder::new(buf))
            .encode_field(&self.signature_y_parity)
            .encode_field(&self.signature_r)
            .encode_field(&self.signature_s)
            .finish();
    }
}

impl EIP2930Transaction {
    fn encode_unsigned_fields<'a>(&self, encoder: Encoder<'a>) -> Encoder<'a> {
        encoder
            .encode_field(&self.chain_id)
            .encode_field(&self.nonce)
            .encode_field(&self.gas_price)
            .encode_field(&self.gas_limit)
            .encode_field(&self.to)
            .encode_field(&self.value)
            .encode_field(&self.data)
            .encode_field(&self.access_list)
    }
}

impl EIP1559Transaction {
    fn encode_unsigned_fields<'a>(&self, encoder: Encoder<'a>) -> Encoder<'a> {
        encoder
            .encode_field(&self.chain_id)
            .encode_field(&self.nonce)
            .encode_field(&self.max_priority_fee_per_gas)
            .encode_field(&self.max_fee_per_gas)
            .encode_field(&self.gas_limit)
            .encode_field(&self.to)
            .encode_field(&self.value)
            .encode_field(&self.data)
            .encode_field(&self.access_list)
    }
}

impl EIP4844Transaction {
    fn encode_unsigned_fields<'a>(&self, encoder: Encoder<'a>) -> Encoder<'a> {
        encoder
            .encode_field(&self.chain_id)
            .encode_field(&self.nonce)
            .encode_field(&self.max_priority_fee_per_gas)
            .encode_field(&self.max_fee_per_gas)
            .encode_field(&self.gas)
            .encode_field(&self.to)
            .encode_field(&self.value)
            .encode_field(&self.data)
            .encode_field(&self.access_list)
            .encode_field(&self.max_fee_per_blob_gas)
            .encode_field(&self.blob_versioned_hashes)
    }
}

impl EIP7702Transaction {
    fn encode_unsigned_fields<'a>(&self, encoder: Encoder<'a>) -> Encoder<'a> {
        encoder
            .encode_field(&self.chain_id)
            .encode_field(&self.nonce)
            .encode_field(&self.max_priority_fee_per_gas)
            .encode_field(&self.max_fee_per_gas)
            .encode_field(&self.gas_limit)
            .encode_field(&self.destination)
            .encode_field(&self.value)
            .encode_field(&self.data)
            .encode_field(&self.access_list)
            .encode_field(&self.authorization_list)
    }
}

/// Splits `rlp` into its list items and checks there are exactly `expected` of them
/// with nothing after the list.
pub(crate) fn expect_list_items<'a>(
    rlp: &'a [u8],
    expected: usize,
    what: &'static str,
) -> Result<Vec<&'a [u8]>, EthError> {
    let (items, rest) = decode_list_items(rlp)?;
    if !rest.is_empty() {
        return Err(RLPDecodeError::ExtraData.into());
    }
    if items.len() != expected {
        return Err(EthError::list_shape(what, items.len()));
    }
    Ok(items)
}

fn ensure_signed(r: &U256, s: &U256) -> Result<(), EthError> {
    if r.is_zero() && s.is_zero() {
        return Err(EthError::UnsupportedUnsignedTx);
    }
    Ok(())
}

impl LegacyTransaction {
    fn decode_payload(rlp: &[u8]) -> Result<Self, EthError> {
        expect_list_items(rlp, 9, "legacy transaction")?;
        let decoder = Decoder::new(rlp)?;
        let (nonce, decoder) = decoder.decode_field("nonce")?;
        let (gas_price, decoder) = decoder.decode_field("gas_price")?;
        let (gas, decoder) = decoder.decode_field("gas")?;
        let (to, decoder) = decoder.decode_field("to")?;
        let (value, decoder) = decoder.decode_field("value")?;
        let (data, decoder) = decoder.decode_field("data")?;
        let (v, decoder) = decoder.decode_field("v")?;
        let (r, decoder) = decoder.decode_field("r")?;
        let (s, decoder) = decoder.decode_field("s")?;
        decoder.finish()?;
        ensure_signed(&r, &s)?;

        let tx = LegacyTransaction {
            nonce,
            gas_price,
            gas,
            to,
            value,
            data,
            v,
            r,
            s,
        };
        // Reject a `v` that packs neither a pre-EIP-155 nor an EIP-155 recovery id.
        unpack_legacy_v(&tx.v)?;
        Ok(tx)
    }

    /// Chain id packed in `v`, `None` for pre-EIP-155 signatures.
    pub fn chain_id(&self) -> Result<Option<Quantity>, EthError> {
        unpack_legacy_v(&self.v).map(|(chain_id, _)| chain_id)
    }
}

impl EIP2930Transaction {
    fn decode_payload(rlp: &[u8]) -> Result<Self, EthError> {
        expect_list_items(rlp, 11, "EIP-2930 transaction")?;
        let decoder = Decoder::new(rlp)?;
        let (chain_id, decoder) = decoder.decode_field("chain_id")?;
        let (nonce, decoder) = decoder.decode_field("nonce")?;
        let (gas_price, decoder) = decoder.decode_field("gas_price")?;
        let (gas_limit, decoder) = decoder.decode_field("gas_limit")?;
        let (to, decoder) = decoder.decode_field("to")?;
        let (value, decoder) = decoder.decode_field("value")?;
        let (data, decoder) = decoder.decode_field("data")?;
        let (access_list, decoder) = decoder.get_encoded_item()?;
        let (signature_y_parity, decoder) = decoder.decode_field("signature_y_parity")?;
        let (signature_r, decoder) = decoder.decode_field("signature_r")?;
        let (signature_s, decoder) = decoder.decode_field("signature_s")?;
        decoder.finish()?;
        ensure_signed(&signature_r, &signature_s)?;

        Ok(EIP2930Transaction {
            chain_id,
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data,
            access_list: decode_access_list(access_list)?,
            signature_y_parity,
            signature_r,
            signature_s,
        })
    }
}

impl EIP1559Transaction {
    fn decode_payload(rlp: &[u8]) -> Result<Self, EthError> {
        expect_list_items(rlp, 12, "EIP-1559 transaction")?;
        let decoder = Decoder::new(rlp)?;
        let (chain_id, decoder) = decoder.decode_field("chain_id")?;
        let (nonce, decoder) = decoder.decode_field("nonce")?;
        let (max_priority_fee_per_gas, decoder) =
            decoder.decode_field("max_priority_fee_per_gas")?;
        let (max_fee_per_gas, decoder) = decoder.decode_field("max_fee_per_gas")?;
        let (gas_limit, decoder) = decoder.decode_field("gas_limit")?;
        let (to, decoder) = decoder.decode_field("to")?;
        let (value, decoder) = decoder.decode_field("value")?;
        let (data, decoder) = decoder.decode_field("data")?;
        let (access_list, decoder) = decoder.get_encoded_item()?;
        let (signature_y_parity, decoder) = decoder.decode_field("signature_y_parity")?;
        let (signature_r, decoder) = decoder.decode_field("signature_r")?;
        let (signature_s, decoder) = decoder.decode_field("signature_s")?;
        decoder.finish()?;
        ensure_signed(&signature_r, &signature_s)?;

        Ok(EIP1559Transaction {
            chain_id,
            nonce,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            gas_limit,
            to,
            value,
            data,
            access_list: decode_access_list(access_list)?,
            signature_y_parity,
            signature_r,
            signature_s,
        })
    }
}

impl EIP4844Transaction {
    fn decode_payload(rlp: &[u8]) -> Result<Self, EthError> {
        expect_list_items(rlp, 14, "EIP-4844 transaction")?;
        let decoder = Decoder::new(rlp)?;
        let (chain_id, decoder) = decoder.decode_field("chain_id")?;
        let (nonce, decoder) = decoder.decode_field("nonce")?;
        let (max_priority_fee_per_gas, decoder) =
            decoder.decode_field("max_priority_fee_per_gas")?;
        let (max_fee_per_gas, decoder) = decoder.decode_field("max_fee_per_gas")?;
        let (gas, decoder) = decoder.decode_field("gas")?;
        let (to, decoder) = decoder.decode_field("to")?;
        let (value, decoder) = decoder.decode_field("value")?;
        let (data, decoder) = decoder.decode_field("data")?;
        let (access_list, decoder) = decoder.get_encoded_item()?;
        let (max_fee_per_blob_gas, decoder) = decoder.decode_field("max_fee_per_blob_gas")?;
        let (blob_versioned_hashes, decoder) = decoder.decode_field("blob_versioned_hashes")?;
        let (signature_y_parity, decoder) = decoder.decode_field("signature_y_parity")?;
        let (signature_r, decoder) = decoder.decode_field("signature_r")?;
        let (signature_s, decoder) = decoder.decode_field("signature_s")?;
        decoder.finish()?;
        ensure_signed(&signature_r, &signature_s)?;

        Ok(EIP4844Transaction {
            chain_id,
            nonce,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            gas,
            to,
            value,
            data,
            access_list: decode_access_list(access_list)?,
            max_fee_per_blob_gas,
            blob_versioned_hashes,
            signature_y_parity,
            signature_r,
            signature_s,
        })
    }

    /// Accepts the payload-body form (14 items) and the network form
    /// `[payload-body, blobs, commitments, proofs]`.
    fn decode_envelope(rlp: &[u8]) -> Result<(Self, Option<BlobsBundle>), EthError> {
        let (items, rest) = decode_list_items(rlp)?;
        if !rest.is_empty() {
            return Err(RLPDecodeError::ExtraData.into());
        }
        match items.as_slice() {
            [body, blobs, commitments, proofs] if is_list(body) => {
                let tx = Self::decode_payload(body)?;
                let bundle = BlobsBundle {
                    blobs: Vec::<Data>::decode(blobs)?,
                    commitments: Vec::<[u8; 48]>::decode(commitments)?,
                    proofs: Vec::<[u8; 48]>::decode(proofs)?,
                };
                bundle.validate(&tx.blob_versioned_hashes)?;
                trace!(blobs = bundle.blobs.len(), "Decoded blob sidecar");
                Ok((tx, Some(bundle)))
            }
            items if items.len() == 14 => Ok((Self::decode_payload(rlp)?, None)),
            items => Err(EthError::list_shape("EIP-4844 transaction", items.len())),
        }
    }
}

impl EIP7702Transaction {
    fn decode_payload(rlp: &[u8]) -> Result<Self, EthError> {
        expect_list_items(rlp, 13, "EIP-7702 transaction")?;
        let decoder = Decoder::new(rlp)?;
        let (chain_id, decoder) = decoder.decode_field("chain_id")?;
        let (nonce, decoder) = decoder.decode_field("nonce")?;
        let (max_priority_fee_per_gas, decoder) =
            decoder.decode_field("max_priority_fee_per_gas")?;
        let (max_fee_per_gas, decoder) = decoder.decode_field("max_fee_per_gas")?;
        let (gas_limit, decoder) = decoder.decode_field("gas_limit")?;
        let (destination, decoder) = decoder.decode_field::<TxKind>("destination")?;
        let (value, decoder) = decoder.decode_field("value")?;
        let (data, decoder) = decoder.decode_field("data")?;
        let (access_list, decoder) = decoder.get_encoded_item()?;
        let (authorization_list, decoder) = decoder.get_encoded_item()?;
        let (signature_y_parity, decoder) = decoder.decode_field("signature_y_parity")?;
        let (signature_r, decoder) = decoder.decode_field("signature_r")?;
        let (signature_s, decoder) = decoder.decode_field("signature_s")?;
        decoder.finish()?;
        ensure_signed(&signature_r, &signature_s)?;

        let TxKind::Call(destination) = destination else {
            return Err(EthError::MissingRecipient);
        };
        Ok(EIP7702Transaction {
            chain_id,
            nonce,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            gas_limit,
            destination,
            value,
            data,
            access_list: decode_access_list(access_list)?,
            authorization_list: decode_authorization_list(authorization_list)?,
            signature_y_parity,
            signature_r,
            signature_s,
        })
    }
}

/// Splits an EIP-155 packed `v` into the chain id (`None` before EIP-155) and the recovery bit.
pub fn unpack_legacy_v(v: &Quantity) -> Result<(Option<Quantity>, u8), EthError> {
    match v.as_u64() {
        Some(v @ (27 | 28)) => return Ok((None, (v - 27) as u8)),
        Some(v @ (0 | 1)) => return Ok((None, v as u8)),
        Some(v) if v < 35 => {
            return Err(EthError::SignatureInvalid(format!(
                "legacy v {v} carries no recovery id"
            )))
        }
        _ => {}
    }
    // v = 35 + 2 * chain_id + recovery
    let offset = v.as_biguint() - BigUint::from(35u8);
    let chain_id = offset.clone() / 2u32;
    let recovery = u8::from(offset % 2u32 != BigUint::default());
    Ok((Some(Quantity::from(chain_id)), recovery))
}

/// Packs a chain id and recovery bit into a legacy `v`. No chain id gives the pre-EIP-155 27/28 form.
pub fn pack_legacy_v(chain_id: Option<&Quantity>, recovery: u8) -> Quantity {
    match chain_id {
        Some(chain_id) => Quantity::from(
            chain_id.as_biguint().clone() * 2u32 + BigUint::from(35u8) + BigUint::from(recovery),
        ),
        None => Quantity::from(27 + recovery as u64),
    }
}

impl Transaction {
    /// Decodes a `0x`-prefixed raw transaction, as accepted by `eth_sendRawTransaction`.
    pub fn decode_raw(raw: &str) -> Result<Self, EthError> {
        Self::decode_raw_bytes(&parse_hex(raw, None)?)
    }

    /// Decodes a raw transaction.
    /// Based on [EIP-2718]
    /// Transactions can be encoded in the following formats:
    /// A) `TransactionType || Transaction` (Where Transaction type is an 8-bit number between 0 and 0x7f, and Transaction is an rlp encoded transaction of type TransactionType)
    /// B) `LegacyTransaction` (An rlp encoded LegacyTransaction)
    ///
    /// A blob transaction in network form decodes to its payload body; use
    /// [`Transaction::decode_with_sidecar`] to keep the blobs.
    pub fn decode_raw_bytes(bytes: &[u8]) -> Result<Self, EthError> {
        Self::decode_with_sidecar(bytes).map(|(tx, _)| tx)
    }

    /// Same as [`Transaction::decode_raw_bytes`], also returning the blob sidecar of a
    /// network-form blob transaction.
    pub fn decode_with_sidecar(bytes: &[u8]) -> Result<(Self, Option<BlobsBundle>), EthError> {
        let first = *bytes.first().ok_or(RLPDecodeError::Truncated)?;
        if first > MAX_TX_TYPE {
            debug!("Decoding legacy transaction");
            let tx = LegacyTransaction::decode_payload(bytes)?;
            return Ok((Transaction::LegacyTransaction(tx), None));
        }

        let payload = &bytes[1..];
        let tx_type = match TxType::from_u8(first) {
            Some(TxType::Legacy) | None => return Err(EthError::UnsupportedType(first)),
            Some(tx_type) => tx_type,
        };
        debug!(?tx_type, "Decoding typed transaction");
        let decoded = match tx_type {
            TxType::EIP2930 => (
                Transaction::EIP2930Transaction(EIP2930Transaction::decode_payload(payload)?),
                None,
            ),
            TxType::EIP1559 => (
                Transaction::EIP1559Transaction(EIP1559Transaction::decode_payload(payload)?),
                None,
            ),
            TxType::EIP4844 => {
                let (tx, bundle) = EIP4844Transaction::decode_envelope(payload)?;
                (Transaction::EIP4844Transaction(tx), bundle)
            }
            TxType::EIP7702 => (
                Transaction::EIP7702Transaction(EIP7702Transaction::decode_payload(payload)?),
                None,
            ),
            TxType::Legacy => return Err(EthError::UnsupportedType(first)),
        };
        Ok(decoded)
    }

    /// Raw form: legacy is the RLP list, typed is `type || rlp(payload-body)`.
    pub fn encode_raw(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            Transaction::LegacyTransaction(t) => t.encode(&mut buf),
            Transaction::EIP2930Transaction(t) => {
                buf.put_u8(TxType::EIP2930 as u8);
                t.encode(&mut buf);
            }
            Transaction::EIP1559Transaction(t) => {
                buf.put_u8(TxType::EIP1559 as u8);
                t.encode(&mut buf);
            }
            Transaction::EIP4844Transaction(t) => {
                buf.put_u8(TxType::EIP4844 as u8);
                t.encode(&mut buf);
            }
            Transaction::EIP7702Transaction(t) => {
                buf.put_u8(TxType::EIP7702 as u8);
                t.encode(&mut buf);
            }
        }
        buf
    }

    /// Lowercase `0x` hex of [`Transaction::encode_raw`].
    pub fn raw_representation(&self) -> String {
        format!("0x{}", hex::encode(self.encode_raw()))
    }

    /// Pre-image of the signing hash.
    pub fn signing_payload(&self) -> Result<Vec<u8>, EthError> {
        let mut buf = Vec::new();
        match self {
            Transaction::LegacyTransaction(tx) => {
                let encoder = Encoder::new(&mut buf)
                    .encode_field(&tx.nonce)
                    .encode_field(&tx.gas_price)
                    .encode_field(&tx.gas)
                    .encode_field(&tx.to)
                    .encode_field(&tx.value)
                    .encode_field(&tx.data);
                match tx.chain_id()? {
                    Some(chain_id) if !chain_id.is_zero() => encoder
                        .encode_field(&chain_id)
                        .encode_field(&Bytes::new())
                        .encode_field(&Bytes::new())
                        .finish(),
                    _ => encoder.finish(),
                }
            }
            Transaction::EIP2930Transaction(tx) => {
                buf.put_u8(TxType::EIP2930 as u8);
                tx.encode_unsigned_fields(Encoder::new(&mut buf)).finish();
            }
            Transaction::EIP1559Transaction(tx) => {
                buf.put_u8(TxType::EIP1559 as u8);
                tx.encode_unsigned_fields(Encoder::new(&mut buf)).finish();
            }
            Transaction::EIP4844Transaction(tx) => {
                buf.put_u8(TxType::EIP4844 as u8);
                tx.encode_unsigned_fields(Encoder::new(&mut buf)).finish();
            }
            Transaction::EIP7702Transaction(tx) => {
                buf.put_u8(TxType::EIP7702 as u8);
                tx.encode_unsigned_fields(Encoder::new(&mut buf)).finish();
            }
        }
        Ok(buf)
    }

    pub fn signing_hash(&self) -> Result<H256, EthError> {
        self.signing_payload().map(crypto::keccak256)
    }

    /// keccak256 of the raw form.
    pub fn hash(&self) -> H256 {
        crypto::keccak256(self.encode_raw())
    }

    /// Uncompressed public key of the signer.
    pub fn recover_public_key(&self) -> Result<[u8; crypto::UNCOMPRESSED_PUBKEY_LEN], EthError> {
        let (r, s) = self.signature();
        crypto::ecdsa_recover(&self.signing_hash()?, &r, &s, self.recovery_id()?)
    }

    pub fn sender(&self) -> Result<Address, EthError> {
        crypto::address_from_pubkey(&self.recover_public_key()?)
    }

    /// Parity bit of the signature, unpacked from `v` for legacy transactions.
    pub fn recovery_id(&self) -> Result<u8, EthError> {
        match self {
            Transaction::LegacyTransaction(tx) => unpack_legacy_v(&tx.v).map(|(_, bit)| bit),
            Transaction::EIP2930Transaction(tx) => Ok(tx.signature_y_parity as u8),
            Transaction::EIP1559Transaction(tx) => Ok(tx.signature_y_parity as u8),
            Transaction::EIP4844Transaction(tx) => Ok(tx.signature_y_parity as u8),
            Transaction::EIP7702Transaction(tx) => Ok(tx.signature_y_parity as u8),
        }
    }

    /// Wire `v`: the packed value for legacy transactions, `yParity` otherwise.
    pub fn v(&self) -> Quantity {
        match self {
            Transaction::LegacyTransaction(tx) => tx.v.clone(),
            Transaction::EIP2930Transaction(tx) => Quantity::from(tx.signature_y_parity as u64),
            Transaction::EIP1559Transaction(tx) => Quantity::from(tx.signature_y_parity as u64),
            Transaction::EIP4844Transaction(tx) => Quantity::from(tx.signature_y_parity as u64),
            Transaction::EIP7702Transaction(tx) => Quantity::from(tx.signature_y_parity as u64),
        }
    }

    pub fn signature(&self) -> (U256, U256) {
        match self {
            Transaction::LegacyTransaction(tx) => (tx.r, tx.s),
            Transaction::EIP2930Transaction(tx) => (tx.signature_r, tx.signature_s),
            Transaction::EIP1559Transaction(tx) => (tx.signature_r, tx.signature_s),
            Transaction::EIP4844Transaction(tx) => (tx.signature_r, tx.signature_s),
            Transaction::EIP7702Transaction(tx) => (tx.signature_r, tx.signature_s),
        }
    }

    /// Chain id the transaction is bound to; zero for pre-EIP-155 legacy transactions.
    pub fn chain_id(&self) -> Result<Quantity, EthError> {
        match self.replay_protected_chain_id() {
            Err(EthError::ChainIdUnavailable) => Ok(Quantity::zero()),
            other => other,
        }
    }

    /// Same as [`Transaction::chain_id`], failing with [`EthError::ChainIdUnavailable`]
    /// when the signature does not commit to a chain.
    pub fn replay_protected_chain_id(&self) -> Result<Quantity, EthError> {
        match self {
            Transaction::LegacyTransaction(tx) => tx.chain_id()?.ok_or(EthError::ChainIdUnavailable),
            Transaction::EIP2930Transaction(tx) => Ok(tx.chain_id.clone()),
            Transaction::EIP1559Transaction(tx) => Ok(tx.chain_id.clone()),
            Transaction::EIP4844Transaction(tx) => Ok(tx.chain_id.clone()),
            Transaction::EIP7702Transaction(tx) => Ok(tx.chain_id.clone()),
        }
    }

    pub fn tx_type(&self) -> TxType {
        match self {
            Transaction::LegacyTransaction(_) => TxType::Legacy,
            Transaction::EIP2930Transaction(_) => TxType::EIP2930,
            Transaction::EIP1559Transaction(_) => TxType::EIP1559,
            Transaction::EIP4844Transaction(_) => TxType::EIP4844,
            Transaction::EIP7702Transaction(_) => TxType::EIP7702,
        }
    }

    pub fn nonce(&self) -> &Quantity {
        match self {
            Transaction::LegacyTransaction(tx) => &tx.nonce,
            Transaction::EIP2930Transaction(tx) => &tx.nonce,
            Transaction::EIP1559Transaction(tx) => &tx.nonce,
            Transaction::EIP4844Transaction(tx) => &tx.nonce,
            Transaction::EIP7702Transaction(tx) => &tx.nonce,
        }
    }

    pub fn gas_limit(&self) -> &Quantity {
        match self {
            Transaction::LegacyTransaction(tx) => &tx.gas,
            Transaction::EIP2930Transaction(tx) => &tx.gas_limit,
            Transaction::EIP1559Transaction(tx) => &tx.gas_limit,
            Transaction::EIP4844Transaction(tx) => &tx.gas,
            Transaction::EIP7702Transaction(tx) => &tx.gas_limit,
        }
    }

    /// Gas price of legacy and access-list transactions.
    pub fn gas_price(&self) -> Option<&Quantity> {
        match self {
            Transaction::LegacyTransaction(tx) => Some(&tx.gas_price),
            Transaction::EIP2930Transaction(tx) => Some(&tx.gas_price),
            _ => None,
        }
    }

    pub fn max_fee_per_gas(&self) -> Option<&Quantity> {
        match self {
            Transaction::LegacyTransaction(_) | Transaction::EIP2930Transaction(_) => None,
            Transaction::EIP1559Transaction(tx) => Some(&tx.max_fee_per_gas),
            Transaction::EIP4844Transaction(tx) => Some(&tx.max_fee_per_gas),
            Transaction::EIP7702Transaction(tx) => Some(&tx.max_fee_per_gas),
        }
    }

    pub fn max_priority_fee(&self) -> Option<&Quantity> {
        match self {
            Transaction::LegacyTransaction(_) | Transaction::EIP2930Transaction(_) => None,
            Transaction::EIP1559Transaction(tx) => Some(&tx.max_priority_fee_per_gas),
            Transaction::EIP4844Transaction(tx) => Some(&tx.max_priority_fee_per_gas),
            Transaction::EIP7702Transaction(tx) => Some(&tx.max_priority_fee_per_gas),
        }
    }

    pub fn to(&self) -> TxKind {
        match self {
            Transaction::LegacyTransaction(tx) => tx.to,
            Transaction::EIP2930Transaction(tx) => tx.to,
            Transaction::EIP1559Transaction(tx) => tx.to,
            Transaction::EIP4844Transaction(tx) => tx.to,
            Transaction::EIP7702Transaction(tx) => TxKind::Call(tx.destination),
        }
    }

    pub fn is_contract_creation(&self) -> bool {
        matches!(self.to(), TxKind::Create)
    }

    pub fn value(&self) -> &Quantity {
        match self {
            Transaction::LegacyTransaction(tx) => &tx.value,
            Transaction::EIP2930Transaction(tx) => &tx.value,
            Transaction::EIP1559Transaction(tx) => &tx.value,
            Transaction::EIP4844Transaction(tx) => &tx.value,
            Transaction::EIP7702Transaction(tx) => &tx.value,
        }
    }

    pub fn data(&self) -> &Data {
        match self {
            Transaction::LegacyTransaction(tx) => &tx.data,
            Transaction::EIP2930Transaction(tx) => &tx.data,
            Transaction::EIP1559Transaction(tx) => &tx.data,
            Transaction::EIP4844Transaction(tx) => &tx.data,
            Transaction::EIP7702Transaction(tx) => &tx.data,
        }
    }

    /// Access list of typed transactions; legacy transactions have none.
    pub fn access_list(&self) -> Option<&[AccessListEntry]> {
        match self {
            Transaction::LegacyTransaction(_) => None,
            Transaction::EIP2930Transaction(tx) => Some(&tx.access_list),
            Transaction::EIP1559Transaction(tx) => Some(&tx.access_list),
            Transaction::EIP4844Transaction(tx) => Some(&tx.access_list),
            Transaction::EIP7702Transaction(tx) => Some(&tx.access_list),
        }
    }

    pub fn blob_versioned_hashes(&self) -> Option<&[H256]> {
        match self {
            Transaction::EIP4844Transaction(tx) => Some(&tx.blob_versioned_hashes),
            _ => None,
        }
    }

    pub fn max_fee_per_blob_gas(&self) -> Option<&Quantity> {
        match self {
            Transaction::EIP4844Transaction(tx) => Some(&tx.max_fee_per_blob_gas),
            _ => None,
        }
    }

    pub fn authorization_list(&self) -> Option<&AuthorizationList> {
        match self {
            Transaction::EIP7702Transaction(tx) => Some(&tx.authorization_list),
            _ => None,
        }
    }
}

/// Address of the contract deployed by `sender` at `nonce`: `keccak256(rlp([sender, nonce]))[12..]`.
pub fn create_address(sender: &Address, nonce: &Quantity) -> Address {
    let mut buf = Vec::new();
    Encoder::new(&mut buf)
        .encode_field(sender)
        .encode_field(nonce)
        .finish();
    Address::from_slice(&crypto::keccak256(buf)[12..])
}
