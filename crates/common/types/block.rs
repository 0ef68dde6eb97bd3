use ethereum_types::{Bloom, H256, H64};
use ethwire_rlp::{
    decode::{decode_bytes, decode_list_items, is_list, RLPDecode},
    encode::RLPEncode,
    error::RLPDecodeError,
    structs::{Decoder, Encoder},
};
use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, trace};

use super::{
    flavor::require, parse_hex, Address, BlockFlavor, Data, Quantity, RpcTransaction,
    Transaction, TxOrHash,
};
use crate::{crypto, errors::EthError};

/// Headers carry the 15 pre-London fields plus up to five fork additions.
const MIN_HEADER_ITEMS: usize = 15;
const MAX_HEADER_ITEMS: usize = 20;

/// Header part of a block on the chain, in its RLP field order.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BlockHeader {
    pub parent_hash: H256,
    pub ommers_hash: H256, // ommer = uncle
    pub coinbase: Address,
    pub state_root: H256,
    pub transactions_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: Bloom,
    pub difficulty: Quantity,
    pub number: Quantity,
    pub gas_limit: Quantity,
    pub gas_used: Quantity,
    pub timestamp: Quantity,
    pub extra_data: Data,
    pub prev_randao: H256,
    pub nonce: H64,
    pub base_fee_per_gas: Option<Quantity>,
    pub withdrawals_root: Option<H256>,
    pub blob_gas_used: Option<Quantity>,
    pub excess_blob_gas: Option<Quantity>,
    pub parent_beacon_block_root: Option<H256>,
}

impl RLPEncode for BlockHeader {
    fn encode(&self, buf: &mut dyn bytes::BufMut) {
        Encoder::new(buf)
            .encode_field(&self.parent_hash)
            .encode_field(&self.ommers_hash)
            .encode_field(&self.coinbase)
            .encode_field(&self.state_root)
            .encode_field(&self.transactions_root)
            .encode_field(&self.receipts_root)
            .encode_field(&self.logs_bloom)
            .encode_field(&self.difficulty)
            .encode_field(&self.number)
            .encode_field(&self.gas_limit)
            .encode_field(&self.gas_used)
            .encode_field(&self.timestamp)
            .encode_field(&self.extra_data)
            .encode_field(&self.prev_randao)
            .encode_field(&self.nonce)
            .encode_optional_field(&self.base_fee_per_gas)
            .encode_optional_field(&self.withdrawals_root)
            .encode_optional_field(&self.blob_gas_used)
            .encode_optional_field(&self.excess_blob_gas)
            .encode_optional_field(&self.parent_beacon_block_root)
            .finish();
    }
}

/// Decodes the next field if the list still has one.
fn decode_trailing<'a, T: RLPDecode>(
    decoder: Decoder<'a>,
    name: &str,
) -> Result<(Option<T>, Decoder<'a>), RLPDecodeError> {
    if decoder.is_done() {
        return Ok((None, decoder));
    }
    let (value, decoder) = decoder.decode_field(name)?;
    Ok((Some(value), decoder))
}

impl RLPDecode for BlockHeader {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let decoder = Decoder::new(rlp)?;
        let (parent_hash, decoder) = decoder.decode_field("parent_hash")?;
        let (ommers_hash, decoder) = decoder.decode_field("ommers_hash")?;
        let (coinbase, decoder) = decoder.decode_field("coinbase")?;
        let (state_root, decoder) = decoder.decode_field("state_root")?;
        let (transactions_root, decoder) = decoder.decode_field("transactions_root")?;
        let (receipts_root, decoder) = decoder.decode_field("receipts_root")?;
        let (logs_bloom, decoder) = decoder.decode_field("logs_bloom")?;
        let (difficulty, decoder) = decoder.decode_field("difficulty")?;
        let (number, decoder) = decoder.decode_field("number")?;
        let (gas_limit, decoder) = decoder.decode_field("gas_limit")?;
        let (gas_used, decoder) = decoder.decode_field("gas_used")?;
        let (timestamp, decoder) = decoder.decode_field("timestamp")?;
        let (extra_data, decoder) = decoder.decode_field("extra_data")?;
        let (prev_randao, decoder) = decoder.decode_field("prev_randao")?;
        let (nonce, decoder) = decoder.decode_field("nonce")?;
        let (base_fee_per_gas, decoder) = decode_trailing(decoder, "base_fee_per_gas")?;
        let (withdrawals_root, decoder) = decode_trailing(decoder, "withdrawals_root")?;
        let (blob_gas_used, decoder) = decode_trailing(decoder, "blob_gas_used")?;
        let (excess_blob_gas, decoder) = decode_trailing(decoder, "excess_blob_gas")?;
        let (parent_beacon_block_root, decoder) =
            decode_trailing(decoder, "parent_beacon_block_root")?;

        Ok((
            BlockHeader {
                parent_hash,
                ommers_hash,
                coinbase,
                state_root,
                transactions_root,
                receipts_root,
                logs_bloom,
                difficulty,
                number,
                gas_limit,
                gas_used,
                timestamp,
                extra_data,
                prev_randao,
                nonce,
                base_fee_per_gas,
                withdrawals_root,
                blob_gas_used,
                excess_blob_gas,
                parent_beacon_block_root,
            },
            decoder.finish()?,
        ))
    }
}

impl BlockHeader {
    pub fn compute_block_hash(&self) -> H256 {
        crypto::keccak256(&self.encode_to_vec())
    }
}

/// Validator withdrawal pushed from the beacon chain (EIP-4895).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub index: Quantity,
    pub validator_index: Quantity,
    pub address: Address,
    pub amount: Quantity,
}

impl RLPEncode for Withdrawal {
    fn encode(&self, buf: &mut dyn bytes::BufMut) {
        Encoder::new(buf)
            .encode_field(&self.index)
            .encode_field(&self.validator_index)
            .encode_field(&self.address)
            .encode_field(&self.amount)
            .finish();
    }
}

impl RLPDecode for Withdrawal {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let decoder = Decoder::new(rlp)?;
        let (index, decoder) = decoder.decode_field("index")?;
        let (validator_index, decoder) = decoder.decode_field("validator_index")?;
        let (address, decoder) = decoder.decode_field("address")?;
        let (amount, decoder) = decoder.decode_field("amount")?;
        Ok((
            Withdrawal {
                index,
                validator_index,
                address,
                amount,
            },
            decoder.finish()?,
        ))
    }
}

/// Header as reported over JSON-RPC, shared by blocks, uncles and new-heads
/// notifications. Seal and parity fields are optional and select the flavor.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderFields {
    /// `null` for pending blocks.
    #[serde(default)]
    pub hash: Option<H256>,
    pub parent_hash: H256,
    pub sha3_uncles: H256,
    pub miner: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Address>,
    pub state_root: H256,
    pub transactions_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: Bloom,
    pub difficulty: Quantity,
    /// `null` for pending blocks.
    #[serde(default)]
    pub number: Option<Quantity>,
    pub gas_limit: Quantity,
    pub gas_used: Quantity,
    pub timestamp: Quantity,
    pub extra_data: Data,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mix_hash: Option<H256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<H64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal_fields: Option<Vec<Data>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawals_root: Option<H256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_gas_used: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excess_blob_gas: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_beacon_block_root: Option<H256>,
}

impl HeaderFields {
    /// JSON view of a wire header, with its hash filled in.
    pub fn from_header(header: &BlockHeader) -> Self {
        HeaderFields {
            hash: Some(header.compute_block_hash()),
            parent_hash: header.parent_hash,
            sha3_uncles: header.ommers_hash,
            miner: header.coinbase,
            author: None,
            state_root: header.state_root,
            transactions_root: header.transactions_root,
            receipts_root: header.receipts_root,
            logs_bloom: header.logs_bloom,
            difficulty: header.difficulty.clone(),
            number: Some(header.number.clone()),
            gas_limit: header.gas_limit.clone(),
            gas_used: header.gas_used.clone(),
            timestamp: header.timestamp.clone(),
            extra_data: header.extra_data.clone(),
            mix_hash: Some(header.prev_randao),
            nonce: Some(header.nonce),
            seal_fields: None,
            step: None,
            signature: None,
            base_fee_per_gas: header.base_fee_per_gas.clone(),
            withdrawals_root: header.withdrawals_root,
            blob_gas_used: header.blob_gas_used.clone(),
            excess_blob_gas: header.excess_blob_gas.clone(),
            parent_beacon_block_root: header.parent_beacon_block_root,
        }
    }
}

/// A block as returned by `eth_getBlockBy*`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub header: HeaderFields,
    pub flavor: BlockFlavor,
    pub total_difficulty: Option<Quantity>,
    pub size: Option<Quantity>,
    pub transactions: Vec<TxOrHash>,
    pub uncles: Vec<H256>,
    pub withdrawals: Option<Vec<Withdrawal>>,
}

impl Block {
    /// Decodes `rlp([header, transactions, uncles])`, with a trailing withdrawals
    /// list when the header has a withdrawals root.
    pub fn decode_raw(raw: &str) -> Result<Self, EthError> {
        Self::decode_raw_bytes(&parse_hex(raw, None)?)
    }

    pub fn decode_raw_bytes(bytes: &[u8]) -> Result<Self, EthError> {
        let (items, rest) = decode_list_items(bytes)?;
        if !rest.is_empty() {
            return Err(RLPDecodeError::ExtraData.into());
        }
        if !(3..=4).contains(&items.len()) {
            return Err(EthError::list_shape("block", items.len()));
        }

        let (header_items, _) = decode_list_items(items[0])?;
        if !(MIN_HEADER_ITEMS..=MAX_HEADER_ITEMS).contains(&header_items.len()) {
            return Err(EthError::list_shape("block header", header_items.len()));
        }
        let header = BlockHeader::decode(items[0])?;
        if header.withdrawals_root.is_some() != (items.len() == 4) {
            return Err(EthError::list_shape("block", items.len()));
        }
        let hash = crypto::keccak256(items[0]);
        trace!(?hash, number = %header.number, "Decoded block header");

        let (tx_items, _) = decode_list_items(items[1])?;
        let transactions = tx_items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let (tx, blobs_bundle) = if is_list(item) {
                    Transaction::decode_with_sidecar(item)?
                } else {
                    let (payload, rest) = decode_bytes(item)?;
                    if !rest.is_empty() {
                        return Err(RLPDecodeError::ExtraData.into());
                    }
                    Transaction::decode_with_sidecar(payload)?
                };
                let tx = RpcTransaction::from_transaction(tx, blobs_bundle)?
                    .with_block(hash, header.number.clone(), index);
                Ok(TxOrHash::from(tx))
            })
            .collect::<Result<Vec<_>, EthError>>()?;

        let (uncle_items, _) = decode_list_items(items[2])?;
        let uncles = uncle_items.into_iter().map(crypto::keccak256).collect();

        let withdrawals = match items.get(3) {
            Some(item) => Some(Vec::<Withdrawal>::decode(item)?),
            None => None,
        };

        debug!(
            ?hash,
            transactions = transactions.len(),
            "Decoded raw block"
        );
        let mut header = HeaderFields::from_header(&header);
        header.hash = Some(hash);
        Ok(Block {
            header,
            flavor: BlockFlavor::Geth,
            total_difficulty: None,
            size: Some(Quantity::from(bytes.len() as u64)),
            transactions,
            uncles,
            withdrawals,
        })
    }

    pub fn hash(&self) -> Option<H256> {
        self.header.hash
    }

    /// Checks flavor fields and that transactions are all hashes or all objects.
    pub fn validate(&self) -> Result<(), EthError> {
        self.flavor.validate(&self.header)?;
        let full = self.transactions.iter().filter(|tx| tx.is_full()).count();
        if full != 0 && full != self.transactions.len() {
            return Err(EthError::InvalidFlavor(
                "block mixes transaction hashes and objects".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockView<'a> {
    #[serde(flatten)]
    header: &'a HeaderFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_difficulty: Option<&'a Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a Quantity>,
    transactions: &'a [TxOrHash],
    uncles: &'a [H256],
    #[serde(skip_serializing_if = "Option::is_none")]
    withdrawals: Option<&'a [Withdrawal]>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockFields {
    #[serde(flatten)]
    header: HeaderFields,
    #[serde(default)]
    total_difficulty: Option<Quantity>,
    #[serde(default)]
    size: Option<Quantity>,
    #[serde(default)]
    transactions: Vec<TxOrHash>,
    #[serde(default)]
    uncles: Vec<H256>,
    #[serde(default)]
    withdrawals: Option<Vec<Withdrawal>>,
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.validate().map_err(S::Error::custom)?;
        // A withdrawals root makes the list mandatory, even when empty.
        let withdrawals = match (&self.withdrawals, self.header.withdrawals_root) {
            (Some(withdrawals), _) => Some(withdrawals.as_slice()),
            (None, Some(_)) => Some(&[][..]),
            (None, None) => None,
        };
        let header = self.flavor.emitted_header(&self.header);
        BlockView {
            header: &header,
            total_difficulty: self.total_difficulty.as_ref(),
            size: self.size.as_ref(),
            transactions: &self.transactions,
            uncles: &self.uncles,
            withdrawals,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = BlockFields::deserialize(deserializer)?;
        let block = Block {
            flavor: BlockFlavor::detect(&fields.header),
            header: fields.header,
            total_difficulty: fields.total_difficulty,
            size: fields.size,
            transactions: fields.transactions,
            uncles: fields.uncles,
            withdrawals: fields.withdrawals,
        };
        block.validate().map_err(D::Error::custom)?;
        Ok(block)
    }
}

/// Payload of an `eth_subscribe("newHeads")` notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewHeadsResult {
    pub header: HeaderFields,
    pub flavor: BlockFlavor,
    pub size: Option<Quantity>,
}

impl NewHeadsResult {
    pub fn validate(&self) -> Result<(), EthError> {
        self.flavor.validate(&self.header)?;
        if self.flavor.is_parity() {
            require(self.flavor, "size", self.size.is_some())?;
        }
        Ok(())
    }
}

impl From<&Block> for NewHeadsResult {
    fn from(block: &Block) -> Self {
        NewHeadsResult {
            header: block.header.clone(),
            flavor: block.flavor,
            size: block.size.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewHeadsView<'a> {
    #[serde(flatten)]
    header: &'a HeaderFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a Quantity>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewHeadsFields {
    #[serde(flatten)]
    header: HeaderFields,
    #[serde(default)]
    size: Option<Quantity>,
}

impl Serialize for NewHeadsResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.validate().map_err(S::Error::custom)?;
        let header = self.flavor.emitted_header(&self.header);
        NewHeadsView {
            header: &header,
            size: self.size.as_ref(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NewHeadsResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = NewHeadsFields::deserialize(deserializer)?;
        let heads = NewHeadsResult {
            flavor: BlockFlavor::detect(&fields.header),
            header: fields.header,
            size: fields.size,
        };
        heads.validate().map_err(D::Error::custom)?;
        Ok(heads)
    }
}

/// Uncle block as returned by `eth_getUncleBy*`: a header without transactions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Uncle {
    pub header: HeaderFields,
    pub flavor: BlockFlavor,
    pub size: Option<Quantity>,
    pub total_difficulty: Option<Quantity>,
    pub uncles: Vec<H256>,
}

impl Uncle {
    pub fn validate(&self) -> Result<(), EthError> {
        self.flavor.validate(&self.header)?;
        if self.flavor.is_parity() {
            require(self.flavor, "size", self.size.is_some())?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UncleView<'a> {
    #[serde(flatten)]
    header: &'a HeaderFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_difficulty: Option<&'a Quantity>,
    uncles: &'a [H256],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UncleFields {
    #[serde(flatten)]
    header: HeaderFields,
    #[serde(default)]
    size: Option<Quantity>,
    #[serde(default)]
    total_difficulty: Option<Quantity>,
    #[serde(default)]
    uncles: Vec<H256>,
}

impl Serialize for Uncle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.validate().map_err(S::Error::custom)?;
        let header = self.flavor.emitted_header(&self.header);
        UncleView {
            header: &header,
            size: self.size.as_ref(),
            total_difficulty: self.total_difficulty.as_ref(),
            uncles: &self.uncles,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Uncle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = UncleFields::deserialize(deserializer)?;
        let uncle = Uncle {
            flavor: BlockFlavor::detect(&fields.header),
            header: fields.header,
            size: fields.size,
            total_difficulty: fields.total_difficulty,
            uncles: fields.uncles,
        };
        uncle.validate().map_err(D::Error::custom)?;
        Ok(uncle)
    }
}
