use ethereum_types::{Bloom, H256};
use ethwire_rlp::{
    decode::RLPDecode,
    encode::RLPEncode,
    error::RLPDecodeError,
    structs::{Decoder, Encoder},
};
use serde::{
    de::Error as _, ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer,
};

use super::{logs_bloom, Address, Data, Quantity, TxType};
use crate::{errors::EthError, serde_utils};

/// Data record produced during the execution of a transaction.
/// Position fields are `None` for pending logs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: Data,
    #[serde(default)]
    pub block_number: Option<Quantity>,
    #[serde(default)]
    pub block_hash: Option<H256>,
    #[serde(default)]
    pub transaction_hash: Option<H256>,
    #[serde(default)]
    pub transaction_index: Option<Quantity>,
    #[serde(default)]
    pub log_index: Option<Quantity>,
    #[serde(default)]
    pub removed: bool,
}

impl RLPEncode for Log {
    fn encode(&self, buf: &mut dyn bytes::BufMut) {
        Encoder::new(buf)
            .encode_field(&self.address)
            .encode_field(&self.topics)
            .encode_field(&self.data)
            .finish();
    }
}

impl RLPDecode for Log {
    /// Only the consensus fields travel in RLP; position fields come back empty.
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let decoder = Decoder::new(rlp)?;
        let (address, decoder) = decoder.decode_field("address")?;
        let (topics, decoder) = decoder.decode_field("topics")?;
        let (data, decoder) = decoder.decode_field("data")?;
        let log = Log {
            address,
            topics,
            data,
            ..Default::default()
        };
        Ok((log, decoder.finish()?))
    }
}

/// Post-Byzantium receipts carry a status, earlier ones the intermediate state root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiptOutcome {
    Status(bool),
    Root(H256),
}

/// Result of a transaction, as returned by `eth_getTransactionReceipt`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub tx_type: Option<TxType>,
    pub transaction_hash: H256,
    pub transaction_index: Quantity,
    pub block_hash: H256,
    pub block_number: Quantity,
    pub from: Address,
    pub to: Option<Address>,
    pub cumulative_gas_used: Quantity,
    pub gas_used: Quantity,
    pub effective_gas_price: Option<Quantity>,
    pub contract_address: Option<Address>,
    pub logs: Vec<Log>,
    pub logs_bloom: Bloom,
    pub outcome: ReceiptOutcome,
    pub blob_gas_used: Option<Quantity>,
    pub blob_gas_price: Option<Quantity>,
}

impl Receipt {
    /// Transaction type, `Legacy` when the node did not report one.
    pub fn tx_type(&self) -> TxType {
        self.tx_type.unwrap_or(TxType::Legacy)
    }

    pub fn succeeded(&self) -> Option<bool> {
        match self.outcome {
            ReceiptOutcome::Status(status) => Some(status),
            ReceiptOutcome::Root(_) => None,
        }
    }

    pub fn compute_logs_bloom(&self) -> Bloom {
        logs_bloom(&self.logs)
    }
}

impl Serialize for Receipt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut struct_serializer = serializer.serialize_struct("Receipt", 16)?;
        if let Some(tx_type) = &self.tx_type {
            struct_serializer.serialize_field("type", tx_type)?;
        }
        struct_serializer.serialize_field("transactionHash", &self.transaction_hash)?;
        struct_serializer.serialize_field("transactionIndex", &self.transaction_index)?;
        struct_serializer.serialize_field("blockHash", &self.block_hash)?;
        struct_serializer.serialize_field("blockNumber", &self.block_number)?;
        struct_serializer.serialize_field("from", &self.from)?;
        struct_serializer.serialize_field("to", &self.to)?;
        struct_serializer.serialize_field("cumulativeGasUsed", &self.cumulative_gas_used)?;
        struct_serializer.serialize_field("gasUsed", &self.gas_used)?;
        if let Some(effective_gas_price) = &self.effective_gas_price {
            struct_serializer.serialize_field("effectiveGasPrice", effective_gas_price)?;
        }
        struct_serializer.serialize_field("contractAddress", &self.contract_address)?;
        struct_serializer.serialize_field("logs", &self.logs)?;
        struct_serializer.serialize_field("logsBloom", &self.logs_bloom)?;
        match &self.outcome {
            ReceiptOutcome::Status(status) => struct_serializer
                .serialize_field("status", &format!("{:#x}", *status as u8))?,
            ReceiptOutcome::Root(root) => struct_serializer.serialize_field("root", root)?,
        }
        if let Some(blob_gas_used) = &self.blob_gas_used {
            struct_serializer.serialize_field("blobGasUsed", blob_gas_used)?;
        }
        if let Some(blob_gas_price) = &self.blob_gas_price {
            struct_serializer.serialize_field("blobGasPrice", blob_gas_price)?;
        }
        struct_serializer.end()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptFields {
    #[serde(rename = "type")]
    tx_type: Option<TxType>,
    transaction_hash: H256,
    transaction_index: Quantity,
    block_hash: H256,
    block_number: Quantity,
    from: Address,
    to: Option<Address>,
    cumulative_gas_used: Quantity,
    gas_used: Quantity,
    effective_gas_price: Option<Quantity>,
    contract_address: Option<Address>,
    logs: Vec<Log>,
    logs_bloom: Bloom,
    #[serde(default, with = "serde_utils::bool::opt")]
    status: Option<bool>,
    root: Option<H256>,
    blob_gas_used: Option<Quantity>,
    blob_gas_price: Option<Quantity>,
}

impl<'de> Deserialize<'de> for Receipt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = ReceiptFields::deserialize(deserializer)?;
        let outcome = match (fields.status, fields.root) {
            (Some(status), None) => ReceiptOutcome::Status(status),
            (None, Some(root)) => ReceiptOutcome::Root(root),
            (status, _) => {
                let problem = if status.is_some() {
                    "receipt carries both status and root"
                } else {
                    "receipt carries neither status nor root"
                };
                return Err(D::Error::custom(EthError::InvalidFlavor(
                    problem.to_string(),
                )));
            }
        };
        Ok(Receipt {
            tx_type: fields.tx_type,
            transaction_hash: fields.transaction_hash,
            transaction_index: fields.transaction_index,
            block_hash: fields.block_hash,
            block_number: fields.block_number,
            from: fields.from,
            to: fields.to,
            cumulative_gas_used: fields.cumulative_gas_used,
            gas_used: fields.gas_used,
            effective_gas_price: fields.effective_gas_price,
            contract_address: fields.contract_address,
            logs: fields.logs,
            logs_bloom: fields.logs_bloom,
            outcome,
            blob_gas_used: fields.blob_gas_used,
            blob_gas_price: fields.blob_gas_price,
        })
    }
}
