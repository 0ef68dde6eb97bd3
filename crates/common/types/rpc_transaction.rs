use ethereum_types::{H256, U256};
use ethwire_rlp::structs::Encoder;
use serde::{
    ser::Error as _, ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer,
};
use tracing::debug;

use super::{
    create_address, parse_hex, AccessList, Address, AuthorizationList, BlobsBundle, Data,
    EIP1559Transaction, EIP2930Transaction, EIP4844Transaction, EIP7702Transaction,
    LegacyTransaction, Quantity, Transaction, TxKind, TxType,
};
use crate::{crypto, errors::EthError, serde_utils};

/// JSON emission profile of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TxFlavor {
    #[default]
    Geth,
    /// Adds `standardV`, `raw`, `publicKey`, `creates` and `condition`.
    Parity,
}

/// A transaction as returned by JSON-RPC: the signed transaction plus the
/// fields a node derives for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcTransaction {
    pub tx: Transaction,
    pub from: Address,
    pub hash: H256,
    pub block_hash: Option<H256>,
    pub block_number: Option<Quantity>,
    pub transaction_index: Option<Quantity>,
    /// `gasPrice` reported for fee-market transactions, the effective price once mined.
    pub effective_gas_price: Option<Quantity>,
    /// Blob sidecar of a network-form blob transaction. Not part of the JSON form.
    pub blobs_bundle: Option<BlobsBundle>,
    pub flavor: TxFlavor,
    pub standard_v: Option<Quantity>,
    pub raw: Option<Data>,
    pub public_key: Option<Data>,
    pub creates: Option<Address>,
    pub condition: Option<serde_json::Value>,
}

impl RpcTransaction {
    /// Decodes a raw transaction and derives sender, hash and the parity extras.
    pub fn from_raw(raw: &str) -> Result<Self, EthError> {
        let (tx, blobs_bundle) = Transaction::decode_with_sidecar(&parse_hex(raw, None)?)?;
        Self::from_transaction(tx, blobs_bundle)
    }

    pub fn from_transaction(
        tx: Transaction,
        blobs_bundle: Option<BlobsBundle>,
    ) -> Result<Self, EthError> {
        let public_key = tx.recover_public_key()?;
        let from = crypto::address_from_pubkey(&public_key)?;
        let creates = tx
            .is_contract_creation()
            .then(|| create_address(&from, tx.nonce()));
        debug!(hash = ?tx.hash(), %from, "Recovered transaction sender");
        Ok(RpcTransaction {
            from,
            hash: tx.hash(),
            block_hash: None,
            block_number: None,
            transaction_index: None,
            effective_gas_price: None,
            blobs_bundle,
            flavor: TxFlavor::Geth,
            standard_v: Some(Quantity::from(tx.recovery_id()?)),
            raw: Some(Data::from(tx.encode_raw())),
            public_key: Some(Data::from(public_key[1..].to_vec())),
            creates,
            condition: None,
            tx,
        })
    }

    pub fn with_flavor(mut self, flavor: TxFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Records where the transaction was included.
    pub fn with_block(mut self, block_hash: H256, block_number: Quantity, index: usize) -> Self {
        self.block_hash = Some(block_hash);
        self.block_number = Some(block_number);
        self.transaction_index = Some(Quantity::from(index as u64));
        self
    }

    /// Raw form including the blob sidecar when one is attached:
    /// `0x03 || rlp([payload-body, blobs, commitments, proofs])`.
    pub fn raw_network_representation(&self) -> String {
        let (Transaction::EIP4844Transaction(tx), Some(bundle)) = (&self.tx, &self.blobs_bundle)
        else {
            return self.tx.raw_representation();
        };
        let mut buf = vec![TxType::EIP4844 as u8];
        Encoder::new(&mut buf)
            .encode_field(tx)
            .encode_field(&bundle.blobs)
            .encode_field(&bundle.commitments)
            .encode_field(&bundle.proofs)
            .finish();
        format!("0x{}", hex::encode(buf))
    }

    /// Checks that every field the flavor emits is present.
    pub fn validate_flavor(&self) -> Result<(), EthError> {
        if self.flavor == TxFlavor::Parity && (self.standard_v.is_none() || self.raw.is_none()) {
            return Err(EthError::InvalidFlavor(
                "parity transactions require standardV and raw".to_string(),
            ));
        }
        Ok(())
    }

    fn y_parity(&self) -> Option<bool> {
        match &self.tx {
            Transaction::LegacyTransaction(_) => None,
            Transaction::EIP2930Transaction(tx) => Some(tx.signature_y_parity),
            Transaction::EIP1559Transaction(tx) => Some(tx.signature_y_parity),
            Transaction::EIP4844Transaction(tx) => Some(tx.signature_y_parity),
            Transaction::EIP7702Transaction(tx) => Some(tx.signature_y_parity),
        }
    }
}

impl Serialize for RpcTransaction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.validate_flavor().map_err(S::Error::custom)?;
        let tx = &self.tx;
        let parity = self.flavor == TxFlavor::Parity;

        let mut struct_serializer = serializer.serialize_struct("RpcTransaction", 28)?;
        struct_serializer.serialize_field("blockHash", &self.block_hash)?;
        struct_serializer.serialize_field("blockNumber", &self.block_number)?;
        struct_serializer.serialize_field("from", &self.from)?;
        struct_serializer.serialize_field("gas", tx.gas_limit())?;
        match (tx.gas_price(), &self.effective_gas_price) {
            (Some(gas_price), _) | (None, Some(gas_price)) => {
                struct_serializer.serialize_field("gasPrice", gas_price)?
            }
            (None, None) => {}
        }
        if let Some(max_fee_per_gas) = tx.max_fee_per_gas() {
            struct_serializer.serialize_field("maxFeePerGas", max_fee_per_gas)?;
        }
        if let Some(max_priority_fee) = tx.max_priority_fee() {
            struct_serializer.serialize_field("maxPriorityFeePerGas", max_priority_fee)?;
        }
        if let Some(max_fee_per_blob_gas) = tx.max_fee_per_blob_gas() {
            struct_serializer.serialize_field("maxFeePerBlobGas", max_fee_per_blob_gas)?;
        }
        struct_serializer.serialize_field("hash", &self.hash)?;
        struct_serializer.serialize_field("input", tx.data())?;
        struct_serializer.serialize_field("nonce", tx.nonce())?;
        struct_serializer.serialize_field("to", &tx.to().to_address())?;
        struct_serializer.serialize_field("transactionIndex", &self.transaction_index)?;
        struct_serializer.serialize_field("value", tx.value())?;
        struct_serializer.serialize_field("type", &tx.tx_type())?;
        if let Some(access_list) = tx.access_list() {
            struct_serializer.serialize_field("accessList", access_list)?;
        }
        match tx {
            Transaction::LegacyTransaction(legacy) if parity => {
                let chain_id = legacy.chain_id().map_err(S::Error::custom)?;
                struct_serializer.serialize_field("chainId", &chain_id)?;
            }
            Transaction::LegacyTransaction(_) => {}
            _ => {
                let chain_id = tx.chain_id().map_err(S::Error::custom)?;
                struct_serializer.serialize_field("chainId", &chain_id)?;
            }
        }
        if let Some(authorization_list) = tx.authorization_list() {
            struct_serializer.serialize_field("authorizationList", authorization_list)?;
        }
        if let Some(blob_versioned_hashes) = tx.blob_versioned_hashes() {
            struct_serializer.serialize_field("blobVersionedHashes", blob_versioned_hashes)?;
        }
        let (r, s) = tx.signature();
        struct_serializer.serialize_field("v", &tx.v())?;
        struct_serializer.serialize_field("r", &r)?;
        struct_serializer.serialize_field("s", &s)?;
        if let Some(y_parity) = self.y_parity() {
            struct_serializer
                .serialize_field("yParity", &format!("{:#x}", y_parity as u8))?;
        }
        if parity {
            struct_serializer.serialize_field("standardV", &self.standard_v)?;
            struct_serializer.serialize_field("raw", &self.raw)?;
            struct_serializer.serialize_field("publicKey", &self.public_key)?;
            struct_serializer.serialize_field("creates", &self.creates)?;
            struct_serializer.serialize_field("condition", &self.condition)?;
        }
        struct_serializer.end()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransactionFields {
    #[serde(rename = "type")]
    tx_type: Option<TxType>,
    block_hash: Option<H256>,
    block_number: Option<Quantity>,
    transaction_index: Option<Quantity>,
    from: Address,
    hash: H256,
    nonce: Quantity,
    gas: Quantity,
    gas_price: Option<Quantity>,
    max_fee_per_gas: Option<Quantity>,
    max_priority_fee_per_gas: Option<Quantity>,
    max_fee_per_blob_gas: Option<Quantity>,
    to: Option<Address>,
    value: Quantity,
    input: Data,
    access_list: Option<AccessList>,
    authorization_list: Option<AuthorizationList>,
    blob_versioned_hashes: Option<Vec<H256>>,
    chain_id: Option<Quantity>,
    v: Option<Quantity>,
    #[serde(default, with = "serde_utils::bool::opt")]
    y_parity: Option<bool>,
    r: U256,
    s: U256,
    standard_v: Option<Quantity>,
    raw: Option<Data>,
    public_key: Option<Data>,
    creates: Option<Address>,
    condition: Option<serde_json::Value>,
}

fn required<T, E: serde::de::Error>(value: Option<T>, field: &'static str) -> Result<T, E> {
    value.ok_or_else(|| E::missing_field(field))
}

impl RpcTransactionFields {
    fn y_parity<E: serde::de::Error>(&self) -> Result<bool, E> {
        if let Some(y_parity) = self.y_parity {
            return Ok(y_parity);
        }
        match self.v.as_ref().and_then(Quantity::as_u64) {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            Some(_) => Err(E::custom("typed transaction v must be 0x0 or 0x1")),
            None => Err(E::missing_field("yParity")),
        }
    }

    fn into_transaction<E: serde::de::Error>(self) -> Result<RpcTransaction, E> {
        let tx_type = self.tx_type.unwrap_or_default();
        let to = TxKind::from(self.to);
        let mut effective_gas_price = None;
        let tx = match tx_type {
            TxType::Legacy => Transaction::LegacyTransaction(LegacyTransaction {
                nonce: self.nonce.clone(),
                gas_price: required(self.gas_price.clone(), "gasPrice")?,
                gas: self.gas.clone(),
                to,
                value: self.value.clone(),
                data: self.input.clone(),
                v: required(self.v.clone(), "v")?,
                r: self.r,
                s: self.s,
            }),
            TxType::EIP2930 => Transaction::EIP2930Transaction(EIP2930Transaction {
                chain_id: required(self.chain_id.clone(), "chainId")?,
                nonce: self.nonce.clone(),
                gas_price: required(self.gas_price.clone(), "gasPrice")?,
                gas_limit: self.gas.clone(),
                to,
                value: self.value.clone(),
                data: self.input.clone(),
                access_list: self.access_list.clone().unwrap_or_default(),
                signature_y_parity: self.y_parity()?,
                signature_r: self.r,
                signature_s: self.s,
            }),
            TxType::EIP1559 => {
                effective_gas_price = self.gas_price.clone();
                Transaction::EIP1559Transaction(EIP1559Transaction {
                    chain_id: required(self.chain_id.clone(), "chainId")?,
                    nonce: self.nonce.clone(),
                    max_priority_fee_per_gas: required(
                        self.max_priority_fee_per_gas.clone(),
                        "maxPriorityFeePerGas",
                    )?,
                    max_fee_per_gas: required(self.max_fee_per_gas.clone(), "maxFeePerGas")?,
                    gas_limit: self.gas.clone(),
                    to,
                    value: self.value.clone(),
                    data: self.input.clone(),
                    access_list: self.access_list.clone().unwrap_or_default(),
                    signature_y_parity: self.y_parity()?,
                    signature_r: self.r,
                    signature_s: self.s,
                })
            }
            TxType::EIP4844 => {
                effective_gas_price = self.gas_price.clone();
                Transaction::EIP4844Transaction(EIP4844Transaction {
                    chain_id: required(self.chain_id.clone(), "chainId")?,
                    nonce: self.nonce.clone(),
                    max_priority_fee_per_gas: required(
                        self.max_priority_fee_per_gas.clone(),
                        "maxPriorityFeePerGas",
                    )?,
                    max_fee_per_gas: required(self.max_fee_per_gas.clone(), "maxFeePerGas")?,
                    gas: self.gas.clone(),
                    to,
                    value: self.value.clone(),
                    data: self.input.clone(),
                    access_list: self.access_list.clone().unwrap_or_default(),
                    max_fee_per_blob_gas: required(
                        self.max_fee_per_blob_gas.clone(),
                        "maxFeePerBlobGas",
                    )?,
                    blob_versioned_hashes: required(
                        self.blob_versioned_hashes.clone(),
                        "blobVersionedHashes",
                    )?,
                    signature_y_parity: self.y_parity()?,
                    signature_r: self.r,
                    signature_s: self.s,
                })
            }
            TxType::EIP7702 => {
                effective_gas_price = self.gas_price.clone();
                let TxKind::Call(destination) = to else {
                    return Err(E::custom(EthError::MissingRecipient));
                };
                Transaction::EIP7702Transaction(EIP7702Transaction {
                    chain_id: required(self.chain_id.clone(), "chainId")?,
                    nonce: self.nonce.clone(),
                    max_priority_fee_per_gas: required(
                        self.max_priority_fee_per_gas.clone(),
                        "maxPriorityFeePerGas",
                    )?,
                    max_fee_per_gas: required(self.max_fee_per_gas.clone(), "maxFeePerGas")?,
                    gas_limit: self.gas.clone(),
                    destination,
                    value: self.value.clone(),
                    data: self.input.clone(),
                    access_list: self.access_list.clone().unwrap_or_default(),
                    authorization_list: required(
                        self.authorization_list.clone(),
                        "authorizationList",
                    )?,
                    signature_y_parity: self.y_parity()?,
                    signature_r: self.r,
                    signature_s: self.s,
                })
            }
        };

        let flavor = if self.standard_v.is_some() || self.raw.is_some() || self.public_key.is_some()
        {
            TxFlavor::Parity
        } else {
            TxFlavor::Geth
        };
        Ok(RpcTransaction {
            tx,
            from: self.from,
            hash: self.hash,
            block_hash: self.block_hash,
            block_number: self.block_number,
            transaction_index: self.transaction_index,
            effective_gas_price,
            blobs_bundle: None,
            flavor,
            standard_v: self.standard_v,
            raw: self.raw,
            public_key: self.public_key,
            creates: self.creates,
            condition: self.condition,
        })
    }
}

impl<'de> Deserialize<'de> for RpcTransaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RpcTransactionFields::deserialize(deserializer)?.into_transaction()
    }
}

/// Entry of a block's `transactions`: a bare hash or the full object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TxOrHash {
    Hash(H256),
    Full(Box<RpcTransaction>),
}

impl TxOrHash {
    pub fn hash(&self) -> H256 {
        match self {
            TxOrHash::Hash(hash) => *hash,
            TxOrHash::Full(tx) => tx.hash,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, TxOrHash::Full(_))
    }
}

impl From<RpcTransaction> for TxOrHash {
    fn from(tx: RpcTransaction) -> Self {
        TxOrHash::Full(Box::new(tx))
    }
}
