use ethereum_types::H256;
use serde::{
    de::Error as _, ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer,
};

use super::{Address, BlockSpecifier, Log};
use crate::errors::EthError;

/// Logs carry at most four topics.
pub const MAX_TOPIC_SLOTS: usize = 4;

/// Criteria of `eth_getLogs` / `eth_newFilter`.
///
/// Each topic slot lists the accepted alternatives for that position; an empty
/// slot accepts any topic. Trailing empty slots are dropped on parse.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub from_block: Option<BlockSpecifier>,
    pub to_block: Option<BlockSpecifier>,
    pub block_hash: Option<H256>,
    pub addresses: Vec<Address>,
    pub topics: Vec<Vec<H256>>,
}

impl LogFilter {
    /// Builds a filter from topic slots, trimming trailing empty ones.
    pub fn with_topics(mut self, mut topics: Vec<Vec<H256>>) -> Result<Self, EthError> {
        while topics.last().is_some_and(Vec::is_empty) {
            topics.pop();
        }
        if topics.len() > MAX_TOPIC_SLOTS {
            return Err(EthError::InvalidListShape {
                what: "log filter topics",
                items: topics.len(),
            });
        }
        self.topics = topics;
        Ok(self)
    }

    pub fn matches(&self, log: &Log) -> bool {
        if !self.addresses.is_empty() && !self.addresses.contains(&log.address) {
            return false;
        }
        if let Some(block_hash) = &self.block_hash {
            if log.block_hash.as_ref() != Some(block_hash) {
                return false;
            }
        }
        if let Some(from) = self.from_block.as_ref().and_then(|b| b.resolve_number()) {
            match &log.block_number {
                Some(number) if *number >= from => {}
                _ => return false,
            }
        }
        if let Some(to) = self.to_block.as_ref().and_then(|b| b.resolve_number()) {
            match &log.block_number {
                Some(number) if *number <= to => {}
                _ => return false,
            }
        }
        self.topics.iter().enumerate().all(|(i, slot)| {
            log.topics
                .get(i)
                .is_some_and(|topic| slot.is_empty() || slot.contains(topic))
        })
    }
}

#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogFilterFields {
    #[serde(default)]
    from_block: Option<BlockSpecifier>,
    #[serde(default)]
    to_block: Option<BlockSpecifier>,
    #[serde(default)]
    block_hash: Option<H256>,
    #[serde(default)]
    address: Option<OneOrMany<Address>>,
    #[serde(default)]
    topics: Option<Vec<Option<OneOrMany<H256>>>>,
}

impl<'de> Deserialize<'de> for LogFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = LogFilterFields::deserialize(deserializer)?;
        let topics = fields
            .topics
            .unwrap_or_default()
            .into_iter()
            .map(|slot| slot.map(Vec::from).unwrap_or_default())
            .collect();
        LogFilter {
            from_block: fields.from_block,
            to_block: fields.to_block,
            block_hash: fields.block_hash,
            addresses: fields.address.map(Vec::from).unwrap_or_default(),
            topics: Vec::new(),
        }
        .with_topics(topics)
        .map_err(D::Error::custom)
    }
}

impl Serialize for LogFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut struct_serializer = serializer.serialize_struct("LogFilter", 5)?;
        if let Some(from_block) = &self.from_block {
            struct_serializer.serialize_field("fromBlock", from_block)?;
        }
        if let Some(to_block) = &self.to_block {
            struct_serializer.serialize_field("toBlock", to_block)?;
        }
        if let Some(block_hash) = &self.block_hash {
            struct_serializer.serialize_field("blockHash", block_hash)?;
        }
        match self.addresses.as_slice() {
            [] => {}
            [address] => struct_serializer.serialize_field("address", address)?,
            addresses => struct_serializer.serialize_field("address", addresses)?,
        }
        if !self.topics.is_empty() {
            let topics: Vec<Option<OneOrMany<H256>>> = self
                .topics
                .iter()
                .map(|slot| match slot.as_slice() {
                    [] => None,
                    [topic] => Some(OneOrMany::One(*topic)),
                    topics => Some(OneOrMany::Many(topics.to_vec())),
                })
                .collect();
            struct_serializer.serialize_field("topics", &topics)?;
        }
        struct_serializer.end()
    }
}
