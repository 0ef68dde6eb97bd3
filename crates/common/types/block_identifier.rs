use std::fmt::Display;

use ethereum_types::H256;
use serde::{
    de::Error as _, ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::Value;

use super::{HexData, Quantity};
use crate::errors::EthError;

/// Length of `0x` + 32 hex-encoded bytes.
const HASH_TEXT_LEN: usize = 66;

#[derive(Deserialize, Serialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BlockTag {
    Earliest,
    Finalized,
    Safe,
    #[default]
    Latest,
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockId {
    Tag(BlockTag),
    Number(Quantity),
    Hash {
        hash: H256,
        require_canonical: Option<bool>,
    },
}

/// Block reference accepted by the JSON-RPC block parameters (EIP-1898).
/// `raw` records whether it arrived as a bare string so it can be emitted
/// in the same form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockSpecifier {
    pub id: BlockId,
    pub raw: bool,
}

impl BlockSpecifier {
    pub fn tag(tag: BlockTag) -> Self {
        Self {
            id: BlockId::Tag(tag),
            raw: true,
        }
    }

    pub fn number(number: impl Into<Quantity>) -> Self {
        Self {
            id: BlockId::Number(number.into()),
            raw: true,
        }
    }

    pub fn hash(hash: H256) -> Self {
        Self {
            id: BlockId::Hash {
                hash,
                require_canonical: None,
            },
            raw: true,
        }
    }

    /// Switches emission to the `{blockNumber}` / `{blockHash}` object form.
    pub fn as_object(mut self) -> Self {
        self.raw = false;
        self
    }

    /// Block number this specifier pins without a chain lookup.
    pub fn resolve_number(&self) -> Option<Quantity> {
        match &self.id {
            BlockId::Number(number) => Some(number.clone()),
            BlockId::Tag(BlockTag::Earliest) => Some(Quantity::zero()),
            _ => None,
        }
    }

    pub fn parse(value: Value) -> Result<Self, EthError> {
        match value {
            Value::String(text) => Ok(Self {
                id: Self::parse_text(&text)?,
                raw: true,
            }),
            Value::Object(mut fields) => {
                let id = if let Some(number) = fields.remove("blockNumber") {
                    let Value::String(text) = number else {
                        return Err(EthError::InvalidQuantity(number.to_string()));
                    };
                    BlockId::Number(Quantity::parse(&text)?)
                } else if let Some(hash) = fields.remove("blockHash") {
                    let Value::String(text) = hash else {
                        return Err(EthError::MalformedHex(hash.to_string()));
                    };
                    let require_canonical = match fields.remove("requireCanonical") {
                        None | Some(Value::Null) => None,
                        Some(Value::Bool(flag)) => Some(flag),
                        Some(other) => {
                            return Err(EthError::InvalidFlavor(format!(
                                "requireCanonical must be a boolean, got {other}"
                            )))
                        }
                    };
                    BlockId::Hash {
                        hash: H256::parse_hex(&text)?,
                        require_canonical,
                    }
                } else {
                    return Err(EthError::InvalidFlavor(
                        "block specifier object needs blockNumber or blockHash".to_string(),
                    ));
                };
                Ok(Self { id, raw: false })
            }
            other => Err(EthError::InvalidFlavor(format!(
                "unsupported block specifier {other}"
            ))),
        }
    }

    fn parse_text(text: &str) -> Result<BlockId, EthError> {
        if let Ok(tag) = serde_json::from_value::<BlockTag>(Value::String(text.to_string())) {
            return Ok(BlockId::Tag(tag));
        }
        if text.len() == HASH_TEXT_LEN {
            return Ok(BlockId::Hash {
                hash: H256::parse_hex(text)?,
                require_canonical: None,
            });
        }
        Ok(BlockId::Number(Quantity::parse(text)?))
    }
}

impl Default for BlockSpecifier {
    fn default() -> Self {
        Self::tag(BlockTag::default())
    }
}

impl Display for BlockSpecifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            BlockId::Number(number) => number.fmt(f),
            BlockId::Hash { hash, .. } => write!(f, "{hash:#x}"),
            BlockId::Tag(tag) => match tag {
                BlockTag::Earliest => "earliest".fmt(f),
                BlockTag::Finalized => "finalized".fmt(f),
                BlockTag::Safe => "safe".fmt(f),
                BlockTag::Latest => "latest".fmt(f),
                BlockTag::Pending => "pending".fmt(f),
            },
        }
    }
}

impl Serialize for BlockSpecifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.id {
            BlockId::Tag(tag) => tag.serialize(serializer),
            BlockId::Number(number) if self.raw => number.serialize(serializer),
            BlockId::Number(number) => {
                let mut struct_serializer = serializer.serialize_struct("BlockSpecifier", 1)?;
                struct_serializer.serialize_field("blockNumber", number)?;
                struct_serializer.end()
            }
            // A bare hash string cannot carry requireCanonical.
            BlockId::Hash {
                hash,
                require_canonical: None,
            } if self.raw => hash.serialize(serializer),
            BlockId::Hash {
                hash,
                require_canonical,
            } => {
                let fields = 1 + require_canonical.is_some() as usize;
                let mut struct_serializer =
                    serializer.serialize_struct("BlockSpecifier", fields)?;
                struct_serializer.serialize_field("blockHash", hash)?;
                if let Some(require_canonical) = require_canonical {
                    struct_serializer.serialize_field("requireCanonical", require_canonical)?;
                }
                struct_serializer.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for BlockSpecifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        BlockSpecifier::parse(value).map_err(D::Error::custom)
    }
}
