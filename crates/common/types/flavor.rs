use std::{borrow::Cow, fmt::Display, str::FromStr};

use super::HeaderFields;
use crate::errors::EthError;

/// Seal fields of an ethash block as reported by parity: mix hash and nonce.
const ETHHASH_SEAL_FIELDS: usize = 2;

/// Emission profile of block-shaped JSON, keyed on the client and its seal engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockFlavor {
    #[default]
    Geth,
    ParityEthhash,
    ParityAura,
    ParityClique,
    ParityUnknown,
}

impl BlockFlavor {
    /// Infers the flavor from the fields a node emitted.
    pub fn detect(header: &HeaderFields) -> Self {
        if header.author.is_none() && header.seal_fields.is_none() {
            return BlockFlavor::Geth;
        }
        if header.step.is_some() && header.signature.is_some() {
            return BlockFlavor::ParityAura;
        }
        if header.mix_hash.is_some() && header.nonce.is_some() {
            let seal_fields = header.seal_fields.as_ref().map(Vec::len);
            if seal_fields == Some(ETHHASH_SEAL_FIELDS) {
                return BlockFlavor::ParityEthhash;
            }
            return BlockFlavor::ParityClique;
        }
        BlockFlavor::ParityUnknown
    }

    pub fn is_parity(&self) -> bool {
        !matches!(self, BlockFlavor::Geth)
    }

    /// Checks that `header` carries every field this flavor emits.
    pub fn validate(&self, header: &HeaderFields) -> Result<(), EthError> {
        if !self.is_parity() {
            return Ok(());
        }
        require(*self, "author", header.author.is_some())?;
        require(*self, "sealFields", header.seal_fields.is_some())?;
        match self {
            BlockFlavor::ParityEthhash | BlockFlavor::ParityClique => {
                require(*self, "mixHash", header.mix_hash.is_some())?;
                require(*self, "nonce", header.nonce.is_some())
            }
            BlockFlavor::ParityAura => {
                require(*self, "step", header.step.is_some())?;
                require(*self, "signature", header.signature.is_some())
            }
            _ => Ok(()),
        }
    }

    /// Restricts `header` to the fields this flavor emits. Fields belonging to
    /// other seal engines are dropped; `parity-unknown` keeps whatever it carries.
    pub fn emitted_header<'a>(&self, header: &'a HeaderFields) -> Cow<'a, HeaderFields> {
        let (parity_fields, work_seal, aura_seal) = match self {
            BlockFlavor::Geth => (false, true, false),
            BlockFlavor::ParityEthhash | BlockFlavor::ParityClique => (true, true, false),
            BlockFlavor::ParityAura => (true, false, true),
            BlockFlavor::ParityUnknown => return Cow::Borrowed(header),
        };
        let foreign = (!parity_fields && (header.author.is_some() || header.seal_fields.is_some()))
            || (!work_seal && (header.mix_hash.is_some() || header.nonce.is_some()))
            || (!aura_seal && (header.step.is_some() || header.signature.is_some()));
        if !foreign {
            return Cow::Borrowed(header);
        }
        let mut emitted = header.clone();
        if !parity_fields {
            emitted.author = None;
            emitted.seal_fields = None;
        }
        if !work_seal {
            emitted.mix_hash = None;
            emitted.nonce = None;
        }
        if !aura_seal {
            emitted.step = None;
            emitted.signature = None;
        }
        Cow::Owned(emitted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockFlavor::Geth => "geth",
            BlockFlavor::ParityEthhash => "parity-ethhash",
            BlockFlavor::ParityAura => "parity-aura",
            BlockFlavor::ParityClique => "parity-clique",
            BlockFlavor::ParityUnknown => "parity-unknown",
        }
    }
}

pub(crate) fn require(flavor: BlockFlavor, field: &str, present: bool) -> Result<(), EthError> {
    if present {
        Ok(())
    } else {
        Err(EthError::InvalidFlavor(format!(
            "{flavor} requires field {field}"
        )))
    }
}

impl Display for BlockFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockFlavor {
    type Err = EthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "geth" => Ok(BlockFlavor::Geth),
            "parity-ethhash" => Ok(BlockFlavor::ParityEthhash),
            "parity-aura" => Ok(BlockFlavor::ParityAura),
            "parity-clique" => Ok(BlockFlavor::ParityClique),
            "parity-unknown" => Ok(BlockFlavor::ParityUnknown),
            other => Err(EthError::InvalidFlavor(format!("unknown flavor {other}"))),
        }
    }
}
