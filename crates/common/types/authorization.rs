use bytes::BufMut;
use ethereum_types::U256;
use ethwire_rlp::{
    decode::{decode_list_items, RLPDecode},
    encode::RLPEncode,
    error::RLPDecodeError,
    structs::Encoder,
};
use serde::{Deserialize, Serialize};

use super::{Address, Quantity};
use crate::{crypto, errors::EthError};

/// Prefix byte of the message an account signs to delegate its code.
pub const SET_CODE_AUTHORIZATION_MAGIC: u8 = 0x05;

pub type AuthorizationList = Vec<SetCodeAuthorization>;

/// EIP-7702 authorization tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCodeAuthorization {
    pub chain_id: Quantity,
    pub address: Address,
    pub nonce: Quantity,
    pub y_parity: Quantity,
    pub r: U256,
    pub s: U256,
}

impl SetCodeAuthorization {
    /// Hash signed by the authorizing account.
    pub fn signing_hash(&self) -> ethereum_types::H256 {
        let mut buf = vec![SET_CODE_AUTHORIZATION_MAGIC];
        Encoder::new(&mut buf)
            .encode_field(&self.chain_id)
            .encode_field(&self.address)
            .encode_field(&self.nonce)
            .finish();
        crypto::keccak256(buf)
    }

    /// Recovers the account that signed this authorization.
    pub fn authority(&self) -> Result<Address, EthError> {
        let recovery_bit = match self.y_parity.as_u64() {
            Some(bit @ (0 | 1)) => bit as u8,
            _ => {
                return Err(EthError::SignatureInvalid(format!(
                    "authorization yParity must be 0 or 1, got {}",
                    self.y_parity
                )))
            }
        };
        let public_key =
            crypto::ecdsa_recover(&self.signing_hash(), &self.r, &self.s, recovery_bit)?;
        crypto::address_from_pubkey(&public_key)
    }
}

impl RLPEncode for SetCodeAuthorization {
    fn encode(&self, buf: &mut dyn BufMut) {
        Encoder::new(buf)
            .encode_field(&self.chain_id)
            .encode_field(&self.address)
            .encode_field(&self.nonce)
            .encode_field(&self.y_parity)
            .encode_field(&self.r)
            .encode_field(&self.s)
            .finish();
    }
}

/// Decodes an RLP authorization list. Entries need at least six items;
/// anything after the sixth is ignored.
pub fn decode_authorization_list(rlp: &[u8]) -> Result<AuthorizationList, EthError> {
    let (entries, rest) = decode_list_items(rlp)?;
    if !rest.is_empty() {
        return Err(RLPDecodeError::ExtraData.into());
    }
    entries.into_iter().map(decode_authorization).collect()
}

fn decode_authorization(rlp: &[u8]) -> Result<SetCodeAuthorization, EthError> {
    let (items, _) = decode_list_items(rlp)?;
    let [chain_id, address, nonce, y_parity, r, s, ..] = items.as_slice() else {
        return Err(EthError::list_shape("authorization", items.len()));
    };
    Ok(SetCodeAuthorization {
        chain_id: Quantity::decode(chain_id)?,
        address: Address::decode(address)?,
        nonce: Quantity::decode(nonce)?,
        y_parity: Quantity::decode(y_parity)?,
        r: U256::decode(r)?,
        s: U256::decode(s)?,
    })
}
