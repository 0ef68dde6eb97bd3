use bytes::BufMut;
use ethereum_types::H256;
use ethwire_rlp::{
    decode::{decode_list_items, RLPDecode},
    encode::RLPEncode,
    structs::Encoder,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Address;
use crate::errors::EthError;

pub type AccessList = Vec<AccessListEntry>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListEntry {
    pub address: Address,
    #[serde(default)]
    pub storage_keys: Vec<H256>,
}

impl AccessListEntry {
    pub fn new(address: Address, storage_keys: Vec<H256>) -> Self {
        Self {
            address,
            storage_keys,
        }
    }
}

impl RLPEncode for AccessListEntry {
    fn encode(&self, buf: &mut dyn BufMut) {
        Encoder::new(buf)
            .encode_field(&self.address)
            .encode_field(&self.storage_keys)
            .finish();
    }
}

/// Decodes an RLP access list (a single list item, nothing after it).
/// Entries holding only an address get an empty key list.
pub fn decode_access_list(rlp: &[u8]) -> Result<AccessList, EthError> {
    let (entries, rest) = decode_list_items(rlp)?;
    if !rest.is_empty() {
        return Err(ethwire_rlp::error::RLPDecodeError::ExtraData.into());
    }
    entries.into_iter().map(decode_entry).collect()
}

fn decode_entry(rlp: &[u8]) -> Result<AccessListEntry, EthError> {
    let (items, _) = decode_list_items(rlp)?;
    match items.as_slice() {
        [address] => {
            warn!("Access list entry without storage keys list");
            Ok(AccessListEntry::new(Address::decode(address)?, Vec::new()))
        }
        [address, storage_keys] => Ok(AccessListEntry::new(
            Address::decode(address)?,
            Vec::<H256>::decode(storage_keys)?,
        )),
        other => Err(EthError::list_shape("access list entry", other.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereum_types::H160;
    use hex_literal::hex;

    #[test]
    fn access_list_rlp_round_trip() {
        let access_list = vec![AccessListEntry::new(
            Address(H160::from_low_u64_be(0x1337)),
            vec![H256::zero()],
        )];
        let encoded = access_list.encode_to_vec();
        assert_eq!(
            encoded,
            hex!("f838f7940000000000000000000000000000000000001337e1a00000000000000000000000000000000000000000000000000000000000000000")
        );
        assert_eq!(decode_access_list(&encoded).unwrap(), access_list);
    }

    #[test]
    fn empty_access_list() {
        let access_list: AccessList = vec![];
        assert_eq!(access_list.encode_to_vec(), vec![0xc0]);
        assert_eq!(decode_access_list(&[0xc0]).unwrap(), access_list);
    }

    #[test]
    fn entry_with_only_address_gets_empty_keys() {
        // [[0x…1337]]
        let rlp = hex!("d6d5940000000000000000000000000000000000001337");
        let decoded = decode_access_list(&rlp).unwrap();
        assert_eq!(
            decoded,
            vec![AccessListEntry::new(
                Address(H160::from_low_u64_be(0x1337)),
                vec![]
            )]
        );
    }

    #[test]
    fn entry_with_bad_cardinality_is_rejected() {
        // [[]]
        assert_eq!(
            decode_access_list(&hex!("c1c0")),
            Err(EthError::InvalidListShape {
                what: "access list entry",
                items: 0
            })
        );
        // [[0x…1337, [], []]]
        let rlp = hex!("d8d7940000000000000000000000000000000000001337c0c0");
        assert_eq!(
            decode_access_list(&rlp),
            Err(EthError::InvalidListShape {
                what: "access list entry",
                items: 3
            })
        );
    }

    #[test]
    fn access_list_json() {
        let json = r#"[{"address":"0x0000000000000000000000000000000000001337","storageKeys":["0x0000000000000000000000000000000000000000000000000000000000000000"]}]"#;
        let access_list: AccessList = serde_json::from_str(json).unwrap();
        assert_eq!(access_list[0].storage_keys.len(), 1);
        assert_eq!(serde_json::to_string(&access_list).unwrap(), json);
    }
}
