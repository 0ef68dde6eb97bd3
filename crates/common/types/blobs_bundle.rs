use ethereum_types::H256;
use ethwire_rlp::{
    decode::RLPDecode,
    encode::RLPEncode,
    error::RLPDecodeError,
    structs::{Decoder, Encoder},
};
use serde::{Deserialize, Serialize};

use super::Data;
use crate::{errors::EthError, serde_utils};

pub type Bytes48 = [u8; 48];
pub type Commitment = Bytes48;
pub type Proof = Bytes48;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
/// Sidecar of a blob transaction in network form: the blobs, along with the corresponding commitments and proofs.
/// KZG commitments are carried as-is and never verified.
pub struct BlobsBundle {
    pub blobs: Vec<Data>,
    #[serde(with = "serde_utils::bytes48::vec")]
    pub commitments: Vec<Commitment>,
    #[serde(with = "serde_utils::bytes48::vec")]
    pub proofs: Vec<Proof>,
}

impl BlobsBundle {
    /// Checks that blobs, commitments and proofs line up with each other and
    /// with the versioned hashes of the transaction.
    pub fn validate(&self, blob_versioned_hashes: &[H256]) -> Result<(), EthError> {
        let expected = blob_versioned_hashes.len();
        for len in [self.blobs.len(), self.commitments.len(), self.proofs.len()] {
            if len != expected {
                return Err(EthError::list_shape("blobs bundle", len));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl RLPEncode for BlobsBundle {
    fn encode(&self, buf: &mut dyn bytes::BufMut) {
        Encoder::new(buf)
            .encode_field(&self.blobs)
            .encode_field(&self.commitments)
            .encode_field(&self.proofs)
            .finish();
    }
}

impl RLPDecode for BlobsBundle {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let decoder = Decoder::new(rlp)?;
        let (blobs, decoder) = decoder.decode_field("blobs")?;
        let (commitments, decoder) = decoder.decode_field("commitments")?;
        let (proofs, decoder) = decoder.decode_field("proofs")?;
        Ok((
            Self {
                blobs,
                commitments,
                proofs,
            },
            decoder.finish()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(count: usize) -> BlobsBundle {
        BlobsBundle {
            blobs: (0..count).map(|i| Data::from(vec![i as u8; 64])).collect(),
            commitments: vec![[0xc0; 48]; count],
            proofs: vec![[0x9f; 48]; count],
        }
    }

    #[test]
    fn validate_requires_parallel_arrays() {
        let hashes = vec![H256::repeat_byte(1), H256::repeat_byte(2)];
        assert!(bundle(2).validate(&hashes).is_ok());
        assert_eq!(
            bundle(1).validate(&hashes),
            Err(EthError::InvalidListShape {
                what: "blobs bundle",
                items: 1
            })
        );

        let mut uneven = bundle(2);
        uneven.proofs.pop();
        assert!(matches!(
            uneven.validate(&hashes),
            Err(EthError::InvalidListShape { items: 1, .. })
        ));
    }

    #[test]
    fn blobs_bundle_rlp_round_trip() {
        let original = bundle(2);
        let encoded = original.encode_to_vec();
        assert_eq!(BlobsBundle::decode(&encoded).unwrap(), original);
    }

    #[test]
    fn blobs_bundle_json() {
        let original = bundle(1);
        let json = serde_json::to_value(&original).unwrap();
        assert_eq!(json["commitments"][0], format!("0x{}", "c0".repeat(48)));
        assert_eq!(json["blobs"][0], format!("0x{}", "00".repeat(64)));
        let back: BlobsBundle = serde_json::from_value(json).unwrap();
        assert_eq!(back, original);
    }
}
