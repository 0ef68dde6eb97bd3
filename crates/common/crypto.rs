use ethereum_types::{H160, H256, U256};
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, SECP256K1,
};
use sha3::{Digest, Keccak256};

use crate::{errors::EthError, types::Address};

/// Length of an uncompressed secp256k1 public key, tag byte included.
pub const UNCOMPRESSED_PUBKEY_LEN: usize = 65;
const UNCOMPRESSED_TAG: u8 = 0x04;

pub fn keccak256(data: impl AsRef<[u8]>) -> H256 {
    keccak_hash::keccak(data.as_ref())
}

/// Recovers the uncompressed public key that produced the signature `(r, s)` over `hash`.
/// `recovery_bit` is the bare parity bit, never an EIP-155 packed `v`.
pub fn ecdsa_recover(
    hash: &H256,
    r: &U256,
    s: &U256,
    recovery_bit: u8,
) -> Result<[u8; UNCOMPRESSED_PUBKEY_LEN], EthError> {
    if recovery_bit > 1 {
        return Err(EthError::SignatureInvalid(format!(
            "recovery bit must be 0 or 1, got {recovery_bit}"
        )));
    }
    let mut compact = [0u8; 64];
    r.to_big_endian(&mut compact[..32]);
    s.to_big_endian(&mut compact[32..]);

    let recovery_id = RecoveryId::from_i32(recovery_bit as i32)
        .map_err(|err| EthError::SignatureInvalid(err.to_string()))?;
    let signature = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|err| EthError::SignatureInvalid(err.to_string()))?;
    let public_key = SECP256K1
        .recover_ecdsa(&Message::from_digest(hash.0), &signature)
        .map_err(|err| EthError::SignatureInvalid(err.to_string()))?;
    Ok(public_key.serialize_uncompressed())
}

/// Derives the account address owning an uncompressed public key.
pub fn address_from_pubkey(public_key: &[u8]) -> Result<Address, EthError> {
    if public_key.len() != UNCOMPRESSED_PUBKEY_LEN || public_key[0] != UNCOMPRESSED_TAG {
        return Err(EthError::SignatureInvalid(
            "public key is not an uncompressed secp256k1 point".to_string(),
        ));
    }
    let hash = Keccak256::new_with_prefix(&public_key[1..]).finalize();
    Ok(Address(H160::from_slice(&hash[12..])))
}

/// EIP-55 mixed-case encoding of a 40-digit hex address (no prefix).
/// Input case is ignored, so applying it twice is a no-op.
pub fn checksum(hex_address: &str) -> String {
    let lower = hex_address.to_ascii_lowercase();
    let digest = Keccak256::digest(lower.as_bytes());
    let mut out = String::with_capacity(lower.len() + 2);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = digest[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use proptest::prelude::*;

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            keccak256(b""),
            H256(hex!(
                "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
            ))
        );
    }

    #[test]
    fn checksum_known_addresses() {
        assert_eq!(
            checksum("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
        assert_eq!(
            checksum("fb6916095ca1df60bb79ce92ce3ea74c37c5d359"),
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        );
        assert_eq!(
            checksum("dbf03b407c01e7cd3cbea99509d93f8dddc8c6fb"),
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB"
        );
    }

    #[test]
    fn address_from_pubkey_rejects_compressed_keys() {
        let compressed = [0x02u8; 33];
        assert!(matches!(
            address_from_pubkey(&compressed),
            Err(EthError::SignatureInvalid(_))
        ));
    }

    #[test]
    fn recover_rejects_zero_signature() {
        let hash = keccak256(b"message");
        let result = ecdsa_recover(&hash, &U256::zero(), &U256::zero(), 0);
        assert!(matches!(result, Err(EthError::SignatureInvalid(_))));
    }

    #[test]
    fn recover_rejects_packed_v() {
        let hash = keccak256(b"message");
        let result = ecdsa_recover(&hash, &U256::one(), &U256::one(), 27);
        assert!(matches!(result, Err(EthError::SignatureInvalid(_))));
    }

    #[test]
    fn recover_round_trips_with_signer() {
        let secret = secp256k1::SecretKey::from_slice(&[0x11; 32]).unwrap();
        let hash = keccak256(b"ethwire");
        let signature =
            SECP256K1.sign_ecdsa_recoverable(&Message::from_digest(hash.0), &secret);
        let (recovery_id, compact) = signature.serialize_compact();
        let r = U256::from_big_endian(&compact[..32]);
        let s = U256::from_big_endian(&compact[32..]);

        let recovered = ecdsa_recover(&hash, &r, &s, recovery_id.to_i32() as u8).unwrap();
        let expected = secp256k1::PublicKey::from_secret_key(SECP256K1, &secret);
        assert_eq!(recovered, expected.serialize_uncompressed());
        assert_eq!(recovered[0], 0x04);
    }

    proptest! {
        #[test]
        fn proptest_checksum_idempotent(bytes in any::<[u8; 20]>()) {
            let once = checksum(&hex::encode(bytes));
            let twice = checksum(&once[2..]);
            prop_assert_eq!(once, twice);
        }
    }
}
