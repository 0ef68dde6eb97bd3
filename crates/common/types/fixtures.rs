//! Signed sample transactions for unit tests.

use ethereum_types::{H160, H256, U256};
use secp256k1::{Message, PublicKey, SecretKey, SECP256K1};

use super::{
    pack_legacy_v, AccessListEntry, Address, BlobsBundle, Data, EIP1559Transaction,
    EIP2930Transaction, EIP4844Transaction, EIP7702Transaction, LegacyTransaction, Quantity,
    SetCodeAuthorization, Transaction, TxKind,
};
use crate::crypto;

const SENDER_KEY: [u8; 32] = [0x46; 32];
const AUTHORITY_KEY: [u8; 32] = [0x07; 32];

fn recipient() -> TxKind {
    TxKind::Call(Address(H160::repeat_byte(0x35)))
}

fn address_of(key: &[u8; 32]) -> Address {
    let secret = SecretKey::from_slice(key).unwrap();
    let public_key = PublicKey::from_secret_key(SECP256K1, &secret);
    crypto::address_from_pubkey(&public_key.serialize_uncompressed()).unwrap()
}

fn sign_hash(key: &[u8; 32], hash: H256) -> (u8, U256, U256) {
    let secret = SecretKey::from_slice(key).unwrap();
    let (recovery_id, compact) = SECP256K1
        .sign_ecdsa_recoverable(&Message::from_digest(hash.0), &secret)
        .serialize_compact();
    (
        recovery_id.to_i32() as u8,
        U256::from_big_endian(&compact[..32]),
        U256::from_big_endian(&compact[32..]),
    )
}

/// Signs `tx` with the sample sender key. Returns the signed transaction and the sender.
/// Legacy transactions keep the chain id already packed in their `v`.
pub fn sign(mut tx: Transaction) -> (Transaction, Address) {
    let hash = tx.signing_hash().unwrap();
    let (bit, r, s) = sign_hash(&SENDER_KEY, hash);
    match &mut tx {
        Transaction::LegacyTransaction(t) => {
            let chain_id = t.chain_id().unwrap();
            t.v = pack_legacy_v(chain_id.as_ref(), bit);
            t.r = r;
            t.s = s;
        }
        Transaction::EIP2930Transaction(t) => {
            (t.signature_y_parity, t.signature_r, t.signature_s) = (bit == 1, r, s)
        }
        Transaction::EIP1559Transaction(t) => {
            (t.signature_y_parity, t.signature_r, t.signature_s) = (bit == 1, r, s)
        }
        Transaction::EIP4844Transaction(t) => {
            (t.signature_y_parity, t.signature_r, t.signature_s) = (bit == 1, r, s)
        }
        Transaction::EIP7702Transaction(t) => {
            (t.signature_y_parity, t.signature_r, t.signature_s) = (bit == 1, r, s)
        }
    }
    (tx, address_of(&SENDER_KEY))
}

pub fn authority_address() -> Address {
    address_of(&AUTHORITY_KEY)
}

pub fn legacy_eip155() -> Transaction {
    Transaction::LegacyTransaction(LegacyTransaction {
        nonce: Quantity::from(9u64),
        gas_price: Quantity::from(20_000_000_000u64),
        gas: Quantity::from(21_000u64),
        to: recipient(),
        value: Quantity::from(1_000_000_000_000_000_000u64),
        data: Data::default(),
        v: pack_legacy_v(Some(&Quantity::from(1u64)), 0),
        ..Default::default()
    })
}

pub fn legacy_pre_eip155() -> Transaction {
    Transaction::LegacyTransaction(LegacyTransaction {
        nonce: Quantity::zero(),
        gas_price: Quantity::from(50_000_000_000u64),
        gas: Quantity::from(90_000u64),
        to: TxKind::Create,
        value: Quantity::zero(),
        data: Data::from(vec![0x60, 0x80, 0x60, 0x40, 0x52]),
        v: Quantity::from(27u64),
        ..Default::default()
    })
}

pub fn eip2930() -> Transaction {
    Transaction::EIP2930Transaction(EIP2930Transaction {
        chain_id: Quantity::from(1u64),
        nonce: Quantity::from(1u64),
        gas_price: Quantity::from(30_000_000_000u64),
        gas_limit: Quantity::from(60_000u64),
        to: recipient(),
        value: Quantity::zero(),
        data: Data::from(vec![0xa9, 0x05, 0x9c, 0xbb]),
        access_list: vec![
            AccessListEntry::new(
                Address(H160::repeat_byte(0x35)),
                vec![H256::zero(), H256::from_low_u64_be(1)],
            ),
            AccessListEntry::new(Address(H160::repeat_byte(0x36)), vec![]),
        ],
        ..Default::default()
    })
}

pub fn eip1559() -> Transaction {
    Transaction::EIP1559Transaction(EIP1559Transaction {
        chain_id: Quantity::from(1u64),
        nonce: Quantity::from(2u64),
        max_priority_fee_per_gas: Quantity::from(1_500_000_000u64),
        max_fee_per_gas: Quantity::from(40_000_000_000u64),
        gas_limit: Quantity::from(21_000u64),
        to: recipient(),
        value: Quantity::from(12_345u64),
        data: Data::default(),
        access_list: vec![],
        ..Default::default()
    })
}

pub fn eip4844() -> Transaction {
    Transaction::EIP4844Transaction(EIP4844Transaction {
        chain_id: Quantity::from(1u64),
        nonce: Quantity::from(3u64),
        max_priority_fee_per_gas: Quantity::from(1_000_000_000u64),
        max_fee_per_gas: Quantity::from(30_000_000_000u64),
        gas: Quantity::from(100_000u64),
        to: recipient(),
        value: Quantity::zero(),
        data: Data::default(),
        access_list: vec![],
        max_fee_per_blob_gas: Quantity::from(2u64),
        blob_versioned_hashes: vec![
            H256::from_low_u64_be(0x0101),
            H256::from_low_u64_be(0x0102),
        ],
        ..Default::default()
    })
}

pub fn eip7702() -> Transaction {
    let mut authorization = SetCodeAuthorization {
        chain_id: Quantity::from(1u64),
        address: Address(H160::repeat_byte(0x77)),
        nonce: Quantity::from(3u64),
        y_parity: Quantity::zero(),
        r: U256::zero(),
        s: U256::zero(),
    };
    let (bit, r, s) = sign_hash(&AUTHORITY_KEY, authorization.signing_hash());
    authorization.y_parity = Quantity::from(bit);
    authorization.r = r;
    authorization.s = s;

    Transaction::EIP7702Transaction(EIP7702Transaction {
        chain_id: Quantity::from(1u64),
        nonce: Quantity::from(4u64),
        max_priority_fee_per_gas: Quantity::from(1_000_000_000u64),
        max_fee_per_gas: Quantity::from(30_000_000_000u64),
        gas_limit: Quantity::from(80_000u64),
        destination: authority_address(),
        value: Quantity::zero(),
        data: Data::default(),
        access_list: vec![],
        authorization_list: vec![authorization],
        ..Default::default()
    })
}

pub fn blobs_bundle(count: usize) -> BlobsBundle {
    BlobsBundle {
        blobs: (0..count).map(|i| Data::from(vec![i as u8 + 1; 32])).collect(),
        commitments: vec![[0xc0; 48]; count],
        proofs: vec![[0x9f; 48]; count],
    }
}
