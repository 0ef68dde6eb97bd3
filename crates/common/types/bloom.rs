use ethereum_types::Bloom;

use super::Log;
use crate::crypto;

/// Size of a logs bloom in bytes (2048 bits).
pub const BLOOM_BYTE_LENGTH: usize = 256;
/// Each hash pair selects a bit index in `0..2048`.
const BLOOM_BIT_MASK: u16 = 0x7ff;

/// 2048-bit logs bloom over keccak256 of the item, three bits per item.
pub trait LogsBloom {
    fn add(&mut self, item: &[u8]);
    fn might_contain(&self, item: &[u8]) -> bool;
}

/// Byte offset and bit mask of the three positions `item` sets.
fn bit_positions(item: &[u8]) -> [(usize, u8); 3] {
    let digest = crypto::keccak256(item);
    let d = digest.as_bytes();
    [0, 2, 4].map(|i| {
        let position = u16::from_be_bytes([d[i], d[i + 1]]) & BLOOM_BIT_MASK;
        (
            BLOOM_BYTE_LENGTH - 1 - (position >> 3) as usize,
            1u8 << (position & 7),
        )
    })
}

impl LogsBloom for Bloom {
    fn add(&mut self, item: &[u8]) {
        for (byte, mask) in bit_positions(item) {
            self.0[byte] |= mask;
        }
    }

    fn might_contain(&self, item: &[u8]) -> bool {
        bit_positions(item)
            .iter()
            .all(|(byte, mask)| self.0[*byte] & mask == *mask)
    }
}

/// Accrues the address and every topic of each log.
pub fn logs_bloom(logs: &[Log]) -> Bloom {
    let mut bloom = Bloom::zero();
    for log in logs {
        bloom.add(log.address.as_bytes());
        for topic in log.topics.iter() {
            bloom.add(topic.as_bytes());
        }
    }
    bloom
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, Data};
    use ethereum_types::{BloomInput, H160, H256};
    use proptest::prelude::*;

    #[test]
    fn empty_bloom_contains_nothing() {
        let bloom = Bloom::zero();
        assert!(!bloom.might_contain(b"anything"));
        assert_eq!(logs_bloom(&[]), Bloom::zero());
    }

    #[test]
    fn add_matches_reference_accrue() {
        let address = H160::repeat_byte(0x11);
        let topic = H256::repeat_byte(0x22);

        let mut ours = Bloom::zero();
        ours.add(address.as_bytes());
        ours.add(topic.as_bytes());

        let mut reference = Bloom::zero();
        reference.accrue(BloomInput::Raw(address.as_bytes()));
        reference.accrue(BloomInput::Raw(topic.as_bytes()));

        assert_eq!(ours, reference);
        // Three bits at most per item.
        let set_bits: u32 = ours.0.iter().map(|b| b.count_ones()).sum();
        assert!(set_bits <= 6);
    }

    #[test]
    fn logs_bloom_covers_addresses_and_topics() {
        let log = Log {
            address: Address(H160::repeat_byte(0xaa)),
            topics: vec![H256::repeat_byte(1), H256::repeat_byte(2)],
            data: Data::from(vec![0xff; 4]),
            ..Default::default()
        };
        let bloom = logs_bloom(&[log.clone()]);
        assert!(bloom.might_contain(log.address.as_bytes()));
        assert!(bloom.might_contain(log.topics[0].as_bytes()));
        assert!(bloom.might_contain(log.topics[1].as_bytes()));
        assert!(bloom.contains_input(BloomInput::Raw(log.address.as_bytes())));
    }

    proptest! {
        #[test]
        fn proptest_bloom_has_no_false_negatives(items in proptest::collection::vec(any::<Vec<u8>>(), 1..16)) {
            let mut bloom = Bloom::zero();
            for item in &items {
                bloom.add(item);
            }
            for item in &items {
                prop_assert!(bloom.might_contain(item));
            }
        }
    }
}
