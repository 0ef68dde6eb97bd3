use bytes::{BufMut, Bytes};
use ethereum_types::U256;
use tinyvec::ArrayVec;

use super::constants::{
    RLP_EMPTY_LIST, RLP_LONG_LIST, RLP_LONG_STRING, RLP_NULL, RLP_SHORT_MAX_LEN,
};

/// Function for encoding a value to RLP.
/// For encoding the value into a buffer directly, use [`RLPEncode::encode`].
pub fn encode<T: RLPEncode>(value: T) -> Vec<u8> {
    let mut buf = Vec::new();
    value.encode(&mut buf);
    buf
}

pub trait RLPEncode {
    fn encode(&self, buf: &mut dyn BufMut);

    fn length(&self) -> usize {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf.len()
    }

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

/// Strips the leading zero bytes of a big-endian integer.
pub(crate) fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&x| x != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

impl RLPEncode for bool {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        if *self {
            buf.put_u8(0x01);
        } else {
            buf.put_u8(RLP_NULL);
        }
    }

    #[inline(always)]
    fn length(&self) -> usize {
        1
    }
}

// Unsigned integers are encoded as their minimal big-endian byte string,
// zero being the empty string.
macro_rules! impl_encode_uint {
    ($($t:ty => $size:literal),*) => {
        $(
            impl RLPEncode for $t {
                fn encode(&self, buf: &mut dyn BufMut) {
                    match *self {
                        0 => buf.put_u8(RLP_NULL),
                        n @ 1..=0x7f => buf.put_u8(n as u8),
                        n => {
                            let mut bytes = ArrayVec::<[u8; $size]>::new();
                            bytes.extend_from_slice(&n.to_be_bytes());
                            let payload = trim_leading_zeros(&bytes);
                            buf.put_u8(RLP_NULL + payload.len() as u8);
                            buf.put_slice(payload);
                        }
                    }
                }
            }
        )*
    };
}

impl_encode_uint!(u8 => 1, u16 => 2, u32 => 4, u64 => 8, usize => 8, u128 => 16);

impl RLPEncode for [u8] {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        if self.len() == 1 && self[0] < RLP_NULL {
            buf.put_u8(self[0]);
        } else {
            encode_prefix(self.len(), RLP_NULL, RLP_LONG_STRING, buf);
            buf.put_slice(self);
        }
    }
}

impl<const N: usize> RLPEncode for [u8; N] {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_ref().encode(buf)
    }
}

impl RLPEncode for str {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }
}

impl RLPEncode for String {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }
}

impl RLPEncode for Bytes {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_ref().encode(buf)
    }
}

impl RLPEncode for U256 {
    fn encode(&self, buf: &mut dyn BufMut) {
        let mut bytes: [u8; 32] = [0; 32];
        self.to_big_endian(&mut bytes);
        trim_leading_zeros(&bytes).encode(buf)
    }
}

impl<T: RLPEncode> RLPEncode for Vec<T> {
    fn encode(&self, buf: &mut dyn BufMut) {
        if self.is_empty() {
            buf.put_u8(RLP_EMPTY_LIST);
        } else {
            let total_len = self.iter().map(RLPEncode::length).sum();
            encode_length(total_len, buf);
            for item in self {
                item.encode(buf);
            }
        }
    }
}

/// Writes the prefix of a list whose encoded children take `total_len` bytes.
pub fn encode_length(total_len: usize, buf: &mut dyn BufMut) {
    encode_prefix(total_len, RLP_EMPTY_LIST, RLP_LONG_LIST, buf)
}

fn encode_prefix(len: usize, short_base: u8, long_base: u8, buf: &mut dyn BufMut) {
    if len <= RLP_SHORT_MAX_LEN {
        buf.put_u8(short_base + len as u8);
    } else {
        let be_len = len.to_be_bytes();
        let len_bytes = trim_leading_zeros(&be_len);
        buf.put_u8(long_base + len_bytes.len() as u8);
        buf.put_slice(len_bytes);
    }
}

impl<S: RLPEncode, T: RLPEncode> RLPEncode for (S, T) {
    fn encode(&self, buf: &mut dyn BufMut) {
        let total_len = self.0.length() + self.1.length();
        encode_length(total_len, buf);
        self.0.encode(buf);
        self.1.encode(buf);
    }
}

impl<S: RLPEncode, T: RLPEncode, U: RLPEncode> RLPEncode for (S, T, U) {
    fn encode(&self, buf: &mut dyn BufMut) {
        let total_len = self.0.length() + self.1.length() + self.2.length();
        encode_length(total_len, buf);
        self.0.encode(buf);
        self.1.encode(buf);
        self.2.encode(buf);
    }
}

impl<T: RLPEncode + ?Sized> RLPEncode for &T {
    fn encode(&self, buf: &mut dyn BufMut) {
        (**self).encode(buf)
    }
}

// encoding for Ethereum types

macro_rules! impl_encode_fixed_hash {
    ($($t:ty),*) => {
        $(
            impl RLPEncode for $t {
                fn encode(&self, buf: &mut dyn BufMut) {
                    self.as_bytes().encode(buf)
                }
            }
        )*
    };
}

impl_encode_fixed_hash!(
    ethereum_types::H32,
    ethereum_types::H64,
    ethereum_types::H160,
    ethereum_types::H256,
    ethereum_types::Bloom
);

#[cfg(test)]
mod tests {
    use ethereum_types::{Address, U256};
    use hex_literal::hex;

    use crate::constants::{RLP_EMPTY_LIST, RLP_NULL};

    use super::RLPEncode;

    #[test]
    fn can_encode_booleans() {
        let mut encoded = Vec::new();
        true.encode(&mut encoded);
        assert_eq!(encoded, vec![0x01]);

        let mut encoded = Vec::new();
        false.encode(&mut encoded);
        assert_eq!(encoded, vec![RLP_NULL]);
    }

    #[test]
    fn can_encode_u16() {
        assert_eq!(0u16.encode_to_vec(), vec![RLP_NULL]);
        assert_eq!(1u16.encode_to_vec(), vec![0x01]);
        assert_eq!(0x7Fu16.encode_to_vec(), vec![0x7f]);
        assert_eq!(0x80u16.encode_to_vec(), vec![RLP_NULL + 1, 0x80]);
        assert_eq!(0x0400u16.encode_to_vec(), vec![RLP_NULL + 2, 0x04, 0x00]);
    }

    #[test]
    fn can_encode_u8() {
        assert_eq!(0u8.encode_to_vec(), vec![RLP_NULL]);
        assert_eq!(0x7Fu8.encode_to_vec(), vec![0x7f]);
        assert_eq!(0x90u8.encode_to_vec(), vec![RLP_NULL + 1, 0x90]);
    }

    #[test]
    fn can_encode_u64() {
        assert_eq!(0u64.encode_to_vec(), vec![RLP_NULL]);
        assert_eq!(0x0102u64.encode_to_vec(), vec![RLP_NULL + 2, 0x01, 0x02]);
        assert_eq!(
            u64::MAX.encode_to_vec(),
            vec![RLP_NULL + 8, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn can_encode_bytes() {
        assert_eq!([0x00u8].encode_to_vec(), vec![0x00]);
        assert_eq!([0x0fu8].encode_to_vec(), vec![0x0f]);
        assert_eq!([0x04u8, 0x00].encode_to_vec(), vec![RLP_NULL + 2, 0x04, 0x00]);
        assert_eq!([0x80u8].encode_to_vec(), vec![RLP_NULL + 1, 0x80]);
    }

    #[test]
    fn can_encode_long_bytes() {
        let message = [0xaau8; 56];
        let encoded = message.encode_to_vec();
        assert_eq!(&encoded[..2], &[0xb8, 56]);
        assert_eq!(encoded.len(), 58);

        let message = vec![0x01u8; 1024];
        let encoded = message.as_slice().encode_to_vec();
        assert_eq!(&encoded[..3], &[0xb9, 0x04, 0x00]);
    }

    #[test]
    fn can_encode_strings() {
        let encoded = "dog".encode_to_vec();
        assert_eq!(encoded, vec![RLP_NULL + 3, b'd', b'o', b'g']);

        let encoded = "".encode_to_vec();
        assert_eq!(encoded, vec![RLP_NULL]);
    }

    #[test]
    fn can_encode_lists_of_str() {
        let message = vec!["cat", "dog"];
        let expected: [u8; 9] = [0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g'];
        assert_eq!(message.encode_to_vec(), expected);

        let message: Vec<&str> = vec![];
        assert_eq!(message.encode_to_vec(), vec![RLP_EMPTY_LIST]);
    }

    #[test]
    fn can_encode_long_list() {
        // fifteen encoded three-byte strings make a 60-byte payload
        let message = vec!["abc"; 15];
        let encoded = message.encode_to_vec();
        assert_eq!(&encoded[..2], &[0xf8, 60]);
        assert_eq!(encoded.len(), 62);
    }

    #[test]
    fn can_encode_addresses() {
        let address = Address::from(hex!("ef2d6d194084c2de36e0dabfce45d046b37d1106"));
        let expected = hex!("94ef2d6d194084c2de36e0dabfce45d046b37d1106");
        assert_eq!(address.encode_to_vec(), expected);
    }

    #[test]
    fn can_encode_u256() {
        assert_eq!(U256::zero().encode_to_vec(), vec![RLP_NULL]);
        assert_eq!(U256::from(1).encode_to_vec(), vec![1]);
        assert_eq!(U256::from(128).encode_to_vec(), vec![0x80 + 1, 128]);

        let encoded = U256::max_value().encode_to_vec();
        let mut expected: Vec<u8> = [0xff; 32].into();
        expected.insert(0, 0x80 + 32);
        assert_eq!(encoded, expected);
    }

    #[test]
    fn can_encode_tuple() {
        let tuple: (u8, u8) = (0x01, 0x02);
        assert_eq!(tuple.encode_to_vec(), vec![0xc0 + 2, 0x01, 0x02]);
    }
}
