use super::{
    constants::{
        MAX_RLP_ITEM_SIZE, RLP_EMPTY_LIST, RLP_LONG_LIST, RLP_LONG_STRING, RLP_NULL,
        RLP_SHORT_MAX_LEN,
    },
    error::RLPDecodeError,
};
use bytes::Bytes;
use ethereum_types::{Bloom, H160, H256, H32, H64, U256};

/// Trait for decoding RLP encoded slices of data.
/// See <https://ethereum.org/en/developers/docs/data-structures-and-encoding/rlp/#rlp-decoding> for more information.
/// The [`decode_unfinished`](RLPDecode::decode_unfinished) method is used to decode an RLP encoded slice of data and return the decoded value along with the remaining bytes.
/// The [`decode`](RLPDecode::decode) method is used to decode an RLP encoded slice of data and return the decoded value.
/// Implementors need to implement the [`decode_unfinished`](RLPDecode::decode_unfinished) method.
/// While consumers can use the [`decode`](RLPDecode::decode) method to decode the RLP encoded data.
pub trait RLPDecode: Sized {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError>;

    fn decode(rlp: &[u8]) -> Result<Self, RLPDecodeError> {
        let (decoded, remaining) = Self::decode_unfinished(rlp)?;
        if !remaining.is_empty() {
            return Err(RLPDecodeError::ExtraData);
        }

        Ok(decoded)
    }
}

impl RLPDecode for bool {
    #[inline(always)]
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let Some(&first) = buf.first() else {
            return Err(RLPDecodeError::Truncated);
        };
        let value = match first {
            RLP_NULL => false,
            0x01 => true,
            _ => return Err(RLPDecodeError::MalformedBoolean),
        };

        Ok((value, &buf[1..]))
    }
}

macro_rules! impl_decode_uint {
    ($($t:ty),*) => {
        $(
            impl RLPDecode for $t {
                fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
                    let (bytes, rest) = decode_bytes(rlp)?;
                    let padded_bytes = static_left_pad(bytes)?;
                    Ok((<$t>::from_be_bytes(padded_bytes), rest))
                }
            }
        )*
    };
}

impl_decode_uint!(u8, u16, u32, u64, usize, u128);

// Decodes a slice of bytes of a fixed size. If you want to decode a list of elements,
// you should use the Vec<T> implementation (for elements of the same type),
// or use the decode implementation for tuples (for elements of different types)
impl<const N: usize> RLPDecode for [u8; N] {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (decoded_bytes, rest) = decode_bytes(rlp)?;
        let value = decoded_bytes
            .try_into()
            .map_err(|_| RLPDecodeError::MalformedData)?;

        Ok((value, rest))
    }
}

impl RLPDecode for Bytes {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (decoded, rest) = decode_bytes(rlp)?;
        Ok((Bytes::copy_from_slice(decoded), rest))
    }
}

macro_rules! impl_decode_fixed_hash {
    ($($t:ident),*) => {
        $(
            impl RLPDecode for $t {
                fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
                    let (value, rest) = RLPDecode::decode_unfinished(rlp)?;
                    Ok(($t(value), rest))
                }
            }
        )*
    };
}

impl_decode_fixed_hash!(H32, H64, H160, H256, Bloom);

impl RLPDecode for U256 {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (bytes, rest) = decode_bytes(rlp)?;
        let padded_bytes: [u8; 32] = static_left_pad(bytes)?;
        Ok((U256::from_big_endian(&padded_bytes), rest))
    }
}

impl RLPDecode for String {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (str_bytes, rest) = decode_bytes(rlp)?;
        let value =
            String::from_utf8(str_bytes.to_vec()).map_err(|_| RLPDecodeError::MalformedData)?;
        Ok((value, rest))
    }
}

// Here we interpret a Vec<T> as a list of elements of the same type.
// If you need to decode a slice of bytes, you should decode it via the
// [u8; N] implementation or similar (Bytes, etc).
impl<T: RLPDecode> RLPDecode for Vec<T> {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (is_list, payload, input_rest) = decode_rlp_item(rlp)?;
        if !is_list {
            return Err(RLPDecodeError::UnexpectedString);
        }

        let mut result = Vec::new();
        let mut current_slice = payload;

        while !current_slice.is_empty() {
            let (item, rest_current_list) = T::decode_unfinished(current_slice)?;
            result.push(item);
            current_slice = rest_current_list;
        }

        Ok((result, input_rest))
    }
}

impl<T1: RLPDecode, T2: RLPDecode> RLPDecode for (T1, T2) {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (is_list, payload, input_rest) = decode_rlp_item(rlp)?;
        if !is_list {
            return Err(RLPDecodeError::UnexpectedString);
        }

        let (first, first_rest) = T1::decode_unfinished(payload)?;
        let (second, second_rest) = T2::decode_unfinished(first_rest)?;

        // check that there is no more data to parse after the second element.
        if !second_rest.is_empty() {
            return Err(RLPDecodeError::MalformedData);
        }

        Ok(((first, second), input_rest))
    }
}

impl<T1: RLPDecode, T2: RLPDecode, T3: RLPDecode> RLPDecode for (T1, T2, T3) {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (is_list, payload, input_rest) = decode_rlp_item(rlp)?;
        if !is_list {
            return Err(RLPDecodeError::UnexpectedString);
        }
        let (first, first_rest) = T1::decode_unfinished(payload)?;
        let (second, second_rest) = T2::decode_unfinished(first_rest)?;
        let (third, third_rest) = T3::decode_unfinished(second_rest)?;
        // check that there is no more data to decode after the third element.
        if !third_rest.is_empty() {
            return Err(RLPDecodeError::MalformedData);
        }

        Ok(((first, second, third), input_rest))
    }
}

/// Reads a long-form size field of `length_of_length` bytes.
/// Size fields must be minimal and describe a payload that could not
/// have used the short form.
fn read_long_size(length_bytes: &[u8]) -> Result<usize, RLPDecodeError> {
    if length_bytes.first() == Some(&0) {
        return Err(RLPDecodeError::InvalidPrefix);
    }
    let size = length_bytes
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
    if size > MAX_RLP_ITEM_SIZE as u64 {
        return Err(RLPDecodeError::SizeOverflow);
    }
    let size = size as usize;
    if size <= RLP_SHORT_MAX_LEN {
        return Err(RLPDecodeError::InvalidPrefix);
    }
    Ok(size)
}

/// Returns `(is_list, header_len, payload_len)` for the item at the start of `data`,
/// checking that the whole item fits in `data`.
fn item_bounds(data: &[u8]) -> Result<(bool, usize, usize), RLPDecodeError> {
    let Some(&first_byte) = data.first() else {
        return Err(RLPDecodeError::Truncated);
    };

    let (is_list, header_len, payload_len) = match first_byte {
        0..=0x7F => return Ok((false, 0, 1)),
        RLP_NULL..=RLP_LONG_STRING => {
            let length = (first_byte - RLP_NULL) as usize;
            // A single byte below 0x80 is its own encoding.
            if length == 1 && data.get(1).is_some_and(|byte| *byte < RLP_NULL) {
                return Err(RLPDecodeError::InvalidPrefix);
            }
            (false, 1, length)
        }
        0xB8..=0xBF => {
            let length_of_length = (first_byte - RLP_LONG_STRING) as usize;
            let length_bytes = data
                .get(1..length_of_length + 1)
                .ok_or(RLPDecodeError::Truncated)?;
            (false, length_of_length + 1, read_long_size(length_bytes)?)
        }
        RLP_EMPTY_LIST..=RLP_LONG_LIST => (true, 1, (first_byte - RLP_EMPTY_LIST) as usize),
        0xF8..=0xFF => {
            let length_of_length = (first_byte - RLP_LONG_LIST) as usize;
            let length_bytes = data
                .get(1..length_of_length + 1)
                .ok_or(RLPDecodeError::Truncated)?;
            (true, length_of_length + 1, read_long_size(length_bytes)?)
        }
    };

    if data.len() < header_len + payload_len {
        return Err(RLPDecodeError::Truncated);
    }
    Ok((is_list, header_len, payload_len))
}

/// Decodes an RLP item from a slice of bytes.
/// It returns a 3-element tuple with the following elements:
/// - A boolean indicating if the item is a list or not.
/// - The payload of the item, without its prefix.
/// - The remaining bytes after the item.
pub fn decode_rlp_item(data: &[u8]) -> Result<(bool, &[u8], &[u8]), RLPDecodeError> {
    let (is_list, header_len, payload_len) = item_bounds(data)?;
    let end = header_len + payload_len;
    Ok((is_list, &data[header_len..end], &data[end..]))
}

/// Splits an RLP item in two:
/// - The first item including its prefix
/// - The remaining bytes after the item
///
/// It returns a 2-element tuple with the following elements:
/// - The payload of the item, including its prefix.
/// - The remaining bytes after the item.
pub fn get_item_with_prefix(data: &[u8]) -> Result<(&[u8], &[u8]), RLPDecodeError> {
    let (_, header_len, payload_len) = item_bounds(data)?;
    Ok(data.split_at(header_len + payload_len))
}

/// Splits an RLP list into its encoded items (each including its prefix).
/// Returns the items and the remaining bytes after the list.
pub fn decode_list_items(data: &[u8]) -> Result<(Vec<&[u8]>, &[u8]), RLPDecodeError> {
    let (is_list, mut payload, rest) = decode_rlp_item(data)?;
    if !is_list {
        return Err(RLPDecodeError::UnexpectedString);
    }
    let mut items = Vec::new();
    while !payload.is_empty() {
        let (item, remaining) = get_item_with_prefix(payload)?;
        items.push(item);
        payload = remaining;
    }
    Ok((items, rest))
}

/// Returns true if the slice starts with a list item.
pub fn is_list(rlp: &[u8]) -> bool {
    rlp.first().is_some_and(|prefix| *prefix >= RLP_EMPTY_LIST)
}

/// Decodes the payload of an RLP item from a slice of bytes.
/// It returns a 2-element tuple with the following elements:
/// - The payload of the item.
/// - The remaining bytes after the item.
pub fn decode_bytes(data: &[u8]) -> Result<(&[u8], &[u8]), RLPDecodeError> {
    let (is_list, payload, rest) = decode_rlp_item(data)?;
    if is_list {
        return Err(RLPDecodeError::UnexpectedList);
    }
    Ok((payload, rest))
}

/// Pads a slice of bytes with zeros on the left to make it a fixed size slice.
/// The size of the data must be less than or equal to the size of the output array.
#[inline]
pub fn static_left_pad<const N: usize>(data: &[u8]) -> Result<[u8; N], RLPDecodeError> {
    let mut result = [0; N];

    if data.is_empty() {
        return Ok(result);
    }
    if data[0] == 0 {
        return Err(RLPDecodeError::MalformedData);
    }
    let data_start_index = N
        .checked_sub(data.len())
        .ok_or(RLPDecodeError::MalformedData)?;
    result[data_start_index..].copy_from_slice(data);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_bool() {
        let rlp = vec![0x01];
        let decoded = bool::decode(&rlp).unwrap();
        assert!(decoded);

        let rlp = vec![RLP_NULL];
        let decoded = bool::decode(&rlp).unwrap();
        assert!(!decoded);

        let rlp = vec![0x02];
        assert_eq!(bool::decode(&rlp), Err(RLPDecodeError::MalformedBoolean));
    }

    #[test]
    fn test_decode_u8() {
        let rlp = vec![0x01];
        let decoded = u8::decode(&rlp).unwrap();
        assert_eq!(decoded, 1);

        let rlp = vec![RLP_NULL];
        let decoded = u8::decode(&rlp).unwrap();
        assert_eq!(decoded, 0);

        let rlp = vec![0x7Fu8];
        let decoded = u8::decode(&rlp).unwrap();
        assert_eq!(decoded, 127);

        let rlp = vec![RLP_NULL + 1, RLP_NULL];
        let decoded = u8::decode(&rlp).unwrap();
        assert_eq!(decoded, 128);

        let rlp = vec![RLP_NULL + 1, 0xFF];
        let decoded = u8::decode(&rlp).unwrap();
        assert_eq!(decoded, 255);
    }

    #[test]
    fn test_decode_u32() {
        let rlp = vec![0x83, 0x01, 0x00, 0x00];
        let decoded = u32::decode(&rlp).unwrap();
        assert_eq!(decoded, 65536);
    }

    #[test]
    fn test_decode_integer_with_leading_zero_fails() {
        let rlp = vec![0x82, 0x00, 0x01];
        assert_eq!(u32::decode(&rlp), Err(RLPDecodeError::MalformedData));
    }

    #[test]
    fn test_decode_integer_too_large_fails() {
        let rlp = vec![0x83, 0x01, 0x00, 0x00];
        assert_eq!(u16::decode(&rlp), Err(RLPDecodeError::MalformedData));
    }

    #[test]
    fn test_decode_fixed_length_array() {
        let rlp = vec![0x0f];
        let decoded = <[u8; 1]>::decode(&rlp).unwrap();
        assert_eq!(decoded, [0x0f]);

        let rlp = vec![RLP_NULL + 3, 0x02, 0x03, 0x04];
        let decoded = <[u8; 3]>::decode(&rlp).unwrap();
        assert_eq!(decoded, [0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_decode_u256() {
        let rlp = vec![RLP_NULL + 1, 0x01];
        assert_eq!(
            U256::decode(&rlp),
            Err(RLPDecodeError::InvalidPrefix),
            "single byte below 0x80 must be encoded as itself"
        );

        let rlp = vec![0x01];
        let decoded = U256::decode(&rlp).unwrap();
        assert_eq!(decoded, U256::from(1));

        let mut rlp = vec![RLP_NULL + 32];
        let number_bytes = [0x01; 32];
        rlp.extend(number_bytes);
        let decoded = U256::decode(&rlp).unwrap();
        let expected = U256::from_big_endian(&number_bytes);
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_decode_string() {
        let rlp = vec![RLP_NULL + 3, b'd', b'o', b'g'];
        let decoded = String::decode(&rlp).unwrap();
        let expected = String::from("dog");
        assert_eq!(decoded, expected);

        let rlp = vec![RLP_NULL];
        let decoded = String::decode(&rlp).unwrap();
        let expected = String::from("");
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_decode_lists() {
        // empty list
        let rlp = vec![RLP_EMPTY_LIST];
        let decoded: Vec<String> = Vec::decode(&rlp).unwrap();
        let expected: Vec<String> = vec![];
        assert_eq!(decoded, expected);

        //  list with a single number
        let rlp = vec![RLP_EMPTY_LIST + 1, 0x01];
        let decoded: Vec<u8> = Vec::decode(&rlp).unwrap();
        let expected = vec![1];
        assert_eq!(decoded, expected);

        // list with 3 numbers
        let rlp = vec![RLP_EMPTY_LIST + 3, 0x01, 0x02, 0x03];
        let decoded: Vec<u8> = Vec::decode(&rlp).unwrap();
        let expected = vec![1, 2, 3];
        assert_eq!(decoded, expected);

        // list of strings
        let rlp = vec![0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g'];
        let decoded: Vec<String> = Vec::decode(&rlp).unwrap();
        let expected = vec!["cat".to_string(), "dog".to_string()];
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_decode_list_of_lists() {
        // list of list of strings
        let rlp = vec![
            0xd2, 0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g', 0xc8, 0x83, b'f', b'o',
            b'o', 0x83, b'b', b'a', b'r',
        ];
        let decoded: Vec<Vec<String>> = Vec::decode(&rlp).unwrap();
        let expected = vec![
            vec!["cat".to_string(), "dog".to_string()],
            vec!["foo".to_string(), "bar".to_string()],
        ];
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_decode_tuples() {
        // tuple with string and number
        let rlp = vec![RLP_EMPTY_LIST + 5, 0x01, 0x83, b'c', b'a', b't'];
        let decoded: (u8, String) = <(u8, String)>::decode(&rlp).unwrap();
        let expected = (1, "cat".to_string());
        assert_eq!(decoded, expected);

        // tuple with list and number
        let rlp = vec![RLP_EMPTY_LIST + 2, RLP_EMPTY_LIST, 0x03];
        let decoded = <(Vec<u8>, u8)>::decode(&rlp).unwrap();
        let expected = (vec![], 3);
        assert_eq!(decoded, expected);

        // tuple with numbers
        let rlp = vec![RLP_EMPTY_LIST + 3, 0x01, 0x02, 0x03];
        let decoded: (u8, u8, u8) = <(u8, u8, u8)>::decode(&rlp).unwrap();
        assert_eq!(decoded, (1, 2, 3));
    }

    #[test]
    fn test_decode_list_as_string() {
        // [1, 2, 3, 4] != 0x01020304
        let rlp = vec![RLP_EMPTY_LIST + 4, 0x01, 0x02, 0x03, 0x04];
        let decoded: Result<[u8; 4], _> = RLPDecode::decode(&rlp);
        assert_eq!(decoded, Err(RLPDecodeError::UnexpectedList));
    }

    #[test]
    fn test_decode_truncated_items() {
        // declared 3 bytes, only 2 present
        assert_eq!(
            decode_rlp_item(&[0x83, b'd', b'o']),
            Err(RLPDecodeError::Truncated)
        );
        // size-of-length region cut short
        assert_eq!(decode_rlp_item(&[0xb9, 0x01]), Err(RLPDecodeError::Truncated));
        // long list body cut short
        assert_eq!(
            decode_rlp_item(&[0xf8, 0x40, 0x80]),
            Err(RLPDecodeError::Truncated)
        );
        assert_eq!(decode_rlp_item(&[]), Err(RLPDecodeError::Truncated));
    }

    #[test]
    fn test_decode_non_canonical_sizes() {
        // long form used for a 3-byte string
        assert_eq!(
            decode_rlp_item(&[0xb8, 0x03, b'd', b'o', b'g']),
            Err(RLPDecodeError::InvalidPrefix)
        );
        // size field with a leading zero
        let mut rlp = vec![0xb9, 0x00, 0x40];
        rlp.extend([0u8; 0x40]);
        assert_eq!(decode_rlp_item(&rlp), Err(RLPDecodeError::InvalidPrefix));
    }

    #[test]
    fn test_decode_oversized_size_field() {
        let rlp = [0xff, 0x01, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(decode_rlp_item(&rlp), Err(RLPDecodeError::SizeOverflow));
    }

    #[test]
    fn test_decode_list_items() {
        let rlp = [0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g', 0x01];
        let (items, rest) = decode_list_items(&rlp).unwrap();
        assert_eq!(items, vec![&rlp[1..5], &rlp[5..9]]);
        assert_eq!(rest, &[0x01]);
    }

    #[test]
    fn test_decode_trailing_bytes_fail() {
        assert_eq!(u8::decode(&[0x01, 0x02]), Err(RLPDecodeError::ExtraData));
    }
}
