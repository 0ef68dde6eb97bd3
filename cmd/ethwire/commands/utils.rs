use ethwire_core::{
    types::{parse_hex, Address, HexData, LogsBloom},
    Bloom,
};
use serde_json::Value as Json;

pub fn checksum(address: &str) -> eyre::Result<Json> {
    Ok(Json::String(Address::parse_hex(address)?.to_checksum()))
}

pub fn bloom(items: &[String]) -> eyre::Result<Json> {
    let mut bloom = Bloom::zero();
    for item in items {
        bloom.add(&parse_hex(item, None)?);
    }
    Ok(serde_json::to_value(bloom)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn checksum_address() {
        assert_eq!(
            checksum("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap(),
            json!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")
        );
        assert!(checksum("0x5aaeb6053f3e94c9b9a09f33669435e7ef1bea").is_err());
    }

    #[test]
    fn bloom_of_items() {
        let item = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".to_string();
        let Json::String(text) = bloom(&[item.clone()]).unwrap() else {
            panic!("expected a hex string");
        };
        assert_eq!(text.len(), 2 + 512);
        let parsed = Bloom::parse_hex(&text).unwrap();
        assert!(parsed.might_contain(&parse_hex(&item, None).unwrap()));
    }
}
