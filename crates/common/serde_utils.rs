use serde::{de::Error, Deserialize, Deserializer, Serializer};

/// Serializes to and deserializes from 0x prefixed hex string, `0x0` or `0x1`
pub mod bool {
    use super::*;

    pub fn deserialize<'de, D>(d: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(d)?;
        match value.as_str() {
            "0x0" => Ok(false),
            "0x1" => Ok(true),
            other => Err(D::Error::custom(format!(
                "Failed to deserialize hex string {other} to boolean value"
            ))),
        }
    }

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:#x}", *value as u8))
    }

    pub mod opt {
        use super::*;

        pub fn deserialize<'de, D>(d: D) -> Result<Option<bool>, D::Error>
        where
            D: Deserializer<'de>,
        {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "super")] bool);

            Ok(Option::<Wrapper>::deserialize(d)?.map(|Wrapper(value)| value))
        }

        pub fn serialize<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }
    }
}

/// KZG commitments and proofs, 48 bytes each.
pub mod bytes48 {
    use super::*;

    pub fn deserialize<'de, D>(d: D) -> Result<[u8; 48], D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(d)?;
        parse::<D::Error>(&value)
    }

    pub fn serialize<S>(value: &[u8; 48], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(value)))
    }

    fn parse<E: Error>(value: &str) -> Result<[u8; 48], E> {
        let bytes = crate::types::parse_hex(value, Some(48)).map_err(E::custom)?;
        let mut out = [0u8; 48];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    pub mod vec {
        use serde::ser::SerializeSeq;

        use super::*;

        pub fn deserialize<'de, D>(d: D) -> Result<Vec<[u8; 48]>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value = Vec::<String>::deserialize(d)?;
            value.iter().map(|s| parse::<D::Error>(s)).collect()
        }

        pub fn serialize<S>(value: &Vec<[u8; 48]>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let mut seq_serializer = serializer.serialize_seq(Some(value.len()))?;
            for encoded in value {
                seq_serializer.serialize_element(&format!("0x{}", hex::encode(encoded)))?;
            }
            seq_serializer.end()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Parity {
        #[serde(with = "super::bool")]
        y_parity: bool,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Commitments {
        #[serde(with = "super::bytes48::vec")]
        commitments: Vec<[u8; 48]>,
    }

    #[test]
    fn bool_as_hex() {
        let json = r#"{"y_parity":"0x1"}"#;
        let parsed: Parity = serde_json::from_str(json).unwrap();
        assert!(parsed.y_parity);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), json);
        assert!(serde_json::from_str::<Parity>(r#"{"y_parity":"0x2"}"#).is_err());
        assert!(serde_json::from_str::<Parity>(r#"{"y_parity":"1"}"#).is_err());
    }

    #[test]
    fn bytes48_vec_enforces_width() {
        let json = format!(r#"{{"commitments":["0x{}"]}}"#, "ab".repeat(48));
        let parsed: Commitments = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.commitments, vec![[0xab; 48]]);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), json);

        let short = format!(r#"{{"commitments":["0x{}"]}}"#, "ab".repeat(47));
        assert!(serde_json::from_str::<Commitments>(&short).is_err());
    }
}
