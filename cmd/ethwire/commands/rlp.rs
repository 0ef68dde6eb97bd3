use bytes::Bytes;
use clap::Subcommand;
use ethwire_rlp::{value::decode_hex_prefixed, Value};
use eyre::eyre;
use serde_json::Value as Json;

#[derive(Subcommand)]
pub(crate) enum Command {
    #[clap(about = "Decode an RLP item into nested arrays of hex strings.")]
    Decode {
        #[arg(help = "0x-prefixed RLP encoding.")]
        raw: String,
    },
    #[clap(about = "Encode nested arrays of hex strings as RLP.")]
    Encode {
        #[arg(help = r#"JSON item, e.g. '["0x01", ["0x"]]'."#)]
        json: String,
    },
}

impl Command {
    pub fn run(self) -> eyre::Result<Json> {
        match self {
            Command::Decode { raw } => Ok(value_to_json(&Value::decode_hex(&raw)?)),
            Command::Encode { json } => {
                let value = value_from_json(&serde_json::from_str(&json)?)?;
                Ok(Json::String(value.encode_hex()))
            }
        }
    }
}

pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Bytes(bytes) => Json::String(format!("0x{}", hex::encode(bytes))),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
    }
}

pub fn value_from_json(json: &Json) -> eyre::Result<Value> {
    match json {
        Json::String(text) => Ok(Value::bytes(Bytes::from(decode_hex_prefixed(text)?))),
        Json::Array(items) => Ok(Value::list(
            items
                .iter()
                .map(value_from_json)
                .collect::<eyre::Result<_>>()?,
        )),
        other => Err(eyre!("expected a hex string or an array, got {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_nested_item() {
        // ["cat", ["dog"], ""]
        let output = Command::Decode {
            raw: "0xca83636174c483646f6780".to_string(),
        }
        .run()
        .unwrap();
        assert_eq!(output, json!(["0x636174", ["0x646f67"], "0x"]));
    }

    #[test]
    fn encode_is_inverse_of_decode() {
        let output = Command::Encode {
            json: r#"["0x636174", ["0x646f67"], "0x"]"#.to_string(),
        }
        .run()
        .unwrap();
        assert_eq!(output, json!("0xca83636174c483646f6780"));
    }

    #[test]
    fn encode_rejects_numbers() {
        assert!(Command::Encode {
            json: "[1]".to_string()
        }
        .run()
        .is_err());
        assert!(Command::Decode {
            raw: "0xc2".to_string()
        }
        .run()
        .is_err());
    }
}
