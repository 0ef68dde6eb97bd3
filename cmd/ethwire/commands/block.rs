use clap::Subcommand;
use ethwire_core::types::Block;
use serde_json::Value as Json;
use tracing::info;

#[derive(Subcommand)]
pub(crate) enum Command {
    #[clap(about = "Decode a raw RLP block and print it with full transactions.")]
    Decode {
        #[arg(help = "0x-prefixed rlp([header, transactions, uncles]).")]
        raw: String,
    },
}

impl Command {
    pub fn run(self) -> eyre::Result<Json> {
        match self {
            Command::Decode { raw } => {
                let block = Block::decode_raw(&raw)?;
                info!(
                    hash = ?block.hash(),
                    transactions = block.transactions.len(),
                    "Decoded block"
                );
                Ok(serde_json::to_value(&block)?)
            }
        }
    }
}
