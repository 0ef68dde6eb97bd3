use clap::{Subcommand, ValueEnum};
use ethwire_core::types::{RpcTransaction, TxFlavor};
use serde_json::Value as Json;
use tracing::info;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub(crate) enum FlavorArg {
    #[default]
    Geth,
    Parity,
}

impl From<FlavorArg> for TxFlavor {
    fn from(flavor: FlavorArg) -> Self {
        match flavor {
            FlavorArg::Geth => TxFlavor::Geth,
            FlavorArg::Parity => TxFlavor::Parity,
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    #[clap(about = "Decode a raw signed transaction and print it as JSON-RPC would.")]
    Decode {
        #[arg(help = "0x-prefixed raw transaction, legacy RLP or type || RLP.")]
        raw: String,
        #[arg(long, value_enum, default_value_t = FlavorArg::Geth)]
        flavor: FlavorArg,
    },
}

impl Command {
    pub fn run(self) -> eyre::Result<Json> {
        match self {
            Command::Decode { raw, flavor } => {
                let tx = RpcTransaction::from_raw(&raw)?.with_flavor(flavor.into());
                info!(hash = ?tx.hash, from = %tx.from, "Decoded transaction");
                Ok(serde_json::to_value(&tx)?)
            }
        }
    }
}
