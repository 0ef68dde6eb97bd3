use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing_subscriber::{filter::Directive, EnvFilter, FmtSubscriber};

use crate::commands::{block, rlp, tx, utils};

pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "ethwire", author, version = VERSION_STRING, about = "Ethereum wire-format codec.", long_about = None)]
pub struct EthwireCLI {
    #[arg(
        long = "log.level",
        global = true,
        default_value = "info",
        help = "Default log directive, overridden by RUST_LOG."
    )]
    log_level: String,
    #[command(subcommand)]
    command: EthwireCommand,
}

#[derive(Subcommand)]
enum EthwireCommand {
    #[clap(subcommand, about = "Inspect or build RLP items.")]
    Rlp(rlp::Command),
    #[clap(subcommand, about = "Transaction commands.")]
    Tx(tx::Command),
    #[clap(subcommand, about = "Block commands.")]
    Block(block::Command),
    #[clap(about = "Print the EIP-55 checksummed form of an address.")]
    Checksum {
        #[arg(help = "0x-prefixed 20-byte address.")]
        address: String,
    },
    #[clap(about = "Print the logs bloom of the given byte strings.")]
    Bloom {
        #[arg(required = true, help = "0x-prefixed items, such as addresses and topics.")]
        items: Vec<String>,
    },
}

fn init_tracing(log_level: &str) -> eyre::Result<()> {
    let log_filter = EnvFilter::builder()
        .with_default_directive(Directive::from_str(log_level)?)
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

pub fn start() -> eyre::Result<()> {
    let EthwireCLI { log_level, command } = EthwireCLI::parse();
    init_tracing(&log_level)?;
    let output = match command {
        EthwireCommand::Rlp(cmd) => cmd.run()?,
        EthwireCommand::Tx(cmd) => cmd.run()?,
        EthwireCommand::Block(cmd) => cmd.run()?,
        EthwireCommand::Checksum { address } => utils::checksum(&address)?,
        EthwireCommand::Bloom { items } => utils::bloom(&items)?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
