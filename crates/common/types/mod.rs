mod access_list;
mod authorization;
mod blobs_bundle;
mod block;
mod block_identifier;
mod bloom;
mod filter;
mod flavor;
mod primitives;
mod receipt;
mod rpc_transaction;
pub mod transaction;

#[cfg(test)]
pub(crate) mod fixtures;

pub use access_list::*;
pub use authorization::*;
pub use blobs_bundle::*;
pub use block::*;
pub use block_identifier::*;
pub use bloom::*;
pub use filter::*;
pub use flavor::*;
pub use primitives::*;
pub use receipt::*;
pub use rpc_transaction::*;
pub use transaction::*;
