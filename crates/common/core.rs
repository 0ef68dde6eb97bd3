pub mod crypto;
pub mod errors;
pub mod serde_utils;
pub mod types;

pub use ethereum_types::{Bloom, H160, H256, H32, H64, U256};
pub use types::Address;
