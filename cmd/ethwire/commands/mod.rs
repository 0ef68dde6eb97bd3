pub mod block;
pub mod rlp;
pub mod tx;
pub mod utils;
