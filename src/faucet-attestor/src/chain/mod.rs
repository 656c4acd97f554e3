pub mod interfaces;
mod relayer;
mod rpc;

pub use relayer::{EthersRelayer, TransactionRelayer};
pub use rpc::ChainReader;
