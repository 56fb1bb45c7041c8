#[macro_use]
extern crate log;

pub mod ethereum;
pub mod local_wallet;

pub use local_wallet::LocalWallet;
