mod identities;
mod wallet;

pub use identities::*;
pub use wallet::*;
