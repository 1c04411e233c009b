pub mod accounts;
pub mod launch;
pub mod mnemonic;
pub mod utils;

pub use accounts::*;
pub use launch::*;
pub use mnemonic::*;
