pub mod amount;
pub mod commands;
pub mod error;
pub mod hash;
pub mod public_key;
pub mod signature;
pub mod transaction;
pub mod tx_handler;
pub mod utxo;
pub mod utxo_pool;
pub mod validation;

#[cfg(test)]
mod testing;

pub use self::{
    amount::*, error::Error, hash::*, public_key::*, signature::*, transaction::*, tx_handler::*,
    utxo::*, utxo_pool::*, validation::*,
};
