use crate::{Amount, PublicKey, Transaction, TransactionOutput, UtxoId};
use std::collections::HashMap;
use std::iter::FromIterator;
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum PoolError {
    #[error("unspent output not found: {0}")]
    NotFound(UtxoId),
}

/// A pool of confirmed and unspent transaction outputs.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct UtxoPool {
    // Unspent transaction outputs, indexed by their transaction ID and their index in the
    // transaction.
    utxos: HashMap<UtxoId, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    /// An independent copy of the pool. Changes to either pool are not visible in the other.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    pub fn contains(&self, utxo_id: &UtxoId) -> bool {
        self.utxos.contains_key(utxo_id)
    }

    pub fn get(&self, utxo_id: &UtxoId) -> Result<&TransactionOutput, PoolError> {
        self.utxos
            .get(utxo_id)
            .ok_or(PoolError::NotFound(*utxo_id))
    }

    /// Adds the output, replacing any output stored under the same id.
    pub fn insert(&mut self, utxo_id: UtxoId, output: TransactionOutput) {
        self.utxos.insert(utxo_id, output);
    }

    /// Removes the output if present. Removing an absent id is a no-op.
    pub fn remove(&mut self, utxo_id: &UtxoId) -> Option<TransactionOutput> {
        self.utxos.remove(utxo_id)
    }

    /// Makes every output of the transaction spendable.
    pub fn credit_outputs(&mut self, transaction: &Transaction) {
        for (utxo_id, output) in transaction.utxos_created() {
            self.insert(utxo_id, output.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UtxoId, &TransactionOutput)> {
        self.utxos.iter()
    }

    /// Total unspent amount per owner. Owners whose sum overflows are left out.
    pub fn balances(&self) -> HashMap<PublicKey, Amount> {
        let mut outputs_by_owner: HashMap<PublicKey, Vec<Amount>> = HashMap::new();
        for output in self.utxos.values() {
            outputs_by_owner
                .entry(*output.owner())
                .or_insert_with(Vec::new)
                .push(output.amount());
        }
        outputs_by_owner
            .into_iter()
            .filter_map(|(owner, amounts)| {
                Amount::checked_sum(amounts).map(|balance| (owner, balance))
            })
            .collect()
    }
}

impl FromIterator<(UtxoId, TransactionOutput)> for UtxoPool {
    fn from_iter<I: IntoIterator<Item = (UtxoId, TransactionOutput)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}
