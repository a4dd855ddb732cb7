use crate::{
    InvalidTransaction, SignatureVerifier, Transaction, TransactionId, TransactionValidator,
    UtxoId, UtxoPool,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use tracing::{debug, info};

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct EpochConfig {
    /// Whether outputs of accepted transactions are added to the live pool.
    /// They become spendable in the next epoch, as validation uses the epoch's snapshot.
    pub credit_new_outputs: bool,
}

/// Why a transaction of the batch was left out.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Rejection {
    /// The transaction is not valid against the epoch's snapshot.
    Invalid(InvalidTransaction),
    /// The transaction is valid against the snapshot, but an earlier transaction of the same
    /// epoch already spent this output.
    AlreadySpent(UtxoId),
    /// The same transaction was already accepted earlier in this epoch.
    AlreadyAccepted(TransactionId),
    /// The transaction spends nothing but creates outputs. Its id is not unique across epochs,
    /// so its outputs cannot be credited without risking a spent output coming back.
    NoInputs,
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Invalid(reason) => write!(f, "{}", reason),
            Rejection::AlreadySpent(utxo_id) => {
                write!(f, "{} was spent earlier in this epoch", utxo_id)
            }
            Rejection::AlreadyAccepted(transaction_id) => {
                write!(f, "{} was accepted earlier in this epoch", transaction_id)
            }
            Rejection::NoInputs => write!(f, "outputs without inputs cannot be credited"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EpochSummary {
    /// Accepted transactions in the order they appeared in the batch.
    pub accepted: Vec<Transaction>,
    pub rejected: Vec<(TransactionId, Rejection)>,
}

/// Settles one epoch of transactions against a pool.
///
/// The handler keeps two pools: a snapshot taken at construction, against which every
/// transaction is validated, and the live pool from which accepted transactions remove the
/// outputs they spend. Before committing, each transaction is checked against the live pool once
/// more, so that when several transactions of a batch spend the same output, only the first one
/// in batch order is accepted.
pub struct TxHandler<V> {
    snapshot: UtxoPool,
    pool: UtxoPool,
    verifier: V,
    config: EpochConfig,
}

impl<V: SignatureVerifier> TxHandler<V> {
    pub fn new(pool: UtxoPool, verifier: V) -> Self {
        Self::with_config(pool, verifier, EpochConfig::default())
    }

    pub fn with_config(pool: UtxoPool, verifier: V, config: EpochConfig) -> Self {
        Self {
            snapshot: pool.snapshot(),
            pool,
            verifier,
            config,
        }
    }

    /// Checks the transaction against the snapshot taken when the handler was created.
    pub fn is_valid_tx(&self, transaction: &Transaction) -> bool {
        TransactionValidator::is_valid(transaction, &self.snapshot, &self.verifier)
    }

    /// Returns the mutually valid subset of `transactions` and removes the outputs it spends
    /// from the live pool.
    pub fn handle_epoch(&mut self, transactions: &[Transaction]) -> Vec<Transaction> {
        self.process_epoch(transactions).accepted
    }

    /// Like `handle_epoch`, but also reports why each left-out transaction was rejected.
    pub fn process_epoch(&mut self, transactions: &[Transaction]) -> EpochSummary {
        let mut summary = EpochSummary::default();
        let mut accepted_ids = HashSet::new();
        for transaction in transactions {
            match self.try_commit(transaction, &accepted_ids) {
                Ok(()) => {
                    debug!("Accepted transaction: {}", transaction.id());
                    accepted_ids.insert(*transaction.id());
                    summary.accepted.push(transaction.clone());
                }
                Err(rejection) => {
                    debug!(
                        "Rejected transaction: {} because: {}",
                        transaction.id(),
                        rejection
                    );
                    summary.rejected.push((*transaction.id(), rejection));
                }
            }
        }
        info!(
            accepted = summary.accepted.len(),
            rejected = summary.rejected.len(),
            unspent = self.pool.len(),
            "Epoch processed"
        );
        summary
    }

    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }

    // Either every claimed output is removed from the live pool or none is.
    fn try_commit(
        &mut self,
        transaction: &Transaction,
        accepted_ids: &HashSet<TransactionId>,
    ) -> Result<(), Rejection> {
        TransactionValidator::validate(transaction, &self.snapshot, &self.verifier)
            .map_err(Rejection::Invalid)?;
        if accepted_ids.contains(transaction.id()) {
            return Err(Rejection::AlreadyAccepted(*transaction.id()));
        }
        if self.config.credit_new_outputs
            && transaction.num_inputs() == 0
            && transaction.num_outputs() > 0
        {
            return Err(Rejection::NoInputs);
        }
        if let Some(input) = transaction
            .inputs()
            .iter()
            .find(|input| !self.pool.contains(input.utxo_id()))
        {
            return Err(Rejection::AlreadySpent(*input.utxo_id()));
        }
        for input in transaction.inputs() {
            self.pool.remove(input.utxo_id());
        }
        if self.config.credit_new_outputs {
            self.pool.credit_outputs(transaction);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{address, genesis_utxo, key, pool_of, signed_transaction};
    use crate::Ed25519Verifier;

    #[test]
    fn accepts_valid_transaction_and_spends_its_input() {
        let alice = key(1);
        let bob = key(2);
        let u1 = genesis_utxo(1, 0);
        let pool = pool_of(vec![(u1, 10, &alice)]);
        let tx1 = signed_transaction(vec![(u1, &alice)], vec![(10, address(&bob))]);

        let mut handler = TxHandler::new(pool, Ed25519Verifier);
        assert!(handler.is_valid_tx(&tx1));
        let accepted = handler.handle_epoch(&[tx1.clone()]);

        assert_eq!(accepted, vec![tx1]);
        assert!(!handler.pool().contains(&u1));
        // New outputs are not credited by default.
        assert!(handler.pool().is_empty());
    }

    #[test]
    fn rejects_transaction_signed_by_wrong_key() {
        let alice = key(1);
        let mallory = key(3);
        let u1 = genesis_utxo(1, 0);
        let pool = pool_of(vec![(u1, 10, &alice)]);
        let tx2 = signed_transaction(vec![(u1, &mallory)], vec![(10, address(&mallory))]);

        let mut handler = TxHandler::new(pool.clone(), Ed25519Verifier);
        assert!(!handler.is_valid_tx(&tx2));
        assert!(handler.handle_epoch(&[tx2]).is_empty());
        assert_eq!(handler.pool(), &pool);
    }

    #[test]
    fn rejects_duplicate_claim_within_transaction() {
        let alice = key(1);
        let u1 = genesis_utxo(1, 0);
        let pool = pool_of(vec![(u1, 10, &alice)]);
        let tx3 = signed_transaction(
            vec![(u1, &alice), (u1, &alice)],
            vec![(10, address(&alice))],
        );

        let mut handler = TxHandler::new(pool.clone(), Ed25519Verifier);
        assert!(!handler.is_valid_tx(&tx3));
        assert!(handler.handle_epoch(&[tx3]).is_empty());
        assert_eq!(handler.pool(), &pool);
    }

    #[test]
    fn first_of_conflicting_transactions_wins() {
        let alice = key(1);
        let u1 = genesis_utxo(1, 0);
        let u2 = genesis_utxo(2, 0);
        let pool = pool_of(vec![(u1, 10, &alice), (u2, 3, &alice)]);
        let tx1 = signed_transaction(vec![(u1, &alice)], vec![(10, address(&key(2)))]);
        let tx1b = signed_transaction(vec![(u1, &alice)], vec![(9, address(&key(3)))]);

        let mut handler = TxHandler::new(pool, Ed25519Verifier);
        assert!(handler.is_valid_tx(&tx1));
        assert!(handler.is_valid_tx(&tx1b));

        let summary = handler.process_epoch(&[tx1.clone(), tx1b.clone()]);
        assert_eq!(summary.accepted, vec![tx1]);
        assert_eq!(
            summary.rejected,
            vec![(*tx1b.id(), Rejection::AlreadySpent(u1))]
        );
        assert!(!handler.pool().contains(&u1));
        assert!(handler.pool().contains(&u2));
        assert_eq!(handler.pool().len(), 1);
    }

    #[test]
    fn late_rejection_leaves_other_inputs_untouched() {
        let alice = key(1);
        let u1 = genesis_utxo(1, 0);
        let u2 = genesis_utxo(2, 0);
        let pool = pool_of(vec![(u1, 10, &alice), (u2, 3, &alice)]);
        let spends_u1 = signed_transaction(vec![(u1, &alice)], vec![(10, address(&alice))]);
        let spends_both =
            signed_transaction(vec![(u2, &alice), (u1, &alice)], vec![(13, address(&alice))]);

        let mut handler = TxHandler::new(pool, Ed25519Verifier);
        let accepted = handler.handle_epoch(&[spends_u1.clone(), spends_both]);

        assert_eq!(accepted, vec![spends_u1]);
        assert!(handler.pool().contains(&u2));
    }

    #[test]
    fn accepted_order_follows_batch_order() {
        let alice = key(1);
        let utxos = (0..4).map(|seed| genesis_utxo(seed, 0)).collect::<Vec<_>>();
        let pool = pool_of(utxos.iter().map(|utxo_id| (*utxo_id, 5, &alice)).collect());
        let mallory = key(3);
        let batch = vec![
            signed_transaction(vec![(utxos[2], &alice)], vec![(5, address(&alice))]),
            signed_transaction(vec![(utxos[0], &mallory)], vec![(5, address(&mallory))]),
            signed_transaction(vec![(utxos[3], &alice)], vec![(5, address(&alice))]),
            signed_transaction(vec![(utxos[1], &alice)], vec![(5, address(&alice))]),
        ];

        let mut handler = TxHandler::new(pool, Ed25519Verifier);
        let accepted = handler.handle_epoch(&batch);

        assert_eq!(
            accepted,
            vec![batch[0].clone(), batch[2].clone(), batch[3].clone()]
        );
        assert_eq!(handler.into_pool().len(), 1);
    }

    #[test]
    fn validates_against_snapshot_not_live_pool() {
        let alice = key(1);
        let bob = key(2);
        let u1 = genesis_utxo(1, 0);
        let pool = pool_of(vec![(u1, 10, &alice)]);
        let tx1 = signed_transaction(vec![(u1, &alice)], vec![(10, address(&bob))]);
        let (new_utxo, _) = tx1.utxos_created().next().unwrap();
        let spends_new_output =
            signed_transaction(vec![(new_utxo, &bob)], vec![(10, address(&bob))]);

        let config = EpochConfig {
            credit_new_outputs: true,
        };
        let mut handler = TxHandler::with_config(pool, Ed25519Verifier, config);
        let accepted = handler.handle_epoch(&[tx1.clone(), spends_new_output.clone()]);

        // The credited output is live, but not part of this epoch's snapshot.
        assert_eq!(accepted, vec![tx1]);
        assert!(handler.pool().contains(&new_utxo));

        let mut next_epoch = TxHandler::new(handler.into_pool(), Ed25519Verifier);
        assert_eq!(
            next_epoch.handle_epoch(&[spends_new_output.clone()]),
            vec![spends_new_output]
        );
        assert!(next_epoch.pool().is_empty());
    }

    #[test]
    fn invalid_transaction_never_mutates_pool() {
        let alice = key(1);
        let u1 = genesis_utxo(1, 0);
        let pool = pool_of(vec![(u1, 10, &alice)]);
        let overspend = signed_transaction(vec![(u1, &alice)], vec![(11, address(&alice))]);

        let mut handler = TxHandler::new(pool.clone(), Ed25519Verifier);
        assert!(handler.handle_epoch(&[overspend.clone()]).is_empty());
        assert!(handler.handle_epoch(&[overspend]).is_empty());
        assert_eq!(handler.pool(), &pool);
    }

    #[test]
    fn same_transaction_is_accepted_once_per_epoch() {
        let alice = key(1);
        let issue = signed_transaction(vec![], vec![(0, address(&alice))]);

        let mut handler = TxHandler::new(UtxoPool::new(), Ed25519Verifier);
        let summary = handler.process_epoch(&[issue.clone(), issue.clone()]);

        assert_eq!(summary.accepted, vec![issue.clone()]);
        assert_eq!(
            summary.rejected,
            vec![(*issue.id(), Rejection::AlreadyAccepted(*issue.id()))]
        );
    }

    #[test]
    fn outputs_without_inputs_are_never_credited() {
        let alice = key(1);
        let issue = signed_transaction(vec![], vec![(0, address(&alice))]);
        let (created, _) = issue.utxos_created().next().unwrap();
        let config = EpochConfig {
            credit_new_outputs: true,
        };

        let mut handler = TxHandler::with_config(UtxoPool::new(), Ed25519Verifier, config);
        let summary = handler.process_epoch(&[issue.clone(), issue.clone()]);
        assert!(summary.accepted.is_empty());
        assert_eq!(
            summary.rejected,
            vec![
                (*issue.id(), Rejection::NoInputs),
                (*issue.id(), Rejection::NoInputs)
            ]
        );
        assert!(!handler.pool().contains(&created));

        // A later epoch cannot bring the output back either.
        let mut next_epoch = TxHandler::with_config(handler.into_pool(), Ed25519Verifier, config);
        assert!(next_epoch.handle_epoch(&[issue]).is_empty());
        assert!(next_epoch.pool().is_empty());
    }

    #[test]
    fn empty_transaction_is_accepted_when_crediting() {
        let empty = signed_transaction(vec![], vec![]);
        let config = EpochConfig {
            credit_new_outputs: true,
        };
        let mut handler = TxHandler::with_config(UtxoPool::new(), Ed25519Verifier, config);
        assert_eq!(handler.handle_epoch(&[empty.clone()]), vec![empty]);
        assert!(handler.pool().is_empty());
    }

    #[test]
    fn config_defaults_when_fields_are_missing() {
        let config: EpochConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EpochConfig::default());
        let config: EpochConfig =
            serde_json::from_str(r#"{"credit_new_outputs": true}"#).unwrap();
        assert!(config.credit_new_outputs);
    }
}
