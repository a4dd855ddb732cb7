use crate::{
    Amount, PoolError, SignatureVerifier, Transaction, TransactionInput, TransactionOutput, UtxoId,
    UtxoPool,
};
use std::collections::HashSet;
use thiserror::Error;

/// The reason a transaction is not valid against a pool.
/// These are expected outcomes of validation, not faults.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum InvalidTransaction {
    #[error("input {input_index} claims {utxo_id}, which is not in the pool")]
    MissingUtxo { input_index: usize, utxo_id: UtxoId },

    #[error("input {input_index} claims {utxo_id}, which is already claimed by another input")]
    DuplicateClaim { input_index: usize, utxo_id: UtxoId },

    #[error("input {input_index} has a signature that does not verify")]
    BadSignature { input_index: usize },

    #[error("output {output_index} has a negative amount: {amount}")]
    NegativeOutput { output_index: usize, amount: Amount },

    #[error("inputs total {inputs} is less than outputs total {outputs}")]
    InsufficientInputs { inputs: Amount, outputs: Amount },

    #[error("sum of amounts overflows")]
    ValueOverflow,

    #[error("failed to build the signing message: {0}")]
    SigningMessage(String),
}

// Responsible for checking that a single transaction may be committed against a pool:
//   - Every claimed output is in the pool.
//   - No output is claimed twice by the same transaction.
//   - Every input is signed by the owner of the output it claims.
//   - No output amount is negative.
//   - The inputs cover the outputs. Any excess is an implicit fee.
// Conflicts between different transactions are resolved by the epoch handler, not here.
pub struct TransactionValidator {}

impl TransactionValidator {
    pub fn is_valid<V: SignatureVerifier>(
        transaction: &Transaction,
        pool: &UtxoPool,
        verifier: &V,
    ) -> bool {
        Self::validate(transaction, pool, verifier).is_ok()
    }

    /// Checks all rules and reports the first one that fails.
    /// Existence of every claimed output is checked before anything reads it from the pool.
    pub fn validate<V: SignatureVerifier>(
        transaction: &Transaction,
        pool: &UtxoPool,
        verifier: &V,
    ) -> Result<(), InvalidTransaction> {
        Self::validate_claimed_outputs_are_in_pool(transaction, pool)?;
        Self::validate_no_output_is_claimed_twice(transaction)?;
        Self::validate_signatures(transaction, pool, verifier)?;
        Self::validate_output_amounts_are_non_negative(transaction)?;
        Self::validate_inputs_cover_outputs(transaction, pool)
    }

    fn validate_claimed_outputs_are_in_pool(
        transaction: &Transaction,
        pool: &UtxoPool,
    ) -> Result<(), InvalidTransaction> {
        match transaction
            .inputs()
            .iter()
            .enumerate()
            .find(|(_, input)| !pool.contains(input.utxo_id()))
        {
            Some((input_index, input)) => Err(InvalidTransaction::MissingUtxo {
                input_index,
                utxo_id: *input.utxo_id(),
            }),
            None => Ok(()),
        }
    }

    fn validate_no_output_is_claimed_twice(
        transaction: &Transaction,
    ) -> Result<(), InvalidTransaction> {
        let mut claimed = HashSet::new();
        for (input_index, input) in transaction.inputs().iter().enumerate() {
            if !claimed.insert(input.utxo_id()) {
                return Err(InvalidTransaction::DuplicateClaim {
                    input_index,
                    utxo_id: *input.utxo_id(),
                });
            }
        }
        Ok(())
    }

    fn validate_signatures<V: SignatureVerifier>(
        transaction: &Transaction,
        pool: &UtxoPool,
        verifier: &V,
    ) -> Result<(), InvalidTransaction> {
        for (input_index, input) in transaction.inputs().iter().enumerate() {
            let claimed = Self::claimed_output(pool, input_index, input)?;
            let message = transaction
                .signing_message(input_index)
                .map_err(|e| InvalidTransaction::SigningMessage(e.to_string()))?;
            if !verifier.verify_signature(claimed.owner(), &message, input.signature()) {
                return Err(InvalidTransaction::BadSignature { input_index });
            }
        }
        Ok(())
    }

    fn validate_output_amounts_are_non_negative(
        transaction: &Transaction,
    ) -> Result<(), InvalidTransaction> {
        match transaction
            .outputs()
            .iter()
            .enumerate()
            .find(|(_, output)| output.amount().is_negative())
        {
            Some((output_index, output)) => Err(InvalidTransaction::NegativeOutput {
                output_index,
                amount: output.amount(),
            }),
            None => Ok(()),
        }
    }

    fn validate_inputs_cover_outputs(
        transaction: &Transaction,
        pool: &UtxoPool,
    ) -> Result<(), InvalidTransaction> {
        let mut claimed_amounts = Vec::with_capacity(transaction.num_inputs());
        for (input_index, input) in transaction.inputs().iter().enumerate() {
            claimed_amounts.push(Self::claimed_output(pool, input_index, input)?.amount());
        }
        let inputs =
            Amount::checked_sum(claimed_amounts).ok_or(InvalidTransaction::ValueOverflow)?;
        let outputs = Amount::checked_sum(
            transaction
                .outputs()
                .iter()
                .map(TransactionOutput::amount),
        )
        .ok_or(InvalidTransaction::ValueOverflow)?;
        if inputs >= outputs {
            Ok(())
        } else {
            Err(InvalidTransaction::InsufficientInputs { inputs, outputs })
        }
    }

    // Callers run `validate_claimed_outputs_are_in_pool` first, so a miss here means a rule
    // was reordered.
    fn claimed_output<'a>(
        pool: &'a UtxoPool,
        input_index: usize,
        input: &TransactionInput,
    ) -> Result<&'a TransactionOutput, InvalidTransaction> {
        pool.get(input.utxo_id())
            .map_err(|PoolError::NotFound(utxo_id)| InvalidTransaction::MissingUtxo {
                input_index,
                utxo_id,
            })
    }
}
