//! Keys and fixtures shared by unit tests.

use crate::{
    Amount, OutputIndex, PublicKey, Sha256, Transaction, TransactionId, TransactionInput,
    TransactionOutput, UtxoId, UtxoPool,
};
use ed25519_dalek::{Signer, SigningKey};

pub fn key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

pub fn address(signing_key: &SigningKey) -> PublicKey {
    PublicKey::new(signing_key.verifying_key().to_bytes())
}

/// An output of a made-up earlier transaction, identified by `seed`.
pub fn genesis_utxo(seed: u8, index: u32) -> UtxoId {
    UtxoId::new(
        TransactionId::new(Sha256::from_raw([seed; 32])),
        OutputIndex::new(index),
    )
}

pub fn pool_of(entries: Vec<(UtxoId, i64, &SigningKey)>) -> UtxoPool {
    entries
        .into_iter()
        .map(|(utxo_id, amount, owner)| {
            (
                utxo_id,
                TransactionOutput::new(Amount::new(amount), address(owner)),
            )
        })
        .collect()
}

/// Builds a transaction spending `claims`, each signed with the paired key.
pub fn signed_transaction(
    claims: Vec<(UtxoId, &SigningKey)>,
    outputs: Vec<(i64, PublicKey)>,
) -> Transaction {
    let inputs = claims
        .iter()
        .map(|(utxo_id, _)| TransactionInput::unsigned(*utxo_id))
        .collect();
    let outputs = outputs
        .into_iter()
        .map(|(amount, owner)| TransactionOutput::new(Amount::new(amount), owner))
        .collect();
    let mut transaction = Transaction::new(inputs, outputs).unwrap();
    for (index, (_, signing_key)) in claims.iter().enumerate() {
        let message = transaction.signing_message(index).unwrap();
        let signature = signing_key.sign(&message).to_bytes().to_vec();
        transaction = transaction.with_signature(index, signature).unwrap();
    }
    transaction
}
