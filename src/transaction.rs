use crate::{Amount, PublicKey, Sha256, UtxoId};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum TransactionError {
    #[error("index {index} is out of range for {len} elements")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("transaction has {0} outputs, more than an output index can address")]
    TooManyOutputs(usize),

    #[error("failed to encode transaction: {0}")]
    Encoding(String),
}

/// A double SHA-256 hash of the transaction data.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub const fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// The index of the transaction output.
#[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<usize> for OutputIndex {
    type Error = TransactionError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        u32::try_from(index)
            .map(Self)
            .map_err(|_| TransactionError::IndexOutOfRange {
                index,
                len: (u32::MAX as usize).saturating_add(1),
            })
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    // The unspent output claimed by this input.
    utxo_id: UtxoId,
    // Signature by the owner of the claimed output over `Transaction::signing_message`.
    #[serde(default, with = "hex::serde")]
    signature: Vec<u8>,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.utxo_id)
    }
}

impl TransactionInput {
    pub fn new(utxo_id: UtxoId, signature: Vec<u8>) -> Self {
        Self { utxo_id, signature }
    }

    pub fn unsigned(utxo_id: UtxoId) -> Self {
        Self::new(utxo_id, vec![])
    }

    pub fn utxo_id(&self) -> &UtxoId {
        &self.utxo_id
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    amount: Amount,
    owner: PublicKey,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.amount, self.owner)
    }
}

impl TransactionOutput {
    pub fn new(amount: Amount, owner: PublicKey) -> Self {
        Self { amount, owner }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn owner(&self) -> &PublicKey {
        &self.owner
    }
}

// Encoded to compute the transaction id. Includes signatures.
#[derive(Serialize)]
struct TransactionData<'a> {
    inputs: &'a [TransactionInput],
    outputs: &'a [TransactionOutput],
}

// Encoded to produce the message that an input's signature authenticates.
#[derive(Serialize)]
struct SigningPayload<'a> {
    claimed: Vec<UtxoId>,
    outputs: &'a [TransactionOutput],
}

/// A transaction spends existing outputs through its inputs and creates new outputs.
/// It is never mutated in place once built; attaching a signature produces a new transaction with
/// a new id.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Result<Self, TransactionError> {
        if let Some(last) = outputs.len().checked_sub(1) {
            OutputIndex::try_from(last)
                .map_err(|_| TransactionError::TooManyOutputs(outputs.len()))?;
        }
        let id = Self::hash_transaction_data(&inputs, &outputs)?;
        Ok(Self {
            id,
            inputs,
            outputs,
        })
    }

    /// Returns a copy of this transaction with the signature of the given input replaced.
    pub fn with_signature(
        self,
        input_index: usize,
        signature: Vec<u8>,
    ) -> Result<Self, TransactionError> {
        let Transaction {
            mut inputs,
            outputs,
            ..
        } = self;
        let len = inputs.len();
        match inputs.get_mut(input_index) {
            Some(input) => input.signature = signature,
            None => {
                return Err(TransactionError::IndexOutOfRange {
                    index: input_index,
                    len,
                })
            }
        }
        Self::new(inputs, outputs)
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    pub fn input(&self, index: usize) -> Result<&TransactionInput, TransactionError> {
        self.inputs
            .get(index)
            .ok_or(TransactionError::IndexOutOfRange {
                index,
                len: self.inputs.len(),
            })
    }

    pub fn output(&self, index: usize) -> Result<&TransactionOutput, TransactionError> {
        self.outputs
            .get(index)
            .ok_or(TransactionError::IndexOutOfRange {
                index,
                len: self.outputs.len(),
            })
    }

    /// The bytes that the signature of the input at `input_index` must authenticate.
    /// The message commits to the outputs claimed by inputs `0..=input_index` and to every
    /// output of the transaction. No signature is part of any message.
    pub fn signing_message(&self, input_index: usize) -> Result<Vec<u8>, TransactionError> {
        self.input(input_index)?;
        let payload = SigningPayload {
            claimed: self.inputs[..=input_index]
                .iter()
                .map(|input| input.utxo_id)
                .collect(),
            outputs: &self.outputs,
        };
        bincode::serialize(&payload).map_err(|e| TransactionError::Encoding(e.to_string()))
    }

    /// The sum of all output amounts, or `None` if it overflows.
    pub fn total_output(&self) -> Option<Amount> {
        Amount::checked_sum(self.outputs.iter().map(TransactionOutput::amount))
    }

    /// The unspent outputs this transaction creates once it is committed.
    pub fn utxos_created(&self) -> impl Iterator<Item = (UtxoId, &TransactionOutput)> + '_ {
        // `new` guarantees every position fits in an `OutputIndex`.
        self.outputs
            .iter()
            .zip(0u32..)
            .map(move |(output, index)| (UtxoId::new(self.id, OutputIndex::new(index)), output))
    }

    fn hash_transaction_data(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
    ) -> Result<TransactionId, TransactionError> {
        let data = bincode::serialize(&TransactionData { inputs, outputs })
            .map_err(|e| TransactionError::Encoding(e.to_string()))?;
        Ok(TransactionId(Sha256::double_digest(&data)))
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] -> [{}]",
            self.id,
            self.inputs
                .iter()
                .map(TransactionInput::to_string)
                .collect::<Vec<String>>()
                .join(", "),
            self.outputs
                .iter()
                .map(TransactionOutput::to_string)
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}
