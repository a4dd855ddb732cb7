use crate::{
    Ed25519Verifier, EpochConfig, EpochSummary, Error, Transaction, TransactionInput,
    TransactionOutput, TxHandler, UtxoId, UtxoPool,
};
use clap::{App, Arg, ArgMatches};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

struct EpochCliOptions {
    input: PathBuf,
    config: EpochConfig,
}

impl EpochCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Error> {
        let input = matches
            .value_of("input")
            .ok_or_else(|| Error::Custom("Missing required argument: input".to_string()))?;
        Ok(Self {
            input: PathBuf::from(input),
            config: EpochConfig {
                credit_new_outputs: matches.is_present("credit-new-outputs"),
            },
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PoolEntry {
    pub utxo_id: UtxoId,
    pub output: TransactionOutput,
}

#[derive(Debug, Deserialize)]
pub struct TransactionRecord {
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
}

/// The pool and candidate batch of one epoch, as read by the `epoch` command.
#[derive(Debug, Deserialize)]
pub struct EpochFile {
    #[serde(default)]
    pub utxos: Vec<PoolEntry>,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

impl EpochFile {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_parts(self) -> Result<(UtxoPool, Vec<Transaction>), Error> {
        let pool = self
            .utxos
            .into_iter()
            .map(|entry| (entry.utxo_id, entry.output))
            .collect();
        let transactions = self
            .transactions
            .into_iter()
            .map(|record| Transaction::new(record.inputs, record.outputs))
            .collect::<Result<Vec<Transaction>, _>>()?;
        Ok((pool, transactions))
    }
}

/// Runs one epoch over the file's batch and returns the summary with the resulting pool.
pub fn run_epoch(
    epoch_file: EpochFile,
    config: EpochConfig,
) -> Result<(EpochSummary, UtxoPool), Error> {
    let (pool, transactions) = epoch_file.into_parts()?;
    info!(
        unspent = pool.len(),
        candidates = transactions.len(),
        "Loaded epoch"
    );
    let mut handler = TxHandler::with_config(pool, Ed25519Verifier, config);
    let summary = handler.process_epoch(&transactions);
    Ok((summary, handler.into_pool()))
}

pub fn epoch_command() -> App<'static> {
    App::new("epoch")
        .version("0.1")
        .about("Settles a batch of transactions against a pool of unspent outputs.")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("JSON file with the unspent outputs and the candidate transactions.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("credit-new-outputs")
                .long("credit-new-outputs")
                .help("Adds outputs of accepted transactions to the resulting pool.")
                .takes_value(false)
                .required(false),
        )
}

pub fn run_epoch_command(matches: &ArgMatches) -> Result<(), Error> {
    let options = EpochCliOptions::parse(matches)?;
    let epoch_file = EpochFile::from_json(&fs::read_to_string(&options.input)?)?;
    let (summary, pool) = run_epoch(epoch_file, options.config)?;

    println!("Accepted transactions");
    for transaction in &summary.accepted {
        println!("  {}", transaction.id());
    }
    println!("Rejected transactions");
    for (transaction_id, rejection) in &summary.rejected {
        println!("  {}: {}", transaction_id, rejection);
    }
    println!("Balances");
    let mut balances = pool.balances().into_iter().collect::<Vec<_>>();
    balances.sort();
    for (owner, balance) in balances {
        println!("  {}: {}", owner, balance);
    }
    Ok(())
}
