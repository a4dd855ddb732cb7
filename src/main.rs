use clap::{App, AppSettings};
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let matches = App::new("ledgercoin")
        .about("Ledgercoin transaction settlement tools.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(ledgercoin_lib::commands::epoch_command())
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("epoch") {
        ledgercoin_lib::commands::run_epoch_command(matches)?;
        Ok(())
    } else {
        panic!("Should report help.");
    }
}
