pub mod epoch_command;

pub use self::epoch_command::*;
