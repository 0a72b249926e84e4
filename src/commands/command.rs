//! The [`Command`] trait implemented by every hapbal subcommand.

use anyhow::Result;
use enum_dispatch::enum_dispatch;

/// A runnable subcommand.
///
/// `command_line` is the full invocation, logged at start-up so runs can be reproduced.
#[enum_dispatch]
pub trait Command {
    #[allow(clippy::missing_errors_doc)]
    fn execute(&self, command_line: &str) -> Result<()>;
}
