//! Command-line front end for the support request form.
//!
//! ## Commands
//!
//! - `support-form wizard [--config PATH]`
//! - `support-form submit --record FILE [--config PATH] [--json]`
//! - `support-form preview --record FILE`
//! - `support-form summary --record FILE [--out DIR]`
//!
//! ## Exit Codes
//!
//! - 0: Success
//! - 2: The record is incomplete or invalid
//! - 3: The relay rejected the submission or could not be reached

use clap::Parser;
use clap::Subcommand;

pub mod record_cmd;
pub mod wizard_cmd;

pub use record_cmd::PreviewArgs;
pub use record_cmd::SubmitArgs;
pub use record_cmd::SummaryArgs;
pub use wizard_cmd::WizardArgs;

pub const EXIT_INVALID_RECORD: i32 = 2;
pub const EXIT_SUBMISSION_FAILED: i32 = 3;

/// Multi-step support request form
#[derive(Debug, Parser)]
#[command(name = "support-form", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fill in a request step by step on the terminal
    Wizard(WizardArgs),

    /// Validate a saved record and submit it to the relay
    Submit(SubmitArgs),

    /// Print the ticket that a saved record would create
    Preview(PreviewArgs),

    /// Write the downloadable summary of a saved record
    Summary(SummaryArgs),
}

impl Cli {
    /// Run the selected command and return the process exit code.
    pub async fn run(self) -> anyhow::Result<i32> {
        match self.command {
            Command::Wizard(args) => args.run().await,
            Command::Submit(args) => args.run().await,
            Command::Preview(args) => args.run(),
            Command::Summary(args) => args.run(),
        }
    }
}
