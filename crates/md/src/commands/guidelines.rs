//! `md guidelines` command implementation.

use clap::Args;
use md_service::Markdown;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the guidelines command.
#[derive(Args)]
pub(crate) struct GuidelinesArgs {
    /// Parser id (default: configured parser).
    #[arg(short, long)]
    parser: Option<String>,
}

impl GuidelinesArgs {
    /// Execute the guidelines command.
    pub(crate) fn execute(self, markdown: &Markdown) -> Result<(), CliError> {
        let guides = markdown.guidelines(self.parser.as_deref())?;
        let json = serde_json::to_string_pretty(&guides)?;
        Output::new().document(&json)?;
        Ok(())
    }
}
