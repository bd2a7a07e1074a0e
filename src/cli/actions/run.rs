use crate::cli::actions::{Action, server};
use anyhow::Result;

// Single dispatch point for all CLI actions. A new action gets a new
// `Action::*` variant and a matching `*::execute` call here.

/// Execute the provided action.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => server::execute(args).await,
    }
}
