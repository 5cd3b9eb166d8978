use std::path::Path;

use serde_json::json;

use crate::error::Result;
use crate::output::Format;
use crate::store::repo::Repo;

pub fn show(repo_root: &Path, format: Format) -> Result<()> {
    let repo = Repo::open(repo_root)?;
    print_advisor(repo.config.advisor_command().as_deref(), format);
    Ok(())
}

/// Set or clear the advisor command. Clearing disables suggestions.
pub fn set_advisor(repo_root: &Path, command: Option<String>, format: Format) -> Result<()> {
    let mut repo = Repo::open(repo_root)?;
    repo.config.set_advisor(command);
    repo.save_config()?;
    let configured = repo.config.advisor.as_ref().map(|a| a.command.as_str());
    print_advisor(configured, format);
    Ok(())
}

fn print_advisor(command: Option<&str>, format: Format) {
    match format {
        Format::Json => println!(
            "{}",
            json!({ "advisor_enabled": command.is_some(), "advisor_command": command })
        ),
        Format::Pretty => match command {
            Some(c) => println!("advisor: enabled ({c})"),
            None => println!("advisor: disabled"),
        },
        Format::Minimal => println!("{}", command.unwrap_or("-")),
    }
}
