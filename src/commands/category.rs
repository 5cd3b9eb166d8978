use std::path::Path;

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn list(repo_root: &Path, format: Format) -> Result<()> {
    let repo = Repo::open(repo_root)?;
    output::print_categories(&repo.categories.list(), format)?;
    Ok(())
}

pub fn add(repo_root: &Path, name: &str, format: Format) -> Result<()> {
    let mut repo = Repo::open(repo_root)?;
    let stored = repo.categories.add(name)?;
    output::print_category_change(&stored, "added", format)?;
    Ok(())
}

pub fn delete(repo_root: &Path, name: &str, format: Format) -> Result<()> {
    let mut repo = Repo::open(repo_root)?;
    let action = if repo.categories.delete(name)? {
        "deleted"
    } else {
        "absent"
    };
    output::print_category_change(name, action, format)?;
    Ok(())
}
