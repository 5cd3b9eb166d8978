use std::path::Path;

use crate::error::Result;
use crate::store::repo::{DIR_NAME, Repo};

pub fn run(repo_root: &Path) -> Result<()> {
    Repo::init(repo_root)?;
    eprintln!("Initialized {DIR_NAME}/ in {}", repo_root.display());
    Ok(())
}
