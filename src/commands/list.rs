use std::path::Path;

use crate::clock::Clock;
use crate::error::Result;
use crate::model::CategoryFilter;
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn run(
    repo_root: &Path,
    clock: &dyn Clock,
    filter: CategoryFilter,
    format: Format,
) -> Result<()> {
    let mut repo = Repo::open(repo_root)?;
    repo.refresh_streak(clock.today())?;
    let tasks = repo.tasks.list(&filter);
    output::print_tasks(&tasks, format)?;
    Ok(())
}
