use std::path::Path;

use crate::advisor;
use crate::error::Result;
use crate::model::TaskPatch;
use crate::output::{self, Format};
use crate::store::repo::Repo;

/// Ask the advisor to clean up an existing task. Only a validated suggestion
/// is applied; on any failure the task is left as it was.
pub fn run(repo_root: &Path, id: &str, format: Format) -> Result<()> {
    let mut repo = Repo::open(repo_root)?;
    let task = repo.task(id)?.clone();
    let advisor = repo.advisor()?;

    let suggestion = advisor::advise(
        &advisor,
        &task.title,
        task.description.as_deref().unwrap_or_default(),
        &repo.categories,
    )?;

    let patch = TaskPatch {
        title: Some(suggestion.title),
        category: Some(suggestion.category.into_name()),
        ..TaskPatch::default()
    };
    let updated = repo.tasks.update(&task.id, patch)?;
    output::print_task(&updated, format)?;
    Ok(())
}
