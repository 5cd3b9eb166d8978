use std::path::Path;

use crate::error::{DaytaskError, Result};
use crate::model::TaskPatch;
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn run(repo_root: &Path, id: &str, patch: TaskPatch, format: Format) -> Result<()> {
    let mut repo = Repo::open(repo_root)?;
    let id = repo.resolve_task_id(id)?;

    if let Some(ref category) = patch.category
        && repo.categories.resolve(category).is_none()
    {
        return Err(DaytaskError::UnknownCategory(category.clone()));
    }

    let task = if patch.is_empty() {
        repo.tasks
            .get(&id)
            .cloned()
            .ok_or(DaytaskError::TaskNotFound(id))?
    } else {
        repo.tasks.update(&id, patch)?
    };
    output::print_task(&task, format)?;
    Ok(())
}
