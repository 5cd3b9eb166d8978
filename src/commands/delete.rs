use std::path::Path;

use serde_json::json;

use crate::clock::Clock;
use crate::error::Result;
use crate::output::{self, Format};
use crate::store::repo::Repo;
use crate::task_id::TaskId;

/// Delete a task. A full id that no longer exists is a no-op, so deleting
/// twice succeeds; prefixes still have to resolve.
pub fn run(repo_root: &Path, clock: &dyn Clock, id: &str, format: Format) -> Result<()> {
    let mut repo = Repo::open(repo_root)?;
    let id = match id.parse::<TaskId>() {
        Ok(full) => full,
        Err(_) => repo.resolve_task_id(id)?,
    };

    let removed = repo.tasks.delete(&id)?;
    repo.refresh_streak(clock.today())?;

    match (removed, format) {
        (Some(task), Format::Pretty) => {
            eprintln!("Task deleted: {}", task.title);
            output::print_task(&task, format)?;
        }
        (Some(task), _) => output::print_task(&task, format)?,
        (None, Format::Json) => println!("{}", json!({ "id": id, "deleted": false })),
        (None, _) => eprintln!("No task {id}; nothing to delete"),
    }
    Ok(())
}
