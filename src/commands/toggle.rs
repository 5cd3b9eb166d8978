use std::path::Path;

use crate::clock::Clock;
use crate::error::Result;
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn run(repo_root: &Path, clock: &dyn Clock, id: &str, format: Format) -> Result<()> {
    let mut repo = Repo::open(repo_root)?;
    let id = repo.resolve_task_id(id)?;
    let task = repo.tasks.toggle_completion(&id, clock.now())?;
    let streak = repo.refresh_streak(clock.today())?;

    if format == Format::Pretty {
        let verb = if task.completed {
            "Task completed"
        } else {
            "Task marked as incomplete"
        };
        eprintln!("{verb}: {} ({streak} day streak)", task.title);
    }
    output::print_task(&task, format)?;
    Ok(())
}
