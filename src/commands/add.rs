use std::path::Path;

use crate::advisor;
use crate::clock::Clock;
use crate::error::Result;
use crate::model::NewTask;
use crate::output::{self, Format};
use crate::store::repo::Repo;

/// Create a task. With `advise`, the configured advisor may replace the typed
/// title and category; if it fails or answers nonsense the typed values stand.
pub fn run(
    repo_root: &Path,
    clock: &dyn Clock,
    mut new: NewTask,
    advise: bool,
    format: Format,
) -> Result<()> {
    let mut repo = Repo::open(repo_root)?;

    if advise {
        let description = new.description.clone().unwrap_or_default();
        let outcome = repo.advisor().and_then(|a| {
            advisor::advise(&a, &new.title, &description, &repo.categories)
        });
        match outcome {
            Ok(suggestion) => {
                new.title = suggestion.title;
                new.category = suggestion.category.into_name();
            }
            Err(e) => eprintln!("notice: {e}; keeping the title and category as typed"),
        }
    }

    let task = repo.create_task(new, clock.now())?;
    repo.refresh_streak(clock.today())?;
    output::print_task(&task, format)?;
    Ok(())
}
