use std::path::Path;

use crate::clock::Clock;
use crate::error::Result;
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn run(repo_root: &Path, clock: &dyn Clock, format: Format) -> Result<()> {
    let mut repo = Repo::open(repo_root)?;
    repo.refresh_streak(clock.today())?;
    output::print_streak(repo.streak.state(), format)?;
    Ok(())
}
