use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::advisor::CommandAdvisor;
use crate::config::{self, Config};
use crate::error::{DaytaskError, Result};
use crate::model::{DailySummary, NewTask, Task};
use crate::store::categories::CategoryStore;
use crate::store::kv::{FileKv, SharedKv};
use crate::store::streak::StreakEngine;
use crate::store::tasks::TaskStore;
use crate::task_id::TaskId;

pub const DIR_NAME: &str = ".daytask";
pub const DIR_ENV: &str = "DAYTASK_DIR";

/// The three stores opened over one storage handle, plus configuration.
pub struct Repo {
    root: PathBuf,
    pub config: Config,
    pub tasks: TaskStore,
    pub categories: CategoryStore,
    pub streak: StreakEngine,
}

impl Repo {
    /// Create `.daytask/` under `repo_root` and open it.
    pub fn init(repo_root: &Path) -> Result<Self> {
        let dir = repo_root.join(DIR_NAME);
        if dir.join("config.json").exists() {
            return Err(DaytaskError::AlreadyInitialized);
        }
        fs::create_dir_all(dir.join("data"))?;
        Config::default().save(&dir.join("config.json"))?;
        Self::open(repo_root)
    }

    pub fn open(repo_root: &Path) -> Result<Self> {
        let dir = repo_root.join(DIR_NAME);
        let config = Config::load(&dir.join("config.json"))?;
        let kv: SharedKv = Rc::new(FileKv::open(&dir.join("data"))?);
        Self::with_storage(repo_root, config, kv)
    }

    /// Open the stores over an arbitrary backend, e.g. `MemoryKv` in tests.
    pub fn with_storage(repo_root: &Path, config: Config, kv: SharedKv) -> Result<Self> {
        Ok(Self {
            root: repo_root.to_path_buf(),
            config,
            tasks: TaskStore::load(Rc::clone(&kv))?,
            categories: CategoryStore::load(Rc::clone(&kv))?,
            streak: StreakEngine::load(kv)?,
        })
    }

    /// Directory containing `.daytask/`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(DIR_NAME).join("config.json")
    }

    pub fn save_config(&self) -> Result<()> {
        self.config.save(&self.config_path())
    }

    /// Create a task after checking its category against the known set.
    pub fn create_task(&mut self, new: NewTask, now: DateTime<FixedOffset>) -> Result<Task> {
        if self.categories.resolve(&new.category).is_none() {
            return Err(DaytaskError::UnknownCategory(new.category));
        }
        self.tasks.create(new, now)
    }

    /// Feed today's completion count into the streak engine.
    pub fn refresh_streak(&mut self, today: NaiveDate) -> Result<u32> {
        let completed_today = self.tasks.completed_today(today);
        self.streak.evaluate(completed_today, today)
    }

    pub fn summary(&mut self, today: NaiveDate) -> Result<DailySummary> {
        let streak = self.refresh_streak(today)?;
        Ok(DailySummary::new(
            self.tasks.all().len(),
            self.tasks.completed_count(),
            self.tasks.completed_today(today),
            streak,
        ))
    }

    pub fn advisor(&self) -> Result<CommandAdvisor> {
        let command = self
            .config
            .advisor_command()
            .ok_or(DaytaskError::AdvisorDisabled)?;
        Ok(CommandAdvisor::new(command, &self.root).with_timeout(config::advisor_timeout()))
    }

    /// Resolve a user-supplied id (full or unique prefix) to an existing task.
    pub fn resolve_task_id(&self, input: &str) -> Result<TaskId> {
        resolve_task_id_input(input, &self.tasks.ids())
    }

    pub fn task(&self, input: &str) -> Result<&Task> {
        let id = self.resolve_task_id(input)?;
        self.tasks.get(&id).ok_or(DaytaskError::TaskNotFound(id))
    }
}

/// Exact-or-prefix resolver for task id inputs.
///
/// 1) a full id (simple or hyphenated) must match exactly,
/// 2) otherwise a hex prefix must match exactly one task,
/// 3) anything else is invalid.
pub fn resolve_task_id_input(input: &str, existing_ids: &[TaskId]) -> Result<TaskId> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(DaytaskError::InvalidTaskId(
            input.to_string(),
            "task id cannot be empty".into(),
        ));
    }

    if let Ok(exact) = raw.parse::<TaskId>() {
        return existing_ids
            .iter()
            .find(|id| **id == exact)
            .copied()
            .ok_or_else(|| DaytaskError::TaskIdNotFound(raw.to_string()));
    }

    if raw.len() >= TaskId::HEX_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DaytaskError::InvalidTaskId(
            raw.to_string(),
            format!(
                "expected a full task id or a prefix of 1-{} hex characters",
                TaskId::HEX_LEN - 1
            ),
        ));
    }

    let prefix = raw.to_ascii_lowercase();
    let mut matches: Vec<TaskId> = existing_ids
        .iter()
        .filter(|id| id.starts_with(&prefix))
        .copied()
        .collect();
    matches.sort();
    matches.dedup();

    match matches.len() {
        0 => Err(DaytaskError::TaskIdNotFound(raw.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(DaytaskError::TaskIdAmbiguous(
            raw.to_string(),
            matches
                .iter()
                .map(TaskId::to_hex)
                .collect::<Vec<_>>()
                .join(", "),
        )),
    }
}

/// Walk up from the current directory to find the directory holding `.daytask/`.
/// `$DAYTASK_DIR` short-circuits the search.
pub fn find_repo_root() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let mut dir = std::env::current_dir().map_err(DaytaskError::Io)?;
    loop {
        if dir.join(DIR_NAME).exists() {
            return Ok(dir);
        }
        if !dir.pop() {
            return Err(DaytaskError::NotInitialized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::MemoryKv;
    use tempfile::tempdir;

    fn ids(values: &[&str]) -> Vec<TaskId> {
        values.iter().map(|v| v.parse::<TaskId>().unwrap()).collect()
    }

    fn in_memory() -> Repo {
        Repo::with_storage(Path::new("."), Config::default(), Rc::new(MemoryKv::new())).unwrap()
    }

    fn at(ts: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(ts).unwrap()
    }

    fn created() -> DateTime<FixedOffset> {
        at("2024-02-10T06:00:00Z")
    }

    #[test]
    fn init_creates_layout_and_refuses_twice() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        assert!(repo.config_path().exists());
        assert!(dir.path().join(DIR_NAME).join("data").is_dir());
        assert!(matches!(
            Repo::init(dir.path()),
            Err(DaytaskError::AlreadyInitialized)
        ));
    }

    #[test]
    fn open_without_init_fails() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Repo::open(dir.path()),
            Err(DaytaskError::NotInitialized)
        ));
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempdir().unwrap();
        let mut repo = Repo::init(dir.path()).unwrap();
        repo.categories.add("Gym").unwrap();
        let task = repo.create_task(NewTask::new("Run", "Gym"), created()).unwrap();
        let now = at("2024-02-10T07:00:00+01:00");
        repo.tasks.toggle_completion(&task.id, now).unwrap();
        repo.refresh_streak(now.date_naive()).unwrap();
        drop(repo);

        let repo = Repo::open(dir.path()).unwrap();
        assert!(repo.categories.contains("Gym"));
        assert!(repo.tasks.get(&task.id).unwrap().completed);
        assert_eq!(repo.streak.current(), 1);
    }

    #[test]
    fn create_task_requires_known_category() {
        let mut repo = in_memory();
        assert!(matches!(
            repo.create_task(NewTask::new("Yoga", "Gym"), created()),
            Err(DaytaskError::UnknownCategory(c)) if c == "Gym"
        ));
        assert!(repo.tasks.all().is_empty());
    }

    #[test]
    fn deleting_a_category_leaves_tagged_tasks_alone() {
        let mut repo = in_memory();
        repo.categories.add("Gym").unwrap();
        let task = repo.create_task(NewTask::new("Yoga", "Gym"), created()).unwrap();
        repo.categories.delete("Gym").unwrap();
        assert_eq!(repo.tasks.get(&task.id).unwrap().category, "Gym");
    }

    #[test]
    fn summary_reports_progress_and_streak() {
        let mut repo = in_memory();
        let a = repo.create_task(NewTask::new("A", "Work"), created()).unwrap();
        repo.create_task(NewTask::new("B", "Work"), created()).unwrap();
        repo.create_task(NewTask::new("C", "Work"), created()).unwrap();
        let now = at("2024-02-10T12:00:00Z");
        repo.tasks.toggle_completion(&a.id, now).unwrap();

        let summary = repo.summary(now.date_naive()).unwrap();
        assert_eq!(summary, DailySummary::new(3, 1, 1, 1));
        assert_eq!(summary.percent, 33);
    }

    #[test]
    fn advisor_uses_configured_command() {
        let mut repo = in_memory();
        repo.config.set_advisor(Some("echo".into()));
        assert!(repo.advisor().is_ok());
    }

    #[test]
    fn resolves_exact_and_prefix() {
        let existing = ids(&[
            "deadbeef000000000000000000000001",
            "cafebabe000000000000000000000002",
        ]);
        assert_eq!(
            resolve_task_id_input("deadbeef000000000000000000000001", &existing).unwrap(),
            existing[0]
        );
        assert_eq!(resolve_task_id_input("CAFE", &existing).unwrap(), existing[1]);
        assert_eq!(resolve_task_id_input(" dead ", &existing).unwrap(), existing[0]);
    }

    #[test]
    fn reports_ambiguous_prefix_sorted() {
        let existing = ids(&[
            "abcf0000000000000000000000000002",
            "abc00000000000000000000000000001",
        ]);
        match resolve_task_id_input("abc", &existing).unwrap_err() {
            DaytaskError::TaskIdAmbiguous(prefix, matches) => {
                assert_eq!(prefix, "abc");
                assert_eq!(
                    matches,
                    "abc00000000000000000000000000001, abcf0000000000000000000000000002"
                );
            }
            other => panic!("expected TaskIdAmbiguous, got {other:?}"),
        }
    }

    #[test]
    fn reports_not_found_and_invalid() {
        let existing = ids(&["deadbeef000000000000000000000001"]);
        assert!(matches!(
            resolve_task_id_input("beef", &existing),
            Err(DaytaskError::TaskIdNotFound(_))
        ));
        assert!(matches!(
            resolve_task_id_input("ffffffff000000000000000000000001", &existing),
            Err(DaytaskError::TaskIdNotFound(_))
        ));
        assert!(matches!(
            resolve_task_id_input("bad-prefix", &existing),
            Err(DaytaskError::InvalidTaskId(_, _))
        ));
        assert!(matches!(
            resolve_task_id_input("", &existing),
            Err(DaytaskError::InvalidTaskId(_, _))
        ));
    }
}
