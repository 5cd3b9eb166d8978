use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DEFAULT_ADVISOR_TIMEOUT_MS;
use crate::error::{DaytaskError, Result};
use crate::model::CategoryRef;
use crate::store::categories::CategoryStore;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

/// What the categorization advisor is asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisorRequest {
    pub title: String,
    pub description: String,
    /// Labels the suggestion has to come from.
    pub categories: Vec<String>,
}

/// Raw, untrusted advisor answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Suggestion {
    #[serde(alias = "cleanedTitle")]
    pub cleaned_title: String,
    #[serde(alias = "suggestedCategory")]
    pub suggested_category: String,
}

/// A suggestion that passed validation and may be used like user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSuggestion {
    pub title: String,
    pub category: CategoryRef,
}

pub trait Advisor {
    fn suggest(&self, request: &AdvisorRequest) -> Result<Suggestion>;
}

/// Runs an external program via `sh -c`, writing the request as JSON to its
/// stdin and reading a suggestion from its stdout. A command still running
/// after the timeout is killed and reported as an advisor failure.
pub struct CommandAdvisor {
    command: String,
    workdir: PathBuf,
    timeout: Duration,
}

impl CommandAdvisor {
    pub fn new(command: impl Into<String>, workdir: &Path) -> Self {
        Self {
            command: command.into(),
            workdir: workdir.to_path_buf(),
            timeout: Duration::from_millis(DEFAULT_ADVISOR_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Kills the child on drop unless it already exited.
struct ChildGuard {
    child: Child,
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if self.child.try_wait().ok().flatten().is_none() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });
    rx
}

impl Advisor for CommandAdvisor {
    fn suggest(&self, request: &AdvisorRequest) -> Result<Suggestion> {
        let payload = serde_json::to_vec(request)?;
        let child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .current_dir(&self.workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DaytaskError::Advisor(format!("failed to start '{}': {e}", self.command))
            })?;
        let mut guard = ChildGuard { child };
        let stdout = spawn_reader(guard.child.stdout.take());
        let stderr = spawn_reader(guard.child.stderr.take());

        if let Some(mut stdin) = guard.child.stdin.take() {
            // The advisor may exit without reading its input.
            if let Err(e) = stdin.write_all(&payload) {
                debug!(error = %e, "advisor did not consume request");
            }
        }

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match guard.child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    return Err(DaytaskError::Advisor(format!(
                        "command timed out after {} ms",
                        self.timeout.as_millis()
                    )));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(DaytaskError::Advisor(e.to_string())),
            }
        };

        // Output still held open by a background grandchild is not waited for.
        let remaining = deadline.saturating_duration_since(Instant::now());
        let stdout = stdout
            .recv_timeout(remaining.max(OUTPUT_GRACE))
            .unwrap_or_default();
        let stderr = stderr.recv_timeout(OUTPUT_GRACE).unwrap_or_default();

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
            let code = status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(DaytaskError::Advisor(format!(
                "command exited with {code}: {stderr}"
            )));
        }

        let stdout = String::from_utf8_lossy(&stdout);
        serde_json::from_str(stdout.trim())
            .map_err(|e| DaytaskError::Advisor(format!("unreadable response: {e}")))
    }
}

/// Accept a suggestion only if its title is non-empty and its category is one
/// the category store currently knows.
pub fn validate_suggestion(
    suggestion: Suggestion,
    categories: &CategoryStore,
) -> Result<ValidatedSuggestion> {
    let title = suggestion.cleaned_title.trim();
    if title.is_empty() {
        return Err(DaytaskError::InvalidSuggestion("empty title".into()));
    }
    let category = categories
        .resolve(suggestion.suggested_category.trim())
        .ok_or_else(|| {
            DaytaskError::InvalidSuggestion(format!(
                "unknown category '{}'",
                suggestion.suggested_category
            ))
        })?;
    Ok(ValidatedSuggestion {
        title: title.to_string(),
        category,
    })
}

/// Ask the advisor and validate its answer in one step. Failures are logged
/// here and returned for the caller to report.
pub fn advise(
    advisor: &dyn Advisor,
    title: &str,
    description: &str,
    categories: &CategoryStore,
) -> Result<ValidatedSuggestion> {
    let request = AdvisorRequest {
        title: title.to_string(),
        description: description.to_string(),
        categories: categories.names().to_vec(),
    };
    let outcome = advisor
        .suggest(&request)
        .and_then(|s| validate_suggestion(s, categories));
    if let Err(ref e) = outcome {
        warn!(error = %e, "advisor suggestion rejected");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::MemoryKv;
    use std::rc::Rc;
    use tempfile::tempdir;

    struct Canned(Result<Suggestion>);

    impl Advisor for Canned {
        fn suggest(&self, _request: &AdvisorRequest) -> Result<Suggestion> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(DaytaskError::Advisor(e.to_string())),
            }
        }
    }

    fn categories() -> CategoryStore {
        let mut store = CategoryStore::load(Rc::new(MemoryKv::new())).unwrap();
        store.add("Gym").unwrap();
        store
    }

    fn suggestion(title: &str, category: &str) -> Suggestion {
        Suggestion {
            cleaned_title: title.into(),
            suggested_category: category.into(),
        }
    }

    #[test]
    fn accepts_known_default_and_custom_categories() {
        let cats = categories();
        let v = validate_suggestion(suggestion(" Buy milk ", "Shopping"), &cats).unwrap();
        assert_eq!(v.title, "Buy milk");
        assert_eq!(v.category, CategoryRef::Default("Shopping".into()));

        let v = validate_suggestion(suggestion("Leg day", "Gym"), &cats).unwrap();
        assert_eq!(v.category, CategoryRef::Custom("Gym".into()));
    }

    #[test]
    fn rejects_empty_title_and_unknown_category() {
        let cats = categories();
        assert!(matches!(
            validate_suggestion(suggestion("  ", "Work"), &cats),
            Err(DaytaskError::InvalidSuggestion(_))
        ));
        assert!(matches!(
            validate_suggestion(suggestion("Pay rent", "Finance"), &cats),
            Err(DaytaskError::InvalidSuggestion(_))
        ));
    }

    #[test]
    fn parses_camel_case_response() {
        let s: Suggestion = serde_json::from_str(
            r#"{"cleanedTitle": "Call plumber", "suggestedCategory": "Personal"}"#,
        )
        .unwrap();
        assert_eq!(s, suggestion("Call plumber", "Personal"));
    }

    #[test]
    fn advise_passes_failures_through() {
        let cats = categories();
        let failing = Canned(Err(DaytaskError::Advisor("offline".into())));
        assert!(matches!(
            advise(&failing, "x", "", &cats),
            Err(DaytaskError::Advisor(_))
        ));
        let ok = Canned(Ok(suggestion("Tidy desk", "Work")));
        assert_eq!(advise(&ok, "tidy my desk pls", "", &cats).unwrap().title, "Tidy desk");
    }

    #[test]
    fn command_advisor_reads_stdout() {
        let dir = tempdir().unwrap();
        let advisor = CommandAdvisor::new(
            concat!(
                "cat >/dev/null; ",
                r#"echo '{"cleaned_title":"Water plants","suggested_category":"Personal"}'"#,
            ),
            dir.path(),
        );
        let request = AdvisorRequest {
            title: "water the plants!!".into(),
            description: String::new(),
            categories: vec!["Personal".into()],
        };
        assert_eq!(
            advisor.suggest(&request).unwrap(),
            suggestion("Water plants", "Personal")
        );
    }

    #[test]
    fn command_advisor_receives_request_on_stdin() {
        let dir = tempdir().unwrap();
        let advisor = CommandAdvisor::new(
            concat!(
                r#"grep -q '"title":"ping"' && "#,
                r#"echo '{"cleaned_title":"pong","suggested_category":"Work"}'"#,
            ),
            dir.path(),
        );
        let request = AdvisorRequest {
            title: "ping".into(),
            description: String::new(),
            categories: vec![],
        };
        assert_eq!(advisor.suggest(&request).unwrap().cleaned_title, "pong");
    }

    #[test]
    fn command_advisor_reports_failure_and_garbage() {
        let dir = tempdir().unwrap();
        let request = AdvisorRequest {
            title: "t".into(),
            description: String::new(),
            categories: vec![],
        };
        let failing = CommandAdvisor::new("echo boom >&2; exit 3", dir.path());
        match failing.suggest(&request) {
            Err(DaytaskError::Advisor(msg)) => {
                assert!(msg.contains("3"), "{msg}");
                assert!(msg.contains("boom"), "{msg}");
            }
            other => panic!("expected advisor error, got {other:?}"),
        }

        let garbage = CommandAdvisor::new("echo not json", dir.path());
        assert!(matches!(
            garbage.suggest(&request),
            Err(DaytaskError::Advisor(_))
        ));
    }

    #[test]
    fn command_advisor_gives_up_after_timeout() {
        let dir = tempdir().unwrap();
        let request = AdvisorRequest {
            title: "t".into(),
            description: String::new(),
            categories: vec![],
        };
        let hung = CommandAdvisor::new("sleep 10", dir.path())
            .with_timeout(Duration::from_millis(200));

        let started = Instant::now();
        match hung.suggest(&request) {
            Err(DaytaskError::Advisor(msg)) => assert!(msg.contains("timed out"), "{msg}"),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
