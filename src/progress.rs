//! Progress tracking and the module-completion state machine
//!
//! Progress is a task-name -> completed map, persisted as a full JSON
//! snapshot after every mutation (write-through, no batching). A task absent
//! from the map counts as incomplete; completion checks always go through
//! that default. All `mark` calls serialize through one mutex so concurrent
//! in-process callers cannot lose updates, and the in-memory state is
//! committed only after the snapshot hits disk.

use crate::curriculum::{Curriculum, Module};
use crate::error::{MentorError, Result};
use crate::types::ModuleCompletionEvent;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Bounded retry count for snapshot writes
const PERSIST_ATTEMPTS: usize = 3;

/// When a fully-complete module fires its completion event
///
/// The original courseware re-fired the event on every mark while the module
/// stayed complete (unchecking and rechecking the last task re-celebrated).
/// `FireOnce` is the default here; `FireEveryMark` restores that behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Emit only on the transition from incomplete to complete
    #[default]
    FireOnce,
    /// Re-emit on every mark while the module is complete
    FireEveryMark,
}

/// Owns the progress snapshot file
#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Load persisted progress. A missing file is non-fatal: an all-false
    /// map is synthesized from the curriculum's task names.
    pub fn load(&self, curriculum: &Curriculum) -> Result<HashMap<String, bool>> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no progress file, starting fresh");
            return Ok(curriculum
                .task_names()
                .map(|t| (t.to_string(), false))
                .collect());
        }

        let raw = fs::read_to_string(&self.path)
            .map_err(|e| MentorError::Persistence(format!("{}: {}", self.path.display(), e)))?;
        let state = serde_json::from_str(&raw)
            .map_err(|e| MentorError::Persistence(format!("{}: {}", self.path.display(), e)))?;
        Ok(state)
    }

    /// Write the complete snapshot, retrying transient failures a bounded
    /// number of times before surfacing `Persistence`.
    pub fn save(&self, state: &HashMap<String, bool>) -> Result<()> {
        let payload = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    MentorError::Persistence(format!("{}: {}", parent.display(), e))
                })?;
            }
        }

        let mut last_err = None;
        for attempt in 1..=PERSIST_ATTEMPTS {
            match fs::write(&self.path, &payload) {
                Ok(()) => {
                    debug!(path = %self.path.display(), "progress snapshot written");
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        "progress write failed (attempt {}/{}): {}",
                        attempt, PERSIST_ATTEMPTS, e
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(MentorError::Persistence(format!(
            "{}: {}",
            self.path.display(),
            last_err.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}

/// Tracks per-task completion and emits module-completion events
pub struct ProgressTracker {
    curriculum: Arc<Curriculum>,
    store: Arc<ProgressStore>,
    policy: CompletionPolicy,
    state: Mutex<HashMap<String, bool>>,
}

impl ProgressTracker {
    /// Load persisted state and build the tracker
    pub fn new(
        curriculum: Arc<Curriculum>,
        store: ProgressStore,
        policy: CompletionPolicy,
    ) -> Result<Self> {
        let state = store.load(&curriculum)?;
        Ok(Self {
            curriculum,
            store: Arc::new(store),
            policy,
            state: Mutex::new(state),
        })
    }

    /// Set a task's completion, persist, and evaluate module completion.
    ///
    /// Fails with `TaskNotInCurriculum` (state untouched) when no module
    /// owns the task, and with `Persistence` when the snapshot cannot be
    /// written; in the latter case the in-memory state is also unchanged.
    pub async fn mark(
        &self,
        task_name: &str,
        completed: bool,
    ) -> Result<Option<ModuleCompletionEvent>> {
        let module = self
            .curriculum
            .module_of_task(task_name)
            .ok_or_else(|| MentorError::TaskNotInCurriculum(task_name.to_string()))?;

        let mut state = self.state.lock().await;

        let was_complete = Self::module_complete(module, &state);

        let mut updated = state.clone();
        updated.insert(task_name.to_string(), completed);

        // The snapshot write is blocking file IO; run it off the async
        // worker threads while the mutex keeps other markers out.
        let store = Arc::clone(&self.store);
        let snapshot = updated.clone();
        tokio::task::spawn_blocking(move || store.save(&snapshot))
            .await
            .map_err(|e| MentorError::Persistence(format!("snapshot write task failed: {}", e)))??;
        *state = updated;

        debug!(task = task_name, completed, module = %module.name, "task marked");

        let now_complete = Self::module_complete(module, &state);
        let fire = match self.policy {
            CompletionPolicy::FireOnce => now_complete && !was_complete,
            CompletionPolicy::FireEveryMark => now_complete,
        };

        if !fire {
            return Ok(None);
        }

        info!(module = %module.name, "module completed");
        Ok(Some(ModuleCompletionEvent {
            module_name: module.name.clone(),
            short_explanation: module.short_explanation.clone(),
            reward: module.reward.clone(),
            difficulty: module.difficulty.clone(),
            notification_asset: module.notification_asset.clone(),
            next_module: self.curriculum.next_after(&module.name),
            completed_at: Utc::now(),
        }))
    }

    /// Completion predicate: every step marked true, absent steps count false
    fn module_complete(module: &Module, state: &HashMap<String, bool>) -> bool {
        module
            .steps
            .iter()
            .all(|step| state.get(step).copied().unwrap_or(false))
    }

    /// Whether a single task is completed
    pub async fn is_completed(&self, task_name: &str) -> bool {
        self.state
            .lock()
            .await
            .get(task_name)
            .copied()
            .unwrap_or(false)
    }

    /// Whether every task of the named module is completed
    pub async fn is_module_completed(&self, module_name: &str) -> bool {
        let Some(module) = self
            .curriculum
            .modules()
            .iter()
            .find(|m| m.name == module_name)
        else {
            return false;
        };
        Self::module_complete(module, &*self.state.lock().await)
    }

    /// A copy of the current progress map
    pub async fn snapshot(&self) -> HashMap<String, bool> {
        self.state.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::Curriculum;
    use tempfile::TempDir;

    fn sample_curriculum() -> Arc<Curriculum> {
        Arc::new(
            Curriculum::from_json_str(
                r#"{
                    "Basics": {
                        "steps": ["s1", "s2"],
                        "short_explanation": "Getting started.",
                        "reward": "Bronze badge",
                        "difficulty": "Easy"
                    },
                    "Advanced": {
                        "steps": ["s3"],
                        "short_explanation": "Deeper material.",
                        "reward": "Gold badge",
                        "difficulty": "Hard"
                    }
                }"#,
            )
            .unwrap(),
        )
    }

    fn tracker_in(dir: &TempDir, policy: CompletionPolicy) -> ProgressTracker {
        let store = ProgressStore::new(dir.path().join("progress.json"));
        ProgressTracker::new(sample_curriculum(), store, policy).unwrap()
    }

    #[tokio::test]
    async fn test_mark_persists_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");
        {
            let tracker = tracker_in(&dir, CompletionPolicy::FireOnce);
            tracker.mark("s1", true).await.unwrap();
        }

        // Reload from disk through a fresh store
        let store = ProgressStore::new(&path);
        let state = store.load(&sample_curriculum()).unwrap();
        assert_eq!(state.get("s1"), Some(&true));
        assert_eq!(state.get("s2"), Some(&false));
    }

    #[tokio::test]
    async fn test_module_completion_fires_once() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker_in(&dir, CompletionPolicy::FireOnce);

        assert!(tracker.mark("s1", true).await.unwrap().is_none());
        assert!(!tracker.is_module_completed("Basics").await);

        let event = tracker.mark("s2", true).await.unwrap().expect("event");
        assert!(tracker.is_module_completed("Basics").await);
        assert_eq!(event.module_name, "Basics");
        assert_eq!(event.reward, "Bronze badge");
        let next = event.next_module.expect("next module");
        assert_eq!(next.module_name, "Advanced");
        assert_eq!(next.short_explanation, "Deeper material.");

        // Re-marking while complete does not re-fire under FireOnce
        assert!(tracker.mark("s2", true).await.unwrap().is_none());

        // Uncheck then recheck transitions again, so it fires again
        assert!(tracker.mark("s2", false).await.unwrap().is_none());
        assert!(tracker.mark("s2", true).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_fire_every_mark_re_emits() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker_in(&dir, CompletionPolicy::FireEveryMark);

        tracker.mark("s1", true).await.unwrap();
        assert!(tracker.mark("s2", true).await.unwrap().is_some());
        // Module already complete; every further mark re-fires
        assert!(tracker.mark("s2", true).await.unwrap().is_some());
        assert!(tracker.mark("s1", true).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_last_module_has_no_next() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker_in(&dir, CompletionPolicy::FireOnce);

        let event = tracker.mark("s3", true).await.unwrap().expect("event");
        assert_eq!(event.module_name, "Advanced");
        assert!(event.next_module.is_none());
    }

    #[tokio::test]
    async fn test_unknown_task_rejected_state_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");
        let tracker = tracker_in(&dir, CompletionPolicy::FireOnce);
        tracker.mark("s1", true).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = tracker.mark("not_a_task", true).await.unwrap_err();
        assert!(matches!(err, MentorError::TaskNotInCurriculum(_)));

        let after = std::fs::read_to_string(&path).unwrap();
        assert_eq!(before, after);
        assert!(!tracker.is_completed("not_a_task").await);
    }

    #[tokio::test]
    async fn test_absent_tasks_default_to_incomplete() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");
        // Persisted state knows only s1; s2 must still count as incomplete
        std::fs::write(&path, r#"{"s1": true}"#).unwrap();

        let store = ProgressStore::new(&path);
        let tracker =
            ProgressTracker::new(sample_curriculum(), store, CompletionPolicy::FireOnce).unwrap();

        assert!(!tracker.is_module_completed("Basics").await);
        let event = tracker.mark("s2", true).await.unwrap();
        assert!(event.is_some());
    }

    #[tokio::test]
    async fn test_fresh_store_synthesizes_all_false() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));
        let state = store.load(&sample_curriculum()).unwrap();
        assert_eq!(state.len(), 3);
        assert!(state.values().all(|v| !v));
    }

    #[tokio::test]
    async fn test_unwritable_path_is_persistence_error() {
        let curriculum = sample_curriculum();
        let store = ProgressStore::new("/proc/progress.json");
        let tracker =
            ProgressTracker::new(curriculum, store, CompletionPolicy::FireOnce).unwrap();

        let err = tracker.mark("s1", true).await.unwrap_err();
        assert!(matches!(err, MentorError::Persistence(_)));
        // Not committed in memory either
        assert!(!tracker.is_completed("s1").await);
    }
}
