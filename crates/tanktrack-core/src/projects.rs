//! Project repository: owns the project list, the active pointer, and
//! the working copy of the active snapshot.
//!
//! Persistence model: the stored project list changes only on explicit
//! save, delete, or reset; the working copy is written through to its
//! own key on every mutation, so a session resumes where it left off.
//! Edits that have not been saved into a project are tracked by an
//! explicit dirty flag.
//!
//! Two repositories over the same store stay consistent through key
//! subscriptions: a remote list update replaces the local list (failing
//! over to the default project if the active one disappeared), and a
//! remote active-pointer change switches the working copy,
//! last-write-wins.
//!
//! Locking invariant: every store write happens with the state lock
//! released. Subscribers are notified synchronously, and the callbacks
//! retake the lock; they are written to be idempotent against echoes of
//! this repository's own writes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, TankError};
use crate::model::{
    seed, Asset, Project, ProjectSummary, RepairPrice, Rule, Snapshot, DEFAULT_PROJECT_ID,
};
use crate::store::{
    read_or, write_json, KvStore, Subscription, ACTIVE_PROJECT_KEY, PROJECTS_KEY,
    WORKING_SNAPSHOT_KEY,
};

/// The persisted form of the working copy: the snapshot plus the project
/// it belongs to, so a stale copy is never resumed against the wrong
/// project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkingCopy {
    project_id: String,
    dirty: bool,
    snapshot: Snapshot,
}

struct RepoState {
    projects: Vec<Project>,
    active_id: String,
    working: Snapshot,
    dirty: bool,
}

impl RepoState {
    fn working_copy(&self) -> WorkingCopy {
        WorkingCopy {
            project_id: self.active_id.clone(),
            dirty: self.dirty,
            snapshot: self.working.clone(),
        }
    }

    fn stored_snapshot(&self, id: &str) -> Option<Snapshot> {
        self.projects
            .iter()
            .find(|project| project.id == id)
            .map(|project| project.snapshot.clone())
    }
}

fn lock(state: &Mutex<RepoState>) -> MutexGuard<'_, RepoState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to the project state. Construction via [`ProjectRepository::load`]
/// is the readiness gate: a repository value is always fully loaded.
pub struct ProjectRepository {
    store: Arc<dyn KvStore>,
    state: Arc<Mutex<RepoState>>,
    _subscriptions: Vec<Subscription>,
}

impl ProjectRepository {
    /// Read the stored state and return a ready repository.
    ///
    /// A missing or corrupt project list falls back to the built-in
    /// default project; a dangling active pointer is re-targeted at the
    /// default project. Repairs made during load are persisted before
    /// cross-store subscriptions are wired up.
    pub fn load(store: Arc<dyn KvStore>) -> Result<Self> {
        let mut projects: Vec<Project> = read_or(store.as_ref(), PROJECTS_KEY, Vec::new());
        let mut list_repaired = false;
        if projects.is_empty() {
            projects.push(seed::default_project());
            list_repaired = true;
        }
        if !projects.iter().any(Project::is_default) {
            projects.insert(0, seed::default_project());
            list_repaired = true;
        }

        let mut active_id: String =
            read_or(store.as_ref(), ACTIVE_PROJECT_KEY, DEFAULT_PROJECT_ID.to_string());
        let mut pointer_repaired = false;
        if !projects.iter().any(|project| project.id == active_id) {
            tracing::warn!(%active_id, "stored active project not found; falling back to default");
            active_id = DEFAULT_PROJECT_ID.to_string();
            pointer_repaired = true;
        }

        let resumed: Option<WorkingCopy> = read_or(store.as_ref(), WORKING_SNAPSHOT_KEY, None);
        let (working, dirty) = match resumed {
            Some(copy) if copy.project_id == active_id => (copy.snapshot, copy.dirty),
            _ => {
                let snapshot = projects
                    .iter()
                    .find(|project| project.id == active_id)
                    .map(|project| project.snapshot.clone())
                    .unwrap_or_else(seed::default_snapshot);
                (snapshot, false)
            }
        };

        if list_repaired {
            write_json(store.as_ref(), PROJECTS_KEY, &projects)?;
        }
        if pointer_repaired {
            write_json(store.as_ref(), ACTIVE_PROJECT_KEY, &active_id)?;
        }

        let state = Arc::new(Mutex::new(RepoState {
            projects,
            active_id,
            working,
            dirty,
        }));
        let subscriptions = vec![
            Self::watch_project_list(&store, &state),
            Self::watch_active_pointer(&store, &state),
        ];
        Ok(Self {
            store,
            state,
            _subscriptions: subscriptions,
        })
    }

    /// Follow remote rewrites of the project list. If the rewrite removed
    /// the project this repository is working on, fail over to the
    /// default project and persist the new pointer.
    fn watch_project_list(
        store: &Arc<dyn KvStore>,
        state: &Arc<Mutex<RepoState>>,
    ) -> Subscription {
        let state = Arc::clone(state);
        let store_for_failover = Arc::clone(store);
        store.subscribe(
            PROJECTS_KEY,
            Box::new(move |value| {
                let projects: Vec<Project> = match serde_json::from_value(value.clone()) {
                    Ok(projects) => projects,
                    Err(err) => {
                        tracing::warn!(error = %err, "ignoring malformed project list update");
                        return;
                    }
                };
                let failover = {
                    let mut guard = lock(&state);
                    let active_removed =
                        !projects.iter().any(|project| project.id == guard.active_id);
                    guard.projects = projects;
                    if active_removed {
                        tracing::info!(
                            active_id = %guard.active_id,
                            "active project removed remotely; failing over to default"
                        );
                        guard.active_id = DEFAULT_PROJECT_ID.to_string();
                        guard.working = guard
                            .stored_snapshot(DEFAULT_PROJECT_ID)
                            .unwrap_or_else(seed::default_snapshot);
                        guard.dirty = false;
                        Some(guard.working_copy())
                    } else {
                        None
                    }
                };
                if let Some(copy) = failover {
                    if let Err(err) =
                        write_json(store_for_failover.as_ref(), ACTIVE_PROJECT_KEY, &copy.project_id)
                    {
                        tracing::warn!(error = %err, "failed to persist fail-over pointer");
                    }
                    if let Err(err) =
                        write_json(store_for_failover.as_ref(), WORKING_SNAPSHOT_KEY, &copy)
                    {
                        tracing::warn!(error = %err, "failed to persist fail-over working copy");
                    }
                }
            }),
        )
    }

    /// Follow remote active-pointer changes. The writing side already
    /// persisted the working copy, so this side only updates memory.
    fn watch_active_pointer(
        store: &Arc<dyn KvStore>,
        state: &Arc<Mutex<RepoState>>,
    ) -> Subscription {
        let state = Arc::clone(state);
        store.subscribe(
            ACTIVE_PROJECT_KEY,
            Box::new(move |value| {
                let Some(next_id) = value.as_str() else {
                    tracing::warn!("ignoring non-string active project pointer");
                    return;
                };
                let mut guard = lock(&state);
                if guard.active_id == next_id {
                    return;
                }
                let Some(snapshot) = guard.stored_snapshot(next_id) else {
                    tracing::warn!(%next_id, "ignoring pointer to unknown project");
                    return;
                };
                guard.active_id = next_id.to_string();
                guard.working = snapshot;
                guard.dirty = false;
            }),
        )
    }

    pub fn list_projects(&self) -> Vec<ProjectSummary> {
        lock(&self.state).projects.iter().map(ProjectSummary::from).collect()
    }

    pub fn active_project_id(&self) -> String {
        lock(&self.state).active_id.clone()
    }

    pub fn active_project_name(&self) -> String {
        let guard = lock(&self.state);
        guard
            .projects
            .iter()
            .find(|project| project.id == guard.active_id)
            .map(|project| project.name.clone())
            .unwrap_or_else(|| guard.active_id.clone())
    }

    /// Clone of the working copy of the active snapshot.
    pub fn snapshot(&self) -> Snapshot {
        lock(&self.state).working.clone()
    }

    /// Whether the working copy has edits not saved into any project.
    pub fn has_unsaved_changes(&self) -> bool {
        lock(&self.state).dirty
    }

    /// Apply `mutate` to a copy of the working snapshot, validate the
    /// result, and commit it. The stored state is untouched if the
    /// mutation or validation fails; a failed persist keeps the new
    /// in-memory state and surfaces the error.
    fn commit_working<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Snapshot) -> Result<()>,
    {
        let copy = {
            let mut guard = lock(&self.state);
            let mut candidate = guard.working.clone();
            mutate(&mut candidate)?;
            candidate.validate()?;
            guard.working = candidate;
            guard.dirty = true;
            guard.working_copy()
        };
        write_json(self.store.as_ref(), WORKING_SNAPSHOT_KEY, &copy)
    }

    pub fn set_assets(&self, assets: Vec<Asset>) -> Result<()> {
        self.update_assets(|current| {
            *current = assets;
            Ok(())
        })
    }

    pub fn update_assets<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Asset>) -> Result<()>,
    {
        self.commit_working(|working| {
            mutate(&mut working.assets)?;
            for asset in &mut working.assets {
                asset.normalize();
            }
            Ok(())
        })
    }

    pub fn set_repair_prices(&self, prices: Vec<RepairPrice>) -> Result<()> {
        self.update_repair_prices(|current| {
            *current = prices;
            Ok(())
        })
    }

    pub fn update_repair_prices<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<RepairPrice>) -> Result<()>,
    {
        self.commit_working(|working| mutate(&mut working.repair_prices))
    }

    pub fn set_rules(&self, rules: Vec<Rule>) -> Result<()> {
        self.update_rules(|current| {
            *current = rules;
            Ok(())
        })
    }

    pub fn update_rules<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Rule>) -> Result<()>,
    {
        self.commit_working(|working| mutate(&mut working.rules))
    }

    /// Make `id` the active project and load its stored snapshot as the
    /// working copy. Unsaved edits to the previous working copy are
    /// discarded. Switching to the already-active project is a no-op.
    pub fn switch_to(&self, id: &str) -> Result<()> {
        let copy = {
            let mut guard = lock(&self.state);
            if guard.active_id == id {
                return Ok(());
            }
            let Some(snapshot) = guard.stored_snapshot(id) else {
                return Err(TankError::NotFound(format!("No project with id '{id}'")));
            };
            if guard.dirty {
                tracing::info!(from = %guard.active_id, to = %id, "switch discards unsaved changes");
            }
            guard.active_id = id.to_string();
            guard.working = snapshot;
            guard.dirty = false;
            guard.working_copy()
        };
        write_json(self.store.as_ref(), ACTIVE_PROJECT_KEY, &copy.project_id)?;
        write_json(self.store.as_ref(), WORKING_SNAPSHOT_KEY, &copy)
    }

    /// Save the working copy as a new named project and switch to it.
    pub fn save_as_new(&self, name: &str) -> Result<ProjectSummary> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TankError::Validation(
                "Project name cannot be empty".to_string(),
            ));
        }
        let (projects, summary, copy) = {
            let mut guard = lock(&self.state);
            let project = Project {
                id: format!("PROJ-{}", Uuid::new_v4()),
                name: trimmed.to_string(),
                created_at: Utc::now(),
                snapshot: guard.working.clone(),
            };
            let summary = ProjectSummary::from(&project);
            guard.projects.push(project);
            guard.active_id = summary.id.clone();
            guard.dirty = false;
            (guard.projects.clone(), summary, guard.working_copy())
        };
        write_json(self.store.as_ref(), PROJECTS_KEY, &projects)?;
        write_json(self.store.as_ref(), ACTIVE_PROJECT_KEY, &summary.id)?;
        write_json(self.store.as_ref(), WORKING_SNAPSHOT_KEY, &copy)?;
        Ok(summary)
    }

    /// Save the working copy over the active project's stored snapshot.
    pub fn update_current(&self) -> Result<()> {
        let (projects, copy) = {
            let mut guard = lock(&self.state);
            if guard.active_id == DEFAULT_PROJECT_ID {
                return Err(TankError::ProtectedProject(
                    "save under a new name instead".to_string(),
                ));
            }
            let active_id = guard.active_id.clone();
            let working = guard.working.clone();
            let Some(project) = guard
                .projects
                .iter_mut()
                .find(|project| project.id == active_id)
            else {
                return Err(TankError::NotFound(format!(
                    "No project with id '{active_id}'"
                )));
            };
            project.snapshot = working;
            guard.dirty = false;
            (guard.projects.clone(), guard.working_copy())
        };
        write_json(self.store.as_ref(), PROJECTS_KEY, &projects)?;
        write_json(self.store.as_ref(), WORKING_SNAPSHOT_KEY, &copy)
    }

    /// Remove a project. Deleting the active project fails over to the
    /// default project.
    pub fn delete_project(&self, id: &str) -> Result<()> {
        if id == DEFAULT_PROJECT_ID {
            return Err(TankError::ProtectedProject(
                "it cannot be deleted".to_string(),
            ));
        }
        let (projects, failover) = {
            let mut guard = lock(&self.state);
            let before = guard.projects.len();
            guard.projects.retain(|project| project.id != id);
            if guard.projects.len() == before {
                return Err(TankError::NotFound(format!("No project with id '{id}'")));
            }
            let failover = if guard.active_id == id {
                guard.active_id = DEFAULT_PROJECT_ID.to_string();
                guard.working = guard
                    .stored_snapshot(DEFAULT_PROJECT_ID)
                    .unwrap_or_else(seed::default_snapshot);
                guard.dirty = false;
                Some(guard.working_copy())
            } else {
                None
            };
            (guard.projects.clone(), failover)
        };
        write_json(self.store.as_ref(), PROJECTS_KEY, &projects)?;
        if let Some(copy) = failover {
            write_json(self.store.as_ref(), ACTIVE_PROJECT_KEY, &copy.project_id)?;
            write_json(self.store.as_ref(), WORKING_SNAPSHOT_KEY, &copy)?;
        }
        Ok(())
    }

    /// Replace the working copy with the built-in seed data. Saved
    /// projects are untouched until explicitly saved over.
    pub fn reset_to_defaults(&self) -> Result<()> {
        let copy = {
            let mut guard = lock(&self.state);
            guard.working = seed::default_snapshot();
            guard.dirty = true;
            guard.working_copy()
        };
        write_json(self.store.as_ref(), WORKING_SNAPSHOT_KEY, &copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn fresh_repo() -> (Arc<MemoryStore>, ProjectRepository) {
        let store = Arc::new(MemoryStore::new());
        let repo = ProjectRepository::load(Arc::clone(&store) as Arc<dyn KvStore>)
            .expect("load over empty store");
        (store, repo)
    }

    #[test]
    fn test_empty_store_bootstraps_default_project() {
        let (_store, repo) = fresh_repo();
        assert_eq!(repo.active_project_id(), DEFAULT_PROJECT_ID);
        let summaries = repo.list_projects();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, DEFAULT_PROJECT_ID);
        assert!(!repo.snapshot().assets.is_empty());
    }

    #[test]
    fn test_switch_to_active_project_is_noop() {
        let (_store, repo) = fresh_repo();
        repo.update_assets(|assets| {
            assets.clear();
            Ok(())
        })
        .expect("clear assets");
        repo.switch_to(DEFAULT_PROJECT_ID).expect("no-op switch");
        // Edits survive: the no-op path must not reload the stored copy.
        assert!(repo.snapshot().assets.is_empty());
        assert!(repo.has_unsaved_changes());
    }

    #[test]
    fn test_switch_to_unknown_project_is_rejected() {
        let (_store, repo) = fresh_repo();
        assert!(matches!(
            repo.switch_to("PROJ-missing"),
            Err(TankError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_current_on_default_is_rejected() {
        let (_store, repo) = fresh_repo();
        assert!(matches!(
            repo.update_current(),
            Err(TankError::ProtectedProject(_))
        ));
        assert_eq!(repo.active_project_id(), DEFAULT_PROJECT_ID);
    }

    #[test]
    fn test_delete_default_is_rejected() {
        let (_store, repo) = fresh_repo();
        assert!(matches!(
            repo.delete_project(DEFAULT_PROJECT_ID),
            Err(TankError::ProtectedProject(_))
        ));
        assert_eq!(repo.list_projects().len(), 1);
    }

    #[test]
    fn test_invalid_mutation_leaves_state_untouched() {
        let (_store, repo) = fresh_repo();
        let original = repo.snapshot();
        let result = repo.update_assets(|assets| {
            let duplicate = assets[0].clone();
            assets.push(duplicate);
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(repo.snapshot(), original);
        assert!(!repo.has_unsaved_changes());
    }
}
