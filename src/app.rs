use crate::auth::{AuthService, AUTH_DELAY};
use crate::errors::{AppError, AppResult};
use crate::models::{AppState, ProfilePatch, Session, Task, TaskPriority, TaskStatus};
use crate::remote::RemoteTaskStore;
use crate::state::{self, Intent};
use crate::store::{LocalStore, StateLoad};
use chrono::Utc;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Explicit application context: the one place holding the store, the current
/// tree and the services. Every mutation flows through `dispatch`, which runs
/// the pure reducer and mirrors the whole tree to the store before the new
/// state becomes visible.
pub struct AppCore {
    store: Arc<LocalStore>,
    state: Mutex<AppState>,
    auth: AuthService,
    remote: RemoteTaskStore,
    recovered_snapshot: bool,
}

impl AppCore {
    pub fn open(data_dir: &Path) -> AppResult<Self> {
        Self::open_with(data_dir, AUTH_DELAY)
    }

    pub fn open_with(data_dir: &Path, auth_delay: Duration) -> AppResult<Self> {
        let store = Arc::new(LocalStore::open(&data_dir.join("gridblock.db"))?);
        let StateLoad { state, recovered } = store.load_state()?;
        Ok(Self {
            auth: AuthService::with_delay(store.clone(), auth_delay),
            remote: RemoteTaskStore::from_env(),
            store,
            state: Mutex::new(state),
            recovered_snapshot: recovered,
        })
    }

    pub fn state(&self) -> AppResult<AppState> {
        Ok(self.lock_state()?.clone())
    }

    /// True when the persisted snapshot existed but was corrupt and the
    /// default tree was substituted at startup.
    pub fn snapshot_recovered(&self) -> bool {
        self.recovered_snapshot
    }

    pub fn dispatch(&self, intent: Intent) -> AppResult<AppState> {
        let mut guard = self.lock_state()?;
        let next = state::reduce(&guard, intent, Utc::now());
        // persist first: a storage failure leaves the in-memory tree unchanged
        self.store.save_state(&next)?;
        *guard = next.clone();
        Ok(next)
    }

    /// "New row": appends a blank Todo/Medium task due today to the active
    /// table. Without a resolvable active table this is a no-op.
    pub fn add_task(&self) -> AppResult<AppState> {
        let current = self.state()?;
        let Some(table) = state::active_table(&current) else {
            return Ok(current);
        };
        let mut tasks = table.tasks.clone();
        tasks.push(blank_task());
        self.dispatch(Intent::ReplaceTasks { tasks })
    }

    pub fn update_tasks(&self, tasks: Vec<Task>) -> AppResult<AppState> {
        self.dispatch(Intent::ReplaceTasks { tasks })
    }

    pub fn has_launched(&self) -> AppResult<bool> {
        self.store.has_launched()
    }

    pub fn mark_launched(&self) -> AppResult<()> {
        self.store.mark_launched()
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        self.auth.login(email, password).await
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> AppResult<Session> {
        self.auth.signup(name, email, password).await
    }

    pub fn logout(&self) -> AppResult<()> {
        self.auth.logout()
    }

    pub fn update_profile(&self, patch: ProfilePatch) -> AppResult<Option<Session>> {
        self.auth.update_profile(patch)
    }

    pub fn session(&self) -> AppResult<Option<Session>> {
        self.auth.current()
    }

    pub fn remote(&self) -> &RemoteTaskStore {
        &self.remote
    }

    /// Header lines for the export of the active base/table, or `None` when
    /// nothing is selected.
    pub fn export_summary(&self) -> AppResult<Option<Vec<String>>> {
        let current = self.state()?;
        let (Some(base), Some(table)) = (state::active_base(&current), state::active_table(&current))
        else {
            return Ok(None);
        };
        Ok(Some(crate::views::export_summary(base, table, Utc::now())))
    }

    fn lock_state(&self) -> AppResult<std::sync::MutexGuard<'_, AppState>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("app state mutex poisoned".to_string()))
    }
}

fn blank_task() -> Task {
    Task {
        id: format!("task-{}", Utc::now().timestamp_millis()),
        title: String::new(),
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        assignee: String::new(),
        due_date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        progress: None,
        description: None,
        start_date: None,
    }
}
