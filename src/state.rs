use crate::models::{AppState, Base, Space, Table, Task, ViewMode};
use chrono::{DateTime, Utc};

/// A single user-level mutation of the workspace tree. `ReplaceTasks` is the
/// one choke point for all record edits: add, edit, delete and duplicate all
/// arrive here as the complete new list for the active table.
#[derive(Debug, Clone)]
pub enum Intent {
    SelectSpace { space_id: String },
    SelectBase { base_id: String },
    SelectTable { table_id: String },
    CreateBase { name: String },
    ChangeView { view: ViewMode },
    ReplaceTasks { tasks: Vec<Task> },
}

pub fn active_space(state: &AppState) -> Option<&Space> {
    let id = state.active_space_id.as_deref()?;
    state.spaces.iter().find(|space| space.id == id)
}

pub fn active_base(state: &AppState) -> Option<&Base> {
    let id = state.active_base_id.as_deref()?;
    active_space(state)?.bases.iter().find(|base| base.id == id)
}

pub fn active_table(state: &AppState) -> Option<&Table> {
    let id = state.active_table_id.as_deref()?;
    active_base(state)?
        .tables
        .iter()
        .find(|table| table.id == id)
}

fn timestamp_id(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", prefix, now.timestamp_millis())
}

/// Pure transition function: never mutates `state`, returns the next tree.
/// Unresolvable lookups make the intent a no-op rather than an error.
///
/// Quirks preserved from the reference behavior (see DESIGN.md): `CreateBase`
/// always appends to the first space regardless of the active one, and stale
/// active pointers are never auto-repaired.
pub fn reduce(state: &AppState, intent: Intent, now: DateTime<Utc>) -> AppState {
    match intent {
        Intent::SelectSpace { space_id } => AppState {
            active_space_id: Some(space_id),
            ..state.clone()
        },
        Intent::SelectTable { table_id } => AppState {
            active_table_id: Some(table_id),
            ..state.clone()
        },
        Intent::SelectBase { base_id } => select_base(state, &base_id, now),
        Intent::CreateBase { name } => create_base(state, &name, now),
        Intent::ChangeView { view } => with_active_table(state, |table| Table {
            active_view: view,
            ..table.clone()
        }),
        Intent::ReplaceTasks { tasks } => with_active_table(state, |table| Table {
            tasks: tasks.clone(),
            last_modified: now.to_rfc3339(),
            ..table.clone()
        }),
    }
}

fn select_base(state: &AppState, base_id: &str, now: DateTime<Utc>) -> AppState {
    let Some(owner) = state
        .spaces
        .iter()
        .find(|space| space.bases.iter().any(|base| base.id == base_id))
    else {
        return state.clone();
    };
    let owner_id = owner.id.clone();
    let first_table_id = owner
        .bases
        .iter()
        .find(|base| base.id == base_id)
        .and_then(|base| base.tables.first())
        .map(|table| table.id.clone());

    let spaces = state
        .spaces
        .iter()
        .map(|space| {
            if space.id != owner_id {
                return space.clone();
            }
            Space {
                bases: space
                    .bases
                    .iter()
                    .map(|base| {
                        if base.id == base_id {
                            Base {
                                last_opened: now.to_rfc3339(),
                                ..base.clone()
                            }
                        } else {
                            base.clone()
                        }
                    })
                    .collect(),
                ..space.clone()
            }
        })
        .collect();

    AppState {
        spaces,
        active_space_id: Some(owner_id),
        active_base_id: Some(base_id.to_string()),
        active_table_id: first_table_id,
    }
}

fn create_base(state: &AppState, name: &str, now: DateTime<Utc>) -> AppState {
    if state.spaces.is_empty() {
        return state.clone();
    }

    let base = Base {
        id: timestamp_id("base", now),
        name: name.to_string(),
        icon: Some("📊".to_string()),
        color: Some("purple".to_string()),
        owner: "You".to_string(),
        created_at: now.to_rfc3339(),
        last_opened: now.to_rfc3339(),
        tables: vec![Table {
            id: timestamp_id("table", now),
            name: "Table 1".to_string(),
            icon: Some("📋".to_string()),
            tasks: Vec::new(),
            active_view: ViewMode::Grid,
            created_at: now.to_rfc3339(),
            last_modified: now.to_rfc3339(),
        }],
    };
    let base_id = base.id.clone();
    let table_id = base.tables[0].id.clone();

    let mut spaces = state.spaces.clone();
    spaces[0].bases.push(base);

    // The active space is deliberately left alone, even when it is not the
    // first space the new base landed in.
    AppState {
        spaces,
        active_space_id: state.active_space_id.clone(),
        active_base_id: Some(base_id),
        active_table_id: Some(table_id),
    }
}

fn with_active_table(state: &AppState, update: impl Fn(&Table) -> Table) -> AppState {
    let (Some(space_id), Some(base_id), Some(table_id)) = (
        active_space(state).map(|space| space.id.clone()),
        active_base(state).map(|base| base.id.clone()),
        active_table(state).map(|table| table.id.clone()),
    ) else {
        return state.clone();
    };

    let spaces = state
        .spaces
        .iter()
        .map(|space| {
            if space.id != space_id {
                return space.clone();
            }
            Space {
                bases: space
                    .bases
                    .iter()
                    .map(|base| {
                        if base.id != base_id {
                            return base.clone();
                        }
                        Base {
                            tables: base
                                .tables
                                .iter()
                                .map(|table| {
                                    if table.id == table_id {
                                        update(table)
                                    } else {
                                        table.clone()
                                    }
                                })
                                .collect(),
                            ..base.clone()
                        }
                    })
                    .collect(),
                ..space.clone()
            }
        })
        .collect();

    AppState {
        spaces,
        ..state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskPriority, TaskStatus};
    use crate::seed::default_app_state;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn sample_task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            assignee: String::new(),
            due_date: "2025-12-24".to_string(),
            progress: None,
            description: None,
            start_date: None,
        }
    }

    #[test]
    fn replace_tasks_swaps_the_active_table_list() {
        let state = default_app_state();
        let next = reduce(
            &state,
            Intent::ReplaceTasks {
                tasks: vec![sample_task("a"), sample_task("b")],
            },
            now(),
        );
        assert_eq!(active_table(&next).expect("active table").tasks.len(), 2);
        // untouched sibling table
        assert_eq!(next.spaces[0].bases[0].tables[1].tasks.len(), 0);
        // original tree is untouched
        assert_eq!(active_table(&state).expect("active table").tasks.len(), 3);
    }

    #[test]
    fn task_count_always_matches_last_supplied_list() {
        let mut state = default_app_state();
        for count in [5usize, 0, 2, 7, 1] {
            let tasks = (0..count)
                .map(|index| sample_task(&format!("t{}", index)))
                .collect::<Vec<_>>();
            state = reduce(&state, Intent::ReplaceTasks { tasks }, now());
            assert_eq!(active_table(&state).expect("active table").tasks.len(), count);
        }
    }

    #[test]
    fn create_base_appends_to_first_space_and_activates_its_table() {
        let mut state = default_app_state();
        // make a non-first space active to pin down the quirk
        state = reduce(
            &state,
            Intent::SelectSpace {
                space_id: "space-2".to_string(),
            },
            now(),
        );
        let before = state.spaces[0].bases.len();

        let next = reduce(
            &state,
            Intent::CreateBase {
                name: "Roadmap".to_string(),
            },
            now(),
        );

        assert_eq!(next.spaces[0].bases.len(), before + 1);
        assert_eq!(next.spaces[1].bases.len(), state.spaces[1].bases.len());
        let created = next.spaces[0].bases.last().expect("new base");
        assert_eq!(created.name, "Roadmap");
        assert_eq!(created.tables.len(), 1);
        assert!(created.tables[0].tasks.is_empty());
        assert_eq!(next.active_base_id.as_deref(), Some(created.id.as_str()));
        assert_eq!(
            next.active_table_id.as_deref(),
            Some(created.tables[0].id.as_str())
        );
        // active space still points at the previously selected space
        assert_eq!(next.active_space_id.as_deref(), Some("space-2"));
    }

    #[test]
    fn select_base_resolves_owner_and_bumps_last_opened() {
        let state = default_app_state();
        let next = reduce(
            &state,
            Intent::SelectBase {
                base_id: "base-3".to_string(),
            },
            now(),
        );
        assert_eq!(next.active_space_id.as_deref(), Some("space-2"));
        assert_eq!(next.active_base_id.as_deref(), Some("base-3"));
        assert_eq!(next.active_table_id.as_deref(), Some("table-4"));
        assert_ne!(
            next.spaces[1].bases[0].last_opened,
            state.spaces[1].bases[0].last_opened
        );
    }

    #[test]
    fn select_base_without_owner_is_a_no_op() {
        let state = default_app_state();
        let next = reduce(
            &state,
            Intent::SelectBase {
                base_id: "base-missing".to_string(),
            },
            now(),
        );
        assert_eq!(next, state);
    }

    #[test]
    fn change_view_never_touches_tasks() {
        let state = default_app_state();
        let next = reduce(
            &state,
            Intent::ChangeView {
                view: ViewMode::Gantt,
            },
            now(),
        );
        let table = active_table(&next).expect("active table");
        assert_eq!(table.active_view, ViewMode::Gantt);
        assert_eq!(table.tasks, active_table(&state).expect("table").tasks);
    }

    #[test]
    fn intents_on_a_dangling_active_path_are_no_ops() {
        let mut state = default_app_state();
        state.active_table_id = Some("table-gone".to_string());
        let next = reduce(
            &state,
            Intent::ReplaceTasks {
                tasks: vec![sample_task("x")],
            },
            now(),
        );
        assert_eq!(next, state);
    }
}
