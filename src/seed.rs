use crate::models::{AppState, Base, Space, Table, Task, TaskPriority, TaskStatus, ViewMode};

fn task(
    id: &str,
    title: &str,
    status: TaskStatus,
    priority: TaskPriority,
    assignee: &str,
    due_date: &str,
) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        status,
        priority,
        assignee: assignee.to_string(),
        due_date: due_date.to_string(),
        progress: None,
        description: None,
        start_date: None,
    }
}

fn sample_tasks() -> Vec<Task> {
    let mut design = task(
        "task-1",
        "Design system setup",
        TaskStatus::Done,
        TaskPriority::High,
        "Alice",
        "2025-12-20",
    );
    design.start_date = Some("2025-12-15".to_string());
    design.description = Some("Set up the design system foundation".to_string());

    let mut api = task(
        "task-2",
        "API integration",
        TaskStatus::InProgress,
        TaskPriority::High,
        "Bob",
        "2025-12-25",
    );
    api.start_date = Some("2025-12-18".to_string());

    vec![
        design,
        api,
        task(
            "task-3",
            "User testing",
            TaskStatus::Todo,
            TaskPriority::Medium,
            "Charlie",
            "2025-12-30",
        ),
    ]
}

fn marketing_tasks() -> Vec<Task> {
    vec![
        task(
            "task-4",
            "Social media campaign",
            TaskStatus::InProgress,
            TaskPriority::Medium,
            "Diana",
            "2025-12-22",
        ),
        task(
            "task-5",
            "Blog post draft",
            TaskStatus::Todo,
            TaskPriority::Low,
            "Eve",
            "2025-12-28",
        ),
    ]
}

fn personal_tasks() -> Vec<Task> {
    vec![
        task(
            "task-6",
            "Review documents",
            TaskStatus::Todo,
            TaskPriority::High,
            "You",
            "2025-12-24",
        ),
        task(
            "task-7",
            "Team meeting prep",
            TaskStatus::Done,
            TaskPriority::Medium,
            "You",
            "2025-12-23",
        ),
    ]
}

fn table(
    id: &str,
    name: &str,
    icon: &str,
    tasks: Vec<Task>,
    active_view: ViewMode,
    created_at: &str,
    last_modified: &str,
) -> Table {
    Table {
        id: id.to_string(),
        name: name.to_string(),
        icon: Some(icon.to_string()),
        tasks,
        active_view,
        created_at: created_at.to_string(),
        last_modified: last_modified.to_string(),
    }
}

pub fn initial_spaces() -> Vec<Space> {
    vec![
        Space {
            id: "space-1".to_string(),
            name: "Personal Workspace".to_string(),
            is_pinned: Some(true),
            bases: vec![
                Base {
                    id: "base-1".to_string(),
                    name: "Project Alpha".to_string(),
                    icon: Some("🚀".to_string()),
                    color: Some("purple".to_string()),
                    owner: "You".to_string(),
                    created_at: "2025-12-01".to_string(),
                    last_opened: "2025-12-24".to_string(),
                    tables: vec![
                        table(
                            "table-1",
                            "Tasks",
                            "📋",
                            sample_tasks(),
                            ViewMode::Grid,
                            "2025-12-01",
                            "2025-12-24",
                        ),
                        table(
                            "table-2",
                            "Backlog",
                            "📦",
                            Vec::new(),
                            ViewMode::Grid,
                            "2025-12-05",
                            "2025-12-20",
                        ),
                    ],
                },
                Base {
                    id: "base-2".to_string(),
                    name: "Personal Tasks".to_string(),
                    icon: Some("✅".to_string()),
                    color: Some("blue".to_string()),
                    owner: "You".to_string(),
                    created_at: "2025-12-10".to_string(),
                    last_opened: "2025-12-23".to_string(),
                    tables: vec![table(
                        "table-3",
                        "Daily Tasks",
                        "📝",
                        personal_tasks(),
                        ViewMode::Grid,
                        "2025-12-10",
                        "2025-12-23",
                    )],
                },
            ],
        },
        Space {
            id: "space-2".to_string(),
            name: "Work".to_string(),
            is_pinned: None,
            bases: vec![Base {
                id: "base-3".to_string(),
                name: "Marketing Tasks".to_string(),
                icon: Some("📢".to_string()),
                color: Some("green".to_string()),
                owner: "Team".to_string(),
                created_at: "2025-12-05".to_string(),
                last_opened: "2025-12-22".to_string(),
                tables: vec![
                    table(
                        "table-4",
                        "Campaigns",
                        "🎯",
                        marketing_tasks(),
                        ViewMode::Grid,
                        "2025-12-05",
                        "2025-12-22",
                    ),
                    table(
                        "table-5",
                        "Content Calendar",
                        "📅",
                        Vec::new(),
                        ViewMode::Calendar,
                        "2025-12-05",
                        "2025-12-20",
                    ),
                ],
            }],
        },
    ]
}

pub fn default_app_state() -> AppState {
    AppState {
        spaces: initial_spaces(),
        active_space_id: Some("space-1".to_string()),
        active_base_id: Some("base-1".to_string()),
        active_table_id: Some("table-1".to_string()),
    }
}
