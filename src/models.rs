use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Grid,
    Kanban,
    Calendar,
    Gantt,
    Form,
}

impl ViewMode {
    pub const ALL: [ViewMode; 5] = [
        Self::Grid,
        Self::Kanban,
        Self::Calendar,
        Self::Gantt,
        Self::Form,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Kanban => "kanban",
            Self::Calendar => "calendar",
            Self::Gantt => "gantt",
            Self::Form => "form",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALLOWED: [&'static str; 3] = ["Todo", "In Progress", "Done"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Todo" => Some(Self::Todo),
            "In Progress" => Some(Self::InProgress),
            "Done" => Some(Self::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl TaskPriority {
    pub const ALLOWED: [&'static str; 3] = ["High", "Medium", "Low"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub assignee: String,
    pub due_date: String,
    pub progress: Option<f64>,
    pub description: Option<String>,
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub tasks: Vec<Task>,
    pub active_view: ViewMode,
    pub created_at: String,
    pub last_modified: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Base {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub tables: Vec<Table>,
    pub created_at: String,
    pub last_opened: String,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: String,
    pub name: String,
    pub bases: Vec<Base>,
    pub is_pinned: Option<bool>,
}

/// Full application tree. The three active ids are weak references resolved by
/// lookup; deleting an entity can leave them dangling (see `state` module).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub spaces: Vec<Space>,
    pub active_space_id: Option<String>,
    pub active_base_id: Option<String>,
    pub active_table_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub created_at: String,
}

/// Raw task fields as entered by the user, validated before any remote write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: String,
    pub status: String,
    pub priority: String,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub progress: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_exact_wire_strings() {
        let json = serde_json::to_string(&TaskStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"In Progress\"");
        let back: TaskStatus = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, TaskStatus::InProgress);
        assert!(TaskStatus::parse("Archived").is_none());
    }

    #[test]
    fn view_mode_serializes_lowercase() {
        let json = serde_json::to_string(&ViewMode::Gantt).expect("serialize");
        assert_eq!(json, "\"gantt\"");
    }

    #[test]
    fn task_uses_camel_case_field_names() {
        let task = Task {
            id: "task-1".to_string(),
            title: "Design".to_string(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            assignee: "Alice".to_string(),
            due_date: "2025-12-20".to_string(),
            progress: Some(30.0),
            description: None,
            start_date: None,
        };
        let value = serde_json::to_value(&task).expect("to value");
        assert!(value.get("dueDate").is_some());
        assert!(value.get("due_date").is_none());
    }
}
