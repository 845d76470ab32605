use serde::{Deserialize, Serialize};

/// Completion state of a task as the UI sees it.
///
/// Wire values are the Spanish labels the service and the original web UI
/// exchange, so serialized tasks stay byte-compatible with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "COMPLETADA")]
    Completed,
}

impl Status {
    pub fn from_completed(completed: bool) -> Self {
        if completed {
            Status::Completed
        } else {
            Status::Pending
        }
    }

    pub fn is_completed(self) -> bool {
        self == Status::Completed
    }

    pub fn toggled(self) -> Self {
        match self {
            Status::Pending => Status::Completed,
            Status::Completed => Status::Pending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "PENDIENTE",
            Status::Completed => "COMPLETADA",
        }
    }
}

/// A task as rendered and edited by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: Status,
}

/// A task as the backend stores it: completion is a boolean and the record
/// carries timestamps the UI never shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendTask {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub completed: bool,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Status filter for the visible list. `Todas` matches every task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StatusFilter {
    #[default]
    #[serde(rename = "TODAS")]
    Todas,
    #[serde(rename = "PENDIENTE")]
    Pendientes,
    #[serde(rename = "COMPLETADA")]
    Completadas,
}

impl StatusFilter {
    pub fn matches(self, status: Status) -> bool {
        match self {
            StatusFilter::Todas => true,
            StatusFilter::Pendientes => status == Status::Pending,
            StatusFilter::Completadas => status == Status::Completed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::Todas => "Todas",
            StatusFilter::Pendientes => "Pendientes",
            StatusFilter::Completadas => "Completadas",
        }
    }

    pub fn next(self) -> Self {
        match self {
            StatusFilter::Todas => StatusFilter::Pendientes,
            StatusFilter::Pendientes => StatusFilter::Completadas,
            StatusFilter::Completadas => StatusFilter::Todas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_labels() {
        let json = serde_json::to_string(&Status::Pending).unwrap();
        assert_eq!(json, "\"PENDIENTE\"");
        let back: Status = serde_json::from_str("\"COMPLETADA\"").unwrap();
        assert_eq!(back, Status::Completed);
    }

    #[test]
    fn status_boolean_equivalence() {
        assert_eq!(Status::from_completed(true), Status::Completed);
        assert_eq!(Status::from_completed(false), Status::Pending);
        assert!(Status::Completed.is_completed());
        assert!(!Status::Pending.is_completed());
    }

    #[test]
    fn backend_task_accepts_timestamps_and_missing_description() {
        let raw = r#"{"id":7,"title":"Buy milk","completed":false,
                      "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-02T00:00:00Z"}"#;
        let task: BackendTask = serde_json::from_str(raw).unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.description, "");
        assert_eq!(task.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }
}
