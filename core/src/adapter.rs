//! Conversion between the backend task shape (`completed: bool` plus
//! timestamps) and the UI task shape (`status` enum, no timestamps).
//!
//! Both directions are total: any value matching the declared shape converts
//! without loss of the fields the UI owns. Timestamps are dropped on the way
//! in and never fabricated on the way out.

use serde::Serialize;

use crate::model::{BackendTask, Status, Task};

pub fn to_ui(backend: BackendTask) -> Task {
    Task {
        id: backend.id,
        title: backend.title,
        description: backend.description,
        status: Status::from_completed(backend.completed),
    }
}

/// The writable subset of the backend shape. Only present fields are
/// serialized, so a `{completed}`-only body stays a `{completed}`-only body.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct TaskWrite {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

pub fn to_backend(
    title: Option<&str>,
    description: Option<&str>,
    status: Option<Status>,
) -> TaskWrite {
    TaskWrite {
        title: title.map(str::to_string),
        description: description.map(str::to_string),
        completed: status.map(Status::is_completed),
    }
}
