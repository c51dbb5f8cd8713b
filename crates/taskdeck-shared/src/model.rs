use std::fmt;
use std::str::FromStr;

use serde::{
  Deserialize,
  Deserializer,
  Serialize
};

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
  #[default]
  Incomplete,
  Complete
}

impl TaskStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      | TaskStatus::Incomplete => {
        "incomplete"
      }
      | TaskStatus::Complete => {
        "complete"
      }
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | TaskStatus::Incomplete => {
        "Incomplete"
      }
      | TaskStatus::Complete => {
        "Complete"
      }
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      | TaskStatus::Incomplete => {
        TaskStatus::Complete
      }
      | TaskStatus::Complete => {
        TaskStatus::Incomplete
      }
    }
  }
}

impl fmt::Display for TaskStatus {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for TaskStatus {
  type Err = String;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s {
      | "incomplete" => {
        Ok(TaskStatus::Incomplete)
      }
      | "complete" => {
        Ok(TaskStatus::Complete)
      }
      | other => {
        Err(format!(
          "unknown status: {other}"
        ))
      }
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub enum TaskPriority {
  Low,
  #[default]
  Medium,
  High
}

impl TaskPriority {
  pub const ALL: [TaskPriority; 3] = [
    TaskPriority::Low,
    TaskPriority::Medium,
    TaskPriority::High
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | TaskPriority::Low => "Low",
      | TaskPriority::Medium => "Medium",
      | TaskPriority::High => "High"
    }
  }
}

impl fmt::Display for TaskPriority {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for TaskPriority {
  type Err = String;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    TaskPriority::ALL
      .into_iter()
      .find(|p| p.as_str() == s)
      .ok_or_else(|| {
        format!(
          "unknown priority: {s}"
        )
      })
  }
}

/// A task as the backend reports it.
///
/// Every field except the identifier
/// is lenient: missing or malformed
/// values fall back to defaults
/// instead of failing the whole
/// payload.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct Task {
  #[serde(rename = "_id", alias = "id")]
  pub id:          String,
  #[serde(
    default,
    deserialize_with = "lenient_string"
  )]
  pub title:       Option<String>,
  #[serde(
    default,
    deserialize_with = "lenient_string"
  )]
  pub description: Option<String>,
  #[serde(
    default,
    deserialize_with = "lenient_status"
  )]
  pub status:      TaskStatus,
  /// Raw priority; unknown values are
  /// kept so they render with the
  /// neutral colour.
  #[serde(
    default,
    deserialize_with = "lenient_string"
  )]
  pub priority:    Option<String>,
  #[serde(
    default,
    rename = "createdAt",
    deserialize_with = "lenient_string"
  )]
  pub created_at:  Option<String>
}

impl Task {
  pub fn priority_level(
    &self
  ) -> Option<TaskPriority> {
    self
      .priority
      .as_deref()
      .and_then(|p| p.parse().ok())
  }

  /// The full update body with every
  /// editable field carried over
  /// unchanged except `status`.
  pub fn payload_with_status(
    &self,
    status: TaskStatus
  ) -> TaskPayload {
    TaskPayload {
      title: self.title.clone(),
      description: self
        .description
        .clone(),
      status,
      priority: self.priority.clone()
    }
  }
}

/// Request body for create and update.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskPayload {
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub title:       Option<String>,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub description: Option<String>,
  pub status:      TaskStatus,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub priority:    Option<String>
}

#[derive(
  Debug, Clone, Deserialize, PartialEq,
)]
pub struct TaskListEnvelope {
  #[serde(default)]
  pub tasks: Vec<Task>
}

#[derive(
  Debug, Clone, Deserialize, PartialEq,
)]
pub struct TaskEnvelope {
  pub task: Task
}

fn lenient_string<'de, D>(
  deserializer: D
) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>
{
  let value =
    serde_json::Value::deserialize(
      deserializer
    )?;
  Ok(match value {
    | serde_json::Value::String(s) => {
      Some(s)
    }
    | _ => None
  })
}

fn lenient_status<'de, D>(
  deserializer: D
) -> Result<TaskStatus, D::Error>
where
  D: Deserializer<'de>
{
  let raw = lenient_string(deserializer)?;
  Ok(
    raw
      .as_deref()
      .and_then(|s| s.parse().ok())
      .unwrap_or_default()
  )
}

#[cfg(test)]
mod tests {
  use super::{
    Task,
    TaskListEnvelope,
    TaskPriority,
    TaskStatus
  };

  #[test]
  fn decodes_backend_task_with_mongo_id()
  {
    let task: Task =
      serde_json::from_str(
        r#"{
          "_id": "65a1",
          "title": "Write docs",
          "description": "all of them",
          "status": "complete",
          "priority": "High",
          "createdAt": "2024-01-12T09:30:00.000Z"
        }"#
      )
      .expect("decode task");

    assert_eq!(task.id, "65a1");
    assert_eq!(
      task.title.as_deref(),
      Some("Write docs")
    );
    assert_eq!(
      task.status,
      TaskStatus::Complete
    );
    assert_eq!(
      task.priority_level(),
      Some(TaskPriority::High)
    );
  }

  #[test]
  fn malformed_fields_fall_back_to_defaults()
  {
    let list: TaskListEnvelope =
      serde_json::from_str(
        r#"{"tasks": [
          {"_id": "a", "status": "archived", "priority": 3, "title": null},
          {"id": "b"}
        ]}"#
      )
      .expect("decode list");

    assert_eq!(list.tasks.len(), 2);
    let first = &list.tasks[0];
    assert_eq!(
      first.status,
      TaskStatus::Incomplete
    );
    assert_eq!(first.priority, None);
    assert_eq!(first.title, None);
    assert_eq!(list.tasks[1].id, "b");
    assert_eq!(
      list.tasks[1].created_at,
      None
    );
  }

  #[test]
  fn unknown_priority_is_kept_raw() {
    let task: Task =
      serde_json::from_str(
        r#"{"_id": "x", "priority": "Urgent"}"#
      )
      .expect("decode task");
    assert_eq!(
      task.priority.as_deref(),
      Some("Urgent")
    );
    assert_eq!(
      task.priority_level(),
      None
    );
  }

  #[test]
  fn status_payload_omits_missing_fields()
  {
    let task: Task =
      serde_json::from_str(
        r#"{"_id": "x", "description": "d"}"#
      )
      .expect("decode task");
    let body = serde_json::to_value(
      task.payload_with_status(
        TaskStatus::Complete
      )
    )
    .expect("encode payload");

    assert_eq!(
      body,
      serde_json::json!({
        "description": "d",
        "status": "complete"
      })
    );
  }
}
