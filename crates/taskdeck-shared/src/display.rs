use chrono::{
  DateTime,
  Local
};

use crate::model::{
  Task,
  TaskPriority,
  TaskStatus
};

/// Colour bucket for a priority.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum PriorityTone {
  Red,
  Yellow,
  Green,
  Neutral
}

impl PriorityTone {
  pub fn of(priority: Option<&str>) -> Self {
    match priority
      .and_then(|p| p.parse().ok())
    {
      | Some(TaskPriority::High) => {
        PriorityTone::Red
      }
      | Some(TaskPriority::Medium) => {
        PriorityTone::Yellow
      }
      | Some(TaskPriority::Low) => {
        PriorityTone::Green
      }
      | None => PriorityTone::Neutral
    }
  }

  pub fn css_class(self) -> &'static str {
    match self {
      | PriorityTone::Red => "text-red",
      | PriorityTone::Yellow => {
        "text-yellow"
      }
      | PriorityTone::Green => {
        "text-green"
      }
      | PriorityTone::Neutral => {
        "text-gray"
      }
    }
  }

  /// ANSI SGR colour code for terminals.
  pub fn ansi(self) -> &'static str {
    match self {
      | PriorityTone::Red => "31",
      | PriorityTone::Yellow => "33",
      | PriorityTone::Green => "32",
      | PriorityTone::Neutral => "90"
    }
  }
}

/// Everything a list row shows, already
/// defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
  pub id:             String,
  pub title:          String,
  pub priority_label: String,
  pub tone:           PriorityTone,
  pub status:         TaskStatus,
  pub description:    String,
  pub created:        String
}

impl TaskRow {
  /// `index` is the 0-based position in
  /// the rendered sequence.
  pub fn build(
    task: &Task,
    index: usize,
    now: DateTime<Local>
  ) -> Self {
    Self {
      id:             task.id.clone(),
      title:          display_title(
        task, index
      ),
      priority_label: format!(
        "{} Priority",
        priority_label(task)
      ),
      tone:           PriorityTone::of(
        task.priority.as_deref()
      ),
      status:         task.status,
      description:    task
        .description
        .clone()
        .unwrap_or_default(),
      created:        format_created(
        task.created_at.as_deref(),
        now
      )
    }
  }

  pub fn is_complete(&self) -> bool {
    self.status == TaskStatus::Complete
  }

  pub fn status_label(
    &self
  ) -> &'static str {
    self.status.label()
  }
}

pub fn display_title(
  task: &Task,
  index: usize
) -> String {
  task
    .title
    .clone()
    .filter(|t| !t.is_empty())
    .unwrap_or_else(|| {
      format!("Task #{}", index + 1)
    })
}

pub fn priority_label(task: &Task) -> &str {
  task
    .priority
    .as_deref()
    .filter(|p| !p.is_empty())
    .unwrap_or(
      TaskPriority::default().as_str()
    )
}

/// Formats a creation timestamp; absent
/// or unparseable values show `now`.
pub fn format_created(
  created_at: Option<&str>,
  now: DateTime<Local>
) -> String {
  let when = created_at
    .and_then(|raw| {
      DateTime::parse_from_rfc3339(raw)
        .ok()
    })
    .map(|dt| dt.with_timezone(&Local))
    .unwrap_or(now);
  when
    .format("%b %-d, %Y, %I:%M %p")
    .to_string()
}

pub fn rows(
  tasks: &[Task],
  now: DateTime<Local>
) -> Vec<TaskRow> {
  tasks
    .iter()
    .enumerate()
    .map(|(index, task)| {
      TaskRow::build(task, index, now)
    })
    .collect()
}

pub fn list_heading(
  count: usize
) -> Option<String> {
  (count > 0)
    .then(|| format!("Your tasks ({count})"))
}

pub const EMPTY_LIST_MESSAGE: &str =
  "No tasks found";

#[cfg(test)]
mod tests {
  use chrono::{
    Local,
    TimeZone
  };

  use super::{
    PriorityTone,
    TaskRow,
    format_created,
    list_heading,
    rows
  };
  use crate::model::{
    Task,
    TaskStatus
  };

  fn task(
    id: &str,
    title: Option<&str>,
    priority: Option<&str>
  ) -> Task {
    Task {
      id:          id.to_string(),
      title:       title.map(str::to_string),
      description: Some("body".to_string()),
      status:      TaskStatus::Incomplete,
      priority:    priority
        .map(str::to_string),
      created_at:  None
    }
  }

  #[test]
  fn untitled_task_at_position_three_uses_placeholder()
  {
    let now = Local::now();
    let tasks = vec![
      task("a", Some("First"), Some("High")),
      task("b", None, Some("Medium")),
      task("c", Some(""), Some("Low")),
    ];
    let rendered = rows(&tasks, now);

    assert_eq!(rendered[0].title, "First");
    assert_eq!(rendered[1].title, "Task #2");
    assert_eq!(rendered[2].title, "Task #3");
    assert_eq!(
      rendered[2].priority_label,
      "Low Priority"
    );
    assert_eq!(
      rendered[2].tone,
      PriorityTone::Green
    );
    assert_eq!(
      rendered[2].status_label(),
      "Incomplete"
    );
  }

  #[test]
  fn priority_colours_cover_known_and_unknown()
  {
    assert_eq!(
      PriorityTone::of(Some("High")),
      PriorityTone::Red
    );
    assert_eq!(
      PriorityTone::of(Some("Medium")),
      PriorityTone::Yellow
    );
    assert_eq!(
      PriorityTone::of(Some("Low")),
      PriorityTone::Green
    );
    for other in
      [Some("Urgent"), Some("high"), Some(""), None]
    {
      assert_eq!(
        PriorityTone::of(other)
          .css_class(),
        "text-gray"
      );
    }
  }

  #[test]
  fn missing_priority_reads_medium_but_stays_neutral()
  {
    let row = TaskRow::build(
      &task("a", Some("t"), None),
      0,
      Local::now()
    );
    assert_eq!(
      row.priority_label,
      "Medium Priority"
    );
    assert_eq!(
      row.tone,
      PriorityTone::Neutral
    );
  }

  #[test]
  fn invalid_created_at_falls_back_to_now() {
    let now = Local
      .with_ymd_and_hms(
        2025, 3, 4, 15, 7, 0
      )
      .single()
      .expect("valid now");
    assert_eq!(
      format_created(
        Some("not a date"),
        now
      ),
      "Mar 4, 2025, 03:07 PM"
    );
    assert_eq!(
      format_created(None, now),
      "Mar 4, 2025, 03:07 PM"
    );
  }

  #[test]
  fn heading_only_for_non_empty_lists() {
    assert_eq!(list_heading(0), None);
    assert_eq!(
      list_heading(2).as_deref(),
      Some("Your tasks (2)")
    );
  }
}
