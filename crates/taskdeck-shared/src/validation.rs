use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::form::TaskDraft;
use crate::model::{
  TaskPriority,
  TaskStatus
};

pub const REQUIRED_MESSAGE: &str =
  "This field is required";
pub const TITLE_MAX_CHARS: usize = 100;

/// Editable task fields, ordered the
/// way the form lays them out.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub enum TaskField {
  Title,
  Description,
  Status,
  Priority
}

impl TaskField {
  pub const ALL: [TaskField; 4] = [
    TaskField::Title,
    TaskField::Description,
    TaskField::Status,
    TaskField::Priority
  ];

  pub fn name(self) -> &'static str {
    match self {
      | TaskField::Title => "title",
      | TaskField::Description => {
        "description"
      }
      | TaskField::Status => "status",
      | TaskField::Priority => "priority"
    }
  }
}

impl fmt::Display for TaskField {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for TaskField {
  type Err = String;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    TaskField::ALL
      .into_iter()
      .find(|field| field.name() == s)
      .ok_or_else(|| {
        format!("unknown field: {s}")
      })
  }
}

pub type FieldErrors =
  BTreeMap<TaskField, String>;

/// Checks every field of the draft and
/// reports all failures at once.
pub fn validate_task(
  draft: &TaskDraft
) -> FieldErrors {
  let mut errors = FieldErrors::new();

  if draft
    .title
    .chars()
    .count()
    > TITLE_MAX_CHARS
  {
    errors.insert(
      TaskField::Title,
      format!(
        "Title must be at most \
         {TITLE_MAX_CHARS} characters"
      )
    );
  }

  if draft.description.trim().is_empty()
  {
    errors.insert(
      TaskField::Description,
      REQUIRED_MESSAGE.to_string()
    );
  }

  if draft
    .status
    .parse::<TaskStatus>()
    .is_err()
  {
    errors.insert(
      TaskField::Status,
      "Status must be incomplete or \
       complete"
        .to_string()
    );
  }

  if draft
    .priority
    .parse::<TaskPriority>()
    .is_err()
  {
    errors.insert(
      TaskField::Priority,
      "Priority must be Low, Medium or \
       High"
        .to_string()
    );
  }

  errors
}

#[cfg(test)]
mod tests {
  use super::{
    REQUIRED_MESSAGE,
    TaskField,
    validate_task
  };
  use crate::form::TaskDraft;

  #[test]
  fn default_draft_only_misses_description()
  {
    let errors =
      validate_task(&TaskDraft::default());
    assert_eq!(errors.len(), 1);
    assert_eq!(
      errors
        .get(&TaskField::Description)
        .map(String::as_str),
      Some(REQUIRED_MESSAGE)
    );
  }

  #[test]
  fn reports_every_failing_field() {
    let draft = TaskDraft {
      title:       "x".repeat(101),
      description: "   ".to_string(),
      status:      "done".to_string(),
      priority:    "Urgent".to_string()
    };
    let errors = validate_task(&draft);
    assert_eq!(
      errors.keys().copied().collect::<Vec<_>>(),
      TaskField::ALL.to_vec()
    );
  }

  #[test]
  fn field_names_round_trip() {
    for field in TaskField::ALL {
      assert_eq!(
        field.name().parse::<TaskField>(),
        Ok(field)
      );
    }
    assert!(
      "owner".parse::<TaskField>().is_err()
    );
  }
}
