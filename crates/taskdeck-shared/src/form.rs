use tracing::debug;

use crate::fetch::ApiRequest;
use crate::model::{
  Task,
  TaskPayload,
  TaskPriority,
  TaskStatus
};
use crate::session::Session;
use crate::validation::{
  FieldErrors,
  TaskField,
  validate_task
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
  Add,
  Update(String)
}

impl FormMode {
  /// `None` (no identifier in the
  /// route) means a new task.
  pub fn from_route(
    task_id: Option<&str>
  ) -> Self {
    match task_id {
      | Some(id) => {
        FormMode::Update(id.to_string())
      }
      | None => FormMode::Add
    }
  }
}

/// Unvalidated form values. Status and
/// priority stay raw strings until
/// submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
  pub title:       String,
  pub description: String,
  pub status:      String,
  pub priority:    String
}

impl Default for TaskDraft {
  fn default() -> Self {
    Self {
      title:       String::new(),
      description: String::new(),
      status:      TaskStatus::default()
        .as_str()
        .to_string(),
      priority:    TaskPriority::default()
        .as_str()
        .to_string()
    }
  }
}

impl TaskDraft {
  /// Seeds from a fetched task; empty
  /// or missing values become the
  /// defaults.
  pub fn from_task(task: &Task) -> Self {
    let defaults = Self::default();
    let or_default =
      |value: &Option<String>,
       fallback: String| {
        value
          .clone()
          .filter(|v| !v.is_empty())
          .unwrap_or(fallback)
      };

    Self {
      title:       or_default(
        &task.title,
        defaults.title
      ),
      description: or_default(
        &task.description,
        defaults.description
      ),
      status:      task
        .status
        .as_str()
        .to_string(),
      priority:    or_default(
        &task.priority,
        defaults.priority
      )
    }
  }

  pub fn get(
    &self,
    field: TaskField
  ) -> &str {
    match field {
      | TaskField::Title => &self.title,
      | TaskField::Description => {
        &self.description
      }
      | TaskField::Status => &self.status,
      | TaskField::Priority => {
        &self.priority
      }
    }
  }

  pub fn set(
    &mut self,
    field: TaskField,
    value: String
  ) {
    match field {
      | TaskField::Title => {
        self.title = value
      }
      | TaskField::Description => {
        self.description = value
      }
      | TaskField::Status => {
        self.status = value
      }
      | TaskField::Priority => {
        self.priority = value
      }
    }
  }

  /// Full request body. Only meaningful
  /// after validation passed.
  fn to_payload(&self) -> TaskPayload {
    TaskPayload {
      title:       Some(self.title.clone()),
      description: Some(
        self.description.clone()
      ),
      status:      self
        .status
        .parse()
        .unwrap_or_default(),
      priority:    Some(
        self.priority.clone()
      )
    }
  }
}

/// State of the add/edit screen.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
  mode:     FormMode,
  draft:    TaskDraft,
  snapshot: Option<Task>,
  errors:   FieldErrors
}

impl TaskForm {
  pub fn new(
    task_id: Option<&str>
  ) -> Self {
    Self {
      mode:     FormMode::from_route(
        task_id
      ),
      draft:    TaskDraft::default(),
      snapshot: None,
      errors:   FieldErrors::new()
    }
  }

  pub fn mode(&self) -> &FormMode {
    &self.mode
  }

  pub fn is_update(&self) -> bool {
    matches!(
      self.mode,
      FormMode::Update(_)
    )
  }

  pub fn draft(&self) -> &TaskDraft {
    &self.draft
  }

  pub fn snapshot(
    &self
  ) -> Option<&Task> {
    self.snapshot.as_ref()
  }

  pub fn errors(&self) -> &FieldErrors {
    &self.errors
  }

  pub fn error(
    &self,
    field: TaskField
  ) -> Option<&str> {
    self
      .errors
      .get(&field)
      .map(String::as_str)
  }

  pub fn page_title(
    &self
  ) -> &'static str {
    if self.is_update() {
      "Update Task"
    } else {
      "Add task"
    }
  }

  pub fn heading(&self) -> &'static str {
    if self.is_update() {
      "Edit Task"
    } else {
      "Add New Task"
    }
  }

  pub fn submit_label(
    &self
  ) -> &'static str {
    self.page_title()
  }

  /// Request that loads the task being
  /// edited. Nothing to load in add
  /// mode or without a session.
  pub fn load_request(
    &self,
    session: &Session
  ) -> Option<ApiRequest> {
    match &self.mode {
      | FormMode::Update(id)
        if session.is_active() =>
      {
        Some(ApiRequest::get_task(
          session, id
        ))
      }
      | _ => None
    }
  }

  /// Stores the fetched task as the
  /// reset snapshot and seeds the draft
  /// from it.
  pub fn seed(&mut self, task: Task) {
    debug!(id = %task.id, "seeding task form");
    self.draft = TaskDraft::from_task(&task);
    self.snapshot = Some(task);
  }

  pub fn set_field(
    &mut self,
    field: TaskField,
    value: impl Into<String>
  ) {
    self.draft.set(field, value.into());
  }

  /// Drops local edits and restores the
  /// last fetched snapshot. Returns
  /// `false` when there is nothing to
  /// restore from.
  pub fn reset(&mut self) -> bool {
    if !self.is_update() {
      return false;
    }
    match &self.snapshot {
      | Some(task) => {
        self.draft =
          TaskDraft::from_task(task);
        true
      }
      | None => false
    }
  }

  /// Validates the whole draft. On
  /// success yields the create or update
  /// request; on failure records every
  /// field error and yields nothing.
  pub fn submit(
    &mut self,
    session: &Session
  ) -> Result<ApiRequest, FieldErrors> {
    self.errors.clear();

    let errors = validate_task(&self.draft);
    if !errors.is_empty() {
      debug!(
        count = errors.len(),
        "task form failed validation"
      );
      self.errors = errors.clone();
      return Err(errors);
    }

    let payload = self.draft.to_payload();
    Ok(match &self.mode {
      | FormMode::Add => {
        ApiRequest::create_task(
          session, payload
        )
      }
      | FormMode::Update(id) => {
        ApiRequest::update_task(
          session, id, payload
        )
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::{
    FormMode,
    TaskDraft,
    TaskForm
  };
  use crate::fetch::Method;
  use crate::model::{
    Task,
    TaskStatus
  };
  use crate::session::Session;
  use crate::validation::{
    REQUIRED_MESSAGE,
    TaskField
  };

  fn fetched() -> Task {
    Task {
      id:          "t1".to_string(),
      title:       Some(
        "Ship release".to_string()
      ),
      description: Some(
        "tag and publish".to_string()
      ),
      status:      TaskStatus::Complete,
      priority:    Some("High".to_string()),
      created_at:  None
    }
  }

  #[test]
  fn mode_follows_route_parameter() {
    assert_eq!(
      TaskForm::new(None).mode(),
      &FormMode::Add
    );
    let form = TaskForm::new(Some("t1"));
    assert_eq!(
      form.mode(),
      &FormMode::Update("t1".to_string())
    );
    assert_eq!(form.heading(), "Edit Task");
    assert_eq!(
      form.submit_label(),
      "Update Task"
    );
  }

  #[test]
  fn add_mode_starts_from_defaults_and_loads_nothing()
  {
    let form = TaskForm::new(None);
    assert_eq!(
      form.draft(),
      &TaskDraft::default()
    );
    assert_eq!(form.draft().status, "incomplete");
    assert_eq!(form.draft().priority, "Medium");
    assert!(
      form
        .load_request(&Session::new("tok"))
        .is_none()
    );
  }

  #[test]
  fn update_mode_loads_by_id() {
    let form = TaskForm::new(Some("t1"));
    let request = form
      .load_request(&Session::new("tok"))
      .expect("load request");
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.path, "/tasks/t1");
    assert_eq!(request.authorization, "tok");
    assert!(
      form
        .load_request(&Session::anonymous())
        .is_none()
    );
  }

  #[test]
  fn seed_substitutes_defaults_for_empty_fields()
  {
    let mut form = TaskForm::new(Some("t1"));
    form.seed(Task {
      title: Some(String::new()),
      priority: None,
      status: TaskStatus::Incomplete,
      ..fetched()
    });
    assert_eq!(form.draft().title, "");
    assert_eq!(form.draft().priority, "Medium");
    assert_eq!(
      form.draft().description,
      "tag and publish"
    );
  }

  #[test]
  fn set_field_touches_only_that_field() {
    let mut form = TaskForm::new(Some("t1"));
    form.seed(fetched());
    form.set_field(TaskField::Title, "Renamed");
    assert_eq!(form.draft().title, "Renamed");
    assert_eq!(form.draft().priority, "High");
    assert_eq!(form.draft().status, "complete");
    assert!(form.errors().is_empty());
  }

  #[test]
  fn reset_restores_last_fetched_snapshot() {
    let mut form = TaskForm::new(Some("t1"));
    form.seed(fetched());
    form.set_field(TaskField::Title, "local edit");
    form.set_field(TaskField::Priority, "Low");

    assert!(form.reset());
    assert_eq!(
      form.draft(),
      &TaskDraft::from_task(&fetched())
    );
  }

  #[test]
  fn reset_is_a_no_op_in_add_mode() {
    let mut form = TaskForm::new(None);
    form.set_field(TaskField::Title, "draft");
    assert!(!form.reset());
    assert_eq!(form.draft().title, "draft");
  }

  #[test]
  fn invalid_submit_yields_no_request() {
    let mut form = TaskForm::new(None);
    form.set_field(TaskField::Status, "done");

    let errors = form
      .submit(&Session::new("tok"))
      .expect_err("must fail validation");
    assert_eq!(errors.len(), 2);
    assert_eq!(
      form.error(TaskField::Description),
      Some(REQUIRED_MESSAGE)
    );
    assert!(form.error(TaskField::Status).is_some());
  }

  #[test]
  fn errors_are_cleared_on_each_submit() {
    let mut form = TaskForm::new(None);
    assert!(form.submit(&Session::new("tok")).is_err());
    assert!(!form.errors().is_empty());

    form.set_field(
      TaskField::Description,
      "write tests"
    );
    let request = form
      .submit(&Session::new("tok"))
      .expect("valid draft");
    assert!(form.errors().is_empty());
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "/tasks");
  }

  #[test]
  fn update_submit_carries_full_draft() {
    let mut form = TaskForm::new(Some("t1"));
    form.seed(fetched());
    form.set_field(TaskField::Status, "incomplete");

    let request = form
      .submit(&Session::new("tok"))
      .expect("valid draft");
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.path, "/tasks/t1");
    let body = serde_json::to_value(
      request.body.expect("body")
    )
    .expect("encode");
    assert_eq!(
      body,
      serde_json::json!({
        "title": "Ship release",
        "description": "tag and publish",
        "status": "incomplete",
        "priority": "High"
      })
    );
  }
}
