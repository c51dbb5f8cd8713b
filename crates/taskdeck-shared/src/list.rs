use chrono::{
  DateTime,
  Local
};
use tracing::{
  debug,
  warn
};

use crate::display::{
  TaskRow,
  rows
};
use crate::fetch::{
  ApiRequest,
  FetchError
};
use crate::model::Task;
use crate::session::Session;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ListState {
  Uninitialized,
  Loading,
  Ready
}

/// Client-side projection of the
/// user's tasks.
///
/// Methods return the request to issue;
/// the caller sends it and reports back
/// through [`finish_refresh`]. A
/// mutation's refetch is started only
/// once the mutation's own response is
/// in.
///
/// [`finish_refresh`]: TaskListView::finish_refresh
#[derive(Debug, Clone, PartialEq)]
pub struct TaskListView {
  state: ListState,
  tasks: Vec<Task>
}

impl Default for TaskListView {
  fn default() -> Self {
    Self::new()
  }
}

impl TaskListView {
  pub fn new() -> Self {
    Self {
      state: ListState::Uninitialized,
      tasks: Vec::new()
    }
  }

  pub fn state(&self) -> ListState {
    self.state
  }

  pub fn is_loading(&self) -> bool {
    self.state == ListState::Loading
  }

  pub fn tasks(&self) -> &[Task] {
    &self.tasks
  }

  pub fn find(
    &self,
    id: &str
  ) -> Option<&Task> {
    self.tasks.iter().find(|t| t.id == id)
  }

  pub fn rows(
    &self,
    now: DateTime<Local>
  ) -> Vec<TaskRow> {
    rows(&self.tasks, now)
  }

  /// Starts a list fetch. Without an
  /// active session nothing is
  /// requested and the state is left
  /// alone.
  pub fn begin_refresh(
    &mut self,
    session: &Session
  ) -> Option<ApiRequest> {
    if !session.is_active() {
      debug!(
        "no active session; skipping \
         task list fetch"
      );
      return None;
    }
    self.state = ListState::Loading;
    Some(ApiRequest::list_tasks(session))
  }

  /// Applies a list fetch outcome. A
  /// failed fetch keeps the previous
  /// (possibly stale) tasks.
  pub fn finish_refresh(
    &mut self,
    result: Result<Vec<Task>, FetchError>
  ) {
    match result {
      | Ok(tasks) => {
        debug!(
          total = tasks.len(),
          "task list refreshed"
        );
        self.tasks = tasks;
      }
      | Err(err) => {
        warn!(
          error = %err,
          "task list refresh failed; \
           keeping previous tasks"
        );
      }
    }
    self.state = ListState::Ready;
  }

  pub fn delete_request(
    &self,
    session: &Session,
    id: &str
  ) -> ApiRequest {
    ApiRequest::delete_task(session, id)
  }

  /// Flips the task's status locally
  /// right away and returns the update
  /// carrying the full task with the
  /// flipped status. Unknown ids yield
  /// nothing. A failed update is not
  /// rolled back here; the follow-up
  /// refetch reconciles.
  pub fn toggle_status(
    &mut self,
    session: &Session,
    id: &str
  ) -> Option<ApiRequest> {
    let task = self
      .tasks
      .iter_mut()
      .find(|t| t.id == id)?;
    let next = task.status.toggled();
    task.status = next;
    debug!(
      id,
      status = %next,
      "applied optimistic status toggle"
    );
    Some(ApiRequest::update_task(
      session,
      id,
      task.payload_with_status(next)
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::{
    ListState,
    TaskListView
  };
  use crate::fetch::{
    FetchError,
    Method
  };
  use crate::model::{
    Task,
    TaskStatus
  };
  use crate::session::Session;

  fn sample() -> Vec<Task> {
    vec![
      Task {
        id:          "a".to_string(),
        title:       Some("one".to_string()),
        description: Some("first".to_string()),
        status:      TaskStatus::Complete,
        priority:    Some("High".to_string()),
        created_at:  None
      },
      Task {
        id:          "c".to_string(),
        title:       Some(String::new()),
        description: Some("third".to_string()),
        status:      TaskStatus::Incomplete,
        priority:    Some("Low".to_string()),
        created_at:  None
      },
    ]
  }

  fn ready_view() -> TaskListView {
    let mut view = TaskListView::new();
    view
      .begin_refresh(&Session::new("tok"))
      .expect("active session");
    view.finish_refresh(Ok(sample()));
    view
  }

  #[test]
  fn no_fetch_before_login() {
    let mut view = TaskListView::new();
    assert!(
      view
        .begin_refresh(&Session::anonymous())
        .is_none()
    );
    assert_eq!(
      view.state(),
      ListState::Uninitialized
    );
  }

  #[test]
  fn refresh_cycles_through_loading() {
    let mut view = TaskListView::new();
    let request = view
      .begin_refresh(&Session::new("tok"))
      .expect("active session");
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.path, "/tasks");
    assert_eq!(request.authorization, "tok");
    assert!(view.is_loading());

    view.finish_refresh(Ok(sample()));
    assert_eq!(view.state(), ListState::Ready);
    assert_eq!(view.tasks().len(), 2);
  }

  #[test]
  fn failed_refresh_keeps_stale_tasks() {
    let mut view = ready_view();
    view.begin_refresh(&Session::new("tok"));
    view.finish_refresh(Err(
      FetchError::Network("offline".to_string())
    ));
    assert_eq!(view.state(), ListState::Ready);
    assert_eq!(view.tasks().len(), 2);
  }

  #[test]
  fn toggle_is_visible_before_any_response() {
    let mut view = ready_view();
    let request = view
      .toggle_status(&Session::new("tok"), "c")
      .expect("known id");

    assert_eq!(
      view.find("c").map(|t| t.status),
      Some(TaskStatus::Complete)
    );
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.path, "/tasks/c");
    let body = serde_json::to_value(
      request.body.expect("body")
    )
    .expect("encode");
    assert_eq!(
      body,
      serde_json::json!({
        "title": "",
        "description": "third",
        "status": "complete",
        "priority": "Low"
      })
    );
  }

  #[test]
  fn toggle_of_unknown_id_changes_nothing() {
    let mut view = ready_view();
    let before = view.clone();
    assert!(
      view
        .toggle_status(&Session::new("tok"), "zzz")
        .is_none()
    );
    assert_eq!(view, before);
  }

  #[test]
  fn delete_targets_the_task_path() {
    let view = ready_view();
    let request = view
      .delete_request(&Session::new("tok"), "a");
    assert_eq!(request.method, Method::Delete);
    assert_eq!(request.path, "/tasks/a");
    assert!(request.body.is_none());
  }
}
