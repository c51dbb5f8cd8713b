use taskdeck_shared::{
  FetchError,
  FetchHook,
  FetchObserver,
  FetchOptions,
  FieldErrors,
  Session,
  TaskEnvelope,
  TaskForm,
  TaskListEnvelope,
  TaskListView,
  Transport
};
use tracing::{
  debug,
  info,
  warn
};

/// Result of submitting the task form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
  /// Validation failed; nothing was
  /// sent.
  Invalid(FieldErrors),
  /// The backend accepted the task and
  /// the list was reloaded.
  Saved
}

/// Drives the list and form state
/// machines against a transport,
/// sequencing every mutation before its
/// refetch.
pub struct TaskBoard<T, O> {
  hook:    FetchHook<T, O>,
  session: Session,
  list:    TaskListView
}

impl<T, O> TaskBoard<T, O>
where
  T: Transport,
  O: FetchObserver
{
  pub fn new(
    hook: FetchHook<T, O>,
    session: Session
  ) -> Self {
    Self {
      hook,
      session,
      list: TaskListView::new()
    }
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  pub fn list(&self) -> &TaskListView {
    &self.list
  }

  pub fn hook(&self) -> &FetchHook<T, O> {
    &self.hook
  }

  /// Reloads the list. Does nothing
  /// without an active session.
  #[tracing::instrument(skip(self))]
  pub async fn refresh(
    &mut self
  ) -> Result<(), FetchError> {
    let Some(request) = self
      .list
      .begin_refresh(&self.session)
    else {
      return Ok(());
    };

    let result = self
      .hook
      .fetch_json::<TaskListEnvelope>(
        &request,
        FetchOptions::quiet()
      )
      .await
      .map(|envelope| envelope.tasks);
    let outcome = result
      .as_ref()
      .map(|_| ())
      .map_err(|err| err.clone());
    self.list.finish_refresh(result);
    outcome
  }

  /// Deletes a task, then reloads the
  /// list whatever the delete's
  /// outcome.
  #[tracing::instrument(skip(self))]
  pub async fn delete(
    &mut self,
    id: &str
  ) -> Result<(), FetchError> {
    let request = self
      .list
      .delete_request(&self.session, id);
    let result = self
      .hook
      .fetch(
        &request,
        FetchOptions::default()
      )
      .await
      .map(|_| ());
    info!(id, ok = result.is_ok(), "delete finished");

    self.refresh_after_mutation().await;
    result
  }

  /// Optimistically flips the status,
  /// sends the update, then reloads.
  /// Returns `Ok(false)` for an id not
  /// in the current list.
  #[tracing::instrument(skip(self))]
  pub async fn toggle(
    &mut self,
    id: &str
  ) -> Result<bool, FetchError> {
    let Some(request) = self
      .list
      .toggle_status(&self.session, id)
    else {
      warn!(id, "toggle requested for unknown task");
      return Ok(false);
    };

    let result = self
      .hook
      .fetch(&request, FetchOptions::quiet())
      .await
      .map(|_| true);

    self.refresh_after_mutation().await;
    result
  }

  /// Builds the form for `task_id` and,
  /// in update mode, seeds it from the
  /// backend.
  #[tracing::instrument(skip(self))]
  pub async fn open_form(
    &self,
    task_id: Option<&str>
  ) -> Result<TaskForm, FetchError> {
    let mut form = TaskForm::new(task_id);
    if let Some(request) =
      form.load_request(&self.session)
    {
      let envelope = self
        .hook
        .fetch_json::<TaskEnvelope>(
          &request,
          FetchOptions::quiet()
        )
        .await?;
      form.seed(envelope.task);
    }
    Ok(form)
  }

  /// Validates and sends the form. On
  /// success the list is reloaded, the
  /// terminal equivalent of navigating
  /// back to it.
  #[tracing::instrument(skip_all)]
  pub async fn submit_form(
    &mut self,
    form: &mut TaskForm
  ) -> Result<SubmitOutcome, FetchError> {
    let request =
      match form.submit(&self.session) {
        | Ok(request) => request,
        | Err(errors) => {
          return Ok(
            SubmitOutcome::Invalid(errors)
          );
        }
      };

    self
      .hook
      .fetch(
        &request,
        FetchOptions::default()
      )
      .await?;
    self.refresh_after_mutation().await;
    Ok(SubmitOutcome::Saved)
  }

  async fn refresh_after_mutation(
    &mut self
  ) {
    if let Err(err) = self.refresh().await
    {
      debug!(
        error = %err,
        "refetch after mutation failed"
      );
    }
  }
}
