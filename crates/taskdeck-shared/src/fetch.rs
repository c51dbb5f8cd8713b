use std::cell::Cell;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{
  debug,
  warn
};

use crate::model::TaskPayload;
use crate::session::Session;

pub const GENERIC_ERROR_MESSAGE: &str =
  "Something went wrong. Please try \
   again.";
pub const GENERIC_SUCCESS_MESSAGE: &str =
  "Done";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Method {
  Get,
  Post,
  Put,
  Delete
}

impl Method {
  pub fn as_str(self) -> &'static str {
    match self {
      | Method::Get => "GET",
      | Method::Post => "POST",
      | Method::Put => "PUT",
      | Method::Delete => "DELETE"
    }
  }
}

impl fmt::Display for Method {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One backend call: method, path
/// relative to the API base, the
/// `Authorization` value and an
/// optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
  pub method:        Method,
  pub path:          String,
  pub authorization: String,
  pub body:          Option<TaskPayload>
}

impl ApiRequest {
  fn new(
    method: Method,
    path: String,
    session: &Session
  ) -> Self {
    Self {
      method,
      path,
      authorization: session
        .token
        .clone(),
      body: None
    }
  }

  pub fn list_tasks(
    session: &Session
  ) -> Self {
    Self::new(
      Method::Get,
      "/tasks".to_string(),
      session
    )
  }

  pub fn get_task(
    session: &Session,
    id: &str
  ) -> Self {
    Self::new(
      Method::Get,
      task_path(id),
      session
    )
  }

  pub fn create_task(
    session: &Session,
    payload: TaskPayload
  ) -> Self {
    Self {
      body: Some(payload),
      ..Self::new(
        Method::Post,
        "/tasks".to_string(),
        session
      )
    }
  }

  pub fn update_task(
    session: &Session,
    id: &str,
    payload: TaskPayload
  ) -> Self {
    Self {
      body: Some(payload),
      ..Self::new(
        Method::Put,
        task_path(id),
        session
      )
    }
  }

  pub fn delete_task(
    session: &Session,
    id: &str
  ) -> Self {
    Self::new(
      Method::Delete,
      task_path(id),
      session
    )
  }

  pub fn json_body(
    &self
  ) -> Result<Option<String>, FetchError>
  {
    self
      .body
      .as_ref()
      .map(serde_json::to_string)
      .transpose()
      .map_err(|e| {
        FetchError::Decode(format!(
          "failed to encode body: {e}"
        ))
      })
  }
}

fn task_path(id: &str) -> String {
  format!("/tasks/{id}")
}

/// What a transport hands back: the
/// HTTP status and the raw body text.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
  pub status: u16,
  pub body:   String
}

impl ApiResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct FetchOptions {
  pub show_success_toast: bool
}

impl Default for FetchOptions {
  fn default() -> Self {
    Self {
      show_success_toast: true
    }
  }
}

impl FetchOptions {
  pub fn quiet() -> Self {
    Self {
      show_success_toast: false
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
  /// The request never produced a
  /// response.
  Network(String),
  /// The backend answered with a
  /// non-success status.
  Status {
    status:  u16,
    message: Option<String>
  },
  Decode(String)
}

impl FetchError {
  /// Text for the error toast.
  pub fn user_message(&self) -> String {
    match self {
      | FetchError::Status {
        message: Some(message),
        ..
      } => message.clone(),
      | _ => {
        GENERIC_ERROR_MESSAGE
          .to_string()
      }
    }
  }
}

impl fmt::Display for FetchError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    match self {
      | FetchError::Network(err) => {
        write!(
          f,
          "network error: {err}"
        )
      }
      | FetchError::Status {
        status,
        message
      } => {
        write!(f, "HTTP {status}")?;
        if let Some(message) = message {
          write!(f, ": {message}")?;
        }
        Ok(())
      }
      | FetchError::Decode(err) => {
        write!(
          f,
          "decode error: {err}"
        )
      }
    }
  }
}

impl std::error::Error for FetchError {}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ToastKind {
  Success,
  Error
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct Toast {
  pub kind:    ToastKind,
  pub message: String
}

impl Toast {
  pub fn success(
    message: impl Into<String>
  ) -> Self {
    Self {
      kind:    ToastKind::Success,
      message: message.into()
    }
  }

  pub fn error(
    message: impl Into<String>
  ) -> Self {
    Self {
      kind:    ToastKind::Error,
      message: message.into()
    }
  }
}

/// Sends one request. The browser,
/// the CLI and tests each bring their
/// own.
#[allow(async_fn_in_trait)]
pub trait Transport {
  async fn send(
    &self,
    request: &ApiRequest
  ) -> Result<ApiResponse, FetchError>;
}

/// Receives loading changes and toasts
/// from a [`FetchHook`].
pub trait FetchObserver {
  fn loading_changed(
    &self,
    _loading: bool
  ) {
  }

  fn toast(&self, toast: Toast);
}

/// Request helper with a single loading
/// flag and toast reporting.
///
/// Failures are reported twice: as an
/// error toast and as the returned
/// `Err`, so callers pick their own
/// recovery.
pub struct FetchHook<T, O> {
  transport: T,
  observer:  O,
  loading:   Cell<bool>
}

impl<T, O> FetchHook<T, O>
where
  T: Transport,
  O: FetchObserver
{
  pub fn new(
    transport: T,
    observer: O
  ) -> Self {
    Self {
      transport,
      observer,
      loading: Cell::new(false)
    }
  }

  pub fn is_loading(&self) -> bool {
    self.loading.get()
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  pub fn observer(&self) -> &O {
    &self.observer
  }

  fn set_loading(&self, loading: bool) {
    self.loading.set(loading);
    self
      .observer
      .loading_changed(loading);
  }

  fn toast_success(&self, payload: &Value) {
    let message = payload_message(payload)
      .unwrap_or_else(|| {
        GENERIC_SUCCESS_MESSAGE.to_string()
      });
    self
      .observer
      .toast(Toast::success(message));
  }

  fn toast_failure(&self, err: &FetchError) {
    self.observer.toast(Toast::error(
      err.user_message()
    ));
  }

  #[tracing::instrument(
    skip(self, request),
    fields(
      method = %request.method,
      path = %request.path
    )
  )]
  async fn exchange(
    &self,
    request: &ApiRequest
  ) -> Result<Value, FetchError> {
    self.set_loading(true);
    let result = self
      .transport
      .send(request)
      .await
      .and_then(interpret_response);
    self.set_loading(false);

    match &result {
      | Ok(_) => debug!("request succeeded"),
      | Err(err) => {
        warn!(error = %err, "request failed");
        self.toast_failure(err);
      }
    }
    result
  }

  pub async fn fetch(
    &self,
    request: &ApiRequest,
    options: FetchOptions
  ) -> Result<Value, FetchError> {
    let payload =
      self.exchange(request).await?;
    if options.show_success_toast {
      self.toast_success(&payload);
    }
    Ok(payload)
  }

  /// [`fetch`](Self::fetch) and decode
  /// the payload into `R`. The success
  /// toast waits for the decode.
  pub async fn fetch_json<R>(
    &self,
    request: &ApiRequest,
    options: FetchOptions
  ) -> Result<R, FetchError>
  where
    R: DeserializeOwned
  {
    let payload =
      self.exchange(request).await?;
    let success_payload = options
      .show_success_toast
      .then(|| payload.clone());
    let decoded = decode_payload(payload)
      .inspect_err(|err| {
        warn!(error = %err, "response did not decode");
        self.toast_failure(err);
      })?;
    if let Some(payload) = success_payload {
      self.toast_success(&payload);
    }
    Ok(decoded)
  }
}

pub fn decode_payload<R>(
  payload: Value
) -> Result<R, FetchError>
where
  R: DeserializeOwned
{
  serde_json::from_value(payload)
    .map_err(|e| {
      FetchError::Decode(e.to_string())
    })
}

/// Turns a raw response into either
/// the parsed JSON payload or a typed
/// failure carrying the backend's
/// message.
pub fn interpret_response(
  response: ApiResponse
) -> Result<Value, FetchError> {
  let payload = if response
    .body
    .trim()
    .is_empty()
  {
    Value::Null
  } else {
    match serde_json::from_str::<Value>(
      &response.body
    ) {
      | Ok(value) => value,
      | Err(err) => {
        if response.is_success() {
          return Err(
            FetchError::Decode(
              err.to_string()
            )
          );
        }
        Value::Null
      }
    }
  };

  if response.is_success() {
    Ok(payload)
  } else {
    Err(FetchError::Status {
      status:  response.status,
      message: payload_message(
        &payload
      )
    })
  }
}

fn payload_message(
  payload: &Value
) -> Option<String> {
  ["msg", "message"]
    .iter()
    .find_map(|key| {
      payload.get(key)?.as_str()
    })
    .filter(|m| !m.trim().is_empty())
    .map(str::to_string)
}
