//! Client core for the task board:
//! wire types, the fetch hook, and the
//! list and form state machines shared
//! by the browser UI and the CLI.

pub mod display;
pub mod fetch;
pub mod form;
pub mod list;
pub mod model;
pub mod session;
pub mod validation;

pub use fetch::{
  ApiRequest,
  ApiResponse,
  FetchError,
  FetchHook,
  FetchObserver,
  FetchOptions,
  Method,
  Toast,
  ToastKind,
  Transport
};
pub use form::{
  FormMode,
  TaskDraft,
  TaskForm
};
pub use list::{
  ListState,
  TaskListView
};
pub use model::{
  Task,
  TaskEnvelope,
  TaskListEnvelope,
  TaskPayload,
  TaskPriority,
  TaskStatus
};
pub use session::Session;
pub use validation::{
  FieldErrors,
  TaskField
};
