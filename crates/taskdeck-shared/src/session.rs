use serde::{
  Deserialize,
  Serialize
};

/// Authentication state handed to every
/// operation that talks to the backend.
#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Session {
  #[serde(default)]
  pub token:     String,
  #[serde(default)]
  pub logged_in: bool
}

impl Session {
  pub fn new(
    token: impl Into<String>
  ) -> Self {
    let token = token.into();
    let logged_in =
      !token.trim().is_empty();
    Self { token, logged_in }
  }

  pub fn anonymous() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.logged_in
      && !self.token.trim().is_empty()
  }
}
