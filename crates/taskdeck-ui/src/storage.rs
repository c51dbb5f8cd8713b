use taskdeck_shared::Session;

const SESSION_STORAGE_KEY: &str =
  "taskdeck.session";

fn local_storage()
-> Option<web_sys::Storage> {
  web_sys::window().and_then(|window| {
    window.local_storage().ok().flatten()
  })
}

pub fn load_session() -> Session {
  let stored = local_storage().and_then(
    |storage| {
      storage
        .get_item(SESSION_STORAGE_KEY)
        .ok()
        .flatten()
    }
  );

  match stored
    .as_deref()
    .map(serde_json::from_str::<Session>)
  {
    | Some(Ok(session)) => session,
    | Some(Err(err)) => {
      tracing::warn!(
        error = %err,
        "discarding unreadable stored \
         session"
      );
      Session::anonymous()
    }
    | None => Session::anonymous()
  }
}

pub fn save_session(session: &Session) {
  let Some(storage) = local_storage()
  else {
    return;
  };

  let result = if session.is_active() {
    match serde_json::to_string(session) {
      | Ok(raw) => storage.set_item(
        SESSION_STORAGE_KEY,
        &raw
      ),
      | Err(err) => {
        tracing::error!(
          error = %err,
          "failed to encode session"
        );
        return;
      }
    }
  } else {
    storage
      .remove_item(SESSION_STORAGE_KEY)
  };

  if result.is_err() {
    tracing::warn!(
      "failed to persist session"
    );
  }
}
