use std::rc::Rc;

use gloo::net::http::Request;
use taskdeck_shared::{
  ApiRequest,
  ApiResponse,
  FetchError,
  FetchHook,
  FetchObserver,
  Method,
  Toast,
  Transport
};
use yew::{
  Callback,
  hook,
  use_context,
  use_state_eq
};

const DEFAULT_API_BASE: &str = "/api";

pub fn api_base() -> &'static str {
  option_env!("TASKDECK_API_URL")
    .unwrap_or(DEFAULT_API_BASE)
    .trim_end_matches('/')
}

/// Browser `fetch` transport.
#[derive(Clone, Debug, PartialEq)]
pub struct GlooTransport {
  base_url: String
}

impl Default for GlooTransport {
  fn default() -> Self {
    Self {
      base_url: api_base().to_string()
    }
  }
}

impl Transport for GlooTransport {
  async fn send(
    &self,
    request: &ApiRequest
  ) -> Result<ApiResponse, FetchError> {
    let url = format!(
      "{}{}",
      self.base_url, request.path
    );
    let builder = match request.method {
      | Method::Get => Request::get(&url),
      | Method::Post => {
        Request::post(&url)
      }
      | Method::Put => Request::put(&url),
      | Method::Delete => {
        Request::delete(&url)
      }
    }
    .header(
      "Authorization",
      &request.authorization
    );

    let sent = match request.json_body()? {
      | Some(body) => {
        builder
          .header(
            "Content-Type",
            "application/json"
          )
          .body(body)
          .map_err(|e| {
            FetchError::Network(
              e.to_string()
            )
          })?
          .send()
          .await
      }
      | None => builder.send().await
    };

    let response = sent.map_err(|e| {
      tracing::error!(
        url = %url,
        error = %e,
        "task API request failed"
      );
      FetchError::Network(e.to_string())
    })?;
    let status = response.status();
    let body =
      response.text().await.map_err(
        |e| {
          FetchError::Network(
            e.to_string()
          )
        }
      )?;

    Ok(ApiResponse { status, body })
  }
}

/// Routes toasts and loading changes
/// into component state.
pub struct UiObserver {
  toasts:  Callback<Toast>,
  loading: Callback<bool>
}

impl FetchObserver for UiObserver {
  fn loading_changed(
    &self,
    loading: bool
  ) {
    self.loading.emit(loading);
  }

  fn toast(&self, toast: Toast) {
    self.toasts.emit(toast);
  }
}

pub type UiFetch =
  FetchHook<GlooTransport, UiObserver>;

/// Component-scoped fetch hook plus its
/// loading flag.
#[hook]
pub fn use_fetch() -> (Rc<UiFetch>, bool) {
  let loading = use_state_eq(|| false);
  let toasts = use_context::<
    Callback<Toast>
  >()
  .unwrap_or_default();

  let set_loading = {
    let loading = loading.clone();
    Callback::from(move |value| {
      loading.set(value)
    })
  };

  let fetch = Rc::new(FetchHook::new(
    GlooTransport::default(),
    UiObserver {
      toasts,
      loading: set_loading
    }
  ));

  (fetch, *loading)
}
