use taskdeck_shared::Session;
use web_sys::HtmlInputElement;
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html,
  use_state
};

#[derive(Properties, PartialEq)]
pub struct TokenPromptProps {
  pub on_session: Callback<Session>
}

/// Asks for an API token when no
/// session is stored yet.
#[function_component(TokenPrompt)]
pub fn token_prompt(
  props: &TokenPromptProps
) -> Html {
  let token = use_state(String::new);

  let on_input = {
    let token = token.clone();
    Callback::from(
      move |e: yew::InputEvent| {
        let input: HtmlInputElement =
          e.target_unchecked_into();
        token.set(input.value());
      }
    )
  };

  let on_submit = {
    let token = token.clone();
    let on_session =
      props.on_session.clone();
    Callback::from(
      move |e: yew::SubmitEvent| {
        e.prevent_default();
        let session =
          Session::new((*token).clone());
        if session.is_active() {
          on_session.emit(session);
        }
      }
    )
  };

  html! {
      <form class="panel token-prompt" onsubmit={on_submit}>
          <h2>{ "Sign in" }</h2>
          <p class="muted">{ "Paste the access token issued by the task API." }</p>
          <input
              type="password"
              placeholder="Access token"
              value={(*token).clone()}
              oninput={on_input}
          />
          <button class="btn primary" type="submit">{ "Continue" }</button>
      </form>
  }
}
