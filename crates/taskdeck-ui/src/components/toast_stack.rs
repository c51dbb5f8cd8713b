use taskdeck_shared::{
  Toast,
  ToastKind
};
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ToastStackProps {
  pub toasts:     Vec<(u64, Toast)>,
  pub on_dismiss: Callback<u64>
}

#[function_component(ToastStack)]
pub fn toast_stack(
  props: &ToastStackProps
) -> Html {
  html! {
      <div class="toasts" aria-live="polite">
          {
              for props.toasts.iter().map(|(id, toast)| {
                  let id = *id;
                  let on_dismiss = props.on_dismiss.clone();
                  let class = match toast.kind {
                      | ToastKind::Success => "toast success",
                      | ToastKind::Error => "toast error"
                  };
                  html! {
                      <div key={id} class={class} onclick={move |_| on_dismiss.emit(id)}>
                          { &toast.message }
                      </div>
                  }
              })
          }
      </div>
  }
}
