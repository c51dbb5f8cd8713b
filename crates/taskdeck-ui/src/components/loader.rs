use yew::{
  Html,
  function_component,
  html
};

#[function_component(Loader)]
pub fn loader() -> Html {
  html! {
      <div class="loader" role="status" aria-label="Loading">
          <span class="spinner"></span>
      </div>
  }
}
