use taskdeck_shared::display::TaskRow;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};
use yew_router::prelude::Link;

use crate::app::Route;

#[derive(Properties, PartialEq)]
pub struct TaskListRowProps {
  pub row:       TaskRow,
  pub on_toggle: Callback<String>,
  pub on_delete: Callback<String>
}

#[function_component(TaskListRow)]
pub fn task_list_row(
  props: &TaskListRowProps
) -> Html {
  let row = &props.row;
  let checked = row.is_complete();
  let priority_class = format!(
    "priority {}",
    row.tone.css_class()
  );

  let on_toggle = {
    let on_toggle =
      props.on_toggle.clone();
    let id = row.id.clone();
    move |_: yew::Event| {
      on_toggle.emit(id.clone())
    }
  };
  let on_delete = {
    let on_delete =
      props.on_delete.clone();
    let id = row.id.clone();
    move |_: yew::MouseEvent| {
      on_delete.emit(id.clone())
    }
  };

  html! {
      <div class="panel task-row">
          <div class="task-head">
              <div>
                  <span class="task-title">{ &row.title }</span>
                  <span class={priority_class}>{ &row.priority_label }</span>
              </div>
              <div class="task-actions">
                  <label class="switch">
                      <input type="checkbox" checked={checked} onchange={on_toggle} />
                      <span class="switch-track"></span>
                      <span class="switch-label">{ row.status_label() }</span>
                  </label>
                  <Link<Route>
                      to={Route::EditTask { id: row.id.clone() }}
                      classes="icon edit"
                  >
                      { "Edit" }
                  </Link<Route>>
                  <button class="icon delete" title="Delete this task" onclick={on_delete}>
                      { "Delete" }
                  </button>
              </div>
          </div>
          <div class="task-description">{ &row.description }</div>
          <div class="task-created">{ format!("Created: {}", row.created) }</div>
      </div>
  }
}
