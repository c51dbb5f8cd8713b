use taskdeck_shared::{
  FetchOptions,
  Session,
  TaskEnvelope,
  TaskField,
  TaskForm,
  TaskPriority,
  TaskStatus
};
use web_sys::{
  HtmlInputElement,
  HtmlSelectElement,
  HtmlTextAreaElement
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html,
  use_context,
  use_effect_with,
  use_force_update,
  use_mut_ref
};
use yew_router::prelude::use_navigator;

use super::{
  Loader,
  TokenPrompt
};
use crate::api::use_fetch;
use crate::app::{
  Route,
  SessionContext
};

#[derive(Properties, PartialEq)]
pub struct TaskFormPageProps {
  /// Present when editing an existing
  /// task.
  pub task_id: Option<String>
}

fn field_error(
  message: Option<&str>
) -> Html {
  match message {
    | Some(message) => html! {
        <p class="field-error">{ message }</p>
    },
    | None => html! {}
  }
}

/// What the form page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormView {
  SignIn,
  Loading,
  Editor
}

fn form_view(
  session: &Session,
  loading: bool
) -> FormView {
  if !session.is_active() {
    FormView::SignIn
  } else if loading {
    FormView::Loading
  } else {
    FormView::Editor
  }
}

#[function_component(TaskFormPage)]
pub fn task_form_page(
  props: &TaskFormPageProps
) -> Html {
  let ctx =
    use_context::<SessionContext>()
      .unwrap_or_default();
  let form = {
    let task_id = props.task_id.clone();
    use_mut_ref(move || {
      TaskForm::new(task_id.as_deref())
    })
  };
  let redraw = use_force_update();
  let (fetch, loading) = use_fetch();
  let navigator = use_navigator();

  {
    let title = form.borrow().page_title();
    use_effect_with(title, |title| {
      gloo::utils::document()
        .set_title(title);
      || ()
    });
  }

  {
    let form = form.clone();
    let fetch = fetch.clone();
    let redraw = redraw.clone();
    use_effect_with(
      ctx.session.clone(),
      move |session| {
        let request =
          form.borrow().load_request(session);
        if let Some(request) = request {
          wasm_bindgen_futures::spawn_local(
            async move {
              match fetch
                .fetch_json::<TaskEnvelope>(
                  &request,
                  FetchOptions::quiet()
                )
                .await
              {
                | Ok(envelope) => {
                  form
                    .borrow_mut()
                    .seed(envelope.task);
                  redraw.force_update();
                }
                | Err(err) => {
                  tracing::warn!(
                    path = %request.path,
                    error = %err,
                    "failed to load task for editing"
                  );
                }
              }
            }
          );
        }
        || ()
      }
    );
  }

  let on_field = {
    let form = form.clone();
    let redraw = redraw.clone();
    Callback::from(
      move |(field, value): (
        TaskField,
        String
      )| {
        form
          .borrow_mut()
          .set_field(field, value);
        redraw.force_update();
      }
    )
  };

  let on_title = {
    let on_field = on_field.clone();
    Callback::from(
      move |e: yew::InputEvent| {
        let input: HtmlInputElement =
          e.target_unchecked_into();
        on_field.emit((
          TaskField::Title,
          input.value()
        ));
      }
    )
  };
  let on_description = {
    let on_field = on_field.clone();
    Callback::from(
      move |e: yew::InputEvent| {
        let input: HtmlTextAreaElement =
          e.target_unchecked_into();
        on_field.emit((
          TaskField::Description,
          input.value()
        ));
      }
    )
  };
  let on_select = |field: TaskField| {
    let on_field = on_field.clone();
    Callback::from(move |e: yew::Event| {
      let select: HtmlSelectElement =
        e.target_unchecked_into();
      on_field.emit((field, select.value()));
    })
  };

  let on_submit = {
    let form = form.clone();
    let redraw = redraw.clone();
    let fetch = fetch.clone();
    let navigator = navigator.clone();
    let session = ctx.session.clone();
    Callback::from(
      move |e: yew::SubmitEvent| {
        e.prevent_default();
        let submitted =
          form.borrow_mut().submit(&session);
        redraw.force_update();

        let Ok(request) = submitted else {
          return;
        };
        let fetch = fetch.clone();
        let navigator = navigator.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            let saved = fetch
              .fetch(
                &request,
                FetchOptions::default()
              )
              .await;
            if saved.is_ok()
              && let Some(navigator) =
                navigator
            {
              navigator.push(&Route::Home);
            }
          }
        );
      }
    )
  };

  let on_reset = {
    let form = form.clone();
    let redraw = redraw.clone();
    Callback::from(
      move |e: yew::MouseEvent| {
        e.prevent_default();
        if form.borrow_mut().reset() {
          redraw.force_update();
        }
      }
    )
  };

  let on_cancel = {
    let navigator = navigator.clone();
    Callback::from(
      move |e: yew::MouseEvent| {
        e.prevent_default();
        if let Some(navigator) = &navigator {
          navigator.push(&Route::Home);
        }
      }
    )
  };

  match form_view(&ctx.session, loading) {
    | FormView::SignIn => {
      return html! {
          <TokenPrompt on_session={ctx.update.clone()} />
      };
    }
    | FormView::Loading => {
      return html! {
          <div class="panel task-form"><Loader /></div>
      };
    }
    | FormView::Editor => {}
  }

  let form = form.borrow();
  let draft = form.draft();

  html! {
      <form class="panel task-form" onsubmit={on_submit}>
          <h2>{ form.heading() }</h2>

          <div class="field">
              <label for="title">{ "Title" }</label>
              <input
                  type="text"
                  id="title"
                  name="title"
                  placeholder="Task title"
                  value={draft.title.clone()}
                  oninput={on_title}
              />
              { field_error(form.error(TaskField::Title)) }
          </div>

          <div class="field">
              <label for="description">{ "Description" }</label>
              <textarea
                  id="description"
                  name="description"
                  placeholder="Write here.."
                  value={draft.description.clone()}
                  oninput={on_description}
              />
              { field_error(form.error(TaskField::Description)) }
          </div>

          <div class="field">
              <label for="status">{ "Status" }</label>
              <select id="status" name="status" onchange={on_select(TaskField::Status)}>
                  {
                      for [TaskStatus::Incomplete, TaskStatus::Complete].into_iter().map(|status| html! {
                          <option value={status.as_str()} selected={draft.status == status.as_str()}>
                              { status.label() }
                          </option>
                      })
                  }
              </select>
              { field_error(form.error(TaskField::Status)) }
          </div>

          <div class="field">
              <label for="priority">{ "Priority" }</label>
              <select id="priority" name="priority" onchange={on_select(TaskField::Priority)}>
                  {
                      for TaskPriority::ALL.into_iter().map(|priority| html! {
                          <option value={priority.as_str()} selected={draft.priority == priority.as_str()}>
                              { priority.as_str() }
                          </option>
                      })
                  }
              </select>
              { field_error(form.error(TaskField::Priority)) }
          </div>

          <div class="actions">
              <button class="btn primary" type="submit">{ form.submit_label() }</button>
              <button class="btn danger" type="button" onclick={on_cancel}>{ "Cancel" }</button>
              {
                  if form.is_update() {
                      html! { <button class="btn" type="button" onclick={on_reset}>{ "Reset" }</button> }
                  } else {
                      html! {}
                  }
              }
          </div>
      </form>
  }
}

#[cfg(test)]
mod task_form_tests {
  use super::*;

  #[test]
  fn signed_out_user_gets_the_prompt() {
    assert_eq!(
      form_view(&Session::anonymous(), false),
      FormView::SignIn
    );
    assert_eq!(
      form_view(&Session::new("  "), true),
      FormView::SignIn
    );
  }

  #[test]
  fn active_session_shows_loader_then_editor() {
    let session = Session::new("tok");
    assert_eq!(
      form_view(&session, true),
      FormView::Loading
    );
    assert_eq!(
      form_view(&session, false),
      FormView::Editor
    );
  }
}
