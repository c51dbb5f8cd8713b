use std::cell::RefCell;
use std::rc::Rc;

use chrono::Local;
use taskdeck_shared::display::{
  EMPTY_LIST_MESSAGE,
  list_heading
};
use taskdeck_shared::{
  FetchOptions,
  Session,
  TaskListEnvelope,
  TaskListView
};
use yew::{
  Callback,
  Html,
  UseForceUpdateHandle,
  function_component,
  html,
  use_context,
  use_effect_with,
  use_force_update,
  use_mut_ref
};
use yew_router::prelude::Link;

use super::{
  Loader,
  TaskListRow,
  TokenPrompt
};
use crate::api::{
  UiFetch,
  use_fetch
};
use crate::app::{
  Route,
  SessionContext
};

/// Everything an async list operation
/// needs after the render that started
/// it is gone.
#[derive(Clone)]
struct ListDriver {
  view:    Rc<RefCell<TaskListView>>,
  fetch:   Rc<UiFetch>,
  session: Session,
  redraw:  UseForceUpdateHandle
}

impl ListDriver {
  async fn reload(&self) {
    let request = self
      .view
      .borrow_mut()
      .begin_refresh(&self.session);
    let Some(request) = request else {
      return;
    };
    self.redraw.force_update();

    let result = self
      .fetch
      .fetch_json::<TaskListEnvelope>(
        &request,
        FetchOptions::quiet()
      )
      .await
      .map(|envelope| envelope.tasks);
    self
      .view
      .borrow_mut()
      .finish_refresh(result);
    self.redraw.force_update();
  }

  fn delete(&self, id: String) {
    let request = self
      .view
      .borrow()
      .delete_request(&self.session, &id);
    let driver = self.clone();
    wasm_bindgen_futures::spawn_local(
      async move {
        if let Err(err) = driver
          .fetch
          .fetch(
            &request,
            FetchOptions::default()
          )
          .await
        {
          tracing::warn!(id = %id, error = %err, "delete failed");
        }
        driver.reload().await;
      }
    );
  }

  fn toggle(&self, id: String) {
    let request = self
      .view
      .borrow_mut()
      .toggle_status(&self.session, &id);
    let Some(request) = request else {
      return;
    };
    self.redraw.force_update();

    let driver = self.clone();
    wasm_bindgen_futures::spawn_local(
      async move {
        if let Err(err) = driver
          .fetch
          .fetch(
            &request,
            FetchOptions::quiet()
          )
          .await
        {
          tracing::warn!(id = %id, error = %err, "status update failed");
        }
        driver.reload().await;
      }
    );
  }
}

#[function_component(TaskListPage)]
pub fn task_list_page() -> Html {
  let ctx =
    use_context::<SessionContext>()
      .unwrap_or_default();
  let view =
    use_mut_ref(TaskListView::new);
  let redraw = use_force_update();
  let (fetch, syncing) = use_fetch();

  let driver = ListDriver {
    view: view.clone(),
    fetch,
    session: ctx.session.clone(),
    redraw
  };

  {
    let driver = driver.clone();
    use_effect_with(
      ctx.session.clone(),
      move |session| {
        if session.is_active() {
          wasm_bindgen_futures::spawn_local(
            async move {
              driver.reload().await;
            }
          );
        }
        || ()
      }
    );
  }

  if !ctx.session.is_active() {
    return html! {
        <TokenPrompt on_session={ctx.update.clone()} />
    };
  }

  let on_toggle = {
    let driver = driver.clone();
    Callback::from(move |id: String| {
      driver.toggle(id)
    })
  };
  let on_delete = {
    let driver = driver.clone();
    Callback::from(move |id: String| {
      driver.delete(id)
    })
  };

  let view = view.borrow();
  let rows = view.rows(Local::now());
  let first_load =
    view.is_loading() && rows.is_empty();

  html! {
      <div class="tasks">
          <div class="tasks-header">
              {
                  match list_heading(rows.len()) {
                      | Some(heading) => html! { <h2>{ heading }</h2> },
                      | None => html! { <span></span> }
                  }
              }
              {
                  if syncing {
                      html! { <span class="muted">{ "Syncing…" }</span> }
                  } else {
                      html! {}
                  }
              }
              <Link<Route> to={Route::AddTask} classes="btn primary">
                  { "+ Add new task" }
              </Link<Route>>
          </div>
          {
              if first_load {
                  html! { <Loader /> }
              } else if rows.is_empty() {
                  html! { <div class="panel empty"><span>{ EMPTY_LIST_MESSAGE }</span></div> }
              } else {
                  html! {
                      <div>
                          {
                              for rows.into_iter().map(|row| {
                                  let key = row.id.clone();
                                  html! {
                                      <TaskListRow
                                          key={key}
                                          row={row}
                                          on_toggle={on_toggle.clone()}
                                          on_delete={on_delete.clone()}
                                      />
                                  }
                              })
                          }
                      </div>
                  }
              }
          }
      </div>
  }
}
