use std::rc::Rc;

use gloo::timers::callback::Timeout;
use taskdeck_shared::{
  Session,
  Toast
};
use yew::{
  Callback,
  ContextProvider,
  Html,
  Reducible,
  function_component,
  html,
  use_mut_ref,
  use_reducer,
  use_state
};
use yew_router::prelude::{
  BrowserRouter,
  Link,
  Routable,
  Switch
};

use crate::components::{
  TaskFormPage,
  TaskListPage,
  ToastStack
};
use crate::storage::{
  load_session,
  save_session
};

const TOAST_TIMEOUT_MS: u32 = 4_000;

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
  #[at("/")]
  Home,
  #[at("/tasks/add")]
  AddTask,
  #[at("/tasks/:id")]
  EditTask { id: String },
  #[not_found]
  #[at("/404")]
  NotFound
}

fn switch(route: Route) -> Html {
  match route {
    | Route::Home => {
      html! { <TaskListPage /> }
    }
    | Route::AddTask => {
      html! { <TaskFormPage key="add" task_id={None::<String>} /> }
    }
    | Route::EditTask { id } => {
      let key = id.clone();
      html! { <TaskFormPage key={key} task_id={Some(id)} /> }
    }
    | Route::NotFound => html! {
        <div class="panel empty">
            <span>{ "Page not found" }</span>
            <Link<Route> to={Route::Home} classes="btn">{ "Back to tasks" }</Link<Route>>
        </div>
    }
  }
}

/// Session plus the way to replace it;
/// handed down instead of read from a
/// global store.
#[derive(Clone, Default, PartialEq)]
pub struct SessionContext {
  pub session: Session,
  pub update:  Callback<Session>
}

#[derive(Clone, Default, PartialEq)]
pub struct ToastQueue {
  pub items: Vec<(u64, Toast)>
}

pub enum ToastAction {
  Push(u64, Toast),
  Dismiss(u64)
}

impl Reducible for ToastQueue {
  type Action = ToastAction;

  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    let mut next = (*self).clone();
    match action {
      | ToastAction::Push(id, toast) => {
        next.items.push((id, toast));
      }
      | ToastAction::Dismiss(id) => {
        next
          .items
          .retain(|(item, _)| *item != id);
      }
    }
    Rc::new(next)
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let session = use_state(load_session);
  let toasts =
    use_reducer(ToastQueue::default);
  let toast_seq = use_mut_ref(|| 0_u64);

  let session_ctx = {
    let handle = session.clone();
    SessionContext {
      session: (*session).clone(),
      update:  Callback::from(
        move |next: Session| {
          tracing::info!(
            logged_in = next.is_active(),
            "session changed"
          );
          save_session(&next);
          handle.set(next);
        }
      )
    }
  };

  let push_toast = {
    let toasts = toasts.clone();
    let toast_seq = toast_seq.clone();
    Callback::from(move |toast: Toast| {
      let id = {
        let mut seq = toast_seq.borrow_mut();
        *seq = seq.wrapping_add(1);
        *seq
      };
      toasts.dispatch(ToastAction::Push(
        id, toast
      ));
      let dismiss = toasts.dispatcher();
      Timeout::new(
        TOAST_TIMEOUT_MS,
        move || {
          dismiss.dispatch(
            ToastAction::Dismiss(id)
          )
        }
      )
      .forget();
    })
  };

  let on_dismiss = {
    let toasts = toasts.clone();
    Callback::from(move |id: u64| {
      toasts
        .dispatch(ToastAction::Dismiss(id))
    })
  };

  let on_sign_out = {
    let update =
      session_ctx.update.clone();
    Callback::from(
      move |_: yew::MouseEvent| {
        update.emit(Session::anonymous())
      }
    )
  };
  let signed_in = session.is_active();

  html! {
      <ContextProvider<SessionContext> context={session_ctx}>
          <ContextProvider<Callback<Toast>> context={push_toast}>
              <BrowserRouter>
                  <header class="topbar">
                      <Link<Route> to={Route::Home} classes="brand">{ "Taskdeck" }</Link<Route>>
                      {
                          if signed_in {
                              html! { <button class="btn ghost" onclick={on_sign_out}>{ "Sign out" }</button> }
                          } else {
                              html! {}
                          }
                      }
                  </header>
                  <main>
                      <Switch<Route> render={switch} />
                  </main>
              </BrowserRouter>
              <ToastStack toasts={toasts.items.clone()} on_dismiss={on_dismiss} />
          </ContextProvider<Callback<Toast>>>
      </ContextProvider<SessionContext>>
  }
}
