use anyhow::{Context, anyhow, bail};
use chrono::Local;
use taskdeck_shared::{FetchObserver, Transport};
use tracing::{info, instrument};

use crate::board::{SubmitOutcome, TaskBoard};
use crate::cli::{Command, DraftArgs};
use crate::render::Renderer;

/// Runs one CLI command against the board.
#[instrument(skip(board, renderer))]
pub async fn dispatch<T, O>(board: &mut TaskBoard<T, O>, renderer: &Renderer, command: Command) -> anyhow::Result<()>
where
    T: Transport,
    O: FetchObserver,
{
    if !board.session().is_active() {
        bail!("not logged in: set api.token in ~/.taskdeckrc, TASKDECK_TOKEN, or pass --token");
    }

    match command {
        Command::List => {
            board.refresh().await.context("failed to load tasks")?;
            print_list(board, renderer)
        }
        Command::Show { id } => {
            let form = board.open_form(Some(&id)).await.with_context(|| format!("failed to load task {id}"))?;
            let task = form.snapshot().ok_or_else(|| anyhow!("task {id} was not loaded"))?;
            renderer.print_task_info(task, Local::now())
        }
        Command::Add(fields) => save(board, renderer, None, fields).await,
        Command::Edit { id, fields } => save(board, renderer, Some(&id), fields).await,
        Command::Toggle { id } => {
            board.refresh().await.context("failed to load tasks")?;
            if !board.toggle(&id).await.with_context(|| format!("failed to update task {id}"))? {
                bail!("no task with id {id}");
            }
            print_list(board, renderer)
        }
        Command::Delete { id } => {
            board.delete(&id).await.with_context(|| format!("failed to delete task {id}"))?;
            print_list(board, renderer)
        }
    }
}

async fn save<T, O>(
    board: &mut TaskBoard<T, O>,
    renderer: &Renderer,
    id: Option<&str>,
    fields: DraftArgs,
) -> anyhow::Result<()>
where
    T: Transport,
    O: FetchObserver,
{
    let mut form = board.open_form(id).await.context("failed to load task for editing")?;
    for (field, value) in fields.edits() {
        form.set_field(field, value);
    }

    match board.submit_form(&mut form).await.context("failed to save task")? {
        SubmitOutcome::Saved => {
            info!(mode = ?form.mode(), "task saved");
            print_list(board, renderer)
        }
        SubmitOutcome::Invalid(errors) => {
            renderer.print_field_errors(&errors)?;
            bail!("task not saved: {} invalid field(s)", errors.len());
        }
    }
}

fn print_list<T, O>(board: &TaskBoard<T, O>, renderer: &Renderer) -> anyhow::Result<()>
where
    T: Transport,
    O: FetchObserver,
{
    renderer.print_task_table(board.list().tasks(), Local::now())
}
