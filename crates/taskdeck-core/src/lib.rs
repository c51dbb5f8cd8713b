pub mod board;
pub mod cli;
pub mod commands;
pub mod config;
pub mod http;
pub mod render;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use taskdeck_shared::FetchHook;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting taskdeck CLI"
  );
  debug!(
    overrides = pre.rc_overrides.len(),
    "preprocessed rc overrides"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    pre
      .rc_overrides
      .into_iter()
      .chain(
        cli
          .rc_overrides
          .iter()
          .map(|kv| {
            (
              kv.key.clone(),
              kv.value.clone()
            )
          })
      )
      .chain(cli.flag_overrides())
  );

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async \
         runtime"
      )?;

  let transport = {
    let _guard = runtime.enter();
    http::ReqwestTransport::new(
      &cfg.api_url(),
      cfg.timeout()?
    )?
  };
  info!(
    api = %transport.base_url(),
    "using task API"
  );

  let renderer =
    render::Renderer::new(&cfg)?;
  let mut board = board::TaskBoard::new(
    FetchHook::new(
      transport,
      render::TerminalObserver
    ),
    cfg.session()
  );
  let command = cli
    .command
    .unwrap_or(cli::Command::List);

  runtime.block_on(commands::dispatch(
    &mut board,
    &renderer,
    command
  ))?;

  info!("done");
  Ok(())
}
