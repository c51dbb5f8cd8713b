use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use taskdeck_shared::Session;
use tracing::{
  debug,
  info,
  trace,
  warn
};

pub const DEFAULT_API_URL: &str =
  "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_OVERRIDES: [(&str, &str); 2] = [
  ("TASKDECK_API_URL", "api.url"),
  ("TASKDECK_TOKEN", "api.token")
];

#[derive(Debug, Clone)]
pub struct Config {
  map:              HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Config {
  pub fn defaults() -> Self {
    let mut cfg = Config {
      map:          HashMap::new(),
      loaded_files: vec![]
    };

    cfg.map.insert(
      "api.url".to_string(),
      DEFAULT_API_URL.to_string()
    );
    cfg.map.insert(
      "api.timeout".to_string(),
      DEFAULT_TIMEOUT_SECS.to_string()
    );
    cfg.map.insert(
      "color".to_string(),
      "on".to_string()
    );
    cfg
  }

  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Self::defaults();

    let rc = resolve_rc_path(rc_override)?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading taskdeckrc");
      cfg.load_file(&path)?;
    } else {
      warn!(
        "no taskdeckrc found; using \
         defaults"
      );
    }

    cfg.apply_overrides(
      ENV_OVERRIDES.iter().filter_map(
        |(var, key)| {
          std::env::var(var).ok().map(
            |value| {
              (key.to_string(), value)
            }
          )
        }
      )
    );

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      if key == "api.token" {
        debug!(key = %key, "applying override");
      } else {
        debug!(key = %key, value = %v, "applying override");
      }
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> anyhow::Result<Option<bool>> {
    self
      .map
      .get(key)
      .map(|v| {
        parse_bool(v).ok_or_else(|| {
          anyhow!("invalid {key} setting: {v}")
        })
      })
      .transpose()
  }

  /// `color`, defaulting to on.
  pub fn color(
    &self
  ) -> anyhow::Result<bool> {
    Ok(
      self
        .get_bool("color")?
        .unwrap_or(true)
    )
  }

  pub fn api_url(&self) -> String {
    self
      .get("api.url")
      .filter(|url| !url.trim().is_empty())
      .unwrap_or_else(|| {
        DEFAULT_API_URL.to_string()
      })
  }

  pub fn timeout(
    &self
  ) -> anyhow::Result<Duration> {
    let raw = self
      .get("api.timeout")
      .unwrap_or_else(|| {
        DEFAULT_TIMEOUT_SECS.to_string()
      });
    let secs =
      raw.trim().parse::<u64>().map_err(
        |_| {
          anyhow!(
            "invalid api.timeout: {raw}"
          )
        }
      )?;
    Ok(Duration::from_secs(secs))
  }

  /// Session built from the configured
  /// token; no token means logged out.
  pub fn session(&self) -> Session {
    match self.get("api.token") {
      | Some(token) => Session::new(token),
      | None => Session::anonymous()
    }
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let line = strip_comment(raw_line);
      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if include_path.exists() {
          self
            .load_file(&include_path)?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var("TASKDECKRC")
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let home = dirs::home_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine home \
         directory"
      )
    })?;
  let candidate =
    home.join(".taskdeckrc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> Option<bool> {
  match s
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on" | "true" => {
      Some(true)
    }
    | "0" | "n" | "no" | "off"
    | "false" => Some(false),
    | _ => None
  }
}

/// Drops a trailing `#` comment. A `#`
/// only starts a comment at the line
/// start or after whitespace, so values
/// such as tokens may contain it.
fn strip_comment(raw: &str) -> &str {
  let line = raw.trim();
  if line.starts_with('#') {
    return "";
  }
  let cut = line
    .char_indices()
    .zip(line.chars().skip(1))
    .find(|((_, ch), next)| {
      ch.is_whitespace() && *next == '#'
    })
    .map(|((idx, _), _)| idx);
  match cut {
    | Some(idx) => line[..idx].trim_end(),
    | None => line
  }
}

#[cfg(test)]
mod tests {
  use std::fs;
  use std::time::Duration;

  use tempfile::tempdir;

  use super::{
    Config,
    DEFAULT_API_URL
  };

  #[test]
  fn defaults_point_at_local_api() {
    let cfg = Config::defaults();
    assert_eq!(cfg.api_url(), DEFAULT_API_URL);
    assert_eq!(
      cfg.timeout().expect("timeout"),
      Duration::from_secs(30)
    );
    assert!(!cfg.session().is_active());
    assert!(cfg.color().expect("color"));
  }

  #[test]
  fn reads_rc_file_with_comments_and_includes()
  {
    let dir = tempdir().expect("tempdir");
    fs::write(
      dir.path().join("secret.rc"),
      "api.token = abc123\n"
    )
    .expect("write include");
    let rc = dir.path().join("taskdeckrc");
    fs::write(
      &rc,
      "# local dev\n\
       api.url = http://127.0.0.1:9000/api  # proxy\n\
       api.timeout=5\n\
       include secret.rc\n\
       include missing.rc\n"
    )
    .expect("write rc");

    let mut cfg = Config::defaults();
    cfg.load_file(&rc).expect("load rc");

    assert_eq!(
      cfg.api_url(),
      "http://127.0.0.1:9000/api"
    );
    assert_eq!(
      cfg.timeout().expect("timeout"),
      Duration::from_secs(5)
    );
    assert_eq!(cfg.session().token, "abc123");
    assert_eq!(cfg.loaded_files.len(), 2);
  }

  #[test]
  fn rejects_lines_without_equals() {
    let dir = tempdir().expect("tempdir");
    let rc = dir.path().join("taskdeckrc");
    fs::write(&rc, "api.url\n").expect("write rc");

    let err = Config::defaults()
      .load_file(&rc)
      .expect_err("must reject");
    assert!(
      err.to_string().contains("invalid config line")
    );
  }

  #[test]
  fn overrides_strip_rc_prefix() {
    let mut cfg = Config::defaults();
    cfg.apply_overrides(vec![
      ("rc.color".to_string(), "off".to_string()),
      ("api.timeout".to_string(), "soon".to_string()),
    ]);
    assert!(!cfg.color().expect("color"));
    assert!(cfg.timeout().is_err());
  }

  #[test]
  fn hash_inside_value_is_kept() {
    let dir = tempdir().expect("tempdir");
    let rc = dir.path().join("taskdeckrc");
    fs::write(
      &rc,
      "api.token = abc#123 # issued by ops\n\
       api.url=http://h/api#frag\n"
    )
    .expect("write rc");

    let mut cfg = Config::defaults();
    cfg.load_file(&rc).expect("load rc");

    assert_eq!(cfg.session().token, "abc#123");
    assert_eq!(cfg.api_url(), "http://h/api#frag");
  }

  #[test]
  fn color_accepts_one_shared_vocabulary() {
    for (raw, expected) in [
      ("y", true),
      ("ON", true),
      ("n", false),
      ("0", false)
    ] {
      let mut cfg = Config::defaults();
      cfg.apply_overrides(vec![(
        "color".to_string(),
        raw.to_string()
      )]);
      assert_eq!(
        cfg.color().expect("color"),
        expected,
        "color = {raw}"
      );
    }

    let mut cfg = Config::defaults();
    cfg.apply_overrides(vec![(
      "color".to_string(),
      "maybe".to_string()
    )]);
    assert!(cfg.color().is_err());
  }
}
