use std::io::{self, IsTerminal, Write};

use chrono::{DateTime, Local};
use taskdeck_shared::display::{self, EMPTY_LIST_MESSAGE, TaskRow};
use taskdeck_shared::{FetchObserver, FieldErrors, Task, Toast, ToastKind};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self { color: cfg.color()? })
    }

    #[tracing::instrument(skip(self, tasks, now))]
    pub fn print_task_table(&self, tasks: &[Task], now: DateTime<Local>) -> anyhow::Result<()> {
        let tty = io::stdout().is_terminal();
        let mut out = io::stdout().lock();
        self.write_task_table(&mut out, &display::rows(tasks, now), tty)
    }

    fn write_task_table<W: Write>(&self, mut out: W, rows: &[TaskRow], tty: bool) -> anyhow::Result<()> {
        let Some(heading) = display::list_heading(rows.len()) else {
            writeln!(out, "{EMPTY_LIST_MESSAGE}")?;
            return Ok(());
        };
        writeln!(out, "{heading}")?;
        writeln!(out)?;

        let headers = vec![
            "ID".to_string(),
            "Title".to_string(),
            "Priority".to_string(),
            "Status".to_string(),
            "Created".to_string(),
        ];

        let rows = rows
            .iter()
            .map(|row| {
                vec![
                    row.id.clone(),
                    row.title.clone(),
                    self.paint(&row.priority_label, row.tone.ansi(), tty),
                    if row.is_complete() {
                        self.paint(row.status_label(), "32", tty)
                    } else {
                        row.status_label().to_string()
                    },
                    row.created.clone(),
                ]
            })
            .collect();

        write_table(out, headers, rows)
    }

    #[tracing::instrument(skip(self, task, now))]
    pub fn print_task_info(&self, task: &Task, now: DateTime<Local>) -> anyhow::Result<()> {
        let tty = io::stdout().is_terminal();
        let mut out = io::stdout().lock();
        let row = TaskRow::build(task, 0, now);

        writeln!(out, "id          {}", row.id)?;
        writeln!(out, "title       {}", task.title.clone().unwrap_or_default())?;
        writeln!(out, "priority    {}", self.paint(&row.priority_label, row.tone.ansi(), tty))?;
        writeln!(out, "status      {}", row.status_label())?;
        writeln!(out, "created     {}", row.created)?;
        if !row.description.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", row.description)?;
        }
        Ok(())
    }

    pub fn print_field_errors(&self, errors: &FieldErrors) -> anyhow::Result<()> {
        let tty = io::stderr().is_terminal();
        let mut err = io::stderr().lock();
        self.write_field_errors(&mut err, errors, tty)
    }

    fn write_field_errors<W: Write>(&self, mut out: W, errors: &FieldErrors, tty: bool) -> anyhow::Result<()> {
        for (field, message) in errors {
            writeln!(out, "{}: {}", self.paint(field.name(), "35", tty), message)?;
        }
        Ok(())
    }

    /// `tty` is the terminal check of the stream the text goes to.
    fn paint(&self, text: &str, code: &str, tty: bool) -> String {
        if !self.color || !tty {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

/// Prints toasts to stderr; loading changes only go to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalObserver;

impl FetchObserver for TerminalObserver {
    fn loading_changed(&self, loading: bool) {
        debug!(loading, "fetch loading changed");
    }

    fn toast(&self, toast: Toast) {
        let prefix = match toast.kind {
            ToastKind::Success => "ok",
            ToastKind::Error => "error",
        };
        eprintln!("{prefix}: {}", toast.message);
    }
}

fn write_table<W: Write>(mut writer: W, headers: Vec<String>, rows: Vec<Vec<String>>) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use taskdeck_shared::display;
    use taskdeck_shared::{FieldErrors, Task, TaskField, TaskStatus};

    use super::{Renderer, strip_ansi};
    use crate::config::Config;

    fn plain_renderer() -> Renderer {
        let mut cfg = Config::defaults();
        cfg.apply_overrides(vec![("color".to_string(), "off".to_string())]);
        Renderer::new(&cfg).expect("renderer")
    }

    #[test]
    fn empty_list_prints_placeholder() {
        let mut out = Vec::new();
        plain_renderer().write_task_table(&mut out, &[], true).expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8"), "No tasks found\n");
    }

    #[test]
    fn table_lists_defaulted_rows() {
        let tasks = vec![Task {
            id: "65a1".to_string(),
            title: None,
            description: None,
            status: TaskStatus::Complete,
            priority: Some("Low".to_string()),
            created_at: Some("2024-01-12T09:30:00Z".to_string()),
        }];
        let mut out = Vec::new();
        plain_renderer()
            .write_task_table(&mut out, &display::rows(&tasks, Local::now()), false)
            .expect("render");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.starts_with("Your tasks (1)\n"));
        assert!(text.contains("Task #1"));
        assert!(text.contains("Low Priority"));
        assert!(text.contains("Complete"));
    }

    #[test]
    fn rejects_unknown_color_setting() {
        let mut cfg = Config::defaults();
        cfg.apply_overrides(vec![("color".to_string(), "maybe".to_string())]);
        assert!(Renderer::new(&cfg).is_err());
    }

    fn color_renderer() -> Renderer {
        Renderer::new(&Config::defaults()).expect("renderer")
    }

    #[test]
    fn field_errors_follow_their_own_stream() {
        let mut errors = FieldErrors::new();
        errors.insert(TaskField::Description, "This field is required".to_string());

        let mut on_tty = Vec::new();
        color_renderer().write_field_errors(&mut on_tty, &errors, true).expect("render");
        assert_eq!(
            String::from_utf8(on_tty).expect("utf8"),
            "\x1b[35mdescription\x1b[0m: This field is required\n"
        );

        let mut piped = Vec::new();
        color_renderer().write_field_errors(&mut piped, &errors, false).expect("render");
        assert_eq!(String::from_utf8(piped).expect("utf8"), "description: This field is required\n");
    }

    #[test]
    fn color_setting_uses_config_vocabulary() {
        let mut cfg = Config::defaults();
        cfg.apply_overrides(vec![("color".to_string(), "n".to_string())]);
        let mut out = Vec::new();
        Renderer::new(&cfg)
            .expect("renderer")
            .write_field_errors(&mut out, &FieldErrors::from([(TaskField::Title, "too long".to_string())]), true)
            .expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8"), "title: too long\n");
    }

    #[test]
    fn strips_escape_sequences() {
        assert_eq!(strip_ansi("\x1b[31mHigh\x1b[0m"), "High");
    }
}
