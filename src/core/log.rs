use crate::db::log::{LogEntry, load_log};
use crate::errors::AppResult;
use ansi_term::Colour;
use regex::Regex;
use rusqlite::Connection;
use std::sync::LazyLock;

const MAX_OP_WIDTH: usize = 60;

static ANSI_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[mK]").ok());

fn strip_ansi(s: &str) -> String {
    match ANSI_RE.as_ref() {
        Some(re) => re.replace_all(s, "").into_owned(),
        None => s.to_string(),
    }
}

/// Colour of an audit operation in `log --print`.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "order_add" | "order_append" => Colour::Green,
        "order_paid" => Colour::Cyan,
        "order_cancel" | "print_failed" => Colour::Red,
        "migration_applied" => Colour::Purple,
        "backup" | "restore" => Colour::Blue,
        "init" => Colour::RGB(255, 153, 51),
        "login" | "logout" | "password_upgraded" | "password_change" => Colour::Yellow,
        other if other.ends_with("_delete") => Colour::Red,
        other if other.ends_with("_add") => Colour::Green,
        other if other.ends_with("_update") => Colour::Yellow,
        _ => Colour::White,
    }
}

fn op_target(e: &LogEntry) -> String {
    if e.target.is_empty() {
        e.operation.clone()
    } else {
        format!("{} ({})", e.operation, e.target)
    }
}

/// Visible text of the operation column, cut to [`MAX_OP_WIDTH`].
fn truncate_visible(s: &str) -> String {
    if s.chars().count() > MAX_OP_WIDTH {
        let mut cut: String = s.chars().take(MAX_OP_WIDTH - 3).collect();
        cut.push_str("...");
        cut
    } else {
        s.to_string()
    }
}

/// One formatted log line; only the operation word is coloured.
fn render_line(e: &LogEntry, id_w: usize, date_w: usize, op_w: usize) -> String {
    let color = color_for_operation(&e.operation);
    let visible = truncate_visible(&op_target(e));

    let colored = match visible.split_once(' ') {
        Some((op, rest)) => format!("{} {}", color.paint(op), rest),
        None => color.paint(visible.as_str()).to_string(),
    };
    let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&colored).chars().count()));

    format!(
        "{:>id_w$}: {:<date_w$} | {}{} => {}",
        e.id, e.date, colored, padding, e.message
    )
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(conn: &Connection, limit: Option<usize>) -> AppResult<()> {
        let entries: Vec<LogEntry> = load_log(conn, limit)?
            .into_iter()
            .map(|mut e| {
                e.date = chrono::DateTime::parse_from_rfc3339(&e.date)
                    .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or(e.date);
                e
            })
            .collect();

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let op_w = entries
            .iter()
            .map(|e| op_target(e).chars().count())
            .max()
            .unwrap_or(10)
            .min(MAX_OP_WIDTH);
        let id_w = entries
            .iter()
            .map(|e| e.id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries.iter().map(|e| e.date.len()).max().unwrap_or(10);

        println!("📜 Internal log:\n");
        for e in &entries {
            println!("{}", render_line(e, id_w, date_w, op_w));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(op: &str, target: &str) -> LogEntry {
        LogEntry {
            id: 7,
            date: "2025-01-01 10:00:00".into(),
            operation: op.into(),
            target: target.into(),
            message: "done".into(),
        }
    }

    #[test]
    fn ansi_codes_are_stripped() {
        let painted = Colour::Green.paint("order_add").to_string();
        assert_eq!(strip_ansi(&painted), "order_add");
    }

    #[test]
    fn long_targets_are_truncated() {
        let e = entry("print_failed", &"x".repeat(100));
        let line = strip_ansi(&render_line(&e, 1, 19, MAX_OP_WIDTH));
        assert!(line.contains("..."));
        assert!(line.ends_with("=> done"));
    }

    #[test]
    fn line_layout() {
        let e = entry("order_paid", "#3");
        let line = strip_ansi(&render_line(&e, 2, 19, 15));
        assert_eq!(line, " 7: 2025-01-01 10:00:00 | order_paid (#3) => done");
    }
}
