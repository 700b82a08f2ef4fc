//! Line-oriented terminal front end: command parsing and row rendering.

use std::fmt::Write as _;

use listedit_common::{ItemId, RowView};

use crate::save::SaveOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Edit(ItemId),
    Save(String),
    Wait,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "" | "list" | "ls" => Ok(Self::List),
            "edit" => rest
                .parse()
                .map(Self::Edit)
                .map_err(|_| format!("edit expects an item id, got '{rest}'")),
            "save" if rest.is_empty() => Err("save expects a new name".to_string()),
            "save" => Ok(Self::Save(rest.to_string())),
            "wait" => Ok(Self::Wait),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }
}

pub const HELP: &str = "\
commands:
  list            show all rows
  edit <id>       put a row into edit mode
  save <name>     rename the row in edit mode
  wait            wait for pending saves
  quit            exit";

/// One line per row; `>` marks the row in edit mode.
pub fn render_rows(rows: &[RowView]) -> String {
    let mut out = String::new();
    for row in rows {
        let marker = if row.editing { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} [{}] {}  ({})",
            row.item.id,
            row.item.name,
            row.item.modified_at.format("%Y-%m-%d %H:%M:%S%.3f")
        );
    }
    out
}

pub fn describe_outcome(outcome: &SaveOutcome) -> String {
    match outcome {
        SaveOutcome::Confirmed { item, .. } => {
            format!("saved item {} at {}", item.id, item.modified_at.to_rfc3339())
        }
        SaveOutcome::Failed { item_id, error, .. } => {
            format!("save of item {item_id} failed: {error} (local value kept)")
        }
    }
}
