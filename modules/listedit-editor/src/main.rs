use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use listedit_common::Config;
use listedit_editor::terminal::{describe_outcome, render_rows, Command, HELP};
use listedit_editor::Editor;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("listedit=info".parse()?))
        .init();

    info!("listedit starting...");

    let config = Config::from_env()?;
    config.log_redacted();

    let editor = Editor::from_config(&config);

    // Report save outcomes as they land, independent of the input loop
    let mut outcomes = editor.subscribe_outcomes();
    tokio::spawn(async move {
        loop {
            match outcomes.recv().await {
                Ok(outcome) => println!("{}", describe_outcome(&outcome)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Outcome reporter fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    print!("{}", render_rows(&editor.rows()));
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };

        match command {
            Command::List => print!("{}", render_rows(&editor.rows())),
            Command::Edit(id) => {
                let state = editor.request_edit(id);
                if state.editing_item().is_none() {
                    println!("no item with id {id}");
                }
                print!("{}", render_rows(&state.rows()));
            }
            Command::Save(name) => match editor.save_editing(name) {
                Some(handle) => {
                    info!(save_id = %handle.save_id(), item_id = handle.item_id(), "Save started");
                    print!("{}", render_rows(&editor.rows()));
                }
                None => println!("nothing is in edit mode; use 'edit <id>' first"),
            },
            Command::Wait => {
                editor.settle().await;
                print!("{}", render_rows(&editor.rows()));
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    if editor.in_flight() > 0 {
        info!(pending = editor.in_flight(), "Waiting for pending saves before exit");
        editor.settle().await;
    }
    print!("{}", render_rows(&editor.rows()));

    info!(actions = editor.journal().len(), "listedit finished");
    Ok(())
}
