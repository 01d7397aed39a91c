//! # Notepad-- - A minimalist multi-tab notepad
//!
//! Terminal front end over the `notepad_mm` session manager.
//!
//! ```bash
//! # Restore the previous session
//! notepad-mm
//!
//! # Open files on launch
//! notepad-mm notes.md todo.txt
//!
//! # Start fresh with a separate data directory
//! notepad-mm --no-restore --data-dir /tmp/notepad
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use notepad_mm::app::domain::FileRef;
use notepad_mm::app::infrastructure::clipboard::SystemClipboard;
use notepad_mm::app::infrastructure::editor::MemoryEditor;
use notepad_mm::app::infrastructure::kv_store::JsonFileStore;
use notepad_mm::app::infrastructure::notifier::ConsoleNotifier;
use notepad_mm::app::infrastructure::storage::FsStorage;
use notepad_mm::app::{AppState, Message};
use notepad_mm::ui::shell::{self, ShellCommand};

type App = AppState<FsStorage, SystemClipboard>;

/// Notepad-- - A minimalist multi-tab notepad
#[derive(Parser, Debug)]
#[command(name = "notepad-mm")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files to open on launch
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Directory holding the persisted session and settings
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Start with a single empty document instead of the saved session
    #[arg(long)]
    no_restore: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // RUST_LOG wins over -v when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(filter)
        .init();
}

fn store_path(data_dir: Option<PathBuf>) -> PathBuf {
    match data_dir {
        Some(dir) => dir.join("local_storage.json"),
        None => JsonFileStore::default_path(),
    }
}

fn print_view(app: &App) {
    println!("{}", shell::render_tab_bar(&app.tab_manager));
    if let Some(status) = app.status() {
        println!("{}", shell::render_status(&status, &app.settings));
    }
}

/// Run one shell command. Returns false when the shell should exit.
async fn execute(app: &mut App, command: ShellCommand) -> bool {
    match command {
        ShellCommand::Run(message) => app.dispatch(message).await,
        ShellCommand::Open(path) => {
            if let Some(path) = path {
                app.storage_mut().stage_open(path);
            }
            app.dispatch(Message::FileOpen).await;
            app.storage_mut().clear_staged();
        }
        ShellCommand::SaveAs(path) => {
            if let Some(path) = path {
                app.storage_mut().stage_save(path);
            }
            app.dispatch(Message::FileSaveAs).await;
            app.storage_mut().clear_staged();
        }
        ShellCommand::Switch(index) => match app.tab_manager.documents().get(index) {
            Some(doc) => {
                let id = doc.id;
                app.dispatch(Message::SwitchTab(id)).await;
            }
            None => println!("No tab {}", index + 1),
        },
        ShellCommand::Close(None) => app.dispatch(Message::CloseActiveTab).await,
        ShellCommand::Close(Some(index)) => match app.tab_manager.documents().get(index) {
            Some(doc) => {
                let id = doc.id;
                app.dispatch(Message::CloseTab(id)).await;
            }
            None => println!("No tab {}", index + 1),
        },
        ShellCommand::Show => {
            println!("{}", app.editor().content());
            if let Some(html) = app.preview_html() {
                println!("--- preview ---\n{}", html);
            }
        }
        ShellCommand::List => {
            for (i, doc) in app.tab_manager.documents().iter().enumerate() {
                println!(
                    "{:>3} {:<30} {:<12} {:?}",
                    i + 1,
                    doc.tab_label(),
                    doc.language.display_name(),
                    doc.state()
                );
            }
        }
        ShellCommand::Status => print_view(app),
        ShellCommand::History => {
            for (i, entry) in app.clipboard_history.entries().enumerate() {
                println!("{:>3} {}", i + 1, entry.replace('\n', "\\n"));
            }
        }
        ShellCommand::Help => println!("{}", shell::HELP),
        ShellCommand::Hint(usage) => println!("usage: {}", usage),
        ShellCommand::Quit => return false,
        ShellCommand::Empty => {}
    }
    true
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    tracing::info!("Starting Notepad-- v{}", env!("CARGO_PKG_VERSION"));

    let store = JsonFileStore::open(store_path(args.data_dir));
    let mut app = AppState::new(
        Box::new(MemoryEditor::new()),
        FsStorage::new(),
        SystemClipboard::new(),
        Box::new(store),
        Box::new(ConsoleNotifier),
    );
    app.start(!args.no_restore);

    for path in &args.files {
        let file_ref = FileRef::new(path.to_string_lossy());
        if let Err(e) = app.open_file_ref(file_ref).await {
            tracing::warn!("{}", e);
            eprintln!("{}", e);
        }
    }

    print_view(&app);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match shell::parse_command(&line) {
            Ok(command) => {
                let is_query = matches!(
                    command,
                    ShellCommand::Show
                        | ShellCommand::List
                        | ShellCommand::Status
                        | ShellCommand::History
                        | ShellCommand::Help
                        | ShellCommand::Hint(_)
                        | ShellCommand::Empty
                );
                if !execute(&mut app, command).await {
                    break;
                }
                if !is_query {
                    print_view(&app);
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    app.shutdown();
    tracing::info!("Session saved, exiting");
    Ok(())
}
