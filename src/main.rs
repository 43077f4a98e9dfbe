use std::{
    io::{self, Write},
    panic,
    path::PathBuf,
    str::FromStr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::Show,
    event::DisableMouseCapture,
    execute,
    style::ResetColor,
    terminal::{LeaveAlternateScreen, disable_raw_mode},
};
use tuirealm::{
    PollStrategy,
    terminal::{CrosstermTerminalAdapter, TerminalBridge},
};

use taskpulse::{
    app::{App, initial_theme_mode},
    logging::{init_logging, print_log_location},
    realm::{RootId, apply_message, init_application, should_quit},
    settings::Settings,
    store::{StoreWriter, TaskStore, default_store_path},
    theme::{ThemeMode, detect_host_preference},
    types::TaskIdGenerator,
};

const THEME_ENV: &str = "TASKPULSE_THEME";

#[derive(Parser, Debug)]
#[command(
    name = "taskpulse",
    about = "Animated task list for the terminal",
    long_about = "A single-screen to-do list with persisted tasks, a light/dark \
                  theme, and swipe-to-delete via mouse drag.",
    version = env!("TASKPULSE_BUILD_VERSION"),
    author
)]
struct Cli {
    /// Theme for this session; not persisted until toggled in the app
    #[arg(long, value_name = "light|dark")]
    theme: Option<String>,

    /// Path of the task database (defaults to the platform data directory)
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,
}

static TERMINAL_RESTORED: AtomicBool = AtomicBool::new(false);

#[tokio::main]
async fn main() -> Result<()> {
    let log_path = match init_logging() {
        Ok(path) => Some(path),
        Err(err) => {
            eprintln!("warning: failed to initialize logging: {err}");
            None
        }
    };
    if let Some(path) = log_path.as_ref() {
        install_panic_hook_with_log(path.clone());
    }

    let outcome = run_app().await;
    if let Some(path) = log_path.as_ref() {
        print_log_location(path);
    }
    outcome
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load();

    let store_path = match cli.store {
        Some(path) => path,
        None => default_store_path()?,
    };
    let store = TaskStore::open(&store_path)?;
    let mut ids = TaskIdGenerator::default();
    let initial = store.load_initial(&mut ids);

    let cli_theme = cli
        .theme
        .as_deref()
        .and_then(|value| ThemeMode::from_str(value).ok());
    let env_theme = std::env::var(THEME_ENV)
        .ok()
        .and_then(|value| ThemeMode::from_str(&value).ok());
    let theme_mode = initial_theme_mode(
        cli_theme,
        env_theme,
        initial.dark_mode,
        detect_host_preference(),
    );

    let tick_interval = Duration::from_millis(settings.tick_interval_ms);
    let writer = StoreWriter::spawn(store);
    let app = Arc::new(Mutex::new(App::new(
        initial,
        theme_mode,
        &settings,
        ids,
        Some(writer),
    )));

    let _guard = TerminalGuard;
    let mut terminal = setup_terminal()?;
    let mut realm = init_application(Arc::clone(&app), tick_interval)?;

    let mut redraw = true;
    while !should_quit(&app)? {
        if redraw {
            terminal
                .draw(|frame| realm.view(&RootId::Root, frame, frame.area()))
                .context("failed to render frame")?;
            redraw = false;
        }

        let messages = realm
            .tick(PollStrategy::Once)
            .context("failed to process tui-realm tick")?;

        if !messages.is_empty() {
            redraw = true;
        }

        for message in messages {
            apply_message(&app, message)?;
        }
    }

    let _ = terminal.disable_mouse_capture();
    let _ = terminal.disable_raw_mode();
    let _ = terminal.leave_alternate_screen();
    let _ = terminal.clear_screen();
    TERMINAL_RESTORED.store(true, Ordering::SeqCst);

    // drain any queued snapshot before exiting
    let writer = app
        .lock()
        .map_err(|_| anyhow::anyhow!("failed to lock app state"))?
        .take_writer();
    if let Some(writer) = writer {
        writer.shutdown().await;
    }

    Ok(())
}

fn setup_terminal() -> Result<TerminalBridge<CrosstermTerminalAdapter>> {
    TERMINAL_RESTORED.store(false, Ordering::SeqCst);

    let mut terminal =
        TerminalBridge::new_crossterm().context("failed to initialize terminal bridge")?;

    terminal
        .enable_raw_mode()
        .context("failed to enable raw mode")?;
    terminal
        .enter_alternate_screen()
        .context("failed to enter alternate screen")?;
    terminal
        .enable_mouse_capture()
        .context("failed to enable mouse capture")?;

    Ok(terminal)
}

fn install_panic_hook_with_log(log_path: std::path::PathBuf) {
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        eprintln!();
        eprintln!("═══════════════════════════════════════════════════════════════");
        eprintln!("  📝 Log file: {}", log_path.display());
        eprintln!("═══════════════════════════════════════════════════════════════");
        eprintln!();
        previous_hook(panic_info);
    }));
}

fn restore_terminal() -> Result<()> {
    if TERMINAL_RESTORED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let _ = disable_raw_mode();

    let mut stderr = io::stderr();
    let _ = execute!(
        stderr,
        LeaveAlternateScreen,
        DisableMouseCapture,
        Show,
        ResetColor
    );
    let _ = stderr.write_all(
        b"\x1b[?1049l\x1b[?1000l\x1b[?1002l\x1b[?1003l\x1b[?1004l\x1b[?1006l\x1b[?1015l\x1b[?2004l\x1b[?7h\x1b[?25h\x1b[0m\x1b[2J\x1b[H",
    );
    let _ = stderr.flush();

    Ok(())
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}
