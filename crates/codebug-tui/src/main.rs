//! Terminal code editor with an analysis result pane.
//!
//! Built with crossterm and ratatui on top of `codebug-editor`.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p codebug-tui -- --file snippet.py --endpoint http://127.0.0.1:6060
//! ```
//!
//! # Shortcuts
//!
//! - Arrows / Home / End / PageUp / PageDown / Ctrl+Home / Ctrl+End: move the cursor
//! - Enter / Tab / Backspace / Delete: edit
//! - Ctrl+R or F5: analyze the code
//! - Ctrl+L: clear the editor and the result
//! - Alt+Up / Alt+Down: scroll the result pane
//! - Ctrl+Q: quit

mod app;
mod cli;
mod logging;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use cli::CliArgs;
use codebug_editor::HighlightingEngine;
use codebug_editor_highlight_simple::RegexHighlighter;
use codebug_editor_http::HttpAnalysisService;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{fs, io::stdout, sync::Arc, time::Duration};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let _log_guard = logging::init(args.log_file.as_deref())?;

    let text = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => String::new(),
    };

    let engine: Option<Box<dyn HighlightingEngine>> = if args.plain {
        None
    } else {
        match RegexHighlighter::python_default() {
            Ok(highlighter) => Some(Box::new(highlighter)),
            Err(err) => {
                tracing::warn!(%err, "python highlighting unavailable, using plain text");
                None
            }
        }
    };

    let config = args.service_config();
    tracing::info!(endpoint = %config.base_url, timeout = ?config.timeout, "starting");
    let service = HttpAnalysisService::with_config(config);
    let probe = service.clone();

    let mut app = App::new(text, engine, Arc::new(service), args.endpoint.clone());
    app.watch_health(move || probe.health().map(|_| ()).map_err(|err| err.to_string()));

    enable_raw_mode()?;
    let panic_hook = logging::PanicToLog::install();
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    drop(panic_hook);

    result
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| ui::render(app, f))?;

        if app.should_quit() {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key_event(key),
                Event::Paste(text) => app.handle_paste(text),
                _ => {}
            }
        }
    }

    tracing::info!("exiting");
    Ok(())
}
