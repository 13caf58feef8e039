//! Interactive template picker
//!
//! A full-screen terminal picker over the template index:
//! - Arrow/vim-style navigation through the result list
//! - Filter mode for instant search (/) backed by the search engine
//! - Enter picks the highlighted template and exits

mod app;
mod views;

pub use app::{App, InputMode};

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use templateindex::{TemplateIndex, TemplateRecord};

/// The terminal the picker draws to
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// How long one draw pass waits for input before redrawing
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Put the terminal into raw mode on the alternate screen
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Hand the terminal back to the shell
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Run the picker over an index and return the chosen template, if any.
///
/// Blocks on terminal input; callers on an async runtime should wrap it
/// in `spawn_blocking`.
pub fn run(index: TemplateIndex) -> Result<Option<TemplateRecord>> {
    let mut terminal = init()?;

    // Restore runs on every exit path, draw errors included
    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore();
        }
    }
    let _guard = TerminalGuard;

    let mut app = App::new(index);
    while !app.should_quit {
        terminal.draw(|frame| views::render(&app, frame))?;
        if let Some(key) = next_key(POLL_INTERVAL)? {
            app.handle_key(key);
        }
    }

    Ok(app.chosen)
}

/// Wait up to `timeout` for a key press. Resizes and key releases fall
/// through as `None`; the caller redraws on every pass anyway.
fn next_key(timeout: Duration) -> Result<Option<KeyEvent>> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        return Ok(Some(key));
    }
    Ok(None)
}
