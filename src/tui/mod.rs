//! Terminal browser for the directory tree
//!
//! Mounts the tree into an in-memory page and lets you walk it with the same
//! expand/collapse rules as the web widget. When the tree document is a local
//! file, writes to it remount the tree wholesale.

pub mod app;
pub mod events;
pub mod ui;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{poll, read, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::config::Config;
use crate::error::Result;
use crate::loader::Source;
use crate::mount::SoftNavigation;
use app::App;
use events::{handle_event, Flow};

/// Run the terminal browser
pub fn run(source: Source, config: Config) -> Result<()> {
    // Watch before the first mount so no write slips between load and watch
    let nav = match &source {
        Source::File(path) => match SoftNavigation::watch(path) {
            Ok(nav) => Some(nav),
            Err(e) => {
                log::warn!("not watching {}: {}", path.display(), e);
                None
            }
        },
        Source::Http(_) => None,
    };

    let mut app = App::new(source, config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;
    app.resize(size.width, size.height);

    // Run the app, ensuring cleanup happens even on error
    let result = run_event_loop(&mut terminal, &mut app, nav.as_ref());

    // Restore terminal - this MUST run even if the loop failed
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    result
}

fn run_event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    nav: Option<&SoftNavigation>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut show_help = false;

    loop {
        terminal.draw(|f| ui::draw(f, app, show_help))?;

        if poll(tick_rate)? {
            match read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_event(app, key, &mut show_help) == Flow::Quit {
                        return Ok(());
                    }
                }
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        // Check for file changes (non-blocking)
        if nav.map(SoftNavigation::poll).unwrap_or(false) {
            app.reload();
        }
    }
}
