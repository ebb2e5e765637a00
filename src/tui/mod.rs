pub mod app;
pub mod ui;

use std::{error::Error, io};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use crate::clock::Clock;
use crate::facility::Facility;
use crate::storage::Repository;
use app::{App, InputField, InputMode};
use ui::ui;

pub fn run_tui<R: Repository, C: Clock>(facility: Facility<R, C>) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(facility);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: Backend, R: Repository, C: Clock>(terminal: &mut Terminal<B>, app: &mut App<R, C>) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.input_mode {
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Left | KeyCode::Char('h') => app.shift_column(-1),
                    KeyCode::Right | KeyCode::Char('l') => app.shift_column(1),
                    KeyCode::Char('H') | KeyCode::Char('<') => app.move_selected(-1),
                    KeyCode::Char('L') | KeyCode::Char('>') => app.move_selected(1),
                    KeyCode::Char(' ') => app.complete_selected(),
                    KeyCode::Char('r') => app.revert_selected(),
                    KeyCode::Char('t') => app.start_edit(InputField::LastCompleted),
                    KeyCode::Char('f') => app.start_edit(InputField::Frequency),
                    KeyCode::Char('/') => app.start_edit(InputField::Search),
                    KeyCode::Char('v') | KeyCode::Tab => app.toggle_view(),
                    _ => {}
                },
                InputMode::Editing => match key.code {
                    KeyCode::Enter => app.handle_input(),
                    KeyCode::Esc => app.cancel_input(),
                    KeyCode::Char(c) => {
                        app.input_buffer.push(c);
                    }
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                    }
                    _ => {}
                }
            }
        }
    }
}
