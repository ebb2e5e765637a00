use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table},
    Frame,
};
use crate::clock::Clock;
use crate::schedule::{days_until, TaskStatus};
use crate::storage::Repository;
use super::app::{App, InputField, InputMode, ViewMode};

fn status_style(status: TaskStatus) -> Style {
    let color = match status {
        TaskStatus::Overdue => Color::Red,
        TaskStatus::DueToday | TaskStatus::DueSoon => Color::Yellow,
        TaskStatus::Upcoming => Color::Blue,
        TaskStatus::Completed => Color::Green,
    };
    Style::default().fg(color)
}

pub fn ui<R: Repository, C: Clock>(f: &mut Frame, app: &mut App<R, C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Main view
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    match app.view_mode {
        ViewMode::Maintenance => render_maintenance(f, app, chunks[0]),
        ViewMode::Board => render_board(f, app, chunks[0]),
    }

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view_mode {
            ViewMode::Maintenance => "q: Quit | Space: Complete | r: Revert | t: Last Done | f: Frequency | /: Search | v: Board",
            ViewMode::Board => "q: Quit | h/l: Column | j/k: Member | H/L: Move Member | /: Search | v: Maintenance",
        },
        InputMode::Editing => "Enter: Save | Esc: Cancel",
    };
    let mut help_block = Block::default().borders(Borders::ALL);
    if let Some(msg) = &app.message {
        help_block = help_block.title(msg.as_str());
    }
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(help_block);
    f.render_widget(help, chunks[1]);

    if app.input_mode == InputMode::Editing {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        let title = match app.input_field {
            InputField::Search => "Search",
            InputField::LastCompleted => "Last Completed (YYYY-MM-DD)",
            InputField::Frequency => "Frequency (weekly, monthly, quarterly, semi-annually, annually)",
            InputField::None => "",
        };
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(input, area);
    }
}

fn render_maintenance<R: Repository, C: Clock>(f: &mut Frame, app: &mut App<R, C>, area: Rect) {
    let today = app.facility.today();
    let rows: Vec<Row> = app
        .visible_tasks()
        .into_iter()
        .map(|r| {
            let t = r.task;
            let house = app
                .facility
                .house(&t.house_id)
                .map(|h| h.name.clone())
                .unwrap_or_else(|| t.house_id.clone());
            let days = days_until(app.facility.clock().local(t.next_due_date()), today);
            let due_in = if days < 0 {
                format!("{}d overdue", days.abs())
            } else if days == 0 {
                "Today".to_string()
            } else {
                format!("{}d", days)
            };
            Row::new(vec![
                Cell::from(t.id.clone()),
                Cell::from(t.task_name.clone()),
                Cell::from(house),
                Cell::from(t.frequency().display_name()),
                Cell::from(app.local_day(t.last_completed_date())),
                Cell::from(app.local_day(t.next_due_date())),
                Cell::from(due_in),
                Cell::from(r.status.display_name()),
            ])
            .style(status_style(r.status))
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(20),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(10),
    ];

    let title = if app.search.is_empty() {
        "Carehouse - Maintenance".to_string()
    } else {
        format!("Carehouse - Maintenance (search: {})", app.search)
    };
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["ID", "Task", "House", "Frequency", "Last Done", "Next Due", "Due In", "Status"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_board<R: Repository, C: Clock>(f: &mut Frame, app: &App<R, C>, area: Rect) {
    let columns = app.board();
    if columns.is_empty() {
        return;
    }
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, columns.len() as u32); columns.len()])
        .split(area);

    for (i, (col, rect)) in columns.iter().zip(areas.iter()).enumerate() {
        let selected = i == app.board_column;
        let items: Vec<ListItem> = col
            .members
            .iter()
            .map(|m| ListItem::new(format!("{}\n  {}", m.full_name, m.label)))
            .collect();
        let border_style = if selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(format!("{} ({})", col.column.title(), col.headline())),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if selected && !col.members.is_empty() {
            state.select(Some(app.board_row));
        }
        f.render_stateful_widget(list, *rect, &mut state);
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(r.height.saturating_sub(height) / 2),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
