use chrono::{DateTime, Utc};
use ratatui::widgets::TableState;
use crate::board::{self, BoardColumn};
use crate::clock::Clock;
use crate::commands::parse_instant;
use crate::error::{Error, Result};
use crate::facility::{Facility, TaskRow};
use crate::filter::{HouseItemFilter, MemberFilter, SearchTerm};
use crate::models::{MaintenanceDraft, MaintenanceTask};
use crate::schedule::{Frequency, TaskStatus};
use crate::storage::Repository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Maintenance,
    Board,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    None,
    Search,
    LastCompleted,
    Frequency,
}

pub struct App<R: Repository, C: Clock> {
    pub facility: Facility<R, C>,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    /// Search term shared by both views.
    pub search: String,
    pub state: TableState,
    pub board_column: usize,
    pub board_row: usize,
    /// Outcome of the last action, shown in the help bar.
    pub message: Option<String>,
}

impl<R: Repository, C: Clock> App<R, C> {
    pub fn new(facility: Facility<R, C>) -> App<R, C> {
        let mut app = App {
            facility,
            view_mode: ViewMode::Maintenance,
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            search: String::new(),
            state: TableState::default(),
            board_column: 0,
            board_row: 0,
            message: None,
        };
        app.reload();
        app
    }

    /// Maintenance rows matching the search, soonest due first and
    /// completed tasks last.
    pub fn visible_tasks(&self) -> Vec<TaskRow<'_>> {
        let filter = HouseItemFilter {
            house_id: None,
            term: SearchTerm::new(&self.search),
        };
        let mut rows: Vec<TaskRow<'_>> = self
            .facility
            .maintenance_tasks()
            .into_iter()
            .filter(|r| filter.matches(&r.task.house_id, &r.task.task_name))
            .collect();
        rows.sort_by_key(|r| (r.status == TaskStatus::Completed, r.task.next_due_date()));
        rows
    }

    pub fn board(&self) -> Vec<BoardColumn<'_>> {
        let filter = MemberFilter {
            term: SearchTerm::new(&self.search),
            ..MemberFilter::default()
        };
        board::build(self.facility.data(), &filter)
    }

    /// Clamps selections after the data or the search changed.
    pub fn reload(&mut self) {
        let task_count = self.visible_tasks().len();
        match self.state.selected() {
            _ if task_count == 0 => self.state.select(None),
            Some(i) if i >= task_count => self.state.select(Some(task_count - 1)),
            None => self.state.select(Some(0)),
            Some(_) => {}
        }

        let lens: Vec<usize> = self.board().iter().map(|c| c.members.len()).collect();
        if self.board_column >= lens.len() {
            self.board_column = lens.len().saturating_sub(1);
        }
        let len = lens.get(self.board_column).copied().unwrap_or(0);
        if self.board_row >= len {
            self.board_row = len.saturating_sub(1);
        }
    }

    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Maintenance => ViewMode::Board,
            ViewMode::Board => ViewMode::Maintenance,
        };
        self.message = None;
    }

    fn column_len(&self) -> usize {
        self.board()
            .get(self.board_column)
            .map_or(0, |c| c.members.len())
    }

    /// Selects the next row, wrapping around.
    pub fn next(&mut self) {
        match self.view_mode {
            ViewMode::Maintenance => {
                let len = self.visible_tasks().len();
                if len == 0 { return; }
                let i = match self.state.selected() {
                    Some(i) if i + 1 < len => i + 1,
                    _ => 0,
                };
                self.state.select(Some(i));
            }
            ViewMode::Board => {
                let len = self.column_len();
                if len == 0 { return; }
                self.board_row = if self.board_row + 1 < len { self.board_row + 1 } else { 0 };
            }
        }
    }

    /// Selects the previous row, wrapping around.
    pub fn previous(&mut self) {
        match self.view_mode {
            ViewMode::Maintenance => {
                let len = self.visible_tasks().len();
                if len == 0 { return; }
                let i = match self.state.selected() {
                    Some(0) | None => len - 1,
                    Some(i) => i - 1,
                };
                self.state.select(Some(i));
            }
            ViewMode::Board => {
                let len = self.column_len();
                if len == 0 { return; }
                self.board_row = if self.board_row == 0 { len - 1 } else { self.board_row - 1 };
            }
        }
    }

    /// Moves the board cursor one column left (`-1`) or right (`1`).
    pub fn shift_column(&mut self, delta: isize) {
        if self.view_mode != ViewMode::Board { return; }
        let count = self.board().len();
        if let Some(col) = self.board_column.checked_add_signed(delta).filter(|c| *c < count) {
            self.board_column = col;
            self.board_row = 0;
        }
    }

    pub fn selected_task(&self) -> Option<&MaintenanceTask> {
        let i = self.state.selected()?;
        self.visible_tasks().get(i).map(|r| r.task)
    }

    fn selected_task_id(&self) -> Option<String> {
        self.selected_task().map(|t| t.id.clone())
    }

    fn report(&mut self, outcome: Result<String>) {
        self.message = Some(match outcome {
            Ok(msg) => msg,
            Err(e) => format!("Error: {}", e),
        });
        self.reload();
    }

    /// Marks the selected maintenance task done.
    pub fn complete_selected(&mut self) {
        if self.view_mode != ViewMode::Maintenance { return; }
        if let Some(id) = self.selected_task_id() {
            let outcome = self.facility.complete_maintenance_task(&id);
            let outcome = outcome.map(|t| {
                format!("{} completed; next due {}", t.task_name, self.local_day(t.next_due_date()))
            });
            self.report(outcome);
        }
    }

    /// Puts the selected task back on its derived status.
    pub fn revert_selected(&mut self) {
        if self.view_mode != ViewMode::Maintenance { return; }
        if let Some(id) = self.selected_task_id() {
            let outcome = self.facility.revert_maintenance_task(&id);
            let outcome = outcome
                .map(|t| format!("{} is {}", t.task_name, t.status_on(self.facility.clock()).display_name()));
            self.report(outcome);
        }
    }

    /// Moves the selected member to the neighbouring column.
    pub fn move_selected(&mut self, delta: isize) {
        if self.view_mode != ViewMode::Board { return; }
        let (target, mv) = {
            let columns = self.board();
            let Some(member) = columns
                .get(self.board_column)
                .and_then(|c| c.members.get(self.board_row))
            else {
                return;
            };
            let Some(target) = self
                .board_column
                .checked_add_signed(delta)
                .filter(|t| *t < columns.len())
            else {
                return;
            };
            (target, board::drop_on(member, columns[target].column))
        };
        let Some(mv) = mv else { return };

        let outcome = self
            .facility
            .move_member(&mv.member_id, mv.to.as_deref())
            .map(|_| format!("{} moved", mv.member_id));
        let moved = outcome.is_ok();
        self.report(outcome);
        if moved {
            self.board_column = target;
            self.board_row = self
                .board()
                .get(target)
                .and_then(|c| c.members.iter().position(|m| m.id == mv.member_id))
                .unwrap_or(0);
        }
    }

    /// Opens the input box for `field`, prefilled with the current value.
    pub fn start_edit(&mut self, field: InputField) {
        let current = match field {
            InputField::Search => Some(self.search.clone()),
            InputField::LastCompleted if self.view_mode == ViewMode::Maintenance => self
                .selected_task()
                .map(|t| self.local_day(t.last_completed_date())),
            InputField::Frequency if self.view_mode == ViewMode::Maintenance => {
                self.selected_task().map(|t| t.frequency().to_string())
            }
            _ => None,
        };
        if let Some(value) = current {
            self.input_field = field;
            self.input_buffer = value;
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
    }

    /// Applies the input box.
    pub fn handle_input(&mut self) {
        let value = std::mem::take(&mut self.input_buffer);
        match self.input_field {
            InputField::Search => {
                self.search = value.trim().to_string();
                self.state.select(None);
                self.board_row = 0;
                self.reload();
            }
            InputField::LastCompleted | InputField::Frequency => {
                let outcome = self.edit_selected_task(&value);
                self.report(outcome);
            }
            InputField::None => {}
        }
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
    }

    fn edit_selected_task(&mut self, value: &str) -> Result<String> {
        let task = self
            .selected_task()
            .ok_or_else(|| Error::Validation("no task selected".into()))?;
        let id = task.id.clone();
        let mut draft = MaintenanceDraft::from(task);
        match self.input_field {
            InputField::LastCompleted => draft.last_completed_date = parse_instant(value, self.facility.clock())?,
            InputField::Frequency => draft.frequency = value.parse::<Frequency>()?,
            _ => {}
        }
        let task = self.facility.update_maintenance_task(&id, draft)?;
        Ok(format!("{} now due {}", task.task_name, self.local_day(task.next_due_date())))
    }

    /// `YYYY-MM-DD` of an instant on the user's calendar.
    pub fn local_day(&self, at: DateTime<Utc>) -> String {
        self.facility.clock().local(at).format("%Y-%m-%d").to_string()
    }
}
