use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use esms::{
    delete_employee, format_dob, get_employee, search_employees, Employee, EmployeeId,
    EmployeeRegistry, Field, SaveOutcome,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use rusqlite::Connection;
use std::io;
use tracing::error;

/// Rows skipped by PageUp / PageDown
const PAGE_SIZE: usize = 20;

/// Longest phone number the form lets you type
const MAX_CONTACT_LEN: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Search,
    ConfirmDelete(EmployeeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    fn info(text: impl Into<String>) -> Self {
        StatusMessage {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        StatusMessage {
            text: text.into(),
            is_error: true,
        }
    }
}

// ============================================================================
// FORM
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct FormState {
    /// Record being edited; None registers a new one
    pub editing: Option<EmployeeId>,
    pub values: Employee,
    pub focus: usize,
}

impl FormState {
    fn new_record() -> Self {
        FormState::default()
    }

    fn edit(emp: Employee) -> Self {
        FormState {
            editing: emp.id,
            values: emp,
            focus: 0,
        }
    }

    pub fn focused_field(&self) -> Field {
        Field::ALL[self.focus]
    }

    fn focus_on(&mut self, field: Field) {
        if let Some(i) = Field::ALL.iter().position(|f| *f == field) {
            self.focus = i;
        }
    }

    fn next_field(&mut self) {
        self.focus = (self.focus + 1) % Field::ALL.len();
    }

    fn previous_field(&mut self) {
        self.focus = (self.focus + Field::ALL.len() - 1) % Field::ALL.len();
    }

    /// Step a choice field through its value set. Unknown or empty values
    /// start from either end.
    fn cycle_choice(&mut self, forward: bool) {
        let field = self.focused_field();
        let Some(choices) = field.choices() else {
            return;
        };

        let current = choices.iter().position(|c| *c == self.values.get(field));
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % choices.len(),
            (Some(i), false) => (i + choices.len() - 1) % choices.len(),
            (None, true) => 0,
            (None, false) => choices.len() - 1,
        };
        self.values.set(field, choices[next]);
    }

    fn type_char(&mut self, c: char) {
        let field = self.focused_field();
        if field.choices().is_some() {
            return;
        }

        let value = self.values.get_mut(field);
        // contact takes digits only, up to 11
        if field == Field::Contact && (!c.is_ascii_digit() || value.len() >= MAX_CONTACT_LEN) {
            return;
        }
        value.push(c);
    }

    fn backspace(&mut self) {
        let field = self.focused_field();
        if field.choices().is_some() {
            self.values.set(field, "");
        } else {
            self.values.get_mut(field).pop();
        }
    }
}

// ============================================================================
// APP
// ============================================================================

pub struct App<'a> {
    conn: &'a Connection,
    pub employees: Vec<Employee>,
    pub state: TableState,
    pub page: Page,
    pub mode: Mode,
    pub search: String,
    pub form: FormState,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(conn: &'a Connection) -> Result<Self> {
        let mut app = App {
            conn,
            employees: Vec::new(),
            state: TableState::default(),
            page: Page::Dashboard,
            mode: Mode::Browse,
            search: String::new(),
            form: FormState::new_record(),
            status: None,
            should_quit: false,
        };
        app.refresh()?;
        Ok(app)
    }

    /// Reload the list for the current search text
    pub fn refresh(&mut self) -> Result<()> {
        self.employees = search_employees(self.conn, self.search.trim())?;

        let selected = match self.state.selected() {
            _ if self.employees.is_empty() => None,
            Some(i) => Some(i.min(self.employees.len() - 1)),
            None => Some(0),
        };
        self.state.select(selected);
        Ok(())
    }

    pub fn selected_employee(&self) -> Option<&Employee> {
        self.state.selected().and_then(|i| self.employees.get(i))
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.page {
            Page::Dashboard => match self.mode {
                Mode::Browse => self.handle_browse_key(key),
                Mode::Search => self.handle_search_key(key),
                Mode::ConfirmDelete(id) => self.handle_confirm_key(key, id),
            },
            Page::Form => self.handle_form_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
                self.status = None;
            }
            KeyCode::Char('a') => self.open_form(FormState::new_record()),
            KeyCode::Char('e') | KeyCode::Enter => match self.selected_id() {
                Some(id) => match get_employee(self.conn, id)? {
                    Some(emp) => self.open_form(FormState::edit(emp)),
                    None => {
                        self.status = Some(StatusMessage::error("That record no longer exists."));
                        self.refresh()?;
                    }
                },
                None => self.status = Some(StatusMessage::error("Please select a staff record.")),
            },
            KeyCode::Char('d') | KeyCode::Delete => match self.selected_id() {
                Some(id) => self.mode = Mode::ConfirmDelete(id),
                None => self.status = Some(StatusMessage::error("Please select a staff record.")),
            },
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home if !self.employees.is_empty() => self.state.select(Some(0)),
            KeyCode::End if !self.employees.is_empty() => {
                self.state.select(Some(self.employees.len() - 1))
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter => self.mode = Mode::Browse,
            KeyCode::Esc => {
                self.search.clear();
                self.mode = Mode::Browse;
                self.refresh()?;
            }
            KeyCode::Backspace => {
                self.search.pop();
                self.refresh()?;
            }
            KeyCode::Char(c) => {
                self.search.push(c);
                self.refresh()?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, id: EmployeeId) -> Result<()> {
        self.mode = Mode::Browse;

        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            match delete_employee(self.conn, id) {
                Ok(_) => self.status = Some(StatusMessage::info("Record deleted.")),
                Err(e) => {
                    error!(id, error = %e, "delete failed");
                    self.status = Some(StatusMessage::error(format!("System Error: Failed to delete record: {}", e)));
                }
            }
            self.refresh()?;
        } else {
            self.status = None;
        }
        Ok(())
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => {
                self.page = Page::Dashboard;
                self.status = None;
            }
            KeyCode::F(2) => self.submit_form()?,
            KeyCode::Char('s') if ctrl => self.submit_form()?,
            KeyCode::Down | KeyCode::Tab => self.form.next_field(),
            KeyCode::Up | KeyCode::BackTab => self.form.previous_field(),
            KeyCode::Right => self.form.cycle_choice(true),
            KeyCode::Left => self.form.cycle_choice(false),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(c) if !ctrl => self.form.type_char(c),
            _ => {}
        }
        Ok(())
    }

    /// Run the save sequence. Rejections and storage errors stay on the form.
    fn submit_form(&mut self) -> Result<()> {
        let registry = EmployeeRegistry::new(self.conn);

        match registry.save(&self.form.values, self.form.editing) {
            Ok(SaveOutcome::Rejected(rejection)) => {
                self.form.focus_on(rejection.field());
                self.status = Some(StatusMessage::error(format!("{}: {}", rejection.title(), rejection)));
            }
            Ok(_) => {
                self.page = Page::Dashboard;
                self.status = Some(StatusMessage::info("Record saved successfully."));
                self.refresh()?;
            }
            Err(e) => {
                error!(error = %e, "save failed");
                self.status = Some(StatusMessage::error(format!("System Error: Failed to save record: {}", e)));
            }
        }
        Ok(())
    }

    fn open_form(&mut self, form: FormState) {
        self.form = form;
        self.page = Page::Form;
        self.status = None;
    }

    fn selected_id(&self) -> Option<EmployeeId> {
        self.selected_employee().and_then(|e| e.id)
    }

    pub fn next(&mut self) {
        let len = self.employees.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.employees.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.employees.len();
        if len == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + PAGE_SIZE).min(len - 1));
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.employees.is_empty() {
            return;
        }
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(PAGE_SIZE));
        self.state.select(Some(i));
    }
}

// ============================================================================
// TERMINAL LOOP
// ============================================================================

pub fn run(conn: &Connection) -> Result<()> {
    let mut app = App::new(conn)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key)?;
            }
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header + search
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.page {
        Page::Dashboard => render_table(f, chunks[1], app),
        Page::Form => render_form(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            "ESMS",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
    ];

    match app.page {
        Page::Dashboard => {
            spans.push(Span::styled(
                format!("Employees: {}", app.employees.len()),
                Style::default().fg(Color::White),
            ));
            spans.push(Span::raw("  |  "));

            let searching = app.mode == Mode::Search;
            spans.push(Span::styled(
                "Search: ",
                Style::default().fg(if searching { Color::Yellow } else { Color::DarkGray }),
            ));
            spans.push(Span::raw(app.search.clone()));
            if searching {
                spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
            }
        }
        Page::Form => {
            let title = if app.form.editing.is_some() {
                "Edit Details"
            } else {
                "New Staff"
            };
            spans.push(Span::styled(
                title,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
        }
    }

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["NAME", "DOB", "POSITION"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.employees.iter().map(|emp| {
        let color = match emp.status.as_str() {
            "ACTIVE" => Color::White,
            "ON LEAVE" => Color::Yellow,
            _ => Color::DarkGray,
        };

        Row::new(vec![
            Cell::from(emp.name.clone()),
            Cell::from(format_dob(&emp.dob)),
            Cell::from(emp.position.clone()),
        ])
        .style(Style::default().fg(color))
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(45),
            Constraint::Percentage(30),
            Constraint::Percentage(25),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Staff "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let label_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut content = vec![Line::from("")];

    for (i, field) in Field::ALL.iter().enumerate() {
        let focused = i == app.form.focus;
        let value = app.form.values.get(*field);

        let marker = if focused {
            Span::styled("→ ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            Span::raw("  ")
        };

        let shown = match (field.choices(), focused) {
            (Some(_), true) => format!("◀ {} ▶", value),
            (Some(_), false) => value.to_string(),
            (None, true) => format!("{}_", value),
            (None, false) => value.to_string(),
        };
        let value_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };

        content.push(Line::from(vec![
            marker,
            Span::styled(field.label().to_uppercase(), label_style),
        ]));
        content.push(Line::from(vec![Span::raw("    "), Span::styled(shown, value_style)]));
        content.push(Line::from(""));
    }

    let title = if app.form.editing.is_some() {
        " Save Changes "
    } else {
        " Register Staff "
    };

    let form = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title),
    );

    f.render_widget(form, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let mut spans = Vec::new();

    if let Some(status) = &app.status {
        let color = if status.is_error { Color::Red } else { Color::Green };
        spans.push(Span::styled(format!(" {} ", status.text), Style::default().fg(color)));
        spans.push(Span::raw(" | "));
    }

    match (app.page, app.mode) {
        (Page::Dashboard, Mode::ConfirmDelete(_)) => {
            spans.push(Span::styled(
                "Are you sure you want to delete this staff record? ",
                Style::default().fg(Color::Red),
            ));
            spans.push(key("y"));
            spans.push(Span::raw(" Yes | any other key No"));
        }
        (Page::Dashboard, Mode::Search) => {
            spans.push(Span::raw("Type to filter | "));
            spans.push(key("Enter"));
            spans.push(Span::raw(" Keep | "));
            spans.push(key("Esc"));
            spans.push(Span::raw(" Clear"));
        }
        (Page::Dashboard, Mode::Browse) => {
            spans.push(key("a"));
            spans.push(Span::raw(" Add | "));
            spans.push(key("e"));
            spans.push(Span::raw(" Edit | "));
            spans.push(key("d"));
            spans.push(Span::raw(" Delete | "));
            spans.push(key("/"));
            spans.push(Span::raw(" Search | "));
            spans.push(Span::styled("q", Style::default().fg(Color::Red)));
            spans.push(Span::raw(" Quit"));
        }
        (Page::Form, _) => {
            spans.push(key("↑/↓"));
            spans.push(Span::raw(" Field | "));
            spans.push(key("←/→"));
            spans.push(Span::raw(" Choose | "));
            spans.push(key("Ctrl-S"));
            spans.push(Span::raw(" Save | "));
            spans.push(key("Esc"));
            spans.push(Span::raw(" Cancel"));
        }
    }

    let status_bar = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::White)));

    f.render_widget(status_bar, area);
}
