//! Terminal interface: a table browser with pagination, create/edit
//! dialogs derived from column metadata, delete confirmation, and a
//! persisted dark-mode preference.

mod components;
mod dialog;

pub use components::{StatusKind, Theme};
pub use dialog::{ConfirmDialog, FormDialog, FormMode};

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::collections::HashSet;
use std::io::{self, Stdout};
use std::time::Duration;

use crate::crud::{self, Listing};
use crate::prefs::Preferences;
use crate::schema::{TableId, ALL_TABLES};
use crate::store::Store;
use components::{ListingPanel, Sidebar, StatusLine};

const PAGE_SIZE_CHOICES: &[u64] = &[25, 50, 100];

enum Dialog {
    Form(FormDialog),
    Confirm(ConfirmDialog),
}

/// Main application state.
pub struct App {
    store: Store,
    prefs: Preferences,
    table: TableId,
    page: u64,
    page_size: u64,
    listing: Listing,
    selected: usize,
    /// Row ids with their key-performance cell expanded
    expanded: HashSet<i64>,
    status: Option<(StatusKind, String)>,
    dialog: Option<Dialog>,
    should_quit: bool,
}

impl App {
    pub fn new(store: Store, page_size: u64, prefs: Preferences) -> Result<Self> {
        let page_size = page_size.clamp(1, crud::MAX_PAGE_SIZE);
        let table = TableId::Devices;
        let listing = crud::list(&store, table, page_size, 1)?;
        Ok(Self {
            store,
            prefs,
            table,
            page: 1,
            page_size,
            listing,
            selected: 0,
            expanded: HashSet::new(),
            status: None,
            dialog: None,
            should_quit: false,
        })
    }

    fn theme(&self) -> Theme {
        Theme {
            dark: self.prefs.dark_mode,
        }
    }

    /// Re-fetch the current page. Nothing is cached, so edits made
    /// elsewhere show up here.
    fn reload(&mut self) {
        match crud::list(&self.store, self.table, self.page_size, self.page) {
            Ok(listing) => {
                // Deleting the last row of the last page can leave the
                // cursor past the end
                if self.page > listing.total_pages {
                    self.page = listing.total_pages;
                    return self.reload();
                }
                self.selected = self.selected.min(listing.rows.len().saturating_sub(1));
                self.listing = listing;
            }
            Err(e) => self.notify(StatusKind::Error, e.user_message()),
        }
    }

    fn notify(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status = Some((kind, message.into()));
    }

    fn switch_table(&mut self, step: i64) {
        let current = ALL_TABLES.iter().position(|t| *t == self.table).unwrap_or(0);
        let len = ALL_TABLES.len() as i64;
        let next = ((current as i64 + step).rem_euclid(len)) as usize;
        self.table = ALL_TABLES[next];
        self.page = 1;
        self.selected = 0;
        self.expanded.clear();
        self.status = None;
        self.reload();
    }

    fn change_page(&mut self, step: i64) {
        let target = (self.page as i64 + step).clamp(1, self.listing.total_pages as i64) as u64;
        if target != self.page {
            self.page = target;
            self.selected = 0;
            self.reload();
        }
    }

    fn cycle_page_size(&mut self) {
        let current = PAGE_SIZE_CHOICES
            .iter()
            .position(|s| *s == self.page_size)
            .unwrap_or(0);
        self.page_size = PAGE_SIZE_CHOICES[(current + 1) % PAGE_SIZE_CHOICES.len()];
        self.page = 1;
        self.notify(StatusKind::Info, format!("Page size {}", self.page_size));
        self.reload();
    }

    fn toggle_dark_mode(&mut self) {
        self.prefs.dark_mode = !self.prefs.dark_mode;
        if let Err(e) = self.prefs.save() {
            self.notify(StatusKind::Warning, format!("Preference not saved: {}", e));
        }
    }

    fn selected_row_id(&self) -> Option<i64> {
        self.listing.rows.get(self.selected).map(|r| r.id)
    }

    fn toggle_expand(&mut self) {
        let Some(row) = self.listing.rows.get(self.selected) else {
            return;
        };
        if row.kp.is_none() {
            return;
        }
        let id = row.id;
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    fn open_create(&mut self) {
        match FormDialog::create(&self.store, self.table) {
            Ok(form) => self.dialog = Some(Dialog::Form(form)),
            Err(e) => self.notify(StatusKind::Error, e.user_message()),
        }
    }

    fn open_edit(&mut self) {
        let Some(id) = self.selected_row_id() else {
            return;
        };
        match FormDialog::edit(&self.store, self.table, id) {
            Ok(Some(form)) => self.dialog = Some(Dialog::Form(form)),
            Ok(None) => {
                self.notify(StatusKind::Warning, "Entry not found");
                self.reload();
            }
            Err(e) => self.notify(StatusKind::Error, e.user_message()),
        }
    }

    fn open_delete(&mut self) {
        if let Some(id) = self.selected_row_id() {
            self.dialog = Some(Dialog::Confirm(ConfirmDialog {
                table: self.table,
                id,
            }));
        }
    }

    /// Persist the open form. The dialog closes only on success; a
    /// failed save keeps the entered values on screen.
    fn submit_form(&mut self) {
        let Some(Dialog::Form(form)) = &self.dialog else {
            return;
        };

        let result = match form.mode {
            FormMode::Create => {
                crud::create(&self.store, form.table, &form.fields, &form.kp_fields)
                    .map(|_| (StatusKind::Success, "Entry created successfully"))
            }
            FormMode::Edit { id } => {
                crud::update(&self.store, form.table, id, &form.fields, &form.kp_fields).map(
                    |updated| {
                        if updated {
                            (StatusKind::Success, "Entry updated successfully")
                        } else {
                            (StatusKind::Warning, "Entry not found")
                        }
                    },
                )
            }
        };

        match result {
            Ok((kind, message)) => {
                self.notify(kind, message);
                self.dialog = None;
                self.reload();
            }
            Err(e) => self.notify(StatusKind::Error, e.user_message()),
        }
    }

    fn confirm_delete(&mut self) {
        let Some(Dialog::Confirm(confirm)) = &self.dialog else {
            return;
        };
        match crud::delete(&self.store, confirm.table, confirm.id) {
            Ok(true) => self.notify(StatusKind::Success, "Entry deleted successfully"),
            Ok(false) => self.notify(StatusKind::Warning, "Entry not found or already deleted"),
            Err(e) => self.notify(StatusKind::Error, e.user_message()),
        }
        self.dialog = None;
        self.reload();
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match &mut self.dialog {
            Some(Dialog::Form(form)) => match key.code {
                KeyCode::Esc => self.dialog = None,
                KeyCode::Enter => self.submit_form(),
                KeyCode::Up | KeyCode::BackTab => form.focus_prev(),
                KeyCode::Down | KeyCode::Tab => form.focus_next(),
                KeyCode::Left => {
                    if let Err(e) = form.cycle(&self.store, -1) {
                        self.notify(StatusKind::Error, e.user_message());
                    }
                }
                KeyCode::Right => {
                    if let Err(e) = form.cycle(&self.store, 1) {
                        self.notify(StatusKind::Error, e.user_message());
                    }
                }
                KeyCode::Backspace => form.backspace(),
                KeyCode::Char(c) => form.input_char(c),
                _ => {}
            },
            Some(Dialog::Confirm(_)) => match key.code {
                KeyCode::Enter | KeyCode::Char('y') => self.confirm_delete(),
                KeyCode::Esc | KeyCode::Char('n') => self.dialog = None,
                _ => {}
            },
            None => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Tab => self.switch_table(1),
                KeyCode::BackTab => self.switch_table(-1),
                KeyCode::Left => self.change_page(-1),
                KeyCode::Right => self.change_page(1),
                KeyCode::Up => self.selected = self.selected.saturating_sub(1),
                KeyCode::Down => {
                    self.selected =
                        (self.selected + 1).min(self.listing.rows.len().saturating_sub(1))
                }
                KeyCode::Enter => self.toggle_expand(),
                KeyCode::Char('n') => self.open_create(),
                KeyCode::Char('e') => self.open_edit(),
                KeyCode::Char('d') => self.open_delete(),
                KeyCode::Char('p') => self.cycle_page_size(),
                KeyCode::Char('m') => self.toggle_dark_mode(),
                _ => {}
            },
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        let theme = self.theme();

        let outer = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(20), Constraint::Min(40)])
            .split(frame.area());

        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(1)])
            .split(outer[1]);

        Sidebar::render(frame, outer[0], &theme, self.table);
        ListingPanel::render(
            frame,
            main[0],
            &theme,
            &self.listing,
            self.selected,
            &self.expanded,
        );
        StatusLine::render(frame, main[1], &theme, self.status.as_ref());

        match &self.dialog {
            Some(Dialog::Form(form)) => components::render_form_dialog(frame, &theme, form),
            Some(Dialog::Confirm(confirm)) => {
                components::render_confirm_dialog(frame, &theme, confirm)
            }
            None => {}
        }
    }
}

/// Run the browser until the user quits. Terminal state is restored on
/// the way out, panics included.
pub fn run(store: Store, page_size: u64, prefs: Preferences) -> Result<()> {
    let mut app = App::new(store, page_size, prefs)?;

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    terminal::disable_raw_mode().ok();
    terminal.backend_mut().execute(LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| app.draw(frame))?;

        if event::poll(Duration::from_millis(250))? {
            if let CrosstermEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }
    Ok(())
}
