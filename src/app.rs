//! Application state for the interactive journal.
//!
//! [`App`] owns the collection, the current [`ViewState`] and everything the
//! dashboard and form screens need. Key presses come in through
//! [`App::handle_key`]; work that has to leave the event loop (quitting, a
//! weather lookup) goes back out as a [`Command`].

use crate::announce::{Announcer, Priority, StatusLine};
use crate::debounce::Debouncer;
use crate::entry::{Entry, EntryId, WeatherSnapshot};
use crate::error::LookupError;
use crate::form::{EntryForm, FormField};
use crate::query::{self, mood_summary, DateFilter, Page, ViewState};
use crate::repository;
use crate::store::{assign_missing_ids, EntryStore};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Look up the weather for `city`. The result must be handed back to
    /// [`App::weather_result`] with the same `request` number.
    FetchWeather { request: u64, city: String },
    Quit,
}

pub struct App<S: EntryStore> {
    store: S,
    entries: Vec<Entry>,
    view: ViewState,
    page_size: NonZeroUsize,
    today: NaiveDate,
    page: Page,
    selected: usize,
    search_input: String,
    searching: bool,
    search_debounce: Debouncer<String>,
    undo: Option<Entry>,
    show_moods: bool,
    form: Option<EntryForm>,
    status: StatusLine,
    weather_request: u64,
}

impl<S: EntryStore> App<S> {
    pub fn new(store: S, page_size: NonZeroUsize, debounce: Duration, today: NaiveDate) -> Self {
        let mut status = StatusLine::new();
        if let Err(e) = store.ensure_identifiers() {
            warn!(error = %e, location = %store.location(), "Could not store assigned ids");
            status.announce("Could not save changes", Priority::Assertive);
        }

        let mut entries = store.load();
        assign_missing_ids(&mut entries);

        let view = ViewState::default();
        let page = query::query(&entries, &view, today, page_size);
        App {
            store,
            entries,
            view,
            page_size,
            today,
            page,
            selected: 0,
            search_input: String::new(),
            searching: false,
            search_debounce: Debouncer::new(debounce),
            undo: None,
            show_moods: false,
            form: None,
            status,
            weather_request: 0,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.page.entries.get(self.selected)
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// The entry that `u` would bring back, if any.
    pub fn pending_undo(&self) -> Option<&Entry> {
        self.undo.as_ref()
    }

    pub fn show_moods(&self) -> bool {
        self.show_moods
    }

    pub fn moods(&self) -> Vec<(String, usize)> {
        mood_summary(&self.entries)
    }

    pub fn form(&self) -> Option<&EntryForm> {
        self.form.as_ref()
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Moves the "today" filter to a new calendar day.
    pub fn set_today(&mut self, today: NaiveDate) {
        if today != self.today {
            debug!(%today, "Day changed");
            self.today = today;
            self.refresh();
        }
    }

    /// Earliest instant at which [`App::tick`] has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let status = self.status.current().map(|a| a.expires_at);
        [self.search_debounce.deadline(), status]
            .into_iter()
            .flatten()
            .min()
    }

    /// Fires a due search and expires old announcements. Returns whether the
    /// screen needs redrawing.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = self.status.clear_expired(now);
        if let Some(term) = self.search_debounce.poll(now) {
            self.apply_search(&term);
            changed = true;
        }
        changed
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Command::Quit);
        }

        if self.form.is_some() {
            self.handle_form_key(key)
        } else if self.searching {
            self.handle_search_key(key, now);
            None
        } else {
            self.handle_dashboard_key(key)
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) -> Option<Command> {
        // The mood panel keeps focus until it is closed.
        if self.show_moods {
            match key.code {
                KeyCode::Char('q') => return Some(Command::Quit),
                KeyCode::Char('m') | KeyCode::Esc => self.toggle_moods(),
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Char('q') => return Some(Command::Quit),
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('s') => self.toggle_sort(),
            KeyCode::Char('t') => self.toggle_date_filter(),
            KeyCode::Left | KeyCode::Char('h') => {
                self.go_to_page(self.page.page.saturating_sub(1));
            }
            KeyCode::Right | KeyCode::Char('l') => self.go_to_page(self.page.page + 1),
            KeyCode::Char(c @ '1'..='9') => self.go_to_page(usize::from(c as u8 - b'0')),
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.page.entries.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('u') => self.undo_delete(),
            KeyCode::Char('x') => self.dismiss_undo(),
            KeyCode::Char('m') => self.toggle_moods(),
            KeyCode::Char('n') => self.open_form(),
            _ => {}
        }
        None
    }

    fn handle_search_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.search_debounce.schedule(self.search_input.clone(), now);
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.search_debounce.schedule(self.search_input.clone(), now);
            }
            KeyCode::Enter | KeyCode::Esc => {
                self.searching = false;
                if let Some(term) = self.search_debounce.flush() {
                    self.apply_search(&term);
                }
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Command> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let on_location = self
            .form
            .as_ref()
            .is_some_and(|f| f.focus() == FormField::Location);

        match key.code {
            KeyCode::Esc => {
                self.close_form();
                self.status.announce("Entry discarded.", Priority::Polite);
                return None;
            }
            KeyCode::Char('s') if ctrl => {
                self.submit_form();
                return None;
            }
            KeyCode::Char('w') if ctrl => return self.request_weather(),
            KeyCode::Enter if on_location => return self.request_weather(),
            _ => {}
        }

        let form = self.form.as_mut()?;
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Left => form.cycle(false),
            KeyCode::Right => form.cycle(true),
            KeyCode::Enter if form.focus() == FormField::Content => form.insert_char('\n'),
            KeyCode::Enter => form.focus_next(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) if !ctrl => form.insert_char(c),
            _ => {}
        }
        None
    }

    fn apply_search(&mut self, term: &str) {
        self.set_view(self.view.clone().with_search(term));
        if !self.view.search().is_empty() {
            let count = self.page.total_matches;
            let noun = if count == 1 { "entry" } else { "entries" };
            self.status.announce(
                &format!("{count} {noun} match \"{}\"", self.view.search()),
                Priority::Polite,
            );
        }
    }

    fn toggle_sort(&mut self) {
        let sort = self.view.sort().toggled();
        self.set_view(self.view.clone().with_sort(sort));
        self.status.announce(
            &format!("Sorted {}", sort.label().to_lowercase()),
            Priority::Polite,
        );
    }

    fn toggle_date_filter(&mut self) {
        let filter = self.view.date_filter().toggled();
        self.set_view(self.view.clone().with_date_filter(filter));
        let message = match filter {
            DateFilter::All => "Showing all entries",
            DateFilter::TodayOnly => "Showing today's entries",
        };
        self.status.announce(message, Priority::Polite);
    }

    fn go_to_page(&mut self, page: usize) {
        if page == 0 || page > self.page.total_pages || page == self.page.page {
            return;
        }
        self.set_view(self.view.clone().with_page(page));
    }

    fn set_view(&mut self, view: ViewState) {
        debug!(?view, "View changed");
        self.view = view;
        self.selected = 0;
        self.refresh();
    }

    /// Recomputes the visible page and keeps the clamped page number.
    fn refresh(&mut self) {
        self.page = query::query(&self.entries, &self.view, self.today, self.page_size);
        if self.page.page != self.view.page() {
            self.view = self.view.clone().with_page(self.page.page);
        }
        self.selected = self.selected.min(self.page.entries.len().saturating_sub(1));
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.entries) {
            warn!(error = %e, location = %self.store.location(), "Could not save journal");
            self.status
                .announce(&format!("Could not save changes: {e}"), Priority::Assertive);
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_entry().map(|e| e.id.clone()) else {
            return;
        };
        let (remaining, removed) = repository::delete_by_id(&self.entries, &id);
        let Some(removed) = removed else {
            return;
        };

        info!(id = %removed.id, "Deleted entry");
        self.entries = remaining;
        self.status.announce(
            &format!("Entry \"{}\" deleted. Undo available.", removed.display_title()),
            Priority::Assertive,
        );
        self.undo = Some(removed);
        self.persist();
        self.refresh();
    }

    fn undo_delete(&mut self) {
        let Some(removed) = self.undo.take() else {
            self.status.announce("Nothing to undo.", Priority::Polite);
            return;
        };

        let title = removed.display_title().to_string();
        match repository::restore(&self.entries, removed) {
            Ok(entries) => {
                info!(%title, "Restored entry");
                self.entries = entries;
                self.status
                    .announce(&format!("Entry \"{title}\" restored."), Priority::Polite);
                self.persist();
                self.refresh();
            }
            Err(e) => {
                warn!(error = %e, "Could not restore entry");
                self.status
                    .announce(&format!("Could not restore entry: {e}"), Priority::Assertive);
            }
        }
    }

    fn dismiss_undo(&mut self) {
        if let Some(entry) = self.undo.take() {
            debug!(id = %entry.id, "Undo dismissed");
        }
    }

    fn toggle_moods(&mut self) {
        if self.show_moods {
            self.show_moods = false;
            self.status.announce("Mood tracker closed", Priority::Polite);
            return;
        }
        if self.entries.is_empty() {
            self.status
                .announce("No entries yet to analyse mood.", Priority::Polite);
            return;
        }
        self.show_moods = true;
        let count = self.moods().len();
        self.status.announce(
            &format!("Mood summary opened. Showing {count} different moods."),
            Priority::Polite,
        );
    }

    fn open_form(&mut self) {
        self.show_moods = false;
        self.form = Some(EntryForm::new(self.today));
    }

    /// Closing the form invalidates any lookup still in flight.
    fn close_form(&mut self) {
        self.form = None;
        self.weather_request += 1;
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let draft = match form.submit() {
            Ok(draft) => draft,
            Err(_) => {
                let summary = form.error_summary().unwrap_or_default();
                self.status.announce(
                    &format!("Form validation failed. {summary}"),
                    Priority::Assertive,
                );
                return;
            }
        };

        match repository::insert(&self.entries, draft.into_entry(EntryId::new())) {
            Ok(entries) => {
                info!(count = entries.len(), "Created entry");
                self.entries = entries;
                self.close_form();
                self.status
                    .announce("Journal entry created successfully.", Priority::Assertive);
                self.persist();
                self.set_view(self.view.clone().with_page(1));
            }
            Err(e) => {
                warn!(error = %e, "Could not create entry");
                self.status
                    .announce(&format!("Could not create entry: {e}"), Priority::Assertive);
            }
        }
    }

    fn request_weather(&mut self) -> Option<Command> {
        let form = self.form.as_mut()?;
        let Some(city) = form.request_weather() else {
            self.status.announce(
                "Enter a city name to fetch the weather.",
                Priority::Polite,
            );
            return None;
        };
        self.weather_request += 1;
        self.status.announce("Fetching weather data...", Priority::Polite);
        Some(Command::FetchWeather {
            request: self.weather_request,
            city,
        })
    }

    /// Applies a finished lookup. Results for anything but the latest request
    /// of the open form are dropped.
    pub fn weather_result(&mut self, request: u64, result: Result<WeatherSnapshot, LookupError>) {
        let Some(form) = self.form.as_mut() else {
            debug!(request, "Form closed, dropping weather result");
            return;
        };
        if request != self.weather_request {
            debug!(request, latest = self.weather_request, "Dropping stale weather result");
            return;
        }

        match result {
            Ok(weather) => {
                let message = format!(
                    "Weather updated. {}, {}",
                    weather.weather_type, weather.temperature
                );
                form.weather_fetched(weather);
                self.status.announce(&message, Priority::Polite);
            }
            Err(e) => {
                warn!(error = %e, "Weather lookup failed");
                form.weather_failed();
                self.status.announce(
                    "Weather fetch failed. Please try again.",
                    Priority::Assertive,
                );
            }
        }
    }
}
