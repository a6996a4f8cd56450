use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::azure::WorkItemClient;
use crate::config::{self, AppConfig};
use crate::edit::{
    adjacent_cell, cell_at, validate_commit, CellRef, Commit, Direction, EditField, EditSession,
    CELLS_PER_ITEM,
};
use crate::event::KeyAction;
use crate::filter::{self, format_hours, FilterState, Summary};
use crate::model::project::ProjectScope;
use crate::model::work_item::{WorkItem, WorkItems};
use crate::pipeline::{self, AggregationError};
use crate::state::{ViewEvent, ViewState};

const STATUS_TTL: Duration = Duration::from_secs(3);
const FLASH_TTL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub enum Action {
    Key(KeyAction),
    Tick,
    /// The terminal lost focus, which commits an open edit
    FocusLost,
    WorkItemsLoaded {
        generation: u64,
        result: Result<Vec<WorkItem>, String>,
    },
    FieldSaved {
        cell: CellRef,
        value: f64,
        result: Result<(), String>,
    },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct CellFlash {
    pub cell: CellRef,
    pub kind: FlashKind,
    at: Instant,
}

pub struct App {
    pub config: AppConfig,
    config_path: PathBuf,
    client: Arc<dyn WorkItemClient>,
    action_tx: mpsc::UnboundedSender<Action>,
    pub view: ViewState,
    pub items: WorkItems,
    pub filter: FilterState,
    pub input_mode: InputMode,
    /// Index into the flattened editable cells of the visible items
    pub focused_cell: Option<usize>,
    pub edit: Option<EditSession>,
    pub status: Option<StatusMessage>,
    pub flash: Option<CellFlash>,
    pub show_details: bool,
    pub show_help: bool,
    /// Settings list selection; 0 is "All projects"
    pub selected_project: usize,
    pub pending_delete: Option<String>,
    pub should_quit: bool,
    load_generation: u64,
    help_after_load: bool,
}

impl App {
    pub fn new(
        config: AppConfig,
        config_path: PathBuf,
        client: Arc<dyn WorkItemClient>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        let help_after_load = !config.walkthrough_shown;
        Self {
            config,
            config_path,
            client,
            action_tx,
            view: ViewState::Init,
            items: WorkItems::default(),
            filter: FilterState::default(),
            input_mode: InputMode::Normal,
            focused_cell: None,
            edit: None,
            status: None,
            flash: None,
            show_details: false,
            show_help: false,
            selected_project: 0,
            pending_delete: None,
            should_quit: false,
            load_generation: 0,
            help_after_load,
        }
    }

    /// Leave INIT: load when projects exist, otherwise show settings.
    pub fn start(&mut self) {
        let has_projects = !self.config.projects.is_empty();
        self.dispatch(ViewEvent::Startup { has_projects });
    }

    pub fn update(&mut self, action: Action) {
        match action {
            Action::Key(key) => self.handle_key(key),
            Action::Tick => self.expire_transients(),
            Action::FocusLost => self.blur(),
            Action::WorkItemsLoaded { generation, result } => {
                self.on_work_items_loaded(generation, result)
            }
            Action::FieldSaved {
                cell,
                value,
                result,
            } => self.on_field_saved(cell, value, result),
            Action::Quit => {
                self.should_quit = true;
            }
        }
    }

    // ---- view state ----

    /// Apply `event` to the view state and run the entry action of the new
    /// state. Returns whether the transition was valid.
    fn dispatch(&mut self, event: ViewEvent) -> bool {
        let Some(next) = self.view.on(&event) else {
            debug!(state = self.view.name(), ?event, "ignoring event");
            return false;
        };
        debug!(from = self.view.name(), to = next.name(), "view transition");
        self.view = next;
        self.on_enter();
        true
    }

    fn on_enter(&mut self) {
        match &self.view {
            ViewState::Init | ViewState::Saving => {}
            ViewState::Settings => {
                self.pending_delete = None;
                self.input_mode = InputMode::Normal;
                self.selected_project = self.selected_project.min(self.config.projects.len());
            }
            ViewState::Loading => self.begin_load(),
            ViewState::Loaded => {
                self.clamp_focus();
                if self.help_after_load {
                    self.help_after_load = false;
                    self.show_help = true;
                }
            }
            ViewState::Error(message) => {
                error!(%message, "loading work items failed");
            }
        }
    }

    fn begin_load(&mut self) {
        self.status = None;
        self.load_generation += 1;
        let generation = self.load_generation;
        let client = Arc::clone(&self.client);
        let projects = self.config.projects.clone();
        let scope = self.filter.project.clone();
        let tx = self.action_tx.clone();
        info!(generation, scope = %scope.label(&projects), "loading work items");

        tokio::spawn(async move {
            let load = tokio::spawn(async move {
                pipeline::load_work_items(client.as_ref(), &projects, &scope).await
            });
            let result = match load.await {
                Ok(result) => result,
                Err(e) => Err(AggregationError::Aborted(e.to_string())),
            };
            let _ = tx.send(Action::WorkItemsLoaded {
                generation,
                result: result.map_err(|e| e.to_string()),
            });
        });
    }

    fn on_work_items_loaded(&mut self, generation: u64, result: Result<Vec<WorkItem>, String>) {
        if generation != self.load_generation || self.view != ViewState::Loading {
            debug!(generation, current = self.load_generation, "discarding stale load");
            return;
        }
        match result {
            Ok(items) => {
                self.items.replace(items);
                info!(generation, count = self.items.len(), "work items loaded");
                self.prune_filters();
                self.dispatch(ViewEvent::LoadSucceeded);
            }
            Err(message) => {
                self.dispatch(ViewEvent::LoadFailed(message));
            }
        }
    }

    /// Drop type/iteration selections that the new list no longer offers.
    fn prune_filters(&mut self) {
        let facets = self.items.facets();
        if let Some(t) = &self.filter.item_type {
            if !facets.types.contains(t) {
                self.filter.item_type = None;
            }
        }
        if let Some(it) = &self.filter.iteration {
            if !facets.iterations.contains(it) {
                self.filter.iteration = None;
            }
        }
    }

    // ---- derived view data ----

    pub fn visible_items(&self) -> Vec<&WorkItem> {
        filter::apply(self.items.all(), &self.filter)
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.visible_items())
    }

    pub fn cell_count(&self) -> usize {
        self.visible_items().len() * CELLS_PER_ITEM
    }

    pub fn focused_cell_ref(&self) -> Option<CellRef> {
        cell_at(&self.visible_items(), self.focused_cell?)
    }

    /// Item owning the focused cell.
    pub fn focused_item(&self) -> Option<&WorkItem> {
        let index = self.focused_cell? / CELLS_PER_ITEM;
        self.visible_items().get(index).copied()
    }

    /// Text shown in an editable cell, including an in-progress edit.
    pub fn cell_text(&self, item: &WorkItem, field: EditField) -> String {
        match &self.edit {
            Some(session) if session.cell == CellRef::for_item(item, field) => session.display(),
            _ => format_hours(field.value(item)),
        }
    }

    pub fn is_editing(&self, item: &WorkItem, field: EditField) -> bool {
        self.edit.as_ref().is_some_and(|s| {
            !s.is_handled() && s.cell == CellRef::for_item(item, field)
        })
    }

    pub fn flash_for(&self, item: &WorkItem, field: EditField) -> Option<FlashKind> {
        self.flash
            .as_ref()
            .filter(|f| f.cell == CellRef::for_item(item, field))
            .map(|f| f.kind)
    }

    fn clamp_focus(&mut self) {
        let count = self.cell_count();
        self.focused_cell = match (count, self.focused_cell) {
            (0, _) => None,
            (n, Some(i)) => Some(i.min(n - 1)),
            (_, None) => Some(0),
        };
    }

    // ---- status ----

    pub fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
            at: Instant::now(),
        });
    }

    fn flash_cell(&mut self, cell: CellRef, kind: FlashKind) {
        self.flash = Some(CellFlash {
            cell,
            kind,
            at: Instant::now(),
        });
    }

    fn expire_transients(&mut self) {
        if self
            .status
            .as_ref()
            .is_some_and(|s| s.at.elapsed() >= STATUS_TTL)
        {
            self.status = None;
        }
        if self
            .flash
            .as_ref()
            .is_some_and(|f| f.at.elapsed() >= FLASH_TTL)
        {
            self.flash = None;
        }
    }

    // ---- keys ----

    fn handle_key(&mut self, key: KeyAction) {
        if self.show_help {
            if matches!(
                key,
                KeyAction::Escape | KeyAction::Enter | KeyAction::Char('?') | KeyAction::Char('q')
            ) {
                self.close_help();
            }
            return;
        }
        if self.edit.as_ref().is_some_and(|s| !s.is_handled()) {
            self.handle_edit_key(key);
            return;
        }
        if self.input_mode == InputMode::Search {
            self.handle_search_key(key);
            return;
        }
        match &self.view {
            ViewState::Settings => self.handle_settings_key(key),
            ViewState::Error(_) => self.handle_error_key(key),
            ViewState::Loading | ViewState::Loaded | ViewState::Saving => self.handle_list_key(key),
            ViewState::Init => {
                if key == KeyAction::Char('q') {
                    self.should_quit = true;
                }
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Up => self.move_focus(Direction::Up),
            KeyAction::Down => self.move_focus(Direction::Down),
            KeyAction::Left | KeyAction::BackTab => self.move_focus(Direction::Prev),
            KeyAction::Right | KeyAction::Tab => self.move_focus(Direction::Next),
            KeyAction::Enter | KeyAction::Char(' ') => self.begin_edit(),
            KeyAction::Char('/') => self.input_mode = InputMode::Search,
            KeyAction::Char('t') => {
                self.filter.item_type =
                    cycle_option(&self.filter.item_type, &self.items.facets().types);
                self.clamp_focus();
            }
            KeyAction::Char('i') => {
                self.filter.iteration =
                    cycle_option(&self.filter.iteration, &self.items.facets().iterations);
                self.clamp_focus();
            }
            KeyAction::Char('p') => {
                let next = self.filter.project.cycle(&self.config.projects);
                self.choose_scope(next);
            }
            KeyAction::Char('c') => {
                self.filter.clear_list_filters();
                self.clamp_focus();
            }
            KeyAction::Char('e') => self.show_details = !self.show_details,
            KeyAction::Char('r') => {
                self.dispatch(ViewEvent::Refresh);
            }
            KeyAction::Char('s') => {
                self.dispatch(ViewEvent::OpenSettings);
            }
            KeyAction::Char('m') => self.toggle_dark_mode(),
            KeyAction::Char('?') => self.show_help = true,
            KeyAction::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_error_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Char('r') | KeyAction::Enter => {
                self.dispatch(ViewEvent::Retry);
            }
            KeyAction::Char('s') => {
                self.dispatch(ViewEvent::OpenSettings);
            }
            KeyAction::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyAction) {
        if let Some(id) = self.pending_delete.take() {
            if key == KeyAction::Char('y') {
                self.delete_project(&id);
            }
            return;
        }
        let rows = self.config.projects.len() + 1;
        match key {
            KeyAction::Up => self.selected_project = self.selected_project.saturating_sub(1),
            KeyAction::Down => {
                if self.selected_project + 1 < rows {
                    self.selected_project += 1;
                }
            }
            KeyAction::Enter => {
                if self.config.projects.is_empty() {
                    return;
                }
                let scope = match self.selected_project {
                    0 => ProjectScope::All,
                    i => ProjectScope::Project(self.config.projects[i - 1].id.clone()),
                };
                self.choose_scope(scope);
            }
            KeyAction::Char('x') => {
                if let Some(project) = self
                    .selected_project
                    .checked_sub(1)
                    .and_then(|i| self.config.projects.get(i))
                {
                    self.pending_delete = Some(project.id.clone());
                }
            }
            KeyAction::Escape => {
                if !self.config.projects.is_empty() {
                    self.dispatch(ViewEvent::ProjectChosen);
                }
            }
            KeyAction::Char('m') => self.toggle_dark_mode(),
            KeyAction::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Char(c) => self.filter.search.push(c),
            KeyAction::Backspace => {
                self.filter.search.pop();
            }
            KeyAction::Enter => self.input_mode = InputMode::Normal,
            KeyAction::Escape => {
                self.filter.search.clear();
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
        self.clamp_focus();
    }

    fn move_focus(&mut self, direction: Direction) {
        let count = self.cell_count();
        self.focused_cell = match self.focused_cell {
            None if count > 0 => Some(0),
            None => None,
            Some(i) => Some(adjacent_cell(i, direction, count).unwrap_or(i)),
        };
    }

    /// Switch the project scope and reload.
    fn choose_scope(&mut self, scope: ProjectScope) {
        if self.view.on(&ViewEvent::ProjectChosen).is_none() {
            return;
        }
        self.filter.project = scope;
        self.focused_cell = None;
        self.dispatch(ViewEvent::ProjectChosen);
    }

    fn delete_project(&mut self, id: &str) {
        if !self.config.remove_project(id) {
            return;
        }
        info!(project_id = id, "deleted project");
        if self.filter.project == ProjectScope::Project(id.to_string()) {
            self.filter.project = ProjectScope::All;
        }
        self.selected_project = self.selected_project.min(self.config.projects.len());
        self.save_config();
        if !self.config.projects.is_empty() {
            self.set_status("Project deleted", StatusKind::Success);
        }
    }

    fn toggle_dark_mode(&mut self) {
        self.config.dark_mode = !self.config.dark_mode;
        self.save_config();
    }

    fn close_help(&mut self) {
        self.show_help = false;
        if !self.config.walkthrough_shown {
            self.config.walkthrough_shown = true;
            self.save_config();
        }
    }

    fn save_config(&mut self) {
        if let Err(e) = config::save_config_to(&self.config_path, &self.config) {
            error!(error = %e, "failed to save config");
            self.set_status(format!("Failed to save settings: {e}"), StatusKind::Error);
        }
    }

    // ---- inline editing ----

    fn begin_edit(&mut self) {
        if self.edit.is_some() || self.view != ViewState::Loaded {
            return;
        }
        let Some(cell) = self.focused_cell_ref() else {
            return;
        };
        let Some(item) = self.items.find(&cell.project_id, cell.item_id) else {
            return;
        };
        let original = cell.field.value(item);
        self.edit = Some(EditSession::begin(cell, original));
    }

    fn handle_edit_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Char(c) => {
                if let Some(session) = self.edit.as_mut() {
                    session.insert_char(c);
                }
            }
            KeyAction::Backspace => {
                if let Some(session) = self.edit.as_mut() {
                    session.backspace();
                }
            }
            KeyAction::Enter => self.commit_edit(Some(Direction::Next)),
            KeyAction::Tab => self.commit_edit(Some(Direction::Next)),
            KeyAction::BackTab => self.commit_edit(Some(Direction::Prev)),
            KeyAction::Up => self.commit_edit(Some(Direction::Up)),
            KeyAction::Down => self.commit_edit(Some(Direction::Down)),
            KeyAction::Escape => self.cancel_edit(),
            KeyAction::Left | KeyAction::Right => {}
        }
    }

    fn blur(&mut self) {
        if self.edit.as_ref().is_some_and(|s| !s.is_handled()) {
            self.commit_edit(None);
        }
    }

    fn cancel_edit(&mut self) {
        if let Some(session) = self.edit.as_mut() {
            if session.mark_handled() {
                self.edit = None;
            }
        }
    }

    /// Commit the open edit, then move focus in `direction` when given.
    fn commit_edit(&mut self, direction: Option<Direction>) {
        let count = self.cell_count();
        let next_focus = direction
            .zip(self.focused_cell)
            .and_then(|(d, i)| adjacent_cell(i, d, count));

        let Some(session) = self.edit.as_mut() else {
            return;
        };
        if !session.mark_handled() {
            return;
        }
        let cell = session.cell.clone();
        let input = session.input.clone();
        let original = session.original;
        let estimate = self
            .items
            .find(&cell.project_id, cell.item_id)
            .and_then(|i| i.original_estimate);

        match validate_commit(cell.field, &input, original, estimate) {
            Ok(Commit::Unchanged) => self.end_edit(next_focus),
            Ok(Commit::Persist(value)) => self.persist(cell, value, next_focus),
            Err(e) if e.is_silent() => {
                debug!(error = %e, "discarding edit");
                self.end_edit(next_focus);
            }
            Err(e) => {
                self.set_status(e.to_string(), StatusKind::Error);
                self.flash_cell(cell, FlashKind::Error);
                self.end_edit(next_focus);
            }
        }
    }

    fn end_edit(&mut self, next_focus: Option<usize>) {
        self.edit = None;
        if next_focus.is_some() {
            self.focused_cell = next_focus;
        }
    }

    fn persist(&mut self, cell: CellRef, value: f64, next_focus: Option<usize>) {
        // Credentials come from the project the item was loaded through,
        // not from the current scope.
        let Some(project) = self.config.find_project(&cell.project_id).cloned() else {
            warn!(item_id = cell.item_id, "item's project is no longer configured");
            self.set_status(
                format!("Failed to update #{}: project is no longer configured", cell.item_id),
                StatusKind::Error,
            );
            self.flash_cell(cell, FlashKind::Error);
            self.end_edit(next_focus);
            return;
        };
        if !self.dispatch(ViewEvent::SaveStarted) {
            self.end_edit(next_focus);
            return;
        }
        if let Some(session) = self.edit.as_mut() {
            session.pending = Some(value);
        }
        if next_focus.is_some() {
            self.focused_cell = next_focus;
        }
        self.set_status(
            format!("Saving {} for #{}...", cell.field.label(), cell.item_id),
            StatusKind::Info,
        );

        let client = Arc::clone(&self.client);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = client
                .update_field(&project, cell.item_id, cell.field.field_path(), value)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string());
            let _ = tx.send(Action::FieldSaved {
                cell,
                value,
                result,
            });
        });
    }

    fn on_field_saved(&mut self, cell: CellRef, value: f64, result: Result<(), String>) {
        if self.edit.as_ref().is_some_and(|s| s.cell == cell) {
            self.edit = None;
        }
        self.dispatch(ViewEvent::SaveFinished);

        match result {
            Ok(()) => {
                if let Some(item) = self.items.find_mut(&cell.project_id, cell.item_id) {
                    cell.field.set(item, value);
                }
                info!(item_id = cell.item_id, field = cell.field.label(), value, "updated work item");
                self.set_status(
                    format!(
                        "Updated #{} {} to {}",
                        cell.item_id,
                        cell.field.label(),
                        format_hours(Some(value))
                    ),
                    StatusKind::Success,
                );
                self.flash_cell(cell, FlashKind::Success);
            }
            Err(message) => {
                warn!(item_id = cell.item_id, %message, "update failed");
                self.set_status(
                    format!("Failed to update #{}: {message}", cell.item_id),
                    StatusKind::Error,
                );
                self.flash_cell(cell, FlashKind::Error);
            }
        }
    }
}

/// None → first value → ... → last value → None.
fn cycle_option(current: &Option<String>, values: &[String]) -> Option<String> {
    match current {
        None => values.first().cloned(),
        Some(v) => values
            .iter()
            .position(|x| x == v)
            .and_then(|i| values.get(i + 1))
            .cloned(),
    }
}
