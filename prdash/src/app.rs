//! Application state and event handling.
//!
//! [`App`] owns every section and the task board. It is only ever touched
//! by the event loop: key presses and inbound [`AppEvent`]s mutate it, and
//! any remote work it needs comes back out as [`Command`]s for the caller
//! to spawn.

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::actions::{ActionCommand, PrAction};
use crate::config::SectionConfig;
use crate::event::{AppEvent, FetchCompleted};
use crate::fetch::FetchCommand;
use crate::section::{Section, SectionId};
use crate::tasks::TaskBoard;

/// Remote work requested by the app.
#[derive(Debug, Clone)]
pub enum Command {
    /// Fetch a page for a section.
    Fetch(FetchCommand),
    /// Run an action on a pull request.
    Action(ActionCommand),
}

/// What keystrokes currently go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Navigation and shortcuts.
    Normal,
    /// Editing the current section's search filters.
    Search,
    /// Waiting for Y/N before running the action.
    Confirm(PrAction),
    /// Typing a comment for the selected pull request.
    Comment,
    /// Typing logins to assign (`true`) or unassign (`false`).
    Assignees(bool),
}

/// Main application state.
pub struct App {
    /// Sections in tab order.
    pub sections: Vec<Section>,
    /// Index into `sections` of the visible section.
    pub current: usize,
    /// Status of every task started this run.
    pub tasks: TaskBoard,
    /// Where keystrokes go.
    pub mode: InputMode,
    /// Text being edited in search, prompt, comment or assignee mode.
    pub input: String,
    /// Whether the app should quit.
    pub should_quit: bool,
    prs_limit: usize,
}

impl App {
    /// Creates one empty section per config. Section ids start at 1.
    #[must_use]
    pub fn new(configs: Vec<SectionConfig>, prs_limit: usize) -> Self {
        let sections = configs
            .into_iter()
            .enumerate()
            .map(|(i, cfg)| Section::new(i + 1, cfg))
            .collect();
        Self {
            sections,
            current: 0,
            tasks: TaskBoard::new(),
            mode: InputMode::Normal,
            input: String::new(),
            should_quit: false,
            prs_limit,
        }
    }

    /// The visible section.
    #[must_use]
    pub fn current_section(&self) -> Option<&Section> {
        self.sections.get(self.current)
    }

    /// Looks up a section by id.
    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id() == id)
    }

    fn section_mut(&mut self, id: SectionId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id() == id)
    }

    /// Issues the first page fetch of every section.
    pub fn fetch_all_sections(&mut self) -> Vec<Command> {
        let ids: Vec<SectionId> = self.sections.iter().map(Section::id).collect();
        ids.into_iter()
            .filter_map(|id| self.fetch_next_page(id))
            .collect()
    }

    /// Issues the next page fetch of section `id` and records its task.
    ///
    /// Returns `None` for an unknown section or when no page is left.
    pub fn fetch_next_page(&mut self, id: SectionId) -> Option<Command> {
        let limit = self.prs_limit;
        let command = self.section_mut(id)?.fetch_next_page(limit)?;
        self.tasks.start(command.task.clone());
        Some(Command::Fetch(command))
    }

    /// Resets section `id` and fetches its first page again.
    pub fn refresh_section(&mut self, id: SectionId) -> Option<Command> {
        self.section_mut(id)?.reset();
        self.fetch_next_page(id)
    }

    /// Resets and re-fetches every section.
    pub fn refresh_all(&mut self) -> Vec<Command> {
        tracing::info!(sections = self.sections.len(), "refreshing all sections");
        for section in &mut self.sections {
            section.reset();
        }
        self.fetch_all_sections()
    }

    /// Applies an inbound event.
    ///
    /// Every fetch completion settles its task on the board, but only the
    /// section's latest fetch may change the section. Events for unknown
    /// sections are dropped.
    pub fn handle_event(&mut self, event: AppEvent) {
        let now = Utc::now();
        match event {
            AppEvent::FetchCompleted(FetchCompleted {
                section_id,
                task_id,
                outcome,
            }) => match outcome {
                Ok(page) => {
                    self.tasks.finish(&task_id);
                    if let Some(section) = self.section_mut(section_id) {
                        section.apply_fetched(&task_id, page, now);
                    }
                }
                Err(e) => {
                    self.tasks.fail(&task_id, e.to_string());
                    if let Some(section) = self.section_mut(section_id) {
                        section.apply_failed(&task_id);
                    }
                }
            },
            AppEvent::ActionCompleted {
                section_id,
                task_id,
                outcome,
            } => match outcome {
                Ok(update) => {
                    self.tasks.finish(&task_id);
                    if let Some(section) = self.section_mut(section_id) {
                        section.apply_update(&update, now);
                    }
                }
                Err(e) => {
                    self.tasks.fail(&task_id, e.to_string());
                }
            },
            AppEvent::EntityPatched { section_id, update } => {
                if let Some(section) = self.section_mut(section_id) {
                    section.apply_update(&update, now);
                }
            }
        }
    }

    /// Handles a key event and returns the remote work it triggered.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Vec<Command> {
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            self.should_quit = true;
            return Vec::new();
        }

        match self.mode.clone() {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Search => self.handle_search_key(key),
            InputMode::Confirm(action) => self.handle_confirm_key(key, action),
            InputMode::Comment => self.handle_text_key(key, |text| {
                (!text.trim().is_empty()).then(|| PrAction::Comment(text.to_string()))
            }),
            InputMode::Assignees(add) => self.handle_text_key(key, |text| {
                let logins: Vec<String> = text.split_whitespace().map(String::from).collect();
                if logins.is_empty() {
                    None
                } else if add {
                    Some(PrAction::Assign(logins))
                } else {
                    Some(PrAction::Unassign(logins))
                }
            }),
        }
    }

    /// Handle key event in normal mode.
    fn handle_normal_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.current = self.current.saturating_sub(1);
                Vec::new()
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.current + 1 < self.sections.len() {
                    self.current += 1;
                }
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => self.next_row().into_iter().collect(),
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(section) = self.sections.get_mut(self.current) {
                    section.select_prev(Utc::now());
                }
                Vec::new()
            }
            KeyCode::Char('/') => {
                if let Some(section) = self.current_section() {
                    self.input = section.search_value().to_string();
                    self.mode = InputMode::Search;
                }
                Vec::new()
            }
            KeyCode::Char('r') => self
                .current_section()
                .map(Section::id)
                .and_then(|id| self.refresh_section(id))
                .into_iter()
                .collect(),
            KeyCode::Char('R') => self.refresh_all(),
            KeyCode::Char('x') => self.request(PrAction::Close),
            KeyCode::Char('X') => self.request(PrAction::Reopen),
            KeyCode::Char('W') => self.request(PrAction::Ready),
            KeyCode::Char('m') => self.request(PrAction::Merge),
            KeyCode::Char('c') => self.open_text_input(InputMode::Comment),
            KeyCode::Char('a') => self.open_text_input(InputMode::Assignees(true)),
            KeyCode::Char('A') => self.open_text_input(InputMode::Assignees(false)),
            _ => Vec::new(),
        }
    }

    /// Moves the selection down and, on the last loaded row, asks for the
    /// next page if one exists and none is loading.
    fn next_row(&mut self) -> Option<Command> {
        let section = self.sections.get_mut(self.current)?;
        section.select_next(Utc::now());
        let at_end = section.selection() + 1 >= section.items().len();
        if at_end && section.has_next_page() && !section.is_loading() {
            let id = section.id();
            return self.fetch_next_page(id);
        }
        None
    }

    /// Handle key event while editing the search bar.
    fn handle_search_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Esc => {
                self.close_input();
                Vec::new()
            }
            KeyCode::Enter => {
                let value = std::mem::take(&mut self.input);
                self.mode = InputMode::Normal;
                let Some(section) = self.sections.get_mut(self.current) else {
                    return Vec::new();
                };
                section.set_search_value(value);
                let id = section.id();
                self.refresh_section(id).into_iter().collect()
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                Vec::new()
            }
            KeyCode::Backspace => {
                self.input.pop();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Handle key event while a confirmation prompt is shown.
    fn handle_confirm_key(&mut self, key: KeyEvent, action: PrAction) -> Vec<Command> {
        match key.code {
            KeyCode::Esc => {
                self.close_input();
                Vec::new()
            }
            KeyCode::Enter => {
                let confirmed = matches!(self.input.as_str(), "y" | "Y");
                self.close_input();
                if confirmed {
                    self.action_on_current(action).into_iter().collect()
                } else {
                    Vec::new()
                }
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                Vec::new()
            }
            KeyCode::Backspace => {
                self.input.pop();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Handle key event in a free text input; `build` turns the submitted
    /// text into an action, or `None` to send nothing.
    fn handle_text_key(
        &mut self,
        key: KeyEvent,
        build: impl FnOnce(&str) -> Option<PrAction>,
    ) -> Vec<Command> {
        match key.code {
            KeyCode::Esc => {
                self.close_input();
                Vec::new()
            }
            KeyCode::Enter => {
                let action = build(&self.input);
                self.close_input();
                action.map_or_else(Vec::new, |a| self.request(a))
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                Vec::new()
            }
            KeyCode::Backspace => {
                self.input.pop();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Runs `action` on the selected pull request, or asks first if the
    /// action needs a confirmation.
    pub fn request(&mut self, action: PrAction) -> Vec<Command> {
        if action.needs_confirmation() {
            self.prompt(action)
        } else {
            self.action_on_current(action).into_iter().collect()
        }
    }

    fn prompt(&mut self, action: PrAction) -> Vec<Command> {
        if self.current_section().and_then(Section::current_pr).is_some() {
            self.input.clear();
            self.mode = InputMode::Confirm(action);
        }
        Vec::new()
    }

    fn open_text_input(&mut self, mode: InputMode) -> Vec<Command> {
        if self.current_section().and_then(Section::current_pr).is_some() {
            self.input.clear();
            self.mode = mode;
        }
        Vec::new()
    }

    fn close_input(&mut self) {
        self.input.clear();
        self.mode = InputMode::Normal;
    }

    /// Builds an action on the selected pull request and records its task.
    fn action_on_current(&mut self, action: PrAction) -> Option<Command> {
        let section = self.current_section()?;
        let pr = section.current_pr()?;
        let command = ActionCommand::new(section.id(), pr.number, pr.repository.clone(), action);
        self.tasks.start(command.task.clone());
        Some(Command::Action(command))
    }

    /// Text of the confirmation prompt, if one is shown.
    #[must_use]
    pub fn prompt_text(&self) -> Option<String> {
        let InputMode::Confirm(action) = &self.mode else {
            return None;
        };
        let number = self.current_section()?.current_pr()?.number;
        Some(format!(
            "Are you sure you want to {} PR #{number}? (Y/n)",
            action.name()
        ))
    }
}
