use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tablero_core::api::{visible_tasks, FetchResult, StatusFilter, Task};

use crate::app::{ERR_DELETE, ERR_TOGGLE, ERR_UPDATE, MSG_CREATED, MSG_DELETED, MSG_UPDATED};
use crate::form::{FormField, TaskForm};

pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Form,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotifyKind,
    pub shown_at: Instant,
}

/// Transient state gating a destructive delete: created on delete intent,
/// cleared on confirm or cancel.
#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub target_id: i64,
    pub target_title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
    Toggle,
}

/// Results of async operations, delivered back into the event loop.
pub enum UiEvent {
    Loaded(FetchResult),
    WriteDone {
        op: WriteOp,
        result: Result<(), String>,
    },
}

/// What a key press asks the event loop to do. Anything that needs the
/// network comes back as an action; pure view-state changes happen in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Reload,
    Create {
        title: String,
        description: String,
        completed: bool,
    },
    Update {
        id: i64,
        title: String,
        description: String,
        completed: bool,
    },
    Delete {
        id: i64,
    },
    SetCompleted {
        id: i64,
        completed: bool,
    },
}

/// All mutable state of the interactive board. Owned by the event loop and
/// handed to the renderer by reference; nothing here is global.
pub struct BoardApp {
    pub tasks: Option<Arc<Vec<Task>>>,
    pub loading: bool,
    pub load_failed: bool,
    pub filter: StatusFilter,
    pub search: String,
    pub selected: usize,
    pub mode: InputMode,
    pub form: Option<TaskForm>,
    pub form_error: Option<String>,
    pub confirm: Option<PendingDelete>,
    pub notification: Option<Notification>,
}

impl BoardApp {
    pub fn new() -> Self {
        Self {
            tasks: None,
            loading: true,
            load_failed: false,
            filter: StatusFilter::Todas,
            search: String::new(),
            selected: 0,
            mode: InputMode::Normal,
            form: None,
            form_error: None,
            confirm: None,
            notification: None,
        }
    }

    /// The list the board renders, derived from collection + filter + search.
    pub fn visible(&self) -> Vec<Task> {
        visible_tasks(self.tasks.as_deref().map(Vec::as_slice), self.filter, &self.search)
    }

    pub fn selected_task(&self) -> Option<Task> {
        self.visible().into_iter().nth(self.selected)
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn notify(&mut self, kind: NotifyKind, message: impl Into<String>) {
        self.notification = Some(Notification {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    /// Auto-dismiss the banner after [`NOTIFICATION_TTL`]; called on tick.
    pub fn expire_notification(&mut self, now: Instant) {
        if let Some(n) = self.notification.as_ref() {
            if now.duration_since(n.shown_at) >= NOTIFICATION_TTL {
                self.notification = None;
            }
        }
    }

    pub fn apply_loaded(&mut self, result: FetchResult) {
        self.loading = false;
        match result {
            Ok(tasks) => {
                self.tasks = Some(tasks);
                self.load_failed = false;
                self.clamp_selection();
            }
            Err(e) => {
                tracing::error!(target: "tablero.tui", error = %e, "load failed");
                // Last good data stays on screen; only flag the failure.
                self.load_failed = true;
            }
        }
    }

    /// Apply a finished write. Returns true when the collection must be
    /// reloaded (the cache entry was invalidated by the write).
    pub fn on_write_done(&mut self, op: WriteOp, result: Result<(), String>) -> bool {
        match result {
            Ok(()) => {
                match op {
                    WriteOp::Create => {
                        self.notify(NotifyKind::Success, MSG_CREATED);
                        self.close_form();
                    }
                    WriteOp::Update => {
                        self.notify(NotifyKind::Success, MSG_UPDATED);
                        self.close_form();
                    }
                    WriteOp::Delete => self.notify(NotifyKind::Success, MSG_DELETED),
                    // The original UI shows no banner for a toggle.
                    WriteOp::Toggle => {}
                }
                true
            }
            Err(msg) => {
                let display = match op {
                    // Create surfaces the service's own message, e.g. a
                    // title conflict.
                    WriteOp::Create => msg,
                    WriteOp::Update => ERR_UPDATE.to_string(),
                    WriteOp::Delete => ERR_DELETE.to_string(),
                    WriteOp::Toggle => ERR_TOGGLE.to_string(),
                };
                self.notify(NotifyKind::Error, display);
                false
            }
        }
    }

    fn close_form(&mut self) {
        self.form = None;
        self.form_error = None;
        if self.mode == InputMode::Form {
            self.mode = InputMode::Normal;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }
        match self.mode {
            InputMode::Normal => self.handle_key_normal(key),
            InputMode::Search => self.handle_key_search(key),
            InputMode::Form => self.handle_key_form(key),
            InputMode::Confirm => self.handle_key_confirm(key),
        }
    }

    fn handle_key_normal(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Char('r') => return Action::Reload,
            KeyCode::Char('/') => self.mode = InputMode::Search,
            KeyCode::Char('f') => {
                self.filter = self.filter.next();
                self.selected = 0;
            }
            KeyCode::Char('n') => {
                self.form = Some(TaskForm::create());
                self.form_error = None;
                self.mode = InputMode::Form;
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(task) = self.selected_task() {
                    self.form = Some(TaskForm::edit(&task));
                    self.form_error = None;
                    self.mode = InputMode::Form;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(task) = self.selected_task() {
                    return Action::SetCompleted {
                        id: task.id,
                        completed: !task.status.is_completed(),
                    };
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(task) = self.selected_task() {
                    self.confirm = Some(PendingDelete {
                        target_id: task.id,
                        target_title: task.title,
                    });
                    self.mode = InputMode::Confirm;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected += 1;
                self.clamp_selection();
            }
            KeyCode::Esc => self.notification = None,
            _ => {}
        }
        Action::None
    }

    fn handle_key_search(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.mode = InputMode::Normal,
            KeyCode::Backspace => {
                self.search.pop();
                self.selected = 0;
            }
            KeyCode::Char(c) => {
                self.search.push(c);
                self.selected = 0;
            }
            _ => {}
        }
        Action::None
    }

    fn handle_key_form(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Esc {
            self.close_form();
            return Action::None;
        }

        if key.code == KeyCode::Enter {
            let submit = match self.form.as_ref() {
                None => None,
                Some(form) => match form.validate() {
                    Err(msg) => {
                        self.form_error = Some(msg);
                        None
                    }
                    Ok(()) => Some(match form.editing {
                        Some(id) => Action::Update {
                            id,
                            title: form.title.trim().to_string(),
                            description: form.description.clone(),
                            completed: form.completed,
                        },
                        None => Action::Create {
                            title: form.title.trim().to_string(),
                            description: form.description.clone(),
                            completed: form.completed,
                        },
                    }),
                },
            };
            if let Some(action) = submit {
                // The form stays open until the write succeeds.
                self.form_error = None;
                return action;
            }
            return Action::None;
        }

        let Some(form) = self.form.as_mut() else {
            self.mode = InputMode::Normal;
            return Action::None;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::Backspace => match form.field {
                FormField::Title => {
                    form.title.pop();
                }
                FormField::Description => {
                    form.description.pop();
                }
                FormField::Completed => {}
            },
            KeyCode::Char(' ') if form.field == FormField::Completed => {
                form.completed = !form.completed;
            }
            KeyCode::Char(c) => match form.field {
                FormField::Title => form.title.push(c),
                FormField::Description => form.description.push(c),
                FormField::Completed => {}
            },
            _ => {}
        }
        Action::None
    }

    fn handle_key_confirm(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter | KeyCode::Char('s' | 'S' | 'y' | 'Y') => {
                let pending = self.confirm.take();
                self.mode = InputMode::Normal;
                if let Some(pending) = pending {
                    return Action::Delete {
                        id: pending.target_id,
                    };
                }
            }
            KeyCode::Esc | KeyCode::Char('n' | 'N') => {
                self.confirm = None;
                self.mode = InputMode::Normal;
            }
            _ => {}
        }
        Action::None
    }
}

impl Default for BoardApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablero_core::api::Status;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    fn loaded_app() -> BoardApp {
        let mut app = BoardApp::new();
        app.apply_loaded(Ok(Arc::new(vec![
            Task {
                id: 1,
                title: "Comprar leche".to_string(),
                description: "supermercado".to_string(),
                status: Status::Pending,
            },
            Task {
                id: 2,
                title: "Enviar reporte".to_string(),
                description: "mensual".to_string(),
                status: Status::Completed,
            },
        ])));
        app
    }

    #[test]
    fn filter_key_cycles_and_resets_selection() {
        let mut app = loaded_app();
        app.selected = 1;
        app.handle_key(key(KeyCode::Char('f')));
        assert_eq!(app.filter, StatusFilter::Pendientes);
        assert_eq!(app.selected, 0);
        assert_eq!(app.visible().len(), 1);
    }

    #[test]
    fn search_narrows_the_visible_list() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('/')));
        assert_eq!(app.mode, InputMode::Search);
        for c in "reporte".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.visible().len(), 1);
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.mode, InputMode::Normal);
        assert_eq!(app.search, "reporte");
    }

    #[test]
    fn delete_intent_opens_confirmation_with_target() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.mode, InputMode::Confirm);
        let pending = app.confirm.as_ref().unwrap();
        assert_eq!(pending.target_id, 1);
        assert_eq!(pending.target_title, "Comprar leche");

        // Cancel clears the pending state.
        app.handle_key(key(KeyCode::Char('n')));
        assert!(app.confirm.is_none());
        assert_eq!(app.mode, InputMode::Normal);
    }

    #[test]
    fn confirming_delete_emits_the_action_and_clears_state() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('d')));
        let action = app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(action, Action::Delete { id: 1 });
        assert!(app.confirm.is_none());
    }

    #[test]
    fn toggle_key_flips_the_selected_status() {
        let mut app = loaded_app();
        let action = app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(
            action,
            Action::SetCompleted {
                id: 1,
                completed: true
            }
        );
    }

    #[test]
    fn form_submit_rejects_short_titles_in_place() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.mode, InputMode::Form);
        app.handle_key(key(KeyCode::Char('a')));
        let action = app.handle_key(key(KeyCode::Enter));
        assert_eq!(action, Action::None);
        assert_eq!(
            app.form_error.as_deref(),
            Some("El título debe tener al menos 3 caracteres")
        );
        // The form stays open for correction.
        assert!(app.form.is_some());
    }

    #[test]
    fn form_submit_emits_create_action() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('n')));
        for c in "Nueva tarea".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        let action = app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            action,
            Action::Create {
                title: "Nueva tarea".to_string(),
                description: String::new(),
                completed: false
            }
        );
    }

    #[test]
    fn edit_prefills_form_from_selected_task() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('j')));
        app.handle_key(key(KeyCode::Char('e')));
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.editing, Some(2));
        assert_eq!(form.title, "Enviar reporte");
        assert!(form.completed);
    }

    #[test]
    fn write_success_closes_form_and_requests_reload() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('n')));
        assert!(app.on_write_done(WriteOp::Create, Ok(())));
        assert!(app.form.is_none());
        assert_eq!(app.mode, InputMode::Normal);
        let n = app.notification.as_ref().unwrap();
        assert_eq!(n.message, MSG_CREATED);
        assert_eq!(n.kind, NotifyKind::Success);
    }

    #[test]
    fn create_failure_surfaces_backend_message_and_keeps_form() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('n')));
        let reload = app.on_write_done(
            WriteOp::Create,
            Err("Task with title 'X' already exists".to_string()),
        );
        assert!(!reload);
        assert!(app.form.is_some());
        let n = app.notification.as_ref().unwrap();
        assert_eq!(n.message, "Task with title 'X' already exists");
        assert_eq!(n.kind, NotifyKind::Error);
    }

    #[test]
    fn other_write_failures_use_generic_fallbacks() {
        let mut app = loaded_app();
        app.on_write_done(WriteOp::Update, Err("boom".to_string()));
        assert_eq!(app.notification.as_ref().unwrap().message, ERR_UPDATE);
        app.on_write_done(WriteOp::Delete, Err("boom".to_string()));
        assert_eq!(app.notification.as_ref().unwrap().message, ERR_DELETE);
        app.on_write_done(WriteOp::Toggle, Err("boom".to_string()));
        assert_eq!(app.notification.as_ref().unwrap().message, ERR_TOGGLE);
    }

    #[test]
    fn notification_expires_after_ttl() {
        let mut app = loaded_app();
        app.notify(NotifyKind::Success, "hola");
        let shown_at = app.notification.as_ref().unwrap().shown_at;
        app.expire_notification(shown_at + Duration::from_secs(4));
        assert!(app.notification.is_some());
        app.expire_notification(shown_at + NOTIFICATION_TTL);
        assert!(app.notification.is_none());
    }

    #[test]
    fn failed_refetch_keeps_last_good_data_visible() {
        let mut app = loaded_app();
        app.apply_loaded(Err(Arc::new(tablero_core::api::ApiError::Network(
            "down".to_string(),
        ))));
        assert!(app.load_failed);
        assert_eq!(app.visible().len(), 2);
    }
}
