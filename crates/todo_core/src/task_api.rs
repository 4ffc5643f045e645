use crate::error::AppError;
use crate::id::new_unique_id;
use crate::model::{Filter, Task, calendar_date, normalize_due_input};
use crate::storage::json_store;
use crate::storage::kv::KeyValueStore;
use crate::ui::{ClickTarget, Composer, ComposerFields, Rect, UiState};
use crate::view::{ViewRow, derive_view, render_rows};
use time::UtcOffset;

pub const DELETE_TASK_PROMPT: &str = "Delete this task?";
pub const DELETE_ALL_PROMPT: &str = "Delete ALL tasks? This cannot be undone.";

/// Asks the user to approve a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Messages the presentation layer shows instead of applying an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    EmptyText,
    NothingToDelete,
}

impl Feedback {
    pub fn message(self) -> &'static str {
        match self {
            Feedback::EmptyText => "Task text is required.",
            Feedback::NothingToDelete => "No tasks to delete.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The list changed and was saved.
    Changed,
    /// Nothing to do: unknown id, or no edit in progress.
    Unchanged,
    /// The user declined a confirmation.
    Cancelled,
    Rejected(Feedback),
}

/// The task list plus the interface state around it.
///
/// Every handler runs to completion against `&mut self`; after a handler
/// returns, callers redraw from [`Session::rows`].
pub struct Session<S: KeyValueStore> {
    store: S,
    tasks: Vec<Task>,
    ui: UiState,
    save_error: Option<AppError>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn open(store: S) -> Self {
        let tasks = json_store::load(&store);
        Self {
            store,
            tasks,
            ui: UiState::default(),
            save_error: None,
        }
    }

    /// Re-reads the slot and resets all transient state.
    pub fn reload(&mut self) {
        self.tasks = json_store::load(&self.store);
        self.ui = UiState::default();
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn filter(&self) -> Filter {
        self.ui.filter
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn view(&self) -> Vec<&Task> {
        derive_view(&self.tasks, self.ui.filter)
    }

    pub fn rows(&self, offset: UtcOffset) -> Vec<ViewRow> {
        render_rows(&self.tasks, self.ui.filter, offset)
    }

    /// The most recent save failure, if the last save did not succeed.
    pub fn take_save_error(&mut self) -> Option<AppError> {
        self.save_error.take()
    }

    pub fn add_task(&mut self, text: &str, due: Option<&str>) -> Result<Outcome, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Outcome::Rejected(Feedback::EmptyText));
        }
        let due = normalize_due_input(due)?;

        let tasks = &self.tasks;
        let id = new_unique_id(|candidate| tasks.iter().any(|task| task.id == candidate));
        log::debug!("adding task {id}");
        self.tasks.push(Task {
            id,
            text: trimmed.to_string(),
            due,
            done: false,
        });
        self.ui.fields.clear();
        self.persist();

        Ok(Outcome::Changed)
    }

    /// Enters edit mode for `id` and pre-fills the composer from the task.
    pub fn start_edit(&mut self, id: &str) -> Outcome {
        let Some(task) = self.find(id) else {
            return Outcome::Unchanged;
        };

        let fields = ComposerFields {
            text: task.text.clone(),
            due: task
                .due
                .as_deref()
                .and_then(calendar_date)
                .unwrap_or_default(),
        };
        self.ui.fields = fields;
        self.ui.composer = Composer::Editing { id: id.to_string() };
        Outcome::Changed
    }

    pub fn commit_edit(&mut self, text: &str, due: Option<&str>) -> Result<Outcome, AppError> {
        let Some(editing_id) = self.ui.composer.editing_id().map(str::to_string) else {
            return Ok(Outcome::Unchanged);
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Outcome::Rejected(Feedback::EmptyText));
        }
        let due = normalize_due_input(due)?;

        self.ui.composer = Composer::Creating;
        self.ui.fields.clear();

        let Some(task) = self.tasks.iter_mut().find(|task| task.id == editing_id) else {
            log::debug!("edit target {editing_id} no longer exists");
            return Ok(Outcome::Unchanged);
        };
        task.text = trimmed.to_string();
        task.due = due;
        log::debug!("updated task {editing_id}");
        self.persist();

        Ok(Outcome::Changed)
    }

    /// Puts back a composer snapshot taken before [`Session::start_edit`].
    pub fn restore_composer(&mut self, composer: Composer, fields: ComposerFields) {
        self.ui.composer = composer;
        self.ui.fields = fields;
    }

    /// The single submit control: adds while creating, commits while editing.
    pub fn submit(&mut self, text: &str, due: Option<&str>) -> Result<Outcome, AppError> {
        match self.ui.composer {
            Composer::Creating => self.add_task(text, due),
            Composer::Editing { .. } => self.commit_edit(text, due),
        }
    }

    pub fn toggle_done(&mut self, id: &str) -> Outcome {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Outcome::Unchanged;
        };
        task.done = !task.done;
        log::debug!("task {id} done={}", task.done);
        self.persist();
        Outcome::Changed
    }

    pub fn delete_task(&mut self, id: &str, confirm: &mut dyn Confirm) -> Outcome {
        if !confirm.confirm(DELETE_TASK_PROMPT) {
            return Outcome::Cancelled;
        }

        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            return Outcome::Unchanged;
        }
        log::debug!("deleted task {id}");
        self.persist();
        Outcome::Changed
    }

    pub fn delete_all(&mut self, confirm: &mut dyn Confirm) -> Outcome {
        if self.tasks.is_empty() {
            return Outcome::Rejected(Feedback::NothingToDelete);
        }
        if !confirm.confirm(DELETE_ALL_PROMPT) {
            return Outcome::Cancelled;
        }

        log::debug!("deleting all {} task(s)", self.tasks.len());
        self.tasks.clear();
        self.persist();
        Outcome::Changed
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.ui.filter = filter;
    }

    pub fn open_filter_menu(&mut self, anchor: Rect) {
        self.ui.popup.open(anchor);
    }

    /// Picking an option applies it and closes the menu.
    pub fn select_filter_option(&mut self, filter: Filter) {
        self.set_filter(filter);
        self.ui.popup.close();
    }

    pub fn click(&mut self, target: ClickTarget) {
        self.ui.popup.handle_click(target);
    }

    fn persist(&mut self) {
        match json_store::save(&mut self.store, &self.tasks) {
            Ok(()) => self.save_error = None,
            Err(err) => {
                log::error!("failed to save tasks: {err}");
                self.save_error = Some(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DELETE_ALL_PROMPT, DELETE_TASK_PROMPT, Feedback, Outcome, Session};
    use crate::error::AppError;
    use crate::model::{Filter, Task};
    use crate::storage::json_store::{self, SLOT_KEY};
    use crate::storage::kv::{KeyValueStore, MemoryStore};
    use crate::ui::{ClickTarget, Composer, Rect};
    use crate::view::ViewRow;
    use pretty_assertions::assert_eq;
    use time::macros::offset;

    fn task(id: &str, text: &str, done: bool) -> Task {
        Task {
            id: id.to_string(),
            text: text.to_string(),
            due: None,
            done,
        }
    }

    fn session_with(tasks: &[Task]) -> Session<MemoryStore> {
        let mut store = MemoryStore::new();
        json_store::save(&mut store, tasks).unwrap();
        Session::open(store)
    }

    fn accept(_: &str) -> bool {
        true
    }

    fn decline(_: &str) -> bool {
        false
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), AppError> {
            Err(AppError::io("quota exceeded"))
        }
    }

    #[test]
    fn add_to_empty_list_shows_one_pending_row() {
        let mut session = Session::open(MemoryStore::new());

        let outcome = session.add_task("Buy milk", None).unwrap();
        assert_eq!(outcome, Outcome::Changed);

        let rows = session.rows(offset!(UTC));
        assert_eq!(rows.len(), 1);
        let ViewRow::Task(row) = &rows[0] else {
            panic!("expected task row");
        };
        assert_eq!(row.text, "Buy milk");
        assert_eq!(row.status, "Pending");
    }

    #[test]
    fn add_grows_list_by_one_under_any_filter() {
        for filter in Filter::ALL {
            let mut session = session_with(&[task("a", "one", true)]);
            session.set_filter(filter);

            session.add_task("  two  ", None).unwrap();

            assert_eq!(session.tasks().len(), 2);
            let added = &session.tasks()[1];
            assert!(!added.done);
            assert_eq!(added.text, "two");
            assert_ne!(added.id, "a");
        }
    }

    #[test]
    fn add_persists_normalized_due() {
        let mut session = Session::open(MemoryStore::new());
        session.add_task("Pay rent", Some("2025-02-01")).unwrap();

        let stored = json_store::load(session.store());
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].due.as_deref(), Some("2025-02-01T00:00:00Z"));
    }

    #[test]
    fn blank_text_is_rejected_without_change() {
        let mut session = session_with(&[task("a", "one", false)]);

        let outcome = session.add_task("   ", Some("2025-01-01")).unwrap();
        assert_eq!(outcome, Outcome::Rejected(Feedback::EmptyText));
        assert_eq!(session.tasks().len(), 1);

        session.start_edit("a");
        let outcome = session.commit_edit("\t", None).unwrap();
        assert_eq!(outcome, Outcome::Rejected(Feedback::EmptyText));
        assert_eq!(session.tasks(), &[task("a", "one", false)]);
        assert_eq!(session.ui().composer.editing_id(), Some("a"));
    }

    #[test]
    fn invalid_due_is_an_input_error() {
        let mut session = Session::open(MemoryStore::new());
        let err = session.add_task("demo", Some("next week")).unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert!(session.tasks().is_empty());
    }

    #[test]
    fn edit_commit_updates_text_and_keeps_done() {
        let mut session = session_with(&[task("a", "old", true)]);

        assert_eq!(session.start_edit("a"), Outcome::Changed);
        let outcome = session.commit_edit("New text", Some("2025-05-05")).unwrap();

        assert_eq!(outcome, Outcome::Changed);
        let updated = session.find("a").unwrap();
        assert_eq!(updated.text, "New text");
        assert_eq!(updated.due.as_deref(), Some("2025-05-05T00:00:00Z"));
        assert!(updated.done);
        assert_eq!(session.ui().composer, Composer::Creating);
        assert_eq!(json_store::load(session.store())[0].text, "New text");
    }

    #[test]
    fn start_edit_prefills_calendar_date() {
        let mut session = session_with(&[Task {
            id: "a".to_string(),
            text: "dentist".to_string(),
            due: Some("2025-03-04T00:00:00Z".to_string()),
            done: false,
        }]);

        session.start_edit("a");

        assert_eq!(session.ui().fields.text, "dentist");
        assert_eq!(session.ui().fields.due, "2025-03-04");
        assert_eq!(session.ui().composer.submit_title(), "Save changes");
    }

    #[test]
    fn start_edit_unknown_id_is_silent() {
        let mut session = session_with(&[task("a", "one", false)]);

        assert_eq!(session.start_edit("zzz"), Outcome::Unchanged);
        assert_eq!(session.ui().composer, Composer::Creating);
    }

    #[test]
    fn commit_after_delete_only_clears_selection() {
        let mut session = session_with(&[task("a", "one", false), task("b", "two", false)]);

        session.start_edit("a");
        session.delete_task("a", &mut accept);
        let outcome = session.commit_edit("changed", None).unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(session.ui().composer, Composer::Creating);
        assert_eq!(session.tasks(), &[task("b", "two", false)]);
    }

    #[test]
    fn restore_composer_returns_to_creating() {
        let mut session = session_with(&[task("a", "one", false)]);
        let before = session.ui().clone();

        session.start_edit("a");
        session.restore_composer(before.composer, before.fields);
        session.submit("two", None).unwrap();

        assert_eq!(session.ui().composer, Composer::Creating);
        assert_eq!(session.tasks().len(), 2);
        assert_eq!(session.tasks()[0].text, "one");
    }

    #[test]
    fn commit_without_selection_does_nothing() {
        let mut session = session_with(&[task("a", "one", false)]);

        let outcome = session.commit_edit("changed", None).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(session.tasks(), &[task("a", "one", false)]);
    }

    #[test]
    fn submit_dispatches_on_composer_mode() {
        let mut session = session_with(&[task("a", "one", false)]);

        session.submit("two", None).unwrap();
        assert_eq!(session.tasks().len(), 2);

        session.start_edit("a");
        session.submit("uno", None).unwrap();
        assert_eq!(session.tasks().len(), 2);
        assert_eq!(session.find("a").unwrap().text, "uno");
        assert_eq!(session.ui().composer, Composer::Creating);
        assert!(session.ui().fields.text.is_empty());
    }

    #[test]
    fn toggle_done_flips_and_ignores_unknown() {
        let mut session = session_with(&[task("a", "one", false)]);

        assert_eq!(session.toggle_done("a"), Outcome::Changed);
        assert!(session.find("a").unwrap().done);
        assert_eq!(session.toggle_done("a"), Outcome::Changed);
        assert!(!session.find("a").unwrap().done);

        assert_eq!(session.toggle_done("missing"), Outcome::Unchanged);
    }

    #[test]
    fn delete_task_requires_confirmation() {
        let mut session = session_with(&[task("a", "one", false)]);
        let mut prompts = Vec::new();

        let outcome = session.delete_task("a", &mut |prompt: &str| {
            prompts.push(prompt.to_string());
            false
        });
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(session.tasks().len(), 1);
        assert_eq!(prompts, vec![DELETE_TASK_PROMPT.to_string()]);

        assert_eq!(session.delete_task("a", &mut accept), Outcome::Changed);
        assert!(session.tasks().is_empty());
        assert_eq!(session.delete_task("a", &mut accept), Outcome::Unchanged);
    }

    #[test]
    fn delete_all_honors_confirmation() {
        let three = [
            task("a", "one", false),
            task("b", "two", true),
            task("c", "three", false),
        ];

        let mut session = session_with(&three);
        assert_eq!(session.delete_all(&mut decline), Outcome::Cancelled);
        assert_eq!(session.tasks().len(), 3);

        let mut prompts = Vec::new();
        let outcome = session.delete_all(&mut |prompt: &str| {
            prompts.push(prompt.to_string());
            true
        });
        assert_eq!(outcome, Outcome::Changed);
        assert!(session.tasks().is_empty());
        assert!(json_store::load(session.store()).is_empty());
        assert_eq!(prompts, vec![DELETE_ALL_PROMPT.to_string()]);
    }

    #[test]
    fn delete_all_on_empty_list_informs_without_prompt() {
        let mut session = Session::open(MemoryStore::new());
        let mut asked = false;

        let outcome = session.delete_all(&mut |_: &str| {
            asked = true;
            true
        });

        assert_eq!(outcome, Outcome::Rejected(Feedback::NothingToDelete));
        assert!(!asked);
    }

    #[test]
    fn filter_menu_selection_sets_filter_and_closes() {
        let mut session = session_with(&[task("a", "one", true), task("b", "two", false)]);

        session.open_filter_menu(Rect::default());
        assert!(session.ui().popup.is_open());

        session.select_filter_option(Filter::Pending);
        assert!(!session.ui().popup.is_open());
        assert_eq!(session.ui().filter_label(), "FILTER ▾ (Pending)");
        let view: Vec<String> = session.view().iter().map(|t| t.id.clone()).collect();
        assert_eq!(view, vec!["b".to_string()]);
    }

    #[test]
    fn outside_click_closes_filter_menu_without_changing_filter() {
        let mut session = Session::open(MemoryStore::new());
        session.open_filter_menu(Rect::default());

        session.click(ClickTarget::Outside);

        assert!(!session.ui().popup.is_open());
        assert_eq!(session.filter(), Filter::All);
    }

    #[test]
    fn filter_is_not_persisted() {
        let mut session = session_with(&[task("a", "one", false)]);
        session.set_filter(Filter::Completed);
        session.start_edit("a");

        session.reload();

        assert_eq!(session.filter(), Filter::All);
        assert_eq!(session.ui().composer, Composer::Creating);
        assert_eq!(session.tasks().len(), 1);
    }

    #[test]
    fn malformed_slot_opens_empty() {
        let session = Session::open(MemoryStore::with_slot(SLOT_KEY, "not json at all"));
        assert!(session.tasks().is_empty());
    }

    #[test]
    fn save_failure_keeps_change_and_is_reported() {
        let mut session = Session::open(ReadOnlyStore);

        let outcome = session.add_task("demo", None).unwrap();

        assert_eq!(outcome, Outcome::Changed);
        assert_eq!(session.tasks().len(), 1);
        let err = session.take_save_error().unwrap();
        assert_eq!(err.code(), "io_error");
        assert!(session.take_save_error().is_none());
    }
}
