use crate::cli::Command;
use crate::render::{render_filter_menu, render_table, task_json, view_json};
use std::io::{BufRead, Write};
use todo_core::config::Config;
use todo_core::error::AppError;
use todo_core::model::{Filter, Task};
use todo_core::storage::KeyValueStore;
use todo_core::ui::{ClickTarget, Rect};
use todo_core::{Confirm, Feedback, Outcome, Session, local_offset};

/// Reads a yes/no answer for each prompt from a line source.
pub struct LineConfirm<'a, R: BufRead> {
    input: &'a mut R,
}

impl<'a, R: BufRead> LineConfirm<'a, R> {
    pub fn new(input: &'a mut R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Confirm for LineConfirm<'_, R> {
    fn confirm(&mut self, prompt: &str) -> bool {
        // stdout carries only the view.
        eprint!("{prompt} [y/N] ");
        std::io::stderr().flush().ok();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => {
                eprintln!();
                false
            }
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        }
    }
}

/// What a handled command did, before it is printed.
struct Report {
    outcome: &'static str,
    message: Option<String>,
    task: Option<Task>,
}

impl Report {
    fn new(outcome: &'static str) -> Self {
        Self {
            outcome,
            message: None,
            task: None,
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn with_task(mut self, task: Option<&Task>) -> Self {
        self.task = task.cloned();
        self
    }
}

/// Presentation layer over a [`Session`]: runs commands and redraws after each.
pub struct App<S: KeyValueStore> {
    session: Session<S>,
    config: Config,
    json: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(session: Session<S>, config: Config, json: bool) -> Self {
        Self {
            session,
            config,
            json,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn filter_menu_open(&self) -> bool {
        self.session.ui().popup.is_open()
    }

    pub fn execute<W: Write>(
        &mut self,
        command: Command,
        confirm: &mut dyn Confirm,
        out: &mut W,
    ) -> Result<(), AppError> {
        // Any command typed while the menu is open counts as a click elsewhere,
        // except re-activating the filter control itself.
        let target = match command {
            Command::Filter { value: None } => ClickTarget::FilterControl,
            _ => ClickTarget::Outside,
        };
        self.session.click(target);

        let report = match command {
            Command::Add { text, due, no_due } => self.submit(text, due, no_due)?,
            Command::Edit {
                id,
                text,
                due,
                no_due,
            } => {
                let previous = self.session.ui().clone();
                if self.session.start_edit(&id) == Outcome::Unchanged {
                    Report::new("unchanged")
                } else if text.is_none() && due.is_none() && !no_due {
                    let fields = &self.session.ui().fields;
                    let due_label = if fields.due.is_empty() {
                        "-"
                    } else {
                        fields.due.as_str()
                    };
                    Report::new("editing")
                        .with_message(format!(
                            "Editing task {id}: \"{}\" (due {due_label}). Submit to save.",
                            fields.text
                        ))
                        .with_task(self.session.find(&id))
                } else {
                    match self.submit(text, due, no_due) {
                        Ok(report) => report,
                        Err(err) => {
                            // A failed one-line edit leaves the composer as it was.
                            self.session.restore_composer(previous.composer, previous.fields);
                            return Err(err);
                        }
                    }
                }
            }
            Command::Done { id } => match self.session.toggle_done(&id) {
                Outcome::Changed => {
                    let task = self.session.find(&id);
                    let message = match task {
                        Some(task) if task.done => format!("Completed task: {} ({})", task.text, task.id),
                        Some(task) => format!("Reopened task: {} ({})", task.text, task.id),
                        None => String::new(),
                    };
                    Report::new("changed").with_message(message).with_task(task)
                }
                _ => Report::new("unchanged"),
            },
            Command::Delete { id, yes } => {
                let removed = self.session.find(&id).cloned();
                let outcome = if yes {
                    self.session.delete_task(&id, &mut |_: &str| true)
                } else {
                    self.session.delete_task(&id, confirm)
                };
                match outcome {
                    Outcome::Changed => Report::new("changed")
                        .with_message(format!("Deleted task {id}."))
                        .with_task(removed.as_ref()),
                    Outcome::Cancelled => Report::new("cancelled").with_message("Cancelled."),
                    _ => Report::new("unchanged"),
                }
            }
            Command::Clear { yes } => {
                let outcome = if yes {
                    self.session.delete_all(&mut |_: &str| true)
                } else {
                    self.session.delete_all(confirm)
                };
                match outcome {
                    Outcome::Changed => {
                        Report::new("changed").with_message("Deleted all tasks.")
                    }
                    Outcome::Cancelled => Report::new("cancelled").with_message("Cancelled."),
                    Outcome::Rejected(feedback) => {
                        Report::new("info").with_message(feedback.message())
                    }
                    Outcome::Unchanged => Report::new("unchanged"),
                }
            }
            Command::Filter { value: Some(value) } => {
                let filter: Filter = value.parse()?;
                self.session.select_filter_option(filter);
                Report::new("filter")
            }
            Command::Filter { value: None } => {
                self.session.open_filter_menu(Rect::default());
                if !self.json {
                    writeln!(out, "{}", render_filter_menu(self.session.filter()))?;
                }
                return Ok(());
            }
            Command::List { filter } => {
                if let Some(value) = filter {
                    let filter: Filter = value.parse()?;
                    self.session.set_filter(filter);
                }
                Report::new("list")
            }
        };

        self.report_save_error();
        self.redraw(&report, out)
    }

    /// Handles a line typed while the filter menu is open. Returns false when
    /// the line is not a menu option; the menu stays open for the caller to
    /// treat the line as an ordinary command.
    pub fn choose_filter_option<W: Write>(
        &mut self,
        line: &str,
        out: &mut W,
    ) -> Result<bool, AppError> {
        let trimmed = line.trim();
        let picked = match trimmed {
            "1" => Some(Filter::All),
            "2" => Some(Filter::Pending),
            "3" => Some(Filter::Completed),
            other => other.parse::<Filter>().ok(),
        };

        let Some(filter) = picked else {
            return Ok(false);
        };
        self.session.select_filter_option(filter);
        self.redraw(&Report::new("filter"), out)?;
        Ok(true)
    }

    fn submit(
        &mut self,
        text: Option<String>,
        due: Option<String>,
        no_due: bool,
    ) -> Result<Report, AppError> {
        let fields = self.session.ui().fields.clone();
        let text = text.unwrap_or(fields.text);
        let due = if no_due { None } else { due.or(Some(fields.due)) };
        let editing = self.session.ui().composer.editing_id().map(str::to_string);

        match self.session.submit(&text, due.as_deref())? {
            Outcome::Changed => {
                let report = match editing {
                    Some(id) => {
                        let task = self.session.find(&id);
                        let message = task
                            .map(|task| format!("Updated task: {} ({})", task.text, task.id))
                            .unwrap_or_default();
                        Report::new("changed").with_message(message).with_task(task)
                    }
                    None => {
                        let task = self.session.tasks().last();
                        let message = task
                            .map(|task| format!("Added task: {} ({})", task.text, task.id))
                            .unwrap_or_default();
                        Report::new("changed").with_message(message).with_task(task)
                    }
                };
                Ok(report)
            }
            Outcome::Rejected(Feedback::EmptyText) => {
                Err(AppError::invalid_input(Feedback::EmptyText.message()))
            }
            _ => Ok(Report::new("unchanged")),
        }
    }

    fn report_save_error(&mut self) {
        if let Some(err) = self.session.take_save_error() {
            eprintln!("WARNING: tasks were not saved: {err}");
        }
    }

    fn redraw<W: Write>(&self, report: &Report, out: &mut W) -> Result<(), AppError> {
        let filter = self.session.filter();

        if self.json {
            let mut value = view_json(
                report.outcome,
                report.message.as_deref(),
                filter,
                &self.session.view(),
            );
            if let Some(task) = report.task.as_ref() {
                value["task"] = task_json(task);
            }
            writeln!(out, "{value}")?;
            return Ok(());
        }

        if let Some(message) = report.message.as_deref().filter(|m| !m.is_empty()) {
            writeln!(out, "{message}")?;
        }
        let palette = self.config.palette();
        writeln!(out, "{}", palette.accentize(&filter.control_label()))?;
        writeln!(
            out,
            "{}",
            render_table(&self.session.rows(local_offset()), &palette)
        )?;
        Ok(())
    }
}
