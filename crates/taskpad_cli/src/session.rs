use crate::cli::{
    Command, SessionLine, normalize_parse_error, parse_text_command, split_first_word,
};
use crate::render;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::{BufRead, Write};
use taskpad_core::config::{Config, Palette};
use taskpad_core::error::AppError;
use taskpad_core::model::Task;
use taskpad_core::{Submitted, TaskListController};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Exit,
}

/// The presentation layer: reads intents line by line, forwards them to the
/// controller and renders the result.
#[derive(Debug)]
pub struct Session {
    controller: TaskListController,
    palette: Palette,
    aliases: HashMap<String, String>,
    json: bool,
}

fn io_error(err: std::io::Error) -> AppError {
    AppError::io(err.to_string())
}

impl Session {
    pub fn new(config: &Config, json: bool) -> Self {
        Self {
            controller: config.controller(),
            palette: config.palette(),
            aliases: config.aliases.clone(),
            json,
        }
    }

    pub fn controller(&self) -> &TaskListController {
        &self.controller
    }

    /// Runs until EOF or `exit`. Bad lines are reported on `err` and the
    /// session keeps going; only I/O failures end it early.
    pub fn run<R, W, E>(&mut self, input: R, out: &mut W, err: &mut E) -> Result<(), AppError>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        info!("session started");
        for line in input.lines() {
            let line = line.map_err(io_error)?;
            match self.handle_line(&line, out) {
                Ok(LineOutcome::Exit) => break,
                Ok(LineOutcome::Continue) => {}
                Err(error @ AppError::Io(_)) => return Err(error),
                Err(error) => writeln!(err, "ERROR: {error}").map_err(io_error)?,
            }
        }
        out.flush().map_err(io_error)?;
        info!(tasks = self.controller.tasks().len(), "session ended");
        Ok(())
    }

    pub fn handle_line<W: Write>(
        &mut self,
        line: &str,
        out: &mut W,
    ) -> Result<LineOutcome, AppError> {
        let line = self.expand_alias(line.trim());
        let line = line.trim();
        if line.is_empty() {
            return Ok(LineOutcome::Continue);
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            return Ok(LineOutcome::Exit);
        }

        if line == "help" || line == "?" {
            let help = SessionLine::command().render_help();
            writeln!(out, "{help}").map_err(io_error)?;
            return Ok(LineOutcome::Continue);
        }

        let command = match parse_text_command(line) {
            Some(parsed) => parsed?,
            None => match self.parse_line(line, out)? {
                Some(command) => command,
                None => return Ok(LineOutcome::Continue),
            },
        };

        self.execute(command, out)?;
        Ok(LineOutcome::Continue)
    }

    fn parse_line<W: Write>(&self, line: &str, out: &mut W) -> Result<Option<Command>, AppError> {
        let args = split_command_line(line)?;
        if args.is_empty() {
            return Ok(None);
        }

        match SessionLine::try_parse_from(args) {
            Ok(parsed) => Ok(Some(parsed.command)),
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                write!(out, "{err}").map_err(io_error)?;
                Ok(None)
            }
            Err(err) => Err(normalize_parse_error(err)),
        }
    }

    /// Replaces an aliased first word; the rest of the line is kept as typed.
    fn expand_alias(&self, line: &str) -> String {
        let (word, rest) = split_first_word(line);
        let Some(expansion) = self.aliases.get(word) else {
            return line.to_string();
        };

        debug!(alias = word, expansion = %expansion, "expanding alias");
        if rest.is_empty() {
            expansion.clone()
        } else {
            format!("{expansion} {rest}")
        }
    }

    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<(), AppError> {
        debug!(?command, "executing command");
        match command {
            Command::Type { text } => {
                self.controller.set_input_buffer(text);
                self.print_input(out)
            }
            Command::Submit => {
                let submitted = self.controller.submit();
                self.print_submitted(out, submitted)
            }
            Command::Add { text } => {
                self.controller.set_input_buffer(text);
                let submitted = self.controller.submit();
                self.print_submitted(out, submitted)
            }
            Command::Edit { target } => {
                let id = self.resolve_target(&target)?;
                if self.controller.begin_edit(&id) {
                    let task = self.controller.task(&id).cloned();
                    self.print_task(out, "editing", "Editing task", task)
                } else {
                    self.print_ignored(out, "task not found")
                }
            }
            Command::Cancel => {
                if self.controller.cancel_edit() {
                    self.emit(out, json!({ "action": "cancelled" }), "Edit cancelled")
                } else {
                    self.print_ignored(out, "no edit in progress")
                }
            }
            Command::Toggle { target } => {
                let id = self.resolve_target(&target)?;
                match self.controller.toggle_complete(&id) {
                    Some(task) if task.complete => {
                        self.print_task(out, "completed", "Completed task", Some(task))
                    }
                    Some(task) => self.print_task(out, "reopened", "Reopened task", Some(task)),
                    None => self.print_ignored(out, "task not found"),
                }
            }
            Command::Delete { target } => {
                let id = self.resolve_target(&target)?;
                let removed = self.controller.delete_task(&id);
                self.print_task(out, "deleted", "Deleted task", removed)
            }
            Command::Search { query } => {
                self.controller.set_search_query(query);
                let visible = self.controller.visible_tasks().len();
                let total = self.controller.tasks().len();
                let payload = json!({
                    "action": "search",
                    "query": self.controller.search_query(),
                    "visible": visible,
                    "total": total,
                });
                let text = format!(
                    "Search: \"{}\" ({visible} of {total} tasks)",
                    self.controller.search_query()
                );
                self.emit(out, payload, &text)
            }
            Command::List => {
                let payload = render::tasks_json(&self.controller);
                let text = render::tasks_table(&self.controller, &self.palette);
                self.emit(out, payload, &text)
            }
            Command::Status => {
                let payload = render::status_json(&self.controller);
                let text = render::status_lines(&self.controller, &self.palette).join("\n");
                self.emit(out, payload, &text)
            }
        }
    }

    /// A task id, or a 1-based position in the visible list.
    fn resolve_target(&self, target: &str) -> Result<String, AppError> {
        let trimmed = target.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("task id or position is required"));
        }

        let Ok(position) = trimmed.parse::<usize>() else {
            return Ok(trimmed.to_string());
        };

        let visible = self.controller.visible_tasks();
        position
            .checked_sub(1)
            .and_then(|index| visible.get(index))
            .map(|task| task.id.to_string())
            .ok_or_else(|| AppError::invalid_input(format!("no visible task at position {position}")))
    }

    fn emit<W: Write>(&self, out: &mut W, payload: Value, text: &str) -> Result<(), AppError> {
        if self.json {
            writeln!(out, "{payload}").map_err(io_error)
        } else {
            writeln!(out, "{text}").map_err(io_error)
        }
    }

    fn print_input<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        let buffer = self.controller.input_buffer();
        let payload = json!({
            "action": "input",
            "mode": self.controller.input_mode().label(),
            "input": buffer,
        });
        self.emit(out, payload, &format!("Input: \"{buffer}\""))
    }

    fn print_task<W: Write>(
        &self,
        out: &mut W,
        action: &str,
        label: &str,
        task: Option<Task>,
    ) -> Result<(), AppError> {
        match task {
            Some(task) => {
                let text = format!("{label}: {} ({})", task.text, task.id);
                self.emit(out, render::task_json(action, &task), &text)
            }
            None => self.print_ignored(out, "task not found"),
        }
    }

    fn print_submitted<W: Write>(&self, out: &mut W, submitted: Submitted) -> Result<(), AppError> {
        match submitted {
            Submitted::Added(task) => self.print_task(out, "added", "Added task", Some(task)),
            Submitted::Edited(task) => self.print_task(out, "updated", "Updated task", Some(task)),
            Submitted::Ignored if self.controller.is_editing() => {
                self.print_ignored(out, "edit text is empty")
            }
            Submitted::Ignored => self.print_ignored(out, "input is empty"),
        }
    }

    fn print_ignored<W: Write>(&self, out: &mut W, reason: &str) -> Result<(), AppError> {
        self.emit(
            out,
            render::ignored_json(reason),
            &format!("Nothing to do: {reason}"),
        )
    }
}

/// Splits a line into arguments, honoring double quotes and `\"` escapes.
pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_quotes => escape = true,
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            ch if ch.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    args.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            ch => current.push(ch),
        }
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}
