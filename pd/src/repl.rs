//! Interactive planning REPL
//!
//! One chat session against a session actor, with slash commands for
//! the direct operations (proposal, tasks, export) that don't go
//! through an agent turn.

use std::str::FromStr;
use std::sync::Arc;

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::agents::{AgentKind, AgentRegistry};
use crate::config::Config;
use crate::domain::TaskStatus;
use crate::error::OrchestratorError;
use crate::ledger::TaskFilter;
use crate::router::TurnRequest;
use crate::session::{Delta, SessionHandle, SessionManager};

/// Run the interactive planning REPL
///
/// This is the main entry point for `pd chat`.
pub async fn run_interactive(config: &Config, name: &str) -> Result<()> {
    let registry = Arc::new(AgentRegistry::with_builtins());
    let mut manager = SessionManager::new(registry, config.clone());
    let handle = manager.create_session(name);

    let mut session = ChatSession::new(handle);
    session.run().await
}

enum SlashResult {
    Continue,
    Quit,
}

/// Interactive chat session
struct ChatSession {
    handle: SessionHandle,
    /// Agent explicitly selected for the next message only
    selected: Option<AgentKind>,
}

impl ChatSession {
    fn new(handle: SessionHandle) -> Self {
        Self { handle, selected: None }
    }

    /// Run the REPL main loop
    async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input).await? {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.send_turn(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        let _ = self.handle.shutdown().await;
        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Plannerd - event planning copilot".bright_cyan().bold());
        println!("Session: {}", self.handle.id());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    async fn send_turn(&mut self, input: &str) {
        let mut request = TurnRequest::new(input);
        if let Some(agent) = self.selected.take() {
            request = request.with_agent(agent);
        }

        match self.handle.turn(request).await {
            Ok(delta) => self.print_delta(&delta),
            Err(e) => print_error(&e),
        }
    }

    fn print_delta(&self, delta: &Delta) {
        for message in &delta.messages {
            if let Some(agent) = message.agent {
                println!("{} {}", format!("[{}]", agent.label()).bright_blue(), message.content);
            }
        }
        for change in &delta.task_changes {
            let task = &change.task;
            let due = task.due.map(|d| format!(" (due {})", d)).unwrap_or_default();
            println!(
                "  {} {} [{}] {}{}",
                "*".bright_green(),
                task.status,
                task.agent,
                task.title,
                due.dimmed()
            );
        }
        if let Some(status) = delta.proposal_status {
            println!("  {} proposal is now {}", "*".bright_green(), status.to_string().bold());
        }
    }

    async fn handle_slash_command(&mut self, input: &str) -> Result<SlashResult> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");
        let rest = input[cmd.len()..].trim();

        match cmd {
            "/help" | "/h" => {
                self.print_help();
            }
            "/quit" | "/q" | "/exit" => return Ok(SlashResult::Quit),
            "/agents" => {
                println!();
                for kind in AgentKind::ALL {
                    println!("  {:28} {}", kind.to_string().yellow(), kind.description());
                }
                println!();
            }
            "/agent" => match AgentKind::from_str(rest) {
                Ok(kind) => {
                    self.selected = Some(kind);
                    println!("Next message goes to {}", kind.label().bright_blue());
                }
                Err(e) => println!("{} {}", "?".yellow(), e),
            },
            "/proposal" => {
                if rest.is_empty() {
                    println!("{} usage: /proposal <text>", "?".yellow());
                } else {
                    self.report(self.handle.submit_proposal(rest).await);
                }
            }
            "/approve" => {
                self.report(self.handle.approve_proposal().await);
            }
            "/tasks" => {
                let mut filter = TaskFilter::default();
                if !rest.is_empty() {
                    match TaskStatus::from_str(rest) {
                        Ok(status) => filter.status = Some(status),
                        Err(e) => {
                            println!("{} {}", "?".yellow(), e);
                            return Ok(SlashResult::Continue);
                        }
                    }
                }
                match self.handle.tasks(filter).await {
                    Ok(tasks) if tasks.is_empty() => println!("{}", "No tasks.".dimmed()),
                    Ok(tasks) => {
                        println!();
                        for task in tasks {
                            let due = task.due.map(|d| format!(" (due {})", d)).unwrap_or_default();
                            println!("  {} {:12} [{}] {}{}", task.id.dimmed(), task.status, task.agent, task.title, due);
                        }
                        println!();
                    }
                    Err(e) => print_error(&e),
                }
            }
            "/progress" => match self.handle.progress().await {
                Ok(p) => println!(
                    "{}% complete - {} pending, {} in progress, {} completed, {} cancelled",
                    p.percent_complete(),
                    p.pending,
                    p.in_progress,
                    p.completed,
                    p.cancelled
                ),
                Err(e) => print_error(&e),
            },
            "/start" => self.transition(cmd, rest, TaskStatus::InProgress).await,
            "/done" => self.transition(cmd, rest, TaskStatus::Completed).await,
            "/cancel" => self.transition(cmd, rest, TaskStatus::Cancelled).await,
            "/export" => match self.handle.export_calendar().await {
                Ok(ics) => println!("{}", ics),
                Err(e) => print_error(&e),
            },
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
        Ok(SlashResult::Continue)
    }

    async fn transition(&self, cmd: &str, id: &str, next: TaskStatus) {
        if id.is_empty() {
            println!("{} usage: {} <task-id>", "?".yellow(), cmd);
            return;
        }
        self.report(self.handle.transition_task(id, next).await);
    }

    fn report(&self, result: Result<Delta, OrchestratorError>) {
        match result {
            Ok(delta) => self.print_delta(&delta),
            Err(e) => print_error(&e),
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:22} Show this help", "/help".yellow());
        println!("  {:22} Exit the session", "/quit".yellow());
        println!("  {:22} List the agent catalog", "/agents".yellow());
        println!("  {:22} Route the next message to an agent", "/agent <name>".yellow());
        println!("  {:22} Submit the session proposal", "/proposal <text>".yellow());
        println!("  {:22} Approve the drafted proposal", "/approve".yellow());
        println!("  {:22} List tasks (optionally by status)", "/tasks [status]".yellow());
        println!("  {:22} Show ledger progress", "/progress".yellow());
        println!("  {:22} Start a task", "/start <task-id>".yellow());
        println!("  {:22} Complete a task", "/done <task-id>".yellow());
        println!("  {:22} Cancel a task", "/cancel <task-id>".yellow());
        println!("  {:22} Print the session as iCalendar", "/export".yellow());
        println!();
        println!("Anything else is sent to the agents as a planning message.");
        println!();
    }
}

fn print_error(err: &OrchestratorError) {
    println!("{} {} ({})", "!".bright_red(), err, err.code().dimmed());
}
