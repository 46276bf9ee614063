//! The conversion supervisor: one child process, one dialog-relayed run.
//!
//! The supervisor owns the whole lifecycle of a conversion request. It never
//! inspects the file system itself; it launches the converter child hidden,
//! relays the child's console protocol (see `prompt`) to modal dialogs, and
//! surfaces the child's terminal failure once. The streaming relay is generic
//! over the stream types so the protocol is tested against scripted children.

use crate::dialog::Prompter;
use crate::process;
use crate::prompt::{self, PromptBuffer};
use crate::shortcut::DynamicLink;
use anyhow::{Context, Result};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// Lifecycle of one supervised run. Succeeded and Failed are terminal; there
/// is no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Launching,
    Streaming,
    Succeeded,
    Failed,
}

pub struct ConversionSupervisor<'a> {
    prompter: &'a mut dyn Prompter,
    state: RunState,
}

impl<'a> ConversionSupervisor<'a> {
    pub fn new(prompter: &'a mut dyn Prompter) -> Self {
        Self {
            prompter,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run one conversion of `markdown` through the worker next to
    /// `launcher`. Returns the terminal state; every failure has already been
    /// shown to the user when this returns.
    pub fn run(&mut self, launcher: &Path, markdown: &Path) -> Result<RunState> {
        let worker = self.resolve_worker(launcher)?;
        self.state = RunState::Launching;
        tracing::info!(worker = %worker.display(), markdown = %markdown.display(), "launching converter");

        let mut child = match process::launch_hidden(&worker, markdown) {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(error = %e, "converter did not start");
                self.prompter.alert(&format!("{e:#}"));
                self.state = RunState::Failed;
                return Ok(self.state);
            }
        };

        self.state = RunState::Streaming;
        // Stream handles are piped by launch_hidden, so these cannot be None.
        let stdout = BufReader::new(child.stdout.take().context("child stdout not piped")?);
        let mut stdin = child.stdin.take().context("child stdin not piped")?;
        let mut stderr = child.stderr.take().context("child stderr not piped")?;

        if let Err(e) = self.relay(stdout, &mut stdin) {
            // The child must not outlive a broken relay; it may still be
            // blocked on an answer that will never come.
            drop(stdin);
            let _ = child.kill();
            let _ = child.wait();
            self.state = RunState::Failed;
            return Err(e);
        }
        // Closing the write end unblocks a child still waiting on an answer
        // that will never come.
        drop(stdin);

        let stderr_text = {
            let mut raw = String::new();
            stderr.read_to_string(&mut raw).map(|_| raw)
        };
        let status = child.wait().context("wait for converter exit")?;
        self.state = self.conclude(status.success(), status.code(), stderr_text);
        Ok(self.state)
    }

    /// Map the child's exit to a terminal state, surfacing at most one error
    /// dialog.
    fn conclude(
        &mut self,
        success: bool,
        code: Option<i32>,
        stderr_text: io::Result<String>,
    ) -> RunState {
        if success {
            tracing::info!("conversion succeeded");
            return RunState::Succeeded;
        }
        let message = match stderr_text {
            Ok(raw) => prompt::extract_error(&raw),
            Err(e) => {
                tracing::warn!(error = %e, "could not read converter stderr");
                "The conversion failed and its error output could not be read.".to_string()
            }
        };
        tracing::warn!(?code, message = %message, "conversion failed");
        // An empty message means the child stopped after the user already
        // answered a prompt; there is nothing new to show.
        if !message.is_empty() {
            self.prompter.alert(&message);
        }
        RunState::Failed
    }

    /// The streaming protocol: accumulate output lines, flush them as one
    /// modal Yes/No question whenever a prompt line arrives, and write the
    /// literal answer back as a single line. The child blocks on that answer,
    /// so the write completes before the next read.
    fn relay<R: BufRead, W: Write>(&mut self, reader: R, answers: &mut W) -> Result<()> {
        let mut buffer = PromptBuffer::new();
        for line in reader.lines() {
            let line = line.context("read converter output")?;
            if line.trim().is_empty() {
                continue;
            }
            if prompt::is_prompt_line(&line) {
                let question = buffer.take_with(&line);
                let answer = if self.prompter.confirm(&question) {
                    "Yes"
                } else {
                    "No"
                };
                tracing::debug!(answer, "prompt answered");
                writeln!(answers, "{answer}").context("write prompt answer")?;
                answers.flush().context("flush prompt answer")?;
            } else {
                buffer.push_line(&line);
            }
        }
        Ok(())
    }

    /// Resolve the launch target through the cached shortcut artifact. A
    /// valid link supplies the target for this run; a stale, unreadable or
    /// deleted link is rewritten whole before use, never launched through
    /// unmodified.
    #[cfg(windows)]
    fn resolve_worker(&mut self, launcher: &Path) -> Result<PathBuf> {
        use crate::shortcut;

        let expected = expected_link(launcher);
        let link_file = shortcut::link_path(launcher);
        let com = shortcut::ComSession::new()?;
        let stored = if link_file.is_file() {
            shortcut::load(&com, &link_file)
                .inspect_err(|e| tracing::warn!(error = %e, "unreadable shortcut"))
                .ok()
        } else {
            None
        };
        let (target, rebuild) = shortcut::resolve_launch(stored, &expected);
        if rebuild {
            tracing::warn!(link = %link_file.display(), "rewriting launcher shortcut");
            shortcut::save(&com, &expected, &link_file)?;
        }
        Ok(target)
    }

    #[cfg(not(windows))]
    fn resolve_worker(&mut self, launcher: &Path) -> Result<PathBuf> {
        Ok(worker_path(launcher))
    }
}

/// The converter binary is colocated with the launcher.
pub fn worker_path(launcher: &Path) -> PathBuf {
    let name = if cfg!(windows) {
        "cvmd2html-worker.exe"
    } else {
        "cvmd2html-worker"
    };
    launcher.with_file_name(name)
}

/// Expected shortcut contents for the current executable locations.
pub fn expected_link(launcher: &Path) -> DynamicLink {
    DynamicLink::expected(&worker_path(launcher), launcher)
}
