//! Terminal adapters used by the `monitor` binary.
//!
//! `TerminalView` keeps a mirror of the list (the same patches a DOM would
//! receive) and renders it as text once the command is done.
//! `TerminalPrompt` asks for confirmation on a line-oriented reader.

#[cfg(test)]
#[path = "terminal_test.rs"]
mod terminal_test;

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use crate::prompt::Interaction;
use crate::view::{ListView, SubmitState, ViewPatch, ViewSink};

// =============================================================================
// VIEW
// =============================================================================

#[derive(Debug, Default)]
pub struct TerminalView {
    list: ListView,
    submit: SubmitState,
}

impl TerminalView {
    #[must_use]
    pub fn list(&self) -> &ListView {
        &self.list
    }

    #[must_use]
    pub fn submit_state(&self) -> SubmitState {
        self.submit
    }

    /// Text rendering of the current list.
    #[must_use]
    pub fn render_text(&self) -> String {
        if let Some(message) = self.list.message() {
            return format!("{message}\n");
        }

        let mut out = String::new();
        for card in self.list.cards() {
            let _ = writeln!(out, "[{}] {}", card.monitor_id, card.url);
            let _ = writeln!(out, "    selector: {}", card.css_selector);
            let _ = writeln!(out, "    email:    {}", card.user_email);
        }
        out
    }
}

impl ViewSink for TerminalView {
    fn apply(&mut self, patches: &[ViewPatch]) {
        tracing::trace!(count = patches.len(), "applying view patches");
        self.list.apply_all(patches);
    }

    fn set_submit_state(&mut self, state: SubmitState) {
        tracing::debug!(label = state.label(), "submit state");
        self.submit = state;
    }

    fn reset_form(&mut self) {}
}

// =============================================================================
// PROMPT
// =============================================================================

/// `[y/N]` confirmation over a reader/writer pair.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    assume_yes: bool,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stdin/stderr, so stdout carries only command output.
    #[must_use]
    pub fn stdio(assume_yes: bool) -> Self {
        Self::new(io::stdin().lock(), io::stderr(), assume_yes)
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W, assume_yes: bool) -> Self {
        Self { input, output, assume_yes }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Interaction for TerminalPrompt<R, W> {
    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if write!(self.output, "{message} [y/N] ").and_then(|()| self.output.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read confirmation");
                false
            }
        }
    }

    fn report_failure(&mut self, message: &str) {
        let _ = writeln!(self.output, "{message}");
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
