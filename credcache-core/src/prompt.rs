//! Value providers used when a cache entry is missing or being reset.
//!
//! - [`Prompter`] - Trait for line-input providers
//! - [`TerminalPrompter`] - Reads from the controlling terminal
//! - [`ScriptedPrompter`] - Replays queued answers, for tests and automation

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::validator::Validator;

/// Error type for input providers.
#[derive(Debug, Error)]
pub enum PromptError {
    /// Reading from or writing to the terminal failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The input stream ended before a value was entered.
    #[error("input closed while waiting for: {prompt}")]
    Closed { prompt: String },

    /// A scripted provider has no answers left.
    #[error("no scripted answer left for: {prompt}")]
    Exhausted { prompt: String },
}

/// Source of user-supplied values.
pub trait Prompter: Send {
    /// Show `text` and return one line of input.
    ///
    /// When `conceal` is set the typed characters must not be echoed.
    fn prompt(&self, text: &str, conceal: bool) -> Result<String, PromptError>;

    /// Tell the user why the previous input was rejected.
    fn reject(&self, message: &str);
}

/// Prompt until `validator` accepts the input.
///
/// Rejected input is never surfaced as an error; the validator message is
/// shown and the prompt repeats. Only provider failures end the loop.
pub(crate) fn prompt_until_valid(
    prompter: &dyn Prompter,
    text: &str,
    conceal: bool,
    validator: &Validator,
) -> Result<String, PromptError> {
    loop {
        let input = prompter.prompt(text, conceal)?;
        if validator.validate(&input) {
            return Ok(input);
        }
        debug!("Input rejected by validator, prompting again");
        prompter.reject(validator.message());
    }
}

/// Interactive prompter on stdin/stderr.
///
/// Concealed input goes through `rpassword`, which reads from the TTY
/// without echo.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn prompt(&self, text: &str, conceal: bool) -> Result<String, PromptError> {
        if conceal {
            return Ok(rpassword::prompt_password(text)?);
        }

        let mut stderr = io::stderr();
        write!(stderr, "{}", text)?;
        stderr.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(PromptError::Closed {
                prompt: text.to_string(),
            });
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    fn reject(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// A prompt as seen by a [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRecord {
    pub text: String,
    pub conceal: bool,
}

#[derive(Debug, Default)]
struct Script {
    answers: VecDeque<String>,
    prompts: Vec<PromptRecord>,
    rejections: Vec<String>,
}

/// Prompter that replays a queue of answers.
///
/// Clones share the same queue and history, so a caller can keep a handle
/// after giving one to a [`Cache`](crate::Cache).
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    script: Arc<Mutex<Script>>,
}

impl ScriptedPrompter {
    /// Create a prompter that answers with `answers`, in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = Script {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Script::default()
        };
        Self {
            script: Arc::new(Mutex::new(script)),
        }
    }

    /// Queue another answer.
    pub fn push(&self, answer: impl Into<String>) {
        self.script.lock().answers.push_back(answer.into());
    }

    /// Every prompt shown so far.
    pub fn prompts(&self) -> Vec<PromptRecord> {
        self.script.lock().prompts.clone()
    }

    /// Number of prompts shown so far.
    pub fn prompt_count(&self) -> usize {
        self.script.lock().prompts.len()
    }

    /// Every rejection message shown so far.
    pub fn rejections(&self) -> Vec<String> {
        self.script.lock().rejections.clone()
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&self, text: &str, conceal: bool) -> Result<String, PromptError> {
        let mut script = self.script.lock();
        script.prompts.push(PromptRecord {
            text: text.to_string(),
            conceal,
        });
        script.answers.pop_front().ok_or_else(|| PromptError::Exhausted {
            prompt: text.to_string(),
        })
    }

    fn reject(&self, message: &str) {
        self.script.lock().rejections.push(message.to_string());
    }
}
