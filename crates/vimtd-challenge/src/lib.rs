//! # vimtd-challenge: challenge specifications and validation
//!
//! A challenge is plain data: a starting text, editor options, a par
//! keystroke count and one [`Rule`] the final buffer must satisfy. Hosts
//! load it (usually from JSON), play an [`Attempt`] against it, and get a
//! [`ValidationResult`] back.
//!
//! ```json
//! {
//!   "id": "delete-word",
//!   "initial_text": "hello world",
//!   "options": ["expandtab", "ts=4"],
//!   "par_keystrokes": 2,
//!   "rule": { "kind": "exact_match", "expected": "world" }
//! }
//! ```
//!
//! Validation only reads the final text, cursor and keystroke count, so it
//! works the same for an engine-driven [`Attempt`] and for text produced by
//! any other editor.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use vimtd_engine::{Editor, KeyParseError, OptionError, Options, Position};

#[derive(Debug, Error)]
pub enum ChallengeError {
    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid option {option:?}: {source}")]
    InvalidOption {
        option: String,
        #[source]
        source: OptionError,
    },

    #[error(transparent)]
    Key(#[from] KeyParseError),
}

// ---------------------------------------------------------------------------
// Specification
// ---------------------------------------------------------------------------

/// What the final state must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// The whole buffer equals `expected`.
    ExactMatch { expected: String },
    /// The buffer contains `needle`.
    Contains { needle: String },
    /// The cursor ends at this 0-indexed position.
    CursorAt { line: usize, col: usize },
    /// The buffer is no longer the initial text.
    DiffersFromInitial,
    /// The buffer matches a regular expression.
    Regex { pattern: String },
    /// The buffer defines a function called `name` (`fn`, `func`, `def` or
    /// `function` syntax).
    FunctionExists { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub initial_text: String,
    /// `:set` arguments applied before the first key.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub par_keystrokes: Option<usize>,
    pub rule: Rule,
}

impl ChallengeSpec {
    /// A challenge with default options and no par.
    #[must_use]
    pub fn new(id: impl Into<String>, initial_text: impl Into<String>, rule: Rule) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            initial_text: initial_text.into(),
            options: Vec::new(),
            par_keystrokes: None,
            rule,
        }
    }

    /// Editor options with every `:set` string applied in order.
    pub fn editor_options(&self) -> Result<Options, ChallengeError> {
        let mut options = Options::default();
        for option in &self.options {
            options
                .apply(option)
                .map_err(|source| ChallengeError::InvalidOption {
                    option: option.clone(),
                    source,
                })?;
        }
        Ok(options)
    }

    /// Reject a challenge whose options or pattern cannot work, before
    /// anyone plays it.
    pub fn check(&self) -> Result<(), ChallengeError> {
        self.editor_options()?;
        match &self.rule {
            Rule::Regex { pattern } => compile(pattern).map(drop),
            Rule::FunctionExists { name } => function_pattern(name).map(drop),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub success: bool,
    /// `par / keystrokes`, at most 1.0. Zero on failure.
    pub efficiency: f64,
    pub message: String,
}

/// Check a finished attempt against `spec`.
pub fn validate(
    spec: &ChallengeSpec,
    final_text: &str,
    cursor: Position,
    keystrokes: usize,
) -> Result<ValidationResult, ChallengeError> {
    let failure = match &spec.rule {
        Rule::ExactMatch { expected } => {
            (final_text != expected).then(|| format!("Expected {expected:?}, got {final_text:?}"))
        }
        Rule::Contains { needle } => {
            (!final_text.contains(needle.as_str())).then(|| format!("Text does not contain {needle:?}"))
        }
        Rule::CursorAt { line, col } => {
            let target = Position::new(*line, *col);
            (cursor != target).then(|| format!("Cursor at {cursor}, expected {target}"))
        }
        Rule::DiffersFromInitial => {
            (final_text == spec.initial_text).then(|| "Text is unchanged".to_string())
        }
        Rule::Regex { pattern } => (!compile(pattern)?.is_match(final_text))
            .then(|| format!("Text does not match /{pattern}/")),
        Rule::FunctionExists { name } => (!function_pattern(name)?.is_match(final_text))
            .then(|| format!("No function named {name}")),
    };

    let result = match failure {
        Some(message) => ValidationResult {
            success: false,
            efficiency: 0.0,
            message,
        },
        None => {
            let message = match spec.par_keystrokes {
                Some(par) => format!("Solved in {keystrokes} keystrokes (par {par})"),
                None => format!("Solved in {keystrokes} keystrokes"),
            };
            ValidationResult {
                success: true,
                efficiency: efficiency(spec.par_keystrokes, keystrokes),
                message,
            }
        }
    };
    debug!(
        id = %spec.id,
        success = result.success,
        efficiency = result.efficiency,
        "validated attempt"
    );
    Ok(result)
}

/// `par / keystrokes` capped at 1.0; 1.0 without a par or without keys.
#[allow(clippy::cast_precision_loss)]
fn efficiency(par: Option<usize>, keystrokes: usize) -> f64 {
    match par {
        Some(par) if par > 0 && keystrokes > 0 => (par as f64 / keystrokes as f64).min(1.0),
        _ => 1.0,
    }
}

fn compile(pattern: &str) -> Result<Regex, ChallengeError> {
    Regex::new(pattern).map_err(|source| {
        warn!(pattern, "invalid challenge pattern");
        ChallengeError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    })
}

/// A definition of `name` in a Rust, Go, Python or JavaScript style:
/// `fn name(`, `fn name<T>(`, `func (r *T) name(`, `def name(`,
/// `function name(`.
fn function_pattern(name: &str) -> Result<Regex, ChallengeError> {
    compile(&format!(
        r"\b(?:fn|func(?:\s*\([^)]*\))?|def|function)\s+{}\s*(?:<[^>]*>)?\s*\(",
        regex::escape(name)
    ))
}

// ---------------------------------------------------------------------------
// Attempt
// ---------------------------------------------------------------------------

/// One play of a challenge: an editor seeded from the spec.
#[derive(Debug)]
pub struct Attempt {
    spec: ChallengeSpec,
    editor: Editor,
}

impl Attempt {
    pub fn new(spec: ChallengeSpec) -> Result<Self, ChallengeError> {
        let options = spec.editor_options()?;
        let editor = Editor::with_options(&spec.initial_text, options);
        debug!(id = %spec.id, "attempt started");
        Ok(Self { spec, editor })
    }

    #[must_use]
    pub const fn spec(&self) -> &ChallengeSpec {
        &self.spec
    }

    #[must_use]
    pub const fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Feed one key token. Returns whether the command needs more input.
    pub fn feed_token(&mut self, token: &str) -> Result<bool, ChallengeError> {
        Ok(self.editor.feed_token(token)?)
    }

    /// Feed a key script in Vim notation.
    pub fn feed_keys(&mut self, script: &str) -> Result<bool, ChallengeError> {
        Ok(self.editor.feed_keys(script)?)
    }

    pub fn validate(&self) -> Result<ValidationResult, ChallengeError> {
        validate(
            &self.spec,
            &self.editor.text(),
            self.editor.cursor(),
            self.editor.keystrokes(),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
