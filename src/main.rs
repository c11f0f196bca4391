// SPDX-License-Identifier: MIT
//
// vimtd: headless runner for modal-editing challenges.
//
// Wires the two library crates together:
//
//   vimtd-engine    → buffer, motions, operators, modes, key dispatch
//   vimtd-challenge → challenge files, attempts, validation
//
// A run loads a challenge (or a bare text), replays a key script through
// the engine, and prints what a player would see plus the verdict:
//
//   challenge.json ──▶ Attempt ──▶ feed_keys ──▶ snapshot + validate
//   --text         ──▶ Editor  ──▶ feed_keys ──▶ snapshot
//
// Logging goes to stderr so stdout stays machine-readable with --json.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vimtd_challenge::{Attempt, ChallengeSpec, ValidationResult};
use vimtd_engine::{Editor, Options, RenderSnapshot};

// ── Command line ────────────────────────────────────────────────────────────

/// Replay a Vim key script against a challenge or a piece of text.
#[derive(Debug, Parser)]
#[command(name = "vimtd", author, version, about, long_about = None)]
struct Cli {
    /// Challenge file (JSON) to play.
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["text", "set"])]
    challenge: Option<PathBuf>,

    /// Initial buffer for a free session without a challenge.
    #[arg(short, long, value_name = "TEXT")]
    text: Option<String>,

    /// Key script in Vim notation, e.g. `dwihi<Esc>`.
    #[arg(short, long, value_name = "SCRIPT", default_value = "", env = "VIMTD_KEYS")]
    keys: String,

    /// `:set` arguments for a free session (repeatable), e.g. `--set et --set ts=4`.
    #[arg(long = "set", value_name = "OPTION")]
    set: Vec<String>,

    /// Print the result as JSON instead of text.
    #[arg(long)]
    json: bool,
}

// ── Logging ─────────────────────────────────────────────────────────────────

const DEFAULT_FILTER: &str = "warn,vimtd=info,vimtd_engine=info,vimtd_challenge=info";

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(create_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// `VIMTD_LOG` > `RUST_LOG` > [`DEFAULT_FILTER`].
fn create_filter() -> EnvFilter {
    if let Ok(level) = env::var("VIMTD_LOG") {
        return EnvFilter::new(expand_vimtd_log(&level));
    }
    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }
    EnvFilter::new(DEFAULT_FILTER)
}

/// A bare level (`VIMTD_LOG=debug`) applies to every vimtd crate; anything
/// with directive syntax is used as-is.
fn expand_vimtd_log(level: &str) -> String {
    if level.contains(['=', ',', ':']) {
        return level.to_string();
    }
    format!("warn,vimtd={level},vimtd_engine={level},vimtd_challenge={level}")
}

// ── Running ─────────────────────────────────────────────────────────────────

/// Everything printed at the end of a run.
#[derive(Debug)]
struct Outcome {
    id: Option<String>,
    snapshot: RenderSnapshot,
    keystrokes: usize,
    verdict: Option<ValidationResult>,
}

impl Outcome {
    /// False only when a challenge was played and missed.
    fn passed(&self) -> bool {
        self.verdict.as_ref().is_none_or(|verdict| verdict.success)
    }

    fn exit_code(&self) -> ExitCode {
        if self.passed() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

fn load_challenge(path: &Path) -> Result<ChallengeSpec> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read challenge {}", path.display()))?;
    let spec: ChallengeSpec = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse challenge {}", path.display()))?;
    spec.check()
        .with_context(|| format!("challenge {} is invalid", spec.id))?;
    Ok(spec)
}

fn run(cli: &Cli) -> Result<Outcome> {
    if let Some(path) = &cli.challenge {
        let spec = load_challenge(path)?;
        info!(id = %spec.id, "playing challenge");
        return play_challenge(spec, &cli.keys);
    }
    let Some(text) = &cli.text else {
        bail!("nothing to play: pass --challenge <FILE> or --text <TEXT>");
    };
    free_session(text, &cli.set, &cli.keys)
}

fn play_challenge(spec: ChallengeSpec, keys: &str) -> Result<Outcome> {
    let id = spec.id.clone();
    let mut attempt = Attempt::new(spec)?;
    let pending = attempt.feed_keys(keys).context("invalid key script")?;
    if pending {
        warn!("key script ended in the middle of a command");
    }
    let verdict = attempt.validate()?;
    let editor = attempt.editor();
    Ok(Outcome {
        id: Some(id),
        snapshot: editor.snapshot(),
        keystrokes: editor.keystrokes(),
        verdict: Some(verdict),
    })
}

fn free_session(text: &str, set: &[String], keys: &str) -> Result<Outcome> {
    let mut options = Options::default();
    for arg in set {
        options
            .apply(arg)
            .with_context(|| format!("bad --set {arg:?}"))?;
    }
    let mut editor = Editor::with_options(text, options);
    let pending = editor.feed_keys(keys).context("invalid key script")?;
    if pending {
        warn!("key script ended in the middle of a command");
    }
    Ok(Outcome {
        id: None,
        snapshot: editor.snapshot(),
        keystrokes: editor.keystrokes(),
        verdict: None,
    })
}

// ── Output ──────────────────────────────────────────────────────────────────

fn render_text(outcome: &Outcome) -> String {
    let snap = &outcome.snapshot;
    let mut out = String::new();
    if let Some(id) = &outcome.id {
        let _ = writeln!(out, "challenge: {id}");
    }
    out.push_str("──── buffer ────\n");
    for line in &snap.lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("────────────────\n");
    let _ = writeln!(out, "cursor: {}", snap.cursor);
    let _ = writeln!(out, "mode: {}", snap.mode_label);
    if let Some(pending) = &snap.pending_label {
        let _ = writeln!(out, "pending: {pending}");
    }
    let _ = writeln!(out, "keystrokes: {}", outcome.keystrokes);
    if let Some(message) = &snap.message {
        let _ = writeln!(out, "message: {message}");
    }
    if let Some(verdict) = &outcome.verdict {
        let status = if verdict.success { "PASS" } else { "FAIL" };
        let _ = writeln!(
            out,
            "verdict: {status} (efficiency {:.2}) {}",
            verdict.efficiency, verdict.message
        );
    }
    out
}

fn render_json(outcome: &Outcome) -> serde_json::Value {
    let snap = &outcome.snapshot;
    serde_json::json!({
        "challenge": outcome.id,
        "text": snap.lines.join("\n"),
        "cursor": { "line": snap.cursor.line, "col": snap.cursor.col },
        "mode": snap.mode_label,
        "pending": snap.pending_label,
        "keystrokes": outcome.keystrokes,
        "message": snap.message,
        "verdict": outcome.verdict.as_ref().map(|v| serde_json::json!({
            "success": v.success,
            "efficiency": v.efficiency,
            "message": v.message,
        })),
    })
}

// ── Entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let outcome = run(&cli)?;
    if cli.json {
        let json = serde_json::to_string_pretty(&render_json(&outcome))?;
        println!("{json}");
    } else {
        print!("{}", render_text(&outcome));
    }
    Ok(outcome.exit_code())
}

// ── Tests ───────────────────────────────────────────────────────────────────
