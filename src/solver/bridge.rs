//! Subprocess bridge to an external DIMACS solver.
//!
//! The problem is streamed to the child's stdin from a dedicated writer
//! thread while this thread reads stdout incrementally; serializing those
//! two against each other can deadlock on large problems (the write blocks
//! because the child's output pipe is full, the child blocks because nobody
//! drains it). Stderr is drained by a third thread and forwarded to the
//! log, never parsed.

use std::env;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

use log::{debug, warn};
use thiserror::Error;

use crate::cnf::Problem;

use super::solution::Solution;

/// Solver binaries probed, in order, when the caller does not name one.
/// All of them read DIMACS on stdin and answer with `s`/`v` lines.
const DEFAULT_SOLVERS: &[&str] = &["cadical", "picosat", "kissat"];

/// The external solver invocation: program name or path, plus arguments.
#[derive(Debug, Clone)]
pub struct SolverCmd {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl SolverCmd {
    pub fn new(program: impl Into<PathBuf>) -> SolverCmd {
        SolverCmd { program: program.into(), args: Vec::new() }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> SolverCmd {
        self.args.push(arg.into());
        self
    }

    /// Probe `$PATH` for a known stdin-driven solver.
    pub fn probe() -> Option<SolverCmd> {
        DEFAULT_SOLVERS
            .iter()
            .find_map(|name| find_in_path(name))
            .map(SolverCmd::new)
    }
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// The verdict of one solver run.
///
/// `Indeterminate` covers every protocol-level ambiguity: death by signal,
/// missing verdict line, missing assignment terminator, malformed
/// assignment tokens. Never folded into `Unsatisfiable`: a broken run
/// proves nothing about the problem.
#[derive(Debug)]
pub enum Outcome {
    Unsatisfiable,
    Satisfiable(Solution),
    Indeterminate(String),
}

impl Outcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Satisfiable(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_sat(&self) -> bool {
        matches!(self, Outcome::Satisfiable(_))
    }
}

/// Infrastructure failures below the protocol: the child could not be
/// spawned or a pipe broke unrecoverably. Protocol problems are reported
/// as [`Outcome::Indeterminate`], not here.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("failed to spawn solver `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("i/o error talking to solver: {0}")]
    Io(#[from] std::io::Error),
}

/// Kills the child if the run is abandoned before completion, so neither a
/// panic nor an early return leaks a running solver.
struct ChildGuard {
    child: Child,
    finished: bool,
}

impl ChildGuard {
    fn wait(&mut self) -> std::io::Result<ExitStatus> {
        let status = self.child.wait();
        self.finished = true;
        status
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Serialize `problem`, run the solver over it, and decode the result
/// stream.
pub fn solve(problem: &Problem, cmd: &SolverCmd) -> Result<Outcome, SolveError> {
    debug!(
        "solving: {} variables, {} clauses via {}",
        problem.var_count(),
        problem.clause_count(),
        cmd.program.display()
    );

    let child = Command::new(&cmd.program)
        .args(&cmd.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| SolveError::Spawn {
            program: cmd.program.display().to_string(),
            source,
        })?;
    let mut guard = ChildGuard { child, finished: false };

    let mut stdin = guard.child.stdin.take().expect("child stdin was piped");
    let stdout = guard.child.stdout.take().expect("child stdout was piped");
    let stderr = guard.child.stderr.take().expect("child stderr was piped");

    // Writer runs concurrently with the stdout reader below. A write error
    // here usually means the solver decided early and closed its stdin;
    // the verdict parsing decides what that run meant.
    let dimacs = problem.to_dimacs();
    let writer = thread::spawn(move || {
        if let Err(e) = stdin.write_all(&dimacs) {
            debug!("solver stdin closed early: {}", e);
        }
    });

    let stderr_reader = thread::spawn(move || {
        for line in BufReader::new(stderr).lines() {
            match line {
                Ok(line) => warn!("solver stderr: {}", line),
                Err(_) => break,
            }
        }
    });

    let parsed = parse_result_stream(BufReader::new(stdout));

    let _ = writer.join();
    let _ = stderr_reader.join();
    let status = guard.wait()?;

    Ok(interpret(parsed, status))
}

/// What the stdout stream said, before judging completeness.
struct ParsedStream {
    verdict: Option<bool>,
    assignment: Vec<i64>,
    terminated: bool,
    protocol_error: Option<String>,
}

/// Incremental, line-buffered parse of the result stream. Lines can arrive
/// split across reads; `BufRead::lines` reassembles them. `s` lines carry
/// the verdict, `v` lines the assignment, everything else is diagnostic.
fn parse_result_stream<R: BufRead>(reader: R) -> ParsedStream {
    let mut parsed = ParsedStream {
        verdict: None,
        assignment: Vec::new(),
        terminated: false,
        protocol_error: None,
    };

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                parsed.protocol_error.get_or_insert(format!("read error: {}", e));
                break;
            }
        };
        if parsed.protocol_error.is_some() {
            // Already broken; keep draining so the child can finish.
            debug!("solver (ignored): {}", line);
            continue;
        }
        if let Some(rest) = line.strip_prefix("s ") {
            parsed.verdict = Some(rest.trim() == "SATISFIABLE");
        } else if let Some(rest) = line.strip_prefix("v ") {
            for token in rest.split_whitespace() {
                if parsed.terminated {
                    parsed.protocol_error =
                        Some(format!("assignment token `{}` after terminator", token));
                    break;
                }
                match token.parse::<i64>() {
                    Ok(0) => parsed.terminated = true,
                    Ok(lit) => parsed.assignment.push(lit),
                    Err(_) => {
                        parsed.protocol_error =
                            Some(format!("malformed assignment token `{}`", token));
                        break;
                    }
                }
            }
        } else {
            debug!("solver: {}", line);
        }
    }

    parsed
}

fn interpret(parsed: ParsedStream, status: ExitStatus) -> Outcome {
    if let Some(reason) = parsed.protocol_error {
        return Outcome::Indeterminate(reason);
    }
    if status.code().is_none() {
        return Outcome::Indeterminate(format!("solver killed by signal ({})", status));
    }
    match parsed.verdict {
        None => Outcome::Indeterminate("solver exited without a verdict line".to_string()),
        // Solver convention exits nonzero (10/20) to mirror the verdict;
        // once an `s` line was seen the exit code carries no information.
        Some(false) => Outcome::Unsatisfiable,
        Some(true) if !parsed.terminated => {
            Outcome::Indeterminate("assignment missing its 0 terminator".to_string())
        }
        Some(true) => Outcome::Satisfiable(Solution::from_literals(&parsed.assignment)),
    }
}
