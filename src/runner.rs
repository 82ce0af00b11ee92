//! External tool invocation.
//!
//! Every child process the pipeline starts goes through a [`ToolRunner`].
//! [`SystemRunner`] spawns real processes; tests substitute a scripted
//! implementation that returns canned output.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

use crate::error::RipError;
use crate::progress::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path.
    pub program: String,
    /// Arguments, not including the program itself.
    pub args: Vec<String>,
}

impl Invocation {
    /// Start an invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The invocation as a single shell command line.
    ///
    /// Words containing shell metacharacters are single-quoted so the line
    /// can be pasted back into a shell.
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|word| shell_quote(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Display for Invocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.command_line())
    }
}

fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Captured result of a finished tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, or `None` if the tool was killed by a signal.
    pub status: Option<i32>,
    /// Everything the tool wrote to standard output.
    pub stdout: String,
    /// Everything the tool wrote to standard error.
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the tool exited with status zero.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Human readable exit status.
    pub fn status_description(&self) -> String {
        match self.status {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs external tools to completion.
pub trait ToolRunner {
    /// Run `invocation`, blocking until it exits, and capture its output.
    ///
    /// A non-zero exit is *not* an error at this level; callers inspect
    /// [`ToolOutput::status`].
    ///
    /// # Errors
    ///
    /// Returns [`RipError::ToolLaunch`] if the program cannot be started and
    /// [`RipError::Cancelled`] if `cancellation` fires while it runs.
    fn run(
        &self,
        invocation: &Invocation,
        cancellation: Option<&CancellationToken>,
    ) -> Result<ToolOutput, RipError>;
}

/// Spawns real child processes.
///
/// Standard input is closed; standard output and error are captured in full.
/// While the child runs, the cancellation token is polled and the child is
/// killed once it fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(
        &self,
        invocation: &Invocation,
        cancellation: Option<&CancellationToken>,
    ) -> Result<ToolOutput, RipError> {
        debug!("Running: {invocation}");

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RipError::ToolLaunch {
                program: invocation.program.clone(),
                reason: e.to_string(),
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_cancellable(&mut child, cancellation);
        let stdout = collect(stdout)?;
        let stderr = collect(stderr)?;
        let status = status?;

        Ok(ToolOutput {
            status,
            stdout,
            stderr,
        })
    }
}

fn wait_cancellable(
    child: &mut Child,
    cancellation: Option<&CancellationToken>,
) -> Result<Option<i32>, RipError> {
    loop {
        if cancellation.is_some_and(CancellationToken::is_cancelled) {
            // The child may have exited on its own in the meantime.
            let _ = child.kill();
            child.wait()?;
            return Err(RipError::Cancelled);
        }
        if let Some(status) = child.try_wait()? {
            return Ok(status.code());
        }
        thread::sleep(POLL_INTERVAL);
    }
}

type Drain = Option<JoinHandle<std::io::Result<Vec<u8>>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            pipe.read_to_end(&mut buffer)?;
            Ok(buffer)
        })
    })
}

fn collect(drain: Drain) -> Result<String, RipError> {
    let Some(handle) = drain else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| std::io::Error::other("output reader thread panicked"))??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
