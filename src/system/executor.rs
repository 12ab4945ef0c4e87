// src/system/executor.rs

use crate::CancellationToken;
use crate::constants::CANCELLATION_POLL_MS;
use crate::models::{OutputEvent, OutputKind, ProcessOutcome};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::Ordering;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Errors raised while launching or waiting for a process.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// An argument string has unbalanced quotes.
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    /// The executable name is empty.
    #[error("No command specified to run.")]
    EmptyCommand,
    /// The process could not be spawned.
    #[error("Tool '{executable}' could not be started")]
    ToolNotFound {
        executable: String,
        #[source]
        source: std::io::Error,
    },
    /// Waiting for the process failed.
    #[error("Failed while waiting for '{executable}' to exit")]
    Wait {
        executable: String,
        #[source]
        source: std::io::Error,
    },
    /// The blocking runtime could not be built.
    #[error("Could not start the async runtime")]
    Runtime(#[source] std::io::Error),
}

/// Returns `true` once the token has been tripped.
pub fn is_cancelled(token: &CancellationToken) -> bool {
    token.load(Ordering::SeqCst)
}

/// A single process launch, configured builder-style and consumed by `run*`.
#[derive(Debug, Clone)]
pub struct Invocation {
    executable: PathBuf,
    arguments: Vec<String>,
    working_directory: Option<PathBuf>,
    env: HashMap<String, String>,
    capture_stdout: bool,
    capture_stderr: bool,
    timeout: Option<Duration>,
    cancellation: Option<CancellationToken>,
}

impl Invocation {
    /// Targets `executable` with no arguments, capturing both streams.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            arguments: Vec::new(),
            working_directory: None,
            env: HashMap::new(),
            capture_stdout: true,
            capture_stderr: true,
            timeout: None,
            cancellation: None,
        }
    }

    /// Appends already tokenized arguments verbatim.
    pub fn args<S: Into<String>>(mut self, arguments: impl IntoIterator<Item = S>) -> Self {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    /// Splits an argument string with POSIX-like rules and appends the tokens.
    pub fn arg_line(self, line: &str) -> Result<Self, ExecutionError> {
        let parts =
            shlex::split(line).ok_or_else(|| ExecutionError::CommandParse(line.to_string()))?;
        Ok(self.args(parts))
    }

    /// Starts the process in `dir`.
    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Adds one environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Adds environment variables.
    pub fn envs(mut self, vars: &HashMap<String, String>) -> Self {
        self.env
            .extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Whether standard output lines are captured.
    pub fn capture_stdout(mut self, capture: bool) -> Self {
        self.capture_stdout = capture;
        self
    }

    /// Whether standard error lines are captured.
    pub fn capture_stderr(mut self, capture: bool) -> Self {
        self.capture_stderr = capture;
        self
    }

    /// Kills the process after `timeout`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Kills the process once `token` is set.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The target executable.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// The arguments passed so far.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Runs the process without a line callback.
    pub async fn run(&self) -> Result<ProcessOutcome, ExecutionError> {
        self.run_with(|_| {}).await
    }

    /// Runs the process to completion, timeout or cancellation. `on_event`
    /// sees every captured line as it arrives, in the same order as the
    /// returned outcome.
    pub async fn run_with(
        &self,
        mut on_event: impl FnMut(&OutputEvent),
    ) -> Result<ProcessOutcome, ExecutionError> {
        let display_name = self.executable.display().to_string();
        let mut command = Command::new(&self.executable);
        command
            .args(&self.arguments)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_directory {
            command.current_dir(dunce::simplified(dir));
        }

        let mut child = command
            .spawn()
            .map_err(|source| ExecutionError::ToolNotFound {
                executable: display_name.clone(),
                source,
            })?;
        log::debug!("Spawned '{}' (PID: {:?})", display_name, child.id());

        // Both streams are always drained so a chatty tool never blocks on a
        // full pipe; only captured streams reach the channel.
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, OutputKind::Std, self.capture_stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr, OutputKind::Err, self.capture_stderr, tx.clone()));
        }
        drop(tx);

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut poll = tokio::time::interval(Duration::from_millis(CANCELLATION_POLL_MS));
        let mut events = Vec::new();

        // The run is finished once the process has exited and both streams
        // reached end of file. A background grandchild can hold the pipes
        // open past the exit, so the deadline and the token stay armed until
        // both conditions hold.
        let mut exit_status = None;
        let mut streams_closed = false;
        let finished = loop {
            tokio::select! {
                event = rx.recv(), if !streams_closed => match event {
                    Some(event) => {
                        log::trace!("[{:?}] {}", event.kind, event.text);
                        on_event(&event);
                        events.push(event);
                    }
                    None => {
                        streams_closed = true;
                        if exit_status.is_some() {
                            break true;
                        }
                    }
                },
                status = child.wait(), if exit_status.is_none() => {
                    let status = status.map_err(|source| ExecutionError::Wait {
                        executable: display_name.clone(),
                        source,
                    })?;
                    log::debug!("'{}' exited with {:?}", display_name, status.code());
                    exit_status = Some(status);
                    if streams_closed {
                        break true;
                    }
                }
                _ = wait_for_deadline(deadline) => {
                    log::warn!(
                        "'{}' did not finish within {:?}; killing it.",
                        display_name,
                        self.timeout.unwrap_or_default()
                    );
                    break false;
                }
                _ = poll.tick() => {
                    if self.cancellation.as_ref().is_some_and(is_cancelled) {
                        log::debug!("Cancellation requested, killing '{}'.", display_name);
                        break false;
                    }
                }
            }
        };

        if finished {
            return Ok(ProcessOutcome {
                events,
                exit_code: exit_status.and_then(|status| status.code()),
                cancelled: false,
            });
        }

        // An already reaped child cannot be killed again.
        if exit_status.is_none() {
            if let Err(e) = child.kill().await {
                log::warn!("Failed to kill '{}': {}", display_name, e);
            }
        }
        // Grandchildren may still hold the pipes open, so keep what already
        // arrived and stop reading.
        drain(&mut rx, &mut events, &mut on_event);
        for reader in readers {
            reader.abort();
        }
        Ok(ProcessOutcome {
            events,
            exit_code: None,
            cancelled: true,
        })
    }

    /// Runs on a private current-thread runtime. Must not be called from
    /// inside an async context.
    pub fn run_blocking(
        &self,
        on_event: impl FnMut(&OutputEvent),
    ) -> Result<ProcessOutcome, ExecutionError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ExecutionError::Runtime)?
            .block_on(self.run_with(on_event))
    }
}

/// Launches `executable` with an argument string split POSIX-style.
pub async fn execute(
    executable: &str,
    arguments: &str,
    capture_stdout: bool,
    capture_stderr: bool,
    timeout: Option<Duration>,
) -> Result<ProcessOutcome, ExecutionError> {
    if executable.trim().is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }
    Invocation::new(executable)
        .arg_line(arguments)?
        .capture_stdout(capture_stdout)
        .capture_stderr(capture_stderr)
        .timeout(timeout)
        .run()
        .await
}

async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn spawn_reader<R>(
    stream: R,
    kind: OutputKind,
    capture: bool,
    tx: UnboundedSender<OutputEvent>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer).await {
                Ok(0) => break,
                Ok(_) => {
                    if !capture {
                        continue;
                    }
                    let line = String::from_utf8_lossy(&buffer);
                    let line = line.trim_end_matches(['\n', '\r']);
                    if tx.send(OutputEvent::new(kind, line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::debug!("Stopped reading {:?}: {}", kind, e);
                    break;
                }
            }
        }
    })
}

fn drain(
    rx: &mut UnboundedReceiver<OutputEvent>,
    events: &mut Vec<OutputEvent>,
    on_event: &mut impl FnMut(&OutputEvent),
) {
    rx.close();
    while let Ok(event) = rx.try_recv() {
        on_event(&event);
        events.push(event);
    }
}
