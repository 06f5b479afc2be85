use std::{
    ffi::OsString,
    fmt, io,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    process::{Child, ChildStdin, ChildStdout, Command},
    sync::mpsc,
    time::Instant,
};

/// Upper bound on waiting for the OS to report a killed process as terminated.
pub const KILL_CONFIRMATION_LIMIT: Duration = Duration::from_millis(2000);

/// How long stdout may stay open after the process itself has terminated.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_millis(100);

/// A program to launch, optionally through an indirect executor
/// (`executor program args...`), e.g. an interpreter for scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    executor: Option<PathBuf>,
    args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            executor: None,
            args: Vec::new(),
        }
    }

    pub fn executor(mut self, executor: impl Into<PathBuf>) -> Self {
        self.executor = Some(executor.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn get_program(&self) -> &Path {
        &self.program
    }

    pub fn get_executor(&self) -> Option<&Path> {
        self.executor.as_deref()
    }

    fn command(&self) -> Command {
        let mut cmd = match &self.executor {
            Some(executor) => {
                let mut cmd = Command::new(executor);
                cmd.arg(&self.program);
                cmd
            }
            None => Command::new(&self.program),
        };
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(executor) = &self.executor {
            write!(f, "{} ", executor.to_string_lossy())?;
        }
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecStatus {
    Ok,
    TimedOut,
    NonZeroExit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub status: ExecStatus,
    /// `None` when timed out. On Unix a process killed by a signal reports
    /// the negated signal number.
    pub exit_code: Option<i32>,
    /// From spawn to confirmed termination, including any kill.
    pub elapsed: Duration,
    /// Lines received before the stream ended or the process was killed.
    pub stdout_lines: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Failed to launch '{invocation}': {source}")]
    Launch {
        invocation: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot confirm termination of '{invocation}' after kill")]
    KillUnconfirmed { invocation: String },

    #[error("Failed to wait for '{invocation}': {source}")]
    Wait {
        invocation: String,
        #[source]
        source: io::Error,
    },
}

impl RunError {
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, RunError::Launch { .. })
    }
}

/// Runs `invocation` with `stdin_lines` fed to its stdin and kills it once
/// `time_limit` has elapsed since spawn.
pub async fn run(
    invocation: &Invocation,
    stdin_lines: &[String],
    time_limit: Duration,
) -> Result<ExecutionOutcome, RunError> {
    let mut proc = invocation
        .command()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| RunError::Launch {
            invocation: invocation.to_string(),
            source,
        })?;
    let start_at = Instant::now();
    log::debug!("Spawned '{}' (pid={:?})", invocation, proc.id());

    let writer = proc
        .stdin
        .take()
        .map(|stdin| tokio::spawn(feed_lines(stdin, join_lines(stdin_lines))));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let reader = proc
        .stdout
        .take()
        .map(|stdout| tokio::spawn(collect_lines(stdout, tx)));

    let remaining = time_limit.saturating_sub(start_at.elapsed());
    let exit_status = if remaining.is_zero() {
        None
    } else {
        match tokio::time::timeout(remaining, proc.wait()).await {
            Ok(status) => Some(status.map_err(|source| RunError::Wait {
                invocation: invocation.to_string(),
                source,
            })?),
            Err(_) => None,
        }
    };
    if exit_status.is_none() {
        terminate(&mut proc, invocation).await?;
    }
    let elapsed = start_at.elapsed();

    if let Some(writer) = writer {
        if !writer.is_finished() {
            writer.abort();
        } else if let Ok(Err(e)) = writer.await {
            log::debug!("Could not pass whole input to '{}': {}", invocation, e);
        }
    }

    if let Some(mut reader) = reader {
        if tokio::time::timeout(OUTPUT_DRAIN_GRACE, &mut reader)
            .await
            .is_err()
        {
            log::debug!(
                "stdout of '{}' is still open after termination; keeping lines received so far",
                invocation
            );
            reader.abort();
        }
    }
    let mut stdout_lines = Vec::new();
    while let Ok(line) = rx.try_recv() {
        stdout_lines.push(line);
    }

    let (status, exit_code) = match exit_status {
        None => (ExecStatus::TimedOut, None),
        Some(exit_status) => {
            let code = self::exit_code(exit_status);
            if code == 0 {
                (ExecStatus::Ok, Some(code))
            } else {
                (ExecStatus::NonZeroExit, Some(code))
            }
        }
    };
    log::debug!(
        "'{}' finished: {:?} (exit_code={:?}, {}ms, {} line(s))",
        invocation,
        status,
        exit_code,
        elapsed.as_millis(),
        stdout_lines.len()
    );

    Ok(ExecutionOutcome {
        status,
        exit_code,
        elapsed,
        stdout_lines,
    })
}

async fn terminate(proc: &mut Child, invocation: &Invocation) -> Result<ExitStatus, RunError> {
    log::debug!("Killing '{}' (time limit exceeded)", invocation);
    if let Err(e) = proc.start_kill() {
        // It may have exited on its own right after the deadline.
        log::debug!("Failed to send kill to '{}': {}", invocation, e);
    }
    match tokio::time::timeout(KILL_CONFIRMATION_LIMIT, proc.wait()).await {
        Ok(status) => status.map_err(|source| RunError::Wait {
            invocation: invocation.to_string(),
            source,
        }),
        Err(_) => Err(RunError::KillUnconfirmed {
            invocation: invocation.to_string(),
        }),
    }
}

fn join_lines(lines: &[String]) -> String {
    let mut buf = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        buf.push_str(line);
        buf.push('\n');
    }
    buf
}

async fn feed_lines(mut stdin: ChildStdin, data: String) -> io::Result<()> {
    stdin.write_all(data.as_bytes()).await?;
    stdin.flush().await?;
    drop(stdin); // closes the pipe so the child sees EOF
    Ok(())
}

async fn collect_lines(stdout: ChildStdout, tx: mpsc::UnboundedSender<String>) -> io::Result<()> {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        if tx.send(String::from_utf8_lossy(&buf).into_owned()).is_err() {
            return Ok(());
        }
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt as _;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
