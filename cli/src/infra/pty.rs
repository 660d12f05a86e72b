//! PTY-backed implementation of the `InteractiveDriver` port.
//!
//! The child's stdio is the slave side of a pseudo-terminal. A reader thread
//! pumps the master side into a channel; the expect loop consumes that
//! channel and writes answers back to the master. The whole session is
//! blocking and runs under `tokio::task::spawn_blocking`.

use std::fs::File;
use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use nix::pty::{Winsize, openpty};
use nix::sys::termios::Termios;

use crate::application::ports::{DriveOutcome, InteractiveDriver};
use crate::domain::ProvisionError;
use crate::domain::expect::{ExpectScript, OutputBuffer};

const WAIT_POLL: Duration = Duration::from_millis(50);
const READ_CHUNK: usize = 4096;

/// Production `InteractiveDriver`.
#[derive(Debug, Default)]
pub struct PtyDriver;

impl InteractiveDriver for PtyDriver {
    async fn drive(
        &self,
        program: &str,
        args: &[&str],
        script: &ExpectScript,
        overall_timeout: Option<Duration>,
    ) -> Result<DriveOutcome> {
        let program = program.to_string();
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        let script = script.clone();
        tokio::task::spawn_blocking(move || drive_blocking(&program, &args, &script, overall_timeout))
            .await
            .context("interactive driver task panicked")?
    }
}

fn drive_blocking(
    program: &str,
    args: &[String],
    script: &ExpectScript,
    overall_timeout: Option<Duration>,
) -> Result<DriveOutcome> {
    let spawn_error = |reason: String| ProvisionError::ProcessSpawn {
        program: program.to_string(),
        reason,
    };

    let size = Winsize {
        ws_row: 24,
        ws_col: 80,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let pty = openpty(Some(&size), None::<&Termios>)
        .map_err(|e| spawn_error(format!("cannot allocate a terminal: {e}")))?;
    let mut master = File::from(pty.master);
    let reader = master
        .try_clone()
        .map_err(|e| spawn_error(format!("cannot share the terminal: {e}")))?;

    let mut child = {
        let slave = pty.slave;
        let stdin = slave.try_clone().map_err(|e| spawn_error(e.to_string()))?;
        let stdout = slave.try_clone().map_err(|e| spawn_error(e.to_string()))?;
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(slave));
        command.spawn().map_err(|e| spawn_error(e.to_string()))?
        // `command` drops here, closing the parent's slave descriptors so the
        // reader sees end-of-file once the child exits.
    };
    tracing::debug!(program, ?args, pid = child.id(), "spawned on pty");

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || pump(reader, &tx));

    let progress = run_script(&rx, &mut master, script);
    let status = wait_for_exit(&mut child, &rx, overall_timeout, program)?;
    tracing::debug!(program, %status, answered = ?progress.answered, skipped = ?progress.skipped, "interactive session finished");

    Ok(DriveOutcome {
        status,
        answered: progress.answered,
        skipped: progress.skipped,
    })
}

fn pump(mut reader: File, tx: &Sender<Vec<u8>>) {
    let mut buf = [0u8; READ_CHUNK];
    loop {
        match reader.read(&mut buf) {
            // EIO on Linux once every slave descriptor is closed.
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

/// Steps answered and skipped by [`run_script`].
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ScriptProgress {
    pub answered: Vec<usize>,
    pub skipped: Vec<usize>,
}

/// Work through `script` against the child's output stream.
///
/// A step whose prompt does not appear within its timeout is skipped. Once
/// the stream closes, or an answer cannot be delivered, every remaining step
/// is skipped.
pub(crate) fn run_script(
    rx: &Receiver<Vec<u8>>,
    writer: &mut impl Write,
    script: &ExpectScript,
) -> ScriptProgress {
    let mut buffer = OutputBuffer::default();
    let mut progress = ScriptProgress::default();
    let mut closed = false;

    for (index, step) in script.steps.iter().enumerate() {
        if closed {
            progress.skipped.push(index);
            continue;
        }
        let deadline = Instant::now() + step.timeout;
        loop {
            if buffer.consume_match(&step.pattern) {
                tracing::debug!(step = index, pattern = %step.pattern, "prompt matched");
                match answer(writer, &step.response) {
                    Ok(()) => progress.answered.push(index),
                    Err(err) => {
                        tracing::debug!(step = index, error = %err, "answer not delivered");
                        closed = true;
                        progress.skipped.push(index);
                    }
                }
                break;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::debug!(step = index, pattern = %step.pattern, "prompt not seen; skipping");
                progress.skipped.push(index);
                break;
            }
            match rx.recv_timeout(remaining) {
                Ok(chunk) => buffer.push(&chunk),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!(step = index, "terminal closed before prompt");
                    closed = true;
                    progress.skipped.push(index);
                    break;
                }
            }
        }
    }
    progress
}

fn answer(writer: &mut impl Write, response: &str) -> io::Result<()> {
    writer.write_all(response.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Wait for the child while draining its output; kill it at the deadline.
fn wait_for_exit(
    child: &mut Child,
    rx: &Receiver<Vec<u8>>,
    overall_timeout: Option<Duration>,
    program: &str,
) -> Result<ExitStatus> {
    let deadline = overall_timeout.map(|limit| (Instant::now() + limit, limit));
    let mut drained = true;
    loop {
        if let Some(status) = child
            .try_wait()
            .with_context(|| format!("waiting for {program}"))?
        {
            return Ok(status);
        }
        if let Some((_, limit)) = deadline.filter(|(at, _)| Instant::now() >= *at) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ProvisionError::ProcessTimeout {
                program: program.to_string(),
                secs: limit.as_secs(),
            }
            .into());
        }
        if drained {
            match rx.recv_timeout(WAIT_POLL) {
                Ok(chunk) => tracing::trace!(output = %String::from_utf8_lossy(&chunk), "child output"),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => drained = false,
            }
        } else {
            std::thread::sleep(WAIT_POLL);
        }
    }
}
