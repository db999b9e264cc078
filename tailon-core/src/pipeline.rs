// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Pipeline runner — spawns the (optional upstream, required downstream)
//! process pair, wires them together, and fans `procB`'s stdout/stderr into
//! framed outbound lines.
//!
//! Grounded in `sven-tools/src/builtin/shell.rs` for the `tokio::process`
//! spawning discipline (`Stdio::piped`/`null`, `kill_on_drop(true)`) and in
//! `examples/original_source/server.go`'s `runCommand`/`killProcs` for wiring
//! and teardown order: procA's stdout feeds procB's stdin before procA is
//! started, and teardown always kills procA before touching procB.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::frame::OutboundLine;

/// Children are given this long to exit after being signaled before the
/// supervisor force-kills them, bounding teardown time per §5.
const TEARDOWN_GRACE: Duration = Duration::from_millis(500);

fn build_command(argv: &[String]) -> Command {
    let program = argv.first().cloned().unwrap_or_default();
    let mut cmd = Command::new(program);
    cmd.args(argv.iter().skip(1));
    cmd.kill_on_drop(true);
    cmd
}

/// A running process pair owned by exclusively one session.
///
/// Invariant: at most one `Pipeline` per session is live at any time; the
/// session supervisor must call [`Pipeline::teardown`] before building a
/// replacement.
pub struct Pipeline {
    proc_a: Option<Child>,
    proc_b: Child,
    /// Forwards procA's stdout into procB's stdin; `None` when there is no
    /// upstream. Awaited during teardown so procB's stdin is guaranteed
    /// closed before procB is signaled to stop.
    bridge_task: Option<JoinHandle<()>>,
    stdout_task: JoinHandle<()>,
    stderr_task: JoinHandle<()>,
}

impl Pipeline {
    /// Spawn `downstream_argv`, optionally preceded by `upstream_argv` wired
    /// stdout-to-stdin. Every stdout/stderr line produced by the downstream
    /// process is sent as an [`OutboundLine`] on `lines_tx`; send errors
    /// (client gone) are swallowed, matching the fan-out's "drop rather than
    /// block the child" policy.
    pub async fn spawn(
        upstream_argv: Option<Vec<String>>,
        downstream_argv: Vec<String>,
        lines_tx: mpsc::Sender<OutboundLine>,
    ) -> Result<Self> {
        let has_upstream = upstream_argv.is_some();

        let mut proc_a = match upstream_argv {
            Some(argv) => {
                let mut cmd = build_command(&argv);
                cmd.stdin(Stdio::null());
                cmd.stdout(Stdio::piped());
                cmd.stderr(Stdio::null());
                Some(cmd.spawn().map_err(|source| Error::Spawn {
                    program: argv.first().cloned().unwrap_or_default(),
                    source,
                })?)
            }
            None => None,
        };

        let mut b_cmd = build_command(&downstream_argv);
        b_cmd.stdin(if has_upstream { Stdio::piped() } else { Stdio::null() });
        b_cmd.stdout(Stdio::piped());
        b_cmd.stderr(Stdio::piped());

        let mut proc_b = b_cmd.spawn().map_err(|source| Error::Spawn {
            program: downstream_argv.first().cloned().unwrap_or_default(),
            source,
        })?;

        let bridge_task = if let Some(a) = proc_a.as_mut() {
            let mut a_stdout = a.stdout.take().expect("procA stdout piped");
            let mut b_stdin = proc_b.stdin.take().expect("procB stdin piped");
            Some(tokio::spawn(async move {
                if let Err(err) = tokio::io::copy(&mut a_stdout, &mut b_stdin).await {
                    debug!(%err, "upstream-to-downstream pipe closed");
                }
                let _ = b_stdin.shutdown().await;
            }))
        } else {
            None
        };

        let b_stdout = proc_b.stdout.take().expect("procB stdout piped");
        let b_stderr = proc_b.stderr.take().expect("procB stderr piped");

        let stdout_task = spawn_line_reader(b_stdout, lines_tx.clone(), OutboundLine::Stdout);
        let stderr_task = spawn_line_reader(b_stderr, lines_tx, OutboundLine::Stderr);

        Ok(Self {
            proc_a,
            proc_b,
            bridge_task,
            stdout_task,
            stderr_task,
        })
    }

    /// Wait for procB to exit, without tearing procA down. Used by the
    /// supervisor to notice an unsolicited exit (e.g. `tail` hitting a
    /// removed file) while the session otherwise stays idle.
    pub async fn wait(&mut self) -> std::io::Result<std::process::ExitStatus> {
        self.proc_b.wait().await
    }

    /// Tear the pipeline down in the mandated order: kill+wait procA first,
    /// then close procB's stdin and stop+wait procB. Idempotent with
    /// respect to already-exited children; bounded by [`TEARDOWN_GRACE`].
    pub async fn teardown(mut self) {
        if let Some(mut a) = self.proc_a.take() {
            let _ = a.start_kill();
            if tokio::time::timeout(TEARDOWN_GRACE, a.wait())
                .await
                .is_err()
            {
                warn!("procA did not exit within teardown grace period");
            }
        }

        if let Some(bridge) = self.bridge_task.take() {
            let _ = tokio::time::timeout(TEARDOWN_GRACE, bridge).await;
        }

        let _ = self.proc_b.start_kill();
        if tokio::time::timeout(TEARDOWN_GRACE, self.proc_b.wait())
            .await
            .is_err()
        {
            warn!("procB did not exit within teardown grace period");
        }

        self.stdout_task.abort();
        self.stderr_task.abort();
    }
}

/// Reads lines from a child's stdout/stderr and forwards them without
/// blocking the child: a slow client backpressures the bounded channel
/// rather than the pipe, so on a full channel the line is dropped and
/// counted, and a single `["e", "<N lines dropped>"]` marker is emitted the
/// next time the channel has room.
fn spawn_line_reader<R>(
    reader: R,
    tx: mpsc::Sender<OutboundLine>,
    wrap: fn(String) -> OutboundLine,
) -> JoinHandle<()>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        let mut dropped: u64 = 0;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if dropped > 0 {
                        let marker = OutboundLine::Stderr(format!("{dropped} lines dropped"));
                        if tx.try_send(marker).is_ok() {
                            dropped = 0;
                        }
                    }
                    match tx.try_send(wrap(line)) {
                        Ok(()) => {}
                        Err(mpsc::error::TrySendError::Full(_)) => dropped += 1,
                        Err(mpsc::error::TrySendError::Closed(_)) => break,
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    debug!(%err, "error reading pipeline output");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drain(mut rx: mpsc::Receiver<OutboundLine>) -> Vec<OutboundLine> {
        let mut out = Vec::new();
        while let Some(line) = rx.recv().await {
            out.push(line);
        }
        out
    }

    #[tokio::test]
    async fn single_stage_pipeline_streams_stdout() {
        let (tx, rx) = mpsc::channel(16);
        let argv = vec!["printf".to_string(), "a\\nb\\n".to_string()];
        let mut pipeline = Pipeline::spawn(None, argv, tx).await.unwrap();
        let _ = pipeline.wait().await;
        pipeline.teardown().await;

        let lines = drain(rx).await;
        assert_eq!(lines.len(), 2);
        assert!(matches!(&lines[0], OutboundLine::Stdout(s) if s == "a"));
        assert!(matches!(&lines[1], OutboundLine::Stdout(s) if s == "b"));
    }

    #[tokio::test]
    async fn two_stage_pipeline_wires_stdout_to_stdin() {
        let (tx, rx) = mpsc::channel(16);
        let upstream = vec!["printf".to_string(), "hello\\nworld\\n".to_string()];
        let downstream = vec!["grep".to_string(), "world".to_string()];
        let mut pipeline = Pipeline::spawn(Some(upstream), downstream, tx)
            .await
            .unwrap();
        let _ = pipeline.wait().await;
        pipeline.teardown().await;

        let lines = drain(rx).await;
        assert_eq!(lines.len(), 1);
        assert!(matches!(&lines[0], OutboundLine::Stdout(s) if s == "world"));
    }

    #[tokio::test]
    async fn teardown_reaps_a_long_running_child() {
        let (tx, _rx) = mpsc::channel(16);
        let argv = vec!["sleep".to_string(), "30".to_string()];
        let pipeline = Pipeline::spawn(None, argv, tx).await.unwrap();
        pipeline.teardown().await;
    }

    #[tokio::test]
    async fn unknown_program_surfaces_spawn_error() {
        let (tx, _rx) = mpsc::channel(16);
        let argv = vec!["tailon-definitely-not-a-real-binary".to_string()];
        let err = Pipeline::spawn(None, argv, tx).await.unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }
}
