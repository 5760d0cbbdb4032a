// src/exec/command.rs

//! Shell process helpers shared by command transforms, command tasks and the
//! command notification sink.

use std::process::{ExitStatus, Stdio};

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Build a shell command appropriate for the platform.
pub fn shell_command(cmd: &str) -> Command {
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };
    command.kill_on_drop(true);
    command
}

/// Run `cmd` with `input` on stdin and return its stdout.
///
/// A non-zero exit is an error carrying the captured stderr.
pub async fn run_filter(cmd: &str, input: &[u8], env: &[(&str, &str)]) -> Result<Vec<u8>> {
    let mut command = shell_command(cmd);
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in env {
        command.env(key, value);
    }

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning `{cmd}`"))?;

    // Feed stdin from a separate task so a chatty child cannot deadlock on a
    // full stdout pipe while we are still writing.
    let writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_vec();
        tokio::spawn(async move {
            let res = stdin.write_all(&input).await;
            drop(stdin);
            res
        })
    });

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for `{cmd}`"))?;

    if let Some(writer) = writer {
        match writer.await {
            Ok(Ok(())) => {}
            // The child may legitimately exit without reading all input.
            Ok(Err(err)) => debug!(cmd = %cmd, error = %err, "stdin write ended early"),
            Err(err) => warn!(cmd = %cmd, error = %err, "stdin writer task failed"),
        }
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "`{cmd}` exited with {}: {}",
            describe_status(output.status),
            stderr.trim()
        );
    }

    Ok(output.stdout)
}

/// Run `cmd` to completion, forwarding its stdout to the log at `info` and
/// stderr at `debug`.
pub async fn run_logged(task: &str, cmd: &str, env: &[(&str, String)]) -> Result<ExitStatus> {
    info!(task = %task, cmd = %cmd, "starting task process");

    let mut command = shell_command(cmd);
    command.stdout(Stdio::piped()).stderr(Stdio::piped());
    for (key, value) in env {
        command.env(key, value);
    }

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for task '{task}'"))?;

    if let Some(stdout) = child.stdout.take() {
        let task_name = task.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(task = %task_name, "{}", line);
            }
        });
    }

    // Always consume stderr so buffers don't fill; log at debug.
    if let Some(stderr) = child.stderr.take() {
        let task_name = task.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{task}'"))?;

    info!(
        task = %task,
        exit_code = status.code().unwrap_or(-1),
        success = status.success(),
        "task process exited"
    );

    Ok(status)
}

/// Human readable exit status ("code 2", "signal").
pub fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}
