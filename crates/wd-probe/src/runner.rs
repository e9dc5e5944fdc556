use std::time::Duration;
use tokio::process::Command;

/// Default timeout for a single external command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Full WiFi scans (iwlist) can take considerably longer.
pub const SCAN_TIMEOUT: Duration = Duration::from_secs(60);
/// Individual DNS probes.
pub const DNS_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Individual reachability probes (ping, HTTP).
pub const REACH_TIMEOUT: Duration = Duration::from_secs(10);
/// Throughput measurement against the external speedtest service.
pub const SPEEDTEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Outcome of one external command. Failures never escape as errors;
/// callers decide whether the missing output is acceptable.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    fn failure(stderr: String) -> Self {
        Self {
            succeeded: false,
            stdout: String::new(),
            stderr,
        }
    }
}

/// Run a program with arguments under a timeout.
///
/// A timed-out or unspawnable command yields `succeeded: false` with the
/// reason in `stderr`; the child is killed when the timeout fires.
pub async fn run_command(program: &str, args: &[&str], timeout: Duration) -> CommandOutput {
    let mut cmd = Command::new(program);
    cmd.args(args).kill_on_drop(true);
    run(cmd, timeout).await
}

/// Run a shell pipeline under a timeout. Only for commands that genuinely
/// need shell features (pipes); everything else goes through `run_command`.
pub async fn run_shell(line: &str, timeout: Duration) -> CommandOutput {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line).kill_on_drop(true);
    run(cmd, timeout).await
}

async fn run(mut cmd: Command, timeout: Duration) -> CommandOutput {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => CommandOutput {
            succeeded: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        },
        Ok(Err(err)) => CommandOutput::failure(err.to_string()),
        Err(_) => CommandOutput::failure(format!(
            "Command timed out after {}s",
            timeout.as_secs()
        )),
    }
}

/// Whether a binary is on the PATH and runnable.
pub async fn tool_available(program: &str) -> bool {
    run_command("which", &[program], DNS_PROBE_TIMEOUT).await.succeeded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_command_round_trip() {
        let out = run_command("sh", &["-c", "printf ok"], DEFAULT_TIMEOUT).await;
        assert!(out.succeeded);
        assert_eq!(out.stdout, "ok");
        assert_eq!(out.stderr, "");
    }

    #[tokio::test]
    async fn failing_command_reports_stderr() {
        let out = run_command("sh", &["-c", "echo boom >&2; exit 3"], DEFAULT_TIMEOUT).await;
        assert!(!out.succeeded);
        assert_eq!(out.stderr.trim(), "boom");
    }

    #[tokio::test]
    async fn timed_out_command_degrades() {
        let out = run_command("sh", &["-c", "sleep 5"], Duration::from_secs(1)).await;
        assert!(!out.succeeded);
        assert_eq!(out.stdout, "");
        assert_eq!(out.stderr, "Command timed out after 1s");
    }

    #[tokio::test]
    async fn cancelled_select_kills_inflight_command() {
        let marker = std::env::temp_dir().join(format!("wd-runner-cancel-{}", std::process::id()));
        let _ = std::fs::remove_file(&marker);

        let line = format!("sleep 1 && touch {}", marker.display());
        let outcome = tokio::select! {
            out = run_shell(&line, DEFAULT_TIMEOUT) => Some(out),
            _ = tokio::time::sleep(Duration::from_millis(100)) => None,
        };
        assert!(outcome.is_none());

        // The dropped future must have killed the shell; its second command
        // never runs.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn unspawnable_command_degrades() {
        let out = run_command("definitely-not-a-binary-9f2c", &[], DEFAULT_TIMEOUT).await;
        assert!(!out.succeeded);
        assert!(!out.stderr.is_empty());
    }
}
