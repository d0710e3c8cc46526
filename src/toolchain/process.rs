//! Toolchain backed by a real child process.

use super::{Invocation, Toolchain, ToolchainError};
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long `--solvers` may take before we give up on discovery.
const LISTING_TIMEOUT: Duration = Duration::from_secs(30);

/// After the child exits, how long to keep draining pipes held open by grandchildren.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Spawns `<program> --solver <id> <model>` for every attempt.
#[derive(Debug, Clone)]
pub struct ProcessToolchain {
    program: String,
}

impl ProcessToolchain {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group so a timeout can take down solver grandchildren too.
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }
}

#[async_trait::async_trait]
impl Toolchain for ProcessToolchain {
    fn name(&self) -> &str {
        &self.program
    }

    async fn list_solvers(&self) -> Result<String, ToolchainError> {
        let mut cmd = self.command();
        cmd.arg("--solvers");

        // kill_on_drop reaps the child if the timeout drops the future.
        let output = tokio::time::timeout(LISTING_TIMEOUT, cmd.output())
            .await
            .map_err(|_| ToolchainError::Timeout {
                program: self.program.clone(),
                secs: LISTING_TIMEOUT.as_secs(),
            })?
            .map_err(|source| ToolchainError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ToolchainError::Failed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn solve(&self, model: &Path, solver: &str, limit: Duration) -> Invocation {
        let mut cmd = self.command();
        cmd.arg("--solver").arg(solver).arg(model);

        let start = Instant::now();
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return Invocation::Errored(format!("failed to launch {}: {}", self.program, e)),
        };

        let stdout_task = spawn_reader(child.stdout.take());
        let stderr_task = spawn_reader(child.stderr.take());

        match tokio::time::timeout(limit, child.wait()).await {
            Ok(Ok(status)) => {
                let elapsed = start.elapsed();
                let stdout = drain(stdout_task).await;
                let stderr = drain(stderr_task).await;
                Invocation::Exited {
                    code: status.code(),
                    success: status.success(),
                    stdout,
                    stderr,
                    elapsed,
                }
            }
            Ok(Err(e)) => {
                terminate(&mut child).await;
                stdout_task.abort();
                stderr_task.abort();
                Invocation::Errored(format!("failed to wait on {}: {}", self.program, e))
            }
            Err(_) => {
                debug!(solver, model = %model.display(), "limit reached, killing solver");
                terminate(&mut child).await;
                stdout_task.abort();
                stderr_task.abort();
                Invocation::TimedOut
            }
        }
    }
}

fn spawn_reader<R>(pipe: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            // A read error just truncates what we captured.
            let _ = pipe.read_to_end(&mut buf).await;
        }
        buf
    })
}

async fn drain(task: JoinHandle<Vec<u8>>) -> String {
    let abort = task.abort_handle();
    match tokio::time::timeout(DRAIN_GRACE, task).await {
        Ok(Ok(buf)) => String::from_utf8_lossy(&buf).into_owned(),
        Ok(Err(_)) => String::new(),
        Err(_) => {
            abort.abort();
            String::new()
        }
    }
}

/// Kill the child's process group (Unix) and the child itself, then reap it.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // The child leads its own group (process_group(0)), so pgid == pid.
            let ret = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
            if ret == -1 {
                debug!(pid, error = %std::io::Error::last_os_error(), "killpg failed");
            }
        }
    }

    // kill() also waits, so no zombie is left behind.
    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill timed-out solver process");
    }
}
