//! Shared construction of PostgreSQL client tool invocations.

use tokio::process::Command;

use pgmirror_core::config::ServerConfig;
use pgmirror_core::error::ToolError;

/// Build a client tool command with connection arguments and the password
/// exported through `PGPASSWORD`.
pub fn connect_command(tool: &'static str, server: &ServerConfig) -> Command {
    let mut cmd = Command::new(tool);
    cmd.arg("-h")
        .arg(&server.host)
        .arg("-p")
        .arg(server.port.to_string())
        .arg("-U")
        .arg(&server.user)
        .env("PGPASSWORD", &server.password);
    cmd
}

/// Run a command to completion, capturing both streams.
///
/// Only the launch itself can fail here; callers interpret the exit status
/// and streams themselves, since `pg_restore` exiting nonzero is not
/// necessarily an error.
pub async fn run(tool: &'static str, cmd: &mut Command) -> Result<std::process::Output, ToolError> {
    cmd.output()
        .await
        .map_err(|e| ToolError::Launch { tool, source: e })
}

/// Collapse an output into a [`ToolError::Failed`] when the exit status is
/// nonzero, for tools where any nonzero exit means the operation failed.
pub fn require_success(
    tool: &'static str,
    output: &std::process::Output,
) -> Result<(), ToolError> {
    if output.status.success() {
        return Ok(());
    }
    Err(ToolError::Failed {
        tool,
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}
