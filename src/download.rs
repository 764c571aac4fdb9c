use std::path::Path;
use std::process::Command;

use crate::contract::IngestionError;

/// True for sources that must be fetched with `git` rather than read from disk.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Shallow-clones `repo_url` into `dest` (which must not exist yet or be empty).
pub fn clone_repository(repo_url: &str, dest: &Path, depth: u32) -> Result<(), IngestionError> {
    // `git clone --depth <n> <repo_url> <dest>`
    let output = Command::new("git")
        .arg("clone")
        .arg("--quiet")
        .arg("--depth")
        .arg(depth.max(1).to_string())
        .arg(repo_url)
        .arg(dest)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output();

    match output {
        Ok(out) if out.status.success() => {
            tracing::info!(
                repo_url = repo_url,
                depth = depth,
                path = %dest.display(),
                "Successfully cloned git repository"
            );
            Ok(())
        }
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            tracing::error!(
                repo_url = repo_url,
                path = %dest.display(),
                status = %out.status,
                stderr = %stderr,
                "Git exited with non-zero code"
            );
            Err(IngestionError::GitClone {
                url: repo_url.to_string(),
                message: format!("git exited with {}: {}", out.status, stderr),
            })
        }
        Err(e) => {
            tracing::error!(
                error = ?e,
                repo_url = repo_url,
                path = %dest.display(),
                "Failed to launch git process"
            );
            Err(IngestionError::GitClone {
                url: repo_url.to_string(),
                message: format!("failed to launch git: {e}"),
            })
        }
    }
}
