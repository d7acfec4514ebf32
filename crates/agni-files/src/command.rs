use tokio::process::Command;

use crate::error::FilesError;

/// Runs an OS command to completion and returns its captured output.
/// Mirrors `ckir-rsdev`'s `Command::new(...).output()` pattern (used there
/// for the local text-to-speech helper), generalized into the "run OS
/// commands" utility named in `spec.md` §2.
pub async fn run_command(program: &str, args: &[&str]) -> Result<std::process::Output, FilesError> {
    Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| FilesError::Command {
            program: program.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_a_trivial_command() {
        let out = run_command("true", &[]).await.unwrap();
        assert!(out.status.success());
    }

    #[tokio::test]
    async fn surfaces_spawn_failure_as_command_error() {
        let err = run_command("definitely-not-a-real-binary", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, FilesError::Command { .. }));
    }
}
