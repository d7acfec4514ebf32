use std::path::Path;

use crate::error::FilesError;

/// Loads `apikeys.config`: one API key per line, blank lines ignored. Every
/// HTTP monitor route except `/live` requires the `apikey` header to match
/// one of these lines exactly (`spec.md` §4.3).
pub async fn read_api_keys(path: &Path) -> Result<Vec<String>, FilesError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FilesError::io(path.display().to_string(), e))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn parses_one_key_per_line_and_skips_blanks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("apikeys.config");
        tokio::fs::write(&path, "alpha-key\n\nbeta-key\n  \n")
            .await
            .unwrap();

        let keys = read_api_keys(&path).await.unwrap();
        assert_eq!(keys, vec!["alpha-key".to_string(), "beta-key".to_string()]);
    }
}
