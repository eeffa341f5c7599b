use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::constants::*;

fn storage_dir() -> PathBuf {
    let dir = std::env::var("OTP_STORAGE_PATH").unwrap_or(OTP_STORAGE_PATH_DEFAULT.to_owned());
    PathBuf::from(dir)
}

/// Append one line to the audit trail for an issued code. Best effort: the
/// caller runs this off the issuance path and only logs a failure, the
/// system of record stays the code store.
pub async fn record_issued(username: &str, code: &str, operation_id: i64) -> anyhow::Result<()> {
    let line = format!(
        "[{}] User: {}, OTP: {}, Operation: {}\n",
        chrono::Utc::now().to_rfc3339(),
        username,
        code,
        operation_id
    );
    append_line(&storage_dir(), OTP_AUDIT_FILE, &line).await
}

async fn append_line(dir: &Path, filename: &str, content: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(filename);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    tracing::debug!("appended audit entry to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::get_epoch_ts;

    #[tokio::test]
    async fn test_append_line_creates_and_appends() {
        let dir = std::env::temp_dir().join(format!("otp-audit-test-{}", get_epoch_ts()));
        append_line(&dir, "audit.log", "first line\n").await.unwrap();
        append_line(&dir, "audit.log", "second line\n").await.unwrap();
        let content = tokio::fs::read_to_string(dir.join("audit.log")).await.unwrap();
        let lines = content.lines().collect::<Vec<_>>();
        assert_eq!(lines, vec!["first line", "second line"]);
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
