use std::path::PathBuf;

use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

/// Append-only `key;deposit_address` log of wallets whose workflow aborted.
///
/// Appends are serialized through a mutex so concurrent workers never
/// interleave partial lines.
pub struct FailureLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub async fn record(&self, private_key: &str, deposit_address: &str) -> eyre::Result<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(format!("{private_key};{deposit_address}\n").as_bytes())
            .await?;
        file.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn creates_parent_directories_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let log = FailureLog::new(dir.path().join("results/failed.txt"));

        log.record("0xkey1", "0xdest1").await.unwrap();
        log.record("0xkey2", "0xdest2").await.unwrap();

        let contents = tokio::fs::read_to_string(dir.path().join("results/failed.txt"))
            .await
            .unwrap();
        assert_eq!(contents, "0xkey1;0xdest1\n0xkey2;0xdest2\n");
    }

    #[tokio::test]
    async fn concurrent_appends_never_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(FailureLog::new(dir.path().join("failed.txt")));

        let mut handles = vec![];
        for i in 0..10 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                log.record(&format!("0xkey{i}"), &format!("0xdest{i}"))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let contents = tokio::fs::read_to_string(dir.path().join("failed.txt"))
            .await
            .unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 10);
        for line in lines {
            let fields: Vec<&str> = line.split(';').collect();
            assert_eq!(fields.len(), 2);
            assert!(fields[0].starts_with("0xkey"));
            assert!(fields[1].starts_with("0xdest"));
        }
    }
}
