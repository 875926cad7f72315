//! JSON-lines file sink.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{EtlError, Result};
use crate::row::Row;

use super::RowSink;

/// Writes each row as one JSON object per line. Missing columns are omitted
/// from the object; null columns serialize as JSON null.
pub struct JsonLinesSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, err: std::io::Error) -> EtlError {
        EtlError::Output {
            sink_name: self.name(),
            message: err.to_string(),
        }
    }

    async fn open(&mut self) -> Result<()> {
        if self.writer.is_some() {
            return Ok(());
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }
}

#[async_trait]
impl RowSink for JsonLinesSink {
    fn name(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn write_row(&mut self, row: Row) -> Result<()> {
        self.open().await?;
        let mut line = serde_json::to_vec(&row.to_json_object())?;
        line.push(b'\n');
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.write_all(&line).await {
                return Err(EtlError::Output {
                    sink_name: format!("file {}", self.path.display()),
                    message: e.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.flush().await {
                return Err(EtlError::Output {
                    sink_name: format!("file {}", self.path.display()),
                    message: e.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowValue;

    #[tokio::test]
    async fn test_writes_one_json_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let mut sink = JsonLinesSink::new(&path);

        sink.write_row(Row::new().with("day", "2015-04-01").with("value", 1))
            .await
            .unwrap();
        sink.write_row(
            Row::new()
                .with("day", "2015-04-02")
                .with("value", RowValue::Missing),
        )
        .await
        .unwrap();
        sink.flush().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"day":"2015-04-01","value":1}"#);
        assert_eq!(lines[1], r#"{"day":"2015-04-02"}"#);
    }
}
