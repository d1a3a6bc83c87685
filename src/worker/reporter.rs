//! Single consumer that appends matches to the result log.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

use crate::error::{Result, SearchError};

use super::MatchRecord;

/// Owns the result log. Only this type ever writes to it.
pub struct Reporter {
    path: PathBuf,
    file: File,
}

impl Reporter {
    /// Opens `path` for appending, creating it if needed. Existing lines are
    /// never truncated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SearchError::LogOpen {
                path: path.clone(),
                source,
            })?;

        Ok(Self { path, file })
    }

    /// Drains the queue until every sender is gone, appending one line per
    /// record in delivery order. Returns the number of lines written.
    ///
    /// The first failed append ends the loop with an error; the receiver is
    /// dropped with it, so later sends fail instead of silently queueing.
    pub fn run(mut self, result_rx: Receiver<MatchRecord>) -> Result<u64> {
        let mut written = 0u64;

        for record in result_rx.iter() {
            self.append(&record)?;
            written += 1;
            acknowledge(&record);
        }

        info!(written, path = %self.path.display(), "result queue drained");
        Ok(written)
    }

    /// Writes one record and forces it to disk.
    pub fn append(&mut self, record: &MatchRecord) -> Result<()> {
        let line = format!("{}\n", record);
        self.file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.sync_data())
            .map_err(|source| SearchError::LogWrite {
                path: self.path.clone(),
                source,
            })
    }
}

fn acknowledge(record: &MatchRecord) {
    debug!(worker = record.worker_id, address = %record.address, "match saved");
    let mut stdout = io::stdout().lock();
    if let Err(e) = writeln!(stdout, "Found and saved: {}", record) {
        warn!("could not echo match to stdout: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::fs;
    use tempfile::tempdir;

    fn record(n: u8) -> MatchRecord {
        MatchRecord {
            private_key: hex::encode([n; 32]),
            address: format!("0x{}", hex::encode([n; 20])),
            worker_id: n as usize,
        }
    }

    #[test]
    fn test_lines_in_delivery_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let reporter = Reporter::open(&path).unwrap();

        let (tx, rx) = bounded(4);
        for n in 1..=3 {
            tx.send(record(n)).unwrap();
        }
        drop(tx);

        assert_eq!(reporter.run(rx).unwrap(), 3);

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], record(1).to_string());
        assert_eq!(lines[2], record(3).to_string());
        assert!(contents.ends_with('\n'));
    }

    #[test]
    fn test_appends_without_truncating() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.txt");
        fs::write(&path, "existing line\n").unwrap();

        let mut reporter = Reporter::open(&path).unwrap();
        reporter.append(&record(9)).unwrap();
        drop(reporter);

        let mut reporter = Reporter::open(&path).unwrap();
        reporter.append(&record(10)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        let expected = [
            "existing line".to_string(),
            record(9).to_string(),
            record(10).to_string(),
        ];
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_line_format() {
        let line = record(0xab).to_string();
        assert_eq!(
            line,
            format!(
                "Private Key: {}, Address: 0x{}",
                "ab".repeat(32),
                "ab".repeat(20)
            )
        );
    }

    #[test]
    fn test_open_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("results.txt");
        let err = Reporter::open(&path).err().unwrap();
        assert!(matches!(err, SearchError::LogOpen { .. }));
    }
}
