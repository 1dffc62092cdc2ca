use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{FindingSink, ScanFinding};
use crate::errors::ScanError;

/// Forwards emitted findings to a background JSON-lines writer.
///
/// The file is complete once every clone of the sink is dropped and the
/// returned handle has been awaited.
#[derive(Clone)]
pub struct JsonlSink {
    tx: mpsc::UnboundedSender<ScanFinding>,
}

impl JsonlSink {
    pub fn spawn(path: PathBuf) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, spawn_jsonl_writer(path, rx))
    }

    fn send(&self, finding: &ScanFinding) {
        if self.tx.send(finding.clone()).is_err() {
            tracing::error!(subdomain = %finding.subdomain, "jsonl writer has stopped; finding not written");
        }
    }
}

impl FindingSink for JsonlSink {
    fn vulnerable(&self, finding: &ScanFinding) {
        self.send(finding);
    }

    fn clean(&self, finding: &ScanFinding) {
        self.send(finding);
    }

    fn failure(&self, _subject: &str, _error: &ScanError) {}
}

fn spawn_jsonl_writer(path: PathBuf, mut rx: mpsc::UnboundedReceiver<ScanFinding>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(mut f) => {
                while let Some(finding) = rx.recv().await {
                    match serde_json::to_vec(&finding) {
                        Ok(mut line) => {
                            line.push(b'\n');
                            if let Err(e) = f.write_all(&line).await {
                                tracing::error!(error=%e, "failed to write jsonl line");
                            }
                        }
                        Err(e) => {
                            tracing::error!(error=%e, "failed to serialize finding");
                        }
                    }
                }
                if let Err(e) = f.flush().await {
                    tracing::error!(error=%e, "failed to flush jsonl writer");
                }
            }
            Err(e) => {
                tracing::error!(error=%e, path=%path.display(), "failed to open jsonl output file");
            }
        }
    })
}
