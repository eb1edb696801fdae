use std::{
    fs::File,
    io::BufWriter,
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
    thread::{self, JoinHandle},
};

use log::error;
use serde_jsonlines::JsonLinesWriter;

use lanewatch::{LanewatchError, TelemetrySnapshot};

/// Appends each received snapshot to `file` as one JSON line until the
/// sending side hangs up.
pub fn write_snapshots(
    file: &PathBuf,
    snapshot_receiver: Receiver<TelemetrySnapshot>,
) -> Result<(), LanewatchError> {
    let snapshot_file = File::create(file).map_err(|e| LanewatchError::WriterError { source: e })?;
    let mut snapshot_writer = JsonLinesWriter::new(BufWriter::new(snapshot_file));
    for snapshot in &snapshot_receiver {
        if let Err(e) = snapshot_writer.write(&snapshot) {
            error!("Error while writing snapshot to output file: {}", e);
        }
    }
    snapshot_writer
        .flush()
        .map_err(|e| LanewatchError::WriterError { source: e })
}

/// Background writer for a `.jsonl` recording.
pub struct SnapshotRecorder {
    handle: JoinHandle<Result<(), LanewatchError>>,
}

impl SnapshotRecorder {
    /// Starts the writer thread. Recording ends once every clone of the
    /// returned sender is dropped.
    pub fn spawn(file: PathBuf) -> Result<(Self, Sender<TelemetrySnapshot>), LanewatchError> {
        let (snapshot_tx, snapshot_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("lanewatch-recorder".to_string())
            .spawn(move || write_snapshots(&file, snapshot_rx))
            .map_err(|e| LanewatchError::WriterError { source: e })?;
        Ok((Self { handle }, snapshot_tx))
    }

    /// Waits for the writer to flush the rest of the recording.
    pub fn finish(self) {
        match self.handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Snapshot recording failed: {}", e),
            Err(_) => error!("Snapshot recorder thread panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, thread};

    use serde_jsonlines::json_lines;

    use super::*;

    #[test]
    fn test_recording_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        let (tx, rx) = mpsc::channel();

        let writer_path = path.clone();
        let writer = thread::spawn(move || write_snapshots(&writer_path, rx));
        let mut moving = TelemetrySnapshot {
            status: "running".to_string(),
            ..TelemetrySnapshot::default()
        };
        tx.send(moving.clone()).unwrap();
        moving.position = [1., 0.];
        moving.obstacle_detected = true;
        tx.send(moving.clone()).unwrap();
        drop(tx);
        writer.join().unwrap().unwrap();

        let recorded = json_lines::<TelemetrySnapshot, _>(&path)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[1], moving);
    }

    #[test]
    fn test_finish_waits_for_buffered_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tail.jsonl");
        let (recorder, tx) = SnapshotRecorder::spawn(path.clone()).unwrap();

        // well under the BufWriter capacity, so nothing hits the file before the flush
        for i in 0..20 {
            tx.send(TelemetrySnapshot {
                position: [i as f64, 0.],
                ..TelemetrySnapshot::default()
            })
            .unwrap();
        }
        drop(tx);
        recorder.finish();

        let recorded = json_lines::<TelemetrySnapshot, _>(&path)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(recorded.len(), 20);
        assert_eq!(recorded[19].position, [19., 0.]);
    }
}
