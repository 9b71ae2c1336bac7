//! Batched, thread-safe result sink (§4.8).
//!
//! `publish_session` is callable from any worker: it appends to an
//! in-memory batch under a short-held mutex, and only serializes to disk
//! once the batch reaches `batch_write_size`. Raw spin records go through a
//! second, bounded buffer that blocks the publisher (backpressure) rather
//! than growing unbounded when the writer falls behind.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use parking_lot::{Condvar, Mutex};

use crate::error::SinkResult;
use crate::record::{SessionRecord, SpinRecord};

fn csv_writer(path: &Path, header: &[&str]) -> SinkResult<csv::Writer<File>> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(header)?;
    writer.flush()?;
    Ok(writer)
}

struct SpinBuffer {
    queue: Mutex<Vec<SpinRecord>>,
    not_full: Condvar,
    max_buffer_size: usize,
}

/// Layout rooted at `<base_dir>/simulation_<timestamp>/` (§6).
pub struct ResultSink {
    session_batch: Mutex<Vec<SessionRecord>>,
    session_writer: Mutex<csv::Writer<File>>,
    batch_write_size: usize,
    session_stats_path: PathBuf,

    spin_writer: Option<Mutex<csv::Writer<File>>>,
    spin_buffer: Option<SpinBuffer>,

    reports_dir: PathBuf,
}

impl ResultSink {
    pub fn new(
        run_dir: &Path,
        batch_write_size: usize,
        raw_spins_enabled: bool,
        max_spin_buffer_size: usize,
    ) -> SinkResult<Self> {
        let sessions_dir = run_dir.join("sessions");
        let reports_dir = run_dir.join("reports");
        fs::create_dir_all(&sessions_dir)?;
        fs::create_dir_all(&reports_dir)?;

        let session_stats_path = sessions_dir.join("session_stats.csv");
        let session_writer = csv_writer(&session_stats_path, &SessionRecord::HEADER)?;

        let (spin_writer, spin_buffer) = if raw_spins_enabled {
            let raw_dir = run_dir.join("raw_spins");
            fs::create_dir_all(&raw_dir)?;
            let path = raw_dir.join("raw_spins.csv");
            let writer = csv_writer(&path, &SpinRecord::HEADER)?;
            let buffer = SpinBuffer {
                queue: Mutex::new(Vec::new()),
                not_full: Condvar::new(),
                max_buffer_size: max_spin_buffer_size,
            };
            (Some(Mutex::new(writer)), Some(buffer))
        } else {
            (None, None)
        };

        Ok(Self {
            session_batch: Mutex::new(Vec::new()),
            session_writer: Mutex::new(session_writer),
            batch_write_size,
            session_stats_path,
            spin_writer,
            spin_buffer,
            reports_dir,
        })
    }

    pub fn session_stats_path(&self) -> &Path {
        &self.session_stats_path
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Append one completed session record (§4.8).
    pub fn publish_session(&self, record: SessionRecord) -> SinkResult<()> {
        let swapped = {
            let mut batch = self.session_batch.lock();
            batch.push(record);
            if batch.len() >= self.batch_write_size {
                Some(std::mem::take(&mut *batch))
            } else {
                None
            }
        };
        if let Some(batch) = swapped {
            self.flush_session_batch(batch)?;
        }
        Ok(())
    }

    fn flush_session_batch(&self, batch: Vec<SessionRecord>) -> SinkResult<()> {
        let mut writer = self.session_writer.lock();
        for record in &batch {
            writer.write_record(record.to_row())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Append one raw spin record, blocking (backpressure) when the bounded
    /// buffer is full (§4.8, §5 "suspension"). A no-op when raw recording
    /// is disabled.
    pub fn publish_spin(&self, record: SpinRecord) -> SinkResult<()> {
        let Some(buffer) = &self.spin_buffer else {
            return Ok(());
        };
        let swapped = {
            let mut queue = buffer.queue.lock();
            while queue.len() >= buffer.max_buffer_size {
                buffer.not_full.wait(&mut queue);
            }
            queue.push(record);
            if queue.len() >= buffer.max_buffer_size {
                Some(std::mem::take(&mut *queue))
            } else {
                None
            }
        };
        if let Some(batch) = swapped {
            self.flush_spin_batch(batch)?;
            buffer.not_full.notify_all();
        }
        Ok(())
    }

    fn flush_spin_batch(&self, batch: Vec<SpinRecord>) -> SinkResult<()> {
        let Some(writer) = &self.spin_writer else {
            return Ok(());
        };
        let mut writer = writer.lock();
        for record in &batch {
            writer.write_record(record.to_row())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Flush whatever remains in either batch. Must be called once, after
    /// the run's last `publish_*` call.
    pub fn finish(&self) -> SinkResult<()> {
        let remaining_sessions = std::mem::take(&mut *self.session_batch.lock());
        if !remaining_sessions.is_empty() {
            self.flush_session_batch(remaining_sessions)?;
        }
        if let Some(buffer) = &self.spin_buffer {
            let remaining_spins = std::mem::take(&mut *buffer.queue.lock());
            if !remaining_spins.is_empty() {
                self.flush_spin_batch(remaining_spins)?;
            }
        }
        Ok(())
    }
}
