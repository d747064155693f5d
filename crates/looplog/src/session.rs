use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};

use crate::{
    error::{Error, Result},
    field::Field,
    row_buffer::RowBuffer,
    timestamp::{TimestampInjector, TimestampMode},
};

/// What to do when flushing a row to the sink fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    #[default]
    Never,
    /// Retry the flush once before reporting [`Error::WriteFailure`].
    Once,
}

/// An open log file with a fixed column order.
///
/// Created by [`SessionBuilder`](crate::SessionBuilder). Each
/// [`write_row`](Self::write_row) reads the current text of every field in
/// builder order and appends one line to the sink. The session is `Open` until
/// [`close`](Self::close) releases the sink; afterwards writes fail with
/// [`Error::Closed`] and further closes are no-ops.
///
/// Dropping an open session closes it as well, but errors can only be logged
/// at that point, so prefer `close` or [`SessionBuilder::run`](crate::SessionBuilder::run).
pub struct LogSession<W: Write = BufWriter<File>> {
    sink: Option<W>,
    path: Option<PathBuf>,
    fields: Vec<Field>,
    row: RowBuffer,
    mode: TimestampMode,
    timestamps: Option<TimestampInjector>,
    retry: RetryPolicy,
    header_emitted: bool,
    rows_written: u64,
    started_at: DateTime<Local>,
}

pub(crate) struct Parts {
    pub path: Option<PathBuf>,
    pub fields: Vec<Field>,
    pub mode: TimestampMode,
    pub timestamps: TimestampInjector,
    pub retry: RetryPolicy,
    pub started_at: DateTime<Local>,
}

impl<W: Write> LogSession<W> {
    pub(crate) fn new(sink: W, parts: Parts) -> Self {
        let Parts {
            path,
            fields,
            mode,
            timestamps,
            retry,
            started_at,
        } = parts;
        let timestamps = (mode != TimestampMode::None).then_some(timestamps);
        Self {
            sink: Some(sink),
            path,
            fields,
            row: RowBuffer::new(),
            mode,
            timestamps,
            retry,
            header_emitted: false,
            rows_written: 0,
            started_at,
        }
    }

    /// Write the header row.
    ///
    /// Only the first call writes anything; later calls are ignored with a
    /// warning so the file never contains a second header.
    pub fn write_header(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.header_emitted {
            warn!("Header already written, ignoring repeated request.");
            return Ok(());
        }
        self.emit_header()?;
        self.flush(0)
    }

    /// Write one data row with the current value of every field.
    ///
    /// Emits the header first if it has not been written yet; header and row
    /// then share one flush. A failed write leaves the session open so the
    /// caller can decide whether to carry on.
    pub fn write_row(&mut self) -> Result<()> {
        self.ensure_open()?;
        if !self.header_emitted {
            self.emit_header()?;
        }
        for field in &self.fields {
            field.with_text(|text| self.row.append(text));
        }
        if let Some(timestamps) = &mut self.timestamps {
            timestamps.prepare_row(&mut self.row);
        }
        let line = self.row.flush_and_reset();
        let row = self.rows_written + 1;
        self.emit(&line, row)?;
        self.rows_written = row;
        trace!("Row {row} written");
        self.flush(row)
    }

    /// Restart the elapsed time origin and the delta baseline.
    pub fn reset_time_base(&mut self) -> Result<()> {
        self.ensure_open()?;
        if let Some(timestamps) = &mut self.timestamps {
            timestamps.reset_time_base();
            info!("Time base reset after {} rows", self.rows_written);
        }
        Ok(())
    }

    /// Flush and release the sink. Closing twice is not an error.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut sink) = self.sink.take() else {
            return Ok(());
        };
        let result = flush_sink(&mut sink, self.retry, self.rows_written);
        drop(sink);
        match &self.path {
            Some(path) => info!(
                "Closed log {} after {} rows",
                path.display(),
                self.rows_written
            ),
            None => info!("Closed log after {} rows", self.rows_written),
        }
        result
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sink.is_none()
    }

    /// Path of the log file, `None` for sessions over a custom writer.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of data rows written, not counting the header.
    #[must_use]
    pub const fn rows_written(&self) -> u64 {
        self.rows_written
    }

    #[must_use]
    pub const fn timestamp_mode(&self) -> TimestampMode {
        self.mode
    }

    /// Wall clock time the session was built.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Header labels in output order, time columns included.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.mode
            .labels()
            .iter()
            .copied()
            .chain(self.fields.iter().map(Field::label))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.sink.is_some() {
            Ok(())
        } else {
            Err(Error::Closed)
        }
    }

    fn emit_header(&mut self) -> Result<()> {
        for label in self.mode.labels() {
            self.row.append(label);
        }
        for field in &self.fields {
            self.row.append(field.label());
        }
        let line = self.row.flush_and_reset();
        self.emit(&line, 0)?;
        self.header_emitted = true;
        debug!("Header written: {}", line.trim_end());
        Ok(())
    }

    fn emit(&mut self, line: &str, row: u64) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(Error::Closed)?;
        sink.write_all(line.as_bytes())
            .map_err(|source| Error::WriteFailure { row, source })
    }

    fn flush(&mut self, row: u64) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(Error::Closed)?;
        flush_sink(sink, self.retry, row)
    }
}

fn flush_sink<W: Write>(sink: &mut W, retry: RetryPolicy, row: u64) -> Result<()> {
    match sink.flush() {
        Ok(()) => Ok(()),
        Err(e) if retry == RetryPolicy::Once => {
            warn!("Flushing row {row} failed, retrying once: {e}");
            sink.flush()
                .map_err(|source| Error::WriteFailure { row, source })
        }
        Err(source) => Err(Error::WriteFailure { row, source }),
    }
}

impl<W: Write> Drop for LogSession<W> {
    fn drop(&mut self) {
        if self.sink.is_some() {
            warn!("LogSession dropped without close.");
            if let Err(e) = self.close() {
                error!("Error closing dropped LogSession: {e}");
            }
        }
    }
}
