//! # looplog
//!
//! Tabular data logging for real-time control loops:
//!
//! - **Fields**: named cells the control loop updates in any order
//! - **Sessions**: a log file with a fixed column order, written one row per loop iteration
//! - **Timestamps**: elapsed seconds and inter-row milliseconds in front of every row
//!
//! The output is plain comma separated text, ready for a spreadsheet.

mod builder;
pub mod config;
mod error;
mod field;
mod format;
mod paths;
mod row_buffer;
mod session;
mod timestamp;
mod utils;

pub use self::{
    builder::SessionBuilder,
    config::Config,
    error::{Error, FieldOrderError, Result},
    field::Field,
    format::{DEFAULT_PRECISION, FieldValue, Format, MAX_PRECISION, ParseFormatError},
    row_buffer::RowBuffer,
    session::{LogSession, RetryPolicy},
    timestamp::{
        Clock, DELTA_LABEL, ELAPSED_LABEL, MonotonicClock, TimestampInjector, TimestampMode,
    },
};
