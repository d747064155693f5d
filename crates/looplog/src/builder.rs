use std::{
    collections::HashSet,
    fs,
    io::{BufWriter, Write},
    path::PathBuf,
};

use chrono::Local;
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{Error, FieldOrderError, Result},
    field::Field,
    paths::log_file_path,
    session::{LogSession, Parts, RetryPolicy},
    timestamp::{Clock, MonotonicClock, TimestampInjector, TimestampMode},
    utils::open_exclusive,
};

/// Configures and opens a [`LogSession`].
///
/// The list passed to [`fields`](Self::fields) is the only thing deciding the
/// column order; the order fields were created or updated in does not matter.
///
/// ```no_run
/// use looplog::{Field, SessionBuilder, TimestampMode};
///
/// let status = Field::new("OpModeStatus");
/// let counter = Field::new("Loop Counter");
///
/// let mut session = SessionBuilder::new("datalog_01")
///     .timestamps(TimestampMode::DecimalSeconds)
///     .fields([&status, &counter])
///     .build()?;
///
/// counter.set(0);
/// status.set("INIT");
/// session.write_row()?;
/// session.close()?;
/// # Ok::<(), looplog::Error>(())
/// ```
pub struct SessionBuilder {
    file_name: String,
    directory: PathBuf,
    extension: String,
    timestamps: TimestampMode,
    overwrite: bool,
    date_suffix: bool,
    retry: RetryPolicy,
    fields: Option<Vec<Field>>,
    declared_twice: bool,
    clock: Box<dyn Clock + Send>,
}

impl SessionBuilder {
    /// Start a builder for a log named `file_name`, using the default [`Config`].
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            directory: PathBuf::new(),
            extension: String::new(),
            timestamps: TimestampMode::default(),
            overwrite: true,
            date_suffix: false,
            retry: RetryPolicy::default(),
            fields: None,
            declared_twice: false,
            clock: Box::new(MonotonicClock),
        }
        .with_config(&Config::default())
    }

    /// Take directory, extension, timestamp mode and I/O policies from `config`.
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.directory = config.directory().to_owned();
        self.extension = config.extension().to_owned();
        self.timestamps = config.timestamps();
        self.overwrite = config.overwrite();
        self.date_suffix = config.date_suffix();
        self.retry = config.retry();
        self
    }

    #[must_use]
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    #[must_use]
    pub fn timestamps(mut self, mode: TimestampMode) -> Self {
        self.timestamps = mode;
        self
    }

    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn date_suffix(mut self, date_suffix: bool) -> Self {
        self.date_suffix = date_suffix;
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: impl Clock + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Declare the column order. May be called only once per builder.
    #[must_use]
    pub fn fields<'a>(mut self, fields: impl IntoIterator<Item = &'a Field>) -> Self {
        if self.fields.is_some() {
            self.declared_twice = true;
        }
        self.fields = Some(fields.into_iter().cloned().collect());
        self
    }

    /// Open the log file and return a session writing to it.
    pub fn build(self) -> Result<LogSession> {
        let fields = self.validate()?;
        let started_at = Local::now();
        let path = log_file_path(
            &self.directory,
            &self.file_name,
            &self.extension,
            self.date_suffix.then_some(started_at),
        )
        .map_err(|source| Error::ResourceUnavailable {
            path: self.directory.join(&self.file_name),
            source,
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::ResourceUnavailable {
                path: parent.to_owned(),
                source,
            })?;
        }
        let file = open_exclusive(&path, self.overwrite).map_err(|source| {
            Error::ResourceUnavailable {
                path: path.clone(),
                source,
            }
        })?;
        info!("Open log file {}", path.display());
        Ok(self.assemble(BufWriter::new(file), Some(path), fields, started_at))
    }

    /// Build a session over an arbitrary writer instead of a file.
    pub fn build_with_writer<W: Write>(self, writer: W) -> Result<LogSession<W>> {
        let fields = self.validate()?;
        Ok(self.assemble(writer, None, fields, Local::now()))
    }

    /// Build a session, hand it to `f` and close it afterwards.
    ///
    /// The session is closed on every exit path of `f`. An error returned by
    /// `f` takes precedence over an error from closing.
    pub fn run<T, E>(self, f: impl FnOnce(&mut LogSession) -> Result<T, E>) -> Result<T, E>
    where
        E: From<Error>,
    {
        let mut session = self.build()?;
        let result = f(&mut session);
        if let Err(e) = session.close() {
            if result.is_ok() {
                return Err(e.into());
            }
            warn!("Failed to close log session after error: {e}");
        }
        result
    }

    fn validate(&self) -> Result<Vec<Field>, FieldOrderError> {
        if self.declared_twice {
            return Err(FieldOrderError::DeclaredTwice);
        }
        let fields = self.fields.clone().unwrap_or_default();
        if fields.is_empty() {
            return Err(FieldOrderError::Empty);
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.same_as(field)) {
                return Err(FieldOrderError::DuplicateField(field.label().to_owned()));
            }
        }
        let mut labels = HashSet::new();
        for label in self
            .timestamps
            .labels()
            .iter()
            .copied()
            .chain(fields.iter().map(Field::label))
        {
            if !labels.insert(label) {
                return Err(FieldOrderError::DuplicateLabel(label.to_owned()));
            }
        }
        Ok(fields)
    }

    fn assemble<W: Write>(
        self,
        sink: W,
        path: Option<PathBuf>,
        fields: Vec<Field>,
        started_at: chrono::DateTime<Local>,
    ) -> LogSession<W> {
        LogSession::new(
            sink,
            Parts {
                path,
                fields,
                mode: self.timestamps,
                timestamps: TimestampInjector::new(self.clock),
                retry: self.retry,
                started_at,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_error(builder: SessionBuilder) -> FieldOrderError {
        match builder.build_with_writer(Vec::new()) {
            Err(Error::InvalidFieldOrder(e)) => e,
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("field order should be rejected"),
        }
    }

    #[test]
    fn rejects_empty_order() {
        assert_eq!(order_error(SessionBuilder::new("t")), FieldOrderError::Empty);
        let none: [&Field; 0] = [];
        assert_eq!(
            order_error(SessionBuilder::new("t").fields(none)),
            FieldOrderError::Empty
        );
    }

    #[test]
    fn rejects_repeated_field() {
        let a = Field::new("A");
        assert_eq!(
            order_error(SessionBuilder::new("t").fields([&a, &a])),
            FieldOrderError::DuplicateField("A".to_owned())
        );
    }

    #[test]
    fn rejects_repeated_label() {
        let a = Field::new("A");
        let other_a = Field::new("A");
        assert_eq!(
            order_error(SessionBuilder::new("t").fields([&a, &other_a])),
            FieldOrderError::DuplicateLabel("A".to_owned())
        );
    }

    #[test]
    fn rejects_label_of_time_column() {
        let time = Field::new("Time");
        assert_eq!(
            order_error(SessionBuilder::new("t").fields([&time])),
            FieldOrderError::DuplicateLabel("Time".to_owned())
        );
        SessionBuilder::new("t")
            .timestamps(TimestampMode::None)
            .fields([&time])
            .build_with_writer(Vec::new())
            .unwrap();
    }

    #[test]
    fn rejects_second_declaration() {
        let a = Field::new("A");
        let b = Field::new("B");
        assert_eq!(
            order_error(SessionBuilder::new("t").fields([&a]).fields([&b])),
            FieldOrderError::DeclaredTwice
        );
    }

    #[test]
    fn config_sets_defaults() {
        let config = Config::from_toml("timestamps = \"none\"\nextension = \"txt\"").unwrap();
        let builder = SessionBuilder::new("t").with_config(&config);
        assert_eq!(builder.timestamps, TimestampMode::None);
        assert_eq!(builder.extension, "txt");
        assert_eq!(builder.directory, PathBuf::from("datalogs"));
    }
}
