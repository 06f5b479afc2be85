use std::{
    num::ParseIntError,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::testing::runner::Invocation;

pub const LIMIT_FILENAME: &str = "limits.txt";
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_millis(1000);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid '{0}': expected a time limit in milliseconds on the first line")]
    EmptyLimitFile(PathBuf),

    #[error("Invalid number format in '{path}': '{value}' ({source})")]
    InvalidTimeLimit {
        path: PathBuf,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error(transparent)]
    Fs(#[from] fsutil::Error),
}

/// External program deciding correctness, with the extra parameters it receives
/// after the candidate and expected output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checker {
    pub invocation: Invocation,
    pub params: Vec<String>,
}

impl Checker {
    pub fn new(invocation: Invocation, params: Vec<String>) -> Self {
        Self { invocation, params }
    }
}

/// Settings for one run over a test folder. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub program: Invocation,
    pub test_dir: PathBuf,
    pub checker: Option<Checker>,
    pub time_limit: Duration,
    pub truncate_output: bool,
}

impl RunConfig {
    pub fn new(program: Invocation, test_dir: impl Into<PathBuf>) -> Self {
        Self {
            program,
            test_dir: test_dir.into(),
            checker: None,
            time_limit: DEFAULT_TIME_LIMIT,
            truncate_output: true,
        }
    }

    pub fn checker(mut self, checker: Option<Checker>) -> Self {
        self.checker = checker;
        self
    }

    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn truncate_output(mut self, yes: bool) -> Self {
        self.truncate_output = yes;
        self
    }

    /// Sets the time limit from `override_limit`, else from the limit file in
    /// the test folder, else [`DEFAULT_TIME_LIMIT`].
    pub fn resolve_time_limit(
        mut self,
        override_limit: Option<Duration>,
    ) -> Result<Self, ConfigError> {
        self.time_limit = match override_limit {
            Some(limit) => limit,
            None => read_time_limit(&self.test_dir)?.unwrap_or(DEFAULT_TIME_LIMIT),
        };
        Ok(self)
    }
}

/// Reads the first line of the limit file as milliseconds.
/// `Ok(None)` if the file does not exist.
pub fn read_time_limit(test_dir: impl AsRef<Path>) -> Result<Option<Duration>, ConfigError> {
    let path = test_dir.as_ref().join(LIMIT_FILENAME);
    if !path.is_file() {
        log::debug!("No {:?}; using the default time limit", path);
        return Ok(None);
    }
    let text = fsutil::read_to_string(&path)?;
    let Some(first) = text.lines().next().map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(ConfigError::EmptyLimitFile(path));
    };
    let millis: u64 = first
        .parse()
        .map_err(|source| ConfigError::InvalidTimeLimit {
            path: path.clone(),
            value: first.to_owned(),
            source,
        })?;
    Ok(Some(Duration::from_millis(millis)))
}
