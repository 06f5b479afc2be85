use std::path::{Path, PathBuf};

use anyhow::Context as _;
use qjudge_core::{serdable::GlobPattern, style::DEFAULT_TRUNCATE_LINES};
use serde::Deserialize;

use crate::util;

pub const APP_NAME: &str = "qjudge-cli";

/// User-wide settings, read from `<config dir>/qjudge-cli/qjudge.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "GlobalConfig::default_truncate_lines")]
    pub truncate_lines: usize,

    #[serde(default, rename = "executor")]
    pub executors: Vec<ExecutorEntry>,
}

/// Launch candidates whose file name matches `pattern` through `program`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecutorEntry {
    pub pattern: GlobPattern,
    pub program: PathBuf,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        GlobalConfig {
            truncate_lines: Self::default_truncate_lines(),
            executors: Vec::new(),
        }
    }
}

impl GlobalConfig {
    pub const FILENAME: &str = "qjudge.toml";

    pub fn filepath() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(Self::FILENAME))
    }

    fn default_truncate_lines() -> usize {
        DEFAULT_TRUNCATE_LINES
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_file_or_default() -> anyhow::Result<Self> {
        let Some(path) = Self::filepath() else {
            return Ok(Self::default())
        };
        let toml = match fsutil::read_to_string(&path) {
            Ok(toml) => toml,
            Err(e) => {
                log::debug!("Use default config: {}", e);
                return Ok(Self::default());
            }
        };
        Self::from_toml(&toml).with_context(|| {
            format!(
                "Invalid config '{}'",
                util::replace_homedir_to_tilde(&path).to_string_lossy()
            )
        })
    }

    pub fn find_executor_for_filename(&self, filename: impl AsRef<str>) -> Option<&Path> {
        self.executors
            .iter()
            .find(|entry| entry.pattern.matches(filename.as_ref()))
            .map(|entry| entry.program.as_path())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(GlobalConfig::from_toml("").unwrap(), GlobalConfig::default());
    }

    #[test]
    fn executors_match_in_order() {
        let cfg = GlobalConfig::from_toml(
            r#"
truncate_lines = 5

[[executor]]
pattern = "*.py"
program = "pypy3"

[[executor]]
pattern = "*.p[yl]"
program = "perl"
"#,
        )
        .unwrap();

        assert_eq!(cfg.truncate_lines, 5);
        assert_eq!(cfg.find_executor_for_filename("main.py"), Some(Path::new("pypy3")));
        assert_eq!(cfg.find_executor_for_filename("main.pl"), Some(Path::new("perl")));
        assert_eq!(cfg.find_executor_for_filename("a.out"), None);
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let res = GlobalConfig::from_toml("[[executor]]\npattern = \"[\"\nprogram = \"x\"\n");
        assert!(res.is_err());
    }
}
