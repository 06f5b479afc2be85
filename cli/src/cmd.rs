use std::{path::PathBuf, time::Duration};

use qjudge_core::{
    action,
    config::{Checker, RunConfig},
    testing::Invocation,
};

use crate::{config::GlobalConfig, util};

pub type CmdResult = anyhow::Result<()>;

/// Runs PROGRAM against every testcase in TEST_DIR and judges its output.
///
/// TEST_DIR may contain `tests.txt` (blocks starting with `_in` / `_out`),
/// one subfolder per testcase holding `in.txt` and `out.txt`, and
/// `limits.txt` whose first line is the time limit in milliseconds.
#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about)]
pub struct Args {
    /// Program to test
    pub program: PathBuf,

    /// Folder holding the testcases
    pub test_dir: PathBuf,

    /// Checker program deciding correctness instead of line-by-line comparison
    pub checker: Option<PathBuf>,

    /// Extra parameters passed to the checker after both outputs.
    /// After the first one, values like `-e` are parameters too unless they
    /// are short options of this command; anything after `--` is passed as is.
    #[arg(allow_negative_numbers = true, allow_hyphen_values = true)]
    pub checker_params: Vec<String>,

    /// Show outputs in full instead of truncating long ones
    #[arg(long)]
    pub no_truncate: bool,

    /// Launch PROGRAM through this executor (e.g. an interpreter)
    #[arg(short = 'x', long, value_name = "EXECUTOR")]
    pub executor: Option<PathBuf>,

    /// Time limit in milliseconds, overriding limits.txt
    #[arg(short = 't', long, value_name = "MS")]
    pub time_limit: Option<u64>,
}

impl Args {
    pub async fn exec(&self) -> CmdResult {
        let global = GlobalConfig::from_file_or_default()?;
        let cfg = self.to_run_config(&global)?;
        let _ = action::run_tests(&cfg, global.truncate_lines).await?;
        Ok(())
    }

    pub fn to_run_config(&self, global: &GlobalConfig) -> anyhow::Result<RunConfig> {
        let executor = self.executor.clone().or_else(|| {
            let filename = self.program.file_name()?.to_string_lossy();
            global
                .find_executor_for_filename(filename)
                .map(|p| p.to_owned())
        });

        let program = match executor {
            Some(executor) => Invocation::new(&self.program).executor(executor),
            None => Invocation::new(util::launchable_path(&self.program)),
        };
        let checker = self.checker.as_ref().map(|checker| {
            Checker::new(
                Invocation::new(util::launchable_path(checker)),
                self.checker_params.clone(),
            )
        });

        let cfg = RunConfig::new(program, &self.test_dir)
            .checker(checker)
            .truncate_output(!self.no_truncate)
            .resolve_time_limit(self.time_limit.map(Duration::from_millis))?;
        Ok(cfg)
    }
}
