pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}
use std::time::Duration;

use colored::Colorize;
use error::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::RunConfig;
use crate::style;
use crate::testing::{self, Judge, JudgeCode, TestOutcome, TestSummary, Testcase};

/// Progress of [`evaluate_each`], reported once per step.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    Started(&'a Testcase),
    Finished(&'a Testcase, &'a TestOutcome),
    Aborted(&'a Testcase),
}

/// Evaluates `testcases` one after another. Stops at the first fatal error.
pub async fn evaluate_all(cfg: &RunConfig, testcases: &[Testcase]) -> Result<TestSummary> {
    evaluate_each(cfg, testcases, |_| {}).await
}

/// Same as [`evaluate_all`], calling `on_progress` around every testcase.
pub async fn evaluate_each<F>(
    cfg: &RunConfig,
    testcases: &[Testcase],
    mut on_progress: F,
) -> Result<TestSummary>
where
    F: FnMut(Progress<'_>),
{
    let judge = Judge::new(cfg);
    let mut summary = TestSummary::with_capacity(testcases.len());
    for t in testcases {
        on_progress(Progress::Started(t));
        let res = match judge.evaluate(t).await {
            Ok(res) => res,
            Err(e) => {
                on_progress(Progress::Aborted(t));
                return Err(e).with_context(|| format!("Cannot run testcase {}", t.name()));
            }
        };
        on_progress(Progress::Finished(t, &res));
        summary.push(res);
    }
    Ok(summary)
}

/// Loads the test folder, runs every testcase with a spinner per test and
/// prints details of non-accepted results followed by the summary.
pub async fn run_tests(cfg: &RunConfig, truncate_lines: usize) -> Result<TestSummary> {
    let testcases = testing::load(&cfg.test_dir).context("Failed to load testcases")?;

    log::info!("Running: {}", cfg.program);
    style::print_run_header(cfg, testcases.len());

    let spinner_style = ProgressStyle::with_template("{spinner} {msg}")
        .context("Invalid progress bar template")?;

    let mut bar = ProgressBar::hidden();
    let summary = evaluate_each(cfg, &testcases, |progress| match progress {
        Progress::Started(t) => {
            bar = ProgressBar::new_spinner()
                .with_style(spinner_style.clone())
                .with_message(format!("Testcase {} ...", t.name()));
            bar.enable_steady_tick(Duration::from_millis(50));
        }
        Progress::Aborted(t) => {
            bar.abandon_with_message(format!("Testcase {} ... aborted", t.name()));
        }
        Progress::Finished(t, res) => {
            bar.finish_with_message(
                format!(
                    "Testcase {} ... {}{} [{}]",
                    t.name(),
                    style::judge_icon(res.judge),
                    " ".repeat(3 - res.judge.to_string().len()),
                    style::format_execution_time(res),
                )
                .cyan()
                .to_string(),
            );
        }
    })
    .await?;
    println!();

    let max_lines = cfg.truncate_output.then_some(truncate_lines);
    summary
        .outcomes()
        .iter()
        .filter(|x| x.judge != JudgeCode::AC)
        .for_each(|x| style::print_test_result_detail(x, max_lines));

    style::print_test_result_summary(&summary);
    Ok(summary)
}
