use std::time::Duration;

use super::{
    result::{JudgeCode, TestOutcome},
    runner::{self, ExecStatus, RunError},
    testcase::Testcase,
};
use crate::{
    config::{Checker, RunConfig},
    exit_code::describe_exit_code,
};

/// Fixed budget for the checker, independent of the candidate's time limit.
pub const CHECKER_TIME_LIMIT: Duration = Duration::from_millis(500);

const CHECKER_ACCEPT: &str = "OK";
const CHECKER_REJECT: &str = "WA";

/// Decides the verdict of single testcases. Holds nothing but the run config,
/// so every `evaluate` call is independent of the others.
#[derive(Debug, Clone, Copy)]
pub struct Judge<'c> {
    cfg: &'c RunConfig,
}

impl<'c> Judge<'c> {
    pub fn new(cfg: &'c RunConfig) -> Self {
        Self { cfg }
    }

    /// Runs the candidate on `testcase` and judges the result.
    ///
    /// Fails only when the whole run must stop: the candidate cannot be
    /// launched, or a killed process never terminates. A checker that cannot
    /// be launched yields `CE` for this testcase instead.
    pub async fn evaluate(&self, testcase: &Testcase) -> Result<TestOutcome, RunError> {
        let exec = runner::run(&self.cfg.program, testcase.input(), self.cfg.time_limit).await?;

        let (judge, message) = match exec.status {
            ExecStatus::TimedOut => (JudgeCode::TLE, None),
            ExecStatus::NonZeroExit => (JudgeCode::RE, exec.exit_code.map(describe_exit_code)),
            ExecStatus::Ok => self.judge_output(testcase, &exec.stdout_lines).await?,
        };
        log::debug!("{}: {}", testcase.name(), judge);

        Ok(TestOutcome {
            testcase_name: testcase.name(),
            comment: testcase.get_comment().to_owned(),
            judge,
            execution_time: exec.elapsed,
            exit_code: exec.exit_code,
            stdout: exec.stdout_lines,
            groundtruth: testcase.expected_output().to_vec(),
            message,
        })
    }

    async fn judge_output(
        &self,
        testcase: &Testcase,
        stdout: &[String],
    ) -> Result<(JudgeCode, Option<String>), RunError> {
        if testcase.expects_any_answer() && !stdout.is_empty() {
            return Ok((JudgeCode::AA, None));
        }
        match &self.cfg.checker {
            Some(checker) => self::run_checker(checker, stdout, testcase.expected_output()).await,
            None if self::lines_match(stdout, testcase.expected_output()) => {
                Ok((JudgeCode::AC, None))
            }
            None => Ok((JudgeCode::WA, None)),
        }
    }
}

/// Equal line counts and every pair equal after trimming both sides.
pub fn lines_match(stdout: &[String], groundtruth: &[String]) -> bool {
    stdout.len() == groundtruth.len()
        && stdout
            .iter()
            .zip(groundtruth)
            .all(|(a, b)| a.trim() == b.trim())
}

/// Checker stdin: the three counts, then candidate lines, expected lines and
/// extra parameters.
pub fn checker_input(stdout: &[String], groundtruth: &[String], params: &[String]) -> Vec<String> {
    let mut input = Vec::with_capacity(3 + stdout.len() + groundtruth.len() + params.len());
    input.push(stdout.len().to_string());
    input.push(groundtruth.len().to_string());
    input.push(params.len().to_string());
    input.extend_from_slice(stdout);
    input.extend_from_slice(groundtruth);
    input.extend_from_slice(params);
    input
}

/// The first stdout line of the checker, with surrounding whitespace trimmed,
/// must be `OK` or `WA`; anything else is `CE`.
async fn run_checker(
    checker: &Checker,
    stdout: &[String],
    groundtruth: &[String],
) -> Result<(JudgeCode, Option<String>), RunError> {
    let input = self::checker_input(stdout, groundtruth, &checker.params);
    let exec = match runner::run(&checker.invocation, &input, CHECKER_TIME_LIMIT).await {
        Ok(exec) => exec,
        Err(e) if e.is_launch_failure() => {
            log::warn!("{}", e);
            return Ok((JudgeCode::CE, Some(e.to_string())));
        }
        Err(e) => return Err(e),
    };

    let verdict = match exec.status {
        ExecStatus::TimedOut => (
            JudgeCode::CE,
            Some(format!(
                "Checker exceeded its {}ms time limit",
                CHECKER_TIME_LIMIT.as_millis()
            )),
        ),
        ExecStatus::NonZeroExit => (
            JudgeCode::CE,
            Some(format!(
                "Checker exited abnormally ({})",
                exec.exit_code.map_or_else(|| "unknown".to_owned(), describe_exit_code)
            )),
        ),
        ExecStatus::Ok => match exec.stdout_lines.first().map(|line| line.trim()) {
            Some(CHECKER_ACCEPT) => (JudgeCode::AC, None),
            Some(CHECKER_REJECT) => (JudgeCode::WA, None),
            Some(other) => (
                JudgeCode::CE,
                Some(format!(
                    "Unexpected checker response '{}' (expected '{}' or '{}')",
                    other, CHECKER_ACCEPT, CHECKER_REJECT
                )),
            ),
            None => (JudgeCode::CE, Some("Checker produced no output".to_owned())),
        },
    };
    Ok(verdict)
}
