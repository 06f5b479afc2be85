use std::{collections::BTreeMap, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
pub enum JudgeCode {
    /// Accepted
    AC,
    /// Wrong answer
    WA,
    /// Time limit exceeded
    TLE,
    /// Runtime error (non-zero exit)
    RE,
    /// Any answer accepted: ran within the limit and printed something
    AA,
    /// Checker error
    CE,
}

impl JudgeCode {
    pub fn is_passed(self) -> bool {
        matches!(self, JudgeCode::AC | JudgeCode::AA)
    }

    pub fn description(self) -> &'static str {
        use JudgeCode::*;
        match self {
            AC => "Accepted",
            WA => "Wrong answer",
            TLE => "Time limit exceeded",
            RE => "Runtime error",
            AA => "Any answer accepted",
            CE => "Checker error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub testcase_name: String,
    pub comment: String,
    pub judge: JudgeCode,
    pub execution_time: Duration,
    pub exit_code: Option<i32>,
    /// Candidate's stdout (possibly partial for TLE)
    pub stdout: Vec<String>,
    pub groundtruth: Vec<String>,
    /// Diagnostic for RE and CE
    pub message: Option<String>,
}

/// Outcomes in testcase order, plus the pass/fail rollup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSummary {
    outcomes: Vec<TestOutcome>,
}

impl TestSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, outcome: TestOutcome) {
        self.outcomes.push(outcome)
    }

    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn num_passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.judge.is_passed()).count()
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.judge.is_passed())
    }

    pub fn count_by_judge(&self) -> BTreeMap<JudgeCode, usize> {
        self.outcomes
            .iter()
            .fold(BTreeMap::new(), |mut count, o| {
                *count.entry(o.judge).or_default() += 1;
                count
            })
    }
}

impl Extend<TestOutcome> for TestSummary {
    fn extend<I: IntoIterator<Item = TestOutcome>>(&mut self, iter: I) {
        self.outcomes.extend(iter)
    }
}

impl FromIterator<TestOutcome> for TestSummary {
    fn from_iter<I: IntoIterator<Item = TestOutcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}
