use std::fmt;

use super::loader::MULTI_CASE_FILENAME;

/// Expected output whose first line is this sentinel accepts any non-empty output.
pub const ANY_ANSWER_SENTINEL: &str = "#any";

/// Where a testcase was defined in the test folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestcaseOrigin {
    /// 1-based block number inside the multi-case file.
    MultiCaseFile(usize),
    /// Name of the per-case subdirectory.
    Subdir(String),
}

impl fmt::Display for TestcaseOrigin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TestcaseOrigin::*;
        match self {
            MultiCaseFile(ord) => write!(f, "{}#{}", MULTI_CASE_FILENAME, ord),
            Subdir(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Testcase {
    origin: TestcaseOrigin,
    input: Vec<String>,
    expected_output: Vec<String>,
    comment: String,
}

impl Testcase {
    pub fn new(
        origin: TestcaseOrigin,
        input: Vec<String>,
        expected_output: Vec<String>,
    ) -> Self {
        Self {
            origin,
            input,
            expected_output,
            comment: String::new(),
        }
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn name(&self) -> String {
        self.origin.to_string()
    }

    pub fn origin(&self) -> &TestcaseOrigin {
        &self.origin
    }

    pub fn input(&self) -> &[String] {
        &self.input
    }

    pub fn expected_output(&self) -> &[String] {
        &self.expected_output
    }

    pub fn get_comment(&self) -> &str {
        &self.comment
    }

    pub fn expects_any_answer(&self) -> bool {
        self.expected_output
            .first()
            .map_or(false, |line| line.trim() == ANY_ANSWER_SENTINEL)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn name_follows_origin() {
        let t = Testcase::new(TestcaseOrigin::MultiCaseFile(3), vec![], vec![]);
        assert_eq!(t.name(), "tests.txt#3");

        let t = Testcase::new(TestcaseOrigin::Subdir("sample-1".into()), vec![], vec![]);
        assert_eq!(t.name(), "sample-1");
        assert_eq!(t.get_comment(), "");
    }

    #[test]
    fn any_answer_only_when_first_line_is_sentinel() {
        let origin = TestcaseOrigin::MultiCaseFile(1);
        let any = |out: &[&str]| Testcase::new(origin.clone(), vec![], lines(out)).expects_any_answer();

        assert!(any(&["#any"]));
        assert!(any(&["#any  "]));
        assert!(any(&["#any", "ignored"]));
        assert!(!any(&[]));
        assert!(!any(&["42", "#any"]));
        assert!(!any(&["#anything"]));
    }
}
