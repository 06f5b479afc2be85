use std::path::{Path, PathBuf};

use super::testcase::{Testcase, TestcaseOrigin};

pub const MULTI_CASE_FILENAME: &str = "tests.txt";
pub const INPUT_FILENAME: &str = "in.txt";
pub const OUTPUT_FILENAME: &str = "out.txt";

const INPUT_MARKER: &str = "_in";
const OUTPUT_MARKER: &str = "_out";
const COMMENT_PREFIX: &str = "//";

pub type Result<T> = std::result::Result<T, LoadError>;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Test folder not found: '{0}'")]
    FolderNotFound(PathBuf),

    #[error("Malformed '{file}' at line {line}: {kind}")]
    Malformed {
        file: PathBuf,
        line: usize,
        kind: MalformedKind,
    },

    #[error("Test folder '{}': '{}' or '{}' is missing", .0.display(), INPUT_FILENAME, OUTPUT_FILENAME)]
    IncompleteSubdir(PathBuf),

    #[error("Number of test inputs and outputs doesn't match ({inputs} inputs, {outputs} outputs)")]
    CountMismatch { inputs: usize, outputs: usize },

    #[error("No tests found in '{0}'")]
    NoTestcase(PathBuf),

    #[error(transparent)]
    Fs(#[from] fsutil::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MalformedKind {
    #[error("multiple test inputs in a row")]
    ConsecutiveInputs,

    #[error("multiple test outputs in a row")]
    ConsecutiveOutputs,

    #[error("test output appears before any test input")]
    OutputBeforeInput,

    #[error("content appears before the first '{}' marker", INPUT_MARKER)]
    ContentBeforeMarker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Marker(Marker, &'a str),
    Comment,
    Content,
}

impl<'a> Line<'a> {
    fn classify(line: &'a str) -> Self {
        if line.starts_with(COMMENT_PREFIX) {
            return Line::Comment;
        }
        let (head, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(head, rest)| (head, rest.trim()));
        match head {
            INPUT_MARKER => Line::Marker(Marker::Input, rest),
            OUTPUT_MARKER => Line::Marker(Marker::Output, rest),
            _ => Line::Content,
        }
    }
}

/// Inputs and outputs collected from every source, paired up at the end.
#[derive(Debug, Default)]
struct Collected {
    inputs: Vec<(TestcaseOrigin, String, Vec<String>)>,
    outputs: Vec<Vec<String>>,
}

impl Collected {
    fn into_testcases(self, dir: &Path) -> Result<Vec<Testcase>> {
        let Self { inputs, outputs } = self;
        if inputs.len() != outputs.len() {
            return Err(LoadError::CountMismatch {
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }
        if inputs.is_empty() {
            return Err(LoadError::NoTestcase(dir.to_owned()));
        }
        Ok(inputs
            .into_iter()
            .zip(outputs)
            .map(|((origin, comment, input), output)| {
                Testcase::new(origin, input, output).comment(comment)
            })
            .collect())
    }
}

/// Loads every testcase in `dir`: blocks of the multi-case file first (in file
/// order), then one testcase per subdirectory (sorted by name).
pub fn load(dir: impl AsRef<Path>) -> Result<Vec<Testcase>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(LoadError::FolderNotFound(dir.to_owned()));
    }

    let mut collected = Collected::default();

    let multi_case_file = dir.join(MULTI_CASE_FILENAME);
    if multi_case_file.is_file() {
        let text = fsutil::read_to_string(&multi_case_file)?;
        parse_multi_case_file(&text, &multi_case_file, &mut collected)?;
        log::debug!(
            "{} input(s) and {} output(s) in {:?}",
            collected.inputs.len(),
            collected.outputs.len(),
            multi_case_file
        );
    }

    for subdir in fsutil::list_subdirs(dir)? {
        let (input, output) = read_subdir_case(&subdir)?;
        let name = subdir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        collected
            .inputs
            .push((TestcaseOrigin::Subdir(name), String::new(), input));
        collected.outputs.push(output);
    }

    collected.into_testcases(dir)
}

fn read_subdir_case(subdir: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let input_path = subdir.join(INPUT_FILENAME);
    let output_path = subdir.join(OUTPUT_FILENAME);
    if !input_path.is_file() || !output_path.is_file() {
        return Err(LoadError::IncompleteSubdir(subdir.to_owned()));
    }
    Ok((
        fsutil::read_lines(input_path)?,
        fsutil::read_lines(output_path)?,
    ))
}

fn parse_multi_case_file(text: &str, file: &Path, collected: &mut Collected) -> Result<()> {
    let malformed = |line: usize, kind: MalformedKind| LoadError::Malformed {
        file: file.to_owned(),
        line,
        kind,
    };

    let mut current: Option<Marker> = None;
    let mut comment = "";
    let mut block = Vec::new();
    let mut num_inputs = 0;

    let mut flush = |marker: Option<Marker>, comment: &str, block: &mut Vec<String>| {
        let lines = std::mem::take(block);
        match marker {
            Some(Marker::Input) => {
                num_inputs += 1;
                collected.inputs.push((
                    TestcaseOrigin::MultiCaseFile(num_inputs),
                    comment.to_owned(),
                    lines,
                ));
            }
            Some(Marker::Output) => collected.outputs.push(lines),
            None => {}
        }
    };

    for (i, line) in text.lines().enumerate() {
        let lineno = i + 1;
        match Line::classify(line) {
            Line::Comment => {}
            Line::Content if current.is_some() => block.push(line.to_owned()),
            Line::Content if line.trim().is_empty() => {}
            Line::Content => return Err(malformed(lineno, MalformedKind::ContentBeforeMarker)),
            Line::Marker(marker, rest) => {
                match (current, marker) {
                    (Some(Marker::Input), Marker::Input) => {
                        return Err(malformed(lineno, MalformedKind::ConsecutiveInputs))
                    }
                    (Some(Marker::Output), Marker::Output) => {
                        return Err(malformed(lineno, MalformedKind::ConsecutiveOutputs))
                    }
                    (None, Marker::Output) => {
                        return Err(malformed(lineno, MalformedKind::OutputBeforeInput))
                    }
                    _ => {}
                }
                flush(current, comment, &mut block);
                current = Some(marker);
                comment = rest;
            }
        }
    }
    flush(current, comment, &mut block);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn parse(text: &str) -> Result<Vec<Testcase>> {
        let mut collected = Collected::default();
        parse_multi_case_file(text, Path::new(MULTI_CASE_FILENAME), &mut collected)?;
        collected.into_testcases(Path::new("."))
    }

    fn write_subdir(dir: &Path, name: &str, input: &str, output: &str) {
        fsutil::write_with_mkdir(dir.join(name).join(INPUT_FILENAME), input).unwrap();
        fsutil::write_with_mkdir(dir.join(name).join(OUTPUT_FILENAME), output).unwrap();
    }

    #[test]
    fn parse_blocks_with_comments() {
        let text = "\
_in  sums two numbers
3 5
_out
8
_in
// dropped
2 2
_out
4
";
        let cases = parse(text).unwrap();
        assert_eq!(cases.len(), 2);

        assert_eq!(cases[0].name(), "tests.txt#1");
        assert_eq!(cases[0].get_comment(), "sums two numbers");
        assert_eq!(cases[0].input(), lines(&["3 5"]));
        assert_eq!(cases[0].expected_output(), lines(&["8"]));

        assert_eq!(cases[1].name(), "tests.txt#2");
        assert_eq!(cases[1].get_comment(), "");
        assert_eq!(cases[1].input(), lines(&["2 2"]));
        assert_eq!(cases[1].expected_output(), lines(&["4"]));
    }

    #[test]
    fn empty_blocks_are_kept() {
        let cases = parse("_in\n_out\n_in\n1\n_out\n#any\n").unwrap();
        assert_eq!(cases.len(), 2);
        assert!(cases[0].input().is_empty());
        assert!(cases[0].expected_output().is_empty());
        assert!(cases[1].expects_any_answer());
    }

    #[test]
    fn marker_must_be_a_whole_token() {
        let cases = parse("_in\n_input\n_outside\n_out\nok\n").unwrap();
        assert_eq!(cases[0].input(), lines(&["_input", "_outside"]));
        assert_eq!(cases[0].expected_output(), lines(&["ok"]));
    }

    #[test]
    fn leading_blank_lines_are_ignored() {
        let cases = parse("\n  \n// header\n_in\n1\n_out\n1\n").unwrap();
        assert_eq!(cases.len(), 1);
    }

    #[test]
    fn consecutive_markers_are_rejected() {
        let kind_of = |text| match parse(text) {
            Err(LoadError::Malformed { line, kind, .. }) => (line, kind),
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(kind_of("_in\n_in\n"), (2, MalformedKind::ConsecutiveInputs));
        assert_eq!(
            kind_of("_in\n1\n_out\n2\n_out\n3\n"),
            (5, MalformedKind::ConsecutiveOutputs)
        );
        assert_eq!(kind_of("_out\n1\n"), (1, MalformedKind::OutputBeforeInput));
        assert_eq!(kind_of("1 2\n_in\n"), (1, MalformedKind::ContentBeforeMarker));
    }

    #[test]
    fn trailing_input_without_output_is_a_count_mismatch() {
        match parse("_in\n1\n_out\n1\n_in\n2\n") {
            Err(LoadError::CountMismatch { inputs, outputs }) => {
                assert_eq!((inputs, outputs), (2, 1))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn load_subdirs_only_in_name_order() {
        let tmp = tempfile::tempdir().unwrap();
        write_subdir(tmp.path(), "b", "2\n", "4\n");
        write_subdir(tmp.path(), "a", "1\n", "2\n");
        write_subdir(tmp.path(), "c", "3\n", "6\n");
        fsutil::write_with_mkdir(tmp.path().join("limits.txt"), "1000\n").unwrap();

        let cases = load(tmp.path()).unwrap();
        let names: Vec<_> = cases.iter().map(Testcase::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(cases[1].input(), lines(&["2"]));
        assert_eq!(cases[1].expected_output(), lines(&["4"]));
    }

    #[test]
    fn load_multi_case_file_before_subdirs() {
        let tmp = tempfile::tempdir().unwrap();
        fsutil::write_with_mkdir(
            tmp.path().join(MULTI_CASE_FILENAME),
            "_in first\n1\n_out\n1\n_in second\n2\n_out\n2\n",
        )
        .unwrap();
        write_subdir(tmp.path(), "sample1", "3\n", "3\n");

        let cases = load(tmp.path()).unwrap();
        let names: Vec<_> = cases.iter().map(Testcase::name).collect();
        assert_eq!(names, vec!["tests.txt#1", "tests.txt#2", "sample1"]);
        assert_eq!(cases[1].get_comment(), "second");
        assert_eq!(cases[2].get_comment(), "");
    }

    #[test]
    fn files_saved_with_bom_load_cleanly() {
        let tmp = tempfile::tempdir().unwrap();
        fsutil::write_with_mkdir(
            tmp.path().join(MULTI_CASE_FILENAME),
            "\u{feff}_in\n3 5\n_out\n8\n",
        )
        .unwrap();
        write_subdir(tmp.path(), "bom", "\u{feff}1 2\n", "\u{feff}3\n");

        let cases = load(tmp.path()).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].input(), lines(&["3 5"]));
        assert_eq!(cases[0].expected_output(), lines(&["8"]));
        assert_eq!(cases[1].input(), lines(&["1 2"]));
        assert_eq!(cases[1].expected_output(), lines(&["3"]));
    }

    #[test]
    fn load_fails_on_incomplete_subdir() {
        let tmp = tempfile::tempdir().unwrap();
        write_subdir(tmp.path(), "ok", "1\n", "1\n");
        fsutil::write_with_mkdir(tmp.path().join("broken").join(INPUT_FILENAME), "1\n").unwrap();

        match load(tmp.path()) {
            Err(LoadError::IncompleteSubdir(dir)) => assert!(dir.ends_with("broken")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn load_fails_on_missing_or_empty_folder() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(tmp.path().join("nope")),
            Err(LoadError::FolderNotFound(_))
        ));
        assert!(matches!(load(tmp.path()), Err(LoadError::NoTestcase(_))));
    }
}
