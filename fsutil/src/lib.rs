use std::{
    fs::{self, ReadDir},
    path::{Path, PathBuf},
};

pub mod error {
    use std::{io, path::PathBuf};

    pub type Result<T> = std::result::Result<T, self::Error>;

    type Msg = &'static str;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("{0} ({1}): {2}")]
        SingleIO(Msg, PathBuf, #[source] io::Error),

        #[error("Cannot access entry in dir ({0}): {1}")]
        DirEntry(PathBuf, #[source] io::Error),
    }
}
pub use error::{Error, Result};

const UTF8_BOM: char = '\u{feff}';

#[must_use]
pub fn mkdir_all(path: impl AsRef<Path>) -> Result<()> {
    let dir = path.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::SingleIO("Cannot create dir", dir.to_owned(), e))
}

#[must_use]
pub fn write_with_mkdir<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    let filepath = filepath.as_ref();
    if let Some(dir) = filepath.parent() {
        self::mkdir_all(dir)?;
    }
    fs::write(filepath, contents)
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.to_owned(), e))
}

/// Reads a whole text file. A leading UTF-8 byte order mark is dropped.
#[must_use]
pub fn read_to_string(filepath: impl AsRef<Path>) -> Result<String> {
    let text = fs::read_to_string(&filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.as_ref().to_owned(), e))?;
    match text.strip_prefix(UTF8_BOM) {
        Some(rest) => Ok(rest.to_owned()),
        None => Ok(text),
    }
}

/// Reads a text file as lines. Line terminators (`\n` or `\r\n`) are stripped
/// and a terminating newline does not yield a trailing empty line.
#[must_use]
pub fn read_lines(filepath: impl AsRef<Path>) -> Result<Vec<String>> {
    let text = self::read_to_string(filepath)?;
    Ok(text.lines().map(str::to_owned).collect())
}

#[must_use]
pub fn read_dir(dir: impl AsRef<Path>) -> Result<ReadDir> {
    fs::read_dir(&dir).map_err(|e| Error::SingleIO("Cannot read dir", dir.as_ref().to_owned(), e))
}

/// Lists the direct subdirectories of `dir` (symlinks to dirs included),
/// sorted by file name.
#[must_use]
pub fn list_subdirs(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut res = Vec::new();
    for entry in self::read_dir(dir)? {
        let entry = entry.map_err(|e| Error::DirEntry(dir.to_owned(), e))?;
        let path = entry.path();
        if path.is_dir() {
            res.push(path);
        } else {
            log::trace!("Skip non-dir entry {:?}", path);
        }
    }
    res.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(res)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn read_lines_strips_terminators() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.txt");
        write_with_mkdir(&path, "1 2\r\n3\n\nlast").unwrap();

        assert_eq!(read_lines(&path).unwrap(), vec!["1 2", "3", "", "last"]);

        write_with_mkdir(&path, "x\n").unwrap();
        assert_eq!(read_lines(&path).unwrap(), vec!["x"]);

        write_with_mkdir(&path, "").unwrap();
        assert!(read_lines(&path).unwrap().is_empty());
    }

    #[test]
    fn leading_bom_is_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.txt");
        write_with_mkdir(&path, "\u{feff}8\r\n9\n").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "8\r\n9\n");
        assert_eq!(read_lines(&path).unwrap(), vec!["8", "9"]);

        // Only the first one is a byte order mark.
        write_with_mkdir(&path, "\u{feff}\u{feff}x").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "\u{feff}x");
    }

    #[test]
    fn list_subdirs_is_sorted_and_skips_files() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b", "a", "c10", "c09"] {
            mkdir_all(tmp.path().join(name)).unwrap();
        }
        write_with_mkdir(tmp.path().join("tests.txt"), "").unwrap();

        let names: Vec<_> = list_subdirs(tmp.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a", "b", "c09", "c10"]);
    }

    #[test]
    fn missing_file_error_names_path() {
        let err = read_to_string("/no/such/dir/in.txt").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Cannot read file"), "{}", msg);
        assert!(msg.contains("/no/such/dir/in.txt"), "{}", msg);
    }
}
