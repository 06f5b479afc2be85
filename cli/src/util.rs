use std::path::{Component, Path, PathBuf};

pub fn replace_homedir_to_tilde(path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    let Some(home_dir) = ::dirs::home_dir() else {
        return path
    };
    path.strip_prefix(home_dir)
        .map(|path| Path::new("~").join(path))
        .unwrap_or(path)
}

/// A bare file name is looked up in `PATH` when spawned; prefix it with `./`
/// when such a file exists in the current dir.
pub fn launchable_path(path: &Path) -> PathBuf {
    let mut components = path.components();
    let is_bare_name = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if is_bare_name && path.is_file() {
        Path::new(".").join(path)
    } else {
        path.to_owned()
    }
}
