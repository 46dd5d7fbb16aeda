//! Capability-based filesystem helpers for request and solution files.

use std::io;
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open an existing UTF-8 file path using ambient authority.
pub(crate) fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Create (or truncate) `path`, creating missing parent directories.
pub(crate) fn create_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_parent_and_name(path)?;
    dir.create(name.as_str())
}

/// Return whether `path` exists and is a regular file.
pub(crate) fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent_and_name(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Return whether `path` exists and is a directory; missing paths are not.
pub(crate) fn path_is_dir(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = match open_parent_and_name(path) {
        Ok(parts) => parts,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(meta.is_dir()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Open the directory containing `path` and return it with the file name.
///
/// A bare file name resolves against the current directory.
fn open_parent_and_name(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }
    let (base, relative) = split_anchor(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Split `parent` into an ambient anchor directory (root, drive prefix or the
/// current directory) and the path relative to it.
fn split_anchor(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_parent = parent.as_std_path();
    let anchor = match std_parent.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            Utf8PathBuf::from(prefix).join(std::path::MAIN_SEPARATOR_STR)
        }
        Some(Component::RootDir) => Utf8PathBuf::from(std::path::MAIN_SEPARATOR_STR),
        _ => Utf8PathBuf::from("."),
    };
    let relative = if anchor.as_str() == "." {
        parent.to_path_buf()
    } else {
        parent
            .strip_prefix(&anchor)
            .map_err(|_| io::Error::other(format!("cannot strip {anchor} from {parent}")))?
            .to_path_buf()
    };
    let base = fs_utf8::Dir::open_ambient_dir(&anchor, ambient_authority())?;
    Ok((base, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Utf8PathBuf) {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        (tmp, root)
    }

    #[rstest]
    fn create_makes_missing_parents() {
        let (_tmp, root) = workspace();
        let target = root.join("nested/deeper/solution.json");
        let mut file = create_utf8_file(&target).expect("create file");
        file.write_all(b"{}").expect("write");
        assert!(file_is_file(&target).expect("inspect"));
    }

    #[rstest]
    fn directories_are_not_files() {
        let (_tmp, root) = workspace();
        let dir = root.join("sub");
        std::fs::create_dir(&dir).expect("mkdir");
        assert!(!file_is_file(&dir).expect("inspect"));
        assert!(path_is_dir(&dir).expect("inspect"));
    }

    #[rstest]
    fn missing_paths_are_not_directories() {
        let (_tmp, root) = workspace();
        assert!(!path_is_dir(&root.join("absent/child.json")).expect("inspect"));
        assert!(!path_is_dir(&root.join("absent.json")).expect("inspect"));
    }

    #[rstest]
    fn missing_file_reports_not_found() {
        let (_tmp, root) = workspace();
        let err = file_is_file(&root.join("absent.json")).expect_err("missing file");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
