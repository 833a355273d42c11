//! Capability-based filesystem helpers built on `cap-std` and `camino`.

use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Read a UTF-8 text file.
///
/// # Errors
/// Returns any I/O error raised while opening or reading `path`.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_parent(path)?;
    dir.read_to_string(name)
}

/// Ensure the directory that will contain `path` exists.
///
/// Paths without a parent component, such as a bare file name, need no
/// work.
///
/// # Errors
/// Returns any I/O error raised while creating the directories.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }
    let (base, relative) = split_base(parent);
    if relative.as_str().is_empty() {
        return Ok(());
    }
    fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?.create_dir_all(&relative)
}

fn open_parent(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, &str)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Split a directory into an ambient base (root, prefix or `.`) and the
/// relative remainder that `cap-std` may create beneath it.
fn split_base(parent: &Utf8Path) -> (Utf8PathBuf, Utf8PathBuf) {
    let mut base = Utf8PathBuf::new();
    let mut relative = Utf8PathBuf::new();
    for component in parent.components() {
        match component {
            Utf8Component::Prefix(_) | Utf8Component::RootDir if relative.as_str().is_empty() => {
                base.push(component.as_str());
            }
            other => relative.push(other.as_str()),
        }
    }
    if base.as_str().is_empty() {
        base.push(".");
    }
    (base, relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("/var/lib/wifi", "/", "var/lib/wifi")]
    #[case("data/db", ".", "data/db")]
    #[case("/", "/", "")]
    fn splits_ambient_base(#[case] parent: &str, #[case] base: &str, #[case] relative: &str) {
        let (found_base, found_relative) = split_base(Utf8Path::new(parent));
        assert_eq!(found_base, Utf8PathBuf::from(base));
        assert_eq!(found_relative, Utf8PathBuf::from(relative));
    }

    #[rstest]
    fn bare_file_names_need_no_directory() {
        assert!(ensure_parent_dir(Utf8Path::new("wifi_data.db")).is_ok());
    }

    #[rstest]
    fn creates_nested_directories_and_reads_back() {
        let temp = TempDir::new().expect("create temp dir");
        let root = Utf8Path::from_path(temp.path()).expect("utf-8 temp dir");
        let target = root.join("a/b/payload.json");

        ensure_parent_dir(&target).expect("create parents");
        std::fs::write(&target, "{}").expect("write payload");
        assert_eq!(read_to_string(&target).expect("read payload"), "{}");
    }
}
