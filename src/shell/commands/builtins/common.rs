use std::fs;
use std::path::{Component, Path, PathBuf};
use anyhow::Result;
use crate::shell::error::ShellError;

/// Turns `raw` into an absolute, normalized path.
///
/// Order matters: a bare drive designator such as `D:` must be recognised
/// before the generic join, otherwise it would land under `working_dir` as a
/// relative segment.
pub fn resolve_path(working_dir: &Path, raw: &str) -> Result<PathBuf, ShellError> {
    if raw.trim().is_empty() {
        return Err(ShellError::InvalidPath);
    }

    let p = Path::new(raw);
    if p.is_absolute() {
        return Ok(normalize(p));
    }

    if let Some(root) = drive_root(raw) {
        return Ok(root);
    }

    Ok(normalize(&working_dir.join(p)))
}

/// Lexically resolves `.` and `..`. `..` at a root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

// Drive letters only mean something on Windows.
fn drive_root(raw: &str) -> Option<PathBuf> {
    if !cfg!(windows) {
        return None;
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(letter), Some(':'), None) if letter.is_ascii_alphabetic() => Some(PathBuf::from(
            format!("{}:{}", letter.to_ascii_uppercase(), std::path::MAIN_SEPARATOR),
        )),
        _ => None,
    }
}

/// True when both paths name the same existing filesystem object, which also
/// catches case-only differences on case-insensitive filesystems.
pub fn same_entry(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}

/// Copies `src` into `dst`, creating directories as needed and overwriting
/// existing files.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rejects_blank() {
        assert_eq!(resolve_path(Path::new("/tmp"), "  "), Err(ShellError::InvalidPath));
        assert_eq!(resolve_path(Path::new("/tmp"), ""), Err(ShellError::InvalidPath));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_relative_and_dots() {
        let wd = Path::new("/home/user/docs");
        assert_eq!(resolve_path(wd, "a/b").unwrap(), PathBuf::from("/home/user/docs/a/b"));
        assert_eq!(resolve_path(wd, "./a/../b").unwrap(), PathBuf::from("/home/user/docs/b"));
        assert_eq!(resolve_path(wd, "../../x").unwrap(), PathBuf::from("/home/x"));
        assert_eq!(resolve_path(wd, "/etc/./ssh/..").unwrap(), PathBuf::from("/etc"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_parent_reaches_fixed_root() {
        let mut wd = PathBuf::from("/a/b/c");
        for _ in 0..3 {
            wd = resolve_path(&wd, "..").unwrap();
        }
        assert_eq!(wd, PathBuf::from("/"));
        assert_eq!(resolve_path(&wd, "..").unwrap(), PathBuf::from("/"));
    }

    #[cfg(unix)]
    #[test]
    fn test_drive_designator_is_relative_on_unix() {
        assert_eq!(resolve_path(Path::new("/w"), "C:").unwrap(), PathBuf::from("/w/C:"));
    }

    #[cfg(windows)]
    #[test]
    fn test_drive_designator_switches_root() {
        assert_eq!(resolve_path(Path::new(r"C:\Users"), "d:").unwrap(), PathBuf::from(r"D:\"));
        assert_eq!(resolve_path(Path::new(r"C:\Users\me"), "..").unwrap(), PathBuf::from(r"C:\Users"));
    }

    #[test]
    fn test_copy_dir_recursive_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("nested").join("f.txt"), "new").unwrap();
        fs::create_dir_all(dst.join("nested")).unwrap();
        fs::write(dst.join("nested").join("f.txt"), "old").unwrap();

        copy_dir_recursive(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("nested").join("f.txt")).unwrap(), "new");
    }
}
