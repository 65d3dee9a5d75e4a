use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Create a directory holding `a.html`, `b.html`, `notes.txt` and a
/// `subdir/nested.html` that a flat scan must not see.
pub fn create_test_dir() -> TempDir {
    let dir = TempDir::new().unwrap();

    touch(dir.path(), "a.html");
    touch(dir.path(), "b.html");
    fs::write(dir.path().join("notes.txt"), "not a tool").unwrap();

    fs::create_dir(dir.path().join("subdir")).unwrap();
    touch(dir.path().join("subdir"), "nested.html");

    dir
}

pub fn touch(dir: impl AsRef<Path>, name: &str) {
    fs::write(dir.as_ref().join(name), "<html></html>").unwrap();
}
