use std::path::{Component, Path};

/// Render a path with forward slashes, dropping `.` components.
pub fn normalize_path(path: &Path) -> String {
    let mut parts = Vec::new();
    for comp in path.components() {
        match comp {
            Component::Normal(os) => parts.push(os.to_string_lossy().to_string()),
            Component::ParentDir => parts.push("..".to_string()),
            Component::CurDir => {}
            _ => {}
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Make a node filename comparable with the paths git reports: strip the repo
/// root when the filename is absolute, otherwise normalize it as-is.
pub fn rel_to_root(repo_root: &Path, filename: &str) -> String {
    let path = Path::new(filename);
    match path.strip_prefix(repo_root) {
        Ok(rel) => normalize_path(rel),
        Err(_) => normalize_path(path),
    }
}
