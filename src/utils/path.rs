use crate::error::AppError;
use std::path::{Component, Path, PathBuf};

/// Client path that denotes the storage root itself.
pub const ROOT_MARKER: &str = "/";

pub fn normalize_path(path: &Path) -> PathBuf {
    let mut ret = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) => ret.push(component.as_os_str()),
            Component::RootDir => ret.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                ret.pop();
            }
            Component::Normal(c) => ret.push(c),
        }
    }
    ret
}

/// Absolute directory that every client path is resolved against.
#[derive(Debug, Clone)]
pub struct StorageRoot {
    path: PathBuf,
}

impl StorageRoot {
    /// Creates the directory if needed and pins it to its canonical form.
    pub async fn open(path: &Path) -> std::io::Result<Self> {
        ensure_directory(path).await?;
        let path = tokio::fs::canonicalize(path).await?;
        if !tokio::fs::metadata(&path).await?.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("storage path is not a directory: {}", path.display()),
            ));
        }
        Ok(Self { path })
    }

    /// Wraps an already absolute, normalized directory.
    #[cfg(test)]
    pub fn from_absolute(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolve(&self, user_path: &str) -> Result<PathBuf, AppError> {
        if user_path == ROOT_MARKER {
            return Ok(self.path.clone());
        }
        self.contain(self.path.join(strip_leading_separators(user_path)), user_path)
    }

    /// Resolves `name` inside the client directory `dir`.
    pub fn resolve_child(&self, dir: &str, name: &str) -> Result<PathBuf, AppError> {
        let base = self.resolve(dir)?;
        self.contain(base.join(strip_leading_separators(name)), name)
    }

    /// Resolves an entry directly inside `dir`. `name` must be a single
    /// plain component, so it can never denote `dir` or one of its parents.
    pub fn resolve_item(&self, dir: &str, name: &str) -> Result<PathBuf, AppError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => self.resolve_child(dir, name),
            _ => Err(AppError::BadRequest(format!("Invalid item name: {:?}", name))),
        }
    }

    fn contain(&self, joined: PathBuf, user_path: &str) -> Result<PathBuf, AppError> {
        let normalized = normalize_path(&joined);
        if normalized.starts_with(&self.path) {
            Ok(normalized)
        } else {
            Err(AppError::Resolution(user_path.to_string()))
        }
    }
}

fn strip_leading_separators(path: &str) -> &str {
    path.trim_start_matches(|c| c == '/' || c == std::path::MAIN_SEPARATOR)
}

pub async fn ensure_directory(path: &Path) -> std::io::Result<()> {
    if !tokio::fs::try_exists(path).await? {
        tokio::fs::create_dir_all(path).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> StorageRoot {
        StorageRoot::from_absolute(PathBuf::from("/srv/storage"))
    }

    #[test]
    fn test_normalize_path() {
        let cases = vec![
            ("a/b/c", "a/b/c"),
            ("a/./b", "a/b"),
            ("a/../b", "b"),
            ("a/b/../../c", "c"),
            ("/", "/"),
            ("/a/./b", "/a/b"),
            ("/a/../b", "/b"),
            ("..", ""),
            ("/..", "/"),
            ("/a/b/c/../../d", "/a/d"),
        ];

        for (input, expected) in cases {
            assert_eq!(
                normalize_path(Path::new(input)),
                PathBuf::from(expected),
                "Failed for input: {}",
                input
            );
        }
    }

    #[test]
    fn test_root_marker_is_the_root_itself() {
        let resolved = root().resolve("/").unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/storage"));
        assert_ne!(resolved.to_string_lossy(), "/srv/storage/");
        assert_eq!(root().resolve("").unwrap(), PathBuf::from("/srv/storage"));
    }

    #[test]
    fn test_resolve_relative_paths() {
        let root = root();
        assert_eq!(
            root.resolve("/photos/2024").unwrap(),
            PathBuf::from("/srv/storage/photos/2024")
        );
        assert_eq!(
            root.resolve("photos//./a.png").unwrap(),
            PathBuf::from("/srv/storage/photos/a.png")
        );
        assert_eq!(
            root.resolve("photos/../docs").unwrap(),
            PathBuf::from("/srv/storage/docs")
        );
    }

    #[test]
    fn test_traversal_is_rejected() {
        let root = root();
        assert!(matches!(root.resolve("../etc/passwd"), Err(AppError::Resolution(_))));
        assert!(matches!(root.resolve("/a/../../etc"), Err(AppError::Resolution(_))));
        assert!(matches!(root.resolve("/../storage-other"), Err(AppError::Resolution(_))));
    }

    #[test]
    fn test_resolve_child() {
        let root = root();
        assert_eq!(
            root.resolve_child("/", "a.txt").unwrap(),
            PathBuf::from("/srv/storage/a.txt")
        );
        assert_eq!(
            root.resolve_child("/docs", "a.txt").unwrap(),
            PathBuf::from("/srv/storage/docs/a.txt")
        );
        assert!(matches!(
            root.resolve_child("/docs", "../../x"),
            Err(AppError::Resolution(_))
        ));
    }

    #[test]
    fn test_resolve_item_requires_a_single_entry_name() {
        let root = root();
        assert_eq!(
            root.resolve_item("/docs", "a.txt").unwrap(),
            PathBuf::from("/srv/storage/docs/a.txt")
        );
        for name in ["", ".", "..", "x/..", "./a.txt", "sub/a.txt", "/a.txt"] {
            assert!(
                matches!(root.resolve_item("/docs", name), Err(AppError::BadRequest(_))),
                "accepted item name {:?}",
                name
            );
        }
    }

    #[tokio::test]
    async fn test_open_creates_and_canonicalizes() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested").join("store");
        let root = StorageRoot::open(&target).await.unwrap();
        assert!(root.path().is_absolute());
        assert!(root.path().is_dir());
        assert!(root.path().ends_with("nested/store"));
    }

    #[tokio::test]
    async fn test_open_rejects_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        let err = StorageRoot::open(&file).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
