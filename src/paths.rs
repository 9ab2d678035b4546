/// Platform-specific default locations and per-repository layout resolution
///
/// Default directories follow the XDG Base Directory specification on
/// Unix-like systems. [`RepoLayout`] maps a repository target onto the
/// `repo/`, `issues/` and `vector_store/` layout under the data directory.
use crate::config::Config;
use crate::error::ValidationError;
use crate::types::RepoTarget;
use std::path::{Path, PathBuf};

const PROJECT_DIR_NAME: &str = "repo-index";

/// Source tree directory under a repository root
pub const SOURCE_DIR: &str = "repo";
/// Issue documents directory under a repository root
pub const ISSUES_DIR: &str = "issues";

/// Platform-agnostic path utilities
pub struct PlatformPaths;

impl PlatformPaths {
    /// Get the appropriate data directory for the current platform
    ///
    /// - Windows: %LOCALAPPDATA%
    /// - macOS: ~/Library/Application Support
    /// - Linux/Unix: $XDG_DATA_HOME or ~/.local/share
    pub fn data_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            std::env::var("LOCALAPPDATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        } else if cfg!(target_os = "macos") {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join("Library/Application Support"))
                .unwrap_or_else(|_| PathBuf::from("."))
        } else {
            std::env::var("XDG_DATA_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    std::env::var("HOME").map(|home| PathBuf::from(home).join(".local/share"))
                })
                .unwrap_or_else(|_| PathBuf::from("."))
        }
    }

    /// Get the appropriate cache directory for the current platform
    ///
    /// - Windows: %LOCALAPPDATA%
    /// - macOS: ~/Library/Caches
    /// - Linux/Unix: $XDG_CACHE_HOME or ~/.cache
    pub fn cache_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            std::env::var("LOCALAPPDATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        } else if cfg!(target_os = "macos") {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join("Library/Caches"))
                .unwrap_or_else(|_| PathBuf::from("."))
        } else {
            std::env::var("XDG_CACHE_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".cache")))
                .unwrap_or_else(|_| PathBuf::from("."))
        }
    }

    /// Get the appropriate config directory for the current platform
    ///
    /// - Windows: %APPDATA%
    /// - macOS: ~/Library/Application Support
    /// - Linux/Unix: $XDG_CONFIG_HOME or ~/.config
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            std::env::var("APPDATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        } else if cfg!(target_os = "macos") {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join("Library/Application Support"))
                .unwrap_or_else(|_| PathBuf::from("."))
        } else {
            std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
                .unwrap_or_else(|_| PathBuf::from("."))
        }
    }

    /// Returns: {data_dir}/repo-index
    pub fn project_data_dir() -> PathBuf {
        Self::data_dir().join(PROJECT_DIR_NAME)
    }

    /// Returns: {cache_dir}/repo-index
    pub fn project_cache_dir() -> PathBuf {
        Self::cache_dir().join(PROJECT_DIR_NAME)
    }

    /// Returns: {config_dir}/repo-index
    pub fn project_config_dir() -> PathBuf {
        Self::config_dir().join(PROJECT_DIR_NAME)
    }

    /// Directory where downloaded embedding models are cached
    ///
    /// Returns: {cache_dir}/repo-index/models
    pub fn default_model_cache_dir() -> PathBuf {
        Self::project_cache_dir().join("models")
    }

    /// Returns: {config_dir}/repo-index/config.toml
    pub fn default_config_path() -> PathBuf {
        Self::project_config_dir().join("config.toml")
    }
}

/// Filesystem view of one repository target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
    /// `<data_path>/data/<target>`
    pub root: PathBuf,
    /// Source tree to index (`<root>/repo`)
    pub source_dir: PathBuf,
    /// Issue documents (`<root>/issues`)
    pub issues_dir: PathBuf,
    /// Dataset path, URI or directory holding the vector store
    pub store_location: String,
}

impl RepoLayout {
    /// Resolve a target against the configured base data directory
    ///
    /// Fails when the resulting root does not exist or is not a directory.
    pub fn resolve(config: &Config, target: &RepoTarget) -> Result<Self, ValidationError> {
        let segment = target.as_path_segment();
        let root = config.data_path.join("data").join(&segment);

        if !root.exists() {
            return Err(ValidationError::RepositoryNotFound(
                root.display().to_string(),
            ));
        }
        if !root.is_dir() {
            return Err(ValidationError::NotADirectory(root.display().to_string()));
        }

        Ok(Self::for_root(config, root, &segment))
    }

    /// Build the layout for an already-resolved root without touching the filesystem
    pub fn for_root(config: &Config, root: PathBuf, segment: &str) -> Self {
        let store_location = match &config.vector_db.lancedb_uri {
            Some(base) if config.vector_db.backend == crate::config::StoreBackend::LanceDb => {
                format!("{}/{}", base.trim_end_matches('/'), store_segment(segment))
            }
            _ => root
                .join(&config.vector_db.store_dir)
                .to_string_lossy()
                .to_string(),
        };

        Self {
            source_dir: root.join(SOURCE_DIR),
            issues_dir: root.join(ISSUES_DIR),
            store_location,
            root,
        }
    }

    /// Path of `path` relative to the repository root, `/`-separated
    pub fn relative_name(&self, path: &Path) -> String {
        relative_name(&self.root, path)
    }
}

/// Path of `path` relative to `base`, `/`-separated
pub fn relative_name(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether `name` is exactly one ordinary path segment
///
/// Rejects empty names, `.`, `..`, absolute paths and anything containing a
/// separator, so joining it onto a directory always stays inside it.
pub fn is_single_segment(name: &str) -> bool {
    if name.trim().is_empty() || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    )
}

// Remote dataset names use the last path segment so absolute targets stay addressable
fn store_segment(segment: &str) -> String {
    Path::new(segment)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use tempfile::TempDir;

    fn config_with_data_path(path: &Path) -> Config {
        let mut config = Config::default();
        config.data_path = path.to_path_buf();
        config
    }

    #[test]
    fn test_data_dir_not_empty() {
        assert!(!PlatformPaths::data_dir().as_os_str().is_empty());
        assert!(!PlatformPaths::cache_dir().as_os_str().is_empty());
        assert!(!PlatformPaths::config_dir().as_os_str().is_empty());
    }

    #[test]
    fn test_project_paths_contain_project_name() {
        for path in [
            PlatformPaths::project_data_dir(),
            PlatformPaths::project_cache_dir(),
            PlatformPaths::project_config_dir(),
        ] {
            assert!(path.to_string_lossy().contains("repo-index"));
        }
    }

    #[test]
    fn test_specific_file_paths() {
        assert!(PlatformPaths::default_config_path().ends_with("config.toml"));
        assert!(PlatformPaths::default_model_cache_dir().ends_with("models"));
    }

    #[test]
    fn test_resolve_by_name() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("data").join("my-repo");
        std::fs::create_dir_all(&root).unwrap();

        let config = config_with_data_path(temp_dir.path());
        let layout =
            RepoLayout::resolve(&config, &RepoTarget::Name("my-repo".to_string())).unwrap();

        assert_eq!(layout.root, root);
        assert_eq!(layout.source_dir, root.join("repo"));
        assert_eq!(layout.issues_dir, root.join("issues"));
        assert_eq!(
            layout.store_location,
            root.join("vector_store").to_string_lossy()
        );
    }

    #[test]
    fn test_resolve_by_id() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("data").join("17");
        std::fs::create_dir_all(&root).unwrap();

        let config = config_with_data_path(temp_dir.path());
        let layout = RepoLayout::resolve(&config, &RepoTarget::Id(17)).unwrap();
        assert_eq!(layout.root, root);
    }

    #[test]
    fn test_resolve_absolute_name_uses_path_as_is() {
        let temp_dir = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();

        let config = config_with_data_path(temp_dir.path());
        let target = RepoTarget::Name(elsewhere.path().to_string_lossy().to_string());
        let layout = RepoLayout::resolve(&config, &target).unwrap();
        assert_eq!(layout.root, elsewhere.path());
    }

    #[test]
    fn test_resolve_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_with_data_path(temp_dir.path());
        let result = RepoLayout::resolve(&config, &RepoTarget::Name("missing".to_string()));
        assert!(matches!(result, Err(ValidationError::RepositoryNotFound(_))));
    }

    #[test]
    fn test_resolve_root_is_file() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join("file-repo"), "not a dir").unwrap();

        let config = config_with_data_path(temp_dir.path());
        let result = RepoLayout::resolve(&config, &RepoTarget::Name("file-repo".to_string()));
        assert!(matches!(result, Err(ValidationError::NotADirectory(_))));
    }

    #[test]
    fn test_is_single_segment() {
        assert!(is_single_segment("vector_store"));
        assert!(is_single_segment("12.md"));
        assert!(is_single_segment(".index"));

        assert!(!is_single_segment(""));
        assert!(!is_single_segment("  "));
        assert!(!is_single_segment("."));
        assert!(!is_single_segment(".."));
        assert!(!is_single_segment("../other"));
        assert!(!is_single_segment("a/b"));
        assert!(!is_single_segment("repo/"));
        assert!(!is_single_segment("repo/."));
        assert!(!is_single_segment("/etc/passwd"));
    }

    #[test]
    fn test_remote_lancedb_uri_location() {
        let mut config = Config::default();
        config.vector_db.backend = StoreBackend::LanceDb;
        config.vector_db.lancedb_uri = Some("s3://bucket/indexes/".to_string());

        let layout = RepoLayout::for_root(&config, PathBuf::from("/data/data/5"), "5");
        assert_eq!(layout.store_location, "s3://bucket/indexes/5");
    }

    #[test]
    fn test_lancedb_uri_ignored_for_local_backend() {
        let mut config = Config::default();
        config.vector_db.backend = StoreBackend::Local;
        config.vector_db.lancedb_uri = Some("s3://bucket/indexes".to_string());

        let layout = RepoLayout::for_root(&config, PathBuf::from("/data/data/5"), "5");
        assert_eq!(layout.store_location, "/data/data/5/vector_store");
    }

    #[test]
    fn test_relative_name_uses_forward_slashes() {
        let base = Path::new("/data/repo");
        let path = base.join("repo").join("src").join("main.rs");
        assert_eq!(relative_name(base, &path), "repo/src/main.rs");
    }
}
