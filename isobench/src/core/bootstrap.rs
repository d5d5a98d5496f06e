//! Bootstrap path resolution.

use std::path::{Path, PathBuf};

/// Resolve the configured bootstrap file against the config file's directory.
///
/// - absent or empty: `None`, the script includes nothing
/// - rooted path: returned unchanged
/// - relative path: joined onto the directory holding `config_path`
pub fn resolve_bootstrap(bootstrap: Option<&str>, config_path: &Path) -> Option<PathBuf> {
    let bootstrap = bootstrap.filter(|value| !value.is_empty())?;
    Some(resolve_against_config(Path::new(bootstrap), config_path))
}

/// Join a relative `path` onto the directory that contains `config_path`.
pub fn resolve_against_config(path: &Path, config_path: &Path) -> PathBuf {
    if path.has_root() {
        return path.to_path_buf();
    }
    config_dir(config_path).join(path)
}

fn config_dir(config_path: &Path) -> &Path {
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_bootstrap_resolves_against_config_dir() {
        let resolved = resolve_bootstrap(
            Some("vendor/autoload.php"),
            Path::new("/project/phpbench.json"),
        );
        assert_eq!(resolved, Some(PathBuf::from("/project/vendor/autoload.php")));
    }

    #[test]
    fn absolute_bootstrap_is_unchanged() {
        let resolved = resolve_bootstrap(Some("/abs/autoload.php"), Path::new("/project/phpbench.json"));
        assert_eq!(resolved, Some(PathBuf::from("/abs/autoload.php")));
    }

    #[test]
    fn missing_bootstrap_is_omitted() {
        assert_eq!(resolve_bootstrap(None, Path::new("/project/phpbench.json")), None);
        assert_eq!(resolve_bootstrap(Some(""), Path::new("/project/phpbench.json")), None);
    }

    #[test]
    fn bare_config_file_name_resolves_against_current_dir() {
        let resolved = resolve_bootstrap(Some("vendor/autoload.php"), Path::new("phpbench.json"));
        assert_eq!(resolved, Some(PathBuf::from("./vendor/autoload.php")));
    }
}
