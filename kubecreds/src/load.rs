use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{Error, KubeConfig, Result};

pub const DEFAULT_CONFIG_PATH: &str = "~/.kube/config";

/// The on-disk kubeconfig together with the exact bytes it was parsed from.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub path: PathBuf,
    pub raw: Vec<u8>,
    pub config: KubeConfig,
}

impl Loaded {
    pub fn read(path: impl AsRef<Path>) -> Result<Loaded> {
        let path = path.as_ref().to_path_buf();
        let raw = fs::read(&path).map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = raw.len(), "read kubeconfig");

        let config = KubeConfig::from_slice(&raw).map_err(|source| Error::Parse {
            what: "kubeconfig",
            source,
        })?;
        Ok(Loaded { path, raw, config })
    }
}

/// Parses a document, labelling errors with `what` ("kubeconfig",
/// "pasted kubeconfig", ...).
pub fn parse(text: &str, what: &'static str) -> Result<KubeConfig> {
    KubeConfig::from_yaml(text).map_err(|source| Error::Parse { what, source })
}

/// Expands a leading `~` against the user's home directory.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some(rest) => rest,
        None => return Ok(PathBuf::from(path)),
    };
    let home = home::home_dir().ok_or(Error::HomeDir)?;
    Ok(home.join(rest.trim_start_matches(['/', '\\'])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(
            expand_tilde("/etc/kube/config").unwrap(),
            PathBuf::from("/etc/kube/config")
        );
        assert_eq!(expand_tilde("kube/config").unwrap(), PathBuf::from("kube/config"));
    }

    #[test]
    fn tilde_joins_home() {
        let home = home::home_dir().unwrap();
        assert_eq!(expand_tilde("~/.kube/config").unwrap(), home.join(".kube/config"));
        assert_eq!(expand_tilde("~").unwrap(), home);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Loaded::read(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }), "{err:?}");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"clusters: [unterminated").unwrap();
        let err = Loaded::read(file.path()).unwrap_err();
        assert!(matches!(err, Error::Parse { what: "kubeconfig", .. }), "{err:?}");
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"apiVersion: v1\nkind: Config\ncurrent-context: \"a\xffb\"\n")
            .unwrap();
        let err = Loaded::read(file.path()).unwrap_err();
        assert!(matches!(err, Error::Parse { what: "kubeconfig", .. }), "{err:?}");
    }

    #[test]
    fn keeps_raw_bytes() {
        let text = "# hand written\napiVersion: v1\nkind: Config\ncurrent-context: a\n";
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        let loaded = Loaded::read(file.path()).unwrap();
        assert_eq!(loaded.raw, text.as_bytes());
        assert_eq!(loaded.config.current_context, "a");
    }
}
