use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_STORAGE_PATH: &str = "./storage";
const DEFAULT_STATIC_PREFIX: &str = "/images";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BATCH_CONCURRENCY: usize = 16;
const DEFAULT_MAX_UPLOAD_SIZE: usize = 104857600;

/// Mount point of the JSON API. The static prefix must stay clear of it.
pub const API_PREFIX: &str = "/filemanager";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory every file operation is confined to
    pub storage_path: PathBuf,

    /// URL prefix the storage tree is served under as static files
    pub static_prefix: String,

    pub host: String,
    pub port: u16,

    /// Upper bound on in-flight filesystem calls within one batch request
    pub batch_concurrency: usize,

    /// Body limit for the upload route, in bytes
    pub max_upload_size: usize,
}

/// On-disk JSON config. Keys follow the format existing deployments already use.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileConfig {
    storage_path: Option<PathBuf>,
    #[serde(alias = "exposedImageFolderName")]
    static_prefix: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    batch_concurrency: Option<usize>,
    max_upload_size: Option<usize>,
}

impl FileConfig {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            static_prefix: DEFAULT_STATIC_PREFIX.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_sources(|key| std::env::var(key).ok(), &args)
    }

    /// Layers defaults, the optional JSON file, environment and `--key=value`
    /// arguments, in that order of precedence.
    pub fn from_sources<E>(env: E, args: &[String]) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let arg = |name: &str| {
            let prefix = format!("--{}=", name);
            args.iter()
                .rev()
                .find_map(|a| a.strip_prefix(prefix.as_str()).map(str::to_string))
        };
        let lookup = |name: &str, key: &str| arg(name).or_else(|| env(key));

        let mut config = Config::default();

        if let Some(path) = lookup("config", "FILEMANAGER_CONFIG") {
            let file = FileConfig::read(Path::new(&path))?;
            if let Some(v) = file.storage_path {
                config.storage_path = v;
            }
            if let Some(v) = file.static_prefix {
                config.static_prefix = v;
            }
            if let Some(v) = file.host {
                config.host = v;
            }
            if let Some(v) = file.port {
                config.port = v;
            }
            if let Some(v) = file.batch_concurrency {
                config.batch_concurrency = v;
            }
            if let Some(v) = file.max_upload_size {
                config.max_upload_size = v;
            }
        }

        if let Some(v) = lookup("storage-path", "STORAGE_PATH") {
            config.storage_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("static-prefix", "STATIC_PREFIX") {
            config.static_prefix = v;
        }
        if let Some(v) = lookup("host", "HOST") {
            config.host = v;
        }
        if let Some(v) = lookup("port", "PORT") {
            config.port = parse_value("port", v)?;
        }
        if let Some(v) = lookup("batch-concurrency", "BATCH_CONCURRENCY") {
            config.batch_concurrency = parse_value("batch concurrency", v)?;
        }
        if let Some(v) = lookup("max-upload-size", "MAX_UPLOAD_SIZE") {
            config.max_upload_size = parse_value("max upload size", v)?;
        }

        config.static_prefix = normalize_prefix(&config.static_prefix);
        if overlaps_api(&config.static_prefix) {
            return Err(ConfigError::InvalidValue {
                key: "static prefix",
                value: config.static_prefix,
            });
        }
        config.batch_concurrency = config.batch_concurrency.max(1);

        Ok(config)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn overlaps_api(prefix: &str) -> bool {
    prefix == API_PREFIX
        || prefix
            .strip_prefix(API_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(env_of(&[]), &[]).unwrap();
        assert_eq!(config.storage_path, PathBuf::from("./storage"));
        assert_eq!(config.static_prefix, "/images");
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
        assert_eq!(config.batch_concurrency, 16);
    }

    #[test]
    fn test_precedence_file_env_args() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.json");
        std::fs::write(
            &file,
            r#"{
                "storagePath": "/srv/files",
                "exposedImageFolderName": "/static",
                "host": "127.0.0.1",
                "port": 8080
            }"#,
        )
        .unwrap();

        let config_arg = format!("--config={}", file.display());
        let config = Config::from_sources(
            env_of(&[("PORT", "9000"), ("HOST", "10.0.0.1")]),
            &[config_arg.clone()],
        )
        .unwrap();
        assert_eq!(config.storage_path, PathBuf::from("/srv/files"));
        assert_eq!(config.static_prefix, "/static");
        assert_eq!(config.host, "10.0.0.1");
        assert_eq!(config.port, 9000);

        let config = Config::from_sources(
            env_of(&[("PORT", "9000")]),
            &[config_arg, "--port=9100".to_string()],
        )
        .unwrap();
        assert_eq!(config.port, 9100);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Config::from_sources(env_of(&[("PORT", "not-a-port")]), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "port", .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let err = Config::from_sources(
            env_of(&[("FILEMANAGER_CONFIG", "/definitely/not/here.json")]),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_static_prefix_cannot_shadow_the_api() {
        for prefix in ["/filemanager", "filemanager/", "/filemanager/photos"] {
            let err = Config::from_sources(env_of(&[("STATIC_PREFIX", prefix)]), &[]).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { key: "static prefix", .. }),
                "accepted prefix {}",
                prefix
            );
        }

        let config =
            Config::from_sources(env_of(&[("STATIC_PREFIX", "/filemanager-files")]), &[]).unwrap();
        assert_eq!(config.static_prefix, "/filemanager-files");
    }

    #[test]
    fn test_prefix_normalization_and_concurrency_floor() {
        let config = Config::from_sources(
            env_of(&[("STATIC_PREFIX", "files/"), ("BATCH_CONCURRENCY", "0")]),
            &[],
        )
        .unwrap();
        assert_eq!(config.static_prefix, "/files");
        assert_eq!(config.batch_concurrency, 1);
    }
}
