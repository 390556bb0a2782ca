use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub database: Database,
    pub http: HttpConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.to_string_lossy()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

/// Where the catalog and saved drafts live
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Database {
    pub in_memory: bool,
    pub path: Option<PathBuf>,
}

impl Database {
    pub fn in_memory() -> Self {
        Self {
            in_memory: true,
            path: None,
        }
    }

    pub fn on_disk<P: AsRef<Path>>(path: P) -> Self {
        Self {
            in_memory: false,
            path: Some(path.as_ref().to_path_buf()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PublishConfig {
    /// how many files are read and encoded at the same time while publishing,
    /// each file on disk on its own reader thread
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    4
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_config_toml() -> anyhow::Result<()> {
        let toml_str = r#"
version = 1

[database]
in_memory = true

[http]
bind_addr = "127.0.0.1"
port = 8080

[publish]
concurrency = 8
"#;

        let cfg: Config = toml::from_str(toml_str)?;

        assert_eq!(cfg.version, 1);
        assert!(cfg.database.in_memory);
        assert_eq!(cfg.http.port, 8080);
        assert_eq!(cfg.publish.concurrency, 8);

        Ok(())
    }

    #[test]
    fn test_parse_file_database_config() -> anyhow::Result<()> {
        let toml_str = r#"
version = 1

[database]
in_memory = false
path = "/tmp/releasedeck.db"

[http]
bind_addr = "127.0.0.1"
port = 8080
"#;

        let cfg: Config = toml::from_str(toml_str)?;

        assert!(!cfg.database.in_memory);
        assert_eq!(cfg.database.path, Some(PathBuf::from("/tmp/releasedeck.db")));
        // publish section is optional
        assert_eq!(cfg.publish.concurrency, 4);

        Ok(())
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = Config::load(Path::new("/no/such/releasedeck.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_load_from_disk() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("releasedeck.toml");
        std::fs::write(
            &path,
            "version = 1\n[database]\nin_memory = true\n[http]\nbind_addr = \"0.0.0.0\"\nport = 9000\n",
        )?;

        let cfg = Config::load(&path)?;

        assert_eq!(cfg.http.bind_addr, "0.0.0.0");
        Ok(())
    }
}
