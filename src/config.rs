use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::storage::MEMORY_DATABASE;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "terminal.db";
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Optional settings as found in `terminal.toml` or on the command line
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TerminalConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Database file, or `:memory:`
    pub database: Option<String>,
    pub static_dir: Option<String>,
}

impl TerminalConfig {
    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: TerminalConfig) -> TerminalConfig {
        TerminalConfig {
            host: overrides.host.or(self.host),
            port: overrides.port.or(self.port),
            database: overrides.database.or(self.database),
            static_dir: overrides.static_dir.or(self.static_dir),
        }
    }

    /// Fill unset fields with defaults
    pub fn resolve(self) -> anyhow::Result<Settings> {
        let host = self.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host: IpAddr = host
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid host '{}': {}", host, e))?;

        Ok(Settings {
            addr: SocketAddr::new(host, self.port.unwrap_or(DEFAULT_PORT)),
            database: PathBuf::from(self.database.unwrap_or_else(|| DEFAULT_DATABASE.to_string())),
            static_dir: PathBuf::from(self.static_dir.unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())),
        })
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub addr: SocketAddr,
    pub database: PathBuf,
    pub static_dir: PathBuf,
}

impl From<&Settings> for TerminalConfig {
    fn from(settings: &Settings) -> Self {
        TerminalConfig {
            host: Some(settings.addr.ip().to_string()),
            port: Some(settings.addr.port()),
            database: Some(settings.database.display().to_string()),
            static_dir: Some(settings.static_dir.display().to_string()),
        }
    }
}

impl Settings {
    pub fn is_in_memory(&self) -> bool {
        self.database.as_os_str() == MEMORY_DATABASE
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("terminal.toml")
}

/// Read the config file.
///
/// Without an explicit path a missing `terminal.toml` just means defaults;
/// a path given on the command line has to exist.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<TerminalConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path();
            if !path.exists() {
                return Ok(TerminalConfig::default());
            }
            path
        }
    };

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("invalid config {}", path.display()))
}

/// Save resolved settings so the next start needs no flags.
pub fn write_config(path: &Path, settings: &Settings, force: bool) -> anyhow::Result<()> {
    let body = toml::to_string_pretty(&TerminalConfig::from(settings))?;
    let contents = format!("# terminal status dashboard\n{}", body);

    let mut options = std::fs::OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut file = options.open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::AlreadyExists => {
            anyhow::anyhow!("config already exists at {} (use --force to overwrite)", path.display())
        }
        _ => anyhow::Error::new(e).context(format!("failed to write config {}", path.display())),
    })?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if db_path.as_os_str() == MEMORY_DATABASE {
        return Ok(());
    }
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = TerminalConfig::default().resolve().unwrap();
        assert_eq!(settings.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(settings.database, PathBuf::from("terminal.db"));
        assert_eq!(settings.static_dir, PathBuf::from("static"));
        assert!(!settings.is_in_memory());
    }

    #[test]
    fn test_overrides_win() {
        let file = TerminalConfig {
            host: Some("127.0.0.1".to_string()),
            port: Some(9000),
            database: Some("file.db".to_string()),
            static_dir: None,
        };
        let cli = TerminalConfig {
            port: Some(9100),
            database: Some(":memory:".to_string()),
            ..Default::default()
        };

        let settings = file.merge(cli).resolve().unwrap();
        assert_eq!(settings.addr, "127.0.0.1:9100".parse().unwrap());
        assert!(settings.is_in_memory());
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let config = TerminalConfig {
            host: Some("not a host".to_string()),
            ..Default::default()
        };
        assert!(config.resolve().is_err());
    }

    #[test]
    fn test_written_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terminal.toml");
        let settings = TerminalConfig {
            port: Some(8181),
            database: Some("data/terminal.db".to_string()),
            ..Default::default()
        }
        .resolve()
        .unwrap();

        write_config(&path, &settings, false).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(loaded.static_dir.as_deref(), Some("static"));
        assert_eq!(loaded.resolve().unwrap(), settings);
    }

    #[test]
    fn test_write_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terminal.toml");
        let first = TerminalConfig::default().resolve().unwrap();
        let second = TerminalConfig { port: Some(9090), ..Default::default() }.resolve().unwrap();

        write_config(&path, &first, false).unwrap();
        let err = write_config(&path, &second, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(load_config(Some(&path)).unwrap().port, Some(DEFAULT_PORT));

        write_config(&path, &second, true).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().port, Some(9090));
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("absent.toml"));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terminal.toml");
        std::fs::write(&path, "port = \"not a number\"\n").unwrap();

        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("terminal.db");

        ensure_db_dir(&db_path).unwrap();

        assert!(dir.path().join("nested").is_dir());
        ensure_db_dir(Path::new(MEMORY_DATABASE)).unwrap();
    }
}
