use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, fs, io};

use serde::Deserialize;

use crate::category::{CategoryEntry, CategoryTable};
use crate::source::endpoint::Endpoint;

pub const CFG_FILE_NAME: &str = "outlier-content.toml";

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Defaults {
    pub page_size: u32,
}

#[derive(Deserialize, Default)]
pub struct Store {
    /// Without a data file the content lives in memory only.
    pub data_file: Option<PathBuf>,
}

fn default_per_page() -> u32 { 100 }
fn default_max_pages() -> u32 { 1 }
fn default_excerpt_length() -> usize { 300 }
fn default_timeout_secs() -> u64 { 30 }

#[derive(Deserialize)]
pub struct Source {
    pub site: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub posts_endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub categories_endpoints: Vec<Endpoint>,
    pub fallback_categories: Option<Vec<CategoryEntry>>,
}

impl Source {
    pub fn fallback_table(&self) -> CategoryTable {
        match self.fallback_categories {
            None => CategoryTable::builtin(),
            Some(ref entries) => CategoryTable::from_entries(entries.clone()),
        }
    }
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub server: Server,
    pub defaults: Defaults,
    #[serde(default)]
    pub store: Store,
    pub source: Source,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if path.starts_with("${exe_dir}") {
        let cur_exe = env::current_exe()?;
        let exe_dir = cur_exe.parent().unwrap_or(cur_exe.as_path());
        let str_path = path.to_string_lossy().replace("${exe_dir}", &exe_dir.to_string_lossy());
        Ok(PathBuf::from(str_path))
    } else {
        Ok(path)
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    if let Some(data_file) = cfg.store.data_file.take() {
        cfg.store.data_file = Some(parse_path(data_file)?);
    }
    if let Some(ref mut log) = cfg.log {
        if let Some(location) = log.location.take() {
            log.location = Some(parse_path(location)?);
        }
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}

/// Looks next to the executable, then in the current dir, then in the user config dir.
pub fn find_config_path() -> Option<PathBuf> {
    let mut candidates = vec![];
    if let Some(exe_dir) = env::current_exe().ok().and_then(|p| p.parent().map(|d| d.to_path_buf())) {
        candidates.push(exe_dir.join(CFG_FILE_NAME));
    }
    if let Ok(cur_dir) = env::current_dir() {
        candidates.push(cur_dir.join(CFG_FILE_NAME));
    }
    if let Some(cfg_dir) = dirs::config_dir() {
        candidates.push(cfg_dir.join(CFG_FILE_NAME));
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Explicit path if given, otherwise the first one [`find_config_path`] finds.
/// Fills in the default log location when logging is enabled.
pub fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let config_path = match cfg_path.or_else(find_config_path) {
        None => return Err("Could not find outlier-content configuration".to_string()),
        Some(x) => x,
    };

    println!("Reading config from {}", config_path.display());
    let mut config = match read_config(&config_path) {
        Ok(config) => config,
        Err(e) => return Err(e.to_string()),
    };

    if let Some(mut log) = config.log {
        let location = log.location.or_else(|| {
            dirs::cache_dir().map(|dir| dir.join("OutlierContent").join("log").join("server.log"))
        });
        match location {
            Some(ref location) => println!("Log enabled. Files will be written in {}", location.display()),
            None => return Err("Log enabled but no log location could be determined".to_string()),
        }
        log.location = location;
        config.log = Some(log);
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use crate::source::payload::PayloadShape;

    use super::*;

    const MINIMAL: &str = r#"
[server]
address = "0.0.0.0"
port = 8001

[defaults]
page_size = 10

[source]
site = "https://investedatadiaries.wordpress.com"
"#;

    #[test]
    fn test_minimal_config_defaults() -> io::Result<()> {
        let cfg = parse_config(MINIMAL)?;
        assert_eq!(cfg.server.port, 8001);
        assert!(cfg.store.data_file.is_none());
        assert!(cfg.log.is_none());
        assert_eq!(cfg.source.per_page, 100);
        assert_eq!(cfg.source.max_pages, 1);
        assert_eq!(cfg.source.excerpt_length, 300);
        assert_eq!(cfg.source.timeout_secs, 30);
        assert!(cfg.source.posts_endpoints.is_empty());
        assert_eq!(cfg.source.fallback_table(), CategoryTable::builtin());
        Ok(())
    }

    #[test]
    fn test_full_config() -> io::Result<()> {
        let toml_str = r#"
[server]
address = "127.0.0.1"
port = 9000

[defaults]
page_size = 5

[store]
data_file = "/var/lib/outlier/content.json"

[source]
site = "https://blog.example.com"
max_pages = 3
excerpt_length = 200

[[source.posts_endpoints]]
url = "https://blog.example.com/wp-json/wp/v2/posts?per_page=50"

[[source.posts_endpoints]]
url = "https://cache.example.com/posts.json"
shape = "keyed"

[[source.fallback_categories]]
id = 7
name = "Fintech"

[log]
level = "Debug"
log_to_console = true
location = "/tmp/outlier.log"
"#;
        let cfg = parse_config(toml_str)?;
        assert_eq!(cfg.store.data_file, Some(PathBuf::from("/var/lib/outlier/content.json")));
        assert_eq!(cfg.source.posts_endpoints.len(), 2);
        assert_eq!(cfg.source.posts_endpoints[0].shape, PayloadShape::Array);
        assert_eq!(cfg.source.posts_endpoints[1].shape, PayloadShape::Keyed);
        assert_eq!(cfg.source.fallback_table().get(7), Some("Fintech"));
        assert_eq!(cfg.source.fallback_table().get(1), None);
        assert!(cfg.log.is_some());
        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        let err = parse_config("[server]\nport = \"x\"").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_exe_dir_expansion() -> io::Result<()> {
        let cfg = parse_config(&format!("{}\n[store]\ndata_file = \"${{exe_dir}}/content.json\"\n", MINIMAL))?;
        let data_file = cfg.store.data_file.unwrap();
        assert!(!data_file.to_string_lossy().contains("${exe_dir}"));
        assert!(data_file.ends_with("content.json"));
        Ok(())
    }
}
