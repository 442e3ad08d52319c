use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::PathBuf,
    time::Duration,
};

use directories::BaseDirs;

use crate::language::Language;

pub const DEFAULT_PISTON_API_URL: &str = "https://emkc.org/api/v2/piston/execute";

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let mut cfg = Self::from_path(default_config_path());

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                cfg.inner.insert(k, v);
            }
        }

        cfg
    }

    /// Defaults overlaid with the rc file at `config_path`, ignoring the environment.
    pub fn from_path(config_path: PathBuf) -> Self {
        let mut map = default_map();

        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        Self { inner: map, config_path }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from)
    }

    pub fn endpoint(&self) -> String {
        self.get("PISTON_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PISTON_API_URL.to_string())
    }

    /// Client-side request timeout. Unset or zero means wait indefinitely.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.get_u64("REQUEST_TIMEOUT")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn default_language(&self) -> anyhow::Result<Language> {
        match self.get("DEFAULT_LANGUAGE") {
            Some(v) if !v.trim().is_empty() => v.parse(),
            _ => Ok(Language::default()),
        }
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_secs(self.get_u64("NOTIFICATION_SECONDS").unwrap_or(3))
    }

    pub fn log_file(&self) -> PathBuf {
        self.get_path("LOG_FILE")
            .unwrap_or_else(|| env::temp_dir().join("coderun").join("coderun.log"))
    }
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "PISTON_API_URL",
        "REQUEST_TIMEOUT",
        "DEFAULT_LANGUAGE",
        "NOTIFICATION_SECONDS",
        "LOG_FILE",
    ];

    KEYS.contains(&k) || k.starts_with("CODERUN_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("coderun").join(".coderunrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("PISTON_API_URL".into(), DEFAULT_PISTON_API_URL.into());
    m.insert("DEFAULT_LANGUAGE".into(), "javascript".into());
    m.insert("NOTIFICATION_SECONDS".into(), "3".into());
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_rc_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::from_path(dir.path().join(".coderunrc"));
        assert_eq!(cfg.endpoint(), DEFAULT_PISTON_API_URL);
        assert_eq!(cfg.request_timeout(), None);
        assert_eq!(cfg.default_language().unwrap(), Language::JavaScript);
        assert_eq!(cfg.notification_duration(), Duration::from_secs(3));
        assert!(cfg.log_file().ends_with("coderun.log"));
    }

    #[test]
    fn rc_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".coderunrc");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "# local piston").unwrap();
        writeln!(f, "PISTON_API_URL = http://localhost:2000/api/v2/execute").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "REQUEST_TIMEOUT=15").unwrap();
        writeln!(f, "DEFAULT_LANGUAGE=python").unwrap();
        writeln!(f, "not a pair").unwrap();
        drop(f);

        let cfg = Config::from_path(path);
        assert_eq!(cfg.endpoint(), "http://localhost:2000/api/v2/execute");
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(cfg.default_language().unwrap(), Language::Python);
    }

    #[test]
    fn zero_timeout_means_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::from_path(dir.path().join("missing"));
        cfg.set("REQUEST_TIMEOUT", "0");
        assert_eq!(cfg.request_timeout(), None);
        cfg.set("REQUEST_TIMEOUT", "abc");
        assert_eq!(cfg.request_timeout(), None);
    }

    #[test]
    fn bad_default_language_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::from_path(dir.path().join("missing"));
        cfg.set("DEFAULT_LANGUAGE", "cobol");
        assert!(cfg.default_language().is_err());
    }

    #[test]
    fn known_keys() {
        assert!(is_config_key("PISTON_API_URL"));
        assert!(is_config_key("CODERUN_ANYTHING"));
        assert!(!is_config_key("HOME"));
    }
}
