//! Layered settings
//!
//! Later layers win:
//! 1. Built-in defaults under the platform cache and config directories
//! 2. `config.yaml` in the flakepin config directory (or `FLAKEPIN_CONFIG`)
//! 3. `FLAKEPIN_CACHE_DIR`, `FLAKEPIN_REGISTRY`, `FLAKEPIN_GLOBAL_REGISTRY`, `FLAKEPIN_JOBS`
//! 4. Command line flags

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::fs::read_optional;
use crate::error::Result;
use crate::error::config::{invalid, parse_failed};
use crate::fetch::FetchCache;
use crate::registry::{FlakeRegistry, Registries, RegistryKind};

/// Directory name under the platform cache and config directories
pub const APP_DIR: &str = "flakepin";

pub const CONFIG_FILE: &str = "config.yaml";
pub const REGISTRY_FILE: &str = "registry.json";

pub const CONFIG_ENV: &str = "FLAKEPIN_CONFIG";
pub const CACHE_DIR_ENV: &str = "FLAKEPIN_CACHE_DIR";
pub const REGISTRY_ENV: &str = "FLAKEPIN_REGISTRY";
pub const GLOBAL_REGISTRY_ENV: &str = "FLAKEPIN_GLOBAL_REGISTRY";
pub const JOBS_ENV: &str = "FLAKEPIN_JOBS";

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root of the fetch cache
    pub cache_dir: PathBuf,

    /// Registry edited by `flakepin registry`
    pub user_registry: PathBuf,

    /// Lowest-priority, system-wide registry
    pub global_registry: Option<PathBuf>,

    /// Registry given on the command line, consulted first
    pub flag_registry: Option<PathBuf>,

    pub jobs: usize,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub jobs: Option<usize>,
    pub registry: Option<PathBuf>,
}

/// `config.yaml`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    cache_dir: Option<PathBuf>,
    user_registry: Option<PathBuf>,
    global_registry: Option<PathBuf>,
    jobs: Option<usize>,
}

impl Settings {
    /// Built-in defaults
    pub fn defaults() -> Result<Self> {
        let cache_base =
            dirs::cache_dir().ok_or_else(|| invalid("could not determine cache directory"))?;
        Ok(Self {
            cache_dir: cache_base.join(APP_DIR),
            user_registry: config_dir()?.join(REGISTRY_FILE),
            global_registry: None,
            flag_registry: None,
            jobs: 1,
        })
    }

    /// Load settings from the config file, the process environment and `overrides`
    pub fn load(overrides: &Overrides) -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok(), overrides)
    }

    fn load_with(env: impl Fn(&str) -> Option<String>, overrides: &Overrides) -> Result<Self> {
        let mut settings = Self::defaults()?;

        let config_path = match env(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => config_dir()?.join(CONFIG_FILE),
        };
        settings.apply_file(&config_path)?;
        settings.apply_env(&env)?;

        if let Some(jobs) = overrides.jobs {
            settings.jobs = jobs;
        }
        if let Some(registry) = &overrides.registry {
            settings.flag_registry = Some(registry.clone());
        }

        if settings.jobs == 0 {
            return Err(invalid("jobs must be at least 1"));
        }
        Ok(settings)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let Some(content) = read_optional(path)? else {
            tracing::debug!(path = %path.display(), "no config file");
            return Ok(());
        };
        tracing::debug!(path = %path.display(), "reading config file");

        let config: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| parse_failed(path, e.to_string()))?
        };

        if let Some(cache_dir) = config.cache_dir {
            self.cache_dir = cache_dir;
        }
        if let Some(user_registry) = config.user_registry {
            self.user_registry = user_registry;
        }
        if config.global_registry.is_some() {
            self.global_registry = config.global_registry;
        }
        if let Some(jobs) = config.jobs {
            self.jobs = jobs;
        }
        Ok(())
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(cache_dir) = env(CACHE_DIR_ENV) {
            self.cache_dir = PathBuf::from(cache_dir);
        }
        if let Some(registry) = env(REGISTRY_ENV) {
            self.user_registry = PathBuf::from(registry);
        }
        if let Some(registry) = env(GLOBAL_REGISTRY_ENV) {
            self.global_registry = Some(PathBuf::from(registry));
        }
        if let Some(jobs) = env(JOBS_ENV) {
            self.jobs = jobs
                .trim()
                .parse()
                .map_err(|_| invalid(format!("{JOBS_ENV} must be a number, got '{jobs}'")))?;
        }
        Ok(())
    }

    /// Read the configured registries, highest precedence first
    pub fn registries(&self) -> Result<Registries> {
        let mut registries = Registries::new();
        if let Some(path) = &self.flag_registry {
            registries.push(RegistryKind::Flag, FlakeRegistry::read(path)?);
        }
        registries.push(RegistryKind::User, FlakeRegistry::read(&self.user_registry)?);
        if let Some(path) = &self.global_registry {
            registries.push(RegistryKind::Global, FlakeRegistry::read(path)?);
        }
        Ok(registries)
    }

    pub fn fetch_cache(&self) -> FetchCache {
        FetchCache::new(&self.cache_dir)
    }
}

fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| invalid("could not determine config directory"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use serial_test::serial;

    use super::*;
    use crate::error::FlakeError;
    use crate::flakeref::FlakeRef;
    use crate::test_fixtures::create_temp_dir;

    fn load(vars: &[(&str, &str)], overrides: &Overrides) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::load_with(|key| vars.get(key).cloned(), overrides)
    }

    #[test]
    fn test_defaults_without_config_file() {
        let temp = create_temp_dir();
        let missing = temp.path().join("none.yaml");
        let settings = load(&[(CONFIG_ENV, missing.to_str().unwrap())], &Overrides::default()).unwrap();

        assert_eq!(settings, Settings::defaults().unwrap());
        assert_eq!(settings.jobs, 1);
        assert!(settings.cache_dir.ends_with(APP_DIR));
        assert!(settings.user_registry.ends_with(REGISTRY_FILE));
    }

    #[test]
    fn test_layers_override_in_order() {
        let temp = create_temp_dir();
        let config = temp.path().join("config.yaml");
        fs::write(
            &config,
            "cacheDir: /from/file/cache\nuserRegistry: /from/file/registry.json\njobs: 2\n",
        )
        .unwrap();

        let from_file = load(&[(CONFIG_ENV, config.to_str().unwrap())], &Overrides::default()).unwrap();
        assert_eq!(from_file.cache_dir, PathBuf::from("/from/file/cache"));
        assert_eq!(from_file.user_registry, PathBuf::from("/from/file/registry.json"));
        assert_eq!(from_file.jobs, 2);

        let from_env = load(
            &[
                (CONFIG_ENV, config.to_str().unwrap()),
                (CACHE_DIR_ENV, "/from/env/cache"),
                (JOBS_ENV, "3"),
            ],
            &Overrides::default(),
        )
        .unwrap();
        assert_eq!(from_env.cache_dir, PathBuf::from("/from/env/cache"));
        assert_eq!(from_env.user_registry, PathBuf::from("/from/file/registry.json"));
        assert_eq!(from_env.jobs, 3);

        let from_flags = load(
            &[(CONFIG_ENV, config.to_str().unwrap()), (JOBS_ENV, "3")],
            &Overrides {
                jobs: Some(4),
                registry: Some(PathBuf::from("/from/flag/registry.json")),
            },
        )
        .unwrap();
        assert_eq!(from_flags.jobs, 4);
        assert_eq!(
            from_flags.flag_registry,
            Some(PathBuf::from("/from/flag/registry.json"))
        );
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let temp = create_temp_dir();
        let missing = temp.path().join("none.yaml");
        let err = load(
            &[(CONFIG_ENV, missing.to_str().unwrap())],
            &Overrides {
                jobs: Some(0),
                registry: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, FlakeError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_bad_jobs_env_rejected() {
        let temp = create_temp_dir();
        let missing = temp.path().join("none.yaml");
        let err = load(
            &[(CONFIG_ENV, missing.to_str().unwrap()), (JOBS_ENV, "many")],
            &Overrides::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("FLAKEPIN_JOBS"));
    }

    #[test]
    fn test_unknown_config_key_rejected() {
        let temp = create_temp_dir();
        let config = temp.path().join("config.yaml");
        fs::write(&config, "cache: /tmp\n").unwrap();

        let err = load(&[(CONFIG_ENV, config.to_str().unwrap())], &Overrides::default()).unwrap_err();
        assert!(matches!(err, FlakeError::ConfigParseFailed { ref path, .. } if path.ends_with("config.yaml")));
    }

    #[test]
    fn test_registries_precedence() {
        let temp = create_temp_dir();
        let flag = temp.path().join("flag.json");
        let user = temp.path().join("user.json");

        let nixpkgs: FlakeRef = "nixpkgs".parse().unwrap();
        [(&flag, "github:flag/nixpkgs"), (&user, "github:user/nixpkgs")]
            .iter()
            .for_each(|(path, target)| {
                let mut registry = FlakeRegistry::new();
                registry.add(nixpkgs.clone(), target.parse().unwrap());
                registry.write(path).unwrap();
            });

        let mut settings = Settings::defaults().unwrap();
        settings.user_registry = user;
        settings.global_registry = Some(temp.path().join("missing.json"));
        assert_eq!(
            settings.registries().unwrap().lookup(&nixpkgs).map(ToString::to_string),
            Some("github:user/nixpkgs/master".to_string())
        );

        settings.flag_registry = Some(flag);
        let registries = settings.registries().unwrap();
        assert_eq!(
            registries.lookup(&nixpkgs).map(ToString::to_string),
            Some("github:flag/nixpkgs/master".to_string())
        );
        let kinds: Vec<RegistryKind> = registries.layers().map(|(kind, _)| kind).collect();
        assert_eq!(
            kinds,
            vec![RegistryKind::Flag, RegistryKind::User, RegistryKind::Global]
        );
    }

    #[test]
    #[serial]
    fn test_load_reads_process_environment() {
        let temp = create_temp_dir();
        let original = std::env::var(CACHE_DIR_ENV).ok();
        unsafe {
            std::env::set_var(CONFIG_ENV, temp.path().join("none.yaml"));
            std::env::set_var(CACHE_DIR_ENV, temp.path());
        }

        let settings = Settings::load(&Overrides::default());

        unsafe {
            std::env::remove_var(CONFIG_ENV);
            match original {
                Some(o) => std::env::set_var(CACHE_DIR_ENV, o),
                None => std::env::remove_var(CACHE_DIR_ENV),
            }
        }
        assert_eq!(settings.unwrap().cache_dir, temp.path());
    }
}
