// Copyright 2026 Pixq Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use crate::quick_filter::Vocabulary;
use crate::recent::DEFAULT_RECENT_LIMIT;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store_path: PathBuf,
    pub recent_limit: usize,
    pub search_path: String,
    pub vocabulary: Vocabulary,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("pixq.db"),
            recent_limit: DEFAULT_RECENT_LIMIT,
            search_path: "/search".to_string(),
            vocabulary: Vocabulary::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigCtx {
    /// Directory holding the store, when one was found.
    pub root: Option<PathBuf>,
    pub config: Config,
}

impl ConfigCtx {
    pub fn load_from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir().context("get current dir")?;
        Self::load_from(&cwd)
    }

    pub fn load_from(start: &Path) -> Result<Self> {
        let config = load_global_config()?;
        let root = find_store_root(start, &config.store_path);
        Ok(Self { root, config })
    }

    pub fn store_path(&self) -> Option<PathBuf> {
        if self.config.store_path.is_absolute() {
            return self
                .root
                .as_ref()
                .map(|_| self.config.store_path.clone());
        }
        self.root
            .as_ref()
            .map(|root| root.join(&self.config.store_path))
    }
}

fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return Some(PathBuf::from(appdata));
        }
        if let Ok(profile) = std::env::var("USERPROFILE") {
            return Some(PathBuf::from(profile).join("AppData").join("Roaming"));
        }
        return None;
    }

    if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").ok()?;
        return Some(
            PathBuf::from(home)
                .join("Library")
                .join("Application Support"),
        );
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config"))
}

pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("pixq").join("pixq.toml"))
}

pub fn load_global_config() -> Result<Config> {
    let Some(path) = global_config_path() else {
        return Ok(Config::default());
    };
    if !path.exists() {
        return Ok(Config::default());
    }
    read_config(&path)
}

pub fn find_store_root(start: &Path, store_path: &Path) -> Option<PathBuf> {
    if store_path.is_absolute() {
        return store_path
            .exists()
            .then(|| store_path.parent().unwrap_or(store_path).to_path_buf());
    }

    let mut cur = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    loop {
        let candidate = cur.join(store_path);
        if candidate.exists() {
            return Some(cur);
        }
        match cur.parent() {
            Some(parent) => cur = parent.to_path_buf(),
            None => return None,
        }
    }
}

pub fn read_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut config: Config = toml::from_str(&text).context("parse pixq.toml")?;
    if config.recent_limit == 0 {
        config.recent_limit = DEFAULT_RECENT_LIMIT;
    }
    if !config.search_path.starts_with('/') {
        config.search_path = format!("/{}", config.search_path);
    }
    config
        .vocabulary
        .validate()
        .with_context(|| format!("invalid vocabulary in {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use tempfile::tempdir;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn config_path(config_root: &Path) -> PathBuf {
        let base = if cfg!(target_os = "macos") {
            config_root.join("Library").join("Application Support")
        } else {
            config_root.to_path_buf()
        };
        base.join("pixq").join("pixq.toml")
    }

    fn with_env<T>(config_root: &Path, f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().expect("env lock");
        let old_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        let old_home = std::env::var("HOME").ok();
        let old_appdata = std::env::var("APPDATA").ok();
        set_env_var("XDG_CONFIG_HOME", config_root);
        set_env_var("HOME", config_root);
        set_env_var("APPDATA", config_root);
        let result = f();
        match old_xdg {
            Some(val) => set_env_var("XDG_CONFIG_HOME", val),
            None => remove_env_var("XDG_CONFIG_HOME"),
        }
        match old_home {
            Some(val) => set_env_var("HOME", val),
            None => remove_env_var("HOME"),
        }
        match old_appdata {
            Some(val) => set_env_var("APPDATA", val),
            None => remove_env_var("APPDATA"),
        }
        result
    }

    fn set_env_var(key: &str, value: impl AsRef<std::ffi::OsStr>) {
        unsafe {
            std::env::set_var(key, value);
        }
    }

    fn remove_env_var(key: &str) {
        unsafe {
            std::env::remove_var(key);
        }
    }

    fn write_config(config_root: &Path, text: &str) -> PathBuf {
        let path = config_path(config_root);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, text).expect("write config");
        path
    }

    #[test]
    fn find_store_root_walks_up() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("gallery");
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(root.join("pixq.db"), "stub").expect("write db");

        let found = find_store_root(&nested, Path::new("pixq.db"));
        let expected = root.canonicalize().unwrap_or(root);
        assert_eq!(found, Some(expected));
    }

    #[test]
    fn missing_store_is_not_an_error() {
        let config_dir = tempdir().expect("config dir");
        let work_dir = tempdir().expect("work dir");
        with_env(config_dir.path(), || {
            let ctx = ConfigCtx::load_from(work_dir.path()).expect("load");
            assert!(ctx.root.is_none());
            assert!(ctx.store_path().is_none());
            assert_eq!(ctx.config.recent_limit, DEFAULT_RECENT_LIMIT);
        });
    }

    #[test]
    fn reads_overrides_and_fixes_bad_values() {
        let config_dir = tempdir().expect("config dir");
        let path = write_config(
            config_dir.path(),
            "recent_limit = 0\nsearch_path = \"browse\"\n\n[vocabulary]\nversion = \"v2\"\n\n[vocabulary.sfw]\nonly = [\"rating:general\"]\n",
        );
        let config = read_config(&path).expect("config");
        assert_eq!(config.recent_limit, DEFAULT_RECENT_LIMIT);
        assert_eq!(config.search_path, "/browse");
        assert_eq!(config.vocabulary.version, "v2");
        assert_eq!(config.vocabulary.sfw.only, ["rating:general"]);
        assert!(config.vocabulary.sfw.not.is_empty());
        assert_eq!(config.vocabulary.realistic.only, ["realistic"]);
    }

    #[test]
    fn rejects_vocabulary_with_spaces() {
        let config_dir = tempdir().expect("config dir");
        let path = write_config(
            config_dir.path(),
            "[vocabulary.realistic]\nonly = [\"photo real\"]\n",
        );
        let err = read_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("invalid vocabulary"));
    }

    #[test]
    fn global_config_is_picked_up() {
        let config_dir = tempdir().expect("config dir");
        let work_dir = tempdir().expect("work dir");
        write_config(config_dir.path(), "recent_limit = 3\n");
        with_env(config_dir.path(), || {
            let ctx = ConfigCtx::load_from(work_dir.path()).expect("load");
            assert_eq!(ctx.config.recent_limit, 3);
        });
    }
}
