//! Loads the project configuration from `daftar.yaml`. Every key is optional:
//!
//! ```yaml
//! seed: posts.txt                 # relative to this file; default: built-in seed
//! fallback_title: untitled
//! placeholder_image: https://picsum.photos/seed/{id}/400/300
//! allowed_ranges: [0600-06FF, 0750-077F, FB50-FDFF, FE70-FEFF]
//! copy_ack_millis: 2000
//! ```

use crate::clipboard::{CopyIndicator, DEFAULT_ACK_DELAY};
use crate::post::{Builder, Clock, DEFAULT_FALLBACK_TITLE, DEFAULT_PLACEHOLDER_IMAGE};
use crate::slug::{AllowedChars, CharRange, Slugger};
use crate::store::Store;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The name of the project file.
pub const PROJECT_FILE: &str = "daftar.yaml";

#[derive(Deserialize)]
struct AckMillis(u64);
impl Default for AckMillis {
    fn default() -> Self {
        AckMillis(DEFAULT_ACK_DELAY.as_millis() as u64)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Project {
    #[serde(default)]
    pub seed: Option<PathBuf>,

    #[serde(default)]
    pub fallback_title: Option<String>,

    #[serde(default)]
    pub placeholder_image: Option<String>,

    #[serde(default)]
    pub allowed_ranges: Option<Vec<CharRange>>,

    #[serde(default)]
    pub copy_ack_millis: AckMillis,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The seed file. `None` means the seed compiled into the binary.
    pub seed: Option<PathBuf>,
    pub fallback_title: String,
    pub placeholder_image: String,
    pub allowed_chars: AllowedChars,
    pub copy_ack_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            seed: None,
            fallback_title: DEFAULT_FALLBACK_TITLE.to_owned(),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_owned(),
            allowed_chars: AllowedChars::default(),
            copy_ack_delay: DEFAULT_ACK_DELAY,
        }
    }
}

impl Config {
    /// Searches `dir` and then its ancestors for a project file. Falls back to
    /// the defaults if there isn't one.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.is_file() {
            Config::from_project_file(&path)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => {
                    tracing::debug!("no `{}` found; using defaults", PROJECT_FILE);
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        use crate::util::open;
        let project: Project = serde_yaml::from_reader(open(path, "project")?)
            .map_err(|e| anyhow!("Loading configuration `{}`: {}", path.display(), e))?;
        let project_root = path
            .parent()
            .ok_or_else(|| anyhow!("Can't get parent directory for project file path '{:?}'", path))?;

        let defaults = Config::default();
        let config = Config {
            seed: project.seed.map(|seed| project_root.join(seed)),
            fallback_title: project.fallback_title.unwrap_or(defaults.fallback_title),
            placeholder_image: project.placeholder_image.unwrap_or(defaults.placeholder_image),
            allowed_chars: match project.allowed_ranges {
                Some(ranges) => AllowedChars::with_ranges(ranges),
                None => defaults.allowed_chars,
            },
            copy_ack_delay: Duration::from_millis(project.copy_ack_millis.0),
        };
        config
            .check()
            .map_err(|e| anyhow!("Loading configuration `{}`: {}", path.display(), e))?;
        tracing::debug!("loaded configuration from `{}`", path.display());
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.slugger().slugify(&self.fallback_title).is_empty() {
            return Err(anyhow!(
                "fallback_title `{}` has no characters usable in a slug",
                self.fallback_title
            ));
        }
        if !self.placeholder_image.contains("{id}") {
            tracing::warn!(
                "placeholder_image `{}` has no `{{id}}`; every post will share one image",
                self.placeholder_image
            );
        }
        Ok(())
    }

    pub fn slugger(&self) -> Slugger {
        Slugger::new(self.allowed_chars.clone())
    }

    /// Constructs a post [`Builder`] reading time from `clock`.
    pub fn builder<C: Clock>(&self, clock: C) -> Builder<C> {
        Builder {
            slugger: self.slugger(),
            fallback_title: self.fallback_title.clone(),
            placeholder_image: self.placeholder_image.clone(),
            clock,
        }
    }

    /// Loads the configured seed into a [`Store`].
    pub fn store(&self) -> Result<Store> {
        Ok(match &self.seed {
            Some(path) => Store::from_file(path)?,
            None => Store::builtin()?,
        })
    }

    pub fn copy_indicator(&self) -> CopyIndicator {
        CopyIndicator::new(self.copy_ack_delay)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::FixedClock;
    use chrono::{TimeZone, Utc};
    use std::fs;

    fn project(yaml: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(&path, yaml)?;
        Ok((dir, path))
    }

    #[test]
    fn test_empty_project_file_uses_defaults() -> Result<()> {
        let (_dir, path) = project("{}")?;
        assert_eq!(Config::default(), Config::from_project_file(&path)?);
        Ok(())
    }

    #[test]
    fn test_project_file_overrides() -> Result<()> {
        let (dir, path) = project(
            "seed: data/posts.txt
fallback_title: bi-onvan
placeholder_image: https://img.example/{id}.png
allowed_ranges: [0370-03FF]
copy_ack_millis: 500
",
        )?;
        let config = Config::from_project_file(&path)?;
        assert_eq!(Some(dir.path().join("data/posts.txt")), config.seed);
        assert_eq!("bi-onvan", config.fallback_title);
        assert_eq!(Duration::from_millis(500), config.copy_ack_delay);
        assert_eq!(
            &[CharRange::new('\u{0370}', '\u{03FF}')],
            config.allowed_chars.ranges()
        );

        let builder = config.builder(FixedClock(Utc.ymd(2024, 5, 1).and_hms_milli(10, 20, 30, 123)));
        let post = builder.build("Σ σ", "e", "c", None);
        assert_eq!("σ-σ-1714558830123", post.id);
        assert_eq!("https://img.example/σ-σ-1714558830123.png", post.image_url);
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_parents() -> Result<()> {
        let (dir, _) = project("fallback_title: from-parent\n")?;
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested)?;
        assert_eq!("from-parent", Config::from_directory(&nested)?.fallback_title);
        Ok(())
    }

    #[test]
    fn test_invalid_project_files() -> Result<()> {
        for yaml in &[
            "allowed_ranges: [06FF-0600]\n",
            "fallback_title: '!!!'\n",
            "unknown_key: 1\n",
        ] {
            let (_dir, path) = project(yaml)?;
            let err = Config::from_project_file(&path).unwrap_err();
            assert!(err.to_string().starts_with("Loading configuration"), "{}", err);
        }
        Ok(())
    }

    #[test]
    fn test_store_from_configured_seed() -> Result<()> {
        let (dir, path) = project("seed: posts.txt\n")?;
        fs::write(
            dir.path().join("posts.txt"),
            "[{ id: 'a-1', title: 'A', excerpt: 'e', content: 'c', \
             imageUrl: 'https://example.com/a.jpg', date: '2024-05-01T10:20:30.123Z' }]",
        )?;
        let store = Config::from_project_file(&path)?.store()?;
        assert_eq!(1, store.len());
        assert!(store.find_by_id("a-1").post().is_some());
        Ok(())
    }
}
