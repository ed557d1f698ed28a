//! Level configuration and the merge rules that turn it into a [`Level`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{CreateError, Result};
use crate::naming::Naming;
use crate::scheme::Scheme;

/// Settings that apply when nothing more specific is configured
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Defaults {
    pub naming: Naming,
    pub scheme: Scheme,
}

/// One configured level entry; `path` is absolute and may be a glob pattern
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelConfig {
    pub path: PathBuf,
    pub naming: Option<Naming>,
    pub scheme: Option<Scheme>,
    pub techs: Option<Vec<String>>,
    pub templates: BTreeMap<String, PathBuf>,
    pub default: Option<bool>,
}

impl LevelConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn is_pattern(&self) -> bool {
        contains_glob_chars(&self.path)
    }

    /// Whether this entry configures the concrete directory `dir`
    pub fn matches(&self, dir: &Path) -> bool {
        if self.path == dir {
            return true;
        }
        if !self.is_pattern() {
            return false;
        }
        glob::Pattern::new(&self.path.to_string_lossy())
            .map(|p| p.matches_path(dir))
            .unwrap_or(false)
    }

    /// Overlay `nearer` on top of this entry, field by field
    pub fn merge(&mut self, nearer: LevelConfig) {
        if nearer.naming.is_some() {
            self.naming = nearer.naming;
        }
        if nearer.scheme.is_some() {
            self.scheme = nearer.scheme;
        }
        if nearer.techs.is_some() {
            self.techs = nearer.techs;
        }
        if nearer.default.is_some() {
            self.default = nearer.default;
        }
        self.templates.extend(nearer.templates);
    }
}

/// Options of the `create` plugin section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginConfig {
    pub techs: Vec<String>,
    pub templates: BTreeMap<String, PathBuf>,
    pub techs_templates: BTreeMap<String, String>,
    pub template_folder: Option<PathBuf>,
    pub levels: Vec<LevelConfig>,
}

impl PluginConfig {
    pub fn level(&self, dir: &Path) -> Option<&LevelConfig> {
        find_level(&self.levels, dir)
    }
}

/// Fully merged options for one concrete level directory
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub path: PathBuf,
    pub naming: Naming,
    pub scheme: Scheme,
    /// Level-specific techs; `None` falls back to the plugin techs
    pub techs: Option<Vec<String>>,
    pub templates: BTreeMap<String, PathBuf>,
    pub techs_templates: BTreeMap<String, String>,
    pub template_folder: Option<PathBuf>,
    pub default: bool,
}

/// Concrete level directories keyed by path
pub type LevelMap = BTreeMap<PathBuf, Level>;

/// Merge every configuration source for `path`.
///
/// Precedence, highest first: the plugin's per-level entry, the level entry,
/// the plugin section, the global defaults.
pub fn resolve_level_options(
    path: &Path,
    defaults: &Defaults,
    level: Option<&LevelConfig>,
    plugin: &PluginConfig,
    plugin_level: Option<&LevelConfig>,
) -> Level {
    let layers = [plugin_level, level];

    let naming = layers
        .iter()
        .flatten()
        .find_map(|l| l.naming.clone())
        .unwrap_or_else(|| defaults.naming.clone());
    let scheme = layers
        .iter()
        .flatten()
        .find_map(|l| l.scheme)
        .unwrap_or(defaults.scheme);
    let techs = layers.iter().flatten().find_map(|l| l.techs.clone());
    let default = layers
        .iter()
        .flatten()
        .find_map(|l| l.default)
        .unwrap_or(false);

    let mut templates = plugin.templates.clone();
    for layer in layers.iter().rev().flatten() {
        templates.extend(layer.templates.clone());
    }

    Level {
        path: path.to_path_buf(),
        naming,
        scheme,
        techs,
        templates,
        techs_templates: plugin.techs_templates.clone(),
        template_folder: plugin.template_folder.clone(),
        default,
    }
}

/// Exact path match wins over a pattern match
pub fn find_level<'a>(levels: &'a [LevelConfig], dir: &Path) -> Option<&'a LevelConfig> {
    levels
        .iter()
        .find(|l| l.path == dir)
        .or_else(|| levels.iter().find(|l| l.matches(dir)))
}

/// Deepest configured level containing `cwd`
pub fn bubble<'a>(levels: &'a LevelMap, cwd: &Path) -> Option<&'a Level> {
    levels
        .values()
        .filter(|level| cwd.starts_with(&level.path))
        .max_by_key(|level| level.path.components().count())
}

pub fn default_levels(levels: &LevelMap) -> Vec<&Level> {
    levels.values().filter(|level| level.default).collect()
}

/// Expand a level pattern to the existing directories it matches, sorted
pub fn expand_pattern(pattern: &Path) -> Result<Vec<PathBuf>> {
    let pattern_str = pattern.to_string_lossy();
    let entries = glob::glob(&pattern_str).map_err(|source| CreateError::InvalidLevelPattern {
        pattern: pattern_str.to_string(),
        source,
    })?;

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

pub fn contains_glob_chars(path: &Path) -> bool {
    path.to_string_lossy()
        .chars()
        .any(|c| matches!(c, '*' | '?' | '['))
}
