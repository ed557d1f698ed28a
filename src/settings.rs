//! Project configuration loaded from `.bemrc` files.
//!
//! Files are discovered by walking up from the working directory until one
//! declares `"root": true`. Nearer files override farther ones key by key;
//! level entries merge by path. Relative paths are resolved against the
//! directory of the file that declares them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{CreateError, Result};
use crate::level::{
    expand_pattern, find_level, resolve_level_options, Defaults, Level, LevelConfig, LevelMap,
    PluginConfig,
};
use crate::naming::NamingSpec;
use crate::scheme::Scheme;

/// Config file names, checked in order in each directory
pub const RC_FILES: &[&str] = &[".bemrc", ".bemrc.json"];

/// Read-only view of levels, defaults and plugin options
pub trait ConfigProvider: Send + Sync {
    /// Project root, if a config file was found
    fn root(&self) -> Option<&Path>;

    fn defaults(&self) -> &Defaults;

    fn plugin(&self) -> &PluginConfig;

    /// Every configured level directory, with glob patterns expanded
    fn level_map(&self) -> Result<LevelMap>;

    /// Merged options for `dir`, or `None` if nothing configures it
    fn level(&self, dir: &Path) -> Option<Level>;

    /// Merged options for `dir`, falling back to defaults
    fn level_or_default(&self, dir: &Path) -> Level {
        self.level(dir).unwrap_or_else(|| {
            resolve_level_options(dir, self.defaults(), None, self.plugin(), None)
        })
    }
}

/// Merged configuration of one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    root: Option<PathBuf>,
    defaults: Defaults,
    levels: Vec<LevelConfig>,
    plugin: PluginConfig,
}

impl Settings {
    pub fn new(defaults: Defaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: LevelConfig) -> Self {
        merge_levels(&mut self.levels, vec![level]);
        self
    }

    pub fn with_plugin(mut self, plugin: PluginConfig) -> Self {
        self.plugin = plugin;
        self
    }

    pub fn levels(&self) -> &[LevelConfig] {
        &self.levels
    }

    /// Walk up from `cwd` collecting config files
    pub fn discover(cwd: &Path) -> Result<Self> {
        let mut found = Vec::new();

        for dir in cwd.ancestors() {
            let Some(path) = RC_FILES
                .iter()
                .map(|name| dir.join(name))
                .find(|p| p.is_file())
            else {
                continue;
            };

            debug!(config = %path.display(), "found config file");
            let rc = read_rc(&path)?;
            let is_root = rc.root;
            found.push((dir.to_path_buf(), rc));
            if is_root {
                break;
            }
        }

        // farthest first so nearer files override
        found.reverse();
        Self::from_layers(found)
    }

    /// Load exactly one config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let rc = read_rc(path)?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_layers(vec![(base, rc)])
    }

    /// Parse config JSON whose relative paths resolve against `base_dir`
    pub fn from_json(json: &str, base_dir: &Path) -> Result<Self> {
        let rc: RcFile = serde_json::from_str(json).map_err(|source| CreateError::ConfigParse {
            path: base_dir.to_path_buf(),
            source,
        })?;
        Self::from_layers(vec![(base_dir.to_path_buf(), rc)])
    }

    fn from_layers(layers: Vec<(PathBuf, RcFile)>) -> Result<Self> {
        let mut settings = Settings {
            root: layers.first().map(|(dir, _)| dir.clone()),
            ..Settings::default()
        };

        for (dir, rc) in layers {
            settings.apply(&dir, rc)?;
        }

        Ok(settings)
    }

    fn apply(&mut self, dir: &Path, rc: RcFile) -> Result<()> {
        if rc.root {
            self.root = Some(dir.to_path_buf());
        }
        if let Some(naming) = rc.naming {
            self.defaults.naming = naming_from_spec(&naming)?;
        }
        if let Some(scheme) = rc.scheme {
            self.defaults.scheme = scheme;
        }
        merge_levels(&mut self.levels, rc.levels.into_configs(dir)?);

        let Some(create) = rc
            .modules
            .bem_tools
            .and_then(|tools| tools.plugins.create)
        else {
            return Ok(());
        };

        if let Some(techs) = create.techs {
            self.plugin.techs = techs;
        }
        self.plugin
            .templates
            .extend(resolve_paths(dir, create.templates));
        self.plugin.techs_templates.extend(create.techs_templates);
        if let Some(folder) = create.template_folder {
            self.plugin.template_folder = Some(resolve_path(dir, &folder));
        }
        merge_levels(&mut self.plugin.levels, create.levels.into_configs(dir)?);

        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    fn plugin(&self) -> &PluginConfig {
        &self.plugin
    }

    fn level_map(&self) -> Result<LevelMap> {
        let mut map = LevelMap::new();

        for entry in self.levels.iter().chain(self.plugin.levels.iter()) {
            let dirs = if entry.is_pattern() {
                let dirs = expand_pattern(&entry.path)?;
                debug!(
                    pattern = %entry.path.display(),
                    matches = dirs.len(),
                    "expanded level pattern"
                );
                dirs
            } else {
                vec![entry.path.clone()]
            };

            for dir in dirs {
                if map.contains_key(&dir) {
                    continue;
                }
                let level = self.level_or_default(&dir);
                map.insert(dir, level);
            }
        }

        Ok(map)
    }

    fn level(&self, dir: &Path) -> Option<Level> {
        let level = find_level(&self.levels, dir);
        let plugin_level = self.plugin.level(dir);

        if level.is_none() && plugin_level.is_none() {
            return None;
        }

        Some(resolve_level_options(
            dir,
            &self.defaults,
            level,
            &self.plugin,
            plugin_level,
        ))
    }
}

fn read_rc(path: &Path) -> Result<RcFile> {
    let content = fs::read_to_string(path).map_err(|source| CreateError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CreateError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

fn naming_from_spec(spec: &NamingSpec) -> Result<crate::naming::Naming> {
    spec.to_naming()
        .ok_or_else(|| CreateError::config(format!("unknown naming preset in {spec:?}")))
}

fn merge_levels(levels: &mut Vec<LevelConfig>, incoming: Vec<LevelConfig>) {
    for level in incoming {
        match levels.iter_mut().find(|l| l.path == level.path) {
            Some(existing) => existing.merge(level),
            None => levels.push(level),
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    joined.components().collect()
}

fn resolve_paths(base: &Path, map: BTreeMap<String, String>) -> BTreeMap<String, PathBuf> {
    map.into_iter()
        .map(|(tech, path)| {
            let resolved = resolve_path(base, &path);
            (tech, resolved)
        })
        .collect()
}

// ==================== on-disk format ====================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RcFile {
    root: bool,
    naming: Option<NamingSpec>,
    scheme: Option<Scheme>,
    levels: RcLevels,
    modules: RcModules,
}

/// Levels as a list of `{ path, ... }` or a map keyed by path
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RcLevels {
    List(Vec<RcLevelEntry>),
    Map(BTreeMap<String, RcLevel>),
}

impl Default for RcLevels {
    fn default() -> Self {
        RcLevels::List(Vec::new())
    }
}

impl RcLevels {
    fn into_configs(self, base: &Path) -> Result<Vec<LevelConfig>> {
        let entries: Vec<(String, RcLevel)> = match self {
            RcLevels::List(list) => list.into_iter().map(|e| (e.path, e.level)).collect(),
            RcLevels::Map(map) => map.into_iter().collect(),
        };

        entries
            .into_iter()
            .map(|(path, level)| {
                Ok(LevelConfig {
                    path: resolve_path(base, &path),
                    naming: level.naming.as_ref().map(naming_from_spec).transpose()?,
                    scheme: level.scheme,
                    techs: level.techs,
                    templates: resolve_paths(base, level.templates),
                    default: level.default,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RcLevelEntry {
    path: String,
    #[serde(flatten)]
    level: RcLevel,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RcLevel {
    naming: Option<NamingSpec>,
    scheme: Option<Scheme>,
    techs: Option<Vec<String>>,
    templates: BTreeMap<String, String>,
    default: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RcModules {
    #[serde(rename = "bem-tools")]
    bem_tools: Option<RcBemTools>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RcBemTools {
    plugins: RcPlugins,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RcPlugins {
    create: Option<RcCreate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RcCreate {
    techs: Option<Vec<String>>,
    templates: BTreeMap<String, String>,
    techs_templates: BTreeMap<String, String>,
    template_folder: Option<String>,
    levels: RcLevels,
}
