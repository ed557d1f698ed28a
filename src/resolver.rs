//! Turns raw entity input and level arguments into (entity, level) groups.
//!
//! Shorthand strings are brace-expanded, then split into an optional level
//! prefix, an entity part and an optional tech suffix:
//! `path/to/level/b1__e1.css`.
//!
//! When the entity part does not parse on its own (`__e1`, `_m1`), the
//! working directory's position inside the level supplies the missing
//! prefix. Running from `level/b1/__e1`, `_m1` resolves to `b1__e1_m1`;
//! running from `level/b1`, `__e1` resolves to `b1__e1`.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::entity::Entity;
use crate::error::{CreateError, Result};
use crate::expand::expand_braces;
use crate::level::{bubble, default_levels, Level, LevelMap};
use crate::naming::Naming;
use crate::settings::ConfigProvider;
use crate::template::TemplateProvider;

/// Explicit collaborators of one invocation
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub cwd: &'a Path,
    pub config: &'a dyn ConfigProvider,
    pub templates: &'a dyn TemplateProvider,
}

/// One entry of the entities argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityInput {
    Entity(Entity),
    Shorthand(String),
}

impl From<Entity> for EntityInput {
    fn from(e: Entity) -> Self {
        EntityInput::Entity(e)
    }
}

impl From<&str> for EntityInput {
    fn from(s: &str) -> Self {
        EntityInput::Shorthand(s.to_string())
    }
}

impl From<String> for EntityInput {
    fn from(s: String) -> Self {
        EntityInput::Shorthand(s)
    }
}

/// An entity placed on one level
#[derive(Debug, Clone)]
pub struct ResolvedGroup {
    pub entity: Entity,
    pub level: Arc<Level>,
    /// Tech suffix from a shorthand string, replacing the resolved techs
    pub tech_hint: Option<String>,
}

/// An input entry that could not be resolved
#[derive(Debug)]
pub struct InputFailure {
    pub input: String,
    pub error: CreateError,
}

#[derive(Debug, Default)]
pub struct Resolution {
    pub groups: Vec<ResolvedGroup>,
    pub failures: Vec<InputFailure>,
}

/// Resolve every entity input against its target levels.
///
/// Configuration errors abort; an unparsable shorthand only fails its own
/// entry.
pub fn resolve(entities: &[EntityInput], levels: &[String], ctx: &Context<'_>) -> Result<Resolution> {
    let level_map = ctx.config.level_map()?;

    let target_levels: Vec<Arc<Level>> = if levels.is_empty() {
        implicit_levels(&level_map, ctx)
    } else {
        levels
            .iter()
            .map(|arg| Arc::new(explicit_level(arg, &level_map, ctx)))
            .collect()
    };

    let mut resolution = Resolution::default();

    for input in entities {
        match input {
            EntityInput::Entity(entity) => {
                for level in &target_levels {
                    resolution.groups.push(ResolvedGroup {
                        entity: entity.clone(),
                        level: Arc::clone(level),
                        tech_hint: None,
                    });
                }
            }
            EntityInput::Shorthand(raw) => {
                for literal in expand_braces(raw) {
                    resolve_shorthand(&literal, &target_levels, &level_map, ctx, &mut resolution);
                }
            }
        }
    }

    Ok(resolution)
}

fn resolve_shorthand(
    literal: &str,
    target_levels: &[Arc<Level>],
    level_map: &LevelMap,
    ctx: &Context<'_>,
    resolution: &mut Resolution,
) {
    let shorthand = Shorthand::split(literal);

    let levels = match shorthand.level {
        Some(level) => vec![Arc::new(explicit_level(level, level_map, ctx))],
        None => target_levels.to_vec(),
    };

    for level in levels {
        match parse_in_context(&level.naming, shorthand.entity, &level.path, ctx.cwd) {
            Ok(entity) => resolution.groups.push(ResolvedGroup {
                entity,
                level,
                tech_hint: shorthand.tech.map(str::to_string),
            }),
            Err(error) => resolution.failures.push(InputFailure {
                input: literal.to_string(),
                error,
            }),
        }
    }
}

/// A shorthand string split into its parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shorthand<'a> {
    pub level: Option<&'a str>,
    pub entity: &'a str,
    pub tech: Option<&'a str>,
}

impl<'a> Shorthand<'a> {
    pub fn split(input: &'a str) -> Self {
        let (level, specifier) = match input.rfind(|c| c == '/' || c == std::path::MAIN_SEPARATOR) {
            Some(0) => (Some("/"), &input[1..]),
            Some(idx) => {
                let prefix = &input[..idx];
                (Some(prefix).filter(|p| *p != "."), &input[idx + 1..])
            }
            None => (None, input),
        };

        let (entity, tech) = match specifier.split_once('.') {
            Some((entity, tech)) => (entity, Some(tech).filter(|t| !t.is_empty())),
            None => (specifier, None),
        };

        Self {
            level,
            entity,
            tech,
        }
    }
}

/// Parse `input`, borrowing missing parts from the cwd's place in the level.
///
/// Steps: direct parse, then element context, then block context.
pub fn parse_in_context(naming: &Naming, input: &str, level: &Path, cwd: &Path) -> Result<Entity> {
    if let Some(entity) = naming.parse(input) {
        return Ok(entity);
    }

    let segments = context_segments(level, cwd);
    let recovered = parse_with_elem_context(naming, input, &segments)
        .or_else(|| parse_with_block_context(naming, input, &segments));

    match recovered {
        Some(entity) => {
            debug!(input, entity = %naming.stringify(&entity), "resolved entity from cwd context");
            Ok(entity)
        }
        None => Err(CreateError::UnresolvedEntity {
            input: input.to_string(),
        }),
    }
}

/// Up to two directory names of `cwd` below `level`
fn context_segments(level: &Path, cwd: &Path) -> Vec<String> {
    let Ok(relative) = cwd.strip_prefix(level) else {
        return Vec::new();
    };

    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().to_string()),
            _ => None,
        })
        .take(2)
        .collect()
}

/// cwd is inside an element directory: `b1/__e1` + `_m1`
fn parse_with_elem_context(naming: &Naming, input: &str, segments: &[String]) -> Option<Entity> {
    if segments.is_empty() {
        return None;
    }
    let prefix = segments.concat();
    let context = naming.parse(&prefix)?;
    context.elem()?;
    naming.parse(&format!("{prefix}{input}"))
}

/// cwd is inside a block directory: `b1` + `__e1`
fn parse_with_block_context(naming: &Naming, input: &str, segments: &[String]) -> Option<Entity> {
    let block = segments.first()?;
    naming.parse(&format!("{block}{input}"))
}

/// Level named on the command line or in a shorthand prefix.
///
/// A relative name is joined onto cwd; if that is not a configured level,
/// a single configured level ending with the name is used instead.
fn explicit_level(arg: &str, level_map: &LevelMap, ctx: &Context<'_>) -> Level {
    let path = Path::new(arg);
    let joined = normalize(&ctx.cwd.join(path));

    let dir = if path.is_absolute() || level_map.contains_key(&joined) {
        joined
    } else {
        let mut matches = level_map.keys().filter(|k| k.ends_with(path));
        match (matches.next(), matches.next()) {
            (Some(configured), None) => configured.clone(),
            _ => joined,
        }
    };

    level_map
        .get(&dir)
        .cloned()
        .unwrap_or_else(|| ctx.config.level_or_default(&dir))
}

/// Levels used when none were given: bubbling, then defaults, then cwd
fn implicit_levels(level_map: &LevelMap, ctx: &Context<'_>) -> Vec<Arc<Level>> {
    if let Some(level) = bubble(level_map, ctx.cwd) {
        debug!(level = %level.path.display(), "cwd is inside a configured level");
        return vec![Arc::new(level.clone())];
    }

    let defaults = default_levels(level_map);
    if !defaults.is_empty() {
        debug!(count = defaults.len(), "using default levels");
        return defaults.into_iter().cloned().map(Arc::new).collect();
    }

    debug!(cwd = %ctx.cwd.display(), "no configured level, using cwd");
    vec![Arc::new(ctx.config.level_or_default(ctx.cwd))]
}

/// Lexical normalization: drops `.` and folds `..` into its parent
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` of the root is the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    out
}
