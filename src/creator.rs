//! Creation orchestration.
//!
//! Resolved entities are expanded into a matrix of cells (entity × level ×
//! tech), each mapping to one file path. Cells run in parallel; a failing
//! cell never stops its siblings.

use std::collections::HashSet;
use std::fmt;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::content::Content;
use crate::entity::Entity;
use crate::error::{CreateError, Result};
use crate::level::Level;
use crate::materializer::{materialize, WriteOptions};
use crate::resolver::{resolve, Context, EntityInput, ResolvedGroup};
use crate::techs::{resolve_techs, TechFilter};

/// Content written into every cell instead of a template
pub enum FileContent {
    Text(String),
    Stream(Box<dyn Read + Send>),
}

impl fmt::Debug for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileContent::Text(text) => f.debug_tuple("Text").field(text).finish(),
            FileContent::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Options of one create invocation
#[derive(Debug, Default)]
pub struct CreateOptions {
    pub tech_filter: TechFilter,
    pub file_content: Option<FileContent>,
    pub write: WriteOptions,
}

/// One file to create: an entity in one tech on one level.
/// The level is shared across cells without cloning.
#[derive(Debug, Clone)]
pub struct Cell {
    pub entity: Entity,
    pub tech: String,
    pub level: Arc<Level>,
    /// Absolute target path
    pub path: PathBuf,
}

/// Result of one cell
#[derive(Debug)]
pub struct CellResult {
    pub cell: Cell,
    pub status: CellStatus,
    pub duration: Duration,
}

#[derive(Debug)]
pub enum CellStatus {
    /// Written, or already present
    Created(PathBuf),
    Failed(CreateError),
}

/// Something that did not get created
#[derive(Debug)]
pub enum Failure {
    /// An entity input that could not be resolved
    Input { input: String, error: CreateError },
    /// A cell whose template or write failed
    Cell { path: PathBuf, error: CreateError },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Input { input, error } => write!(f, "{input}: {error}"),
            Failure::Cell { path, error } => write!(f, "{}: {error}", path.display()),
        }
    }
}

/// Outcome of a create invocation
#[derive(Debug, Default)]
pub struct CreateReport {
    /// Paths written or confirmed present, in cell order
    pub created: Vec<PathBuf>,
    pub failures: Vec<Failure>,
}

impl CreateReport {
    pub fn has_success(&self) -> bool {
        !self.created.is_empty()
    }

    pub fn has_failure(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Cells to run plus the inputs that already failed to resolve
#[derive(Debug, Default)]
pub struct Plan {
    pub cells: Vec<Cell>,
    pub failures: Vec<Failure>,
}

/// Observer of a running create invocation
pub trait Progress: Sync {
    /// Called once with the number of planned cells
    fn start(&self, _cells: usize) {}

    /// Called from the worker that ran the cell
    fn cell_done(&self, _result: &CellResult) {}
}

impl Progress for () {}

/// Where cell content comes from, prepared once per invocation
#[derive(Debug, Clone)]
enum ContentSource {
    Template,
    Text(String),
    /// Drained stream, replayed to every cell
    Buffered(Arc<[u8]>),
}

impl ContentSource {
    fn prepare(content: Option<FileContent>) -> Result<Self> {
        Ok(match content {
            None => ContentSource::Template,
            Some(FileContent::Text(text)) => ContentSource::Text(text),
            Some(FileContent::Stream(mut reader)) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                debug!(bytes = buf.len(), "buffered content stream");
                ContentSource::Buffered(buf.into())
            }
        })
    }
}

/// Create files for `entities` on `levels` in `techs`.
///
/// Configuration errors are returned as `Err`; everything else is reported
/// per input or per cell in the [`CreateReport`].
pub fn create(
    entities: &[EntityInput],
    levels: &[String],
    techs: &[String],
    options: CreateOptions,
    ctx: &Context<'_>,
) -> Result<CreateReport> {
    create_with_progress(entities, levels, techs, options, ctx, &())
}

/// [`create`], reporting each finished cell to `progress`
pub fn create_with_progress(
    entities: &[EntityInput],
    levels: &[String],
    techs: &[String],
    options: CreateOptions,
    ctx: &Context<'_>,
    progress: &dyn Progress,
) -> Result<CreateReport> {
    let plan = plan(entities, levels, techs, &options.tech_filter, ctx)?;
    let source = ContentSource::prepare(options.file_content)?;

    progress.start(plan.cells.len());

    let results: Vec<CellResult> = plan
        .cells
        .into_par_iter()
        .map(|cell| {
            let result = create_cell(cell, &source, ctx, &options.write);
            progress.cell_done(&result);
            result
        })
        .collect();

    Ok(collect_report(plan.failures, results))
}

/// Resolve inputs and build the cell matrix without touching the filesystem
pub fn plan(
    entities: &[EntityInput],
    levels: &[String],
    techs: &[String],
    filter: &TechFilter,
    ctx: &Context<'_>,
) -> Result<Plan> {
    let resolution = resolve(entities, levels, ctx)?;
    let cells = cell_matrix(&resolution.groups, techs, &ctx.config.plugin().techs, filter);

    let failures = resolution
        .failures
        .into_iter()
        .map(|f| Failure::Input {
            input: f.input,
            error: f.error,
        })
        .collect();

    Ok(Plan { cells, failures })
}

/// Expand groups into cells, dropping cells that target an already planned path
pub fn cell_matrix(
    groups: &[ResolvedGroup],
    techs: &[String],
    plugin_techs: &[String],
    filter: &TechFilter,
) -> Vec<Cell> {
    let mut seen = HashSet::new();
    let mut cells = Vec::new();

    for group in groups {
        let level = &group.level;
        let group_techs = resolve_techs(
            techs,
            group.tech_hint.as_deref(),
            level.techs.as_deref(),
            plugin_techs,
            filter,
        );

        for tech in group_techs {
            let path = level
                .path
                .join(level.scheme.path(&group.entity, &tech, &level.naming));
            if !seen.insert(path.clone()) {
                debug!(path = %path.display(), "skipping duplicate cell");
                continue;
            }
            cells.push(Cell {
                entity: group.entity.clone(),
                tech,
                level: Arc::clone(level),
                path,
            });
        }
    }

    cells
}

/// Render and write a single cell
fn create_cell(
    cell: Cell,
    source: &ContentSource,
    ctx: &Context<'_>,
    write: &WriteOptions,
) -> CellResult {
    let start = Instant::now();

    let status = match cell_content(&cell, source, ctx)
        .and_then(|content| materialize(&cell.path, content, write))
    {
        Ok(path) => CellStatus::Created(path),
        Err(e) => {
            warn!(path = %cell.path.display(), error = %e, "failed to create");
            CellStatus::Failed(e)
        }
    };

    CellResult {
        cell,
        status,
        duration: start.elapsed(),
    }
}

fn cell_content(cell: &Cell, source: &ContentSource, ctx: &Context<'_>) -> Result<Content> {
    Ok(match source {
        ContentSource::Template => ctx
            .templates
            .template(&cell.tech, &cell.level)?
            .render(&cell.entity, &cell.level.naming),
        ContentSource::Text(text) => Content::Text(text.clone()),
        ContentSource::Buffered(bytes) => {
            Content::Stream(Box::new(Cursor::new(Arc::clone(bytes))))
        }
    })
}

/// Fold cell results into a report, keeping cell order
fn collect_report(failures: Vec<Failure>, results: Vec<CellResult>) -> CreateReport {
    let mut report = CreateReport {
        created: Vec::with_capacity(results.len()),
        failures,
    };

    for result in results {
        match result.status {
            CellStatus::Created(path) => report.created.push(path),
            CellStatus::Failed(error) => report.failures.push(Failure::Cell {
                path: result.cell.path,
                error,
            }),
        }
    }

    report
}
