//! CLI configuration and runtime settings for entity creation.

use clap::Parser;
use std::path::PathBuf;

use crate::entity::Entity;
use crate::resolver::EntityInput;
use crate::techs::TechFilter;

/// Create BEM entity files on file-system levels
#[derive(Parser, Debug)]
#[command(name = "bem-create")]
#[command(version)]
#[command(about = "Create BEM entity files on file-system levels")]
pub struct Cli {
    /// Entities to create, e.g. `b1__e1_m1.css` or `blocks/{b1,b2}.{css,js}`
    pub entities: Vec<String>,

    /// Levels to create entities on
    #[arg(short, long)]
    pub level: Vec<String>,

    /// Block name
    #[arg(short, long)]
    pub block: Vec<String>,

    /// Element name
    #[arg(short, long)]
    pub elem: Vec<String>,

    /// Modifier name
    #[arg(short = 'm', long = "mod")]
    pub modifier: Vec<String>,

    /// Modifier value; a modifier without one is boolean
    #[arg(short, long)]
    pub val: Vec<String>,

    /// Techs to add to the configured ones (comma-separated)
    #[arg(short = 't', long, value_delimiter = ',')]
    pub add_tech: Vec<String>,

    /// Create only these techs (comma-separated)
    #[arg(short = 'T', long, value_delimiter = ',')]
    pub force_tech: Vec<String>,

    /// Skip these techs (comma-separated)
    #[arg(short = 'n', long, value_delimiter = ',')]
    pub no_tech: Vec<String>,

    /// File content instead of templates; read from stdin when no value is given
    #[arg(short, long, num_args = 0..=1)]
    pub content: Option<Option<String>>,

    /// Overwrite existing files
    #[arg(short, long)]
    pub force: bool,

    /// Config file to use instead of discovering `.bemrc` files
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub jobs: usize,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Only report errors; also silences "already exists" notices
    #[arg(short, long, visible_alias = "no-warn")]
    pub quiet: bool,
}

/// Where `--content` comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentArg {
    Text(String),
    Stdin,
}

/// Runtime configuration parsed from CLI
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory levels are resolved against
    pub cwd: PathBuf,
    /// Entities from `--block`/`--elem`/`--mod`/`--val` and positional shorthands
    pub entities: Vec<EntityInput>,
    pub levels: Vec<String>,
    pub techs: Vec<String>,
    pub tech_filter: TechFilter,
    pub content: Option<ContentArg>,
    pub force: bool,
    /// Explicit config file (None = discover from cwd)
    pub config_file: Option<PathBuf>,
    pub jobs: usize,
    pub verbose: bool,
    pub quiet: bool,
}

impl Config {
    /// Create Config from CLI arguments
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::from_cli_in(cli, cwd)
    }

    /// Create Config from CLI arguments, resolving against `cwd`
    pub fn from_cli_in(cli: Cli, cwd: PathBuf) -> anyhow::Result<Self> {
        let mut entities = Vec::with_capacity(cli.entities.len() + 1);

        // first value of each flag builds the single structured entity
        if let Some(block) = cli.block.first() {
            let entity = Entity::new(
                block,
                cli.elem.first().map(String::as_str),
                cli.modifier.first().map(String::as_str),
                cli.val.first().map(String::as_str),
            )?;
            entities.push(EntityInput::Entity(entity));
        } else if !cli.elem.is_empty() || !cli.modifier.is_empty() || !cli.val.is_empty() {
            anyhow::bail!("--elem, --mod and --val require --block");
        }

        entities.extend(cli.entities.into_iter().map(EntityInput::Shorthand));

        if entities.is_empty() {
            anyhow::bail!("No entities given");
        }

        let tech_filter = TechFilter {
            only: Some(cli.force_tech).filter(|t| !t.is_empty()),
            exclude: Some(cli.no_tech).filter(|t| !t.is_empty()),
        };

        let content = cli.content.map(|value| match value {
            Some(text) => ContentArg::Text(text),
            None => ContentArg::Stdin,
        });

        let config_file = cli
            .config
            .map(|path| if path.is_absolute() { path } else { cwd.join(path) });

        Ok(Config {
            cwd,
            entities,
            levels: cli.level,
            techs: cli.add_tech,
            tech_filter,
            content,
            force: cli.force,
            config_file,
            jobs: cli.jobs.max(1),
            verbose: cli.verbose,
            quiet: cli.quiet,
        })
    }
}
