//! # BEM Create
//!
//! Scaffolds files for BEM entities (blocks, elements, modifiers) on
//! file-system levels.
//!
//! Entities are given as structured values or shorthand strings
//! (`blocks/b1__e1_m1.css`, `{b1,b2}.{css,js}`), placed on levels picked from
//! `.bemrc` configuration or the working directory, and expanded into one
//! file per tech. Files are rendered from templates and written in parallel.
//!
//! ## Features
//!
//! - Shorthand parsing with brace expansion and cwd-aware recovery
//! - Level bubbling, default levels and glob level patterns
//! - Configurable naming conventions and nested or flat layouts
//! - Text, directory-tree and built-in templates
//! - Parallel file creation using Rayon with isolated per-file failures
//!
//! ## Usage
//!
//! ```ignore
//! use bem_create::creator::{create, CreateOptions};
//! use bem_create::resolver::Context;
//! use bem_create::settings::Settings;
//! use bem_create::template::FsTemplates;
//!
//! let settings = Settings::discover(&cwd)?;
//! let ctx = Context { cwd: &cwd, config: &settings, templates: &FsTemplates };
//! let report = create(&["b1__e1.css".into()], &[], &[], CreateOptions::default(), &ctx)?;
//! ```

/// CLI configuration and argument parsing
pub mod config;

/// File content variants
pub mod content;

/// Creation orchestration over the cell matrix
pub mod creator;

/// Block, element and modifier value types
pub mod entity;

/// Error types for creation operations
pub mod error;

/// Brace expansion for shorthand strings
pub mod expand;

/// Level options and their merge rules
pub mod level;

/// Writing files and directory trees
pub mod materializer;

/// Naming conventions
pub mod naming;

/// Entity and level resolution
pub mod resolver;

/// File layout schemes
pub mod scheme;

/// `.bemrc` configuration
pub mod settings;

/// Tech list resolution
pub mod techs;

/// Template lookup and rendering
pub mod template;
