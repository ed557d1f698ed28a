use std::fs::{self, File};
use std::io::{self, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::content::{Content, FileTree};
use crate::error::{CreateError, Result};

/// Write behaviour shared by every cell of one invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Overwrite files that already exist
    pub force_rewrite: bool,
    /// Suppress the "already exists" notice
    pub no_warn: bool,
}

/// Create `path` with `content` unless it already exists.
///
/// Existing files are left untouched (and reported) unless `force_rewrite`
/// is set. Tree content is written below `path` as a directory.
pub fn materialize(path: &Path, content: Content, options: &WriteOptions) -> Result<PathBuf> {
    write_entry(path, content, options)?;
    Ok(path.to_path_buf())
}

/// Write every entry of `tree` below `root`, siblings in parallel.
///
/// Returns the names written or confirmed, relative to `root`. Fails if any
/// sibling fails; siblings that already succeeded are kept.
pub fn materialize_tree(tree: FileTree, root: &Path, options: &WriteOptions) -> Result<Vec<String>> {
    // every sibling runs to completion before the first error is reported
    let results: Vec<Result<Vec<String>>> = tree
        .into_par_iter()
        .map(|(name, content)| {
            let names = match write_entry(&root.join(&name), content, options)? {
                None => vec![name],
                Some(children) => children
                    .into_iter()
                    .map(|child| format!("{name}/{child}"))
                    .collect(),
            };
            Ok(names)
        })
        .collect();

    let mut written = Vec::new();
    for result in results {
        written.extend(result?);
    }
    Ok(written)
}

/// `None` for a single file, the relative names below `path` for a tree
fn write_entry(path: &Path, content: Content, options: &WriteOptions) -> Result<Option<Vec<String>>> {
    let mut reader: Box<dyn Read + Send> = match content {
        Content::Tree(tree) => {
            ensure_dir(path)?;
            let created = materialize_tree(tree, path, options)?;
            debug!(path = %path.display(), files = created.len(), "wrote tree");
            return Ok(Some(created));
        }
        Content::Text(text) => Box::new(Cursor::new(text.into_bytes())),
        Content::Stream(reader) => reader,
    };

    if !options.force_rewrite && path.exists() {
        if !options.no_warn {
            info!("File {} already exists.", path.display());
        }
        return Ok(None);
    }

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let file = File::create(path).map_err(|e| CreateError::write(path, e))?;
    let mut writer = BufWriter::new(file);
    io::copy(&mut reader, &mut writer).map_err(|e| CreateError::write(path, e))?;
    writer.flush().map_err(|e| CreateError::write(path, e))?;

    debug!(path = %path.display(), "wrote file");
    Ok(None)
}

/// `create_dir_all`, treating "already exists" as success
fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        // lost a race with a sibling creating the same directory
        Err(_) if dir.is_dir() => Ok(()),
        Err(e) => Err(CreateError::create_dir(dir, e)),
    }
}
