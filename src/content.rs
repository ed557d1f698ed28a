//! What gets written into a cell's target path.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

/// Relative file or directory name to nested content
pub type FileTree = BTreeMap<String, Content>;

/// File content, or a tree of files rooted at the target path
pub enum Content {
    Text(String),
    Stream(Box<dyn Read + Send>),
    Tree(FileTree),
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Content::Stream(_) => f.write_str("Stream(..)"),
            Content::Tree(tree) => f.debug_tuple("Tree").field(tree).finish(),
        }
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<FileTree> for Content {
    fn from(tree: FileTree) -> Self {
        Content::Tree(tree)
    }
}
