//! Content templates per tech.
//!
//! A tech is rendered with, in order: a template path configured for the
//! level or plugin, a file or directory named after the tech inside the
//! plugin's template folder, a built-in template, or an empty file.
//! `techsTemplates` may alias a tech to another template id.
//!
//! File templates are plain text with `{{entity}}`, `{{block}}`, `{{elem}}`,
//! `{{modName}}` and `{{modVal}}` placeholders. Directory templates become a
//! [`FileTree`]; placeholders are expanded in file names as well.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::content::{Content, FileTree};
use crate::entity::{Entity, ModVal};
use crate::error::{CreateError, Result};
use crate::level::Level;
use crate::naming::Naming;

type BuiltinFn = fn(&Entity, &Naming) -> String;

/// A content generator for one tech
#[derive(Debug, Clone)]
pub enum Template {
    Empty,
    Builtin(BuiltinFn),
    Text(String),
    Tree(TemplateTree),
}

pub type TemplateTree = BTreeMap<String, TemplateNode>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    File(String),
    Dir(TemplateTree),
}

impl Template {
    pub fn render(&self, entity: &Entity, naming: &Naming) -> Content {
        match self {
            Template::Empty => Content::Text(String::new()),
            Template::Builtin(f) => Content::Text(f(entity, naming)),
            Template::Text(text) => Content::Text(fill(text, entity, naming)),
            Template::Tree(tree) => Content::Tree(render_tree(tree, entity, naming)),
        }
    }
}

/// Source of templates for the creator
pub trait TemplateProvider: Send + Sync {
    fn template(&self, tech: &str, level: &Level) -> Result<Template>;
}

/// Templates from configured paths, falling back to the built-ins
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTemplates;

impl TemplateProvider for FsTemplates {
    fn template(&self, tech: &str, level: &Level) -> Result<Template> {
        let id = level
            .techs_templates
            .get(tech)
            .map(String::as_str)
            .unwrap_or(tech);

        if let Some(path) = level.templates.get(id) {
            return load(path);
        }

        if let Some(folder) = &level.template_folder {
            let candidate = folder.join(id);
            if candidate.exists() {
                return load(&candidate);
            }
        }

        Ok(builtin(id).map_or(Template::Empty, Template::Builtin))
    }
}

/// Load a template file or directory
pub fn load(path: &Path) -> Result<Template> {
    if path.is_dir() {
        return load_tree(path).map(Template::Tree);
    }

    fs::read_to_string(path)
        .map(Template::Text)
        .map_err(|source| CreateError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })
}

fn load_tree(root: &Path) -> Result<TemplateTree> {
    let mut tree = TemplateTree::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| CreateError::TemplateRead {
            path: root.to_path_buf(),
            source: io::Error::from(e),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let text = fs::read_to_string(entry.path()).map_err(|source| CreateError::TemplateRead {
            path: entry.path().to_path_buf(),
            source,
        })?;

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        insert_node(&mut tree, &parts, text);
    }

    Ok(tree)
}

fn insert_node(tree: &mut TemplateTree, parts: &[String], text: String) {
    match parts {
        [] => {}
        [name] => {
            tree.insert(name.clone(), TemplateNode::File(text));
        }
        [dir, rest @ ..] => {
            let node = tree
                .entry(dir.clone())
                .or_insert_with(|| TemplateNode::Dir(TemplateTree::new()));
            if let TemplateNode::Dir(sub) = node {
                insert_node(sub, rest, text);
            }
        }
    }
}

fn render_tree(tree: &TemplateTree, entity: &Entity, naming: &Naming) -> FileTree {
    tree.iter()
        .map(|(name, node)| {
            let content = match node {
                TemplateNode::File(text) => Content::Text(fill(text, entity, naming)),
                TemplateNode::Dir(sub) => Content::Tree(render_tree(sub, entity, naming)),
            };
            (fill(name, entity, naming), content)
        })
        .collect()
}

/// Expand placeholders in `text`
pub fn fill(text: &str, entity: &Entity, naming: &Naming) -> String {
    text.replace("{{entity}}", &naming.stringify(entity))
        .replace("{{block}}", entity.block_name())
        .replace("{{elem}}", entity.elem().unwrap_or(""))
        .replace("{{modName}}", entity.mod_name().unwrap_or(""))
        .replace("{{modVal}}", entity.mod_val().map_or("", ModVal::as_str))
}

/// Built-in template for a tech id
pub fn builtin(id: &str) -> Option<BuiltinFn> {
    match id {
        "css" => Some(css),
        "js" => Some(js),
        "deps.js" => Some(deps_js),
        "bemhtml.js" => Some(bemhtml_js),
        "bemtree.js" => Some(bemtree_js),
        _ => None,
    }
}

fn css(entity: &Entity, naming: &Naming) -> String {
    format!(".{} {{\n    \n}}\n", naming.stringify(entity))
}

fn deps_js(_: &Entity, _: &Naming) -> String {
    "({\n    shouldDeps: [\n        \n    ]\n})\n".to_string()
}

fn bemtree_js(entity: &Entity, _: &Naming) -> String {
    format!(
        "block('{}').content()(function() {{\n    return;\n}});\n",
        entity.block_name()
    )
}

/// JS literal for a modifier value: `true` or a quoted string
fn mod_val_literal(val: &ModVal) -> String {
    match val {
        ModVal::Flag => "true".to_string(),
        ModVal::Value(v) => format!("'{v}'"),
    }
}

fn bemhtml_js(entity: &Entity, _: &Naming) -> String {
    let mut head = format!("block('{}')", entity.block_name());

    let mod_part = entity.modifier().map(|m| {
        let method = if entity.elem().is_some() { "elemMod" } else { "mod" };
        format!(".{method}('{}', {})", m.name, mod_val_literal(&m.val))
    });

    if let Some(elem) = entity.elem() {
        head.push_str(&format!(".elem('{elem}')"));
    }
    if let Some(part) = mod_part {
        head.push_str(&part);
    }

    format!("{head}.content()(function() {{\n    return;\n}});\n")
}

/// `my-block__elem` becomes `MyBlockElem`
fn camel_case(name: &str, naming: &Naming) -> String {
    name.split(naming.elem())
        .flat_map(|part| part.split(naming.mod_name()))
        .flat_map(|part| part.split('-'))
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn js(entity: &Entity, naming: &Naming) -> String {
    let name = naming.stringify(&entity.without_mod());

    let head = match (entity.modifier(), entity.elem()) {
        (Some(m), _) => {
            let class = camel_case(&name, naming);
            format!(
                "modules.define('{name}', function(provide, {class}) {{\n\n\
                 provide({class}.declMod({{ modName: '{}', modVal: {} }}, {{\n",
                m.name,
                mod_val_literal(&m.val)
            )
        }
        (None, Some(elem)) => format!(
            "modules.define('{name}', ['i-bem-dom'], function(provide, bemDom) {{\n\n\
             provide(bemDom.declElem('{}', '{elem}', {{\n",
            entity.block_name()
        ),
        (None, None) => format!(
            "modules.define('{name}', ['i-bem-dom'], function(provide, bemDom) {{\n\n\
             provide(bemDom.declBlock(this.name, {{\n"
        ),
    };

    format!(
        "{head}    onSetMod: {{\n        js: {{\n            inited: function() {{\n                \n            }}\n        }}\n    }}\n}}));\n\n}});\n"
    )
}
