//! Naming conventions: parse shorthand strings into entities and back.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::entity::{Entity, ModVal};

/// Characters allowed in a single name part (block, elem, mod name or value)
const WORD: &str = "[a-zA-Z0-9]+(?:-[a-zA-Z0-9]+)*";

/// Name part when a single hyphen is itself a delimiter
const PLAIN_WORD: &str = "[a-zA-Z0-9]+";

/// Delimiter set used to stringify and parse entities
///
/// The parse regex is compiled on first use and kept with the delimiters.
#[derive(Clone)]
pub struct Naming {
    elem: String,
    mod_name: String,
    mod_val: String,
    pattern: OnceLock<Option<Regex>>,
}

impl Default for Naming {
    fn default() -> Self {
        Self::origin()
    }
}

impl fmt::Debug for Naming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Naming")
            .field("elem", &self.elem)
            .field("mod_name", &self.mod_name)
            .field("mod_val", &self.mod_val)
            .finish()
    }
}

impl PartialEq for Naming {
    fn eq(&self, other: &Self) -> bool {
        self.delims() == other.delims()
    }
}

impl Eq for Naming {}

impl Hash for Naming {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.delims().hash(state);
    }
}

impl Naming {
    pub fn new(
        elem: impl Into<String>,
        mod_name: impl Into<String>,
        mod_val: impl Into<String>,
    ) -> Self {
        Self {
            elem: elem.into(),
            mod_name: mod_name.into(),
            mod_val: mod_val.into(),
            pattern: OnceLock::new(),
        }
    }

    /// `block__elem_mod_val`
    pub fn origin() -> Self {
        Self::new("__", "_", "_")
    }

    /// `block__elem--mod_val`
    pub fn two_dashes() -> Self {
        Self::new("__", "--", "_")
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "origin" => Some(Self::origin()),
            "two-dashes" => Some(Self::two_dashes()),
            _ => None,
        }
    }

    pub fn elem(&self) -> &str {
        &self.elem
    }

    pub fn mod_name(&self) -> &str {
        &self.mod_name
    }

    pub fn mod_val(&self) -> &str {
        &self.mod_val
    }

    fn delims(&self) -> (&str, &str, &str) {
        (&self.elem, &self.mod_name, &self.mod_val)
    }

    /// Render an entity as a class-like string
    pub fn stringify(&self, entity: &Entity) -> String {
        let mut out = entity.block_name().to_string();

        if let Some(elem) = entity.elem() {
            out.push_str(&self.elem);
            out.push_str(elem);
        }

        if let Some(modifier) = entity.modifier() {
            out.push_str(&self.mod_name);
            out.push_str(&modifier.name);
            if let ModVal::Value(val) = &modifier.val {
                out.push_str(&self.mod_val);
                out.push_str(val);
            }
        }

        out
    }

    /// Parse a string into an entity; `None` if it does not follow the convention
    pub fn parse(&self, input: &str) -> Option<Entity> {
        let re = self.regex()?;
        let caps = re.captures(input)?;

        let block = caps.get(1)?.as_str();
        let elem = caps.get(2).map(|m| m.as_str());
        let mod_name = caps.get(3).map(|m| m.as_str());
        let mod_val = caps.get(4).map(|m| m.as_str());

        Entity::new(block, elem, mod_name, mod_val).ok()
    }

    fn regex(&self) -> Option<&Regex> {
        self.pattern
            .get_or_init(|| {
                let pattern = format!(
                    "^({w})(?:{e}({w}))?(?:{m}({w})(?:{v}({w}))?)?$",
                    w = self.word_pattern(),
                    e = regex::escape(&self.elem),
                    m = regex::escape(&self.mod_name),
                    v = regex::escape(&self.mod_val),
                );
                Regex::new(&pattern).ok()
            })
            .as_ref()
    }

    fn word_pattern(&self) -> &'static str {
        let hyphen_delim = [&self.elem, &self.mod_name, &self.mod_val]
            .iter()
            .any(|d| d.as_str() == "-");
        if hyphen_delim {
            PLAIN_WORD
        } else {
            WORD
        }
    }
}

/// Naming as written in config: a preset name or explicit delimiters
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NamingSpec {
    Preset(String),
    Custom {
        #[serde(default)]
        preset: Option<String>,
        #[serde(default)]
        delims: Delims,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delims {
    pub elem: Option<String>,
    #[serde(rename = "mod")]
    pub modifier: Option<ModDelims>,
}

/// `"mod": "--"` sets the name delimiter only
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModDelims {
    Name(String),
    Full {
        name: Option<String>,
        val: Option<String>,
    },
}

impl NamingSpec {
    /// Resolve to concrete delimiters; unknown presets yield `None`
    pub fn to_naming(&self) -> Option<Naming> {
        match self {
            NamingSpec::Preset(name) => Naming::preset(name),
            NamingSpec::Custom { preset, delims } => {
                let base = match preset {
                    Some(name) => Naming::preset(name)?,
                    None => Naming::origin(),
                };
                let elem = delims.elem.clone().unwrap_or(base.elem);
                let (mod_name, mod_val) = match &delims.modifier {
                    Some(ModDelims::Name(name)) => (name.clone(), base.mod_val),
                    Some(ModDelims::Full { name, val }) => (
                        name.clone().unwrap_or(base.mod_name),
                        val.clone().unwrap_or(base.mod_val),
                    ),
                    None => (base.mod_name, base.mod_val),
                };
                Some(Naming::new(elem, mod_name, mod_val))
            }
        }
    }
}
