//! BEM entity value types.
//!
//! An [`Entity`] addresses a block, an element, or a modifier of either.
//! Entities are immutable once built and compare by their field tuple.

use std::fmt;

use crate::error::{CreateError, Result};

/// Modifier value: either a named value or a boolean flag (`true`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModVal {
    /// Boolean modifier, e.g. `b_disabled`
    Flag,
    /// Key-value modifier, e.g. `b_theme_dark`
    Value(String),
}

impl ModVal {
    /// String form used by templates; flags render as `true`
    pub fn as_str(&self) -> &str {
        match self {
            ModVal::Flag => "true",
            ModVal::Value(v) => v,
        }
    }
}

impl fmt::Display for ModVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Modifier name with its value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Modifier {
    pub name: String,
    pub val: ModVal,
}

/// A block, element, block modifier or element modifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    block: String,
    elem: Option<String>,
    modifier: Option<Modifier>,
}

impl Entity {
    /// Block entity
    pub fn block(name: impl Into<String>) -> Self {
        Self {
            block: name.into(),
            elem: None,
            modifier: None,
        }
    }

    /// Build an entity from loose descriptor fields.
    ///
    /// A modifier name without a value yields a boolean modifier; a value
    /// without a name is rejected.
    pub fn new(
        block: &str,
        elem: Option<&str>,
        mod_name: Option<&str>,
        mod_val: Option<&str>,
    ) -> Result<Self> {
        if block.is_empty() {
            return Err(CreateError::InvalidEntity {
                reason: "block name is required".to_string(),
            });
        }

        let modifier = match (mod_name, mod_val) {
            (Some(name), val) if !name.is_empty() => Some(Modifier {
                name: name.to_string(),
                val: val
                    .filter(|v| !v.is_empty())
                    .map_or(ModVal::Flag, |v| ModVal::Value(v.to_string())),
            }),
            (_, Some(val)) => {
                return Err(CreateError::InvalidEntity {
                    reason: format!("modifier value '{val}' given without modifier name"),
                })
            }
            _ => None,
        };

        Ok(Self {
            block: block.to_string(),
            elem: elem.filter(|e| !e.is_empty()).map(str::to_string),
            modifier,
        })
    }

    /// Same entity addressed as an element
    pub fn with_elem(mut self, elem: impl Into<String>) -> Self {
        self.elem = Some(elem.into());
        self
    }

    /// Same entity with a modifier attached
    pub fn with_mod(mut self, name: impl Into<String>, val: ModVal) -> Self {
        self.modifier = Some(Modifier {
            name: name.into(),
            val,
        });
        self
    }

    #[inline]
    pub fn block_name(&self) -> &str {
        &self.block
    }

    #[inline]
    pub fn elem(&self) -> Option<&str> {
        self.elem.as_deref()
    }

    #[inline]
    pub fn modifier(&self) -> Option<&Modifier> {
        self.modifier.as_ref()
    }

    #[inline]
    pub fn mod_name(&self) -> Option<&str> {
        self.modifier.as_ref().map(|m| m.name.as_str())
    }

    #[inline]
    pub fn mod_val(&self) -> Option<&ModVal> {
        self.modifier.as_ref().map(|m| &m.val)
    }

    /// The entity without its modifier (block or element)
    pub fn without_mod(&self) -> Self {
        Self {
            block: self.block.clone(),
            elem: self.elem.clone(),
            modifier: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_entity_new_block() {
        let e = Entity::new("b", None, None, None).unwrap();
        assert_eq!(e, Entity::block("b"));
        assert!(e.elem().is_none());
        assert!(e.modifier().is_none());
    }

    #[test]
    fn test_entity_new_mod_without_val_is_flag() {
        let e = Entity::new("b", None, Some("disabled"), None).unwrap();
        assert_eq!(e.mod_name(), Some("disabled"));
        assert_eq!(e.mod_val(), Some(&ModVal::Flag));
    }

    #[test]
    fn test_entity_new_val_without_mod_rejected() {
        let result = Entity::new("b", None, None, Some("v"));
        assert!(matches!(result, Err(CreateError::InvalidEntity { .. })));
    }

    #[test]
    fn test_entity_new_empty_block_rejected() {
        assert!(Entity::new("", Some("e"), None, None).is_err());
    }

    #[test]
    fn test_entity_builders() {
        let e = Entity::block("b")
            .with_elem("e")
            .with_mod("m", ModVal::Value("v".to_string()));
        assert_eq!(e.block_name(), "b");
        assert_eq!(e.elem(), Some("e"));
        assert_eq!(e.mod_val().map(ModVal::as_str), Some("v"));
        assert_eq!(e.without_mod(), Entity::block("b").with_elem("e"));
    }

    #[test]
    fn test_entity_hash_by_value() {
        let mut set = HashSet::new();
        set.insert(Entity::block("b").with_elem("e"));
        set.insert(Entity::new("b", Some("e"), None, None).unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_mod_val_display() {
        assert_eq!(ModVal::Flag.to_string(), "true");
        assert_eq!(ModVal::Value("dark".to_string()).to_string(), "dark");
    }
}
