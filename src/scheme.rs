//! Directory layouts mapping an (entity, tech) pair to a path under a level.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::entity::Entity;
use crate::naming::Naming;

/// Level layout scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// `block/__elem/_mod/block__elem_mod_val.tech`
    #[default]
    Nested,
    /// `block__elem_mod_val.tech`
    Flat,
}

impl Scheme {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Nested => "nested",
            Scheme::Flat => "flat",
        }
    }

    /// Relative path of the file holding `tech` for `entity`
    pub fn path(&self, entity: &Entity, tech: &str, naming: &Naming) -> PathBuf {
        let file_name = format!("{}.{}", naming.stringify(entity), tech);

        match self {
            Scheme::Flat => PathBuf::from(file_name),
            Scheme::Nested => {
                let mut path = PathBuf::from(entity.block_name());
                if let Some(elem) = entity.elem() {
                    path.push(format!("{}{}", naming.elem(), elem));
                }
                if let Some(mod_name) = entity.mod_name() {
                    path.push(format!("{}{}", naming.mod_name(), mod_name));
                }
                path.push(file_name);
                path
            }
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ModVal;
    use std::path::Path;

    fn elem_mod() -> Entity {
        Entity::block("b")
            .with_elem("e")
            .with_mod("m", ModVal::Value("v".to_string()))
    }

    #[test]
    fn test_nested_block() {
        let p = Scheme::Nested.path(&Entity::block("b"), "css", &Naming::origin());
        assert_eq!(p, Path::new("b/b.css"));
    }

    #[test]
    fn test_nested_elem_mod() {
        let p = Scheme::Nested.path(&elem_mod(), "css", &Naming::origin());
        assert_eq!(p, Path::new("b/__e/_m/b__e_m_v.css"));
    }

    #[test]
    fn test_nested_block_bool_mod() {
        let e = Entity::block("b").with_mod("m", ModVal::Flag);
        let p = Scheme::Nested.path(&e, "deps.js", &Naming::origin());
        assert_eq!(p, Path::new("b/_m/b_m.deps.js"));
    }

    #[test]
    fn test_nested_custom_naming() {
        let naming = Naming::new("-", "--", "_");
        let p = Scheme::Nested.path(&elem_mod(), "css", &naming);
        assert_eq!(p, Path::new("b/-e/--m/b-e--m_v.css"));
    }

    #[test]
    fn test_flat() {
        let p = Scheme::Flat.path(&elem_mod(), "css", &Naming::origin());
        assert_eq!(p, Path::new("b__e_m_v.css"));
    }

    #[test]
    fn test_path_is_deterministic() {
        let naming = Naming::origin();
        let first = Scheme::Nested.path(&elem_mod(), "js", &naming);
        for _ in 0..10 {
            assert_eq!(Scheme::Nested.path(&elem_mod(), "js", &naming), first);
        }
    }

    #[test]
    fn test_scheme_deserialize() {
        let s: Scheme = serde_json::from_str(r#""nested""#).unwrap();
        assert_eq!(s, Scheme::Nested);
        assert_eq!(Scheme::default().to_string(), "nested");
        assert!(serde_json::from_str::<Scheme>(r#""tree""#).is_err());
    }
}
