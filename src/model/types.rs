use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use serde::Serialize;

use super::ModelError;

/// A typed parameter of a fluent, an action or a quantifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Parameter {
    pub name: String,
    pub ty: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "?{} - {}", self.name, self.ty)
    }
}

/// A named object of a user type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Object {
    pub name: String,
    pub ty: String,
}

impl Object {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.ty)
    }
}

#[derive(Clone, Debug, Serialize)]
struct TypeNode {
    name: String,
    parent: Option<usize>,
    /// Indices of this type and all its supertypes.
    #[serde(skip)]
    ancestors: HashSet<usize>,
}

/// Single-inheritance hierarchy of user types, stored as an arena.
///
/// A parent must be declared before its children, so the ancestor set of a new type is the
/// parent's ancestor set plus itself. Compatibility checks are then a single set lookup.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TypeHierarchy {
    nodes: Vec<TypeNode>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str, parent: Option<&str>) -> Result<(), ModelError> {
        if self.index.contains_key(name) {
            return Err(ModelError::DuplicateType(name.to_string()));
        }
        let id = self.nodes.len();
        let (parent, mut ancestors) = match parent {
            Some(p) => {
                let pid = self.id(p)?;
                (Some(pid), self.nodes[pid].ancestors.clone())
            }
            None => (None, HashSet::new()),
        };
        ancestors.insert(id);
        self.nodes.push(TypeNode {
            name: name.to_string(),
            parent,
            ancestors,
        });
        self.index.insert(name.to_string(), id);
        Ok(())
    }

    fn id(&self, name: &str) -> Result<usize, ModelError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn parent(&self, name: &str) -> Option<&str> {
        let id = self.index.get(name)?;
        self.nodes[*id]
            .parent
            .map(|p| self.nodes[p].name.as_str())
    }

    /// Returns true when an object of type `sub` may stand where `sup` is expected.
    /// Unknown types are never compatible.
    pub fn is_compatible(&self, sub: &str, sup: &str) -> bool {
        match (self.index.get(sub), self.index.get(sup)) {
            (Some(s), Some(p)) => self.nodes[*s].ancestors.contains(p),
            _ => false,
        }
    }

    pub fn is_hierarchical(&self) -> bool {
        self.nodes.iter().any(|n| n.parent.is_some())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logistics_types() -> TypeHierarchy {
        let mut types = TypeHierarchy::new();
        types.declare("locatable", None).unwrap();
        types.declare("location", None).unwrap();
        types.declare("vehicle", Some("locatable")).unwrap();
        types.declare("truck", Some("vehicle")).unwrap();
        types.declare("package", Some("locatable")).unwrap();
        types
    }

    #[test]
    fn test_subtype_is_compatible_with_all_ancestors() {
        let types = logistics_types();
        assert!(types.is_compatible("truck", "truck"));
        assert!(types.is_compatible("truck", "vehicle"));
        assert!(types.is_compatible("truck", "locatable"));
        assert!(!types.is_compatible("vehicle", "truck"));
        assert!(!types.is_compatible("package", "vehicle"));
        assert!(!types.is_compatible("location", "locatable"));
        assert!(!types.is_compatible("boat", "locatable"));
    }

    #[test]
    fn test_declare_checks_parent_and_duplicates() {
        let mut types = logistics_types();
        assert!(matches!(
            types.declare("plane", Some("aircraft")),
            Err(ModelError::UnknownType(t)) if t == "aircraft"
        ));
        assert!(matches!(
            types.declare("truck", None),
            Err(ModelError::DuplicateType(_))
        ));
        assert_eq!(types.parent("truck"), Some("vehicle"));
        assert_eq!(types.parent("location"), None);
        assert!(types.is_hierarchical());
        assert_eq!(types.len(), 5);
    }
}
