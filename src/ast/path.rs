//! Object paths such as `file:hashes.'SHA-256'` or `email-message:to_refs[*].value`

use std::fmt;

use super::values::write_quoted;

/// List access inside a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListIndex {
    /// `[3]`, `[-1]`
    Position(i64),
    /// `[*]`: any element
    Any,
}

/// A single step from the object root towards the tested property
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathComponent {
    /// Bare property name: `.name`
    Property(String),
    /// Quoted dictionary key: `.'SHA-256'`
    Key(String),
    /// List element: `[0]`, `[*]`
    Index(ListIndex),
}

impl PathComponent {
    /// The property or key name, if this step has one
    pub fn name(&self) -> Option<&str> {
        match self {
            PathComponent::Property(name) | PathComponent::Key(name) => Some(name),
            PathComponent::Index(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    pub object_type: String,
    pub components: Vec<PathComponent>,
}

impl ObjectPath {
    pub fn new(object_type: impl Into<String>, components: Vec<PathComponent>) -> Self {
        Self {
            object_type: object_type.into(),
            components,
        }
    }

    /// Dotted property names, ignoring indices: `file:parent_directory_ref.path`
    /// gives `["parent_directory_ref", "path"]`
    pub fn property_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.components.iter().filter_map(PathComponent::name)
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.object_type)?;
        for (i, component) in self.components.iter().enumerate() {
            match component {
                PathComponent::Property(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathComponent::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    write_quoted(f, key)?;
                }
                PathComponent::Index(ListIndex::Position(n)) => write!(f, "[{}]", n)?,
                PathComponent::Index(ListIndex::Any) => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}
