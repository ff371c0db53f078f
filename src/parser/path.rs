//! Object paths
//!
//! Handles paths like:
//! - `file:name` → [Property("name")]
//! - `file:hashes.'SHA-256'` → [Property("hashes"), Key("SHA-256")]
//! - `email-message:to_refs[*].value` → [Property("to_refs"), Index(Any), Property("value")]

use pest::iterators::Pair;

use super::{children, next_child, unexpected_rule, Builder};
use crate::ast::{ListIndex, ObjectPath, PathComponent, StixValue};
use crate::error::{Error, ParseError};
use crate::grammar::Rule;

impl<'a> Builder<'a> {
    pub(super) fn object_path(&mut self, pair: Pair<'a, Rule>) -> Result<ObjectPath, Error> {
        let mut inner = children(pair);
        let object_type = next_child(&mut inner, "an object type")?.as_str().to_string();

        let mut components = Vec::new();
        for component in inner {
            components.push(match component.as_rule() {
                Rule::path_property => self.path_property(component)?,
                Rule::list_index => PathComponent::Index(self.list_index(component)?),
                _ => return Err(unexpected_rule(&component)),
            });
        }

        Ok(ObjectPath {
            object_type,
            components,
        })
    }

    /// A bare property name or a quoted key; keywords are plain names here
    fn path_property(&mut self, pair: Pair<'a, Rule>) -> Result<PathComponent, Error> {
        let property = next_child(&mut children(pair), "a property")?;
        match property.as_rule() {
            Rule::string_lit => match self.literal(&property)? {
                StixValue::String(key) => Ok(PathComponent::Key(key)),
                _ => Err(unexpected_rule(&property)),
            },
            Rule::property_name if property.as_str().contains('-') => {
                Err(ParseError::invalid_value(
                    self.token(&property)?,
                    "a property name without '-' (quote it, e.g. 'windows-pebinary-ext')",
                )
                .into())
            }
            Rule::property_name => Ok(PathComponent::Property(property.as_str().to_string())),
            _ => Err(unexpected_rule(&property)),
        }
    }

    fn list_index(&mut self, pair: Pair<'a, Rule>) -> Result<ListIndex, Error> {
        let index = next_child(&mut children(pair), "a list index")?;
        match index.as_rule() {
            Rule::asterisk => Ok(ListIndex::Any),
            Rule::int_lit => match self.literal(&index)? {
                StixValue::Int(n) => Ok(ListIndex::Position(n)),
                _ => Err(unexpected_rule(&index)),
            },
            _ => Err(unexpected_rule(&index)),
        }
    }
}
