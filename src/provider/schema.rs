//! Schema declarations for the provider, its resource and data source.
//!
//! Schemas are plain data: the host prints them and the planner consults
//! the plan modifiers to decide between an in-place update and a
//! replacement.

use serde::Serialize;
use std::collections::BTreeMap;

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// UTF-8 string.
    String,
    /// 64-bit signed integer.
    Int64,
}

/// Behaviour applied to an attribute while planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanModifier {
    /// A change to the attribute destroys and recreates the resource.
    RequiresReplace,
    /// A computed value is carried over from prior state instead of being
    /// shown as unknown.
    UseStateForUnknown,
}

/// A single attribute declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Value type.
    #[serde(rename = "type")]
    pub kind: AttributeType,
    /// Markdown description.
    pub description: &'static str,
    /// Must be set in configuration.
    pub required: bool,
    /// May be set in configuration.
    pub optional: bool,
    /// Set by the provider.
    pub computed: bool,
    /// Hidden from output.
    pub sensitive: bool,
    /// Plan modifiers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
}

/// Schema of a provider, resource or data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// Markdown description.
    pub description: &'static str,
    /// Attributes by name.
    pub attributes: BTreeMap<&'static str, Attribute>,
}

/// Every schema the provider exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSchema {
    /// Provider configuration schema.
    pub provider: Schema,
    /// Resource schemas by type name.
    pub resources: BTreeMap<String, Schema>,
    /// Data source schemas by type name.
    pub data_sources: BTreeMap<String, Schema>,
}

impl Attribute {
    const fn new(kind: AttributeType, description: &'static str) -> Self {
        Self {
            kind,
            description,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            plan_modifiers: Vec::new(),
        }
    }

    /// A string that must be configured.
    #[must_use]
    pub const fn required_string(description: &'static str) -> Self {
        let mut attr = Self::new(AttributeType::String, description);
        attr.required = true;
        attr
    }

    /// A string that may be configured.
    #[must_use]
    pub const fn optional_string(description: &'static str) -> Self {
        let mut attr = Self::new(AttributeType::String, description);
        attr.optional = true;
        attr
    }

    /// A string set by the provider.
    #[must_use]
    pub const fn computed_string(description: &'static str) -> Self {
        let mut attr = Self::new(AttributeType::String, description);
        attr.computed = true;
        attr
    }

    /// An integer that may be configured.
    #[must_use]
    pub const fn optional_int64(description: &'static str) -> Self {
        let mut attr = Self::new(AttributeType::Int64, description);
        attr.optional = true;
        attr
    }

    /// An integer set by the provider.
    #[must_use]
    pub const fn computed_int64(description: &'static str) -> Self {
        let mut attr = Self::new(AttributeType::Int64, description);
        attr.computed = true;
        attr
    }

    /// Marks the attribute as sensitive.
    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Adds a plan modifier.
    #[must_use]
    pub fn with_plan_modifier(mut self, modifier: PlanModifier) -> Self {
        self.plan_modifiers.push(modifier);
        self
    }

    /// Returns true if the attribute carries the given modifier.
    #[must_use]
    pub fn has_plan_modifier(&self, modifier: PlanModifier) -> bool {
        self.plan_modifiers.contains(&modifier)
    }
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub const fn new(description: &'static str) -> Self {
        Self {
            description,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    /// Looks up an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Returns true if changing `name` forces a replacement.
    #[must_use]
    pub fn requires_replace(&self, name: &str) -> bool {
        self.attribute(name)
            .is_some_and(|a| a.has_plan_modifier(PlanModifier::RequiresReplace))
    }

    /// Names of attributes that must be configured.
    pub fn required_attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes
            .iter()
            .filter(|(_, a)| a.required)
            .map(|(name, _)| *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_replace_lookup() {
        let schema = Schema::new("test")
            .with_attribute(
                "name",
                Attribute::required_string("Name")
                    .with_plan_modifier(PlanModifier::RequiresReplace),
            )
            .with_attribute("size", Attribute::optional_int64("Size"));

        assert!(schema.requires_replace("name"));
        assert!(!schema.requires_replace("size"));
        assert!(!schema.requires_replace("missing"));
        assert_eq!(schema.required_attributes().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_serializes_type_and_modifiers() {
        let attr = Attribute::computed_string("Id")
            .with_plan_modifier(PlanModifier::UseStateForUnknown);
        let json = serde_json::to_value(&attr).unwrap();
        assert_eq!(json["type"], "string");
        assert_eq!(json["plan_modifiers"][0], "use_state_for_unknown");
        assert_eq!(json["computed"], true);
    }
}
