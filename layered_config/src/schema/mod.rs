//! Declarative defaults and coercions attached to tree paths.
//!
//! A schema is an ordered list of [`SchemaRule`]s. Rules are applied when
//! they are registered and again after every reload; they never run on
//! plain reads or writes.
//!
//! ```rust
//! use layered_config::schema::Schema;
//! use serde_json::json;
//!
//! let mut schema = Schema::default();
//! schema.extend(Schema::parse_descriptor(&json!({
//!     "sys.logging": true,
//!     "servers": {"type": "array"},
//! }))?);
//!
//! let mut tree = json!({"servers": {"1": "b", "0": "a", "name": "dropped"}});
//! schema.apply(&mut tree)?;
//! assert_eq!(tree, json!({"servers": ["a", "b"], "sys": {"logging": true}}));
//! # Ok::<_, std::sync::Arc<layered_config::ConfigError>>(())
//! ```

mod array;
mod rule;

pub use array::{MAX_SPARSE_INDEX, to_array};
pub use rule::{RuleKind, SchemaRule, apply_rule};

use serde::Deserialize;
use serde_json::Value;

use crate::diff::{Change, Diff};
use crate::path::KeyPath;
use crate::{ConfigError, ConfigResult, ConfigResultExt, tree};

/// Ordered collection of schema rules.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    rules: Vec<SchemaRule>,
}

/// Object form of a rule inside a descriptor. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct RuleDescriptor {
    #[serde(default, deserialize_with = "present")]
    default: Option<Value>,
    #[serde(default)]
    stringified: bool,
    #[serde(default, rename = "type")]
    kind: Option<RuleKind>,
}

/// Treat an explicit `null` default as a default of `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Schema {
    /// Build rules from a descriptor mapping dotted paths to rule objects.
    ///
    /// Object values are read as rule descriptors (`default`, `stringified`,
    /// `type`); any other value becomes the rule's default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSchemaDescriptor`] when `descriptor` is
    /// not an object or one of its rule objects is malformed.
    pub fn parse_descriptor(descriptor: &Value) -> ConfigResult<Vec<SchemaRule>> {
        let Value::Object(entries) = descriptor else {
            return Err(ConfigError::invalid_schema(format!(
                "expected an object of path rules, found {}",
                kind_name(descriptor)
            )));
        };

        entries
            .iter()
            .map(|(key, spec)| {
                let path = KeyPath::parse(key);
                if !spec.is_object() {
                    return Ok(SchemaRule::new(path).with_default(spec.clone()));
                }
                let parsed = RuleDescriptor::deserialize(spec)
                    .map_err(|err| ConfigError::invalid_schema(format!("rule '{key}': {err}")))?;
                Ok(SchemaRule {
                    path,
                    default: parsed.default,
                    stringified: parsed.stringified,
                    kind: parsed.kind,
                })
            })
            .collect()
    }

    /// Append a rule.
    pub fn push(&mut self, rule: SchemaRule) {
        self.rules.push(rule);
    }

    /// Append several rules, keeping their order.
    pub fn extend(&mut self, rules: impl IntoIterator<Item = SchemaRule>) {
        self.rules.extend(rules);
    }

    /// Registered rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[SchemaRule] {
        &self.rules
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule to `tree`, in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::SchemaCoercion`] encountered. `tree`
    /// may be partially normalised in that case; callers that need
    /// atomicity apply to a copy.
    pub fn apply(&self, tree: &mut Value) -> ConfigResult<()> {
        self.rules.iter().try_for_each(|rule| apply_rule(rule, tree))
    }

    /// Collapse changes beneath stringified rules into single writes.
    ///
    /// For every stringified rule whose path prefixes a change or removal,
    /// those entries are dropped. A removal of the rule path is added, then
    /// a change writing the JSON text of `working` at that path (when it
    /// still resolves).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if a value cannot be serialised.
    pub fn collapse_stringified(&self, diff: &mut Diff, working: &Value) -> ConfigResult<()> {
        for rule in self.rules.iter().filter(|rule| rule.stringified) {
            let covered = diff.changed.iter().any(|c| c.path.starts_with(&rule.path))
                || diff.removed.iter().any(|p| p.starts_with(&rule.path));
            if !covered {
                continue;
            }
            diff.changed.retain(|c| !c.path.starts_with(&rule.path));
            diff.removed.retain(|p| !p.starts_with(&rule.path));
            diff.removed.push(rule.path.clone());
            if let Some(value) = tree::get(working, &rule.path) {
                let text = serde_json::to_string(value).into_config()?;
                diff.changed.push(Change {
                    path: rule.path.clone(),
                    value: Value::String(text),
                });
            }
        }
        Ok(())
    }
}

const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests;
