//! Individual schema rules and their application.

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::array::to_array;
use crate::path::KeyPath;
use crate::{ConfigError, ConfigResult, tree};

/// Structural coercion applied by a rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum RuleKind {
    /// Coerce index-keyed objects into dense arrays.
    Array,
}

/// Default and coercion bound to one path.
///
/// # Examples
///
/// ```
/// use layered_config::schema::{apply_rule, SchemaRule};
/// use serde_json::json;
///
/// let rule = SchemaRule::new("sys.logging").stringified();
/// let mut tree = json!({"sys": {"logging": r#"{"enabled":true,"level":3}"#}});
/// apply_rule(&rule, &mut tree)?;
/// assert_eq!(tree["sys"]["logging"], json!({"enabled": true, "level": 3}));
/// # Ok::<_, std::sync::Arc<layered_config::ConfigError>>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaRule {
    /// Location the rule governs.
    pub path: KeyPath,
    /// Value used when nothing resolves at `path`.
    pub default: Option<Value>,
    /// The value is persisted as JSON text.
    pub stringified: bool,
    /// Optional structural coercion.
    pub kind: Option<RuleKind>,
}

impl SchemaRule {
    /// A rule for `path` with no default and no coercion.
    #[must_use]
    pub fn new(path: impl Into<KeyPath>) -> Self {
        Self {
            path: path.into(),
            default: None,
            stringified: false,
            kind: None,
        }
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Mark the value as persisted JSON text.
    #[must_use]
    pub const fn stringified(mut self) -> Self {
        self.stringified = true;
        self
    }

    /// Coerce the value into an array.
    #[must_use]
    pub const fn array(mut self) -> Self {
        self.kind = Some(RuleKind::Array);
        self
    }
}

/// Normalise `tree` at `rule.path`.
///
/// Steps, in order: parse stringified JSON, coerce to an array, fill the
/// default when nothing resolves, write the result back.
///
/// # Errors
///
/// Returns [`ConfigError::SchemaCoercion`] when a stringified value is not
/// valid JSON. `tree` is left untouched in that case.
pub fn apply_rule(rule: &SchemaRule, tree: &mut Value) -> ConfigResult<()> {
    let mut value = tree::get(tree, &rule.path).cloned();

    if rule.stringified {
        if let Some(Value::String(text)) = &value {
            let parsed = serde_json::from_str(text).map_err(|source| {
                Arc::new(ConfigError::SchemaCoercion {
                    path: rule.path.to_string(),
                    source,
                })
            })?;
            value = Some(parsed);
        }
    }

    if rule.kind == Some(RuleKind::Array) {
        value = value.map(to_array);
    }

    if value.is_none() {
        value.clone_from(&rule.default);
    }

    if let Some(resolved) = value {
        tree::set(tree, &rule.path, resolved);
    }
    Ok(())
}
