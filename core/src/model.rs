//! Column whitelists ("models").
//!
//! A [`Model`] lists the columns a query may touch. Filter conditions and
//! selected columns outside it are dropped; update keys outside it, and
//! insert rows whose width differs from it, are rejected.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

/// An ordered set of permitted column names.
///
/// # Examples
///
/// ```
/// use fluent_sqlite_core::Model;
///
/// let model = Model::new(["id", "name"]);
/// assert!(model.contains("name"));
/// assert!(!model.contains("email"));
/// assert_eq!(model.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model {
    columns: Vec<String>,
}

impl Model {
    /// Creates a model from column names, keeping their order.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a model from a JSON array or object of column names.
    ///
    /// `null` and empty collections yield `None`, which clears the
    /// whitelist. Object models use their values as column names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidModelEntry`] naming the index
    /// or key of the first non-string entry, or
    /// [`ConfigurationError::InvalidModel`] for scalar descriptors.
    ///
    /// # Examples
    ///
    /// ```
    /// use fluent_sqlite_core::{ConfigurationError, Model};
    /// use serde_json::json;
    ///
    /// let model = Model::from_json(&json!(["id", "name"])).unwrap().unwrap();
    /// assert_eq!(model.columns(), ["id", "name"]);
    ///
    /// assert_eq!(Model::from_json(&json!([])).unwrap(), None);
    ///
    /// let err = Model::from_json(&json!(["id", 3])).unwrap_err();
    /// assert_eq!(err, ConfigurationError::InvalidModelEntry { key: "1".into() });
    /// ```
    pub fn from_json(json: &serde_json::Value) -> Result<Option<Self>> {
        let entries: Vec<(String, &serde_json::Value)> = match json {
            serde_json::Value::Null => return Ok(None),
            serde_json::Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            serde_json::Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            other => return Err(ConfigurationError::InvalidModel(other.to_string())),
        };

        let mut columns = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            match entry.as_str() {
                Some(column) => columns.push(column.to_string()),
                None => return Err(ConfigurationError::InvalidModelEntry { key }),
            }
        }

        Ok(Some(Self::new(columns)).filter(|model| !model.is_empty()))
    }

    /// Returns `true` if `column` is permitted.
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Permitted columns in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Model {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_null_clears() {
        assert_eq!(Model::from_json(&json!(null)).unwrap(), None);
        assert_eq!(Model::from_json(&json!({})).unwrap(), None);
    }

    #[test]
    fn test_from_json_object_uses_values() {
        let model = Model::from_json(&json!({"first": "id", "second": "name"}))
            .unwrap()
            .unwrap();
        assert_eq!(model.columns(), ["id", "name"]);
    }

    #[test]
    fn test_from_json_reports_offending_key() {
        let err = Model::from_json(&json!({"ok": "id", "bad": null})).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvalidModelEntry {
                key: "bad".to_string()
            }
        );
    }

    #[test]
    fn test_from_json_rejects_scalar() {
        assert!(matches!(
            Model::from_json(&json!("id")),
            Err(ConfigurationError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_deserialize_as_plain_list() {
        let model: Model = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert!(model.contains("a"));
        assert_eq!(model.len(), 2);
    }
}
