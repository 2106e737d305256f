//! String parameters attached to a grammar term (`@int(min=1, max=64)`).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::GrammarError;

/// Parameters of one grammar term, with typed accessors that report
/// [`GrammarError::InvalidParameter`] against the owning parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Params {
    #[serde(skip)]
    owner: String,
    #[serde(flatten)]
    values: BTreeMap<String, String>,
}

impl Params {
    /// Wrap `values` for the parser named `owner`.
    pub fn new(owner: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        Self {
            owner: owner.into(),
            values,
        }
    }

    /// Name of the parser these parameters belong to.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Raw value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether `key` was given.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// All parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `key` as a boolean (`true/false`, `yes/no`, `on/off`, `1/0`).
    pub fn flag(&self, key: &str) -> Result<Option<bool>, GrammarError> {
        self.typed(key, "expected true or false", |v| {
            match v.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            }
        })
    }

    /// `key` as a signed integer.
    pub fn int(&self, key: &str) -> Result<Option<i64>, GrammarError> {
        self.typed(key, "expected an integer", |v| v.parse().ok())
    }

    /// `key` as a finite floating-point number.
    pub fn number(&self, key: &str) -> Result<Option<f64>, GrammarError> {
        self.typed(key, "expected a number", |v| {
            v.parse::<f64>().ok().filter(|n| n.is_finite())
        })
    }

    /// `key` as a non-negative count.
    pub fn count(&self, key: &str) -> Result<Option<usize>, GrammarError> {
        self.typed(key, "expected a non-negative integer", |v| v.parse().ok())
    }

    /// `key` as a `|`-separated list. Empty entries are an error.
    pub fn list(&self, key: &str) -> Result<Option<Vec<String>>, GrammarError> {
        self.typed(key, "expected '|'-separated names", |v| {
            let items: Vec<String> = v.split('|').map(|s| s.trim().to_string()).collect();
            if items.iter().any(String::is_empty) {
                None
            } else {
                Some(items)
            }
        })
    }

    fn typed<T>(
        &self,
        key: &str,
        reason: &str,
        convert: impl FnOnce(&str) -> Option<T>,
    ) -> Result<Option<T>, GrammarError> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        convert(raw)
            .map(Some)
            .ok_or_else(|| GrammarError::invalid_parameter(&self.owner, key, raw, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        Params::new(
            "int",
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn typed_accessors() {
        let p = params(&[("min", "-3"), ("required", "no"), ("switch", "a|all")]);
        assert_eq!(p.int("min").unwrap(), Some(-3));
        assert_eq!(p.flag("required").unwrap(), Some(false));
        assert_eq!(
            p.list("switch").unwrap(),
            Some(vec!["a".to_string(), "all".to_string()])
        );
        assert_eq!(p.int("max").unwrap(), None);
    }

    #[test]
    fn bad_values_name_the_parser() {
        let p = params(&[("max", "lots"), ("switch", "a||b")]);
        let err = p.int("max").unwrap_err();
        assert_eq!(
            err,
            GrammarError::invalid_parameter("int", "max", "lots", "expected an integer")
        );
        assert!(p.list("switch").is_err());
    }

    #[test]
    fn non_finite_numbers_rejected() {
        assert!(params(&[("max", "inf")]).number("max").is_err());
        assert_eq!(params(&[("max", "2.5")]).number("max").unwrap(), Some(2.5));
    }
}
