//! Fact package supplied to the reasoning service
//!
//! A [`FactPackage`] is the complete, closed world an opinion may reason
//! about. The validator later treats any reference outside it as a grounding
//! violation, so every field the opinion could legitimately cite must be
//! present here before the provider is called.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single typed fact value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for FactValue {
    fn from(value: f64) -> Self {
        FactValue::Number(value)
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        FactValue::Text(value.to_string())
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        FactValue::Flag(value)
    }
}

/// Ordered map of field id to fact value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactPackage {
    fields: BTreeMap<String, FactValue>,
}

impl FactPackage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FactValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FactValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FactValue> {
        self.fields.get(field)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        match self.fields.get(field)? {
            FactValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.fields.get(field)? {
            FactValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        match self.fields.get(field)? {
            FactValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &FactValue)> {
        self.fields.iter()
    }

    /// Does a field hold a value matching `value` (numbers within `tol`)?
    pub fn matches(&self, field: &str, value: &FactValue, tol: f64) -> bool {
        match (self.fields.get(field), value) {
            (Some(FactValue::Number(have)), FactValue::Number(want)) => (have - want).abs() <= tol,
            (Some(FactValue::Text(have)), FactValue::Text(want)) => have == want,
            (Some(FactValue::Flag(have)), FactValue::Flag(want)) => have == want,
            _ => false,
        }
    }

    /// Is any numeric fact within `tol` of `value`?
    pub fn contains_number(&self, value: f64, tol: f64) -> bool {
        self.fields.values().any(|v| match v {
            FactValue::Number(n) => (n - value).abs() <= tol,
            _ => false,
        })
    }

    /// Does any text fact contain `phrase` (case-insensitive)?
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        let needle = phrase.to_lowercase();
        self.fields.values().any(|v| match v {
            FactValue::Text(s) => s.to_lowercase().contains(&needle),
            _ => false,
        })
    }
}
