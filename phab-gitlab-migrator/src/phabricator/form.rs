//! Conduit form parameters.
//!
//! Conduit only accepts nested arguments in PHP's bracketed form encoding
//! (`constraints[statuses][0]=open`), so parameters are flattened here before
//! being handed to reqwest as a plain form.

use super::models::CursorToken;

/// Flattened Conduit call parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConduitParams {
    pairs: Vec<(String, String)>,
}

impl ConduitParams {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level parameter.
    #[must_use]
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.pairs.push((key.to_string(), value.into()));
        self
    }

    /// Adds a list constraint: `constraints[<name>][<i>]=<value>`.
    #[must_use]
    pub fn constraint<V: ToString>(mut self, name: &str, values: &[V]) -> Self {
        for (index, value) in values.iter().enumerate() {
            self.pairs.push((
                format!("constraints[{name}][{index}]"),
                value.to_string(),
            ));
        }
        self
    }

    /// Requests an attachment: `attachments[<name>]=1`.
    #[must_use]
    pub fn attachment(mut self, name: &str) -> Self {
        self.pairs.push((format!("attachments[{name}]"), "1".to_string()));
        self
    }

    /// Adds an edit transaction: `transactions[<i>][type]` / `[value]`.
    #[must_use]
    pub fn transaction(mut self, kind: &str, value: impl Into<String>) -> Self {
        let index = self
            .pairs
            .iter()
            .filter(|(key, _)| key.starts_with("transactions[") && key.ends_with("[type]"))
            .count();
        self.pairs
            .push((format!("transactions[{index}][type]"), kind.to_string()));
        self.pairs
            .push((format!("transactions[{index}][value]"), value.into()));
        self
    }

    /// Sets the paging cursor.
    #[must_use]
    pub fn after(self, cursor: Option<&CursorToken>) -> Self {
        match cursor {
            Some(cursor) => self.param("after", cursor.to_string()),
            None => self,
        }
    }

    /// Returns the flattened pairs with the API token prepended.
    #[must_use]
    pub fn with_token(&self, token: &str) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.pairs.len() + 1);
        pairs.push(("api.token".to_string(), token.to_string()));
        pairs.extend(self.pairs.iter().cloned());
        pairs
    }

    /// Returns the flattened pairs.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}
