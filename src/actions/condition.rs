//! Declared environment conditions.

/// A named condition on the environment (e.g. "running on a laptop").
///
/// Conditions are read from configuration and kept on the graph so they show
/// up in plans, but nothing evaluates them yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentCondition {
    /// Identifier of the condition.
    pub key: String,
    /// Free-form explanation.
    pub description: Option<String>,
}

impl EnvironmentCondition {
    /// Condition named `key`.
    #[must_use]
    pub fn new(key: impl Into<String>, description: Option<String>) -> Self {
        Self {
            key: key.into(),
            description,
        }
    }
}
