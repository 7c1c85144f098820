use std::fmt;

use crate::{Error, Result};

/// Declared metadata of the charm under test.
///
/// Only the name is required. It becomes the owner segment of every user
/// event handle (`mycharm/on/start[0]`).
///
/// # Example
///
/// ```rust
/// use charmsim::CharmMeta;
///
/// let meta = CharmMeta::new("mycharm").with_summary("A test charm");
/// assert!(meta.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharmMeta {
    name: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    summary: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    description: Option<String>,
}

impl CharmMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: None,
            description: None,
        }
    }

    /// Parse metadata from JSON, e.g. `{"name": "mycharm"}`, and validate it.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    pub fn from_json(json: &str) -> Result<Self> {
        let meta: CharmMeta = serde_json::from_str(json)?;
        meta.validate()?;
        Ok(meta)
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Charm names are lowercase letters, digits and hyphens, starting with a
    /// letter and not ending with a hyphen.
    pub fn validate(&self) -> Result<()> {
        let name = self.name.as_str();
        let Some(first) = name.chars().next() else {
            return Err(Error::InvalidMeta("charm name is empty".into()));
        };
        if !first.is_ascii_lowercase() {
            return Err(Error::InvalidMeta(format!(
                "charm name '{name}' must start with a lowercase letter"
            )));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(Error::InvalidMeta(format!(
                "charm name '{name}' contains '{bad}'"
            )));
        }
        if name.ends_with('-') {
            return Err(Error::InvalidMeta(format!(
                "charm name '{name}' ends with a hyphen"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for CharmMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(summary) = &self.summary {
            write!(f, " ({summary})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        for name in ["mycharm", "my-charm", "k8s-operator2"] {
            assert!(CharmMeta::new(name).validate().is_ok(), "{name}");
        }
    }

    #[test]
    fn invalid_names() {
        for name in ["", "MyCharm", "2charm", "my_charm", "charm-"] {
            let err = CharmMeta::new(name).validate().unwrap_err();
            assert!(err.is_configuration(), "{name}: {err}");
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn from_json() {
        let meta = CharmMeta::from_json(r#"{"name": "mycharm", "summary": "test"}"#).unwrap();
        assert_eq!(meta.name(), "mycharm");
        assert_eq!(meta.summary(), Some("test"));
        assert_eq!(meta.description(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn from_json_rejects_bad_input() {
        assert!(matches!(
            CharmMeta::from_json(r#"{"summary": "no name"}"#),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            CharmMeta::from_json(r#"{"name": "Bad"}"#),
            Err(Error::InvalidMeta(_))
        ));
    }
}
