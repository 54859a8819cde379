use std::fmt;

use tracing::Level;

/// A named log stream with its own file.
///
/// `default` and `error` are always known; any other name is a custom
/// category that must be registered before it gets a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Default,
    Error,
    Custom(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Default => "default",
            Category::Error => "error",
            Category::Custom(name) => name,
        }
    }

    /// Severity a message in this category is emitted at.
    pub fn level(&self) -> Level {
        match self {
            Category::Error => Level::ERROR,
            Category::Default => Level::DEBUG,
            Category::Custom(_) => Level::INFO,
        }
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        match name {
            "default" => Category::Default,
            "error" => Category::Error,
            other => Category::Custom(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        match name.as_str() {
            "default" => Category::Default,
            "error" => Category::Error,
            _ => Category::Custom(name),
        }
    }
}

impl From<&Category> for Category {
    fn from(category: &Category) -> Self {
        category.clone()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_names_map_to_variants() {
        assert_eq!(Category::from("default"), Category::Default);
        assert_eq!(Category::from("error"), Category::Error);
        assert_eq!(Category::from("error".to_string()), Category::Error);
        assert_eq!(
            Category::from("audit"),
            Category::Custom("audit".to_string())
        );
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(Category::Error.level(), Level::ERROR);
        assert_eq!(Category::Default.level(), Level::DEBUG);
        assert_eq!(Category::from("payments").level(), Level::INFO);
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(Category::Default.to_string(), "default");
        assert_eq!(Category::from("jobs").to_string(), "jobs");
    }
}
