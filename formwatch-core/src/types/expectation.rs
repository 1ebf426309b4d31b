use std::fmt;

/// The page state that must hold after a step's action.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Expectation {
    ElementVisible {
        selector: String,
    },
    ElementTextEquals {
        selector: String,
        expected: String,
        #[serde(default, skip_serializing_if = "TextSource::is_default")]
        source: TextSource,
    },
    ElementTextMatchesPattern {
        selector: String,
        pattern: String,
        #[serde(default, skip_serializing_if = "TextSource::is_default")]
        source: TextSource,
    },
    ElementEnabled {
        selector: String,
    },
    ElementAbsent {
        selector: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpectationKind {
    ElementVisible,
    ElementTextEquals,
    ElementTextMatchesPattern,
    ElementEnabled,
    ElementAbsent,
}

impl ExpectationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpectationKind::ElementVisible => "element-visible",
            ExpectationKind::ElementTextEquals => "element-text-equals",
            ExpectationKind::ElementTextMatchesPattern => "element-text-matches-pattern",
            ExpectationKind::ElementEnabled => "element-enabled",
            ExpectationKind::ElementAbsent => "element-absent",
        }
    }
}

impl fmt::Display for ExpectationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rendering of an element a text expectation compares against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
    /// Rendered text content.
    #[default]
    Text,
    /// Current value of an input, select, or textarea.
    Value,
    /// Inner HTML, for messages whose markup (e.g. `<br>`) matters.
    Html,
}

impl TextSource {
    fn is_default(&self) -> bool {
        *self == TextSource::Text
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextSource::Text => "text",
            TextSource::Value => "value",
            TextSource::Html => "html",
        }
    }
}

impl Expectation {
    pub fn kind(&self) -> ExpectationKind {
        match self {
            Expectation::ElementVisible { .. } => ExpectationKind::ElementVisible,
            Expectation::ElementTextEquals { .. } => ExpectationKind::ElementTextEquals,
            Expectation::ElementTextMatchesPattern { .. } => {
                ExpectationKind::ElementTextMatchesPattern
            }
            Expectation::ElementEnabled { .. } => ExpectationKind::ElementEnabled,
            Expectation::ElementAbsent { .. } => ExpectationKind::ElementAbsent,
        }
    }

    pub fn selector(&self) -> &str {
        match self {
            Expectation::ElementVisible { selector }
            | Expectation::ElementTextEquals { selector, .. }
            | Expectation::ElementTextMatchesPattern { selector, .. }
            | Expectation::ElementEnabled { selector }
            | Expectation::ElementAbsent { selector } => selector,
        }
    }

    /// Human-readable statement of what should hold, used as a deviation's `expected` field.
    pub fn describe_expected(&self) -> String {
        match self {
            Expectation::ElementVisible { selector } => format!("`{selector}` visible"),
            Expectation::ElementTextEquals { expected, .. } => expected.clone(),
            Expectation::ElementTextMatchesPattern { pattern, .. } => {
                format!("text matching /{pattern}/")
            }
            Expectation::ElementEnabled { selector } => format!("`{selector}` enabled"),
            Expectation::ElementAbsent { selector } => format!("`{selector}` absent"),
        }
    }
}
