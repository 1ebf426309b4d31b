use std::fmt;

/// What a step does to the page before its expectation is polled.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    FillField { selector: String, value: InputValue },
    Click { selector: String },
    SelectOption { selector: String, value: InputValue },
    WaitOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    FillField,
    Click,
    SelectOption,
    WaitOnly,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::FillField => "fill-field",
            ActionKind::Click => "click",
            ActionKind::SelectOption => "select-option",
            ActionKind::WaitOnly => "wait-only",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::FillField { .. } => ActionKind::FillField,
            Action::Click { .. } => ActionKind::Click,
            Action::SelectOption { .. } => ActionKind::SelectOption,
            Action::WaitOnly => ActionKind::WaitOnly,
        }
    }

    pub fn selector(&self) -> Option<&str> {
        match self {
            Action::FillField { selector, .. }
            | Action::Click { selector }
            | Action::SelectOption { selector, .. } => Some(selector),
            Action::WaitOnly => None,
        }
    }

    pub fn input(&self) -> Option<&InputValue> {
        match self {
            Action::FillField { value, .. } | Action::SelectOption { value, .. } => Some(value),
            Action::Click { .. } | Action::WaitOnly => None,
        }
    }
}

/// Value typed or selected by an action.
///
/// Literal strings are used as-is; generated values are produced fresh for every journey
/// attempt; secret values are looked up through a secrets provider and never logged.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Literal(String),
    Generated { generate: GeneratorKind },
    Secret { secret: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratorKind {
    Coupon,
}

impl GeneratorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorKind::Coupon => "coupon",
        }
    }
}
