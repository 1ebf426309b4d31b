#![forbid(unsafe_code)]

//! Journey document model for formwatch.
//!
//! A journey is an ordered list of [`StepDefinition`]s: each step performs one action against a
//! live form and names the state the page must reach afterwards. This crate only parses and
//! validates that description; driving a browser lives in `formwatch-exec`.

pub mod error;
pub mod parser;
pub mod types;
pub mod validate;

pub use crate::error::{ParseError, ValidationError, Violation};
pub use crate::parser::{parse_document_str, DocumentFormat, ParsedDocument};
pub use crate::types::{
    Action, ActionKind, Expectation, ExpectationKind, GeneratorKind, InputValue, Journey,
    MonitorDocument, Settings, StepDefinition, TextSource,
};
pub use crate::validate::{validate_document, Validate};
