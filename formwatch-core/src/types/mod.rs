mod action;
mod common;
mod document;
mod expectation;
mod journey;
mod settings;
mod step;

pub use action::{Action, ActionKind, GeneratorKind, InputValue};
pub use common::Extensions;
pub use document::{Info, MonitorDocument};
pub use expectation::{Expectation, ExpectationKind, TextSource};
pub use journey::Journey;
pub use settings::Settings;
pub use step::StepDefinition;
