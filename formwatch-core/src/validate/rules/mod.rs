pub(crate) mod common;
pub(crate) mod document;
pub(crate) mod expectation;
pub(crate) mod journey;
pub(crate) mod settings;
pub(crate) mod step;
