#![forbid(unsafe_code)]

//! Runtime engine for formwatch: drives a browser through journeys, classifies deviations,
//! and decides whether to alert.
//!
//! Document types, parsing and validation live in `formwatch-core`; the de-duplication store
//! lives in `formwatch-store`.

pub mod alert;
pub mod browser;
pub mod classify;
pub mod controller;
pub mod executor;
pub mod generate;
pub mod http;
pub mod notify;
pub mod retry;
pub mod secrets;

pub use crate::alert::{AlertContext, AlertDecision, AlertDispatcher, DispatchConfig, SuppressedReason};
pub use crate::browser::{BrowserError, BrowserLauncher, BrowserSession, ElementState, Page};
pub use crate::classify::{classify, Deviation, DeviationKind, FailureSignal, Severity};
pub use crate::controller::{RunConfig, RunController, RunReport, RunState, RunStatus};
pub use crate::executor::{JourneyExecutor, JourneyResult, StepOutcome, StepStatus};
