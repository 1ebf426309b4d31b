//! Run Controller: one monitoring cycle from browser launch to teardown.

mod report;
mod run;
mod screenshot;

pub use report::{RunReport, RunState, RunStatus};
pub use run::{RunConfig, RunController, RunError};
pub use screenshot::{screenshot_path, ScreenshotConfig, ScreenshotPolicy};
