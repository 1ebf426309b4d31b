//! Browser collaborator: the only way the monitor touches a live page.

mod chromium;
mod proxy;
mod types;

use std::path::Path;

use async_trait::async_trait;

pub use chromium::{ChromiumConfig, ChromiumLauncher};
pub use proxy::ProxyPool;
pub use types::{BrowserError, ElementState};

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Starts a fresh browser engine. Every journey attempt gets its own session.
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Opens a page and navigates it to `url`, returning once the document has loaded.
    async fn new_page(&self, url: &str) -> Result<Box<dyn Page>, BrowserError>;

    async fn close(&self) -> Result<(), BrowserError>;
}

#[async_trait]
pub trait Page: Send + Sync {
    async fn click(&self, selector: &str) -> Result<(), BrowserError>;

    /// Replaces the field's value, firing the same input/change events a user would.
    async fn fill(&self, selector: &str, value: &str) -> Result<(), BrowserError>;

    async fn select_option(&self, selector: &str, value: &str) -> Result<(), BrowserError>;

    /// Snapshot of the first element matching `selector`. A missing element is not an error;
    /// it yields [`ElementState::absent`].
    async fn locate(&self, selector: &str) -> Result<ElementState, BrowserError>;

    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError>;
}
