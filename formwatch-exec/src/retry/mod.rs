mod backoff;
mod config;
mod headers;

pub use backoff::backoff_delay;
pub use config::RetryConfig;
pub use headers::parse_retry_after;
