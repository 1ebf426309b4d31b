pub mod events;
mod journey;
pub mod metrics;
mod probe;
mod result;
mod step_runner;
mod types;
mod values;

pub use events::{
    CompositeEventSink, Event, EventSink, NoOpEventSink, StdoutEventSink, TracingEventSink,
};
pub use journey::JourneyExecutor;
pub use metrics::{MetricsCollector, MetricsEventSink, RunMetrics};
pub use probe::{DomProbe, ExpectationCheck, Observation, PollRecord};
pub use result::{ExecutionError, JourneyResult, Overall, StepOutcome, StepStatus};
pub use types::{AttemptContext, ExecutorConfig};
pub use values::{ResolvedValue, ResolvedValues, ValueError, ValueResolver, REDACTED};
