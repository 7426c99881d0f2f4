//! skygauge-metrics — the describe/collect contract and its exposition.
//!
//! # Architecture
//!
//! ```text
//! Registry
//!   ├── register() ← one Arc<dyn Collector> per metric source
//!   ├── describe() → every static Desc, in registration order
//!   └── gather()   → runs each Collector::collect against a MetricSink
//!
//! Prometheus exposition
//!   └── render_text() → text/plain for the /metrics endpoint
//! ```

pub mod collector;
pub mod desc;
pub mod error;
pub mod exposition;
pub mod registry;
pub mod sink;

pub use collector::Collector;
pub use desc::{Desc, Sample, build_fq_name};
pub use error::{MetricsError, MetricsResult};
pub use exposition::{CONTENT_TYPE, render_text};
pub use registry::{CollectFailure, Gathered, Registry};
pub use sink::{MetricSink, SampleReceiver};
