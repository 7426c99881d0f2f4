//! skygauge-rollout — effective rollout policy of a node pool.
//!
//! A node pool is rolled in batches with a pause between them. Both values
//! come from annotations, looked up on the node pool first, then on its
//! owning cluster, then from built-in defaults.
//!
//! # Components
//!
//! - **`duration`** — ISO-8601 durations applied on the calendar
//! - **`policy`** — batch size interpretation and the numeric policy values
//! - **`resolver`** — the annotation fallback chain

pub mod duration;
pub mod error;
pub mod policy;
pub mod resolver;

pub use duration::IsoDuration;
pub use error::{PolicyError, PolicyResult};
pub use policy::{BatchSize, NodePoolPolicy, PolicyValues, policy_values};
pub use resolver::{
    ANNOTATION_SOURCES, AnnotationSource, DEFAULT_BATCH_SIZE, DEFAULT_PAUSE_TIME, RolloutSettings,
    resolve, resolve_settings, select_owning_cluster,
};
