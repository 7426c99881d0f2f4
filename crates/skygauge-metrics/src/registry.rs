//! Collector registry.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::collector::Collector;
use crate::desc::{Desc, Sample};
use crate::error::{MetricsError, MetricsResult};
use crate::exposition::render_text;
use crate::sink::MetricSink;

/// A collector that failed during [`Registry::gather`].
#[derive(Debug)]
pub struct CollectFailure {
    pub collector: &'static str,
    pub error: anyhow::Error,
}

/// Result of one gather pass.
///
/// Samples emitted before a collector failed are kept, so a failed gather
/// may still carry samples.
#[derive(Debug, Default)]
pub struct Gathered {
    pub samples: Vec<Sample>,
    pub failures: Vec<CollectFailure>,
}

impl Gathered {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// One line per failure: `collector: error chain`.
    pub fn failure_report(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("{}: {:#}\n", f.collector, f.error))
            .collect()
    }
}

#[derive(Default)]
pub struct Registry {
    collectors: Vec<Arc<dyn Collector>>,
    names: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collector. Fails if one of its descriptors is already registered.
    pub fn register(&mut self, collector: Arc<dyn Collector>) -> MetricsResult<()> {
        let descs = collector.describe();

        let mut incoming = HashSet::new();
        for desc in &descs {
            let name = desc.fq_name();
            if self.names.contains(name) || !incoming.insert(name) {
                return Err(MetricsError::DuplicateDescriptor(name.to_string()));
            }
        }

        self.names.extend(incoming.into_iter().map(str::to_string));
        debug!(
            collector = collector.name(),
            descriptors = descs.len(),
            "registered collector"
        );
        self.collectors.push(collector);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// All descriptors, in registration order.
    pub fn describe(&self) -> Vec<&'static Desc> {
        self.collectors.iter().flat_map(|c| c.describe()).collect()
    }

    /// Run every collector once and gather what they emitted.
    pub async fn gather(&self) -> Gathered {
        let (sink, mut rx) = MetricSink::channel();
        let mut failures = Vec::new();

        for collector in &self.collectors {
            let started = Instant::now();
            let result = collector.collect(&sink).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(()) => debug!(collector = collector.name(), elapsed_ms, "collect finished"),
                Err(error) => {
                    warn!(
                        collector = collector.name(),
                        elapsed_ms,
                        error = %format!("{error:#}"),
                        "collect failed"
                    );
                    failures.push(CollectFailure {
                        collector: collector.name(),
                        error,
                    });
                }
            }
        }

        drop(sink);
        Gathered {
            samples: rx.drain(),
            failures,
        }
    }

    /// Gather and render in one step.
    pub async fn render(&self) -> MetricsResult<(String, Gathered)> {
        let gathered = self.gather().await;
        let text = render_text(&self.describe(), &gathered.samples)?;
        Ok((text, gathered))
    }
}
