//! Output sink for collected samples.
//!
//! A `MetricSink` is a cloneable handle on an unbounded channel, so
//! concurrently running tasks can write samples without coordinating.
//! Writes are independent: nothing emitted is ever retracted.

use tokio::sync::mpsc;

use crate::desc::{Desc, Sample};
use crate::error::{MetricsError, MetricsResult};

#[derive(Debug, Clone)]
pub struct MetricSink {
    tx: mpsc::UnboundedSender<Sample>,
}

/// Receiving side of a [`MetricSink`].
#[derive(Debug)]
pub struct SampleReceiver {
    rx: mpsc::UnboundedReceiver<Sample>,
}

impl MetricSink {
    pub fn channel() -> (MetricSink, SampleReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (MetricSink { tx }, SampleReceiver { rx })
    }

    pub fn emit(&self, sample: Sample) -> MetricsResult<()> {
        self.tx.send(sample).map_err(|_| MetricsError::SinkClosed)
    }

    /// Build a gauge sample and emit it.
    pub fn gauge<I, S>(&self, desc: &'static Desc, value: f64, label_values: I) -> MetricsResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emit(Sample::gauge(desc, value, label_values)?)
    }
}

impl SampleReceiver {
    /// Take every sample currently buffered without waiting.
    pub fn drain(&mut self) -> Vec<Sample> {
        let mut samples = Vec::new();
        while let Ok(sample) = self.rx.try_recv() {
            samples.push(sample);
        }
        samples
    }

    #[cfg(test)]
    async fn recv(&mut self) -> Option<Sample> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static DESC: LazyLock<Desc> =
        LazyLock::new(|| Desc::new("test", "", "gauge", "Test gauge.", &["id"]));

    #[tokio::test]
    async fn emitted_samples_are_drained_in_order() {
        let (sink, mut rx) = MetricSink::channel();
        sink.gauge(&DESC, 1.0, ["a"]).unwrap();
        sink.gauge(&DESC, 2.0, ["b"]).unwrap();

        let samples = rx.drain();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].label("id"), Some("a"));
        assert_eq!(samples[1].value(), 2.0);
        assert!(rx.drain().is_empty());
    }

    #[tokio::test]
    async fn clones_share_the_channel() {
        let (sink, mut rx) = MetricSink::channel();
        let other = sink.clone();
        tokio::spawn(async move { other.gauge(&DESC, 3.0, ["c"]).unwrap() })
            .await
            .unwrap();
        drop(sink);

        assert_eq!(rx.recv().await.map(|s| s.value()), Some(3.0));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn emit_after_receiver_dropped_fails() {
        let (sink, rx) = MetricSink::channel();
        drop(rx);
        assert_eq!(sink.gauge(&DESC, 1.0, ["a"]), Err(MetricsError::SinkClosed));
    }

    #[tokio::test]
    async fn label_mismatch_is_not_emitted() {
        let (sink, mut rx) = MetricSink::channel();
        assert!(sink.gauge(&DESC, 1.0, Vec::<String>::new()).is_err());
        assert!(rx.drain().is_empty());
    }
}
