//! Metric descriptors and samples.
//!
//! Descriptors are built once (typically in a `static LazyLock`) and only
//! ever handed out by shared reference, so samples carry `&'static Desc`.

use crate::error::{MetricsError, MetricsResult};

/// Join the non-empty parts of a metric name with `_`.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// Immutable description of a gauge family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    fq_name: String,
    help: String,
    labels: Vec<&'static str>,
}

impl Desc {
    pub fn new(
        namespace: &str,
        subsystem: &str,
        name: &str,
        help: &str,
        labels: &[&'static str],
    ) -> Self {
        Self {
            fq_name: build_fq_name(namespace, subsystem, name),
            help: help.to_string(),
            labels: labels.to_vec(),
        }
    }

    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }
}

/// One gauge value with its label values, in descriptor label order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    desc: &'static Desc,
    value: f64,
    label_values: Vec<String>,
}

impl Sample {
    pub fn gauge<I, S>(desc: &'static Desc, value: f64, label_values: I) -> MetricsResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let label_values: Vec<String> = label_values.into_iter().map(Into::into).collect();
        if label_values.len() != desc.labels.len() {
            return Err(MetricsError::LabelMismatch {
                metric: desc.fq_name.clone(),
                expected: desc.labels.len(),
                got: label_values.len(),
            });
        }
        Ok(Self {
            desc,
            value,
            label_values,
        })
    }

    pub fn desc(&self) -> &'static Desc {
        self.desc
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Value of the label called `name`, if the descriptor has one.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.desc
            .labels
            .iter()
            .position(|l| *l == name)
            .map(|i| self.label_values[i].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static TEST_DESC: LazyLock<Desc> = LazyLock::new(|| {
        Desc::new("ns", "sub", "value", "A test gauge.", &["cluster_id", "node_pool_id"])
    });

    #[test]
    fn fq_name_joins_parts() {
        assert_eq!(build_fq_name("aws_operator", "subnet", "available_ips"), "aws_operator_subnet_available_ips");
        assert_eq!(build_fq_name("", "subnet", "available_ips"), "subnet_available_ips");
        assert_eq!(build_fq_name("ns", "", "x"), "ns_x");
        assert_eq!(TEST_DESC.fq_name(), "ns_sub_value");
    }

    #[test]
    fn gauge_with_matching_labels() {
        let s = Sample::gauge(&TEST_DESC, 1.5, ["a1b2c", "np1"]).unwrap();
        assert_eq!(s.value(), 1.5);
        assert_eq!(s.label("cluster_id"), Some("a1b2c"));
        assert_eq!(s.label("node_pool_id"), Some("np1"));
        assert_eq!(s.label("missing"), None);
        assert_eq!(s.desc().help(), "A test gauge.");
    }

    #[test]
    fn gauge_rejects_wrong_label_count() {
        let err = Sample::gauge(&TEST_DESC, 1.0, ["only-one"]).unwrap_err();
        assert_eq!(
            err,
            MetricsError::LabelMismatch {
                metric: "ns_sub_value".to_string(),
                expected: 2,
                got: 1,
            }
        );
    }
}
