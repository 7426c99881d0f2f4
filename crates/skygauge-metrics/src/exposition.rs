//! Prometheus text exposition format.
//!
//! Gathered samples are loaded into one `GaugeVec` per descriptor and
//! encoded with the `prometheus` crate's `TextEncoder` (format 0.0.4).

use prometheus::core::Collector as _;
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts, TextEncoder};

use crate::desc::{Desc, Sample};
use crate::error::{MetricsError, MetricsResult};

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render samples grouped by descriptor, in descriptor order.
///
/// Descriptors without samples are left out. Samples whose descriptor is
/// not listed are skipped. A repeated label set keeps the last value.
pub fn render_text(descs: &[&Desc], samples: &[Sample]) -> MetricsResult<String> {
    let mut families: Vec<MetricFamily> = Vec::with_capacity(descs.len());

    for desc in descs {
        let name = desc.fq_name();
        let mut family = samples.iter().filter(|s| s.desc().fq_name() == name).peekable();
        if family.peek().is_none() {
            continue;
        }

        let gauges = GaugeVec::new(Opts::new(name, desc.help()), desc.labels())
            .map_err(|e| encode_error(name, e))?;
        for sample in family {
            let values: Vec<&str> = sample.label_values().iter().map(String::as_str).collect();
            gauges
                .get_metric_with_label_values(&values)
                .map_err(|e| encode_error(name, e))?
                .set(sample.value());
        }
        families.extend(gauges.collect());
    }

    let mut out = String::new();
    TextEncoder::new()
        .encode_utf8(&families, &mut out)
        .map_err(|e| encode_error("exposition", e))?;
    Ok(out)
}

fn encode_error(metric: &str, e: prometheus::Error) -> MetricsError {
    MetricsError::Encode {
        metric: metric.to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static SUBNET: LazyLock<Desc> = LazyLock::new(|| {
        Desc::new("aws_operator", "subnet", "available_ips", "Subnet information.", &["cidr", "id"])
    });
    static BARE: LazyLock<Desc> =
        LazyLock::new(|| Desc::new("test", "", "bare", "No labels.", &[]));
    static BAD: LazyLock<Desc> =
        LazyLock::new(|| Desc::new("test", "", "bad-name", "Invalid.", &[]));

    #[test]
    fn render_empty() {
        assert_eq!(render_text(&[&*SUBNET], &[]).unwrap(), "");
    }

    #[test]
    fn render_labelled_samples() {
        let samples = vec![
            Sample::gauge(&SUBNET, 250.0, ["10.1.0.0/24", "subnet-1"]).unwrap(),
            Sample::gauge(&SUBNET, 27.0, ["10.1.1.0/27", "subnet-2"]).unwrap(),
        ];
        let output = render_text(&[&*SUBNET], &samples).unwrap();

        assert!(output.contains("# HELP aws_operator_subnet_available_ips Subnet information.\n"));
        assert!(output.contains("# TYPE aws_operator_subnet_available_ips gauge\n"));
        assert!(output.contains(
            "aws_operator_subnet_available_ips{cidr=\"10.1.0.0/24\",id=\"subnet-1\"} 250\n"
        ));
        assert!(output.contains(
            "aws_operator_subnet_available_ips{cidr=\"10.1.1.0/27\",id=\"subnet-2\"} 27\n"
        ));
    }

    #[test]
    fn render_without_labels() {
        let samples = vec![Sample::gauge(&BARE, 0.3, Vec::<String>::new()).unwrap()];
        let output = render_text(&[&*BARE], &samples).unwrap();
        assert!(output.contains("\ntest_bare 0.3\n"));
    }

    #[test]
    fn families_follow_descriptor_order() {
        let samples = vec![
            Sample::gauge(&BARE, 1.0, Vec::<String>::new()).unwrap(),
            Sample::gauge(&SUBNET, 2.0, ["a", "b"]).unwrap(),
        ];
        let output = render_text(&[&*SUBNET, &*BARE], &samples).unwrap();
        let subnet_at = output.find("# HELP aws_operator").unwrap();
        let bare_at = output.find("# HELP test_bare").unwrap();
        assert!(subnet_at < bare_at);
    }

    #[test]
    fn undescribed_samples_skipped() {
        let samples = vec![Sample::gauge(&BARE, 1.0, Vec::<String>::new()).unwrap()];
        let output = render_text(&[&*SUBNET], &samples).unwrap();
        assert!(!output.contains("test_bare"));
    }

    #[test]
    fn label_values_escaped() {
        let samples = vec![Sample::gauge(&SUBNET, 1.0, ["c\\d\ne", "a\"b"]).unwrap()];
        let output = render_text(&[&*SUBNET], &samples).unwrap();
        assert!(output.contains(r#"{cidr="c\\d\ne",id="a\"b"}"#));
    }

    #[test]
    fn repeated_label_set_keeps_last_value() {
        let samples = vec![
            Sample::gauge(&SUBNET, 1.0, ["a", "b"]).unwrap(),
            Sample::gauge(&SUBNET, 2.0, ["a", "b"]).unwrap(),
        ];
        let output = render_text(&[&*SUBNET], &samples).unwrap();
        assert!(output.contains("{cidr=\"a\",id=\"b\"} 2\n"));
        assert!(!output.contains("{cidr=\"a\",id=\"b\"} 1\n"));
    }

    #[test]
    fn invalid_metric_name_is_an_error() {
        let samples = vec![Sample::gauge(&BAD, 1.0, Vec::<String>::new()).unwrap()];
        let err = render_text(&[&*BAD], &samples).unwrap_err();
        assert!(matches!(err, MetricsError::Encode { ref metric, .. } if metric == "test_bad-name"));
    }
}
