//! Batch size interpretation and numeric policy values.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use skygauge_core::Scaling;

use crate::duration::IsoDuration;
use crate::error::{PolicyError, PolicyResult};

/// Max batch size as written in an annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BatchSize {
    /// A fixed number of nodes, e.g. `"5"`.
    Count(i64),
    /// A fraction of the node pool, e.g. `"0.3"`.
    Fraction(f64),
}

impl FromStr for BatchSize {
    type Err = PolicyError;

    /// Integers win over numbers: `"1"` is one node, not 100%.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<i64>() {
            Ok(BatchSize::Count(n))
        } else if let Ok(p) = s.parse::<f64>() {
            Ok(BatchSize::Fraction(p))
        } else {
            Err(PolicyError::Batch {
                value: s.to_string(),
            })
        }
    }
}

impl BatchSize {
    /// Nodes rolled at once. A fraction is applied to the scaling maximum.
    pub fn number(&self, scaling: Scaling) -> f64 {
        match *self {
            BatchSize::Count(n) => n as f64,
            BatchSize::Fraction(p) => f64::from(scaling.max) * p,
        }
    }

    /// Share of the node pool rolled at once. A count is measured against the
    /// scaling minimum, floored at one node, so it can exceed 1.0.
    pub fn percentage(&self, scaling: Scaling) -> f64 {
        match *self {
            BatchSize::Count(n) => n as f64 / f64::from(scaling.min).max(1.0),
            BatchSize::Fraction(p) => p,
        }
    }
}

/// The three numbers exposed per node pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyValues {
    pub batch_number: f64,
    pub batch_percentage: f64,
    /// Rounded up to whole seconds.
    pub pause_seconds: f64,
}

/// Turn raw batch and pause strings into numbers for a node pool with the
/// given scaling bounds. The pause is measured from `now`.
pub fn policy_values(
    batch: &str,
    pause: &str,
    scaling: Scaling,
    now: DateTime<Utc>,
) -> PolicyResult<PolicyValues> {
    let batch: BatchSize = batch.parse()?;

    let duration: IsoDuration = pause.parse()?;
    let pause_seconds = duration
        .seconds_from(now)
        .ok_or_else(|| PolicyError::Pause {
            value: pause.to_string(),
            reason: "out of range",
        })?;

    Ok(PolicyValues {
        batch_number: batch.number(scaling),
        batch_percentage: batch.percentage(scaling),
        pause_seconds: pause_seconds.ceil(),
    })
}

/// Resolved rollout policy of one node pool.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePoolPolicy {
    pub node_pool_id: String,
    pub cluster_id: String,
    pub values: PolicyValues,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{DEFAULT_BATCH_SIZE, DEFAULT_PAUSE_TIME};

    fn scaling(min: i32, max: i32) -> Scaling {
        Scaling { min, max }
    }

    fn values(batch: &str, pause: &str, min: i32, max: i32) -> PolicyValues {
        policy_values(batch, pause, scaling(min, max), Utc::now()).unwrap()
    }

    #[test]
    fn default_settings() {
        let v = values(DEFAULT_BATCH_SIZE, DEFAULT_PAUSE_TIME, 2, 10);
        assert_eq!(v.batch_number, 3.0);
        assert_eq!(v.batch_percentage, 0.3);
        assert_eq!(v.pause_seconds, 900.0);
    }

    #[test]
    fn static_batch() {
        let v = values("5", DEFAULT_PAUSE_TIME, 2, 10);
        assert_eq!(v.batch_number, 5.0);
        assert_eq!(v.batch_percentage, 2.5);
        assert_eq!(v.pause_seconds, 900.0);
    }

    #[test]
    fn static_batch_with_zero_min() {
        let v = values("5", DEFAULT_PAUSE_TIME, 0, 10);
        assert_eq!(v.batch_number, 5.0);
        assert_eq!(v.batch_percentage, 5.0);
    }

    #[test]
    fn fractional_batch_with_zero_max() {
        let v = values("0.5", DEFAULT_PAUSE_TIME, 0, 0);
        assert_eq!(v.batch_number, 0.0);
        assert_eq!(v.batch_percentage, 0.5);
        assert_eq!(v.pause_seconds, 900.0);
    }

    #[test]
    fn pause_in_seconds() {
        let v = values(DEFAULT_BATCH_SIZE, "PT15S", 2, 10);
        assert_eq!(v.pause_seconds, 15.0);
        assert_eq!(v.batch_number, 3.0);
    }

    #[test]
    fn pause_in_minutes_and_seconds() {
        assert_eq!(values(DEFAULT_BATCH_SIZE, "PT1M30S", 2, 10).pause_seconds, 90.0);
    }

    #[test]
    fn pause_rounds_up() {
        assert_eq!(values(DEFAULT_BATCH_SIZE, "PT1.2S", 2, 10).pause_seconds, 2.0);
    }

    #[test]
    fn integer_wins_over_float() {
        assert_eq!("1".parse::<BatchSize>(), Ok(BatchSize::Count(1)));
        assert_eq!("1.0".parse::<BatchSize>(), Ok(BatchSize::Fraction(1.0)));
        assert_eq!("-2".parse::<BatchSize>(), Ok(BatchSize::Count(-2)));
    }

    #[test]
    fn batch_is_pure() {
        let now = Utc::now();
        let a = policy_values("0.25", "PT10M", scaling(3, 12), now).unwrap();
        let b = policy_values("0.25", "PT10M", scaling(3, 12), now).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_batch_rejected() {
        let err = policy_values("a lot", DEFAULT_PAUSE_TIME, scaling(1, 3), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            PolicyError::Batch {
                value: "a lot".to_string()
            }
        );
    }

    #[test]
    fn invalid_pause_rejected() {
        let err = policy_values("3", "15m", scaling(1, 3), Utc::now()).unwrap_err();
        assert!(matches!(err, PolicyError::Pause { .. }));
    }
}
