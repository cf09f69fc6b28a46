//! Bottleneck classification rules
//!
//! Each rule is a row of data: which metric it reads, the threshold that
//! triggers it, the severity bands and the advice to show. Adding a rule means
//! adding a row to [`BOTTLENECK_RULES`].

use super::ToolProfile;
use serde::Serialize;
use std::fmt;

/// Metric a bottleneck was detected on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Time,
    Memory,
    Cache,
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricType::Time => "time",
            MetricType::Memory => "memory",
            MetricType::Cache => "cache",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Sort rank, most severe first
    pub fn rank(self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Medium => 1,
            Severity::Low => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bottleneck {
    pub tool_name: String,
    pub metric: MetricType,
    pub severity: Severity,
    pub observed_value: f64,
    pub threshold: f64,
    pub recommendation: String,
}

/// Direction in which a metric becomes a problem
#[derive(Debug, Clone, Copy)]
enum Trigger {
    Above,
    Below,
}

impl Trigger {
    fn crosses(self, value: f64, threshold: f64) -> bool {
        match self {
            Trigger::Above => value > threshold,
            Trigger::Below => value < threshold,
        }
    }
}

/// One row of the rule table
pub(crate) struct BottleneckRule {
    metric: MetricType,
    extract: fn(&ToolProfile) -> f64,
    /// Extra precondition (e.g. enough samples) before the rule applies
    applies: fn(&ToolProfile) -> bool,
    trigger: Trigger,
    threshold: f64,
    /// Escalates to `High` beyond this value; `None` keeps the base severity
    high_threshold: Option<f64>,
    base_severity: Severity,
    recommendation: &'static str,
}

impl BottleneckRule {
    fn evaluate(&self, profile: &ToolProfile) -> Option<Bottleneck> {
        if !(self.applies)(profile) {
            return None;
        }

        let value = (self.extract)(profile);
        if !self.trigger.crosses(value, self.threshold) {
            return None;
        }

        let severity = match self.high_threshold {
            Some(high) if self.trigger.crosses(value, high) => Severity::High,
            _ => self.base_severity,
        };

        Some(Bottleneck {
            tool_name: profile.tool_name.clone(),
            metric: self.metric,
            severity,
            observed_value: value,
            threshold: self.threshold,
            recommendation: self.recommendation.to_string(),
        })
    }
}

fn always(_: &ToolProfile) -> bool {
    true
}

fn enough_cache_samples(profile: &ToolProfile) -> bool {
    profile.cache_hits + profile.cache_misses > 10
}

pub(crate) const BOTTLENECK_RULES: &[BottleneckRule] = &[
    BottleneckRule {
        metric: MetricType::Time,
        extract: ToolProfile::mean_time,
        applies: always,
        trigger: Trigger::Above,
        threshold: 2.0,
        high_threshold: Some(5.0),
        base_severity: Severity::Medium,
        recommendation: "Consider incremental execution or caching",
    },
    BottleneckRule {
        metric: MetricType::Memory,
        extract: ToolProfile::mean_memory,
        applies: always,
        trigger: Trigger::Above,
        threshold: 100.0,
        high_threshold: Some(500.0),
        base_severity: Severity::Medium,
        recommendation: "Optimize memory usage or process files in a streaming fashion",
    },
    BottleneckRule {
        metric: MetricType::Cache,
        extract: ToolProfile::cache_hit_rate,
        applies: enough_cache_samples,
        trigger: Trigger::Below,
        threshold: 50.0,
        high_threshold: None,
        base_severity: Severity::Medium,
        recommendation: "Improve the cache strategy or increase the cache TTL",
    },
];

/// Evaluate every rule against every profile, in discovery order
pub(crate) fn detect<'a, I>(profiles: I) -> Vec<Bottleneck>
where
    I: IntoIterator<Item = &'a ToolProfile>,
{
    let mut bottlenecks: Vec<Bottleneck> = profiles
        .into_iter()
        .flat_map(|profile| BOTTLENECK_RULES.iter().filter_map(|rule| rule.evaluate(profile)))
        .collect();

    sort_by_severity(&mut bottlenecks);
    bottlenecks
}

/// Stable sort: high before medium before low, ties keep their order
pub fn sort_by_severity(bottlenecks: &mut [Bottleneck]) {
    bottlenecks.sort_by_key(|b| b.severity.rank());
}
