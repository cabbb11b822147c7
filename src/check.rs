//! Threshold evaluation and report assembly for the different check types.

use std::fmt;
use std::str::FromStr;

use crate::error::CheckError;
use crate::metric::{MetricGroup, MetricId, MetricKind, Metrics};
use crate::report::{Report, StatusLine};
use crate::{PerfData, ServiceState, Threshold};

/// Selects which metrics are queried and how thresholds apply to them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckType {
    UsedCache,
    AvailCache,
    TotalCache,
    AllCache,
    LocalCluster,
}

impl CheckType {
    pub const ALL: [CheckType; 5] = [
        CheckType::UsedCache,
        CheckType::AvailCache,
        CheckType::TotalCache,
        CheckType::AllCache,
        CheckType::LocalCluster,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckType::UsedCache => "UsedCache",
            CheckType::AvailCache => "AvailCache",
            CheckType::TotalCache => "TotalCache",
            CheckType::AllCache => "AllCache",
            CheckType::LocalCluster => "LocalCluster",
        }
    }

    /// Metric groups evaluated for this check type, in report order.
    pub fn groups(&self) -> &'static [MetricGroup] {
        match self {
            CheckType::UsedCache => &[MetricGroup::UsedCache],
            CheckType::AvailCache => &[MetricGroup::AvailCache],
            CheckType::TotalCache => &[MetricGroup::TotalCache],
            CheckType::AllCache => &[
                MetricGroup::UsedCache,
                MetricGroup::AvailCache,
                MetricGroup::TotalCache,
            ],
            CheckType::LocalCluster => &[MetricGroup::LocalCluster],
        }
    }

    /// Every metric that has to be resolved before this check can be evaluated, in fetch order.
    pub fn required_metrics(&self) -> Vec<MetricId> {
        self.groups()
            .iter()
            .flat_map(|group| group.members().iter().copied())
            .collect()
    }

    pub fn requires_thresholds(&self) -> bool {
        self.groups().iter().any(MetricGroup::uses_thresholds)
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckType {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckType::ALL
            .into_iter()
            .find(|check| check.as_str() == s)
            .ok_or_else(|| CheckError::InvalidCheckType(s.to_owned()))
    }
}

/// Warning and critical levels, both percentages of *used* capacity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Thresholds {
    pub fn new(warning: f64, critical: f64) -> Result<Self, CheckError> {
        for value in [warning, critical] {
            if !(0.0..=100.0).contains(&value) {
                return Err(CheckError::InvalidThreshold(value.to_string()));
            }
        }

        if critical < warning {
            tracing::warn!(warning, critical, "critical threshold is lower than warning");
        }

        Ok(Thresholds { warning, critical })
    }

    /// Builds thresholds from optional CLI values. Both have to be present.
    pub fn from_options(
        check_type: CheckType,
        warning: Option<f64>,
        critical: Option<f64>,
    ) -> Result<Option<Self>, CheckError> {
        match (warning, critical) {
            (Some(w), Some(c)) => Thresholds::new(w, c).map(Some),
            _ if check_type.requires_thresholds() => Err(CheckError::MissingThresholds(check_type)),
            _ => Ok(None),
        }
    }

    /// Strictly greater than: a value equal to a threshold does not trigger it.
    pub fn severity(&self, used_percent: f64) -> ServiceState {
        if used_percent > self.critical {
            ServiceState::Critical
        } else if used_percent > self.warning {
            ServiceState::Warning
        } else {
            ServiceState::Ok
        }
    }
}

/// Evaluates all metric groups of `check_type` and assembles the report.
///
/// Every required metric is looked up before any threshold is applied, so a single missing value
/// fails the whole check without a partial report.
pub fn evaluate(
    check_type: CheckType,
    thresholds: Option<&Thresholds>,
    metrics: &Metrics,
) -> Result<Report, CheckError> {
    for id in check_type.required_metrics() {
        match id.kind() {
            MetricKind::Text => metrics.text(id).map(|_| ())?,
            _ => metrics.number(id).map(|_| ())?,
        }
    }

    let mut report = Report::new();
    for group in check_type.groups() {
        let state = match (group, thresholds) {
            (MetricGroup::UsedCache, Some(t)) => used_cache(&mut report, t, metrics)?,
            (MetricGroup::AvailCache, Some(t)) => avail_cache(&mut report, t, metrics)?,
            (MetricGroup::TotalCache, _) => informational(&mut report, *group, metrics)?,
            (MetricGroup::LocalCluster, _) => local_cluster(&mut report, metrics)?,
            (_, None) => return Err(CheckError::MissingThresholds(check_type)),
        };
        tracing::debug!(?group, %state, "evaluated metric group");
    }

    Ok(report)
}

fn used_cache(
    report: &mut Report,
    thresholds: &Thresholds,
    metrics: &Metrics,
) -> Result<ServiceState, CheckError> {
    let percent = metrics.number(MetricId::UsedCachePercent)?;
    let capacity = metrics.number(MetricId::UsedCacheCapacity)?;
    let state = thresholds.severity(percent);

    push_cache_lines(
        report,
        state,
        (MetricId::UsedCachePercent, percent),
        (MetricId::UsedCacheCapacity, capacity),
        (
            Threshold::Above(thresholds.warning),
            Threshold::Above(thresholds.critical),
        ),
    );

    Ok(state)
}

/// The appliance reports free capacity while thresholds describe used capacity, so the severity
/// is computed from the complement of the free percentage. In the perf data the complemented
/// levels are lower bounds, since free space alerts when it drops.
fn avail_cache(
    report: &mut Report,
    thresholds: &Thresholds,
    metrics: &Metrics,
) -> Result<ServiceState, CheckError> {
    let percent = metrics.number(MetricId::AvailCachePercent)?;
    let capacity = metrics.number(MetricId::AvailCacheCapacity)?;
    let state = thresholds.severity(100.0 - percent);

    push_cache_lines(
        report,
        state,
        (MetricId::AvailCachePercent, percent),
        (MetricId::AvailCacheCapacity, capacity),
        (
            Threshold::Below(100.0 - thresholds.warning),
            Threshold::Below(100.0 - thresholds.critical),
        ),
    );

    Ok(state)
}

fn push_cache_lines(
    report: &mut Report,
    state: ServiceState,
    (percent_id, percent): (MetricId, f64),
    (capacity_id, capacity): (MetricId, f64),
    (warning, critical): (Threshold, Threshold),
) {
    report.push_line(StatusLine::new(state, percent_id.label(), percent, percent_id.unit()));
    report.push_line(StatusLine::new(state, capacity_id.label(), capacity, capacity_id.unit()));

    report.push_perf(
        PerfData::new(percent_id.perf_label(), percent, percent_id.unit())
            .with_thresholds(warning, critical),
    );
    report.push_perf(PerfData::new(capacity_id.perf_label(), capacity, capacity_id.unit()));
}

fn informational(
    report: &mut Report,
    group: MetricGroup,
    metrics: &Metrics,
) -> Result<ServiceState, CheckError> {
    for id in group.members() {
        let value = metrics.number(*id)?;
        report.push_line(StatusLine::new(ServiceState::Ok, id.label(), value, id.unit()));
        report.push_perf(PerfData::new(id.perf_label(), value, id.unit()));
    }

    Ok(ServiceState::Ok)
}

/// Cluster figures are informational only. Lines read `label: value unit` and each unit comes
/// from the metric definition.
fn local_cluster(report: &mut Report, metrics: &Metrics) -> Result<ServiceState, CheckError> {
    for id in MetricGroup::LocalCluster.members() {
        match id.kind() {
            MetricKind::Text => {
                let name = metrics.text(*id)?;
                report.push_line(StatusLine::text(ServiceState::Ok, id.label(), name));
            }
            _ => {
                let value = metrics.number(*id)?;
                report.push_line(
                    StatusLine::new(ServiceState::Ok, id.label(), value, id.unit()).spaced(),
                );
                report.push_perf(PerfData::new(id.perf_label(), value, id.unit()));
            }
        }
    }

    Ok(ServiceState::Ok)
}
