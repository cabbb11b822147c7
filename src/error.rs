use crate::check::CheckType;
use crate::metric::MetricId;
use crate::ServiceState;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("warning and critical thresholds (-W, -C) are required for check type {0}")]
    MissingThresholds(CheckType),
    #[error("invalid check type {0:?}, expected one of UsedCache, AvailCache, TotalCache, AllCache, LocalCluster")]
    InvalidCheckType(String),
    #[error("invalid threshold {0:?}, expected a percentage between 0 and 100")]
    InvalidThreshold(String),
    /// The message is kept identical for every metric so existing notification filters keep
    /// matching. The offending metric is logged separately.
    #[error("At least one object returned empty.")]
    MissingMetric(MetricId),
    #[error("{0}")]
    Usage(String),
}

/// Help and version output also arrive as a clap error; only real argument errors should be
/// converted.
impl From<clap::Error> for CheckError {
    fn from(err: clap::Error) -> Self {
        CheckError::Usage(err.render().to_string().trim_end().to_owned())
    }
}

impl CheckError {
    /// Service state the plugin exits with when this error aborts the check.
    pub fn service_state(&self) -> ServiceState {
        ServiceState::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_metric_message() {
        let err = CheckError::MissingMetric(MetricId::TotalCacheCapacity);
        assert_eq!(err.to_string(), "At least one object returned empty.");
        assert_eq!(err.service_state(), ServiceState::Unknown);
    }

    #[test]
    fn test_missing_thresholds_message() {
        let err = CheckError::MissingThresholds(CheckType::UsedCache);
        assert_eq!(
            err.to_string(),
            "warning and critical thresholds (-W, -C) are required for check type UsedCache"
        );
    }
}
