//! Metric retrieval. Values are read one object at a time through the `snmpget` command line
//! client; transport and MIB decoding are entirely left to it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use crate::error::CheckError;
use crate::helper::{extract_number, extract_text};
use crate::metric::{MetricId, MetricKind, MetricValue, Metrics};

/// Resolves a metric to the raw text the appliance returned for it. `None` means the object
/// could not be read.
pub trait MetricSource {
    fn fetch(&self, id: MetricId) -> Option<String>;
}

/// Fetches every metric in `ids` in order and parses it. The first metric that comes back empty
/// or unparsable aborts the collection.
pub fn collect<S>(source: &S, ids: &[MetricId]) -> Result<Metrics, CheckError>
where
    S: MetricSource + ?Sized,
{
    let mut metrics = Metrics::new();

    for &id in ids {
        let raw = source.fetch(id).unwrap_or_default();
        tracing::debug!(metric = ?id, raw = %raw.trim_end(), "fetched object");

        let value = match id.kind() {
            MetricKind::Text => extract_text(&raw).map(MetricValue::Text),
            MetricKind::Percentage | MetricKind::Capacity => {
                extract_number(&raw).map(MetricValue::Number)
            }
        };

        match value {
            Some(value) => metrics.insert(id, value),
            None => {
                tracing::error!(metric = ?id, object = id.object_name(), "object returned empty");
                return Err(CheckError::MissingMetric(id));
            }
        }
    }

    Ok(metrics)
}

/// Queries a single appliance via the net-snmp `snmpget` binary.
#[derive(Clone, Debug)]
pub struct SnmpGet {
    binary: PathBuf,
    host: String,
    community: String,
    version: String,
    mib: Option<PathBuf>,
    timeout: Option<u32>,
    retries: Option<u32>,
}

impl SnmpGet {
    pub fn new(host: &str, community: &str) -> Self {
        SnmpGet {
            binary: PathBuf::from("snmpget"),
            host: host.to_owned(),
            community: community.to_owned(),
            version: "2c".to_owned(),
            mib: None,
            timeout: None,
            retries: None,
        }
    }

    pub fn with_binary(mut self, binary: PathBuf) -> Self {
        self.binary = binary;
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_owned();
        self
    }

    pub fn with_mib(mut self, mib: Option<PathBuf>) -> Self {
        self.mib = mib;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<u32>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: Option<u32>) -> Self {
        self.retries = retries;
        self
    }

    /// Arguments passed to `snmpget` for `id`. Output is requested as bare value (`-Oqv`).
    pub fn args(&self, id: MetricId) -> Vec<String> {
        let mut args = vec![
            "-v".to_owned(),
            self.version.clone(),
            "-c".to_owned(),
            self.community.clone(),
        ];

        if let Some(ref mib) = self.mib {
            args.push("-m".to_owned());
            args.push(mib.display().to_string());
        }
        if let Some(timeout) = self.timeout {
            args.push("-t".to_owned());
            args.push(timeout.to_string());
        }
        if let Some(retries) = self.retries {
            args.push("-r".to_owned());
            args.push(retries.to_string());
        }

        args.push("-Oqv".to_owned());
        args.push(self.host.clone());
        args.push(id.qualified_name());
        args
    }
}

impl MetricSource for SnmpGet {
    fn fetch(&self, id: MetricId) -> Option<String> {
        // `output` waits for the child and drains both pipes on every path.
        let output = match Command::new(&self.binary).args(self.args(id)).output() {
            Ok(output) => output,
            Err(err) => {
                tracing::error!(binary = %self.binary.display(), %err, "failed to run snmp client");
                return None;
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                metric = ?id,
                status = %output.status,
                stderr = %stderr.trim_end(),
                "snmp client failed"
            );
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if stdout.trim().is_empty() {
            None
        } else {
            Some(stdout)
        }
    }
}

/// Serves fixed raw values. Useful for dry runs and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    values: HashMap<MetricId, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: MetricId, raw: &str) -> Self {
        self.values.insert(id, raw.to_owned());
        self
    }
}

impl MetricSource for StaticSource {
    fn fetch(&self, id: MetricId) -> Option<String> {
        self.values.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::check::{evaluate, CheckType, Thresholds};
    use crate::ServiceState;

    /// Records the order in which metrics are requested.
    struct RecordingSource {
        inner: StaticSource,
        requested: RefCell<Vec<MetricId>>,
    }

    impl MetricSource for RecordingSource {
        fn fetch(&self, id: MetricId) -> Option<String> {
            self.requested.borrow_mut().push(id);
            self.inner.fetch(id)
        }
    }

    fn all_cache_source() -> StaticSource {
        StaticSource::new()
            .with(MetricId::UsedCachePercent, "80\n")
            .with(MetricId::UsedCacheCapacity, "\"10 GB\"\n")
            .with(MetricId::AvailCachePercent, "20\n")
            .with(MetricId::AvailCacheCapacity, "40\n")
            .with(MetricId::TotalCacheCapacity, "50\n")
    }

    #[test]
    fn test_snmpget_args() {
        let snmp = SnmpGet::new("10.0.0.5", "secret");
        assert_eq!(
            snmp.args(MetricId::TotalCacheCapacity),
            vec![
                "-v",
                "2c",
                "-c",
                "secret",
                "-Oqv",
                "10.0.0.5",
                "FALCONSTOR-STORSAFE-MIB::cacheTotalGB.0",
            ]
        );

        let snmp = SnmpGet::new("storsafe", "public")
            .with_version("1")
            .with_mib(Some(PathBuf::from("/usr/share/snmp/mibs/FALCONSTOR.mib")))
            .with_timeout(Some(5))
            .with_retries(Some(0));
        assert_eq!(
            snmp.args(MetricId::ClusterName),
            vec![
                "-v",
                "1",
                "-c",
                "public",
                "-m",
                "/usr/share/snmp/mibs/FALCONSTOR.mib",
                "-t",
                "5",
                "-r",
                "0",
                "-Oqv",
                "storsafe",
                "FALCONSTOR-STORSAFE-MIB::localClusterName.0",
            ]
        );
    }

    #[test]
    fn test_missing_binary_is_empty() {
        let snmp = SnmpGet::new("127.0.0.1", "public")
            .with_binary(PathBuf::from("/nonexistent/snmpget-for-tests"));
        assert_eq!(snmp.fetch(MetricId::TotalCacheCapacity), None);
    }

    #[test]
    fn test_collect_parses_values() {
        let source = all_cache_source();
        let metrics = collect(&source, &CheckType::AllCache.required_metrics()).unwrap();

        assert_eq!(metrics.len(), 5);
        assert_eq!(metrics.number(MetricId::UsedCacheCapacity).ok(), Some(10.0));
        assert_eq!(metrics.number(MetricId::TotalCacheCapacity).ok(), Some(50.0));
    }

    #[test]
    fn test_collect_stops_at_first_empty_object() {
        let source = RecordingSource {
            inner: StaticSource::new()
                .with(MetricId::UsedCachePercent, "80")
                .with(MetricId::UsedCacheCapacity, "")
                .with(MetricId::AvailCachePercent, "20"),
            requested: RefCell::new(Vec::new()),
        };

        let result = collect(&source, &CheckType::AllCache.required_metrics());
        assert!(matches!(
            result,
            Err(CheckError::MissingMetric(MetricId::UsedCacheCapacity))
        ));
        assert_eq!(
            *source.requested.borrow(),
            vec![MetricId::UsedCachePercent, MetricId::UsedCacheCapacity]
        );
    }

    #[test]
    fn test_collect_rejects_unparsable_values() {
        let source = StaticSource::new().with(
            MetricId::TotalCacheCapacity,
            "No Such Object available on this agent at this OID",
        );
        assert!(matches!(
            collect(&source, &[MetricId::TotalCacheCapacity]),
            Err(CheckError::MissingMetric(MetricId::TotalCacheCapacity))
        ));
    }

    #[test]
    fn test_collect_cluster_name() {
        let source = StaticSource::new().with(MetricId::ClusterName, "STRING: \"ss-01\"");
        let metrics = collect(&source, &[MetricId::ClusterName]).unwrap();
        assert_eq!(metrics.text(MetricId::ClusterName).ok(), Some("ss-01"));
    }

    #[test]
    fn test_collect_and_evaluate() {
        let thresholds = Thresholds::new(90.0, 95.0).unwrap();
        let metrics = collect(&all_cache_source(), &CheckType::AllCache.required_metrics())
            .unwrap();
        let report = evaluate(CheckType::AllCache, Some(&thresholds), &metrics).unwrap();

        assert_eq!(report.state(), ServiceState::Ok);
        assert_eq!(report.lines().len(), 5);
    }

    #[test]
    fn test_collect_and_evaluate_local_cluster() {
        let mut source = StaticSource::new().with(MetricId::ClusterName, "\"ss-01\"");
        for id in CheckType::LocalCluster.required_metrics().into_iter().skip(1) {
            source = source.with(id, "1024");
        }

        let metrics = collect(&source, &CheckType::LocalCluster.required_metrics()).unwrap();
        let report = evaluate(CheckType::LocalCluster, None, &metrics).unwrap();

        assert_eq!(report.state(), ServiceState::Ok);
        assert_eq!(report.lines().len(), 11);
        assert!(report
            .to_nagios_string()
            .contains("SERVICE STATUS: OK - Total repository data storage: 1024 MB"));
    }
}
