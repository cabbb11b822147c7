//! Metric identifiers, resolved values and the groups they are evaluated in.

use std::collections::HashMap;

use crate::error::CheckError;

/// Name of the StorSafe MIB module every object lives in.
pub const MIB_MODULE: &str = "FALCONSTOR-STORSAFE-MIB";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    Percentage,
    Capacity,
    /// Free form text, only used for the cluster name.
    Text,
}

define_metrics! {
    UsedCachePercent => ("cacheUsedPercent.0", "Used cache", "used_cache_percent", Percentage, Percentage),
    UsedCacheCapacity => ("cacheUsedGB.0", "Used cache", "used_cache_gb", Gigabytes, Capacity),
    AvailCachePercent => ("cacheFreePercent.0", "Available cache", "avail_cache_percent", Percentage, Percentage),
    AvailCacheCapacity => ("cacheFreeGB.0", "Available cache", "avail_cache_gb", Gigabytes, Capacity),
    TotalCacheCapacity => ("cacheTotalGB.0", "Total cache", "total_cache_gb", Gigabytes, Capacity),

    ClusterName => ("localClusterName.0", "Local cluster", "cluster_name", None, Text),
    RepositoryDataTotal => ("repoDataTotalMB.0", "Total repository data storage", "repo_data_total_mb", Megabytes, Capacity),
    RepositoryDataUsed => ("repoDataUsedMB.0", "Used repository data storage", "repo_data_used_mb", Megabytes, Capacity),
    RepositoryDataFree => ("repoDataFreeMB.0", "Free repository data storage", "repo_data_free_mb", Megabytes, Capacity),
    RepositoryDataUsedPercent => ("repoDataUsedPercent.0", "Repository data storage in use", "repo_data_used_percent", Percentage, Percentage),
    RepositoryIndexTotal => ("repoIndexTotalMB.0", "Total repository index storage", "repo_index_total_mb", Megabytes, Capacity),
    RepositoryIndexUsed => ("repoIndexUsedMB.0", "Used repository index storage", "repo_index_used_mb", Megabytes, Capacity),
    RepositoryIndexFree => ("repoIndexFreeMB.0", "Free repository index storage", "repo_index_free_mb", Megabytes, Capacity),
    RepositoryIndexUsedPercent => ("repoIndexUsedPercent.0", "Repository index storage in use", "repo_index_used_percent", Percentage, Percentage),
    ProtectedData => ("protectedDataMB.0", "Protected data before deduplication", "protected_data_mb", Megabytes, Capacity),
    DeduplicationSavings => ("dedupSavingsPercent.0", "Storage saved by deduplication", "dedup_savings_percent", Percentage, Percentage),
}

impl MetricId {
    /// Fully qualified object name as understood by `snmpget`.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", MIB_MODULE, self.object_name())
    }
}

/// A resolved metric value.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

/// Resolved metric values keyed by their identifier.
#[derive(Clone, Debug, Default)]
pub struct Metrics {
    values: HashMap<MetricId, MetricValue>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: MetricId, value: MetricValue) {
        self.values.insert(id, value);
    }

    pub fn with_number(mut self, id: MetricId, value: f64) -> Self {
        self.insert(id, MetricValue::Number(value));
        self
    }

    pub fn with_text(mut self, id: MetricId, value: &str) -> Self {
        self.insert(id, MetricValue::Text(value.to_owned()));
        self
    }

    pub fn contains(&self, id: MetricId) -> bool {
        self.values.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the numeric value of `id`. A missing or textual value counts as missing.
    pub fn number(&self, id: MetricId) -> Result<f64, CheckError> {
        match self.values.get(&id) {
            Some(MetricValue::Number(n)) => Ok(*n),
            _ => Err(CheckError::MissingMetric(id)),
        }
    }

    /// Returns the text value of `id`. A missing or empty value counts as missing.
    pub fn text(&self, id: MetricId) -> Result<&str, CheckError> {
        match self.values.get(&id) {
            Some(MetricValue::Text(s)) if !s.is_empty() => Ok(s),
            _ => Err(CheckError::MissingMetric(id)),
        }
    }
}

/// Set of metrics describing one aspect of the appliance. Which groups are evaluated is fixed by
/// the check type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricGroup {
    UsedCache,
    AvailCache,
    TotalCache,
    LocalCluster,
}

impl MetricGroup {
    /// Members in the order they are reported.
    pub fn members(&self) -> &'static [MetricId] {
        match self {
            MetricGroup::UsedCache => &[MetricId::UsedCachePercent, MetricId::UsedCacheCapacity],
            MetricGroup::AvailCache => {
                &[MetricId::AvailCachePercent, MetricId::AvailCacheCapacity]
            }
            MetricGroup::TotalCache => &[MetricId::TotalCacheCapacity],
            MetricGroup::LocalCluster => &[
                MetricId::ClusterName,
                MetricId::RepositoryDataTotal,
                MetricId::RepositoryDataUsed,
                MetricId::RepositoryDataFree,
                MetricId::RepositoryDataUsedPercent,
                MetricId::RepositoryIndexTotal,
                MetricId::RepositoryIndexUsed,
                MetricId::RepositoryIndexFree,
                MetricId::RepositoryIndexUsedPercent,
                MetricId::ProtectedData,
                MetricId::DeduplicationSavings,
            ],
        }
    }

    /// Whether warning/critical thresholds are applied to this group.
    pub fn uses_thresholds(&self) -> bool {
        matches!(self, MetricGroup::UsedCache | MetricGroup::AvailCache)
    }
}
