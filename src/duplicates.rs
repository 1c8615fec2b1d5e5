use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ReconciliationConfig;
use crate::error::Result;
use crate::matching::MatchRules;
use crate::schema::{CanonicalRecord, Dataset};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMember {
    /// 0 for the first (or only) dataset, 1 for the second.
    pub dataset: usize,
    pub index: usize,
    pub record_key: String,
}

/// Records sharing a match key and linked pairwise within tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCluster {
    pub match_key: String,
    pub members: Vec<ClusterMember>,
}

impl DuplicateCluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStatus {
    NoDuplicates,
    /// First record of a cluster.
    HasDuplicates,
    /// Later record of a cluster.
    IsDuplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateSummary {
    pub total_records: usize,
    pub clusters: usize,
    pub duplicate_records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub clusters: Vec<DuplicateCluster>,
    /// One status per record, in dataset order.
    pub statuses: Vec<DuplicateStatus>,
    pub summary: DuplicateSummary,
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Lower root wins so the outcome does not depend on pair order
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

/// Single-linkage clustering inside each match-key group.
pub(crate) fn cluster_records(
    records: &[(usize, usize, &CanonicalRecord)],
    rules: &MatchRules,
) -> Vec<DuplicateCluster> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (pos, (_, _, record)) in records.iter().enumerate() {
        groups.entry(rules.match_key(record)).or_default().push(pos);
    }

    let mut clusters = Vec::new();
    for (match_key, positions) in groups {
        if positions.len() < 2 {
            continue;
        }

        let mut set = DisjointSet::new(positions.len());
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let (a, b) = (records[positions[i]].2, records[positions[j]].2);
                if rules.compare(a, b).within_tolerance {
                    set.union(i, j);
                }
            }
        }

        let mut by_root: BTreeMap<usize, Vec<ClusterMember>> = BTreeMap::new();
        for (i, &pos) in positions.iter().enumerate() {
            let (dataset, index, record) = records[pos];
            by_root.entry(set.find(i)).or_default().push(ClusterMember {
                dataset,
                index,
                record_key: record.record_key.clone(),
            });
        }

        for mut members in by_root.into_values() {
            if members.len() < 2 {
                continue;
            }
            members.sort_by_key(|m| (m.dataset, m.index));
            debug!("Duplicate cluster '{}' with {} members", match_key, members.len());
            clusters.push(DuplicateCluster {
                match_key: match_key.clone(),
                members,
            });
        }
    }

    clusters.sort_by_key(|c| c.members.first().map(|m| (m.dataset, m.index)));
    clusters
}

/// One status per record of `dataset`. Only members from dataset 0 are considered.
pub fn annotate_duplicates(dataset: &Dataset, clusters: &[DuplicateCluster]) -> Vec<DuplicateStatus> {
    let len = dataset.len();
    let mut statuses = vec![DuplicateStatus::NoDuplicates; len];
    for cluster in clusters {
        let members = cluster
            .members
            .iter()
            .filter(|m| m.dataset == 0 && m.index < len);
        for (pos, member) in members.enumerate() {
            statuses[member.index] = if pos == 0 {
                DuplicateStatus::HasDuplicates
            } else {
                DuplicateStatus::IsDuplicate
            };
        }
    }
    statuses
}

pub struct DuplicateDetector {
    config: ReconciliationConfig,
}

impl DuplicateDetector {
    pub fn new(config: ReconciliationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Clusters likely duplicate records within one dataset using the same key and
    /// tolerance rules as reconciliation.
    pub fn detect(&self, dataset: &Dataset) -> DuplicateReport {
        let rules = MatchRules::resolve(&self.config, dataset.category);
        let entries: Vec<(usize, usize, &CanonicalRecord)> = dataset
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| (0, index, record))
            .collect();
        let clusters = cluster_records(&entries, &rules);
        let statuses = annotate_duplicates(dataset, &clusters);

        let summary = DuplicateSummary {
            total_records: dataset.len(),
            clusters: clusters.len(),
            duplicate_records: statuses
                .iter()
                .filter(|s| **s == DuplicateStatus::IsDuplicate)
                .count(),
        };
        info!(
            "Duplicate scan of group '{}': {} clusters, {} duplicate records",
            dataset.source_group, summary.clusters, summary.duplicate_records
        );

        DuplicateReport {
            clusters,
            statuses,
            summary,
        }
    }
}
