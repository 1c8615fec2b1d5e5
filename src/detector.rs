use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::config::DetectorConfig;
use crate::error::Result;
use crate::registry::SchemaRegistry;
use crate::schema::{CellValue, ColumnSpec, LayoutSignature, RawTable};
use crate::text::{header_tokens, normalize_header};

const SCORE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Detection {
    Detected {
        layout_id: String,
        /// Weighted share of the layout's required columns found, in `[0, 1]`.
        confidence: f64,
        /// Data row promoted to header row, when the declared headers did not match.
        header_row: Option<usize>,
    },
    Unknown {
        reason: UnknownReason,
    },
}

impl Detection {
    pub fn layout_id(&self) -> Option<&str> {
        match self {
            Detection::Detected { layout_id, .. } => Some(layout_id),
            Detection::Unknown { .. } => None,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Detection::Detected { confidence, .. } => *confidence,
            Detection::Unknown { .. } => 0.0,
        }
    }

    pub fn header_row(&self) -> Option<usize> {
        match self {
            Detection::Detected { header_row, .. } => *header_row,
            Detection::Unknown { .. } => None,
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, Detection::Detected { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnknownReason {
    NoHeaders,
    BelowThreshold {
        best_candidate: Option<String>,
        best_score: f64,
    },
    /// Several layouts scored equally with equal specificity.
    Ambiguous { candidates: Vec<String>, score: f64 },
}

/// How well one layout fits a header row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutScore {
    pub layout_id: String,
    pub score: f64,
    pub required_columns: usize,
    pub matched_columns: usize,
    /// The observed headers are exactly the layout's own spellings.
    pub exact: bool,
}

impl LayoutScore {
    fn specificity(&self) -> (usize, usize, bool) {
        (self.required_columns, self.matched_columns, self.exact)
    }

    fn ties_with(&self, other: &LayoutScore) -> bool {
        (self.score - other.score).abs() < SCORE_EPSILON && self.specificity() == other.specificity()
    }

    /// Better candidates sort first; equal candidates fall back to id order.
    fn rank(&self, other: &LayoutScore) -> Ordering {
        if (self.score - other.score).abs() >= SCORE_EPSILON {
            return other.score.total_cmp(&self.score);
        }
        other
            .specificity()
            .cmp(&self.specificity())
            .then_with(|| self.layout_id.cmp(&other.layout_id))
    }
}

/// A header row prepared for comparison: normalized spellings plus order-free word lists.
pub(crate) struct ObservedHeaders {
    normalized: Vec<String>,
    tokens: Vec<Vec<String>>,
    set: BTreeSet<String>,
}

impl ObservedHeaders {
    pub(crate) fn new(cells: &[CellValue]) -> Self {
        let raw: Vec<String> = cells.iter().map(|c| c.to_raw_string()).collect();
        let normalized: Vec<String> = raw.iter().map(|h| normalize_header(h)).collect();
        let tokens = raw.iter().map(|h| header_tokens(h)).collect();
        let set = normalized.iter().filter(|h| !h.is_empty()).cloned().collect();
        Self {
            normalized,
            tokens,
            set,
        }
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.set.is_empty()
    }

    pub(crate) fn same_headers(&self, other: &ObservedHeaders) -> bool {
        !self.is_blank() && self.set == other.set
    }

    fn matches(&self, idx: usize, column: &ColumnSpec) -> bool {
        if self.normalized[idx].is_empty() {
            return false;
        }
        column.headers.iter().any(|alias| {
            normalize_header(alias) == self.normalized[idx] || header_tokens(alias) == self.tokens[idx]
        })
    }

    /// Assigns each layout column to the first unclaimed matching observed header.
    /// The result is aligned with `signature.columns`.
    pub(crate) fn assign(&self, signature: &LayoutSignature) -> Vec<Option<usize>> {
        let mut claimed = vec![false; self.normalized.len()];
        signature
            .columns
            .iter()
            .map(|column| {
                let found = (0..self.normalized.len())
                    .find(|&idx| !claimed[idx] && self.matches(idx, column));
                if let Some(idx) = found {
                    claimed[idx] = true;
                }
                found
            })
            .collect()
    }
}

enum HeaderEvaluation {
    Accepted(LayoutScore),
    Ambiguous(Vec<String>, f64),
    Rejected(Option<LayoutScore>),
}

pub struct FormatDetector<'a> {
    registry: &'a SchemaRegistry,
    config: DetectorConfig,
}

impl<'a> FormatDetector<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            config: DetectorConfig::default(),
        }
    }

    pub fn with_config(registry: &'a SchemaRegistry, config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { registry, config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn score_signature(&self, signature: &LayoutSignature, observed: &ObservedHeaders) -> LayoutScore {
        let assignment = observed.assign(signature);
        let mut total = 0.0;
        let mut found = 0.0;
        for (column, slot) in signature.columns.iter().zip(&assignment) {
            if !column.required {
                continue;
            }
            let weight = self.config.weight(column.role);
            total += weight;
            if slot.is_some() {
                found += weight;
            }
        }

        LayoutScore {
            layout_id: signature.id.clone(),
            score: if total > 0.0 { found / total } else { 0.0 },
            required_columns: signature.required_count(),
            matched_columns: assignment.iter().filter(|slot| slot.is_some()).count(),
            exact: signature.header_set() == observed.set,
        }
    }

    /// Scores every registered layout against a header row, best first.
    pub fn rank(&self, headers: &[CellValue]) -> Vec<LayoutScore> {
        let observed = ObservedHeaders::new(headers);
        let mut scores: Vec<LayoutScore> = self
            .registry
            .signatures()
            .map(|signature| self.score_signature(signature, &observed))
            .collect();
        scores.sort_by(|a, b| a.rank(b));
        scores
    }

    fn evaluate(&self, headers: &[CellValue]) -> HeaderEvaluation {
        let ranked = self.rank(headers);
        let Some(best) = ranked.first() else {
            return HeaderEvaluation::Rejected(None);
        };

        if best.score + SCORE_EPSILON < self.config.acceptance_threshold {
            return HeaderEvaluation::Rejected(Some(best.clone()));
        }

        let tied: Vec<String> = ranked
            .iter()
            .take_while(|candidate| candidate.ties_with(best))
            .map(|candidate| candidate.layout_id.clone())
            .collect();
        if tied.len() > 1 {
            return HeaderEvaluation::Ambiguous(tied, best.score);
        }

        HeaderEvaluation::Accepted(best.clone())
    }

    /// Identifies which registered layout a table follows.
    ///
    /// The declared header row is tried first. When it does not clear the threshold, the
    /// first `header_scan_rows` data rows are tried in order as header rows, which handles
    /// sheets that carry title or address lines above the real headers.
    pub fn detect(&self, table: &RawTable) -> Detection {
        let declared_blank = ObservedHeaders::new(&table.headers).is_blank();
        if declared_blank && table.rows.is_empty() {
            return Detection::Unknown {
                reason: UnknownReason::NoHeaders,
            };
        }

        let mut ambiguity: Option<(Vec<String>, f64)> = None;
        let mut best_rejected: Option<LayoutScore> = None;

        let candidates = std::iter::once(None).chain(
            (0..table.rows.len().min(self.config.header_scan_rows)).map(Some),
        );

        for header_row in candidates {
            let cells = table.header_cells(header_row);
            match self.evaluate(cells) {
                HeaderEvaluation::Accepted(score) => {
                    info!(
                        "Detected layout '{}' (confidence {:.2}, header row {:?})",
                        score.layout_id, score.score, header_row
                    );
                    return Detection::Detected {
                        layout_id: score.layout_id,
                        confidence: score.score,
                        header_row,
                    };
                }
                HeaderEvaluation::Ambiguous(ids, score) => {
                    debug!("Header row {:?} is ambiguous between {:?}", header_row, ids);
                    if ambiguity.is_none() {
                        ambiguity = Some((ids, score));
                    }
                }
                HeaderEvaluation::Rejected(Some(score)) => {
                    let better = best_rejected
                        .as_ref()
                        .map_or(true, |current| score.score > current.score + SCORE_EPSILON);
                    if better {
                        best_rejected = Some(score);
                    }
                }
                HeaderEvaluation::Rejected(None) => {}
            }
        }

        let reason = match (ambiguity, best_rejected) {
            (Some((candidates, score)), _) => UnknownReason::Ambiguous { candidates, score },
            (None, Some(best)) => UnknownReason::BelowThreshold {
                best_candidate: (best.score > 0.0).then(|| best.layout_id.clone()),
                best_score: best.score,
            },
            (None, None) => UnknownReason::NoHeaders,
        };
        info!("No layout detected: {:?}", reason);
        Detection::Unknown { reason }
    }
}
