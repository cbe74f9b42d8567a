//! Coverage and distribution mapping
//!
//! Every report or statement that has to reach a person is a distribution
//! target. Targets are matched against the contact directory and classified;
//! only matched targets carry an address forward. Hierarchy coverage is the
//! same idea applied to the batch: which incentivized representatives the
//! hierarchy actually knows about.

pub mod directory;

pub use directory::{Contact, ContactDirectory};

use crate::hierarchy::{HierarchyIndex, Level};
use crate::ledger::{RepStatement, SelectedBatch};
use crate::report::ManagerReport;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeSet;

/// Directory lookup outcome for one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Matched,
    /// Directory entry exists but its email is blank or unusable
    Invalid,
    /// No directory entry
    Missing,
}

impl CoverageStatus {
    pub fn reason(self) -> Option<&'static str> {
        match self {
            CoverageStatus::Matched => None,
            CoverageStatus::Invalid => Some("Invalid/missing email"),
            CoverageStatus::Missing => Some("ID not in email list"),
        }
    }
}

/// Something that needs delivering to one person
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionTarget {
    pub id: String,
    pub name: String,
    /// `None` for representative statements
    pub level: Option<Level>,
    pub file_stem: String,
}

impl DistributionTarget {
    pub fn for_statement(statement: &RepStatement, batch: &SelectedBatch) -> Self {
        Self {
            id: statement.rep_id.clone(),
            name: statement.rep_name.clone(),
            level: None,
            file_stem: statement.file_stem(batch),
        }
    }

    pub fn for_report(report: &ManagerReport) -> Self {
        Self {
            id: report.node.id.clone(),
            name: report.node.name.clone(),
            level: Some(report.node.level),
            file_stem: report.file_stem(),
        }
    }
}

/// Classification of one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageResult {
    pub target: DistributionTarget,
    pub status: CoverageStatus,
    /// Only set when matched
    pub email: Option<String>,
    /// Directory name, when the directory has an entry
    pub contact_name: Option<String>,
}

/// Results for one batch of targets, in submission order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub results: Vec<CoverageResult>,
}

impl CoverageReport {
    fn count(&self, status: CoverageStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn submitted(&self) -> usize {
        self.results.len()
    }

    pub fn matched(&self) -> usize {
        self.count(CoverageStatus::Matched)
    }

    pub fn invalid(&self) -> usize {
        self.count(CoverageStatus::Invalid)
    }

    pub fn missing(&self) -> usize {
        self.count(CoverageStatus::Missing)
    }

    /// Percent of submitted targets that matched; zero when nothing was submitted
    pub fn pct_matched(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.matched() as f64 / self.submitted() as f64 * 100.0
        }
    }

    /// Targets that can be delivered
    pub fn deliverable(&self) -> impl Iterator<Item = &CoverageResult> {
        self.results
            .iter()
            .filter(|r| r.status == CoverageStatus::Matched)
    }

    /// Targets that cannot, with their reason
    pub fn gaps(&self) -> impl Iterator<Item = &CoverageResult> {
        self.results
            .iter()
            .filter(|r| r.status != CoverageStatus::Matched)
    }
}

/// Classify one target against the directory
pub fn classify(target: DistributionTarget, directory: &ContactDirectory) -> CoverageResult {
    match directory.get(&target.id) {
        Some(contact) => match contact.deliverable_email() {
            Some(email) => CoverageResult {
                email: Some(email.to_string()),
                contact_name: Some(contact.name.clone()),
                target,
                status: CoverageStatus::Matched,
            },
            None => CoverageResult {
                email: None,
                contact_name: Some(contact.name.clone()),
                target,
                status: CoverageStatus::Invalid,
            },
        },
        None => CoverageResult {
            target,
            status: CoverageStatus::Missing,
            email: None,
            contact_name: None,
        },
    }
}

/// Classify every target
pub fn assess(
    targets: impl IntoIterator<Item = DistributionTarget>,
    directory: &ContactDirectory,
) -> CoverageReport {
    let report = CoverageReport {
        results: targets
            .into_iter()
            .map(|target| classify(target, directory))
            .collect(),
    };

    if report.matched() < report.submitted() {
        warn!(
            "{} of {} targets have valid emails ({} invalid, {} missing)",
            report.matched(),
            report.submitted(),
            report.invalid(),
            report.missing()
        );
    } else {
        info!("All {} targets have valid emails", report.submitted());
    }
    report
}

/// Coverage for individual representative statements
pub fn representative_coverage(
    statements: &[RepStatement],
    batch: &SelectedBatch,
    directory: &ContactDirectory,
) -> CoverageReport {
    assess(
        statements
            .iter()
            .map(|s| DistributionTarget::for_statement(s, batch)),
        directory,
    )
}

/// Coverage for per-manager reports
pub fn manager_coverage(reports: &[ManagerReport], directory: &ContactDirectory) -> CoverageReport {
    assess(reports.iter().map(DistributionTarget::for_report), directory)
}

/// Batch representatives matched against the hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HierarchyCoverage {
    pub matched: Vec<String>,
    /// Earned incentives but never appear in a rollup
    pub unmatched: Vec<String>,
}

impl HierarchyCoverage {
    pub fn submitted(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }

    pub fn pct_matched(&self) -> f64 {
        if self.submitted() == 0 {
            0.0
        } else {
            self.matched.len() as f64 / self.submitted() as f64 * 100.0
        }
    }
}

/// Which batch representatives the hierarchy knows about, sorted by identifier
pub fn hierarchy_coverage(batch: &SelectedBatch, index: &HierarchyIndex) -> HierarchyCoverage {
    let known = index.representative_ids();
    let batch_reps: BTreeSet<&str> = batch.rep_ids().into_iter().collect();

    let (matched, unmatched): (Vec<&str>, Vec<&str>) =
        batch_reps.into_iter().partition(|id| known.contains(id));
    let coverage = HierarchyCoverage {
        matched: matched.into_iter().map(String::from).collect(),
        unmatched: unmatched.into_iter().map(String::from).collect(),
    };

    info!(
        "Hierarchy coverage: {} of {} matched ({:.1}%), {} unmatched",
        coverage.matched.len(),
        coverage.submitted(),
        coverage.pct_matched(),
        coverage.unmatched.len()
    );
    coverage
}
