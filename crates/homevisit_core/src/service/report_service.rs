//! Read-only caseload statistics.
//!
//! # Responsibility
//! - Derive assignment counts, age statistics and per-town counts from the
//!   child table.
//!
//! # Invariants
//! - Pure: never reads or writes storage; `today` is supplied by the caller.
//! - An empty collection yields 0% for both percentages, never a division error.
//! - Rows with an unparseable date of birth still count toward totals.

use crate::model::child::ChildRecord;
use crate::model::identity::ChildIdentity;
use chrono::NaiveDate;
use serde::Serialize;

const DAYS_PER_YEAR: f64 = 365.0;

/// Child singled out by the age statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeExtreme {
    pub identity: ChildIdentity,
    /// Raw date-of-birth cell as stored.
    pub date_of_birth: String,
}

/// Number of children per `City` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TownCount {
    pub town: String,
    pub count: usize,
}

/// Aggregate statistics over the full child table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseloadReport {
    pub total_count: usize,
    pub assigned_count: usize,
    pub unassigned_count: usize,
    pub assigned_percentage: f64,
    pub unassigned_percentage: f64,
    /// `None` when no child has a parseable date of birth.
    pub average_age_years: Option<f64>,
    pub youngest: Option<AgeExtreme>,
    pub oldest: Option<AgeExtreme>,
    /// Sorted by count descending; ties keep first-seen order.
    pub counts_by_town: Vec<TownCount>,
}

/// Computes caseload statistics as of `today`.
///
/// Age is `(today - date_of_birth).days / 365`, without calendar refinement.
pub fn caseload_report(children: &[ChildRecord], today: NaiveDate) -> CaseloadReport {
    let total_count = children.len();
    let assigned_count = children.iter().filter(|child| child.is_assigned()).count();
    let unassigned_count = total_count - assigned_count;
    let assigned_percentage = if total_count == 0 {
        0.0
    } else {
        assigned_count as f64 / total_count as f64 * 100.0
    };
    // an empty caseload reads as fully unassigned
    let unassigned_percentage = 100.0 - assigned_percentage;

    let dated = children
        .iter()
        .filter_map(|child| child.parsed_date_of_birth().map(|dob| (child, dob)))
        .collect::<Vec<_>>();

    let average_age_years = if dated.is_empty() {
        None
    } else {
        let total_days: i64 = dated
            .iter()
            .map(|(_, dob)| (today - *dob).num_days())
            .sum();
        Some(total_days as f64 / dated.len() as f64 / DAYS_PER_YEAR)
    };

    // Strict comparisons keep the first row on ties.
    let mut youngest: Option<(&ChildRecord, NaiveDate)> = None;
    let mut oldest: Option<(&ChildRecord, NaiveDate)> = None;
    for &(child, dob) in &dated {
        if youngest.map_or(true, |(_, best)| dob > best) {
            youngest = Some((child, dob));
        }
        if oldest.map_or(true, |(_, best)| dob < best) {
            oldest = Some((child, dob));
        }
    }

    CaseloadReport {
        total_count,
        assigned_count,
        unassigned_count,
        assigned_percentage,
        unassigned_percentage,
        average_age_years,
        youngest: youngest.map(|(child, _)| to_extreme(child)),
        oldest: oldest.map(|(child, _)| to_extreme(child)),
        counts_by_town: counts_by_town(children),
    }
}

/// Counts children per trimmed, non-empty `City` value.
pub fn counts_by_town(children: &[ChildRecord]) -> Vec<TownCount> {
    let mut counts: Vec<TownCount> = Vec::new();
    for child in children {
        let town = child.city.trim();
        if town.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|entry| entry.town == town) {
            Some(entry) => entry.count += 1,
            None => counts.push(TownCount {
                town: town.to_string(),
                count: 1,
            }),
        }
    }
    // stable sort keeps first-seen order between equal counts
    counts.sort_by(|left, right| right.count.cmp(&left.count));
    counts
}

fn to_extreme(child: &ChildRecord) -> AgeExtreme {
    AgeExtreme {
        identity: child.identity.clone(),
        date_of_birth: child.date_of_birth.clone(),
    }
}
