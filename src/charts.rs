//! Chart-ready series built from the raw GitHub lists.
//!
//! Everything here is a pure function of its input slices.

use crate::types::{Contributor, Issue, PullRequest};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Two counters accumulated for one calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthlyCounts {
    pub year: i32,
    pub month: u32,
    pub first: u64,
    pub second: u64,
}

impl MonthlyCounts {
    /// `"{month}/{year}"`, month 1-based and unpadded.
    pub fn label(&self) -> String {
        format!("{}/{}", self.month, self.year)
    }
}

/// Bucket items by the UTC month of their creation timestamp.
///
/// `classify` returns the increments for the two series. Items without a
/// timestamp are left out. Months come back in chronological order.
pub fn group_by_month<T, D, C>(items: &[T], created_at: D, classify: C) -> Vec<MonthlyCounts>
where
    D: Fn(&T) -> Option<DateTime<Utc>>,
    C: Fn(&T) -> (u64, u64),
{
    let mut months: BTreeMap<(i32, u32), MonthlyCounts> = BTreeMap::new();

    for item in items {
        let Some(created) = created_at(item) else {
            continue;
        };
        let key = (created.year(), created.month());
        let entry = months.entry(key).or_insert(MonthlyCounts {
            year: key.0,
            month: key.1,
            ..Default::default()
        });
        let (first, second) = classify(item);
        entry.first += first;
        entry.second += second;
    }

    months.into_values().collect()
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct IssuePoint {
    pub month: String,
    pub open: u64,
    pub closed: u64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PullRequestPoint {
    pub month: String,
    pub opened: u64,
    pub merged: u64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LabelValue {
    pub name: String,
    pub value: u64,
}

pub fn issue_trend(issues: &[Issue]) -> Vec<IssuePoint> {
    group_by_month(issues, |i| i.created_at, |i| {
        if i.is_open() {
            (1, 0)
        } else {
            (0, 1)
        }
    })
    .into_iter()
    .map(|m| IssuePoint {
        month: m.label(),
        open: m.first,
        closed: m.second,
    })
    .collect()
}

pub fn pull_request_trend(pull_requests: &[PullRequest]) -> Vec<PullRequestPoint> {
    group_by_month(pull_requests, |pr| pr.created_at, |pr| (1, u64::from(pr.is_merged())))
        .into_iter()
        .map(|m| PullRequestPoint {
            month: m.label(),
            opened: m.first,
            merged: m.second,
        })
        .collect()
}

/// Top `n` by contribution count. The sort is stable, so ties keep their input order.
pub fn rank_contributors(contributors: &[Contributor], n: usize) -> Vec<Contributor> {
    let mut ranked = contributors.to_vec();
    ranked.sort_by(|a, b| b.contributions.cmp(&a.contributions));
    ranked.truncate(n);
    ranked
}

pub fn contributor_chart(contributors: &[Contributor]) -> Vec<LabelValue> {
    rank_contributors(contributors, 10)
        .into_iter()
        .map(|c| LabelValue {
            name: c.login,
            value: c.contributions,
        })
        .collect()
}

/// Score plus the remainder to 100, for a donut gauge.
pub fn health_gauge(score: u8) -> Vec<LabelValue> {
    let score = u64::from(score.min(100));
    vec![
        LabelValue {
            name: "Score".to_string(),
            value: score,
        },
        LabelValue {
            name: "Remaining".to_string(),
            value: 100 - score,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemState;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> Option<DateTime<Utc>> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single()
    }

    fn issue(created_at: Option<DateTime<Utc>>, state: ItemState) -> Issue {
        Issue {
            created_at,
            state,
            ..Default::default()
        }
    }

    fn contributor(login: &str, contributions: u64) -> Contributor {
        Contributor {
            login: login.to_string(),
            contributions,
            ..Default::default()
        }
    }

    #[test]
    fn empty_input_gives_empty_series() {
        assert!(issue_trend(&[]).is_empty());
        assert!(pull_request_trend(&[]).is_empty());
    }

    #[test]
    fn one_month_collects_every_item() {
        let issues = vec![
            issue(at(2024, 3, 1, 0), ItemState::Open),
            issue(at(2024, 3, 15, 12), ItemState::Closed),
            issue(at(2024, 3, 31, 23), ItemState::Closed),
        ];

        let trend = issue_trend(&issues);
        assert_eq!(
            trend,
            vec![IssuePoint {
                month: "3/2024".to_string(),
                open: 1,
                closed: 2
            }]
        );
    }

    #[test]
    fn months_are_keyed_in_utc_and_sorted() {
        // GitHub lists newest first; the series still reads oldest to newest.
        let issues = vec![
            issue(at(2024, 1, 1, 0), ItemState::Open),
            issue(at(2023, 12, 31, 23), ItemState::Open),
            issue(at(2023, 11, 5, 8), ItemState::Closed),
            issue(None, ItemState::Open),
        ];

        let months: Vec<_> = issue_trend(&issues).into_iter().map(|p| p.month).collect();
        assert_eq!(months, ["11/2023", "12/2023", "1/2024"]);
    }

    #[test]
    fn pull_request_series_counts_opened_and_merged() {
        let prs = vec![
            PullRequest {
                created_at: at(2024, 5, 2, 9),
                merged_at: at(2024, 5, 3, 9),
                ..Default::default()
            },
            PullRequest {
                created_at: at(2024, 5, 20, 9),
                state: ItemState::Closed,
                ..Default::default()
            },
            PullRequest {
                created_at: at(2024, 6, 1, 9),
                ..Default::default()
            },
        ];

        let trend = pull_request_trend(&prs);
        assert_eq!(trend.len(), 2);
        assert_eq!((trend[0].opened, trend[0].merged), (2, 1));
        assert_eq!((trend[1].opened, trend[1].merged), (1, 0));
        assert_eq!(trend[1].month, "6/2024");
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let people = vec![
            contributor("late", 5),
            contributor("top", 10),
            contributor("also-late", 5),
        ];

        let ranked: Vec<_> = rank_contributors(&people, 5)
            .into_iter()
            .map(|c| c.login)
            .collect();
        assert_eq!(ranked, ["top", "late", "also-late"]);
    }

    #[test]
    fn ranking_truncates() {
        let people: Vec<_> = (0..12).map(|i| contributor(&format!("dev{i}"), i)).collect();
        let ranked = rank_contributors(&people, 5);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].contributions, 11);
        assert_eq!(contributor_chart(&people).len(), 10);
    }

    #[test]
    fn gauge_sums_to_hundred() {
        let gauge = health_gauge(73);
        assert_eq!(gauge[0].value, 73);
        assert_eq!(gauge[1].value, 27);
        assert_eq!(gauge[1].name, "Remaining");
    }
}
