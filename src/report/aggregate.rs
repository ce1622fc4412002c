//! Contribution aggregation: per-user counts and year-bucketed timelines.
//!
//! Everything here is derived, request-scoped state. Each report request
//! rebuilds its summaries from the store and throws them away once the PDF
//! is serialized.

use std::collections::BTreeMap;

use crate::auth::Role;
use crate::models::{Innovation, Ipr, ResearchPaper, Startup, User};
use crate::store::{StoreError, StoreSession};

/// Per-type contribution counts for one user (or the whole portal).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContributionCounts {
    pub iprs: usize,
    pub papers: usize,
    pub innovations: usize,
    pub startups: usize,
}

impl ContributionCounts {
    pub fn total(&self) -> usize {
        self.iprs + self.papers + self.innovations + self.startups
    }
}

/// One user's summary line in the fleet report.
#[derive(Debug, Clone)]
pub struct ContributionSummary {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub counts: ContributionCounts,
}

/// Dated contributions seen in one calendar year. Only IPR filings and paper
/// publications carry a bucketable date in the current schema; innovations
/// and startups stay out of the timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearCounts {
    pub iprs: u32,
    pub papers: u32,
}

/// Year-keyed counts of dated contributions, sorted by year.
#[derive(Debug, Clone, Default)]
pub struct TimelineBuckets {
    buckets: BTreeMap<i32, YearCounts>,
}

impl TimelineBuckets {
    /// Bucket records by year. Records without a date are dropped from the
    /// timeline; they still show up in [`ContributionCounts`].
    pub fn from_records(iprs: &[Ipr], papers: &[ResearchPaper]) -> Self {
        use chrono::Datelike;

        let mut buckets: BTreeMap<i32, YearCounts> = BTreeMap::new();
        for ipr in iprs {
            if let Some(date) = ipr.filing_date {
                buckets.entry(date.year()).or_default().iprs += 1;
            }
        }
        for paper in papers {
            if let Some(date) = paper.publication_date {
                buckets.entry(date.year()).or_default().papers += 1;
            }
        }
        Self { buckets }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.buckets.keys().copied().collect()
    }

    /// Counts for a year; zero if nothing was recorded in it.
    pub fn get(&self, year: i32) -> YearCounts {
        self.buckets.get(&year).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, YearCounts)> + '_ {
        self.buckets.iter().map(|(year, counts)| (*year, *counts))
    }
}

/// All four contribution collections for one user, pulled with one filtered
/// query per type. The caller guarantees the user exists.
#[derive(Debug, Clone)]
pub struct UserContributions {
    pub iprs: Vec<Ipr>,
    pub papers: Vec<ResearchPaper>,
    pub innovations: Vec<Innovation>,
    pub startups: Vec<Startup>,
}

impl UserContributions {
    pub fn fetch(session: &StoreSession<'_>, user_id: i64) -> Result<Self, StoreError> {
        Ok(Self {
            iprs: session.iprs_by_user(user_id)?,
            papers: session.papers_by_user(user_id)?,
            innovations: session.innovations_by_user(user_id)?,
            startups: session.startups_by_user(user_id)?,
        })
    }

    pub fn counts(&self) -> ContributionCounts {
        ContributionCounts {
            iprs: self.iprs.len(),
            papers: self.papers.len(),
            innovations: self.innovations.len(),
            startups: self.startups.len(),
        }
    }

    pub fn timeline(&self) -> TimelineBuckets {
        TimelineBuckets::from_records(&self.iprs, &self.papers)
    }
}

/// Per-user summary, one filtered query per contribution type.
pub fn summarize(
    session: &StoreSession<'_>,
    user: &User,
) -> Result<ContributionSummary, StoreError> {
    let contributions = UserContributions::fetch(session, user.user_id)?;
    Ok(ContributionSummary {
        user_id: user.user_id,
        name: user.name.clone(),
        email: user.email.clone(),
        counts: contributions.counts(),
    })
}

/// Year-bucketed timeline for one user, from the two dated record types.
pub fn summarize_timeline(
    session: &StoreSession<'_>,
    user_id: i64,
) -> Result<TimelineBuckets, StoreError> {
    Ok(TimelineBuckets::from_records(
        &session.iprs_by_user(user_id)?,
        &session.papers_by_user(user_id)?,
    ))
}

/// Summaries for every regular (non-admin) user, in user-id order.
pub fn summarize_all(
    session: &StoreSession<'_>,
) -> Result<Vec<ContributionSummary>, StoreError> {
    let users = session.users_by_role(Role::User)?;
    users
        .iter()
        .map(|user| summarize(session, user))
        .collect()
}

/// Portal-wide totals per contribution type. Unowned records count here even
/// though they never appear in a per-user summary.
pub fn global_totals(session: &StoreSession<'_>) -> Result<ContributionCounts, StoreError> {
    Ok(ContributionCounts {
        iprs: session.count_iprs()? as usize,
        papers: session.count_papers()? as usize,
        innovations: session.count_innovations()? as usize,
        startups: session.count_startups()? as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ipr_with_date(date: Option<NaiveDate>) -> Ipr {
        Ipr {
            ipr_id: 1,
            ipr_type: "Patent".to_string(),
            title: "t".to_string(),
            ipr_number: None,
            filing_date: date,
            status: None,
            related_startup_id: None,
            created_at: None,
            updated_at: None,
            user_id: 1,
        }
    }

    fn paper_with_date(date: Option<NaiveDate>) -> ResearchPaper {
        ResearchPaper {
            paper_id: 1,
            title: "p".to_string(),
            abstract_text: None,
            authors: None,
            publication_date: date,
            doi: None,
            status: None,
            created_at: None,
            updated_at: None,
            user_id: 1,
        }
    }

    #[test]
    fn test_timeline_drops_undated_records() {
        let iprs = vec![
            ipr_with_date(NaiveDate::from_ymd_opt(2022, 1, 1)),
            ipr_with_date(None),
        ];
        let papers = vec![paper_with_date(NaiveDate::from_ymd_opt(2023, 5, 2))];

        let timeline = TimelineBuckets::from_records(&iprs, &papers);

        assert_eq!(timeline.years(), vec![2022, 2023]);
        assert_eq!(timeline.get(2022), YearCounts { iprs: 1, papers: 0 });
        assert_eq!(timeline.get(2023), YearCounts { iprs: 0, papers: 1 });
        // The undated IPR is in no bucket.
        let bucketed: u32 = timeline.iter().map(|(_, c)| c.iprs).sum();
        assert_eq!(bucketed, 1);
    }

    #[test]
    fn test_counts_total_is_sum_of_types() {
        let counts = ContributionCounts {
            iprs: 2,
            papers: 1,
            innovations: 0,
            startups: 3,
        };
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn test_timeline_empty_when_no_dates() {
        let timeline = TimelineBuckets::from_records(&[ipr_with_date(None)], &[]);
        assert!(timeline.is_empty());
    }
}
