//! Export orchestration: builds a [`ReportDocument`] for each report kind and
//! hands it to the composer.
//!
//! Each export is a single-pass, request-scoped pipeline over one store
//! session. Store failures abort the whole export - a report silently missing
//! a data section would be misleading. Chart failures are the one tolerated
//! partial failure: the chart is dropped and the report proceeds.

use chrono::Utc;
use tracing::warn;

use crate::auth::Role;
use crate::errors::AppError;
use crate::models::User;
use crate::report::aggregate::{self, ContributionCounts, TimelineBuckets, UserContributions};
use crate::report::charts::{self, BarSeries, Chart, ChartError, TimeSeries};
use crate::report::compose;
use crate::report::document::{
    InnovationRow, IprRow, PaperRow, ReportChart, ReportDocument, ReportSection, StartupRow,
    SubjectDetails, SummaryRow,
};
use crate::store::StoreSession;

const DEPARTMENT: &str = "Research and Innovation Hub";
const PHONE_PLACEHOLDER: &str = "Contact Administration";

/// A finished export: the full PDF buffer plus its suggested filename.
pub struct ExportOutput {
    pub filename: String,
    pub bytes: Vec<u8>,
}

fn report_date() -> String {
    Utc::now().format("%d %B, %Y").to_string()
}

/// Chart degradation policy: a failed render is logged and omitted; the
/// no-data sentinel is omitted silently.
fn chart_or_none(result: Result<Chart, ChartError>, caption: &str) -> Option<Vec<u8>> {
    match result {
        Ok(Chart::Image(bytes)) => Some(bytes),
        Ok(Chart::NoData) => None,
        Err(e) => {
            warn!(caption, error = %e, "chart rendering failed; omitting from report");
            None
        }
    }
}

fn distribution_data(counts: &ContributionCounts) -> Vec<(String, u64)> {
    vec![
        ("IPRs".to_string(), counts.iprs as u64),
        ("Research Papers".to_string(), counts.papers as u64),
        ("Innovations".to_string(), counts.innovations as u64),
        ("Startups".to_string(), counts.startups as u64),
    ]
}

fn timeline_series(timeline: &TimelineBuckets) -> Vec<TimeSeries> {
    vec![
        TimeSeries {
            name: "IPRs".to_string(),
            points: timeline.iter().map(|(year, c)| (year, c.iprs)).collect(),
        },
        TimeSeries {
            name: "Papers".to_string(),
            points: timeline.iter().map(|(year, c)| (year, c.papers)).collect(),
        },
    ]
}

/// The four fixed detail sections of a per-user report. Empty categories stay
/// in the document; the composer renders the placeholder for them.
fn detail_sections(contributions: &UserContributions) -> Vec<ReportSection> {
    let ipr_rows: Vec<IprRow> = contributions.iprs.iter().map(IprRow::from).collect();
    let paper_rows: Vec<PaperRow> = contributions.papers.iter().map(PaperRow::from).collect();
    let innovation_rows: Vec<InnovationRow> = contributions
        .innovations
        .iter()
        .map(InnovationRow::from)
        .collect();
    let startup_rows: Vec<StartupRow> =
        contributions.startups.iter().map(StartupRow::from).collect();

    vec![
        ReportSection::from_rows("Intellectual Property Rights (IPR)", &ipr_rows),
        ReportSection::from_rows("Research Contributions", &paper_rows),
        ReportSection::from_rows("Innovations Developed", &innovation_rows),
        ReportSection::from_rows("Startups Initiated", &startup_rows),
    ]
}

fn subject_for(user: &User, designation: &str) -> SubjectDetails {
    SubjectDetails {
        name: user.name.clone(),
        department: DEPARTMENT.to_string(),
        designation: designation.to_string(),
        email: user.email.clone(),
        phone: PHONE_PLACEHOLDER.to_string(),
    }
}

fn designation_for(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Admin => "Admin",
    }
}

fn compose_document(document: &ReportDocument) -> Result<Vec<u8>, AppError> {
    compose::compose(document).map_err(|e| AppError::Layout(e.to_string()))
}

/// Self-export: the authenticated user's own progress report.
pub fn export_self(session: &StoreSession<'_>, user_id: i64) -> Result<ExportOutput, AppError> {
    let user = session
        .user_by_id(user_id)?
        .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

    let contributions = UserContributions::fetch(session, user.user_id)?;
    let counts = contributions.counts();
    let timeline = contributions.timeline();
    let date = report_date();

    let pie = chart_or_none(
        charts::render_pie(&distribution_data(&counts), "My Contribution Distribution"),
        "Contribution Distribution",
    );
    let timeline_chart = chart_or_none(
        charts::render_timeline(&timeline_series(&timeline), "Your Contribution Timeline"),
        "Your Contribution Timeline",
    );

    let document = ReportDocument {
        title: "My Progress Report".to_string(),
        subject: subject_for(&user, designation_for(user.role)),
        narrative_intro: format!(
            "This report summarizes your contributions as of {date}. You have contributed \
             to {} Intellectual Property Rights (IPR) filings, {} research publications, \
             {} innovations, and {} startup ventures.",
            counts.iprs, counts.papers, counts.innovations, counts.startups
        ),
        charts: vec![
            ReportChart {
                caption: "Contribution Distribution".to_string(),
                image: pie,
            },
            ReportChart {
                caption: "Your Contribution Timeline".to_string(),
                image: timeline_chart,
            },
        ],
        sections: detail_sections(&contributions),
        narrative_summary: format!(
            "You have made significant contributions with {} IPR filings, {} research \
             publications, {} innovations, and {} startup ventures. Your continued \
             engagement across multiple domains of research and innovation is highly valued.",
            counts.iprs, counts.papers, counts.innovations, counts.startups
        ),
        signature_date: date,
    };

    Ok(ExportOutput {
        filename: "my_progress_report.pdf".to_string(),
        bytes: compose_document(&document)?,
    })
}

/// Admin export of one user, addressed by email. Fails with NotFound before
/// any contribution query when the email is unknown.
pub fn export_user(
    session: &StoreSession<'_>,
    email: &str,
    requesting_role: Role,
) -> Result<ExportOutput, AppError> {
    if requesting_role != Role::Admin {
        return Err(AppError::Forbidden("admin role required".to_string()));
    }

    let user = session
        .user_by_email(email)?
        .ok_or_else(|| AppError::UserNotFound(email.to_string()))?;

    let contributions = UserContributions::fetch(session, user.user_id)?;
    let counts = contributions.counts();
    let timeline = contributions.timeline();
    let date = report_date();

    let pie = chart_or_none(
        charts::render_pie(
            &distribution_data(&counts),
            &format!("{}'s Contribution Distribution", user.name),
        ),
        "Contribution Distribution",
    );
    let timeline_chart = chart_or_none(
        charts::render_timeline(
            &timeline_series(&timeline),
            &format!("{}'s Contribution Timeline", user.name),
        ),
        "Contribution Timeline",
    );

    let document = ReportDocument {
        title: format!("User Report: {}", user.name),
        subject: subject_for(&user, designation_for(user.role)),
        narrative_intro: format!(
            "This report provides a detailed overview of {}'s contributions as of {date}. \
             The user has contributed to {} Intellectual Property Rights (IPR) filings, \
             {} research publications, {} innovations, and {} startup ventures.",
            user.name, counts.iprs, counts.papers, counts.innovations, counts.startups
        ),
        charts: vec![
            ReportChart {
                caption: "Contribution Distribution".to_string(),
                image: pie,
            },
            ReportChart {
                caption: "Contribution Timeline".to_string(),
                image: timeline_chart,
            },
        ],
        sections: detail_sections(&contributions),
        narrative_summary: format!(
            "{} has made significant contributions with {} IPR filings, {} research \
             publications, {} innovations, and {} startup ventures. This performance \
             demonstrates strong engagement across multiple domains of research and innovation.",
            user.name, counts.iprs, counts.papers, counts.innovations, counts.startups
        ),
        signature_date: date,
    };

    let safe_name = user.name.replace(' ', "_");
    Ok(ExportOutput {
        filename: format!("user_report_{safe_name}.pdf"),
        bytes: compose_document(&document)?,
    })
}

/// Admin export of every regular user: one consolidated summary table, then
/// detail sections for each user that has at least one contribution.
pub fn export_all(
    session: &StoreSession<'_>,
    requesting_role: Role,
) -> Result<ExportOutput, AppError> {
    if requesting_role != Role::Admin {
        return Err(AppError::Forbidden("admin role required".to_string()));
    }

    let summaries = aggregate::summarize_all(session)?;
    if summaries.is_empty() {
        return Err(AppError::UserNotFound("no users found".to_string()));
    }

    let totals = aggregate::global_totals(session)?;
    let date = report_date();

    let pie = chart_or_none(
        charts::render_pie(&distribution_data(&totals), "Distribution of Contributions"),
        "Contribution Distribution",
    );

    let categories: Vec<String> = summaries.iter().map(|s| s.name.clone()).collect();
    let bar_series = vec![
        BarSeries {
            name: "IPRs".to_string(),
            values: summaries.iter().map(|s| s.counts.iprs as u64).collect(),
        },
        BarSeries {
            name: "Papers".to_string(),
            values: summaries.iter().map(|s| s.counts.papers as u64).collect(),
        },
        BarSeries {
            name: "Innovations".to_string(),
            values: summaries
                .iter()
                .map(|s| s.counts.innovations as u64)
                .collect(),
        },
        BarSeries {
            name: "Startups".to_string(),
            values: summaries.iter().map(|s| s.counts.startups as u64).collect(),
        },
    ];
    let bar = chart_or_none(
        charts::render_grouped_bar(&categories, &bar_series, "Contribution Breakdown by User"),
        "User Contribution Breakdown",
    );

    let summary_rows: Vec<SummaryRow> = summaries.iter().map(SummaryRow::from).collect();
    let mut sections = vec![ReportSection::from_rows(
        "User Contributions Summary",
        &summary_rows,
    )];

    // Users without a single contribution stay in the summary but get no
    // detail pages; empty categories are likewise skipped here.
    for summary in &summaries {
        if summary.counts.total() == 0 {
            continue;
        }
        let contributions = UserContributions::fetch(session, summary.user_id)?;

        if !contributions.iprs.is_empty() {
            let rows: Vec<IprRow> = contributions.iprs.iter().map(IprRow::from).collect();
            sections.push(ReportSection::from_rows(
                format!("{} - Intellectual Property Rights", summary.name),
                &rows,
            ));
        }
        if !contributions.papers.is_empty() {
            let rows: Vec<PaperRow> = contributions.papers.iter().map(PaperRow::from).collect();
            sections.push(ReportSection::from_rows(
                format!("{} - Research Contributions", summary.name),
                &rows,
            ));
        }
        if !contributions.innovations.is_empty() {
            let rows: Vec<InnovationRow> = contributions
                .innovations
                .iter()
                .map(InnovationRow::from)
                .collect();
            sections.push(ReportSection::from_rows(
                format!("{} - Innovations", summary.name),
                &rows,
            ));
        }
        if !contributions.startups.is_empty() {
            let rows: Vec<StartupRow> =
                contributions.startups.iter().map(StartupRow::from).collect();
            sections.push(ReportSection::from_rows(
                format!("{} - Startups", summary.name),
                &rows,
            ));
        }
    }

    // The report is issued under the first administrator's name; any account
    // works as a fallback on a mis-seeded database.
    let issuer = session
        .users_by_role(Role::Admin)?
        .into_iter()
        .next()
        .or_else(|| {
            session
                .all_users()
                .ok()
                .and_then(|users| users.into_iter().next())
        })
        .ok_or_else(|| AppError::UserNotFound("no users found".to_string()))?;

    let document = ReportDocument {
        title: "Research and Innovation Hub: All Users Report".to_string(),
        subject: subject_for(&issuer, "Administrator"),
        narrative_intro: format!(
            "This is an official report generated on {date} summarizing the research and \
             innovation activities across all users in the department. The report includes \
             data on {} Intellectual Property Rights (IPR) filings, {} research publications, \
             {} innovations developed, and {} startup ventures initiated by members of the \
             Research and Innovation Hub.",
            totals.iprs, totals.papers, totals.innovations, totals.startups
        ),
        charts: vec![
            ReportChart {
                caption: "Contribution Distribution".to_string(),
                image: pie,
            },
            ReportChart {
                caption: "User Contribution Breakdown".to_string(),
                image: bar,
            },
        ],
        sections,
        narrative_summary: format!(
            "This report summarizes contributions from {} users, including a total of \
             {} IPRs, {} research publications, {} innovations, and {} startup ventures. \
             The Research and Innovation Hub continues to foster academic excellence, \
             innovation, and entrepreneurship. The department is committed to supporting \
             these initiatives and furthering their impact in the coming academic year.",
            summaries.len(),
            totals.iprs,
            totals.papers,
            totals.innovations,
            totals.startups
        ),
        signature_date: date,
    };

    Ok(ExportOutput {
        filename: "all_users_report.pdf".to_string(),
        bytes: compose_document(&document)?,
    })
}
