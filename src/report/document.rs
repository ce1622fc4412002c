//! Report document model.
//!
//! A [`ReportDocument`] is the complete, self-contained input to the
//! composer: once built, composing it twice yields the same PDF. Section rows
//! are constructed from typed row structs so every row in a section carries
//! the same ordered column set - column headers never depend on map iteration
//! order.

use chrono::NaiveDate;

use crate::models::{Innovation, Ipr, ResearchPaper, Startup};
use crate::report::aggregate::ContributionSummary;

/// Identity block rendered under the report title.
#[derive(Debug, Clone)]
pub struct SubjectDetails {
    pub name: String,
    pub department: String,
    pub designation: String,
    pub email: String,
    pub phone: String,
}

/// A chart slot: caption plus the rendered image, or `None` when rendering
/// failed or returned the no-data sentinel. Empty slots are skipped silently
/// at composition time.
#[derive(Debug, Clone)]
pub struct ReportChart {
    pub caption: String,
    pub image: Option<Vec<u8>>,
}

/// One titled data table. An empty `rows` list renders as a placeholder
/// paragraph, never as a zero-row table.
#[derive(Debug, Clone)]
pub struct ReportSection {
    pub heading: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportSection {
    pub fn from_rows<R: SectionRow>(heading: impl Into<String>, rows: &[R]) -> Self {
        Self {
            heading: heading.into(),
            columns: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: rows.iter().map(SectionRow::cells).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Summary tables get capped column widths to stay legible.
    pub fn is_summary(&self) -> bool {
        self.heading.contains("Summary")
    }
}

/// A typed table row with a fixed, ordered column set.
pub trait SectionRow {
    const COLUMNS: &'static [&'static str];

    /// Display cells, in `COLUMNS` order.
    fn cells(&self) -> Vec<String>;
}

fn date_or(date: Option<NaiveDate>, fallback: &str) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| fallback.to_string())
}

fn text_or(value: &Option<String>, fallback: &str) -> String {
    value.clone().unwrap_or_else(|| fallback.to_string())
}

pub struct IprRow {
    title: String,
    ipr_type: String,
    status: String,
    filing_date: String,
}

impl From<&Ipr> for IprRow {
    fn from(ipr: &Ipr) -> Self {
        Self {
            title: ipr.title.clone(),
            ipr_type: ipr.ipr_type.clone(),
            status: text_or(&ipr.status, "Not specified"),
            filing_date: date_or(ipr.filing_date, "Not filed"),
        }
    }
}

impl SectionRow for IprRow {
    const COLUMNS: &'static [&'static str] = &["Title", "Type", "Status", "Filing Date"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.ipr_type.clone(),
            self.status.clone(),
            self.filing_date.clone(),
        ]
    }
}

pub struct PaperRow {
    title: String,
    authors: String,
    status: String,
    publication_date: String,
}

impl From<&ResearchPaper> for PaperRow {
    fn from(paper: &ResearchPaper) -> Self {
        Self {
            title: paper.title.clone(),
            authors: text_or(&paper.authors, "Not specified"),
            status: text_or(&paper.status, "Not specified"),
            publication_date: date_or(paper.publication_date, "Not published"),
        }
    }
}

impl SectionRow for PaperRow {
    const COLUMNS: &'static [&'static str] =
        &["Title", "Authors", "Status", "Publication Date"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.authors.clone(),
            self.status.clone(),
            self.publication_date.clone(),
        ]
    }
}

pub struct InnovationRow {
    title: String,
    domain: String,
    level: String,
    status: String,
}

impl From<&Innovation> for InnovationRow {
    fn from(innovation: &Innovation) -> Self {
        Self {
            title: innovation.title.clone(),
            domain: text_or(&innovation.domain, "Not specified"),
            level: text_or(&innovation.level, "Not specified"),
            status: text_or(&innovation.status, "Not specified"),
        }
    }
}

impl SectionRow for InnovationRow {
    const COLUMNS: &'static [&'static str] = &["Title", "Domain", "Level", "Status"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.domain.clone(),
            self.level.clone(),
            self.status.clone(),
        ]
    }
}

pub struct StartupRow {
    name: String,
    industry: String,
    founder: String,
    status: String,
}

impl From<&Startup> for StartupRow {
    fn from(startup: &Startup) -> Self {
        Self {
            name: startup.name.clone(),
            industry: text_or(&startup.industry, "Not specified"),
            founder: text_or(&startup.founder, "Not specified"),
            status: text_or(&startup.status, "Not specified"),
        }
    }
}

impl SectionRow for StartupRow {
    const COLUMNS: &'static [&'static str] = &["Name", "Industry", "Founder", "Status"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.industry.clone(),
            self.founder.clone(),
            self.status.clone(),
        ]
    }
}

/// One line of the fleet-wide summary table.
pub struct SummaryRow {
    user: String,
    iprs: usize,
    papers: usize,
    innovations: usize,
    startups: usize,
    total: usize,
}

impl From<&ContributionSummary> for SummaryRow {
    fn from(summary: &ContributionSummary) -> Self {
        Self {
            user: summary.name.clone(),
            iprs: summary.counts.iprs,
            papers: summary.counts.papers,
            innovations: summary.counts.innovations,
            startups: summary.counts.startups,
            total: summary.counts.total(),
        }
    }
}

impl SectionRow for SummaryRow {
    const COLUMNS: &'static [&'static str] = &[
        "User",
        "IPRs",
        "Research Papers",
        "Innovations",
        "Startups",
        "Total",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.user.clone(),
            self.iprs.to_string(),
            self.papers.to_string(),
            self.innovations.to_string(),
            self.startups.to_string(),
            self.total.to_string(),
        ]
    }
}

/// Complete input for one composed PDF.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    pub subject: SubjectDetails,
    pub narrative_intro: String,
    pub charts: Vec<ReportChart>,
    pub sections: Vec<ReportSection>,
    pub narrative_summary: String,
    pub signature_date: String,
}

impl ReportDocument {
    /// Fleet-wide reports use landscape pages for their wide summary tables.
    pub fn is_fleet_wide(&self) -> bool {
        self.title.contains("All Users")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_columns_come_from_row_type() {
        let section = ReportSection::from_rows::<IprRow>("Intellectual Property Rights (IPR)", &[]);
        assert_eq!(
            section.columns,
            vec!["Title", "Type", "Status", "Filing Date"]
        );
        assert!(section.is_empty());
        assert!(!section.is_summary());
    }

    #[test]
    fn test_summary_detection() {
        let section = ReportSection::from_rows::<SummaryRow>("User Contributions Summary", &[]);
        assert!(section.is_summary());
    }

    #[test]
    fn test_ipr_row_fallbacks() {
        let ipr = Ipr {
            ipr_id: 1,
            ipr_type: "Patent".to_string(),
            title: "Valve".to_string(),
            ipr_number: None,
            filing_date: None,
            status: None,
            related_startup_id: None,
            created_at: None,
            updated_at: None,
            user_id: 1,
        };
        let cells = IprRow::from(&ipr).cells();
        assert_eq!(cells, vec!["Valve", "Patent", "Not specified", "Not filed"]);
    }
}
