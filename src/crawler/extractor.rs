//! Job record extraction from listing HTML
//!
//! The listing is a single `<table>` identified by id. Each row that carries
//! a link in its title cell becomes one [`JobRecord`]; every other row is
//! layout (headers, ads, spacers) and is skipped.

use crate::config::{ColumnLayout, SiteConfig};
use crate::storage::JobRecord;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Outcome of extracting one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The listing table is not in the document
    TableMissing,

    /// Records in document order; may be empty
    Rows(Vec<JobRecord>),
}

impl Extraction {
    pub fn records(&self) -> &[JobRecord] {
        match self {
            Self::TableMissing => &[],
            Self::Rows(records) => records,
        }
    }

    pub fn into_records(self) -> Vec<JobRecord> {
        match self {
            Self::TableMissing => Vec::new(),
            Self::Rows(records) => records,
        }
    }

    pub fn is_table_missing(&self) -> bool {
        matches!(self, Self::TableMissing)
    }
}

/// Turns a listing document into job records
pub trait RecordExtractor: Send + Sync {
    /// Extracts records, resolving links against `base_url`
    ///
    /// Never fails: malformed rows are dropped, a missing table is reported
    /// as [`Extraction::TableMissing`].
    fn extract(&self, html: &str, base_url: &Url) -> Extraction;
}

/// Extracts rows from the table with a given id
#[derive(Debug, Clone)]
pub struct TableExtractor {
    table_id: String,
    columns: ColumnLayout,
}

impl TableExtractor {
    pub fn new(table_id: impl Into<String>, columns: ColumnLayout) -> Self {
        Self {
            table_id: table_id.into(),
            columns,
        }
    }

    pub fn from_site(site: &SiteConfig) -> Self {
        Self::new(site.table_id.clone(), site.columns)
    }

    fn extract_row(
        &self,
        row: ElementRef<'_>,
        cell_selector: &Selector,
        link_selector: &Selector,
        base_url: &Url,
    ) -> Option<JobRecord> {
        let cells: Vec<ElementRef<'_>> = row.select(cell_selector).collect();
        if cells.len() < 2 {
            return None;
        }

        let title_cell = cells.get(self.columns.title)?;
        let href = title_cell
            .select(link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))?;
        let job_url = resolve_link(href, base_url)?;

        let text_at = |index: usize| cells.get(index).map(|c| cell_text(*c)).unwrap_or_default();

        Some(JobRecord {
            vacancy_name: cell_text(*title_cell),
            company_name: text_at(self.columns.company),
            published: text_at(self.columns.published),
            deadline: text_at(self.columns.deadline),
            job_url,
        })
    }
}

impl RecordExtractor for TableExtractor {
    fn extract(&self, html: &str, base_url: &Url) -> Extraction {
        let (Some(table_selector), Some(row_selector), Some(cell_selector), Some(link_selector)) = (
            selector("table[id]"),
            selector("tr"),
            selector("td"),
            selector("a[href]"),
        ) else {
            return Extraction::TableMissing;
        };

        let document = Html::parse_document(html);

        let Some(table) = document
            .select(&table_selector)
            .find(|t| t.value().id() == Some(self.table_id.as_str()))
        else {
            return Extraction::TableMissing;
        };

        let records = table
            .select(&row_selector)
            .filter_map(|row| self.extract_row(row, &cell_selector, &link_selector, base_url))
            .collect();

        Extraction::Rows(records)
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Text content with each fragment trimmed and blank fragments dropped
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("")
}

/// Resolves an href to an absolute http(s) URL
///
/// Returns None for script, mail, phone and data links, fragment-only links
/// and anything that does not resolve.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://jobs.ge").unwrap()
    }

    fn extractor() -> TableExtractor {
        TableExtractor::new("temp_table", ColumnLayout::default())
    }

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body><table id="temp_table">{}</table></body></html>"#,
            rows
        )
    }

    #[test]
    fn test_extracts_full_row() {
        let html = page(
            r#"<tr>
                <td><img src="/fav.png"></td>
                <td><a href="/en/?view=jobs&id=101">  Backend Engineer </a></td>
                <td>x</td>
                <td> Acme Ltd </td>
                <td>01 May</td>
                <td>31 May</td>
            </tr>"#,
        );

        let records = extractor().extract(&html, &base_url()).into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            JobRecord {
                vacancy_name: "Backend Engineer".to_string(),
                company_name: "Acme Ltd".to_string(),
                published: "01 May".to_string(),
                deadline: "31 May".to_string(),
                job_url: "https://jobs.ge/en/?view=jobs&id=101".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_table() {
        let html = r#"<html><body><table id="other"><tr><td></td></tr></table></body></html>"#;
        let result = extractor().extract(html, &base_url());
        assert!(result.is_table_missing());
        assert!(result.records().is_empty());
    }

    #[test]
    fn test_empty_table_is_rows_not_missing() {
        let result = extractor().extract(&page(""), &base_url());
        assert_eq!(result, Extraction::Rows(Vec::new()));
    }

    #[test]
    fn test_skips_short_and_linkless_rows() {
        let html = page(
            r#"
            <tr><th>Title</th><th>Company</th></tr>
            <tr><td colspan="6">Advertisement</td></tr>
            <tr><td></td><td>No link here</td><td></td><td>Co</td></tr>
            <tr><td></td><td><a>No href</a></td></tr>
            <tr><td></td><td><a href="javascript:void(0)">Script</a></td></tr>
            <tr><td></td><td><a href="/en/?view=jobs&id=7">Kept</a></td></tr>
            "#,
        );

        let records = extractor().extract(&html, &base_url()).into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vacancy_name, "Kept");
    }

    #[test]
    fn test_missing_trailing_cells_are_empty() {
        let html = page(r#"<tr><td></td><td><a href="/j/1">Cook</a></td><td></td><td>Cafe</td></tr>"#);

        let records = extractor().extract(&html, &base_url()).into_records();
        assert_eq!(records[0].company_name, "Cafe");
        assert_eq!(records[0].published, "");
        assert_eq!(records[0].deadline, "");
    }

    #[test]
    fn test_preserves_document_order() {
        let html = page(
            r#"
            <tr><td></td><td><a href="/j/3">C</a></td></tr>
            <tr><td></td><td><a href="/j/1">A</a></td></tr>
            <tr><td></td><td><a href="/j/2">B</a></td></tr>
            "#,
        );

        let urls: Vec<String> = extractor()
            .extract(&html, &base_url())
            .into_records()
            .into_iter()
            .map(|r| r.job_url)
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://jobs.ge/j/3".to_string(),
                "https://jobs.ge/j/1".to_string(),
                "https://jobs.ge/j/2".to_string(),
            ]
        );
    }

    #[test]
    fn test_absolute_href_kept() {
        let html = page(r#"<tr><td></td><td><a href="https://other.ge/x">X</a></td></tr>"#);
        let records = extractor().extract(&html, &base_url()).into_records();
        assert_eq!(records[0].job_url, "https://other.ge/x");
    }

    #[test]
    fn test_custom_column_layout() {
        let columns = ColumnLayout {
            title: 0,
            company: 1,
            published: 2,
            deadline: 3,
        };
        let html = r#"<table id="jobs"><tr><td><a href="/a">Nurse</a></td><td>Clinic</td><td>1</td><td>2</td></tr></table>"#;

        let records = TableExtractor::new("jobs", columns)
            .extract(html, &base_url())
            .into_records();
        assert_eq!(records[0].vacancy_name, "Nurse");
        assert_eq!(records[0].company_name, "Clinic");
        assert_eq!(records[0].deadline, "2");
    }
}
