//! Paginated retrieval of aggregate compliance results

use aggcheck_core::{ComplianceViolation, Error, Result, ViolationIndex};
use async_trait::async_trait;
use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, info, warn};

/// Compliance type that marks a rule as violated
pub const NON_COMPLIANT: &str = "NON_COMPLIANT";

/// Context attached to every failed page request
pub const FETCH_CONTEXT: &str = "retrieving aggregate compliance";

/// One rule evaluation as reported by the aggregator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCompliance {
    /// Config rule name
    pub rule_name: Option<String>,
    /// Region the rule was evaluated in
    pub region: Option<String>,
    /// Compliance type (`COMPLIANT`, `NON_COMPLIANT`, ...); `None` when the
    /// result carried no compliance information
    pub compliance_type: Option<String>,
}

impl RuleCompliance {
    pub fn new(
        rule_name: impl Into<String>,
        region: impl Into<String>,
        compliance_type: impl Into<String>,
    ) -> Self {
        Self {
            rule_name: Some(rule_name.into()),
            region: Some(region.into()),
            compliance_type: Some(compliance_type.into()),
        }
    }

    pub fn is_non_compliant(&self) -> bool {
        self.compliance_type.as_deref() == Some(NON_COMPLIANT)
    }
}

/// A single page of results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompliancePage {
    pub results: Vec<RuleCompliance>,
    pub next_token: Option<String>,
}

impl CompliancePage {
    /// Token for the following page. An empty token ends pagination.
    pub fn continuation(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|token| !token.is_empty())
    }
}

/// Anything that can serve aggregate compliance pages
#[async_trait]
pub trait ComplianceSource: Send + Sync {
    /// Fetch the page identified by `next_token` (`None` for the first page)
    async fn fetch_page(
        &self,
        aggregator_name: &str,
        next_token: Option<&str>,
    ) -> Result<CompliancePage>;
}

/// Extract the violations from one page.
///
/// Results without compliance information, or with any compliance type other
/// than `NON_COMPLIANT`, are ignored.
pub fn violations_in_page(page: &CompliancePage) -> Vec<ComplianceViolation> {
    page.results
        .iter()
        .filter(|result| result.is_non_compliant())
        .filter_map(|result| match (&result.rule_name, &result.region) {
            (Some(rule_name), Some(region)) => {
                Some(ComplianceViolation::new(rule_name.as_str(), region.as_str()))
            }
            _ => {
                warn!(
                    rule = ?result.rule_name,
                    region = ?result.region,
                    "Skipping non-compliant result without rule name or region"
                );
                None
            }
        })
        .collect()
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazy stream of violation batches, one per page.
///
/// The first request carries no token; every later request carries the token
/// returned by the previous page. The stream ends after a page without a
/// token and stops at the first error.
pub fn compliance_pages<'a, S>(
    source: &'a S,
    aggregator_name: &'a str,
) -> impl Stream<Item = Result<Vec<ComplianceViolation>>> + 'a
where
    S: ComplianceSource + ?Sized,
{
    stream::try_unfold((Cursor::Start, 0usize), move |(cursor, fetched)| async move {
        let token = match cursor {
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
            Cursor::Done => return Ok(None),
        };

        let page = source.fetch_page(aggregator_name, token.as_deref()).await?;
        let fetched = fetched + 1;
        let violations = violations_in_page(&page);

        debug!(
            page = fetched,
            results = page.results.len(),
            violations = violations.len(),
            "Fetched aggregate compliance page"
        );

        let next = match page.continuation() {
            Some(token) => Cursor::Next(token.to_string()),
            None => Cursor::Done,
        };

        Ok::<_, Error>(Some((violations, (next, fetched))))
    })
}

/// Drain every page into a single index. Any failed page fails the whole run.
pub async fn collect_violations<S>(source: &S, aggregator_name: &str) -> Result<ViolationIndex>
where
    S: ComplianceSource + ?Sized,
{
    let index = compliance_pages(source, aggregator_name)
        .try_fold(ViolationIndex::new(), |mut index, batch| async move {
            index.extend(batch);
            Ok::<_, Error>(index)
        })
        .await?;

    info!(
        aggregator = aggregator_name,
        rules = index.rule_count(),
        violations = index.violation_count(),
        "Aggregate compliance collected"
    );

    Ok(index)
}
