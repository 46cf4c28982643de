use crate::core::budget::RequestBudget;
use crate::domain::model::{
    ColumnNames, EnrichedRecord, EnrichmentReport, Entry, InputRow, RunSummary,
    UnresolvedPolicy, UnresolvedReason, UnresolvedRecord,
};
use crate::domain::ports::Geocoder;
use crate::utils::error::{GeoEnrichError, Result};

/// Looks up every row in order, one at a time, until the budget runs out.
///
/// Per-row failures are recorded and skipped. Only a rejected API key
/// aborts the pass.
pub async fn enrich_rows<G: Geocoder + ?Sized>(
    geocoder: &G,
    rows: Vec<InputRow>,
    columns: &ColumnNames,
    policy: UnresolvedPolicy,
    budget: &mut RequestBudget,
) -> Result<EnrichmentReport> {
    let mut report = EnrichmentReport {
        entries: Vec::with_capacity(rows.len()),
        summary: RunSummary {
            rows_read: rows.len(),
            request_limit: budget.limit(),
            ..RunSummary::default()
        },
    };

    for (index, row) in rows.into_iter().enumerate() {
        tracing::info!(
            "Processing {}/{}: {}",
            index + 1,
            report.summary.rows_read,
            row.label(columns)
        );

        let outcome = match row.query(columns) {
            None => Err(UnresolvedReason::NoQuery),
            Some(_) if budget.is_exhausted() => Err(UnresolvedReason::BudgetExhausted),
            Some(query) => match geocoder.lookup(&query, budget).await {
                Ok(details) => Ok(details),
                Err(e) if e.is_fatal() => {
                    return Err(GeoEnrichError::ConfigError {
                        message: format!("Places API rejected the request: {}", e),
                    });
                }
                Err(e) => {
                    tracing::warn!("Lookup failed for '{}': {}", query, e);
                    Err(e.reason())
                }
            },
        };

        match outcome {
            Ok(details) => {
                tracing::debug!(
                    "Resolved to {} ({}, {})",
                    details.formatted_address,
                    details.latitude,
                    details.longitude
                );
                report.summary.enriched += 1;
                report
                    .entries
                    .push(Entry::Enriched(EnrichedRecord { row, details }));
            }
            Err(reason) => {
                tracing::debug!("Unresolved: {}", reason);
                if reason == UnresolvedReason::BudgetExhausted {
                    report.summary.limit_reached = true;
                }
                report.summary.unresolved += 1;
                match policy {
                    UnresolvedPolicy::Emit => report
                        .entries
                        .push(Entry::Unresolved(UnresolvedRecord { row, reason })),
                    UnresolvedPolicy::Skip => report.summary.dropped += 1,
                }
            }
        }
    }

    report.summary.requests_used = budget.used();
    tracing::debug!(
        "Lookup pass done: {} requests used, {} left",
        budget.used(),
        budget.remaining()
    );
    Ok(report)
}
