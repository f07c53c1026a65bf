//! # Report Commands
//!
//! Dashboard figures and localized CSV exports, computed from a snapshot of
//! the collections so the data lock is not held while formatting.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::state::Storefront;
use loom_core::export::{build_typed_report, export_filename, CsvDocument, Lang, ReportOptions, ReportSources};
use loom_core::ledger::LedgerScope;
use loom_core::report::{dashboard_stats, DashboardStats};
use loom_core::ReportType;

/// File name used for report kinds nobody recognises.
const UNKNOWN_REPORT_STEM: &str = "report";

/// A rendered export, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedReport {
    pub report_type: Option<ReportType>,
    pub filename: String,
    pub row_count: usize,
    pub content: String,
}

/// Headline figures for the admin dashboard.
pub fn dashboard(sf: &Storefront) -> DashboardStats {
    debug!("dashboard command");
    let discount = sf.discount();
    sf.with_data(|data| dashboard_stats(&data.orders, &data.expenses, discount))
}

/// Builds one CSV export.
///
/// ## Arguments
/// * `kind` - Report name such as `SALES_ALL`; unknown names give an empty file
/// * `lang` - Header language and number format (config default when `None`)
/// * `client_id` - Limits CLIENT_LEDGER to one client
/// * `date` - Date stamped into the file name
pub fn export_report(
    sf: &Storefront,
    kind: &str,
    lang: Option<Lang>,
    client_id: Option<&str>,
    date: NaiveDate,
) -> ExportedReport {
    let lang = lang.unwrap_or(sf.config().export.default_lang);
    debug!(kind = %kind, lang = %lang.as_str(), client_id = ?client_id, "export_report command");

    let options = ReportOptions {
        lang,
        discount: sf.discount(),
        scope: client_id.map_or(LedgerScope::All, |id| LedgerScope::Client(id.to_string())),
    };

    let report_type = kind.trim().parse::<ReportType>().ok();
    let document = match report_type {
        Some(report_type) => {
            let data = sf.snapshot();
            let sources = ReportSources {
                products: &data.products,
                orders: &data.orders,
                clients: &data.clients,
                expenses: &data.expenses,
                search_logs: &data.search_logs,
            };
            build_typed_report(report_type, &sources, &options)
        }
        None => {
            warn!(kind = %kind, "Unknown report type, exporting nothing");
            CsvDocument::empty(lang)
        }
    };

    let stem = report_type.map_or(UNKNOWN_REPORT_STEM, |t| t.file_stem());
    let report = ExportedReport {
        report_type,
        filename: export_filename(stem, date),
        row_count: document.rows.len(),
        content: document.render(),
    };

    info!(filename = %report.filename, rows = report.row_count, "Report exported");
    report
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_to_cart;
    use crate::commands::order::place_order;
    use crate::commands::testing::{client, fabric, storefront_with};
    use loom_core::export::BOM;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_after_order() {
        let (sf, _) = storefront_with(vec![fabric("silk", 1000, 5)], vec![client("c1", "Aida")], vec![]).await;
        add_to_cart(&sf, "c1", "silk", None, 8, false).unwrap();
        place_order(&sf, "c1").await.unwrap();

        let stats = dashboard(&sf);
        assert_eq!(stats.order_count, 1);
        assert_eq!(stats.revenue.cents(), 7910);
        assert_eq!(stats.fabric_sales.len(), 1);
    }

    #[tokio::test]
    async fn test_export_sales_report() {
        let (sf, _) = storefront_with(vec![fabric("silk", 1000, 5)], vec![client("c1", "Aida")], vec![]).await;
        add_to_cart(&sf, "c1", "silk", None, 8, false).unwrap();
        place_order(&sf, "c1").await.unwrap();

        let report = export_report(&sf, "SALES_ALL", Some(Lang::En), None, day());
        assert_eq!(report.report_type, Some(ReportType::SalesAll));
        assert_eq!(report.filename, "sales_all_2024-03-15.csv");
        assert_eq!(report.row_count, 1);
        assert!(report.content.starts_with(BOM));
        assert!(report.content.contains("SKU-SILK"));
    }

    #[tokio::test]
    async fn test_unknown_report_is_empty() {
        let (sf, _) = storefront_with(vec![fabric("silk", 1000, 5)], vec![], vec![]).await;

        let report = export_report(&sf, "WEATHER", None, None, day());
        assert_eq!(report.report_type, None);
        assert_eq!(report.row_count, 0);
        assert_eq!(report.filename, "report_2024-03-15.csv");
    }
}
