//! # CSV Export
//!
//! Localized CSV documents for every report type.
//!
//! ## Locale Rules
//! ```text
//! ┌──────────┬───────────┬──────────┬──────────────┐
//! │ lang     │ delimiter │ decimals │ dates        │
//! ├──────────┼───────────┼──────────┼──────────────┤
//! │ en       │ ,         │ 12.50    │ MM/DD/YYYY   │
//! │ ru, ky   │ ;         │ 12,50    │ DD.MM.YYYY   │
//! └──────────┴───────────┴──────────┴──────────────┘
//! ```
//!
//! Spreadsheet apps in the ru/ky locales treat `,` as the decimal mark, so
//! those files use `;` between fields. A field is quoted when it contains
//! the delimiter, a quote, or a line break; quotes inside are doubled. Files
//! start with a UTF-8 BOM so Excel picks the right encoding.
//!
//! Dates are the UTC calendar date.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::ledger::{generate_ledger, LedgerScope};
use crate::money::Money;
use crate::report::{dashboard_stats, sales_rows, supplier_rows};
use crate::types::{Client, DiscountRate, Expense, Order, Product, ReportType, SearchLog};

/// UTF-8 byte order mark.
pub const BOM: char = '\u{FEFF}';

// =============================================================================
// Language
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Ru,
    En,
    Ky,
}

impl Lang {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Lang::Ru => "ru",
            Lang::En => "en",
            Lang::Ky => "ky",
        }
    }

    pub const fn delimiter(&self) -> char {
        match self {
            Lang::En => ',',
            _ => ';',
        }
    }

    pub const fn decimal_comma(&self) -> bool {
        !matches!(self, Lang::En)
    }

    pub fn labels(&self) -> &'static CsvLabels {
        match self {
            Lang::Ru => &CSV_I18N[0].1,
            Lang::En => &CSV_I18N[1].1,
            Lang::Ky => &CSV_I18N[2].1,
        }
    }
}

impl FromStr for Lang {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" => Ok(Lang::Ru),
            "en" => Ok(Lang::En),
            "ky" => Ok(Lang::Ky),
            _ => Err(ValidationError::NotAllowed {
                field: "language".to_string(),
                allowed: vec!["ru".to_string(), "en".to_string(), "ky".to_string()],
            }),
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Header Labels
// =============================================================================

/// Column and status labels for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvLabels {
    pub order_id: &'static str,
    pub date: &'static str,
    pub client: &'static str,
    pub brand: &'static str,
    pub status: &'static str,
    pub sku: &'static str,
    pub product: &'static str,
    pub qty: &'static str,
    pub unit: &'static str,
    pub price: &'static str,
    pub purchase_price: &'static str,
    pub logistics: &'static str,
    pub profit: &'static str,
    pub item_total: &'static str,
    pub order_total: &'static str,
    pub paid: &'static str,
    pub remaining: &'static str,
    pub supplier: &'static str,
    pub supplier_wechat: &'static str,
    pub phone: &'static str,
    pub balance: &'static str,
    pub category: &'static str,
    pub title: &'static str,
    pub amount: &'static str,
    pub revenue: &'static str,
    pub available: &'static str,
    pub reserved: &'static str,
    pub query: &'static str,
    pub results: &'static str,
    pub kind: &'static str,
    pub description: &'static str,
    pub debit: &'static str,
    pub credit: &'static str,
    pub running_balance: &'static str,
    pub transaction_type: &'static str,
    pub cogs: &'static str,
    pub logistics_total: &'static str,
    pub expenses: &'static str,
    pub gross_profit: &'static str,
    pub net_profit: &'static str,
    pub status_confirmed: &'static str,
    pub status_in_progress: &'static str,
    pub status_delivered: &'static str,
    pub status_cancelled: &'static str,
    pub status_submitted: &'static str,
    pub status_draft: &'static str,
}

pub static CSV_I18N: [(Lang, CsvLabels); 3] = [
    (
        Lang::Ru,
        CsvLabels {
            order_id: "№ заказа",
            date: "Дата",
            client: "Клиент",
            brand: "Бренд",
            status: "Статус",
            sku: "Артикул",
            product: "Товар",
            qty: "Кол-во",
            unit: "Ед.",
            price: "Цена продажи",
            purchase_price: "Закупка (Cost)",
            logistics: "Логистика (Unit)",
            profit: "Прибыль",
            item_total: "Сумма позиции",
            order_total: "Итого заказа",
            paid: "Оплачено",
            remaining: "Остаток долга",
            supplier: "Поставщик",
            supplier_wechat: "WeChat",
            phone: "Телефон",
            balance: "Баланс",
            category: "Категория",
            title: "Название",
            amount: "Сумма",
            revenue: "Выручка",
            available: "Доступно",
            reserved: "Резерв",
            query: "Запрос",
            results: "Найдено",
            kind: "Тип",
            description: "Описание",
            debit: "Дебет (Долг)",
            credit: "Кредит (Оплата)",
            running_balance: "Текущий баланс",
            transaction_type: "Тип операции",
            cogs: "Себестоимость",
            logistics_total: "Логистика",
            expenses: "Расходы",
            gross_profit: "Валовая прибыль",
            net_profit: "Чистая прибыль",
            status_confirmed: "Подтверждён",
            status_in_progress: "В процессе",
            status_delivered: "Доставлен",
            status_cancelled: "Отменён",
            status_submitted: "Отправлен",
            status_draft: "Черновик",
        },
    ),
    (
        Lang::En,
        CsvLabels {
            order_id: "Order ID",
            date: "Date",
            client: "Client",
            brand: "Brand",
            status: "Status",
            sku: "SKU",
            product: "Product",
            qty: "Qty",
            unit: "Unit",
            price: "Price",
            purchase_price: "Purchase Price (Cost)",
            logistics: "Logistics (Unit)",
            profit: "Profit",
            item_total: "Item Total",
            order_total: "Order Total",
            paid: "Paid",
            remaining: "Remaining",
            supplier: "Supplier",
            supplier_wechat: "WeChat",
            phone: "Phone",
            balance: "Balance",
            category: "Category",
            title: "Title",
            amount: "Amount",
            revenue: "Revenue",
            available: "Available",
            reserved: "Reserved",
            query: "Query",
            results: "Results",
            kind: "Type",
            description: "Description",
            debit: "Debit (Debt)",
            credit: "Credit (Payment)",
            running_balance: "Running Balance",
            transaction_type: "Tx Type",
            cogs: "COGS",
            logistics_total: "Logistics",
            expenses: "Expenses",
            gross_profit: "Gross Profit",
            net_profit: "Net Profit",
            status_confirmed: "Confirmed",
            status_in_progress: "In progress",
            status_delivered: "Delivered",
            status_cancelled: "Cancelled",
            status_submitted: "Submitted",
            status_draft: "Draft",
        },
    ),
    (
        Lang::Ky,
        CsvLabels {
            order_id: "Заказ №",
            date: "Күнү",
            client: "Кардар",
            brand: "Бренд",
            status: "Абалы",
            sku: "Артикул",
            product: "Товар",
            qty: "Саны",
            unit: "Өлч.",
            price: "Баа",
            purchase_price: "Сатып алуу (Cost)",
            logistics: "Логистика (Unit)",
            profit: "Пайда",
            item_total: "Позиция суммасы",
            order_total: "Заказдын суммасы",
            paid: "Төлөндү",
            remaining: "Калган карыз",
            supplier: "Поставщик",
            supplier_wechat: "WeChat",
            phone: "Телефон",
            balance: "Баланс",
            category: "Категория",
            title: "Аты",
            amount: "Сумма",
            revenue: "Түшүм",
            available: "Жеткиликтүү",
            reserved: "Резерв",
            query: "Сурам",
            results: "Табылды",
            kind: "Түрү",
            description: "Сүрөттөмө",
            debit: "Дебет (Карыз)",
            credit: "Кредит (Төлөм)",
            running_balance: "Учурдагы баланс",
            transaction_type: "Операция түрү",
            cogs: "Өздүк нарк",
            logistics_total: "Логистика",
            expenses: "Чыгымдар",
            gross_profit: "Дүң пайда",
            net_profit: "Таза пайда",
            status_confirmed: "Тастыкталды",
            status_in_progress: "Процессте",
            status_delivered: "Жеткирилди",
            status_cancelled: "Жокко чыгарылды",
            status_submitted: "Жөнөтүлдү",
            status_draft: "Каралама",
        },
    ),
];

// =============================================================================
// Field Formatting
// =============================================================================

/// Two decimals with the language's decimal separator.
pub fn format_amount(amount: Money, lang: Lang) -> String {
    amount.to_decimal_string(lang.decimal_comma())
}

/// `MM/DD/YYYY` for English, `DD.MM.YYYY` otherwise.
pub fn format_date(date: DateTime<Utc>, lang: Lang) -> String {
    match lang {
        Lang::En => date.format("%m/%d/%Y").to_string(),
        _ => date.format("%d.%m.%Y").to_string(),
    }
}

/// Quotes a field if it contains the delimiter, a quote or a line break.
pub fn escape_cell(value: &str, delimiter: char) -> String {
    let must_quote = value.contains(['"', '\n', '\r']) || value.contains(delimiter);
    let safe = value.replace('"', "\"\"");
    if must_quote {
        format!("\"{}\"", safe)
    } else {
        safe
    }
}

/// Maps a status name onto one of six localized buckets.
///
/// `ORDERED` lands in "submitted" rather than passing through raw, and
/// `READY_FOR_DELIVERY` is matched before the `DELIVER` keyword so it stays
/// "in progress" until the order is actually delivered.
///
/// Unrecognized statuses are returned unchanged.
pub fn localize_status(status: &str, lang: Lang) -> String {
    let t = lang.labels();
    let s = status.to_uppercase();
    let has = |keys: &[&str]| keys.iter().any(|k| s.contains(k));

    let label = if has(&["CANCEL"]) {
        t.status_cancelled
    } else if has(&["DRAFT"]) {
        t.status_draft
    } else if has(&["SUBMIT", "CREATED", "PENDING", "ORDERED"]) {
        t.status_submitted
    } else if has(&["CONFIRM", "APPROV"]) {
        t.status_confirmed
    } else if has(&["READY", "WAREHOUSE"]) {
        t.status_in_progress
    } else if has(&["DELIVER", "DONE", "COMPLET"]) {
        t.status_delivered
    } else if has(&["PROGRESS", "SHIP", "TRANSIT", "FACTORY", "PRODUC"]) {
        t.status_in_progress
    } else {
        return status.to_string();
    };

    label.to_string()
}

/// `<name>_<YYYY-MM-DD>.csv`
pub fn export_filename(name: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", name, date.format("%Y-%m-%d"))
}

// =============================================================================
// Document
// =============================================================================

/// A header plus data rows, rendered with one language's delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDocument {
    pub delimiter: char,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvDocument {
    pub fn new(lang: Lang, header: &[&str]) -> Self {
        Self {
            delimiter: lang.delimiter(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// A document with no header and no rows.
    pub fn empty(lang: Lang) -> Self {
        Self::new(lang, &[])
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// True when there is nothing to export.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// BOM, then the header and rows joined by `\n`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push(BOM);

        let delimiter = self.delimiter.to_string();
        let lines = std::iter::once(&self.header)
            .chain(&self.rows)
            .map(|fields| {
                fields
                    .iter()
                    .map(|f| escape_cell(f, self.delimiter))
                    .collect::<Vec<_>>()
                    .join(delimiter.as_str())
            })
            .collect::<Vec<_>>();

        out.push_str(&lines.join("\n"));
        out
    }
}

// =============================================================================
// Report Builders
// =============================================================================

/// Everything a report may read.
#[derive(Debug, Clone, Copy)]
pub struct ReportSources<'a> {
    pub products: &'a [Product],
    pub orders: &'a [Order],
    pub clients: &'a [Client],
    pub expenses: &'a [Expense],
    pub search_logs: &'a [SearchLog],
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub lang: Lang,
    pub discount: DiscountRate,
    /// Used by CLIENT_LEDGER only.
    pub scope: LedgerScope,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            lang: Lang::default(),
            discount: DiscountRate::FACTORY_DEFAULT,
            scope: LedgerScope::All,
        }
    }
}

/// Builds a report by name. Unknown names give an empty document.
pub fn build_report(kind: &str, sources: &ReportSources<'_>, options: &ReportOptions) -> CsvDocument {
    match kind.parse::<ReportType>() {
        Ok(report_type) => build_typed_report(report_type, sources, options),
        Err(_) => CsvDocument::empty(options.lang),
    }
}

pub fn build_typed_report(report_type: ReportType, sources: &ReportSources<'_>, options: &ReportOptions) -> CsvDocument {
    let lang = options.lang;
    let t = lang.labels();
    let money = |m: Money| format_amount(m, lang);

    match report_type {
        ReportType::Supplier => {
            let mut doc = CsvDocument::new(
                lang,
                &[t.supplier, t.supplier_wechat, t.brand, t.sku, t.qty, t.client, t.purchase_price],
            );
            for r in supplier_rows(sources.orders) {
                doc.push(vec![
                    r.supplier_name,
                    r.supplier_wechat,
                    r.client_brand,
                    r.sku,
                    r.quantity.to_string(),
                    r.username,
                    money(r.purchase_price),
                ]);
            }
            doc
        }

        ReportType::Clients => {
            let mut doc = CsvDocument::new(lang, &[t.client, t.brand, t.phone, t.balance, "Telegram ID"]);
            for c in sources.clients {
                doc.push(vec![
                    c.name.clone(),
                    c.brand.clone(),
                    c.phone.clone(),
                    money(c.balance),
                    c.telegram_id.clone(),
                ]);
            }
            doc
        }

        ReportType::ClientLedger => {
            let mut doc = CsvDocument::new(
                lang,
                &[
                    t.date,
                    t.client,
                    t.transaction_type,
                    t.description,
                    t.debit,
                    t.credit,
                    t.running_balance,
                    t.order_id,
                ],
            );
            for r in generate_ledger(sources.orders, sources.clients, &options.scope) {
                doc.push(vec![
                    format_date(r.date, lang),
                    r.client_name,
                    r.tx_type.as_str().to_string(),
                    r.description,
                    money(r.debit),
                    money(r.credit),
                    money(r.running_balance),
                    r.order_id,
                ]);
            }
            doc
        }

        ReportType::SalesAll | ReportType::SalesFabric | ReportType::SalesHardware => {
            let mut doc = CsvDocument::new(
                lang,
                &[
                    t.order_id,
                    t.date,
                    t.client,
                    t.brand,
                    t.status,
                    t.sku,
                    t.product,
                    t.qty,
                    t.unit,
                    t.price,
                    t.purchase_price,
                    t.logistics,
                    t.profit,
                    t.item_total,
                    t.order_total,
                    t.paid,
                    t.remaining,
                ],
            );
            for r in sales_rows(sources.orders, report_type.sales_filter(), options.discount) {
                doc.push(vec![
                    r.order_id,
                    format_date(r.date, lang),
                    r.username,
                    r.client_brand,
                    localize_status(r.status.as_str(), lang),
                    r.sku,
                    r.title,
                    r.quantity.to_string(),
                    r.unit,
                    money(r.price),
                    money(r.purchase_price),
                    money(r.logistics_cost),
                    money(r.profit),
                    money(r.revenue),
                    money(r.order_total),
                    money(r.paid),
                    money(r.remaining),
                ]);
            }
            doc
        }

        ReportType::Expenses => {
            let mut doc = CsvDocument::new(lang, &[t.date, t.title, t.category, t.amount]);
            for e in sources.expenses {
                doc.push(vec![
                    format_date(e.date, lang),
                    e.title.clone(),
                    e.category.as_str().to_string(),
                    money(e.amount),
                ]);
            }
            doc
        }

        ReportType::Income => {
            let stats = dashboard_stats(sources.orders, sources.expenses, options.discount);
            let mut doc = CsvDocument::new(lang, &[t.title, t.amount]);
            for (label, value) in [
                (t.revenue, stats.revenue),
                (t.cogs, stats.cogs),
                (t.logistics_total, stats.logistics),
                (t.expenses, stats.total_expenses),
                (t.gross_profit, stats.gross_profit),
                (t.net_profit, stats.net_profit),
            ] {
                doc.push(vec![label.to_string(), money(value)]);
            }
            doc
        }

        ReportType::Inventory => {
            let mut doc = CsvDocument::new(
                lang,
                &[t.sku, t.title, t.category, t.price, t.available, t.reserved, t.unit],
            );
            for p in sources.products {
                doc.push(vec![
                    p.sku.clone(),
                    p.title.clone(),
                    p.category.clone(),
                    money(p.price),
                    p.available_qty.to_string(),
                    p.reserved_qty.to_string(),
                    p.unit.clone(),
                ]);
            }
            doc
        }

        ReportType::SearchLogs => {
            let mut doc = CsvDocument::new(lang, &[t.date, t.client, t.kind, t.query, t.results]);
            for l in sources.search_logs {
                doc.push(vec![
                    format_date(l.timestamp, lang),
                    l.client_name.clone(),
                    l.log_type.as_str().to_string(),
                    l.query
                        .clone()
                        .filter(|q| !q.is_empty())
                        .unwrap_or_else(|| "(Photo)".to_string()),
                    l.results_count.to_string(),
                ]);
            }
            doc
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
