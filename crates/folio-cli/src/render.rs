//! Plain-text table rendering for list views.

use folio_core::models::{
    Customer, Message, Plan, Product, Project, Sale, Service, Testimonial, Transaction,
};
use folio_core::utils::{format_currency, format_date, format_optional, truncate};
use folio_core::Page;

/// Widest any single column may grow before its text is truncated
const MAX_COLUMN_WIDTH: usize = 40;

/// Gap between columns
const COLUMN_GAP: &str = "  ";

/// A record that can be shown as one row of a table.
pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

fn opt_date(date: &Option<String>) -> String {
    date.as_deref().map(format_date).unwrap_or_else(|| "-".to_string())
}

impl TableRow for Service {
    fn headers() -> &'static [&'static str] {
        &["ID", "TITLE", "DESCRIPTION"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.title.clone(), self.description.clone()]
    }
}

impl TableRow for Plan {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "PRICE", "FEATURES", "POPULAR"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.price_display(),
            self.features.len().to_string(),
            if self.is_popular { "yes" } else { "" }.to_string(),
        ]
    }
}

impl TableRow for Project {
    fn headers() -> &'static [&'static str] {
        &["ID", "TITLE", "CATEGORY", "TECHNOLOGIES", "FEATURED"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            format_optional(&self.category, "-"),
            self.technologies.join(", "),
            if self.is_featured { "yes" } else { "" }.to_string(),
        ]
    }
}

impl TableRow for Testimonial {
    fn headers() -> &'static [&'static str] {
        &["ID", "FROM", "RATING", "CONTENT"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.attribution(),
            self.rating.map(|r| "*".repeat(usize::from(r))).unwrap_or_default(),
            self.content.clone(),
        ]
    }
}

impl TableRow for Message {
    fn headers() -> &'static [&'static str] {
        &["ID", "", "FROM", "SUBJECT", "RECEIVED"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            if self.is_read { "" } else { "new" }.to_string(),
            format!("{} <{}>", self.name, self.email),
            format_optional(&self.subject, "(no subject)"),
            opt_date(&self.created_at),
        ]
    }
}

impl TableRow for Product {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "SKU", "CATEGORY", "PRICE", "QTY"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            format_optional(&self.sku, "-"),
            format_optional(&self.category, "-"),
            format_currency(self.price),
            self.quantity.to_string(),
        ]
    }
}

impl TableRow for Customer {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "EMAIL", "PHONE"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            format_optional(&self.email, "-"),
            format_optional(&self.phone, "-"),
        ]
    }
}

impl TableRow for Sale {
    fn headers() -> &'static [&'static str] {
        &["ID", "DATE", "CUSTOMER", "ITEMS", "TOTAL"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            opt_date(&self.date),
            format_optional(&self.customer_name, "walk-in"),
            self.items.len().to_string(),
            format_currency(self.total()),
        ]
    }
}

impl TableRow for Transaction {
    fn headers() -> &'static [&'static str] {
        &["ID", "DATE", "TYPE", "CATEGORY", "AMOUNT", "DESCRIPTION"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            opt_date(&self.date),
            self.kind.to_string(),
            format_optional(&self.category, "-"),
            format_currency(self.amount),
            self.description.clone(),
        ]
    }
}

/// Lay out rows under their headers with padded columns.
pub fn render_table<R: TableRow>(rows: &[R]) -> String {
    let headers = R::headers();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.cells().iter().map(|c| truncate(c, MAX_COLUMN_WIDTH)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_line(&mut out, &header_cells, &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
        .collect();
    out.push_str(line.join(COLUMN_GAP).trim_end());
    out.push('\n');
}

/// "Page 2 of 5 (43 items)"
pub fn page_footer<T>(page: &Page<T>) -> String {
    let noun = if page.total_items == 1 { "item" } else { "items" };
    format!(
        "Page {} of {} ({} {})",
        page.page, page.total_pages, page.total_items, noun
    )
}
