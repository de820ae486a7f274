//! Back-office records for the electronics store: inventory, customers,
//! sales and the finance ledger.

use serde::{Deserialize, Serialize};

use crate::cache::{Resource, Searchable};

use super::RecordId;

/// Stock level at or below which a product is flagged for reorder.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: RecordId,
    pub name: String,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: f64,
    #[serde(rename = "costPrice", default)]
    pub cost_price: Option<f64>,
    #[serde(default)]
    pub quantity: u32,
}

impl Product {
    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.quantity <= threshold
    }

    /// Retail value of the units on hand
    pub fn stock_value(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

impl Resource for Product {
    type Id = RecordId;
    const ENDPOINT: &'static str = "/products";
    const LABEL: &'static str = "product";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Searchable for Product {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.sku.as_deref());
        fields.extend(self.category.as_deref());
        fields.extend(self.brand.as_deref());
        fields
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    #[serde(rename = "_id", alias = "id")]
    pub id: RecordId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

impl Resource for Customer {
    type Id = RecordId;
    const ENDPOINT: &'static str = "/customers";
    const LABEL: &'static str = "customer";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Searchable for Customer {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.email.as_deref());
        fields.extend(self.phone.as_deref());
        fields
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleItem {
    #[serde(rename = "productId", alias = "product")]
    pub product_id: RecordId,
    #[serde(rename = "productName", default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    #[serde(rename = "unitPrice")]
    pub unit_price: f64,
}

impl SaleItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    #[serde(rename = "_id", alias = "id")]
    pub id: RecordId,
    #[serde(rename = "customerId", alias = "customer", default)]
    pub customer_id: Option<RecordId>,
    #[serde(rename = "customerName", default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub items: Vec<SaleItem>,
    /// Server-computed total; absent on older records
    #[serde(rename = "totalAmount", default)]
    pub total_amount: Option<f64>,
    #[serde(rename = "paymentMethod", default)]
    pub payment_method: Option<String>,
    pub date: Option<String>,
}

impl Sale {
    /// Server total when present, otherwise the sum of the line items
    pub fn total(&self) -> f64 {
        self.total_amount
            .unwrap_or_else(|| self.items.iter().map(SaleItem::line_total).sum())
    }
}

impl Resource for Sale {
    type Id = RecordId;
    const ENDPOINT: &'static str = "/sales";
    const LABEL: &'static str = "sale";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Searchable for Sale {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.id.as_str()];
        fields.extend(self.customer_name.as_deref());
        fields.extend(self.items.iter().filter_map(|i| i.product_name.as_deref()));
        fields
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "Income"),
            TransactionKind::Expense => write!(f, "Expense"),
        }
    }
}

/// Ledger entry in the finance section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    #[serde(rename = "_id", alias = "id")]
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Always positive; `kind` carries the direction
    pub amount: f64,
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
    pub date: Option<String>,
}

impl Resource for Transaction {
    type Id = RecordId;
    const ENDPOINT: &'static str = "/transactions";
    const LABEL: &'static str = "transaction";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Searchable for Transaction {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.description.as_str()];
        fields.extend(self.category.as_deref());
        fields
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FinanceSummary {
    pub income: f64,
    pub expenses: f64,
    pub transaction_count: usize,
}

impl FinanceSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        transactions
            .iter()
            .fold(Self::default(), |mut summary, tx| {
                match tx.kind {
                    TransactionKind::Income => summary.income += tx.amount.abs(),
                    TransactionKind::Expense => summary.expenses += tx.amount.abs(),
                }
                summary.transaction_count += 1;
                summary
            })
    }

    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }
}
