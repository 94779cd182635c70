use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Prefix reserved for client-generated placeholder ids
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Bill identifier: a numeric sequence value or an opaque string.
///
/// Decimal-looking strings are coerced to `Numeric` when deserialized, unless
/// they carry the temporary id prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BillId {
    Numeric(i64),
    Text(String),
}

impl BillId {
    /// Parse an id as it arrives in a path or query string
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with(TEMP_ID_PREFIX) {
            return BillId::Text(trimmed.to_string());
        }
        match trimmed.parse::<i64>() {
            Ok(n) => BillId::Numeric(n),
            Err(_) => BillId::Text(trimmed.to_string()),
        }
    }

    /// Whether this is a client-generated placeholder id
    pub fn is_temporary(&self) -> bool {
        matches!(self, BillId::Text(t) if t.starts_with(TEMP_ID_PREFIX))
    }

    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            BillId::Numeric(n) => Some(*n),
            BillId::Text(_) => None,
        }
    }
}

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillId::Numeric(n) => write!(f, "{}", n),
            BillId::Text(t) => write!(f, "{}", t),
        }
    }
}

impl Serialize for BillId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BillId::Numeric(n) => serializer.serialize_i64(*n),
            BillId::Text(t) => serializer.serialize_str(t),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBillId {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for BillId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = match RawBillId::deserialize(deserializer)? {
            RawBillId::Integer(n) => BillId::Numeric(n),
            RawBillId::Float(f) if f.fract() == 0.0 && f.is_finite() => BillId::Numeric(f as i64),
            RawBillId::Float(f) => BillId::Text(f.to_string()),
            RawBillId::Text(t) => BillId::parse(&t),
        };
        Ok(id)
    }
}

/// The fixed set of spend categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum BillCategory {
    Utilities,
    Entertainment,
    Subscriptions,
    Insurance,
    Rent,
    Transportation,
    Food,
    Other,
}

impl BillCategory {
    pub const ALL: [BillCategory; 8] = [
        BillCategory::Utilities,
        BillCategory::Entertainment,
        BillCategory::Subscriptions,
        BillCategory::Insurance,
        BillCategory::Rent,
        BillCategory::Transportation,
        BillCategory::Food,
        BillCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BillCategory::Utilities => "Utilities",
            BillCategory::Entertainment => "Entertainment",
            BillCategory::Subscriptions => "Subscriptions",
            BillCategory::Insurance => "Insurance",
            BillCategory::Rent => "Rent",
            BillCategory::Transportation => "Transportation",
            BillCategory::Food => "Food",
            BillCategory::Other => "Other",
        }
    }

    /// Exact, case-sensitive match against the category labels
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }

    /// Case-insensitive match with surrounding whitespace ignored; anything
    /// unrecognized becomes `Other`
    pub fn coerce(label: &str) -> Self {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or(BillCategory::Other)
    }

    /// Subscription-like categories are recurring unless told otherwise
    pub fn is_recurring_by_default(&self) -> bool {
        matches!(self, BillCategory::Subscriptions | BillCategory::Entertainment)
    }
}

impl From<String> for BillCategory {
    fn from(label: String) -> Self {
        Self::coerce(&label)
    }
}

impl fmt::Display for BillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state, co-maintained with `Bill::paid`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Paid,
    Pending,
    Overdue,
}

/// One payment made against a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: f64,
    /// Payment date as supplied (usually YYYY-MM-DD)
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub method: String,
}

/// A single recurring-or-one-time payment obligation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub bill_name: String,
    pub amount: f64,
    /// Due date exactly as supplied by the client; see the backend's due date normalizer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// `None` means the bill has never been categorized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<BillCategory>,
    #[serde(default)]
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BillStatus>,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payments: Vec<Payment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_cycle: Option<String>,
}

impl Bill {
    /// Category used for grouping; uncategorized bills count as `Other`
    pub fn effective_category(&self) -> BillCategory {
        self.category.unwrap_or(BillCategory::Other)
    }

    pub fn payments_total(&self) -> f64 {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// Whether recorded payments add up to the bill amount (to the cent)
    pub fn payments_reconcile(&self) -> bool {
        self.payments.is_empty() || (self.payments_total() - self.amount).abs() < 0.01
    }
}

/// Due date as it may arrive on the write path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DueDateInput {
    Text(String),
    Calendar { year: i32, month: u32, day: u32 },
    /// Unix timestamp in seconds
    Timestamp(i64),
}

/// Request body for POST /bills
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateBillRequest {
    /// Optional client id (numeric, or a `temp-` placeholder); assigned when absent
    #[serde(default)]
    pub id: Option<BillId>,
    #[serde(default)]
    pub bill_name: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub due_date: Option<DueDateInput>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub paid: Option<bool>,
    #[serde(default)]
    pub status: Option<BillStatus>,
    #[serde(default)]
    pub recurring: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payments: Option<Vec<Payment>>,
    #[serde(default)]
    pub billing_cycle: Option<String>,
}

/// Request body for PUT /bills/{id}; only supplied fields change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBillRequest {
    #[serde(default)]
    pub bill_name: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub due_date: Option<DueDateInput>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub paid: Option<bool>,
    #[serde(default)]
    pub status: Option<BillStatus>,
    #[serde(default)]
    pub recurring: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payments: Option<Vec<Payment>>,
    #[serde(default)]
    pub billing_cycle: Option<String>,
}

/// Response after creating or updating a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillResponse {
    pub message: String,
    pub bill: Bill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Request body for DELETE /bills/by-name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteByNameRequest {
    #[serde(default)]
    pub bill_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteBillsResponse {
    pub message: String,
    pub deleted_count: usize,
}

/// Request body for POST /send-reminder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendReminderRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bill_name: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReminderResponse {
    pub sent: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Highest-spending category; `category` is "None" for an empty collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighestCategory {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub total_spent: f64,
    pub category_totals: BTreeMap<BillCategory, f64>,
    /// Always contains all eight categories
    pub category_percentages: BTreeMap<BillCategory, f64>,
    pub highest_category: HighestCategory,
    pub frequent_services: Vec<String>,
    pub suggestions: String,
}

/// Request body for POST /ai-query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiQueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    /// Prior conversation, as plain text
    #[serde(default)]
    pub conversation: Option<String>,
}

/// Compact bill view sent to the model and echoed back to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillSummary {
    pub name: String,
    pub amount: f64,
    pub due_date: Option<String>,
}

impl From<&Bill> for BillSummary {
    fn from(bill: &Bill) -> Self {
        Self {
            name: bill.bill_name.clone(),
            amount: bill.amount,
            due_date: bill.due_date.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiQueryResponse {
    pub response: String,
    pub bills: Vec<BillSummary>,
    /// True when the query was refused by the topic guard
    pub restricted: bool,
}

/// Request body for POST /classify-bill
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifyBillRequest {
    #[serde(default)]
    pub bill_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyBillResponse {
    pub bill_name: String,
    pub category: BillCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizeAllResponse {
    pub message: String,
    pub updated_count: usize,
    pub skipped_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageSpendingResponse {
    pub bill_count: usize,
    pub total_spent: f64,
    pub average_per_bill: f64,
    /// Average bill amount within each category (0 for empty categories)
    pub category_averages: BTreeMap<BillCategory, f64>,
    pub category_percentages: BTreeMap<BillCategory, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryComparisonEntry {
    pub category: BillCategory,
    pub total: f64,
    pub percentage: f64,
    pub bill_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryComparisonResponse {
    pub total_spent: f64,
    pub categories: Vec<CategoryComparisonEntry>,
    pub highest_category: HighestCategory,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bill_id() {
        assert_eq!(BillId::parse("42"), BillId::Numeric(42));
        assert_eq!(BillId::parse(" 7 "), BillId::Numeric(7));
        assert_eq!(BillId::parse("temp-123"), BillId::Text("temp-123".to_string()));
        assert_eq!(BillId::parse("abc"), BillId::Text("abc".to_string()));

        assert!(BillId::parse("temp-1").is_temporary());
        assert!(!BillId::parse("1").is_temporary());
    }

    #[test]
    fn test_bill_id_deserialize_coerces_numeric_strings() {
        let id: BillId = serde_json::from_value(json!("15")).unwrap();
        assert_eq!(id, BillId::Numeric(15));

        let id: BillId = serde_json::from_value(json!(15)).unwrap();
        assert_eq!(id, BillId::Numeric(15));

        let id: BillId = serde_json::from_value(json!(15.0)).unwrap();
        assert_eq!(id, BillId::Numeric(15));

        let id: BillId = serde_json::from_value(json!("temp-15")).unwrap();
        assert_eq!(id, BillId::Text("temp-15".to_string()));
    }

    #[test]
    fn test_bill_id_serializes_untagged() {
        assert_eq!(serde_json::to_value(BillId::Numeric(3)).unwrap(), json!(3));
        assert_eq!(
            serde_json::to_value(BillId::Text("temp-a".to_string())).unwrap(),
            json!("temp-a")
        );
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(BillCategory::from_label("Rent"), Some(BillCategory::Rent));
        assert_eq!(BillCategory::from_label("rent"), None);
        assert_eq!(BillCategory::from_label("Banana"), None);

        assert_eq!(BillCategory::coerce(" utilities "), BillCategory::Utilities);
        assert_eq!(BillCategory::coerce("Banana"), BillCategory::Other);
        assert_eq!(BillCategory::coerce(""), BillCategory::Other);
    }

    #[test]
    fn test_unknown_category_deserializes_to_other() {
        let category: BillCategory = serde_json::from_value(json!("Groceries")).unwrap();
        assert_eq!(category, BillCategory::Other);

        let category: BillCategory = serde_json::from_value(json!("Food")).unwrap();
        assert_eq!(category, BillCategory::Food);
    }

    #[test]
    fn test_bill_deserializes_sparse_document() {
        let bill: Bill = serde_json::from_value(json!({
            "id": 1,
            "bill_name": "Water Bill",
            "amount": 45.5
        }))
        .unwrap();

        assert_eq!(bill.id, BillId::Numeric(1));
        assert_eq!(bill.due_date, None);
        assert_eq!(bill.category, None);
        assert_eq!(bill.effective_category(), BillCategory::Other);
        assert!(!bill.paid);
        assert!(bill.payments.is_empty());
    }

    #[test]
    fn test_bill_serialization_skips_empty_fields() {
        let bill = Bill {
            id: BillId::Numeric(2),
            bill_name: "Netflix".to_string(),
            amount: 15.99,
            due_date: Some("2025-01-01".to_string()),
            category: Some(BillCategory::Subscriptions),
            paid: false,
            status: Some(BillStatus::Pending),
            recurring: true,
            notes: None,
            payments: Vec::new(),
            billing_cycle: None,
        };

        let value = serde_json::to_value(&bill).unwrap();
        assert_eq!(value["category"], json!("Subscriptions"));
        assert_eq!(value["status"], json!("pending"));
        assert!(value.get("payments").is_none());
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn test_payments_reconcile() {
        let mut bill: Bill = serde_json::from_value(json!({
            "id": 3,
            "bill_name": "Car Payment",
            "amount": 300.0,
            "paid": true,
            "payments": [
                {"amount": 100.0, "date": "2025-01-01", "method": "PayPal"},
                {"amount": 200.0, "date": "2025-01-08", "method": "Venmo"}
            ]
        }))
        .unwrap();

        assert!(bill.payments_reconcile());
        assert_eq!(bill.payments_total(), 300.0);

        bill.amount = 310.0;
        assert!(!bill.payments_reconcile());
    }

    #[test]
    fn test_due_date_input_variants() {
        let text: DueDateInput = serde_json::from_value(json!("2025-03-01")).unwrap();
        assert_eq!(text, DueDateInput::Text("2025-03-01".to_string()));

        let calendar: DueDateInput =
            serde_json::from_value(json!({"year": 2025, "month": 3, "day": 1})).unwrap();
        assert_eq!(calendar, DueDateInput::Calendar { year: 2025, month: 3, day: 1 });

        let timestamp: DueDateInput = serde_json::from_value(json!(1740787200)).unwrap();
        assert_eq!(timestamp, DueDateInput::Timestamp(1740787200));
    }
}
