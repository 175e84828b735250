use chrono::NaiveDateTime;

use crate::db_types::VerifiedPayment;

pub const RECEIPT_TITLE: &str = "SCHOOL PAYMENT RECEIPT";
pub const RECEIPT_FOOTER: &str = "Thank you for your payment!";
const GATEWAY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const RECEIPT_DATE_FORMAT: &str = "%d %b %Y, %I:%M %p";
const MISSING: &str = "N/A";

/// The text of a receipt, in the order it is printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptDocument {
    items: Vec<(&'static str, String)>,
}

impl ReceiptDocument {
    pub fn for_payment(payment: &VerifiedPayment) -> Self {
        let or_missing = |v: &Option<String>| v.clone().unwrap_or_else(|| MISSING.to_string());
        let date = payment.paid_at.as_deref().map(format_paid_at).unwrap_or_else(|| MISSING.to_string());
        let items = vec![
            ("Reference", payment.reference.clone()),
            ("Student Email", payment.email.clone()),
            ("Amount Paid", payment.amount.to_string()),
            ("Date", date),
            ("Status", payment.status.clone()),
            ("Channel", or_missing(&payment.channel)),
            ("Bank", or_missing(&payment.bank)),
        ];
        Self { items }
    }

    pub fn title(&self) -> &str {
        RECEIPT_TITLE
    }

    pub fn footer(&self) -> &str {
        RECEIPT_FOOTER
    }

    /// The labelled lines between the title and the footer.
    pub fn items(&self) -> impl Iterator<Item = String> + '_ {
        self.items.iter().map(|(label, value)| format!("{label}: {value}"))
    }

    /// Every line of the receipt, title and footer included.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.items.len() + 2);
        lines.push(RECEIPT_TITLE.to_string());
        lines.extend(self.items());
        lines.push(RECEIPT_FOOTER.to_string());
        lines
    }

    pub fn contains(&self, text: &str) -> bool {
        self.lines().iter().any(|l| l.contains(text))
    }
}

/// Reformats a gateway timestamp such as `2024-01-15T10:30:00.000Z` as `15 Jan 2024, 10:30 AM`. Timestamps in any
/// other format are returned unchanged.
pub fn format_paid_at(paid_at: &str) -> String {
    NaiveDateTime::parse_from_str(paid_at, GATEWAY_DATE_FORMAT)
        .map(|dt| dt.format(RECEIPT_DATE_FORMAT).to_string())
        .unwrap_or_else(|_| paid_at.to_string())
}
