pub mod member_invoice;
pub mod vendor_bill;

use chrono::{Days, NaiveDate};

pub use member_invoice::{MemberClass, MemberInvoiceDeriver, MemberInvoiceLine, Product};
pub use vendor_bill::{VendorBillDeriver, VendorBillLine, VendorCategory, VendorClass};

/// Invoice/bill date and due date stamped on every derived line.
///
/// Passed in explicitly so that converting the same file twice yields the
/// same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingDates {
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl BillingDates {
    pub fn new(invoice_date: NaiveDate, due_date: NaiveDate) -> Self {
        Self {
            invoice_date,
            due_date,
        }
    }

    /// 到期日 = 開帳日 + due_days
    pub fn with_terms(invoice_date: NaiveDate, due_days: u32) -> Self {
        let due_date = invoice_date
            .checked_add_days(Days::new(u64::from(due_days)))
            .unwrap_or(NaiveDate::MAX);
        Self::new(invoice_date, due_date)
    }
}
