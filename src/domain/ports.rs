use crate::domain::model::TowTicket;
use crate::domain::money::Money;
use crate::domain::name::Name;
use chrono::NaiveDateTime;

/// One derived billing line that the tabular writer knows how to serialize.
pub trait BillingLine {
    /// Column names, in output order.
    const HEADERS: &'static [&'static str];

    /// Who the line is billed to or paid to; rows are grouped by it.
    fn payee(&self) -> &Name;

    fn service_date(&self) -> NaiveDateTime;

    fn total(&self) -> Money;

    /// 產生一列輸出；`lead_row` 為 false 時名稱與日期欄位留白
    fn to_record(&self, lead_row: bool) -> Vec<String>;
}

/// Maps one tow ticket to zero or more billing lines of a single output kind.
pub trait LineDeriver {
    type Line: BillingLine;

    fn derive(&self, ticket: &TowTicket) -> Vec<Self::Line>;

    /// 依輸入順序展開所有票的明細
    fn derive_all(&self, tickets: &[TowTicket]) -> Vec<Self::Line> {
        tickets.iter().flat_map(|t| self.derive(t)).collect()
    }
}
