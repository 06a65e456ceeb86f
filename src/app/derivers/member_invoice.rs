use super::BillingDates;
use crate::config::toml_config::MemberRates;
use crate::domain::format::format_date;
use crate::domain::model::TowTicket;
use crate::domain::money::{LineAmount, Money};
use crate::domain::name::Name;
use crate::domain::ports::{BillingLine, LineDeriver};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    Towing,
    GliderRental,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Product::Towing => f.write_str("Towing"),
            Product::GliderRental => f.write_str("Glider Rental"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberClass {
    Tow,
    Glider,
}

impl fmt::Display for MemberClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberClass::Tow => f.write_str("TOW"),
            MemberClass::Glider => f.write_str("GLIDER"),
        }
    }
}

/// One charge on a member's invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInvoiceLine {
    pub name: Name,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub service_date: NaiveDateTime,
    pub description: String,
    pub product: Product,
    pub classification: MemberClass,
    pub amount: LineAmount,
}

impl MemberInvoiceLine {
    pub fn from_tow_data(ticket: &TowTicket, deriver: &MemberInvoiceDeriver) -> Vec<Self> {
        deriver.derive(ticket)
    }
}

impl BillingLine for MemberInvoiceLine {
    const HEADERS: &'static [&'static str] = &[
        "Display Name",
        "Invoice Date",
        "Due Date",
        "Service Date",
        "Description or Memo",
        "Product",
        "CLASS",
        "SORT Last Name",
        "SORT First Name",
        "Sum of Tow Fee",
    ];

    fn payee(&self) -> &Name {
        &self.name
    }

    fn service_date(&self) -> NaiveDateTime {
        self.service_date
    }

    fn total(&self) -> Money {
        self.amount.total()
    }

    fn to_record(&self, lead_row: bool) -> Vec<String> {
        let (display_name, invoice_date, due_date) = if lead_row {
            (
                self.name.to_string(),
                format_date(self.invoice_date),
                format_date(self.due_date),
            )
        } else {
            (String::new(), String::new(), String::new())
        };

        vec![
            display_name,
            invoice_date,
            due_date,
            format_date(self.service_date.date()),
            self.description.clone(),
            self.product.to_string(),
            self.classification.to_string(),
            self.name.sort_last_name().to_string(),
            self.name.first().to_string(),
            self.total().to_string(),
        ]
    }
}

/// Member-side rules: the tow fee line first, then the glider rental line.
#[derive(Debug, Clone)]
pub struct MemberInvoiceDeriver {
    dates: BillingDates,
    rates: MemberRates,
    log_incomplete: bool,
}

impl MemberInvoiceDeriver {
    pub fn new(dates: BillingDates, rates: MemberRates) -> Self {
        Self {
            dates,
            rates,
            log_incomplete: true,
        }
    }

    pub fn log_incomplete(mut self, enabled: bool) -> Self {
        self.log_incomplete = enabled;
        self
    }

    fn line(&self, ticket: &TowTicket, description: String, product: Product, amount: LineAmount) -> MemberInvoiceLine {
        let classification = match product {
            Product::Towing => MemberClass::Tow,
            Product::GliderRental => MemberClass::Glider,
        };
        MemberInvoiceLine {
            name: ticket.pilot().clone(),
            invoice_date: self.dates.invoice_date,
            due_date: self.dates.due_date,
            service_date: ticket.date_time(),
            description,
            product,
            classification,
            amount,
        }
    }
}

impl LineDeriver for MemberInvoiceDeriver {
    type Line = MemberInvoiceLine;

    fn derive(&self, ticket: &TowTicket) -> Vec<MemberInvoiceLine> {
        let mut items = Vec::new();

        if !ticket.is_completed() {
            if self.log_incomplete {
                tracing::warn!(
                    "Tow ticket {} is not flown and closed. No invoice items will be created.",
                    ticket.ticket()
                );
            }
            return items;
        }

        if ticket.bills_tow() {
            items.push(self.line(
                ticket,
                format!(
                    "Ticket #: {}, Release Alt: {}",
                    ticket.ticket(),
                    ticket.release_alt()
                ),
                Product::Towing,
                LineAmount::Flat(ticket.tow_fee()),
            ));
        }

        if let Some(amount) = self.rates.rental_charge(ticket) {
            items.push(self.line(
                ticket,
                format!(
                    "Ticket #: {}, Glider: {}, Glider Time: {} hours",
                    ticket.ticket(),
                    ticket.glider_id(),
                    ticket.glider_time()
                ),
                Product::GliderRental,
                amount,
            ));
        }

        if items.is_empty() {
            tracing::debug!("Tow ticket {} has no member charges", ticket.ticket());
        }

        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::fixtures::raw_row;
    use crate::domain::model::RawTowRow;

    fn deriver() -> MemberInvoiceDeriver {
        let dates = BillingDates::with_terms(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(), 30);
        MemberInvoiceDeriver::new(dates, MemberRates::default())
    }

    fn ticket(edit: impl FnOnce(&mut RawTowRow)) -> TowTicket {
        let mut raw = raw_row();
        edit(&mut raw);
        TowTicket::parse(&raw).unwrap()
    }

    #[test]
    fn test_standard_tow_yields_one_line() {
        let t = ticket(|_| {});
        let items = MemberInvoiceLine::from_tow_data(&t, &deriver());

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.total(), Money::from_dollars(50));
        assert_eq!(item.product, Product::Towing);
        assert_eq!(item.classification, MemberClass::Tow);
        assert_eq!(item.description, "Ticket #: 123, Release Alt: 3000");
        assert_eq!(item.name.to_string(), "Smith, John");
        assert_eq!(item.service_date, t.date_time());
        assert_eq!(item.due_date, NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
    }

    #[test]
    fn test_glider_rental_yields_tow_then_rental() {
        let t = ticket(|raw| {
            raw.billable_rental = Some("1".to_string());
            raw.tow_fee = Some("30.00".to_string());
            raw.rental_fee = Some("20.00".to_string());
        });
        let items = deriver().derive(&t);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product, Product::Towing);
        assert_eq!(items[0].total(), Money::from_dollars(30));
        assert_eq!(items[1].product, Product::GliderRental);
        assert_eq!(items[1].classification, MemberClass::Glider);
        assert_eq!(items[1].total(), Money::from_dollars(20));
        assert_eq!(
            items[1].description,
            "Ticket #: 123, Glider: G1, Glider Time: 1.5 hours"
        );
    }

    #[test]
    fn test_zero_fee_ticket_yields_nothing() {
        let t = ticket(|raw| {
            raw.tow_fee = Some("0.00".to_string());
            raw.rental_fee = None;
        });
        assert!(deriver().derive(&t).is_empty());
    }

    #[test]
    fn test_zero_rental_fee_is_not_billed() {
        let t = ticket(|raw| {
            raw.billable_rental = Some("1".to_string());
            raw.rental_fee = Some("0".to_string());
        });
        let items = deriver().derive(&t);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product, Product::Towing);
    }

    #[test]
    fn test_only_rental_when_tow_not_billable() {
        let t = ticket(|raw| {
            raw.billable_tow = Some("0".to_string());
            raw.billable_rental = Some("1".to_string());
            raw.rental_fee = Some("$45.00".to_string());
        });
        let items = deriver().derive(&t);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product, Product::GliderRental);
    }

    #[test]
    fn test_incomplete_tickets_yield_nothing() {
        let not_flown = ticket(|raw| raw.flown_flag = Some("0".to_string()));
        assert!(deriver().derive(&not_flown).is_empty());

        let not_closed = ticket(|raw| raw.closed_flag = Some("0".to_string()));
        assert!(deriver().log_incomplete(false).derive(&not_closed).is_empty());
    }

    #[test]
    fn test_hourly_rate_used_when_rental_fee_absent() {
        let mut rates = MemberRates::default();
        rates
            .glider_hourly_rates
            .insert("G1".to_string(), Money::from_cents(3333));
        let dates = BillingDates::with_terms(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(), 30);
        let deriver = MemberInvoiceDeriver::new(dates, rates);

        let t = ticket(|raw| {
            raw.billable_rental = Some("1".to_string());
            raw.glider_time = Some("1.5".to_string());
        });
        let items = deriver.derive(&t);

        assert_eq!(items.len(), 2);
        // 1.5 × $33.33 = $49.995 → $50.00
        assert_eq!(items[1].total(), Money::from_dollars(50));
        assert!(matches!(items[1].amount, LineAmount::Rated { .. }));
    }

    #[test]
    fn test_to_record_lead_and_follow_rows() {
        let t = ticket(|_| {});
        let item = &deriver().derive(&t)[0];

        assert_eq!(
            item.to_record(true),
            vec![
                "Smith, John",
                "06/15/2024",
                "07/15/2024",
                "06/01/2024",
                "Ticket #: 123, Release Alt: 3000",
                "Towing",
                "TOW",
                "Smith",
                "John",
                "$50.00",
            ]
        );

        let follow = item.to_record(false);
        assert_eq!(&follow[..3], &["", "", ""]);
        assert_eq!(follow[7], "Smith");
    }
}
