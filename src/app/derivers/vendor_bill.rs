use super::BillingDates;
use crate::config::toml_config::{MemberRates, VendorRates};
use crate::domain::format::{format_date, format_date_time};
use crate::domain::model::{TicketCategory, TowTicket};
use crate::domain::money::Money;
use crate::domain::name::Name;
use crate::domain::ports::{BillingLine, LineDeriver};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorCategory {
    TowPilot,
    IntroPilot,
    FivePack,
}

impl fmt::Display for VendorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            VendorCategory::TowPilot => "Tow Pilot Expense",
            VendorCategory::IntroPilot => "Intro Pilot Expense",
            VendorCategory::FivePack => "5 Pack Expense",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorClass {
    Tow,
    IntroRides,
    FivePacks,
}

impl fmt::Display for VendorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            VendorClass::Tow => "TOW",
            VendorClass::IntroRides => "INTRO RIDES",
            VendorClass::FivePacks => "5 PACKS",
        };
        f.write_str(text)
    }
}

impl From<VendorCategory> for VendorClass {
    fn from(category: VendorCategory) -> Self {
        match category {
            VendorCategory::TowPilot => VendorClass::Tow,
            VendorCategory::IntroPilot => VendorClass::IntroRides,
            VendorCategory::FivePack => VendorClass::FivePacks,
        }
    }
}

/// One payable owed to a tow pilot or instructor.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorBillLine {
    pub vendor: Name,
    pub bill_date: NaiveDate,
    pub due_date: NaiveDate,
    pub service_date: NaiveDateTime,
    pub description: String,
    pub category: VendorCategory,
    pub classification: VendorClass,
    pub amount: Money,
}

impl VendorBillLine {
    pub fn from_tow_data(ticket: &TowTicket, deriver: &VendorBillDeriver) -> Vec<Self> {
        deriver.derive(ticket)
    }
}

impl BillingLine for VendorBillLine {
    const HEADERS: &'static [&'static str] = &[
        "Vendor Name",
        "Bill Date",
        "Due Date2",
        "Service Date",
        "Category Details - Memo",
        "Category Details - Category",
        "CLASS",
        "SORT NAME",
        "Sum of Category Details - Amount",
    ];

    fn payee(&self) -> &Name {
        &self.vendor
    }

    fn service_date(&self) -> NaiveDateTime {
        self.service_date
    }

    fn total(&self) -> Money {
        self.amount
    }

    fn to_record(&self, lead_row: bool) -> Vec<String> {
        let (vendor_name, bill_date, due_date) = if lead_row {
            (
                format!("{}.", self.vendor),
                format_date(self.bill_date),
                format_date(self.due_date),
            )
        } else {
            (String::new(), String::new(), String::new())
        };

        vec![
            vendor_name,
            bill_date,
            due_date,
            format_date_time(self.service_date),
            self.description.clone(),
            self.category.to_string(),
            self.classification.to_string(),
            self.vendor.to_string(),
            self.amount.to_string(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct VendorBillDeriver {
    dates: BillingDates,
    rates: VendorRates,
    glider_rates: MemberRates,
    log_incomplete: bool,
}

impl VendorBillDeriver {
    pub fn new(dates: BillingDates, rates: VendorRates) -> Self {
        Self {
            dates,
            rates,
            glider_rates: MemberRates::default(),
            log_incomplete: true,
        }
    }

    /// 票上沒有租金時，依每小時費率判斷這趟是否有租金
    pub fn with_glider_rates(mut self, glider_rates: MemberRates) -> Self {
        self.glider_rates = glider_rates;
        self
    }

    pub fn log_incomplete(mut self, enabled: bool) -> Self {
        self.log_incomplete = enabled;
        self
    }

    /// 廠商照付，不管會員是否被收費；只有整張票都沒有費用時才跳過
    fn has_charges(&self, ticket: &TowTicket) -> bool {
        ticket.has_fees() || self.glider_rates.rental_charge(ticket).is_some()
    }

    fn rate_for(&self, category: VendorCategory) -> Money {
        match category {
            VendorCategory::TowPilot => self.rates.tow_pilot,
            VendorCategory::IntroPilot => self.rates.intro_pilot,
            VendorCategory::FivePack => self.rates.five_pack,
        }
    }

    fn push_line(
        &self,
        items: &mut Vec<VendorBillLine>,
        ticket: &TowTicket,
        vendor: &Name,
        category: VendorCategory,
        description: String,
    ) {
        let amount = self.rate_for(category);
        if !amount.is_positive() {
            tracing::debug!(
                "Skipping {} for ticket {}: rate is zero",
                category,
                ticket.ticket()
            );
            return;
        }
        items.push(VendorBillLine {
            vendor: vendor.clone(),
            bill_date: self.dates.invoice_date,
            due_date: self.dates.due_date,
            service_date: ticket.date_time(),
            description,
            category,
            classification: category.into(),
            amount,
        });
    }
}

impl LineDeriver for VendorBillDeriver {
    type Line = VendorBillLine;

    fn derive(&self, ticket: &TowTicket) -> Vec<VendorBillLine> {
        let mut items = Vec::new();

        if !ticket.is_completed() {
            if self.log_incomplete {
                tracing::warn!(
                    "Tow ticket {} is not flown and closed. No vendor bill items will be created.",
                    ticket.ticket()
                );
            }
            return items;
        }

        if !self.has_charges(ticket) {
            tracing::debug!("Tow ticket {} has no charges, no vendor bills", ticket.ticket());
            return items;
        }

        if let Some(tow_pilot) = ticket.tow_pilot() {
            self.push_line(
                &mut items,
                ticket,
                tow_pilot,
                VendorCategory::TowPilot,
                format!(
                    "Ticket #: {}, Release Alt: {}, {}, Pilot: {}",
                    ticket.ticket(),
                    ticket.release_alt(),
                    ticket.tow_plane(),
                    ticket.pilot()
                ),
            );
        }

        match ticket.category() {
            TicketCategory::Intro => self.push_line(
                &mut items,
                ticket,
                ticket.pilot(),
                VendorCategory::IntroPilot,
                format!(
                    "Ticket #: {}, Release Alt: {}, Glider: {}, {}",
                    ticket.ticket(),
                    ticket.release_alt(),
                    ticket.glider_id(),
                    ticket.guest()
                ),
            ),
            TicketCategory::Pack => {
                // 解析時已保證 5 Pack 票有 CFIG
                if let Some(cfig) = ticket.cfig() {
                    self.push_line(
                        &mut items,
                        ticket,
                        cfig,
                        VendorCategory::FivePack,
                        format!(
                            "Ticket #: {}, Release Alt: {}, Glider: {}, {}",
                            ticket.ticket(),
                            ticket.release_alt(),
                            ticket.glider_id(),
                            ticket.pilot()
                        ),
                    );
                }
            }
            TicketCategory::Other(_) => {}
        }

        items
    }
}
