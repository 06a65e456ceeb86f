use crate::domain::format::{parse_count, parse_flag, parse_service_datetime};
use crate::domain::money::{Money, Quantity};
use crate::domain::name::Name;
use crate::utils::error::ValidationError;
use crate::utils::validation::{
    optional_field, validate_positive_number, validate_required_field, FieldResult,
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fmt;

/// 派遣系統匯出檔的欄位名稱
pub mod columns {
    pub const TICKET: &str = "Ticket #";
    pub const DATE_TIME: &str = "Date Time";
    pub const PILOT: &str = "Bill To/Pilot";
    pub const AIRPORT: &str = "Airport";
    pub const CATEGORY: &str = "Category";
    pub const GLIDER_ID: &str = "Glider ID";
    pub const TOW_TYPE: &str = "Tow Type";
    pub const FLIGHT_BRIEF: &str = "Flight Brief";
    pub const CFIG: &str = "CFIG";
    pub const GUEST: &str = "Guest";
    pub const BILLABLE_RENTAL: &str = "Billable Rental";
    pub const BILLABLE_TOW: &str = "Billable Tow";
    pub const TOW_SPEED: &str = "Tow Speed";
    pub const ALT_REQUIRED: &str = "Alt Required";
    pub const RELEASE_ALT: &str = "Release Alt";
    pub const GLIDER_TIME: &str = "Glider Time";
    pub const TOW_FEE: &str = "Tow Fee";
    pub const RENTAL_FEE: &str = "Glider Rental";
    pub const REMARKS: &str = "Remarks";
    pub const CERTIFICATE: &str = "Certificate";
    pub const TOW_PILOT: &str = "Tow Pilot";
    pub const TOW_PLANE: &str = "Tow Plane";
    pub const FLOWN_FLAG: &str = "Flown Flag";
    pub const CLOSED_FLAG: &str = "Closed Flag";

    /// 缺少任何一欄即視為 schema 錯誤
    pub const REQUIRED: &[&str] = &[
        TICKET, DATE_TIME, PILOT, AIRPORT, CATEGORY, GLIDER_ID, TOW_TYPE,
    ];
}

/// One tow ticket row exactly as text, before any validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTowRow {
    #[serde(rename = "Ticket #")]
    pub ticket: String,
    #[serde(rename = "Date Time")]
    pub date_time: String,
    #[serde(rename = "Bill To/Pilot")]
    pub pilot: String,
    #[serde(rename = "Airport")]
    pub airport: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Glider ID")]
    pub glider_id: String,
    #[serde(rename = "Tow Type")]
    pub tow_type: String,

    #[serde(rename = "Flight Brief", default)]
    pub flight_brief: Option<String>,
    #[serde(rename = "CFIG", default)]
    pub cfig: Option<String>,
    #[serde(rename = "Guest", default)]
    pub guest: Option<String>,
    #[serde(rename = "Billable Rental", default)]
    pub billable_rental: Option<String>,
    #[serde(rename = "Billable Tow", default)]
    pub billable_tow: Option<String>,
    #[serde(rename = "Tow Speed", default)]
    pub tow_speed: Option<String>,
    #[serde(rename = "Alt Required", default)]
    pub alt_required: Option<String>,
    #[serde(rename = "Release Alt", default)]
    pub release_alt: Option<String>,
    #[serde(rename = "Glider Time", default)]
    pub glider_time: Option<String>,
    #[serde(rename = "Tow Fee", default)]
    pub tow_fee: Option<String>,
    #[serde(rename = "Glider Rental", default)]
    pub rental_fee: Option<String>,
    #[serde(rename = "Remarks", default)]
    pub remarks: Option<String>,
    #[serde(rename = "Certificate", default)]
    pub certificate: Option<String>,
    #[serde(rename = "Tow Pilot", default)]
    pub tow_pilot: Option<String>,
    #[serde(rename = "Tow Plane", default)]
    pub tow_plane: Option<String>,
    #[serde(rename = "Flown Flag", default)]
    pub flown_flag: Option<String>,
    #[serde(rename = "Closed Flag", default)]
    pub closed_flag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketCategory {
    Intro,
    Pack,
    Other(String),
}

impl TicketCategory {
    pub fn parse(value: &str) -> Self {
        let text = value.trim();
        match text.to_ascii_lowercase().as_str() {
            "intro" | "intro ride" | "intro rides" => TicketCategory::Intro,
            "pack" | "5 pack" | "5 packs" | "5-pack" => TicketCategory::Pack,
            _ => TicketCategory::Other(text.to_string()),
        }
    }
}

impl fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketCategory::Intro => f.write_str("Intro"),
            TicketCategory::Pack => f.write_str("5 Pack"),
            TicketCategory::Other(text) => f.write_str(text),
        }
    }
}

/// A validated tow ticket. Built once by [`TowTicket::parse`], read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TowTicket {
    ticket: String,
    date_time: NaiveDateTime,
    pilot: Name,
    airport: String,
    category: TicketCategory,
    glider_id: String,
    tow_type: String,
    flight_brief: String,
    cfig: Option<Name>,
    guest: String,
    billable_rental: bool,
    billable_tow: bool,
    tow_speed: u32,
    alt_required: u32,
    release_alt: u32,
    glider_time: Quantity,
    tow_fee: Money,
    rental_fee: Option<Money>,
    remarks: String,
    certificate: String,
    tow_pilot: Option<Name>,
    tow_plane: String,
    flown: bool,
    closed: bool,
}

fn text_or_default(value: &Option<String>, default: &str) -> String {
    optional_field(value).unwrap_or(default).to_string()
}

fn flag_or_default(field: &str, value: &Option<String>, default: bool) -> FieldResult<bool> {
    optional_field(value).map_or(Ok(default), |v| parse_flag(field, v))
}

fn count_or_zero(field: &str, value: &Option<String>) -> FieldResult<u32> {
    optional_field(value).map_or(Ok(0), |v| parse_count(field, v))
}

fn money_field(field: &str, value: &str) -> FieldResult<Money> {
    value
        .parse::<Money>()
        .map_err(|e| ValidationError::new(field, format!("invalid amount: {}", e)))
}

fn optional_name(field: &str, value: &Option<String>) -> FieldResult<Option<Name>> {
    optional_field(value)
        .map(|v| Name::parse(field, v))
        .transpose()
}

impl TowTicket {
    /// 預設滑翔機時數 (小時)
    pub const DEFAULT_GLIDER_TIME: Quantity = Quantity::from_thousandths(100);

    pub fn parse(raw: &RawTowRow) -> FieldResult<Self> {
        use columns::*;

        let ticket = validate_required_field(TICKET, &raw.ticket)?.to_string();
        let date_time =
            parse_service_datetime(DATE_TIME, validate_required_field(DATE_TIME, &raw.date_time)?)?;
        let pilot = Name::parse(PILOT, validate_required_field(PILOT, &raw.pilot)?)?;

        let glider_time = optional_field(&raw.glider_time)
            .map(|v| {
                v.parse::<Quantity>()
                    .map_err(|e| ValidationError::new(GLIDER_TIME, format!("invalid hours: {}", e)))
            })
            .transpose()?
            .unwrap_or(Self::DEFAULT_GLIDER_TIME);

        let tow_fee = optional_field(&raw.tow_fee)
            .map(|v| money_field(TOW_FEE, v))
            .transpose()?
            .unwrap_or(Money::ZERO);
        let rental_fee = optional_field(&raw.rental_fee)
            .map(|v| money_field(RENTAL_FEE, v))
            .transpose()?;

        let ticket = TowTicket {
            ticket,
            date_time,
            pilot,
            airport: raw.airport.trim().to_string(),
            category: TicketCategory::parse(&raw.category),
            glider_id: raw.glider_id.trim().to_string(),
            tow_type: raw.tow_type.trim().to_string(),
            flight_brief: text_or_default(&raw.flight_brief, "Standard"),
            cfig: optional_name(CFIG, &raw.cfig)?,
            guest: text_or_default(&raw.guest, ""),
            billable_rental: flag_or_default(BILLABLE_RENTAL, &raw.billable_rental, true)?,
            billable_tow: flag_or_default(BILLABLE_TOW, &raw.billable_tow, true)?,
            tow_speed: count_or_zero(TOW_SPEED, &raw.tow_speed)?,
            alt_required: count_or_zero(ALT_REQUIRED, &raw.alt_required)?,
            release_alt: count_or_zero(RELEASE_ALT, &raw.release_alt)?,
            glider_time,
            tow_fee,
            rental_fee,
            remarks: text_or_default(&raw.remarks, ""),
            certificate: text_or_default(&raw.certificate, ""),
            tow_pilot: optional_name(TOW_PILOT, &raw.tow_pilot)?,
            tow_plane: text_or_default(&raw.tow_plane, ""),
            flown: flag_or_default(FLOWN_FLAG, &raw.flown_flag, false)?,
            closed: flag_or_default(CLOSED_FLAG, &raw.closed_flag, false)?,
        };

        ticket.check_invariants()?;
        Ok(ticket)
    }

    fn check_invariants(&self) -> FieldResult<()> {
        use columns::*;

        if self.bills_tow() {
            validate_positive_number(RELEASE_ALT, self.release_alt, "when a tow fee is billed")?;
            validate_positive_number(TOW_SPEED, self.tow_speed, "when a tow fee is billed")?;
        }
        if self.bills_flat_rental() && self.glider_time.is_zero() {
            return Err(ValidationError::new(
                GLIDER_TIME,
                "must be greater than 0 when a rental fee is billed",
            ));
        }
        if self.category == TicketCategory::Pack && self.cfig.is_none() {
            return Err(ValidationError::new(
                CFIG,
                "a 5 Pack ticket must name the CFIG",
            ));
        }
        Ok(())
    }

    pub fn ticket(&self) -> &str {
        &self.ticket
    }

    pub fn date_time(&self) -> NaiveDateTime {
        self.date_time
    }

    pub fn pilot(&self) -> &Name {
        &self.pilot
    }

    pub fn airport(&self) -> &str {
        &self.airport
    }

    pub fn category(&self) -> &TicketCategory {
        &self.category
    }

    pub fn glider_id(&self) -> &str {
        &self.glider_id
    }

    pub fn tow_type(&self) -> &str {
        &self.tow_type
    }

    pub fn flight_brief(&self) -> &str {
        &self.flight_brief
    }

    pub fn cfig(&self) -> Option<&Name> {
        self.cfig.as_ref()
    }

    pub fn guest(&self) -> &str {
        &self.guest
    }

    pub fn billable_rental(&self) -> bool {
        self.billable_rental
    }

    pub fn billable_tow(&self) -> bool {
        self.billable_tow
    }

    pub fn tow_speed(&self) -> u32 {
        self.tow_speed
    }

    pub fn alt_required(&self) -> u32 {
        self.alt_required
    }

    pub fn release_alt(&self) -> u32 {
        self.release_alt
    }

    pub fn glider_time(&self) -> Quantity {
        self.glider_time
    }

    pub fn tow_fee(&self) -> Money {
        self.tow_fee
    }

    pub fn rental_fee(&self) -> Option<Money> {
        self.rental_fee
    }

    pub fn remarks(&self) -> &str {
        &self.remarks
    }

    pub fn certificate(&self) -> &str {
        &self.certificate
    }

    pub fn tow_pilot(&self) -> Option<&Name> {
        self.tow_pilot.as_ref()
    }

    pub fn tow_plane(&self) -> &str {
        &self.tow_plane
    }

    pub fn flown(&self) -> bool {
        self.flown
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    /// 已飛行且已結案的票才可以開帳
    pub fn is_completed(&self) -> bool {
        self.flown && self.closed
    }

    pub fn bills_tow(&self) -> bool {
        self.billable_tow && self.tow_fee.is_positive()
    }

    pub fn bills_flat_rental(&self) -> bool {
        self.billable_rental && self.rental_fee.is_some_and(Money::is_positive)
    }

    /// 票上本身有費用 (不看 Billable 旗標)
    pub fn has_fees(&self) -> bool {
        self.tow_fee.is_positive() || self.rental_fee.is_some_and(Money::is_positive)
    }
}

impl fmt::Display for TowTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TOW Ticket: {}, Date/Time: {}, Pilot: {}, Category: {}, Glider ID: {}, Tow Fee: {}",
            self.ticket,
            self.date_time.format("%Y-%m-%dT%H:%M:%S"),
            self.pilot,
            self.category,
            self.glider_id,
            self.tow_fee
        )
    }
}
