pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::derivers::{
    BillingDates, MemberInvoiceDeriver, MemberInvoiceLine, VendorBillDeriver, VendorBillLine,
};
pub use config::{cli::OutputPaths, toml_config::RateConfig};
pub use core::etl::{
    convert_tow_ticket_to_all_invoices, convert_tow_ticket_to_member_invoice,
    convert_tow_ticket_to_vendor_bill, ConversionEngine, ConversionOptions, ConversionSummary,
};
pub use core::reader::read_from_tow_csv;
pub use core::writer::{
    export_lines_to_csv, export_member_invoices_to_csv, export_vendor_bills_to_csv, RowLayout,
};
pub use domain::model::TowTicket;
pub use domain::money::Money;
pub use utils::error::{ConversionError, Result};
