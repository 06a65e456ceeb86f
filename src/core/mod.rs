pub mod etl;
pub mod reader;
pub mod writer;

pub use crate::domain::model::TowTicket;
pub use crate::domain::ports::{BillingLine, LineDeriver};
pub use crate::utils::error::Result;
