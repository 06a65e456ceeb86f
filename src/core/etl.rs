use crate::app::derivers::{BillingDates, MemberInvoiceDeriver, VendorBillDeriver};
use crate::config::toml_config::RateConfig;
use crate::core::reader::read_from_tow_csv;
use crate::core::writer::{export_lines_to_csv, RowLayout};
use crate::domain::model::TowTicket;
use crate::domain::money::Money;
use crate::domain::ports::{BillingLine, LineDeriver};
use crate::utils::error::{ConversionError, Result};
use std::path::{Path, PathBuf};

/// Everything a conversion needs besides the file paths.
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    pub dates: BillingDates,
    pub rates: RateConfig,
    pub layout: RowLayout,
    pub log_incomplete: bool,
}

impl ConversionOptions {
    /// 預設費率、依輸入順序輸出
    pub fn new(dates: BillingDates) -> Self {
        Self {
            dates,
            rates: RateConfig::default(),
            layout: RowLayout::default(),
            log_incomplete: true,
        }
    }

    pub fn with_rates(mut self, rates: RateConfig) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_layout(mut self, layout: RowLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_log_incomplete(mut self, enabled: bool) -> Self {
        self.log_incomplete = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub tickets: usize,
    pub lines: usize,
    pub total: Money,
    pub output: PathBuf,
}

/// 讀取 → 產生明細 → 寫出
pub struct ConversionEngine {
    options: ConversionOptions,
}

impl ConversionEngine {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    fn member_deriver(&self) -> MemberInvoiceDeriver {
        MemberInvoiceDeriver::new(self.options.dates, self.options.rates.member.clone())
            .log_incomplete(self.options.log_incomplete)
    }

    fn vendor_deriver(&self) -> VendorBillDeriver {
        VendorBillDeriver::new(self.options.dates, self.options.rates.vendor.clone())
            .with_glider_rates(self.options.rates.member.clone())
            .log_incomplete(self.options.log_incomplete)
    }

    pub fn convert_member_invoice<I: AsRef<Path>, O: AsRef<Path>>(
        &self,
        input: I,
        output: O,
        overwrite: bool,
    ) -> Result<ConversionSummary> {
        let tickets = read_from_tow_csv(input)?;
        self.write(&self.member_deriver(), &tickets, output.as_ref(), overwrite)
    }

    pub fn convert_vendor_bill<I: AsRef<Path>, O: AsRef<Path>>(
        &self,
        input: I,
        output: O,
        overwrite: bool,
    ) -> Result<ConversionSummary> {
        let tickets = read_from_tow_csv(input)?;
        self.write(&self.vendor_deriver(), &tickets, output.as_ref(), overwrite)
    }

    /// 讀一次，同時產生會員帳單與廠商帳單
    ///
    /// Without `overwrite`, both targets are checked before anything is
    /// written, so a conflict on either leaves neither file behind.
    pub fn convert_all<I, M, V>(
        &self,
        input: I,
        member_output: M,
        vendor_output: V,
        overwrite: bool,
    ) -> Result<(ConversionSummary, ConversionSummary)>
    where
        I: AsRef<Path>,
        M: AsRef<Path>,
        V: AsRef<Path>,
    {
        if !overwrite {
            for output in [member_output.as_ref(), vendor_output.as_ref()] {
                if output.exists() {
                    return Err(ConversionError::FileExists {
                        path: output.to_path_buf(),
                    });
                }
            }
        }

        let tickets = read_from_tow_csv(input)?;
        let member = self.write(
            &self.member_deriver(),
            &tickets,
            member_output.as_ref(),
            overwrite,
        )?;
        let vendor = self.write(
            &self.vendor_deriver(),
            &tickets,
            vendor_output.as_ref(),
            overwrite,
        )?;
        Ok((member, vendor))
    }

    fn write<D: LineDeriver>(
        &self,
        deriver: &D,
        tickets: &[TowTicket],
        output: &Path,
        overwrite: bool,
    ) -> Result<ConversionSummary> {
        let lines = deriver.derive_all(tickets);
        let total = lines
            .iter()
            .map(BillingLine::total)
            .try_fold(Money::ZERO, Money::checked_add)
            .ok_or_else(|| ConversionError::TotalOverflow {
                path: output.to_path_buf(),
            })?;
        tracing::info!(
            "Derived {} lines from {} tickets, total {}",
            lines.len(),
            tickets.len(),
            total
        );

        let written = export_lines_to_csv(&lines, output, overwrite, self.options.layout)?;

        Ok(ConversionSummary {
            tickets: tickets.len(),
            lines: written,
            total,
            output: output.to_path_buf(),
        })
    }
}

pub fn convert_tow_ticket_to_member_invoice<I: AsRef<Path>, O: AsRef<Path>>(
    input: I,
    output: O,
    overwrite: bool,
    options: &ConversionOptions,
) -> Result<ConversionSummary> {
    ConversionEngine::new(options.clone()).convert_member_invoice(input, output, overwrite)
}

pub fn convert_tow_ticket_to_vendor_bill<I: AsRef<Path>, O: AsRef<Path>>(
    input: I,
    output: O,
    overwrite: bool,
    options: &ConversionOptions,
) -> Result<ConversionSummary> {
    ConversionEngine::new(options.clone()).convert_vendor_bill(input, output, overwrite)
}

pub fn convert_tow_ticket_to_all_invoices<I, M, V>(
    input: I,
    member_output: M,
    vendor_output: V,
    overwrite: bool,
    options: &ConversionOptions,
) -> Result<(ConversionSummary, ConversionSummary)>
where
    I: AsRef<Path>,
    M: AsRef<Path>,
    V: AsRef<Path>,
{
    ConversionEngine::new(options.clone()).convert_all(input, member_output, vendor_output, overwrite)
}
