use crate::app::derivers::{MemberInvoiceLine, VendorBillLine};
use crate::domain::ports::BillingLine;
use crate::utils::error::{ConversionError, Result};
use std::io::{self, ErrorKind};
use std::path::Path;
use tempfile::NamedTempFile;

/// Output row arrangement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowLayout {
    /// One fully populated row per line, in the order given.
    #[default]
    InputOrder,
    /// Sorted by payee then service date; only the first row of each payee
    /// carries the name and date cells.
    GroupedByPayee,
}

pub fn export_member_invoices_to_csv<P: AsRef<Path>>(
    lines: &[MemberInvoiceLine],
    path: P,
    overwrite: bool,
    layout: RowLayout,
) -> Result<usize> {
    export_lines_to_csv(lines, path, overwrite, layout)
}

pub fn export_vendor_bills_to_csv<P: AsRef<Path>>(
    lines: &[VendorBillLine],
    path: P,
    overwrite: bool,
    layout: RowLayout,
) -> Result<usize> {
    export_lines_to_csv(lines, path, overwrite, layout)
}

/// 先寫入同目錄的暫存檔，成功後再改名到目標位置
pub fn export_lines_to_csv<L: BillingLine, P: AsRef<Path>>(
    lines: &[L],
    path: P,
    overwrite: bool,
    layout: RowLayout,
) -> Result<usize> {
    let path = path.as_ref();
    let write_error = |source: io::Error| ConversionError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    if !overwrite && path.exists() {
        return Err(ConversionError::FileExists {
            path: path.to_path_buf(),
        });
    }

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(parent).map_err(write_error)?;

    {
        let mut writer = csv::Writer::from_writer(temp.as_file_mut());
        writer
            .write_record(L::HEADERS)
            .map_err(|e| write_error(e.into()))?;
        for record in arrange(lines, layout) {
            writer
                .write_record(&record)
                .map_err(|e| write_error(e.into()))?;
        }
        writer.flush().map_err(write_error)?;
    }
    temp.as_file().sync_all().map_err(write_error)?;

    let persisted = if overwrite {
        temp.persist(path)
    } else {
        temp.persist_noclobber(path)
    };
    persisted.map_err(|e| match e.error.kind() {
        ErrorKind::AlreadyExists if !overwrite => ConversionError::FileExists {
            path: path.to_path_buf(),
        },
        _ => write_error(e.error),
    })?;

    tracing::info!("Wrote {} lines to {}", lines.len(), path.display());
    Ok(lines.len())
}

fn arrange<L: BillingLine>(lines: &[L], layout: RowLayout) -> Vec<Vec<String>> {
    match layout {
        RowLayout::InputOrder => lines.iter().map(|line| line.to_record(true)).collect(),
        RowLayout::GroupedByPayee => {
            let mut sorted: Vec<&L> = lines.iter().collect();
            sorted.sort_by(|a, b| {
                a.payee()
                    .cmp(b.payee())
                    .then_with(|| a.service_date().cmp(&b.service_date()))
            });

            let mut previous = None;
            sorted
                .into_iter()
                .map(|line| {
                    let lead_row = previous != Some(line.payee());
                    previous = Some(line.payee());
                    line.to_record(lead_row)
                })
                .collect()
        }
    }
}
