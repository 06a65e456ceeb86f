use crate::utils::error::{ConversionError, Result};
use std::path::{Path, PathBuf};

const MEMBER_INVOICE_SUFFIX: &str = "_member_invoice.csv";
const VENDOR_BILL_SUFFIX: &str = "_vendor_bill.csv";

/// 兩個輸出檔的位置：`{stem}_member_invoice.csv` 與 `{stem}_vendor_bill.csv`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub member_invoice: PathBuf,
    pub vendor_bill: PathBuf,
}

impl OutputPaths {
    /// 預設放在輸入檔同一個目錄
    pub fn for_input(input: &Path, output_dir: Option<&Path>) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tow_tickets".to_string());

        let dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        Self {
            member_invoice: dir.join(format!("{}{}", stem, MEMBER_INVOICE_SUFFIX)),
            vendor_bill: dir.join(format!("{}{}", stem, VENDOR_BILL_SUFFIX)),
        }
    }

    /// 執行前檢查：未指定覆寫且任一輸出檔已存在即失敗
    pub fn ensure_available(&self, overwrite: bool) -> Result<()> {
        if overwrite {
            return Ok(());
        }
        for path in [&self.member_invoice, &self.vendor_bill] {
            if path.exists() {
                return Err(ConversionError::FileExists { path: path.clone() });
            }
        }
        Ok(())
    }
}
