use anyhow::Result;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tow_billing::{
    convert_tow_ticket_to_all_invoices, convert_tow_ticket_to_member_invoice, BillingDates,
    ConversionEngine, ConversionOptions, Money, OutputPaths, RateConfig, RowLayout,
};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/tow_tickets.csv");

fn options() -> ConversionOptions {
    let dates = BillingDates::with_terms(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(), 30);
    ConversionOptions::new(dates)
}

/// 把測試資料複製到暫存目錄，輸出檔會寫在旁邊
fn fixture_in(dir: &TempDir) -> Result<PathBuf> {
    let input = dir.path().join("june_tows.csv");
    fs::copy(FIXTURE, &input)?;
    Ok(input)
}

fn read_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}

#[test]
fn test_end_to_end_member_and_vendor_outputs() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = fixture_in(&temp_dir)?;
    let outputs = OutputPaths::for_input(&input, None);

    let (member, vendor) = convert_tow_ticket_to_all_invoices(
        &input,
        &outputs.member_invoice,
        &outputs.vendor_bill,
        false,
        &options(),
    )?;

    assert_eq!(member.tickets, 6);
    assert_eq!(member.lines, 6);
    assert_eq!(member.total, Money::from_cents(26750));
    assert_eq!(vendor.lines, 6);
    assert_eq!(vendor.total, Money::from_dollars(90));

    assert!(temp_dir.path().join("june_tows_member_invoice.csv").exists());
    assert!(temp_dir.path().join("june_tows_vendor_bill.csv").exists());

    let (headers, rows) = read_rows(&outputs.member_invoice)?;
    assert_eq!(
        headers,
        vec![
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
        ]
    );
    assert_eq!(
        rows[0],
        vec![
            "Smith, John",
            "06/30/2024",
            "07/30/2024",
            "06/01/2024",
            "Ticket #: 1001, Release Alt: 3000",
            "Towing",
            "TOW",
            "Smith",
            "John",
            "$45.00",
        ]
    );
    assert_eq!(rows[1][4], "Ticket #: 1001, Glider: G1, Glider Time: 1.2 hours");
    assert_eq!(rows[1][5], "Glider Rental");
    assert_eq!(rows[1][6], "GLIDER");
    assert_eq!(rows[1][9], "$30.00");
    assert_eq!(rows[2][0], "Major, Mary");
    assert_eq!(rows[5][9], "$22.50");

    // 1004 零費用、1005 未結案，都不出現在帳單上
    assert!(rows.iter().all(|r| !r[4].contains("1004") && !r[4].contains("1005")));

    let (headers, rows) = read_rows(&outputs.vendor_bill)?;
    assert_eq!(headers[0], "Vendor Name");
    assert_eq!(headers[2], "Due Date2");
    assert_eq!(headers[8], "Sum of Category Details - Amount");

    let vendors: Vec<(&str, &str, &str)> = rows
        .iter()
        .map(|r| (r[0].as_str(), r[5].as_str(), r[8].as_str()))
        .collect();
    assert_eq!(
        vendors,
        vec![
            ("Doe, Jane.", "Tow Pilot Expense", "$10.00"),
            ("Roe, Rick.", "Tow Pilot Expense", "$10.00"),
            ("Major, Mary.", "Intro Pilot Expense", "$10.00"),
            ("Doe, Jane.", "Tow Pilot Expense", "$10.00"),
            ("Brown, Alice.", "5 Pack Expense", "$40.00"),
            ("Roe, Rick.", "Tow Pilot Expense", "$10.00"),
        ]
    );
    assert_eq!(rows[0][3], "06/01/2024 09:15");
    assert_eq!(
        rows[0][4],
        "Ticket #: 1001, Release Alt: 3000, Pawnee N123, Pilot: Smith, John"
    );
    assert_eq!(rows[2][4], "Ticket #: 1002, Release Alt: 2000, Glider: G2, Guest Pat");
    assert_eq!(rows[4][4], "Ticket #: 1003, Release Alt: 3000, Glider: G1, Adams, Amy");
    assert_eq!(rows[4][6], "5 PACKS");

    Ok(())
}

#[test]
fn test_repeated_runs_are_byte_identical() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = fixture_in(&temp_dir)?;
    let output = temp_dir.path().join("member.csv");

    convert_tow_ticket_to_member_invoice(&input, &output, false, &options())?;
    let first = fs::read(&output)?;

    convert_tow_ticket_to_member_invoice(&input, &output, true, &options())?;
    let second = fs::read(&output)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_grouped_layout_by_payee() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = fixture_in(&temp_dir)?;
    let output = temp_dir.path().join("member.csv");

    let engine = ConversionEngine::new(options().with_layout(RowLayout::GroupedByPayee));
    engine.convert_member_invoice(&input, &output, false)?;

    let (_, rows) = read_rows(&output)?;
    let names: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(names, vec!["Adams, Amy", "Major, Mary", "Smith, John", "", "", ""]);

    // 同一付款人的後續列只保留明細
    assert_eq!(rows[3][1], "");
    assert_eq!(rows[3][2], "");
    assert_eq!(rows[3][7], "Smith");
    Ok(())
}

#[test]
fn test_rates_file_changes_vendor_amounts() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = fixture_in(&temp_dir)?;
    let output = temp_dir.path().join("vendor.csv");

    let rates = RateConfig::from_toml_str(
        r#"
[vendor]
tow_pilot = "$12.50"
five_pack = "0"
"#,
    )?;
    let engine = ConversionEngine::new(options().with_rates(rates));
    let summary = engine.convert_vendor_bill(&input, &output, false)?;

    // 5 Pack 費率為零時不產生明細
    assert_eq!(summary.lines, 5);
    assert_eq!(summary.total, Money::from_cents(4 * 1250 + 1000));
    Ok(())
}

#[test]
fn test_vendor_paid_when_member_is_not_billed_for_the_tow() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("june_tows.csv");
    // 1002 免收拖曳費；1004 只收按時計費的租金
    let content = fs::read_to_string(FIXTURE)?
        .replacen("Guest Pat,0,1,", "Guest Pat,0,0,", 1)
        .replacen(",,,0,1,60,3000,3000,0.8,$0.00,", ",,,1,0,60,3000,3000,0.8,,", 1);
    fs::write(&input, content)?;
    let outputs = OutputPaths::for_input(&input, None);

    let rates = RateConfig::from_toml_str(
        r#"
[member.glider_hourly_rates]
"G1" = "$40.00"
"#,
    )?;
    let engine = ConversionEngine::new(options().with_rates(rates));
    let (member, vendor) = engine.convert_all(
        &input,
        &outputs.member_invoice,
        &outputs.vendor_bill,
        false,
    )?;

    assert_eq!(member.lines, 6);
    assert_eq!(member.total, Money::from_cents(21450));
    assert_eq!(vendor.lines, 7);
    assert_eq!(vendor.total, Money::from_dollars(100));

    let (_, rows) = read_rows(&outputs.vendor_bill)?;
    assert_eq!(rows[1][0], "Roe, Rick.");
    assert!(rows[1][4].starts_with("Ticket #: 1002,"));
    assert_eq!(rows[5][0], "Doe, Jane.");
    assert!(rows[5][4].starts_with("Ticket #: 1004,"));
    Ok(())
}

#[test]
fn test_example_rates_file_loads() -> Result<()> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/rates.example.toml");
    let rates = RateConfig::from_file(path)?;

    assert_eq!(rates.billing.due_days, 30);
    assert_eq!(rates.vendor.five_pack, Money::from_dollars(40));
    assert_eq!(rates.member.glider_hourly_rate("G3"), Some(Money::from_dollars(38)));
    assert_eq!(rates.member.glider_hourly_rate("G2"), None);
    Ok(())
}
