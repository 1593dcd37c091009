//! SpreadsheetReader against real `.xlsx` files

use actuarial_etl::models::{RowTags, RunStamp, YearRecord};
use actuarial_etl::transform::{assemble_booked, melt_loss_ratios};
use actuarial_etl::workbook::SpreadsheetReader;
use actuarial_etl::EtlError;
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use crate::common::{logging, workbook};

#[test]
fn test_read_sheet_from_file() {
    logging::init_test_logging();
    logging::log_test_step("Reading a fixture workbook");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("losses.xlsx");
    workbook::write_loss_workbook(&path, &["GL-np", "MA-np"]).unwrap();

    let mut reader = SpreadsheetReader::open(&path).unwrap();
    assert_eq!(reader.sheet_names(), vec!["GL-np", "MA-np"]);

    let block = reader.read_sheet("MA-np").unwrap();
    logging::log_test_data("Years", &block.years);

    assert_eq!(block.years.len(), 12);
    assert_eq!(block.years[0], YearRecord::new(2010));
    assert_eq!(block.years[11], YearRecord::new(2021));
    assert_eq!(block.grid.ratio(3, 7), Some(workbook::ratio_at(1, 3, 7)));
    assert_eq!(block.gross_written_premium[2], Some(workbook::gross_written_premium_at(2)));
    assert_eq!(block.booked[4].earned_premium, Some(workbook::earned_premium_at(4)));
}

#[test]
fn test_missing_sheet_is_reported_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("losses.xlsx");
    workbook::write_loss_workbook(&path, &["GL-np"]).unwrap();

    let mut reader = SpreadsheetReader::open(&path).unwrap();
    let result = reader.read_sheet("MA-np");

    assert_matches!(result, Err(EtlError::MissingSheet(name)) if name == "MA-np");
}

#[test]
fn test_open_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = SpreadsheetReader::open(dir.path().join("absent.xlsx"));
    assert!(result.is_err());
}

#[test]
fn test_file_melts_and_assembles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("losses.xlsx");
    workbook::write_loss_workbook(&path, &["GL-np"]).unwrap();

    let mut reader = SpreadsheetReader::open(&path).unwrap();
    let block = reader.read_sheet("GL-np").unwrap();
    let stamp = RunStamp::now("tester");
    let tags = RowTags {
        line_of_business: block.sheet_name.clone(),
        currency: "EUR".to_string(),
        company_name: "Howden Company".to_string(),
        stamp: stamp.clone(),
    };

    let melted = melt_loss_ratios(&block.years, &block.grid, &tags);
    assert_eq!(melted.len(), 144);
    // Column-major: index 13 is the second year at 24 months
    assert_eq!(melted[13].year, 2011);
    assert_eq!(melted[13].development_month, 24);
    assert_eq!(melted[13].loss_incurred_ratio, Some(workbook::ratio_at(0, 1, 1)));

    let booked = assemble_booked(
        &block.sheet_name,
        &block.years,
        &block.gross_written_premium,
        &block.booked,
        &stamp,
    )
    .unwrap();
    let (paid, case, ibnr) = workbook::booked_losses_at(5);
    assert_eq!(booked.len(), 12);
    assert_eq!(booked[5].ultimate_loss_ratio, Some(paid + case + ibnr));
}
