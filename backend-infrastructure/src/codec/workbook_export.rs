// Outbound workbooks
// Both exports lead with a DOCK No. metadata row.

use anyhow::{anyhow, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use backend_domain::{AggregatedView, Container, ManifestRow, TallyEntry};

const RESULT_COLUMNS: [&str; 5] = [
    "Scanned SKU",
    "Scanned Qty",
    "Pallet No.",
    "Box No.",
    "Operator",
];

/// Full result workbook: dock row, blank row, original headers plus the five
/// scan columns, one data row per manifest row. Manual-mode containers get a
/// tally sheet in the same frame.
pub fn full_result(container: &Container, view: &AggregatedView) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    worksheet.write_string(0, 0, "DOCK No.")?;
    worksheet.write_string(0, 1, &container.dock_no)?;

    match view {
        AggregatedView::Manifest { rows } => {
            let headers = container
                .manifest
                .as_ref()
                .map(|blob| blob.headers.clone())
                .unwrap_or_default();
            write_manifest_sheet(&mut worksheet, &headers, rows)?;
        }
        AggregatedView::Manual { entries } => {
            write_tally_sheet(&mut worksheet, entries)?;
        }
    }

    workbook.push_worksheet(worksheet);
    Ok(workbook.save_to_buffer()?)
}

/// Diff report: rows whose scanned quantity differs from the expected one.
/// Returns None when every row reconciles, in which case no file exists.
pub fn diff_report(container: &Container, view: &AggregatedView) -> Result<Option<Vec<u8>>> {
    let rows = view
        .manifest_rows()
        .ok_or_else(|| anyhow!("diff report requires a manifest container"))?;
    let mismatched: Vec<&ManifestRow> = rows
        .iter()
        .filter(|row| row.scanned_qty != row.expected_qty)
        .collect();
    if mismatched.is_empty() {
        return Ok(None);
    }

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    worksheet.write_string(0, 0, "DOCK No.")?;
    worksheet.write_string(0, 1, &container.dock_no)?;

    let header_row = 2;
    for (col, title) in ["SKU", "Original Qty", "Scanned Qty", "Difference", "Operator"]
        .iter()
        .enumerate()
    {
        worksheet.write_string(header_row, col as u16, *title)?;
    }
    for (i, row) in mismatched.iter().enumerate() {
        let r = header_row + 1 + i as u32;
        worksheet.write_string(r, 0, &row.sku)?;
        worksheet.write_number(r, 1, row.expected_qty as f64)?;
        worksheet.write_number(r, 2, row.scanned_qty as f64)?;
        worksheet.write_number(r, 3, (row.scanned_qty - row.expected_qty) as f64)?;
        worksheet.write_string(r, 4, &row.operator)?;
    }

    workbook.push_worksheet(worksheet);
    Ok(Some(workbook.save_to_buffer()?))
}

fn write_manifest_sheet(
    worksheet: &mut Worksheet,
    headers: &[String],
    rows: &[ManifestRow],
) -> Result<()> {
    let header_row = 2;
    let mut col: u16 = 0;
    for header in headers {
        worksheet.write_string(header_row, col, header)?;
        col += 1;
    }
    for title in RESULT_COLUMNS {
        worksheet.write_string(header_row, col, title)?;
        col += 1;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = header_row + 1 + i as u32;
        let mut col: u16 = 0;
        for header in headers {
            if let Some(value) = row.cells.get(header) {
                worksheet.write_string(r, col, value)?;
            }
            col += 1;
        }
        worksheet.write_string(r, col, &row.scanned_sku)?;
        if !row.event_ids.is_empty() {
            worksheet.write_number(r, col + 1, row.scanned_qty as f64)?;
        }
        worksheet.write_string(r, col + 2, &row.pallet_no)?;
        worksheet.write_string(r, col + 3, &row.box_no)?;
        worksheet.write_string(r, col + 4, &row.operator)?;
    }
    Ok(())
}

fn write_tally_sheet(worksheet: &mut Worksheet, entries: &[TallyEntry]) -> Result<()> {
    let header_row = 2;
    for (col, title) in ["SKU", "Scanned Qty", "Pallet No."].iter().enumerate() {
        worksheet.write_string(header_row, col as u16, *title)?;
    }
    for (i, entry) in entries.iter().enumerate() {
        let r = header_row + 1 + i as u32;
        worksheet.write_string(r, 0, &entry.sku)?;
        worksheet.write_number(r, 1, entry.qty as f64)?;
        worksheet.write_string(r, 2, &entry.pallet_no)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::{
        current_millis, ContainerId, ContainerMode, ContainerStatus, ManifestBlob,
    };

    fn manifest_container(dock: &str) -> Container {
        Container {
            id: ContainerId::generate(),
            container_no: "CNT-1".to_string(),
            description: String::new(),
            dock_no: dock.to_string(),
            mode: ContainerMode::Manifest,
            status: ContainerStatus::Active,
            manifest: Some(ManifestBlob {
                headers: vec!["SKU".to_string(), "QTY".to_string()],
                rows: vec![[
                    ("SKU".to_string(), "ABC123".to_string()),
                    ("QTY".to_string(), "10".to_string()),
                ]
                .into_iter()
                .collect()],
                sku_column_key: "SKU".to_string(),
                qty_column_key: Some("QTY".to_string()),
                file_name: "m.csv".to_string(),
            }),
            created_by: "alice".to_string(),
            created_at: current_millis(),
        }
    }

    fn row(sku: &str, expected: i64, scanned: i64) -> ManifestRow {
        ManifestRow {
            sku: sku.to_string(),
            expected_qty: expected,
            scanned_qty: scanned,
            ..ManifestRow::default()
        }
    }

    #[test]
    fn full_result_is_a_nonempty_workbook() {
        let container = manifest_container("D1");
        let view = AggregatedView::Manifest {
            rows: vec![row("ABC123", 10, 10)],
        };
        let bytes = full_result(&container, &view).expect("export");
        // XLSX containers are zip archives.
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn diff_report_absent_when_everything_reconciles() {
        let container = manifest_container("D1");
        let view = AggregatedView::Manifest {
            rows: vec![row("ABC123", 10, 10)],
        };
        assert!(diff_report(&container, &view).expect("export").is_none());
    }

    #[test]
    fn diff_report_present_when_quantities_differ() {
        let container = manifest_container("D1");
        let view = AggregatedView::Manifest {
            rows: vec![row("ABC123", 10, 7), row("DEF456", 4, 4)],
        };
        let bytes = diff_report(&container, &view)
            .expect("export")
            .expect("diff rows");
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn diff_report_rejects_manual_mode() {
        let mut container = manifest_container("D1");
        container.mode = ContainerMode::Manual;
        container.manifest = None;
        let view = AggregatedView::Manual { entries: vec![] };
        assert!(diff_report(&container, &view).is_err());
    }

    #[test]
    fn manual_tally_exports_in_the_same_frame() {
        let mut container = manifest_container("D7");
        container.mode = ContainerMode::Manual;
        container.manifest = None;
        let view = AggregatedView::Manual {
            entries: vec![TallyEntry {
                sku: "SKU9".to_string(),
                qty: 2,
                pallet_no: "P-1".to_string(),
                event_ids: vec![],
            }],
        };
        let bytes = full_result(&container, &view).expect("export");
        assert_eq!(&bytes[0..2], b"PK");
    }
}
