// Manifest workbook import
// First row is the header row; SKU and quantity columns are auto-detected.
// Only headers + raw rows + column keys are kept; display fields are always
// recomputed from the ledger.

use std::collections::HashMap;

use anyhow::{anyhow, Result};

use backend_domain::ManifestBlob;

/// Parse delimited sheet text (comma or tab separated) into a manifest blob.
pub fn parse_manifest(file_name: &str, content: &str) -> Result<ManifestBlob> {
    let lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.is_empty() {
        return Err(anyhow!("uploaded sheet is empty"));
    }

    let delimiter = detect_delimiter(lines[0]);
    let headers = unique_headers(parse_row(lines[0], delimiter));
    if headers.is_empty() {
        return Err(anyhow!("uploaded sheet has no header row"));
    }

    let sku_column_key = detect_sku_column(&headers);
    let qty_column_key = detect_qty_column(&headers);

    let mut rows: Vec<HashMap<String, String>> = Vec::new();
    for line in &lines[1..] {
        let cells = parse_row(line, delimiter);
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let mut row = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            row.insert(
                header.clone(),
                cells.get(i).cloned().unwrap_or_default(),
            );
        }
        rows.push(row);
    }

    Ok(ManifestBlob {
        headers,
        rows,
        sku_column_key,
        qty_column_key,
        file_name: file_name.to_string(),
    })
}

fn detect_delimiter(header_line: &str) -> char {
    if header_line.contains('\t') {
        '\t'
    } else {
        ','
    }
}

/// Header matching a SKU-name pattern, else the first column.
fn detect_sku_column(headers: &[String]) -> String {
    headers
        .iter()
        .find(|header| header.to_lowercase().contains("sku"))
        .or_else(|| {
            headers.iter().find(|header| {
                let lower = header.to_lowercase();
                lower.contains("item") || lower.contains("part")
            })
        })
        .cloned()
        .unwrap_or_else(|| headers[0].clone())
}

fn detect_qty_column(headers: &[String]) -> Option<String> {
    headers
        .iter()
        .find(|header| {
            let lower = header.to_lowercase();
            lower.contains("qty") || lower.contains("quantity") || lower.contains("pcs")
        })
        .cloned()
}

/// Split one delimited line, honoring double-quoted fields with "" escapes.
fn parse_row(line: &str, delimiter: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == delimiter {
            cells.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    cells.push(current);
    cells.iter().map(|cell| cell.trim().to_string()).collect()
}

/// Blank headers get a positional name, duplicates a numeric suffix, so
/// every row cell stays addressable by its header key.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, header)| {
            let base = if header.is_empty() {
                format!("Column{}", i + 1)
            } else {
                header
            };
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                base
            } else {
                format!("{}_{}", base, count)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_and_rows() {
        let blob = parse_manifest(
            "manifest.csv",
            "SKU,Description,QTY\nABC123,Widget,10\nDEF456,Gadget,4\n",
        )
        .expect("parse");
        assert_eq!(blob.headers, vec!["SKU", "Description", "QTY"]);
        assert_eq!(blob.rows.len(), 2);
        assert_eq!(blob.sku_column_key, "SKU");
        assert_eq!(blob.qty_column_key.as_deref(), Some("QTY"));
        assert_eq!(blob.rows[0].get("Description").unwrap(), "Widget");
        assert_eq!(blob.file_name, "manifest.csv");
    }

    #[test]
    fn detects_tab_delimited_sheets() {
        let blob = parse_manifest("m.tsv", "Item No\tQuantity\nABC123\t5\n").expect("parse");
        assert_eq!(blob.sku_column_key, "Item No");
        assert_eq!(blob.qty_column_key.as_deref(), Some("Quantity"));
        assert_eq!(blob.rows[0].get("Item No").unwrap(), "ABC123");
    }

    #[test]
    fn falls_back_to_first_column_for_sku() {
        let blob = parse_manifest("m.csv", "Code,Count\nABC,1\n").expect("parse");
        assert_eq!(blob.sku_column_key, "Code");
        assert!(blob.qty_column_key.is_none());
    }

    #[test]
    fn quoted_cells_keep_embedded_delimiters() {
        let blob = parse_manifest(
            "m.csv",
            "SKU,Description\nABC123,\"Widget, large\"\nDEF456,\"say \"\"hi\"\"\"\n",
        )
        .expect("parse");
        assert_eq!(blob.rows[0].get("Description").unwrap(), "Widget, large");
        assert_eq!(blob.rows[1].get("Description").unwrap(), "say \"hi\"");
    }

    #[test]
    fn skips_blank_lines_and_rejects_empty_sheets() {
        let blob = parse_manifest("m.csv", "SKU,QTY\n\nABC123,2\n\n").expect("parse");
        assert_eq!(blob.rows.len(), 1);
        assert!(parse_manifest("m.csv", "\n\n").is_err());
    }

    #[test]
    fn blank_and_duplicate_headers_stay_addressable() {
        let blob = parse_manifest("m.csv", "SKU,,Note,Note\nABC,x,y,z\n").expect("parse");
        assert_eq!(blob.headers, vec!["SKU", "Column2", "Note", "Note_2"]);
        assert_eq!(blob.rows[0].get("Note_2").unwrap(), "z");
    }
}
