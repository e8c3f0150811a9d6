// Scan-to-manifest match resolution

use crate::entities::ManifestRow;

/// Locate the manifest row a scan code refers to: a row matches when its
/// normalized SKU contains the code or the code contains the SKU. First
/// matching row in table order wins; ties are not broken further.
pub fn match_row(code: &str, rows: &[ManifestRow]) -> Option<usize> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    rows.iter().position(|row| {
        let sku = row.sku.as_str();
        !sku.is_empty() && (code.contains(sku) || sku.contains(code))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(skus: &[&str]) -> Vec<ManifestRow> {
        skus.iter()
            .map(|sku| ManifestRow {
                sku: sku.to_string(),
                ..ManifestRow::default()
            })
            .collect()
    }

    #[test]
    fn code_containing_sku_matches() {
        let rows = rows(&["ABC123", "DEF456"]);
        assert_eq!(match_row("SN-ABC123-X", &rows), Some(0));
    }

    #[test]
    fn sku_containing_code_matches() {
        let rows = rows(&["ABC123", "DEF456"]);
        assert_eq!(match_row("DEF", &rows), Some(1));
    }

    #[test]
    fn unrelated_code_matches_nothing() {
        let rows = rows(&["ABC123", "DEF456"]);
        assert_eq!(match_row("ZZZ", &rows), None);
    }

    #[test]
    fn first_row_wins_on_ties() {
        let rows = rows(&["ABC", "ABC123"]);
        assert_eq!(match_row("ABC123", &rows), Some(0));
    }

    #[test]
    fn blank_skus_and_codes_never_match() {
        let rows = rows(&["", "ABC123"]);
        assert_eq!(match_row("", &rows), None);
        assert_eq!(match_row("ABC123", &rows), Some(1));
    }
}
