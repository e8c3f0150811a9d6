// Spreadsheet codec: structural transforms between uploaded/downloaded
// workbooks and the manifest row model

pub mod manifest_import;
pub mod workbook_export;

pub use manifest_import::*;
pub use workbook_export::*;
