//! Report emitters for flattened ASA access-lists.
//!
//! The resolution engine lives in `asa-acl-core`. This crate holds what sits
//! around it: the column layout, the SpreadsheetML workbook writer, terminal
//! rendering and output path naming.

pub mod columns;
pub mod output;
pub mod report;
pub mod spreadsheet;
