//! SpreadsheetML 2003 workbook output.
//!
//! The format is plain XML that Excel and LibreOffice open directly, which keeps
//! the writer on the same `quick-xml` event API used for every other XML task.

use std::fs;
use std::path::Path;

use asa_acl_core::ExpandedRow;
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::columns::Column;

const PROLOGUE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<?mso-application progid=\"Excel.Sheet\"?>\n";
const NAMESPACE: &str = "urn:schemas-microsoft-com:office:spreadsheet";
const SHEET_NAME: &str = "AccessLists";
const POINTS_PER_CHAR: usize = 6;

/// Errors that can occur while writing the workbook.
#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("failed to write workbook XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("failed to write workbook file: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize rows into workbook bytes.
pub fn write(rows: &[ExpandedRow], columns: &[Column]) -> Result<Vec<u8>, SpreadsheetError> {
    let mut writer = Writer::new_with_indent(PROLOGUE.as_bytes().to_vec(), b' ', 1);
    write_workbook(&mut writer, rows, columns)?;
    Ok(writer.into_inner())
}

/// Serialize rows and write the workbook to `path`.
pub fn write_file(
    rows: &[ExpandedRow],
    columns: &[Column],
    path: &Path,
) -> Result<(), SpreadsheetError> {
    let bytes = write(rows, columns)?;
    fs::write(path, bytes)?;
    Ok(())
}

fn write_workbook(
    writer: &mut Writer<Vec<u8>>,
    rows: &[ExpandedRow],
    columns: &[Column],
) -> Result<(), quick_xml::Error> {
    let mut workbook = BytesStart::new("Workbook");
    workbook.push_attribute(("xmlns", NAMESPACE));
    workbook.push_attribute(("xmlns:ss", NAMESPACE));
    writer.write_event(Event::Start(workbook))?;

    write_styles(writer)?;

    let mut sheet = BytesStart::new("Worksheet");
    sheet.push_attribute(("ss:Name", SHEET_NAME));
    writer.write_event(Event::Start(sheet))?;
    writer.write_event(Event::Start(BytesStart::new("Table")))?;

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| c.field.value(row)).collect())
        .collect();

    for (idx, column) in columns.iter().enumerate() {
        let longest = cells
            .iter()
            .flat_map(|r| r[idx].lines().map(|line| line.chars().count()))
            .chain(std::iter::once(column.header.chars().count()))
            .max()
            .unwrap_or(0);
        let width = ((longest + 2) * POINTS_PER_CHAR).to_string();
        let mut col = BytesStart::new("Column");
        col.push_attribute(("ss:Width", width.as_str()));
        writer.write_event(Event::Empty(col))?;
    }

    writer.write_event(Event::Start(BytesStart::new("Row")))?;
    for column in columns {
        write_cell(writer, &column.header, Some("header"))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Row")))?;

    for row in &cells {
        writer.write_event(Event::Start(BytesStart::new("Row")))?;
        for (value, column) in row.iter().zip(columns) {
            let style = column.wrap.then_some("wrap");
            write_cell(writer, value, style)?;
        }
        writer.write_event(Event::End(BytesEnd::new("Row")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Table")))?;
    writer.write_event(Event::End(BytesEnd::new("Worksheet")))?;
    writer.write_event(Event::End(BytesEnd::new("Workbook")))?;
    Ok(())
}

fn write_styles(writer: &mut Writer<Vec<u8>>) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new("Styles")))?;

    let mut header = BytesStart::new("Style");
    header.push_attribute(("ss:ID", "header"));
    writer.write_event(Event::Start(header))?;
    let mut font = BytesStart::new("Font");
    font.push_attribute(("ss:Bold", "1"));
    writer.write_event(Event::Empty(font))?;
    writer.write_event(Event::End(BytesEnd::new("Style")))?;

    let mut wrap = BytesStart::new("Style");
    wrap.push_attribute(("ss:ID", "wrap"));
    writer.write_event(Event::Start(wrap))?;
    let mut alignment = BytesStart::new("Alignment");
    alignment.push_attribute(("ss:Vertical", "Top"));
    alignment.push_attribute(("ss:WrapText", "1"));
    writer.write_event(Event::Empty(alignment))?;
    writer.write_event(Event::End(BytesEnd::new("Style")))?;

    writer.write_event(Event::End(BytesEnd::new("Styles")))?;
    Ok(())
}

fn write_cell(
    writer: &mut Writer<Vec<u8>>,
    value: &str,
    style: Option<&str>,
) -> Result<(), quick_xml::Error> {
    let mut cell = BytesStart::new("Cell");
    if let Some(style) = style {
        cell.push_attribute(("ss:StyleID", style));
    }
    writer.write_event(Event::Start(cell))?;
    let mut data = BytesStart::new("Data");
    data.push_attribute(("ss:Type", "String"));
    writer.write_event(Event::Start(data))?;
    // Line breaks inside a cell are written as character references.
    let text = escape(value).replace('\n', "&#10;");
    writer.write_event(Event::Text(BytesText::from_escaped(text)))?;
    writer.write_event(Event::End(BytesEnd::new("Data")))?;
    writer.write_event(Event::End(BytesEnd::new("Cell")))?;
    Ok(())
}
