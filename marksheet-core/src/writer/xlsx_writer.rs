//! XLSX writer producing a workbook from row-major tables

use crate::reader::CellValue;
use crate::report::Table;
use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CT_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const WORKSHEET_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const STYLES_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

/// Encode tables as an XLSX workbook, one worksheet per table in order.
///
/// Entries carry a fixed timestamp so identical tables give identical bytes.
pub fn write_workbook_xlsx(tables: &[Table]) -> Result<Vec<u8>> {
    if tables.is_empty() {
        anyhow::bail!("A workbook needs at least one sheet");
    }

    let mut zip_writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let entries = [
        ("[Content_Types].xml", content_types_xml(tables.len())?),
        ("_rels/.rels", root_rels_xml()?),
        ("xl/workbook.xml", workbook_xml(tables)?),
        ("xl/_rels/workbook.xml.rels", workbook_rels_xml(tables.len())?),
        ("xl/styles.xml", styles_xml()?),
    ];
    for (name, content) in entries {
        zip_writer.start_file(name, options)?;
        zip_writer.write_all(&content)?;
    }

    for (i, table) in tables.iter().enumerate() {
        zip_writer.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
        zip_writer.write_all(&worksheet_xml(table)?)?;
    }

    let cursor = zip_writer.finish()?;
    Ok(cursor.into_inner())
}

// Helper functions

fn new_xml_writer() -> Result<Writer<Cursor<Vec<u8>>>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

fn finish_xml(writer: Writer<Cursor<Vec<u8>>>) -> Vec<u8> {
    writer.into_inner().into_inner()
}

fn content_types_xml(sheet_count: usize) -> Result<Vec<u8>> {
    let mut writer = new_xml_writer()?;
    writer.write_event(Event::Start(
        BytesStart::new("Types").with_attributes([("xmlns", CT_NS)]),
    ))?;
    writer.write_event(Event::Empty(BytesStart::new("Default").with_attributes([
        ("Extension", "rels"),
        (
            "ContentType",
            "application/vnd.openxmlformats-package.relationships+xml",
        ),
    ])))?;
    writer.write_event(Event::Empty(
        BytesStart::new("Default")
            .with_attributes([("Extension", "xml"), ("ContentType", "application/xml")]),
    ))?;
    writer.write_event(Event::Empty(BytesStart::new("Override").with_attributes([
        ("PartName", "/xl/workbook.xml"),
        (
            "ContentType",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
        ),
    ])))?;
    writer.write_event(Event::Empty(BytesStart::new("Override").with_attributes([
        ("PartName", "/xl/styles.xml"),
        (
            "ContentType",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml",
        ),
    ])))?;
    for i in 1..=sheet_count {
        let part = format!("/xl/worksheets/sheet{}.xml", i);
        writer.write_event(Event::Empty(BytesStart::new("Override").with_attributes([
            ("PartName", part.as_str()),
            (
                "ContentType",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
            ),
        ])))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Types")))?;
    Ok(finish_xml(writer))
}

fn root_rels_xml() -> Result<Vec<u8>> {
    let mut writer = new_xml_writer()?;
    writer.write_event(Event::Start(
        BytesStart::new("Relationships").with_attributes([("xmlns", PKG_REL_NS)]),
    ))?;
    writer.write_event(Event::Empty(BytesStart::new("Relationship").with_attributes([
        ("Id", "rId1"),
        (
            "Type",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
        ),
        ("Target", "xl/workbook.xml"),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
    Ok(finish_xml(writer))
}

fn workbook_xml(tables: &[Table]) -> Result<Vec<u8>> {
    let mut writer = new_xml_writer()?;
    writer.write_event(Event::Start(
        BytesStart::new("workbook").with_attributes([("xmlns", MAIN_NS), ("xmlns:r", REL_NS)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("sheets")))?;
    for (i, table) in tables.iter().enumerate() {
        let sheet_id = (i + 1).to_string();
        let rel_id = format!("rId{}", i + 1);
        writer.write_event(Event::Empty(BytesStart::new("sheet").with_attributes([
            ("name", table.name.as_str()),
            ("sheetId", sheet_id.as_str()),
            ("r:id", rel_id.as_str()),
        ])))?;
    }
    writer.write_event(Event::End(BytesEnd::new("sheets")))?;
    writer.write_event(Event::End(BytesEnd::new("workbook")))?;
    Ok(finish_xml(writer))
}

fn workbook_rels_xml(sheet_count: usize) -> Result<Vec<u8>> {
    let mut writer = new_xml_writer()?;
    writer.write_event(Event::Start(
        BytesStart::new("Relationships").with_attributes([("xmlns", PKG_REL_NS)]),
    ))?;
    for i in 1..=sheet_count {
        let rel_id = format!("rId{}", i);
        let target = format!("worksheets/sheet{}.xml", i);
        writer.write_event(Event::Empty(BytesStart::new("Relationship").with_attributes([
            ("Id", rel_id.as_str()),
            ("Type", WORKSHEET_TYPE),
            ("Target", target.as_str()),
        ])))?;
    }
    // Styles take the id after the last sheet
    let styles_id = format!("rId{}", sheet_count + 1);
    writer.write_event(Event::Empty(BytesStart::new("Relationship").with_attributes([
        ("Id", styles_id.as_str()),
        ("Type", STYLES_TYPE),
        ("Target", "styles.xml"),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
    Ok(finish_xml(writer))
}

fn styles_xml() -> Result<Vec<u8>> {
    let mut writer = new_xml_writer()?;
    writer.write_event(Event::Start(
        BytesStart::new("styleSheet").with_attributes([("xmlns", MAIN_NS)]),
    ))?;

    let single = |writer: &mut Writer<Cursor<Vec<u8>>>, list: &str, inner: &str| -> Result<()> {
        writer.write_event(Event::Start(
            BytesStart::new(list).with_attributes([("count", "1")]),
        ))?;
        writer.write_event(Event::Empty(BytesStart::new(inner)))?;
        writer.write_event(Event::End(BytesEnd::new(list)))?;
        Ok(())
    };

    single(&mut writer, "fonts", "font")?;
    single(&mut writer, "fills", "fill")?;
    single(&mut writer, "borders", "border")?;
    writer.write_event(Event::Start(
        BytesStart::new("cellXfs").with_attributes([("count", "1")]),
    ))?;
    writer.write_event(Event::Empty(BytesStart::new("xf").with_attributes([
        ("numFmtId", "0"),
        ("fontId", "0"),
        ("fillId", "0"),
        ("borderId", "0"),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("cellXfs")))?;

    writer.write_event(Event::End(BytesEnd::new("styleSheet")))?;
    Ok(finish_xml(writer))
}

fn worksheet_xml(table: &Table) -> Result<Vec<u8>> {
    let mut writer = new_xml_writer()?;
    writer.write_event(Event::Start(
        BytesStart::new("worksheet").with_attributes([("xmlns", MAIN_NS)]),
    ))?;

    if let Some(dimension) = dimension_ref(table) {
        writer.write_event(Event::Empty(
            BytesStart::new("dimension").with_attributes([("ref", dimension.as_str())]),
        ))?;
    }

    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;
    for (r, row) in table.rows.iter().enumerate() {
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }

        let row_num = (r + 1).to_string();
        writer.write_event(Event::Start(
            BytesStart::new("row").with_attributes([("r", row_num.as_str())]),
        ))?;
        for (c, value) in row.iter().enumerate() {
            write_cell(&mut writer, &cell_ref(r as u32, c as u32), value)?;
        }
        writer.write_event(Event::End(BytesEnd::new("row")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;

    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(finish_xml(writer))
}

fn write_cell<W: Write>(writer: &mut Writer<W>, reference: &str, value: &CellValue) -> Result<()> {
    let (cell_type, text) = match value {
        CellValue::Empty => return Ok(()),
        CellValue::Number(n) if n.is_finite() => (None, n.to_string()),
        CellValue::Number(_) => (Some("e"), "#NUM!".to_string()),
        CellValue::Boolean(b) => (Some("b"), if *b { "1" } else { "0" }.to_string()),
        CellValue::Error(e) => (Some("str"), e.clone()),
        CellValue::Text(s) => (Some("inlineStr"), s.clone()),
    };

    let mut start = BytesStart::new("c").with_attributes([("r", reference)]);
    if let Some(t) = cell_type {
        start.push_attribute(("t", t));
    }
    writer.write_event(Event::Start(start))?;

    if cell_type == Some("inlineStr") {
        writer.write_event(Event::Start(BytesStart::new("is")))?;
        let mut t = BytesStart::new("t");
        if text.trim() != text {
            t.push_attribute(("xml:space", "preserve"));
        }
        writer.write_event(Event::Start(t))?;
        writer.write_event(Event::Text(BytesText::new(&text)))?;
        writer.write_event(Event::End(BytesEnd::new("t")))?;
        writer.write_event(Event::End(BytesEnd::new("is")))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new("v")))?;
        writer.write_event(Event::Text(BytesText::new(&text)))?;
        writer.write_event(Event::End(BytesEnd::new("v")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("c")))?;
    Ok(())
}

/// "A1:K20"-style range covering every non-empty cell
fn dimension_ref(table: &Table) -> Option<String> {
    let mut last_row = None;
    let mut last_col = 0;
    for (r, row) in table.rows.iter().enumerate() {
        if let Some(c) = row.iter().rposition(|v| !v.is_empty()) {
            last_row = Some(r);
            last_col = last_col.max(c);
        }
    }
    last_row.map(|r| format!("A1:{}", cell_ref(r as u32, last_col as u32)))
}

/// Convert 0-based (row, col) to an Excel reference like "B3"
pub fn cell_ref(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letter(col), row + 1)
}

/// Convert column number to letter (0 -> A, 1 -> B, etc.)
fn col_to_letter(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_ref() {
        assert_eq!(cell_ref(0, 0), "A1");
        assert_eq!(cell_ref(2, 1), "B3");
        assert_eq!(cell_ref(9, 25), "Z10");
        assert_eq!(cell_ref(0, 26), "AA1");
        assert_eq!(cell_ref(0, 27), "AB1");
    }

    #[test]
    fn test_dimension_ignores_trailing_blanks() {
        let table = Table {
            name: "Final".to_string(),
            rows: vec![
                vec![CellValue::Text("a".to_string()), CellValue::Number(1.0)],
                vec![],
                vec![CellValue::Empty, CellValue::Empty, CellValue::Number(2.0), CellValue::Empty],
                vec![],
            ],
        };
        assert_eq!(dimension_ref(&table).as_deref(), Some("A1:C3"));
        assert_eq!(dimension_ref(&Table::new("Empty")), None);
    }

    #[test]
    fn test_text_is_escaped() {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        write_cell(&mut writer, "A1", &CellValue::Text("B&C <1>".to_string())).unwrap();
        let xml = String::from_utf8(finish_xml(writer)).unwrap();
        assert_eq!(
            xml,
            r#"<c r="A1" t="inlineStr"><is><t>B&amp;C &lt;1&gt;</t></is></c>"#
        );
    }

    #[test]
    fn test_numbers_and_blanks() {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        write_cell(&mut writer, "B2", &CellValue::Number(85.0)).unwrap();
        write_cell(&mut writer, "C2", &CellValue::Empty).unwrap();
        let xml = String::from_utf8(finish_xml(writer)).unwrap();
        assert_eq!(xml, r#"<c r="B2"><v>85</v></c>"#);
    }

    #[test]
    fn test_no_tables_is_an_error() {
        assert!(write_workbook_xlsx(&[]).is_err());
    }
}
