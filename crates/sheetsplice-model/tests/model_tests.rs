use pretty_assertions::assert_eq;
use sheetsplice_model::{
    Cell, CellRef, CellValue, Color, ConditionalFormatting, Fill, RangeSet, Style, StyleRef,
    StyleTable, Workbook, Worksheet,
};

#[test]
fn sparse_storage_is_proportional_to_stored_cells() {
    let mut sheet = Worksheet::new("Sheet1");

    sheet.set_value(CellRef::new(10, 10), CellValue::Empty);
    assert_eq!(sheet.cell_count(), 0);

    sheet.set_value(CellRef::new(1, 1), CellValue::Number(1.0));
    sheet.set_value(CellRef::new(999_999, 999), CellValue::Number(2.0));
    assert_eq!(sheet.cell_count(), 2);

    sheet.remove_cell(CellRef::new(1, 1));
    assert_eq!(sheet.cell_count(), 1);
    assert_eq!(sheet.value(CellRef::new(1, 1)), &CellValue::Empty);
}

#[test]
fn cells_iterate_in_reading_order() {
    let mut sheet = Worksheet::new("Sheet1");
    sheet.set_value(CellRef::new(3, 1), "c");
    sheet.set_value(CellRef::new(1, 5), "a");
    sheet.set_value(CellRef::new(1, 2), "b");

    let order: Vec<_> = sheet.iter_cells().map(|(at, _)| at.to_a1()).collect();
    assert_eq!(order, ["B1", "E1", "A3"]);
}

#[test]
fn style_table_deduplicates_and_resolves() {
    let mut styles = StyleTable::new();
    let red = Style {
        fill: Some(Fill::solid(Color::new_argb(0xFFFF0000))),
        ..Style::default()
    };
    let a = styles.intern(red.clone());
    let b = styles.intern(red.clone());
    assert_eq!(a, b);
    assert_eq!(styles.len(), 2);

    let cell = Cell::new(CellValue::Number(1.0)).with_style(StyleRef::Shared(a));
    assert_eq!(cell.style.resolve(&styles), red);
    assert_eq!(StyleRef::Shared(99).resolve(&styles), Style::default());
}

#[test]
fn worksheet_json_shape_is_stable() {
    let mut sheet = Worksheet::new("Data");
    sheet.set_value(CellRef::new(2, 61), CellValue::Formula("SUM(A2:BH2)".into()));
    sheet.column_def_mut(2).width = Some(20.0);
    sheet.conditional_formatting.push(ConditionalFormatting::new(
        &RangeSet::parse("BI2:BI100").unwrap(),
        Vec::new(),
    ));

    let json = serde_json::to_value(&sheet).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "name": "Data",
            "cells": [
                {"row": 2, "col": 61, "value": {"type": "formula", "value": "SUM(A2:BH2)"}}
            ],
            "column_defs": [{}, {"width": 20.0}],
            "conditional_formatting": [{"sqref": "BI2:BI100", "rules": []}]
        })
    );

    let back: Worksheet = serde_json::from_value(json).unwrap();
    assert_eq!(back, sheet);
}

#[test]
fn duplicate_cell_entries_are_rejected() {
    let json = serde_json::json!({
        "name": "Data",
        "cells": [
            {"row": 1, "col": 1, "value": {"type": "number", "value": 1.0}},
            {"row": 1, "col": 1, "value": {"type": "number", "value": 2.0}}
        ]
    });
    let err = serde_json::from_value::<Worksheet>(json).unwrap_err();
    assert!(err.to_string().contains("duplicate cell entry"), "{err}");
}

#[test]
fn workbook_round_trips_through_json() {
    let mut wb = Workbook::new();
    let sheet = wb.add_sheet("Sheet1").unwrap();
    sheet.set_value(CellRef::new(1, 1), true);
    let id = wb.styles.intern(Style {
        number_format: Some("0.00".into()),
        ..Style::default()
    });
    if let Some(sheet) = wb.sheet_mut("sheet1") {
        sheet.set_style(CellRef::new(1, 1), StyleRef::Shared(id));
    }

    let json = serde_json::to_string(&wb).unwrap();
    let back: Workbook = serde_json::from_str(&json).unwrap();
    assert_eq!(back, wb);
}
