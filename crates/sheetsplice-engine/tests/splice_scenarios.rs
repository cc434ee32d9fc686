use pretty_assertions::assert_eq;
use sheetsplice_engine::{
    MetadataKind, Splice, SpliceEngine, SpliceError, SpliceJournal, WarningReason,
};
use sheetsplice_model::{
    CellRef, CellValue, CfRule, CfRuleKind, ConditionalFormatting, DataValidation,
    DataValidationKind, DefinedName, Range, RangeSet, RowDef, StyleRef, Table, Workbook,
    Worksheet,
};

fn expression_rule(formula: &str) -> CfRule {
    CfRule {
        priority: 1,
        dxf_id: Some(0),
        stop_if_true: false,
        kind: CfRuleKind::Expression {
            formula: formula.to_string(),
        },
    }
}

/// 61 used columns (A..BI) and 100 used rows, with explicit widths on every
/// column and a conditional format on `BI2:BI100`.
fn wide_sheet() -> Worksheet {
    let mut sheet = Worksheet::new("Data");
    for col in 1..=61 {
        sheet.set_value(CellRef::new(1, col), format!("h{col}"));
        sheet.column_def_mut(col).width = Some(12.0);
    }
    for row in 2..=100 {
        sheet.set_value(CellRef::new(row, 1), f64::from(row));
    }
    sheet.set_value(CellRef::new(100, 61), "tail");
    sheet.conditional_formatting.push(ConditionalFormatting::new(
        &RangeSet::parse("BI2:BI100").unwrap(),
        vec![expression_rule("BI2>0")],
    ));
    sheet
}

#[test]
fn deleting_last_column_drops_formatting_anchored_to_it() {
    let engine = SpliceEngine::default();
    let mut sheet = wide_sheet();

    let outcome = engine
        .apply(&mut sheet, Splice::DeleteCols { col: 61, count: 1 })
        .unwrap();

    assert!(sheet.conditional_formatting.is_empty());
    assert!(outcome.warnings.iter().any(|w| {
        w.kind == MetadataKind::ConditionalFormatting
            && w.reference == "BI2:BI100"
            && w.reason == WarningReason::Collapsed
    }));
    assert_eq!(outcome.extent, Some(Range::from_a1("A1:BH100").unwrap()));
    assert_eq!(sheet.dimension, outcome.extent);
    assert_eq!(sheet.column_defs.len(), 60);
    assert_eq!(sheet.max_explicit_column(), Some(60));
}

#[test]
fn deleting_first_column_shifts_formatting_left() {
    let engine = SpliceEngine::default();
    let mut sheet = wide_sheet();

    let outcome = engine
        .apply(&mut sheet, Splice::DeleteCols { col: 1, count: 1 })
        .unwrap();

    assert_eq!(sheet.conditional_formatting.len(), 1);
    assert_eq!(sheet.conditional_formatting[0].sqref, "BH2:BH100");
    assert_eq!(
        sheet.conditional_formatting[0].rules[0].kind,
        CfRuleKind::Expression {
            formula: "BH2>0".to_string()
        }
    );
    assert_eq!(outcome.extent, Some(Range::from_a1("A1:BH100").unwrap()));
    assert_eq!(sheet.column_defs.len(), 60);
    assert_eq!(sheet.value(CellRef::new(1, 1)), &CellValue::from("h2"));
    assert_eq!(sheet.value(CellRef::new(100, 60)), &CellValue::from("tail"));
}

#[test]
fn failed_splice_leaves_sheet_untouched() {
    let engine = SpliceEngine::default();
    let mut sheet = wide_sheet();
    let before = sheet.clone();

    let err = engine
        .apply(&mut sheet, Splice::DeleteCols { col: 62, count: 1 })
        .unwrap_err();
    assert!(matches!(err, SpliceError::OutOfBounds { index: 62, .. }));
    assert_eq!(sheet, before);

    let err = engine
        .apply(&mut sheet, Splice::InsertRows { row: 2, count: 1_048_576 })
        .unwrap_err();
    assert!(matches!(err, SpliceError::OutOfBounds { .. }));
    assert_eq!(sheet, before);
}

#[test]
fn formulas_follow_column_splices() {
    let engine = SpliceEngine::default();
    let mut sheet = Worksheet::new("Sheet1");
    for col in 1..=5 {
        sheet.set_value(CellRef::new(1, col), f64::from(col));
    }
    sheet.set_value(CellRef::new(2, 1), CellValue::Formula("SUM(B1:D1)+$E$1".into()));
    sheet.set_value(CellRef::new(3, 1), CellValue::Formula("C1*2".into()));

    engine
        .apply(&mut sheet, Splice::DeleteCols { col: 3, count: 1 })
        .unwrap();
    assert_eq!(
        sheet.value(CellRef::new(2, 1)),
        &CellValue::Formula("SUM(B1:C1)+$D$1".into())
    );
    assert_eq!(
        sheet.value(CellRef::new(3, 1)),
        &CellValue::Formula("#REF!*2".into())
    );

    engine
        .apply(&mut sheet, Splice::InsertCols { col: 2, count: 2 })
        .unwrap();
    assert_eq!(
        sheet.value(CellRef::new(2, 1)),
        &CellValue::Formula("SUM(D1:E1)+$F$1".into())
    );
}

#[test]
fn merges_and_validations_shift_with_rows() {
    let engine = SpliceEngine::default();
    let mut sheet = Worksheet::new("Sheet1");
    sheet.set_value(CellRef::new(1, 1), "top");
    sheet.set_value(CellRef::new(20, 4), "bottom");
    sheet.merges.add(Range::from_a1("B5:B6").unwrap()).unwrap();
    sheet.merges.add(Range::from_a1("A10:A11").unwrap()).unwrap();
    sheet.data_validations.push(DataValidation {
        sqref: "D8:D12 A15".to_string(),
        kind: DataValidationKind::List,
        formula1: Some("$A$1:$A$3".to_string()),
        formula2: None,
        allow_blank: true,
    });

    let outcome = engine
        .apply(&mut sheet, Splice::DeleteRows { row: 6, count: 5 })
        .unwrap();

    // B5:B6 loses row 6 and collapses; A10:A11 loses row 10.
    assert_eq!(sheet.merges.len(), 0);
    assert_eq!(
        outcome
            .warnings
            .iter()
            .filter(|w| w.kind == MetadataKind::Merge)
            .count(),
        2
    );
    assert_eq!(sheet.data_validations[0].sqref, "D6:D7 A10");
    assert_eq!(sheet.dimension, Some(Range::from_a1("A1:D15").unwrap()));
}

#[test]
fn insert_inside_table_adds_generated_columns() {
    let engine = SpliceEngine::default();
    let mut sheet = Worksheet::new("Sheet1");
    sheet.set_value(CellRef::new(2, 2), "Region");
    sheet.set_value(CellRef::new(6, 4), 10.0);
    sheet
        .tables
        .push(Table::new(1, "Sales", Range::from_a1("B2:D6").unwrap()).unwrap());

    engine
        .apply(&mut sheet, Splice::InsertCols { col: 3, count: 1 })
        .unwrap();

    let table = sheet.table("Sales").unwrap();
    assert_eq!(table.reference, "B2:E6");
    let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Column1", "Column4", "Column2", "Column3"]);
    assert_eq!(
        table.auto_filter.as_ref().map(|f| f.reference.as_str()),
        Some("B2:E6")
    );
}

#[test]
fn deleting_table_header_row_drops_table() {
    let engine = SpliceEngine::default();
    let mut sheet = Worksheet::new("Sheet1");
    sheet.set_value(CellRef::new(8, 4), 1.0);
    sheet
        .tables
        .push(Table::new(1, "Sales", Range::from_a1("B2:D6").unwrap()).unwrap());

    let outcome = engine
        .apply(&mut sheet, Splice::DeleteRows { row: 2, count: 1 })
        .unwrap();

    assert!(sheet.tables.is_empty());
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].reason, WarningReason::HeaderRowDeleted);
    assert_eq!(outcome.warnings[0].reference, "Sales");
}

#[test]
fn deleting_totals_row_clears_the_totals_count() {
    let engine = SpliceEngine::default();
    let mut sheet = Worksheet::new("Sheet1");
    for row in 1..=10 {
        for col in 1..=3 {
            sheet.set_value(CellRef::new(row, col), f64::from(row));
        }
    }
    let mut table = Table::new(1, "Ledger", Range::from_a1("A1:C10").unwrap()).unwrap();
    table.totals_row_count = 1;
    sheet.tables.push(table);

    let outcome = engine
        .apply(&mut sheet, Splice::DeleteRows { row: 10, count: 1 })
        .unwrap();

    assert!(outcome.warnings.is_empty());
    let table = sheet.table("Ledger").unwrap();
    assert_eq!(table.reference, "A1:C9");
    assert_eq!(table.totals_row_count, 0);
    assert_eq!(table.data_range(), Some(Range::from_a1("A2:C9").unwrap()));
}

#[test]
fn moving_a_row_carries_its_cells_and_metadata() {
    let engine = SpliceEngine::default();
    let mut workbook = Workbook::new();
    {
        let data = workbook.add_sheet("Data").unwrap();
        for row in 1..=12 {
            data.set_value(CellRef::new(row, 1), f64::from(row));
        }
        data.set_style(CellRef::new(5, 2), StyleRef::Shared(1));
        data.set_row_def(
            5,
            RowDef {
                height: Some(30.0),
                ..RowDef::default()
            },
        );
        data.set_value(CellRef::new(1, 3), CellValue::Formula("A5+A10".into()));
        data.set_value(CellRef::new(1, 5), "notes");
        data.merges.add(Range::from_a1("D5:E5").unwrap()).unwrap();
    }
    workbook
        .add_sheet("Summary")
        .unwrap()
        .set_value(CellRef::new(1, 1), CellValue::Formula("Data!A5*2".into()));

    let outcome = engine.move_rows(&mut workbook, "Data", 5, 1, 10).unwrap();
    assert!(outcome.warnings.is_empty());

    let data = workbook.sheet("Data").unwrap();
    assert_eq!(data.value(CellRef::new(10, 1)), &CellValue::Number(5.0));
    assert_eq!(data.value(CellRef::new(5, 1)), &CellValue::Number(6.0));
    assert_eq!(data.value(CellRef::new(9, 1)), &CellValue::Number(10.0));
    assert_eq!(data.value(CellRef::new(11, 1)), &CellValue::Number(11.0));
    assert_eq!(
        data.cell(CellRef::new(10, 2)).map(|c| &c.style),
        Some(&StyleRef::Shared(1))
    );
    assert_eq!(data.row_def(10).and_then(|d| d.height), Some(30.0));
    assert!(data.row_def(5).is_none());
    assert_eq!(
        data.value(CellRef::new(1, 3)),
        &CellValue::Formula("A10+A9".into())
    );
    let merges: Vec<_> = data.merges.iter().map(|r| r.to_string()).collect();
    assert_eq!(merges, ["D10:E10"]);
    assert_eq!(data.dimension, Some(Range::from_a1("A1:E12").unwrap()));

    assert_eq!(
        workbook.sheet("Summary").unwrap().value(CellRef::new(1, 1)),
        &CellValue::Formula("Data!A10*2".into())
    );
}

#[test]
fn row_moves_are_validated_against_the_used_rows() {
    let engine = SpliceEngine::default();
    let mut sheet = Worksheet::new("Sheet1");
    for row in 1..=3 {
        sheet.set_value(CellRef::new(row, 1), f64::from(row));
    }
    let before = sheet.clone();

    assert!(matches!(
        engine.apply(&mut sheet, Splice::MoveRows { row: 4, count: 1, to: 1 }),
        Err(SpliceError::OutOfBounds { index: 4, .. })
    ));
    assert_eq!(
        engine.apply(&mut sheet, Splice::MoveRows { row: 1, count: 1, to: 0 }),
        Err(SpliceError::InvalidIndex { index: 0 })
    );
    assert!(matches!(
        engine.apply(&mut sheet, Splice::MoveRows { row: 1, count: 2, to: u32::MAX }),
        Err(SpliceError::OutOfBounds { .. })
    ));
    assert_eq!(sheet, before);

    engine
        .apply(&mut sheet, Splice::MoveRows { row: 3, count: 1, to: 1 })
        .unwrap();
    let column: Vec<_> = (1..=3).map(|row| sheet.value(CellRef::new(row, 1)).clone()).collect();
    assert_eq!(column, [3.0, 1.0, 2.0].map(CellValue::Number));
}

#[test]
fn qualified_formulas_follow_the_spliced_sheet() {
    let engine = SpliceEngine::default();
    let mut workbook = Workbook::new();
    {
        let data = workbook.add_sheet("Data").unwrap();
        for row in 1..=10 {
            data.set_value(CellRef::new(row, 1), f64::from(row));
        }
        data.set_value(CellRef::new(1, 2), CellValue::Formula("Data!A3".into()));
    }
    workbook.add_sheet("Summary").unwrap().set_value(
        CellRef::new(1, 1),
        CellValue::Formula("SUM(Data!A1:A10)+'data'!A2+A2".into()),
    );

    engine.delete_rows(&mut workbook, "Data", 2, 1).unwrap();

    assert_eq!(
        workbook.sheet("Summary").unwrap().value(CellRef::new(1, 1)),
        &CellValue::Formula("SUM(Data!A1:A9)+'data'!#REF!+A2".into())
    );
    assert_eq!(
        workbook.sheet("Data").unwrap().value(CellRef::new(1, 2)),
        &CellValue::Formula("Data!A2".into())
    );
}

#[test]
fn defined_names_on_other_sheets_follow_the_spliced_sheet() {
    let engine = SpliceEngine::default();
    let mut workbook = Workbook::new();
    {
        let data = workbook.add_sheet("Data").unwrap();
        for row in 1..=10 {
            for col in 1..=3 {
                data.set_value(CellRef::new(row, col), f64::from(row * col));
            }
        }
        data.defined_names
            .push(DefinedName::new("FirstCol", "$A$1:$A$10").unwrap());
    }
    workbook
        .add_sheet("Summary")
        .unwrap()
        .defined_names
        .push(DefinedName::new("Totals", "Data!$C$1:$C$10").unwrap());

    let outcome = engine
        .delete_columns(&mut workbook, "data", 1, 1)
        .unwrap();

    let summary = workbook.sheet("Summary").unwrap();
    assert_eq!(
        summary.defined_name("Totals").unwrap().refers_to,
        "Data!$B$1:$B$10"
    );
    assert!(workbook.sheet("Data").unwrap().defined_name("FirstCol").is_none());
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.kind == MetadataKind::DefinedName && w.reference == "FirstCol"));
}

#[test]
fn unknown_sheet_is_reported() {
    let engine = SpliceEngine::default();
    let mut workbook = Workbook::new();
    workbook.add_sheet("Sheet1").unwrap();
    assert_eq!(
        engine.insert_rows(&mut workbook, "Missing", 1, 1),
        Err(SpliceError::SheetNotFound("Missing".to_string()))
    );
}

#[test]
fn journal_replays_splices_per_sheet() {
    let engine = SpliceEngine::default();
    let mut workbook = Workbook::new();
    workbook
        .add_sheet("Sheet1")
        .unwrap()
        .set_value(CellRef::new(3, 3), 1.0);
    workbook
        .add_sheet("Sheet2")
        .unwrap()
        .set_value(CellRef::new(1, 1), 1.0);

    let mut journal = SpliceJournal::new();
    engine
        .apply_recorded(&mut workbook, "Sheet1", Splice::InsertRows { row: 1, count: 2 }, &mut journal)
        .unwrap();
    let mark = journal.mark();
    engine
        .apply_recorded(&mut workbook, "Sheet2", Splice::InsertCols { col: 1, count: 1 }, &mut journal)
        .unwrap();
    engine
        .apply_recorded(&mut workbook, "Sheet1", Splice::DeleteCols { col: 1, count: 1 }, &mut journal)
        .unwrap();
    // Failed splices are not recorded.
    assert!(engine
        .apply_recorded(&mut workbook, "Sheet1", Splice::DeleteCols { col: 9, count: 1 }, &mut journal)
        .is_err());

    assert_eq!(journal.len(), 3);
    assert_eq!(
        journal.since(mark, "Sheet1"),
        vec![Splice::DeleteCols { col: 1, count: 1 }]
    );
    assert_eq!(
        workbook.sheet("Sheet1").unwrap().value(CellRef::new(5, 2)),
        &CellValue::Number(1.0)
    );
}
