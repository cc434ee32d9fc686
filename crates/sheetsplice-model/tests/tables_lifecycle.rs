use sheetsplice_model::{validate_table_name, Range, Table, TableError, Worksheet};

#[test]
fn table_names_follow_excel_rules() {
    assert_eq!(validate_table_name("Sales_2024"), Ok(()));
    assert_eq!(validate_table_name(""), Err(TableError::EmptyName));
    assert_eq!(
        validate_table_name("A1"),
        Err(TableError::ConflictsWithCellReference)
    );
    assert_eq!(
        validate_table_name("R2C3"),
        Err(TableError::ConflictsWithCellReference)
    );
    assert_eq!(validate_table_name("c"), Err(TableError::ReservedName));
    assert_eq!(
        validate_table_name("Bad Name"),
        Err(TableError::InvalidChar { ch: ' ' })
    );
}

#[test]
fn table_requires_a_data_row() {
    assert_eq!(
        Table::new(1, "Tiny", Range::from_a1("A1:C1").unwrap()),
        Err(TableError::InvalidRange)
    );
}

#[test]
fn tables_are_found_case_insensitively() {
    let mut sheet = Worksheet::new("Sheet1");
    sheet
        .tables
        .push(Table::new(1, "Orders", Range::from_a1("A1:D20").unwrap()).unwrap());
    assert!(sheet.table("ORDERS").is_some());
    assert_eq!(
        sheet.table("orders").map(|t| t.min_height()),
        Some(2)
    );
}
