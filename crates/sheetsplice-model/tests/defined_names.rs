use sheetsplice_model::{
    validate_defined_name, DefinedName, DefinedNameValidationError, NameTarget, NameTargetError,
    Range, EXCEL_DEFINED_NAME_MAX_LEN,
};

#[test]
fn validate_defined_name_accepts_common_names() {
    for name in [
        "MyRange",
        "_MyRange",
        "Name1",
        "Name.With.Dots",
        r"\BackslashStart",
        "_xlnm.Print_Area",
    ] {
        assert_eq!(
            validate_defined_name(name),
            Ok(()),
            "name should be valid: {name}"
        );
    }
}

#[test]
fn validate_defined_name_rejects_invalid_names() {
    assert_eq!(
        validate_defined_name("   "),
        Err(DefinedNameValidationError::Empty)
    );
    assert_eq!(
        validate_defined_name("r1c1"),
        Err(DefinedNameValidationError::LooksLikeCellReference)
    );
    assert_eq!(
        validate_defined_name(".Name"),
        Err(DefinedNameValidationError::InvalidStartCharacter('.'))
    );
    let long = "a".repeat(EXCEL_DEFINED_NAME_MAX_LEN + 1);
    assert_eq!(
        validate_defined_name(&long),
        Err(DefinedNameValidationError::TooLong {
            len: EXCEL_DEFINED_NAME_MAX_LEN + 1,
            max: EXCEL_DEFINED_NAME_MAX_LEN,
        })
    );
    assert!(DefinedName::new("A1", "Sheet1!$A$1").is_err());
}

#[test]
fn name_targets_keep_anchors_and_prefixes() {
    let target = NameTarget::parse("=Sheet1!$B$2:$D$9").unwrap();
    assert_eq!(target.areas.len(), 1);
    let area = &target.areas[0];
    assert!(area.targets_sheet("SHEET1"));
    assert_eq!(area.range.range(), Range::from_a1("B2:D9").unwrap());
    assert_eq!(target.to_string(), "Sheet1!$B$2:$D$9");

    let local = NameTarget::parse("A1,C3:C4").unwrap();
    assert!(local.areas.iter().all(|a| a.sheet.is_none()));
    assert_eq!(local.to_string(), "A1,C3:C4");
}

#[test]
fn malformed_targets_are_reported() {
    assert_eq!(
        NameTarget::parse("'Open!A1"),
        Err(NameTargetError::UnterminatedQuote)
    );
    assert!(matches!(
        NameTarget::parse("Sheet1!A0"),
        Err(NameTargetError::Range(_))
    ));
    assert_eq!(
        NameTarget::parse("TRUE"),
        Err(NameTargetError::NotAReference)
    );
}
