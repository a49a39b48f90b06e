//! Integration tests for Error types
//!
//! Tests error construction, display, context paths, and error kinds.

use skein_foundation::{Error, ErrorContext, ErrorKind, ReferenceTable, Value};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_parse() {
    let err = Error::parse("expected value", 3, 14);
    assert!(matches!(
        err.kind,
        ErrorKind::ParseError {
            line: 3,
            column: 14,
            ..
        }
    ));
    assert!(err.is_parse_error());
    let msg = format!("{err}");
    assert!(msg.contains("3:14"));
    assert!(msg.contains("expected value"));
}

#[test]
fn error_malformed_is_parse_family() {
    let err = Error::malformed("$items must be an array");
    assert!(matches!(err.kind, ErrorKind::MalformedNode { .. }));
    assert!(err.is_parse_error());
    assert!(!err.is_dangling_reference());
}

#[test]
fn error_dangling_reference() {
    let err = Error::dangling_reference("Set_4");
    assert!(err.is_dangling_reference());
    assert!(!err.is_parse_error());
    assert!(format!("{err}").contains("Set_4"));
}

#[test]
fn error_serialization() {
    let err = Error::serialization("io failure");
    assert!(matches!(err.kind, ErrorKind::Serialization(_)));
    assert!(format!("{err}").contains("io failure"));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn frames_render_root_first() {
    let err = Error::dangling_reference("Map_0")
        .with_frame("[2]")
        .with_frame("pets")
        .with_frame("owner");
    let context = err.context.as_ref().unwrap();
    assert_eq!(context.path(), "$.owner.pets[2]");
    assert!(format!("{err}").ends_with("at $.owner.pets[2]"));
}

#[test]
fn explicit_context() {
    let err = Error::malformed("bad").with_context(ErrorContext::new().with_frame("x"));
    assert_eq!(err.context.unwrap().path(), "$.x");
}

#[test]
fn error_without_context_has_plain_message() {
    let err = Error::dangling_reference("Date_1");
    assert_eq!(format!("{err}"), "dangling reference: Date_1");
}

// =============================================================================
// Reference Table
// =============================================================================

#[test]
fn reference_table_resolves_recorded_ids() {
    let mut refs = ReferenceTable::new();
    let set = Value::set([]);
    refs.insert("Set_0", set.clone());
    refs.insert("Set_0", Value::set([]));

    assert!(refs.resolve("Set_0").unwrap().same_identity(&set));
    assert!(refs.resolve("Set_1").unwrap_err().is_dangling_reference());
    assert_eq!(refs.len(), 1);
}
