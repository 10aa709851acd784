//! Coercion Tests
//!
//! Tests for type constraints and coercion through the reference runtime:
//! - Coercions registered on the type library
//! - Declaration-time checks (`coerce` without a coercion)
//! - Parameterized and union constraints
//! - User-defined subtypes
//!
//! # Running Tests
//! ```bash
//! cargo test --test coercion_tests
//! ```

use methodsig_engine::{ParamSpec, Runtime, Signature, TypeDef};
use methodsig_sdk::{CallError, DeclareError, ParamLabel, Value};
use pretty_assertions::assert_eq;

/// Runtime with `Int` coercible from numeric strings
fn runtime() -> Runtime {
    let rt = Runtime::new();
    rt.types()
        .add_coercion("Int", "Str", |v| {
            v.as_str()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .map(Value::Int)
                .unwrap_or_default()
        })
        .unwrap();
    rt
}

// ===== Scalar coercion =====

#[test]
fn test_coerce_str_to_int() {
    let rt = runtime();
    let sig = rt
        .declarer("Calc")
        .positional([ParamSpec::new().isa("Int").coerce().required()])
        .unwrap();

    let args = sig.verify_arguments(&[Value::str(" 42 ")]).unwrap();
    assert_eq!(args.positional(), &[Value::Int(42)]);

    // Values that already pass are untouched
    let args = sig.verify_arguments(&[Value::Int(7)]).unwrap();
    assert_eq!(args.positional(), &[Value::Int(7)]);
}

#[test]
fn test_coercion_result_rechecked() {
    let rt = runtime();
    let sig = rt
        .declarer("Calc")
        .positional([ParamSpec::new().isa("Int").coerce()])
        .unwrap();

    let err = sig.verify_arguments(&[Value::str("forty-two")]).unwrap_err();
    assert_eq!(
        err,
        CallError::CoercionFailure {
            param: ParamLabel::Position(0),
            constraint: "Int".to_string(),
            value: Value::str("forty-two"),
        }
    );
    assert_eq!(
        err.to_string(),
        "Parameter 1: Could not coerce \"forty-two\" to 'Int'"
    );
}

#[test]
fn test_no_rule_for_source_type() {
    let rt = runtime();
    let sig = rt
        .declarer("Calc")
        .named([("n", ParamSpec::new().isa("Int").coerce())])
        .unwrap();

    let err = sig
        .verify_arguments(&[Value::str("n"), Value::array([])])
        .unwrap_err();
    assert!(matches!(err, CallError::CoercionFailure { .. }));
}

#[test]
fn test_without_coerce_flag_no_coercion() {
    let rt = runtime();
    let sig = rt
        .declarer("Calc")
        .positional([ParamSpec::new().isa("Int")])
        .unwrap();

    let err = sig.verify_arguments(&[Value::str("42")]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Parameter 1: Value \"42\" does not satisfy type constraint 'Int'"
    );
}

#[test]
fn test_coerce_requires_available_coercion() {
    let rt = Runtime::new();
    let err = rt
        .declarer("Calc")
        .positional([ParamSpec::new().isa("Int").coerce()])
        .unwrap_err();
    assert_eq!(
        err,
        DeclareError::CoercionNotAvailable {
            param: ParamLabel::Position(0),
            constraint: "Int".to_string(),
        }
    );

    let err = rt
        .declarer("Calc")
        .named([("n", ParamSpec::new().coerce())])
        .unwrap_err();
    assert!(matches!(err, DeclareError::InvalidDeclarationArgument { .. }));
}

#[test]
fn test_defaults_not_coerced() {
    let rt = runtime();
    let sig = rt
        .declarer("Calc")
        .named([("n", ParamSpec::new().isa("Int").coerce().default_value("7"))])
        .unwrap();

    let args = sig.verify_arguments(&[]).unwrap();
    assert_eq!(args.get("n"), Some(&Value::str("7")));
}

#[test]
fn test_add_coercion_unknown_types() {
    let rt = Runtime::new();
    assert!(matches!(
        rt.types().add_coercion("Widget", "Str", |v| v.clone()),
        Err(DeclareError::UnknownTypeConstraint { ref name }) if name == "Widget"
    ));
    assert!(matches!(
        rt.types().add_coercion("Int", "Gadget", |v| v.clone()),
        Err(DeclareError::UnknownTypeConstraint { ref name }) if name == "Gadget"
    ));
}

#[test]
fn test_coercion_visible_to_later_declarations() {
    let rt = Runtime::new();
    let sig = rt
        .declarer("Calc")
        .positional([ParamSpec::new().isa("Int")])
        .unwrap();

    rt.types()
        .add_coercion("Int", "Str", |v| Value::Int(v.as_str().map_or(0, |s| s.len() as i64)))
        .unwrap();

    assert!(sig.verify_arguments(&[Value::str("abc")]).is_err());
    let sig = rt
        .declarer("Calc")
        .positional([ParamSpec::new().isa("Int").coerce()])
        .unwrap();
    assert_eq!(
        sig.verify_arguments(&[Value::str("abc")]).unwrap().positional(),
        &[Value::Int(3)]
    );
}

// ===== Parameterized =====

#[test]
fn test_array_of_coerces_elementwise() {
    let rt = runtime();
    let sig = rt
        .declarer("Calc")
        .positional([ParamSpec::new().isa("ArrayRef[Int]").coerce()])
        .unwrap();

    let args = sig
        .verify_arguments(&[Value::array([Value::Int(1), Value::str("2")])])
        .unwrap();
    assert_eq!(
        args.positional(),
        &[Value::array([Value::Int(1), Value::Int(2)])]
    );

    assert!(matches!(
        sig.verify_arguments(&[Value::array([Value::str("x")])]),
        Err(CallError::CoercionFailure { .. })
    ));
}

#[test]
fn test_hash_of_and_maybe() {
    let rt = Runtime::new();
    let sig = rt
        .declarer("Config")
        .named([
            ("limits", ParamSpec::new().isa("HashRef[Int]")),
            ("label", ParamSpec::new().isa("Maybe[Str]")),
        ])
        .unwrap();

    let ok = sig.verify_arguments(&[
        Value::str("limits"),
        Value::hash([("cpu", Value::Int(2))]),
        Value::str("label"),
        Value::Undef,
    ]);
    assert!(ok.is_ok());

    let err = sig
        .verify_arguments(&[Value::str("limits"), Value::hash([("cpu", Value::str("2"))])])
        .unwrap_err();
    assert!(matches!(
        err,
        CallError::TypeConstraintViolation { ref constraint, .. } if constraint == "HashRef[Int]"
    ));
}

#[test]
fn test_union() {
    let rt = Runtime::new();
    let sig = rt
        .declarer("Calc")
        .positional([ParamSpec::new().isa("Int|ArrayRef[Int]").required()])
        .unwrap();

    assert!(sig.verify_arguments(&[Value::Int(1)]).is_ok());
    assert!(sig.verify_arguments(&[Value::array([Value::Int(1)])]).is_ok());
    assert!(sig.verify_arguments(&[Value::str("1")]).is_err());
    assert_eq!(sig.to_string(), "(Int|ArrayRef[Int]!)");
}

#[test]
fn test_unknown_inner_type() {
    let rt = Runtime::new();
    let err = rt
        .declarer("Calc")
        .positional([ParamSpec::new().isa("ArrayRef[Widget]")])
        .unwrap_err();
    assert_eq!(
        err,
        DeclareError::UnknownTypeConstraint {
            name: "ArrayRef[Widget]".to_string(),
        }
    );
}

// ===== User-defined types =====

#[test]
fn test_subtype_checks_parent_first() {
    let rt = Runtime::new();
    rt.types()
        .define(
            TypeDef::new("PositiveInt")
                .parent("Int")
                .check(|v| v.as_int().is_some_and(|i| i > 0)),
        )
        .unwrap();
    let sig = rt
        .declarer("Calc")
        .positional([ParamSpec::new().isa("PositiveInt")])
        .unwrap();

    assert!(sig.verify_arguments(&[Value::Int(3)]).is_ok());
    assert!(sig.verify_arguments(&[Value::Int(-3)]).is_err());
    assert!(sig.verify_arguments(&[Value::Num(3.5)]).is_err());

    assert!(matches!(
        rt.types().define(TypeDef::new("PositiveInt")),
        Err(DeclareError::DuplicateType { .. })
    ));
    assert!(matches!(
        rt.types().define(TypeDef::new("Tiny").parent("Small")),
        Err(DeclareError::UnknownTypeConstraint { .. })
    ));
}
