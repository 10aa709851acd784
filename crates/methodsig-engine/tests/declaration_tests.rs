//! Declaration Tests
//!
//! Tests for the declaration API running against the reference runtime:
//! - Registration on the class table and inherited dispatch
//! - Per-class default attribute hooks
//! - Builtin and custom metaclasses
//! - Anonymous wrappers
//!
//! # Running Tests
//! ```bash
//! cargo test --test declaration_tests
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use methodsig_engine::{
    wrap_with_signature, body, Method, MethodDeclaration, MethodParts, MethodRef, MethodWrapper,
    ParamSpec, Runtime, TRACED_METACLASS,
};
use methodsig_sdk::{CallError, CallResult, DeclareError, Value};
use pretty_assertions::assert_eq;

fn hello(rt: &Runtime, class: &str) -> MethodDeclaration {
    let sig = rt
        .declarer(class)
        .named([("who", ParamSpec::new().isa("Str").required())])
        .unwrap();
    MethodDeclaration::new("hello").signature(sig).body(|_, args| {
        let who = args.get("who").and_then(Value::as_str).unwrap_or_default();
        Ok(Value::from(format!("Hello, {}", who)))
    })
}

// ===== Registration =====

#[test]
fn test_method_registered_on_class() {
    let rt = Runtime::new();
    let method = rt.declarer("Greeter").method(hello(&rt, "Greeter")).unwrap();

    let found = rt.classes().find_method("Greeter", "hello").unwrap();
    assert!(Arc::ptr_eq(&method, &found));
    assert_eq!(rt.classes().methods("Greeter").len(), 1);
    assert_eq!(method.signature().to_string(), "(who: Str!)");
}

#[test]
fn test_redeclare_replaces() {
    let rt = Runtime::new();
    let decl = rt.declarer("Greeter");
    decl.method(hello(&rt, "Greeter")).unwrap();

    let sig = decl.positional([]).unwrap();
    decl.method(MethodDeclaration::new("hello").signature(sig).body(|_, _| Ok(Value::str("replaced"))))
        .unwrap();

    assert_eq!(rt.classes().methods("Greeter").len(), 1);
    assert_eq!(
        rt.call(&Value::str("Greeter"), "hello", &[]).unwrap(),
        Value::str("replaced")
    );
}

#[test]
fn test_inherited_dispatch() {
    let rt = Runtime::new();
    rt.declarer("Base").method(hello(&rt, "Base")).unwrap();
    rt.classes().extends("Derived", "Base").unwrap();

    let obj = rt.instantiate("Derived", Default::default()).unwrap();
    let out = rt
        .call(&obj, "hello", &[Value::str("who"), Value::str("world")])
        .unwrap();
    assert_eq!(out, Value::str("Hello, world"));

    let err = rt.call(&obj, "goodbye", &[]).unwrap_err();
    assert_eq!(
        err,
        CallError::NoSuchMethod {
            class: "Derived".to_string(),
            method: "goodbye".to_string(),
        }
    );
}

#[test]
fn test_receiver_passed_to_body() {
    let rt = Runtime::new();
    rt.classes().define_class("Point");
    let decl = rt.declarer("Point");
    let sig = decl.positional([]).unwrap();
    decl.method(MethodDeclaration::new("x").signature(sig).body(|receiver, _| {
        Ok(receiver
            .as_object()
            .and_then(|obj| obj.get("x"))
            .unwrap_or_default())
    }))
    .unwrap();

    let point = rt
        .instantiate("Point", [("x".to_string(), Value::Int(3))].into_iter().collect())
        .unwrap();
    assert_eq!(rt.call(&point, "x", &[]).unwrap(), Value::Int(3));
}

// ===== Default attributes =====

#[test]
fn test_hook_supplies_defaults() {
    let rt = Runtime::new();
    rt.classes().set_method_attributes_hook("Greeter", |name| {
        Value::hash([("metaclass", Value::str("traced")), ("doc", Value::from(format!("{} method", name)))])
    });

    let method = rt.declarer("Greeter").method(hello(&rt, "Greeter")).unwrap();
    assert_eq!(method.attributes()["metaclass"], Value::str(TRACED_METACLASS));
    assert_eq!(method.attributes()["doc"], Value::str("hello method"));
}

#[test]
fn test_hook_undef_means_no_defaults() {
    let rt = Runtime::new();
    rt.classes().set_method_attributes_hook("Greeter", |_| Value::Undef);

    let method = rt.declarer("Greeter").method(hello(&rt, "Greeter")).unwrap();
    assert!(method.attributes().is_empty());
}

#[test]
fn test_hook_bad_shape() {
    let rt = Runtime::new();
    rt.classes()
        .set_method_attributes_hook("Greeter", |_| Value::array([Value::str("metaclass")]));

    let err = rt.declarer("Greeter").method(hello(&rt, "Greeter")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "default_method_attributes of 'Greeter' returned ArrayRef for 'hello', expected a hash"
    );
    assert!(rt.classes().find_method("Greeter", "hello").is_none());
}

#[test]
fn test_hook_is_per_class() {
    let rt = Runtime::new();
    rt.classes()
        .set_method_attributes_hook("Greeter", |_| Value::hash([("metaclass", Value::str("Nope"))]));

    assert!(matches!(
        rt.declarer("Greeter").method(hello(&rt, "Greeter")),
        Err(DeclareError::UnknownMetaclass { .. })
    ));
    assert!(rt.declarer("Other").method(hello(&rt, "Other")).is_ok());
}

#[test]
fn test_hook_inherited_from_parent() {
    let rt = Runtime::new();
    rt.classes().define_class("Base");
    rt.classes()
        .set_method_attributes_hook("Base", |_| Value::hash([("metaclass", Value::str("traced"))]));
    rt.classes().extends("Child", "Base").unwrap();

    let method = rt.declarer("Child").method(hello(&rt, "Child")).unwrap();
    assert_eq!(
        method.attributes().get("metaclass").and_then(Value::as_str),
        Some("traced")
    );
    assert!(format!("{:?}", method).starts_with("TracedMethod"));
}

#[test]
fn test_nearest_hook_wins() {
    let rt = Runtime::new();
    rt.classes()
        .set_method_attributes_hook("Base", |_| Value::hash([("origin", Value::str("base"))]));
    rt.classes().extends("Child", "Base").unwrap();
    rt.classes()
        .set_method_attributes_hook("Child", |_| Value::hash([("origin", Value::str("child"))]));

    let method = rt.declarer("Child").method(hello(&rt, "Child")).unwrap();
    assert_eq!(method.attributes()["origin"], Value::str("child"));
    let method = rt.declarer("Base").method(hello(&rt, "Base")).unwrap();
    assert_eq!(method.attributes()["origin"], Value::str("base"));
}

// ===== Metaclasses =====

#[test]
fn test_traced_metaclass_behaves_like_standard() {
    let rt = Runtime::new();
    let decl = rt.declarer("Greeter");
    let method = decl
        .method(hello(&rt, "Greeter").attributes(decl.attr(
            [("metaclass".to_string(), Value::str("traced"))].into_iter().collect(),
        )))
        .unwrap();
    assert!(format!("{:?}", method).starts_with("TracedMethod"));

    assert_eq!(
        method
            .call(&Value::Undef, &[Value::str("who"), Value::str("you")])
            .unwrap(),
        Value::str("Hello, you")
    );
    assert!(matches!(
        method.call(&Value::Undef, &[]),
        Err(CallError::MissingRequiredParameter { .. })
    ));
}

/// Counts calls, then defers to the standard wrapper.
#[derive(Debug)]
struct CountingMethod {
    inner: MethodWrapper,
    calls: Arc<AtomicUsize>,
}

impl Method for CountingMethod {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn class(&self) -> &str {
        self.inner.class()
    }

    fn signature(&self) -> &methodsig_engine::AnySignature {
        self.inner.signature()
    }

    fn attributes(&self) -> &methodsig_engine::Attributes {
        self.inner.attributes()
    }

    fn call(&self, receiver: &Value, args: &[Value]) -> CallResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.call(receiver, args)
    }
}

#[test]
fn test_custom_metaclass() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut rt = Runtime::new();
    let counter = Arc::clone(&calls);
    rt.metaclasses_mut().register("counting", move |parts: MethodParts| {
        Arc::new(CountingMethod {
            inner: MethodWrapper::new(parts),
            calls: Arc::clone(&counter),
        }) as MethodRef
    });
    assert_eq!(rt.metaclasses().names(), ["counting", "standard", "traced"]);

    rt.declarer("Greeter")
        .method(hello(&rt, "Greeter").attributes(Value::hash([("metaclass", Value::str("counting"))])))
        .unwrap();

    let args = [Value::str("who"), Value::str("x")];
    rt.call(&Value::str("Greeter"), "hello", &args).unwrap();
    let _ = rt.call(&Value::str("Greeter"), "hello", &[]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_metaclass_must_be_string() {
    let rt = Runtime::new();
    let err = rt
        .declarer("Greeter")
        .method(hello(&rt, "Greeter").attributes(Value::hash([("metaclass", Value::Int(1))])))
        .unwrap_err();
    assert!(matches!(err, DeclareError::InvalidDeclarationArgument { .. }));
}

// ===== Anonymous wrappers =====

#[test]
fn test_wrap_with_signature() {
    let rt = Runtime::new();
    let sig = rt
        .declarer("unused")
        .positional([ParamSpec::new().isa("Int").required(), ParamSpec::new().isa("Int").default_value(1)])
        .unwrap();
    let add = wrap_with_signature(
        sig,
        body(|_, args| {
            let sum: i64 = args.positional().iter().filter_map(Value::as_int).sum();
            Ok(Value::Int(sum))
        }),
    );

    assert_eq!(add.name(), "__ANON__");
    assert_eq!(add.class(), "main");
    assert_eq!(add.call(&Value::Undef, &[Value::Int(41)]).unwrap(), Value::Int(42));
    assert_eq!(
        add.call(&Value::Undef, &[Value::Int(2), Value::Int(3)]).unwrap(),
        Value::Int(5)
    );
    assert!(add.call(&Value::Undef, &[Value::str("x")]).is_err());

    // Not registered anywhere
    assert!(rt.classes().find_method("main", "__ANON__").is_none());
}
