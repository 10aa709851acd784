//! Concurrency Tests
//!
//! One declared method shared by many threads:
//! - Each call normalizes its own arguments
//! - A failing call leaves other threads' results intact
//! - Dispatch through the class table from several threads
//!
//! # Running Tests
//! ```bash
//! cargo test --test concurrency_tests
//! ```

use std::sync::Arc;
use std::thread;

use methodsig_engine::{MethodDeclaration, MethodRef, ParamSpec, Runtime};
use methodsig_sdk::{CallError, CallResult, ParamLabel, Value};
use pretty_assertions::assert_eq;

const WORKERS: usize = 8;
const CALLS: usize = 200;

/// Runtime with `scale(n: Int coerce!, unit: Str = "m")` declared on `Ruler`,
/// returning `[n, unit]`.
fn ruler() -> (Runtime, MethodRef) {
    let rt = Runtime::new();
    rt.types()
        .add_coercion("Int", "Str", |v| {
            v.as_str()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .map(Value::Int)
                .unwrap_or_default()
        })
        .unwrap();

    let decl = rt.declarer("Ruler");
    let sig = decl
        .named([
            ("n", ParamSpec::new().isa("Int").coerce().required()),
            ("unit", ParamSpec::new().isa("Str").default_value("m")),
        ])
        .unwrap();
    let method = decl
        .method(MethodDeclaration::new("scale").signature(sig).body(|_, args| {
            Ok(Value::array([
                args.get("n").cloned().unwrap_or_default(),
                args.get("unit").cloned().unwrap_or_default(),
            ]))
        }))
        .unwrap();
    (rt, method)
}

fn scale(method: &MethodRef, n: &str, unit: Option<&str>) -> CallResult<Value> {
    let mut args = vec![Value::str("n"), Value::str(n)];
    if let Some(unit) = unit {
        args.push(Value::str("unit"));
        args.push(Value::str(unit));
    }
    method.call(&Value::Undef, &args)
}

// ===== Shared method =====

#[test]
fn test_each_thread_gets_own_result() {
    let (_rt, method) = ruler();

    thread::scope(|s| {
        for worker in 0..WORKERS {
            let method = Arc::clone(&method);
            s.spawn(move || {
                let unit = format!("u{}", worker);
                for i in 0..CALLS {
                    let n = (worker * CALLS + i) as i64;
                    let out = scale(&method, &format!(" {} ", n), Some(&unit)).unwrap();
                    assert_eq!(out, Value::array([Value::Int(n), Value::str(&unit)]));
                }
            });
        }
    });
}

#[test]
fn test_failures_do_not_leak_across_threads() {
    let (_rt, method) = ruler();

    thread::scope(|s| {
        for worker in 0..WORKERS {
            let method = Arc::clone(&method);
            s.spawn(move || {
                for i in 0..CALLS {
                    if worker % 2 == 0 {
                        let bad = format!("bad-{}-{}", worker, i);
                        let err = scale(&method, &bad, None).unwrap_err();
                        assert_eq!(
                            err,
                            CallError::CoercionFailure {
                                param: ParamLabel::name("n"),
                                constraint: "Int".to_string(),
                                value: Value::str(&bad),
                            }
                        );
                    } else {
                        let n = i as i64;
                        let out = scale(&method, &n.to_string(), None).unwrap();
                        assert_eq!(out, Value::array([Value::Int(n), Value::str("m")]));
                    }
                }
            });
        }
    });

    // Still usable afterwards
    assert_eq!(
        scale(&method, "3", Some("cm")).unwrap(),
        Value::array([Value::Int(3), Value::str("cm")])
    );
}

// ===== Dispatch =====

#[test]
fn test_concurrent_dispatch_through_runtime() {
    let (rt, _method) = ruler();
    rt.classes().extends("Tape", "Ruler").unwrap();
    let rt = &rt;

    thread::scope(|s| {
        for worker in 0..WORKERS {
            s.spawn(move || {
                let class = if worker % 2 == 0 { "Ruler" } else { "Tape" };
                for i in 0..CALLS {
                    let n = i as i64;
                    let out = rt
                        .call(&Value::str(class), "scale", &[Value::str("n"), Value::Int(n)])
                        .unwrap();
                    assert_eq!(out, Value::array([Value::Int(n), Value::str("m")]));
                }
                let err = rt.call(&Value::str(class), "scale", &[]).unwrap_err();
                assert!(matches!(err, CallError::MissingRequiredParameter { .. }));
            });
        }
    });
}
