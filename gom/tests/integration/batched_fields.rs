use std::collections::HashMap;

use futures::future::join_all;
use gom::Arguments;
use gom::Arity;
use gom::BatchResolver;
use gom::BatchResults;
use gom::BoxError;
use gom::FetchError;
use gom::FieldWirings;
use gom::FieldWiringsBuilder;
use gom::Resolver;
use gom::WiringError;
use gom::arguments;
use gom::json_ext::Value;
use gom::json_ext::json;
use indexmap::IndexSet;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use test_log::test;

use super::common::CallLog;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct MyType {
    name: String,
}

impl MyType {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

fn with_my_types(names: &'static [&'static str]) -> FieldWiringsBuilder<MyType, Value> {
    FieldWirings::builder().resolver(
        "Query",
        "myTypes",
        Resolver::no_args(move || async move { Ok::<_, BoxError>(json!(names)) }),
    )
}

/// Resolve `{ myTypes { name(arguments) } }` the way the host does: the root field first, then
/// every `name` in one dispatch window.
async fn my_type_names(
    wirings: &FieldWirings<MyType, Value>,
    arguments: Arguments,
) -> Vec<Result<Value, FetchError>> {
    let my_types = wirings
        .get("Query", "myTypes")
        .unwrap()
        .fetch(None, Arguments::default())
        .await
        .unwrap();
    let name = wirings.get("MyType", "name").unwrap();
    let fetches: Vec<_> = my_types
        .as_array()
        .unwrap()
        .iter()
        .map(|value| MyType::new(value.as_str().unwrap()))
        .map(|my_type| name.fetch(Some(my_type), arguments.clone()))
        .collect();
    wirings.dispatch().await;
    join_all(fetches).await
}

fn suffixed(my_types: IndexSet<MyType>, suffix: &str) -> BatchResults<MyType, Value> {
    my_types
        .into_iter()
        .map(|my_type| {
            let name = json!(format!("{}{suffix}", my_type.name));
            (my_type, name)
        })
        .collect()
}

#[test(tokio::test)]
async fn with_sources() {
    let wirings = with_my_types(&["foo", "bar"])
        .batched(
            "MyType",
            "name",
            BatchResolver::sources(|my_types: IndexSet<MyType>| async move {
                Ok::<_, BoxError>(suffixed(my_types, "bar"))
            }),
        )
        .build()
        .unwrap();

    let names: Vec<_> = my_type_names(&wirings, arguments!())
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(names, vec![json!("foobar"), json!("barbar")]);
}

#[test(tokio::test)]
async fn results_follow_source_order() {
    let calls = CallLog::default();
    let wirings = with_my_types(&["bar", "foo"])
        .batched("MyType", "name", {
            let calls = calls.clone();
            BatchResolver::sources(move |my_types: IndexSet<MyType>| {
                calls.record(my_types.iter().cloned(), &Arguments::default());
                async move { Ok::<_, BoxError>(suffixed(my_types, "bar")) }
            })
        })
        .build()
        .unwrap();

    let names: Vec<_> = my_type_names(&wirings, arguments!())
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(names, vec![json!("barbar"), json!("foobar")]);
    assert_eq!(
        calls.calls(),
        vec![(vec![MyType::new("bar"), MyType::new("foo")], arguments!())]
    );
}

#[test(tokio::test)]
async fn with_sources_and_arguments() {
    let calls = CallLog::default();
    let wirings = with_my_types(&["foo", "bar"])
        .batched("MyType", "name", {
            let calls = calls.clone();
            BatchResolver::sources_and_arguments(
                move |my_types: IndexSet<MyType>, arguments: Arguments| {
                    calls.record(my_types.iter().cloned(), &arguments);
                    let suffix = arguments
                        .get("suffix")
                        .and_then(|value| value.as_str())
                        .unwrap_or_default()
                        .to_string();
                    async move { Ok::<_, BoxError>(suffixed(my_types, &suffix)) }
                },
            )
        })
        .build()
        .unwrap();

    let names: Vec<_> = my_type_names(&wirings, arguments!({ "suffix": "bar" }))
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(names, vec![json!("foobar"), json!("barbar")]);
    assert_eq!(calls.len(), 1);
    assert_eq!(
        wirings.get("MyType", "name").unwrap().arity(),
        Arity::SourceAndArguments
    );
}

#[test]
fn without_sources_nor_arguments_is_rejected() {
    let error = with_my_types(&["foo", "bar"])
        .batched(
            "MyType",
            "name",
            BatchResolver::no_args(|| async {
                Ok::<BatchResults<MyType, Value>, BoxError>(HashMap::new())
            }),
        )
        .build()
        .err()
        .unwrap();

    assert_eq!(
        error,
        WiringError::InvalidBatchedShape {
            field: "MyType.name".to_string(),
            arity: Arity::NoArgs,
        }
    );
    assert_snapshot!(
        error,
        @"batched resolver for 'MyType.name' must accept a set of sources, but takes no parameters"
    );
}

#[test]
fn with_arguments_only_is_rejected() {
    let error = with_my_types(&["foo", "bar"])
        .batched(
            "MyType",
            "name",
            BatchResolver::arguments(|_: Arguments| async {
                Ok::<BatchResults<MyType, Value>, BoxError>(HashMap::new())
            }),
        )
        .build()
        .err()
        .unwrap();

    assert!(matches!(
        error,
        WiringError::InvalidBatchedShape {
            arity: Arity::ArgumentsOnly,
            ..
        }
    ));
}

#[test(tokio::test)]
async fn failing_argument_set_does_not_affect_the_others() {
    let wirings = with_my_types(&["foo", "bar"])
        .batched(
            "MyType",
            "name",
            BatchResolver::sources_and_arguments(
                |my_types: IndexSet<MyType>, arguments: Arguments| {
                    let suffix = arguments
                        .get("suffix")
                        .and_then(|value| value.as_str())
                        .map(str::to_string);
                    async move {
                        match suffix {
                            Some(suffix) => Ok(suffixed(my_types, &suffix)),
                            None => Err::<_, BoxError>("a suffix is required".into()),
                        }
                    }
                },
            ),
        )
        .build()
        .unwrap();
    let name = wirings.get("MyType", "name").unwrap();

    let failing: Vec<_> = ["foo", "bar"]
        .into_iter()
        .map(|source| name.fetch(Some(MyType::new(source)), arguments!()))
        .collect();
    let succeeding = name.fetch(Some(MyType::new("foo")), arguments!({ "suffix": "!" }));
    assert_eq!(wirings.dispatch().await, 3);

    for error in join_all(failing).await {
        assert_eq!(
            error.unwrap_err().to_string(),
            "batched resolver for 'MyType.name' failed: a suffix is required"
        );
    }
    assert_eq!(succeeding.await.unwrap(), json!("foo!"));
}

#[test(tokio::test)]
async fn omitted_source_fails_only_its_callers() {
    let wirings = with_my_types(&["foo", "bar"])
        .batched(
            "MyType",
            "name",
            BatchResolver::sources(|my_types: IndexSet<MyType>| async move {
                let mut names = suffixed(my_types, "bar");
                names.retain(|my_type, _| my_type.name != "bar");
                Ok::<_, BoxError>(names)
            }),
        )
        .build()
        .unwrap();

    let names = my_type_names(&wirings, arguments!()).await;

    assert_eq!(names[0], Ok(json!("foobar")));
    let error = names[1].clone().unwrap_err();
    assert_eq!(error.extension_code(), "BATCH_MISSING_RESULT");
    assert_snapshot!(
        error,
        @r#"batched resolver for 'MyType.name' returned no result for MyType { name: "bar" }"#
    );
}

#[test(tokio::test)]
async fn unrequested_results_are_ignored() {
    let wirings = with_my_types(&["foo"])
        .batched(
            "MyType",
            "name",
            BatchResolver::sources(|my_types: IndexSet<MyType>| async move {
                let mut names = suffixed(my_types, "bar");
                names.insert(MyType::new("stranger"), json!("strangerbar"));
                Ok::<_, BoxError>(names)
            }),
        )
        .build()
        .unwrap();

    let names = my_type_names(&wirings, arguments!()).await;

    assert_eq!(names, vec![Ok(json!("foobar"))]);
}
