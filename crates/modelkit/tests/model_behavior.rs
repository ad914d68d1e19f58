use modelkit::{
    BoxFuture, MemoryAdapter, Middleware, MiddlewareError, MiddlewareResult, Model, ModelError,
    ModelType, PersistAction, Record,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("modelkit=trace")
        .with_test_writer()
        .try_init();
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

#[test]
fn test_listeners_trigger_in_order() {
    let my_model = ModelType::base().extend("my_model");
    let mut model = Model::new(&my_model);
    let count = Arc::new(Mutex::new(0));

    let first = count.clone();
    let second = count.clone();
    my_model
        .on("test", move |_, _| {
            let mut count = first.lock().unwrap();
            *count += 1;
            assert_eq!(*count, 1);
        })
        .on("test", move |_, _| {
            let mut count = second.lock().unwrap();
            *count += 1;
            assert_eq!(*count, 2);
        });

    model.trigger("test");

    assert_eq!(*count.lock().unwrap(), 2);
}

#[test]
fn test_listeners_only_trigger_on_the_listening_type() {
    let base = ModelType::base();
    let first_type = base.extend("first");
    let second_type = base.extend("second");
    let mut model = Model::new(&first_type);
    let called = Arc::new(Mutex::new(false));

    let flag = called.clone();
    first_type.on("foo", move |_, _| *flag.lock().unwrap() = true);
    second_type.on("foo", |_, _| panic!("listener of a sibling type fired"));

    model.trigger("foo");

    assert!(*called.lock().unwrap());
}

#[test]
fn test_base_listeners_registered_after_extend_do_not_propagate() {
    let base = ModelType::base();
    let derived = base.extend("derived");
    base.on("foo", |_, _| panic!("base listener registered after extend fired"));

    Model::new(&derived).trigger("foo");
}

#[test]
fn test_whitespace_separated_events_trigger_independently() {
    let my_model = ModelType::base().extend("my_model");
    let mut model = Model::new(&my_model);
    let count = Arc::new(Mutex::new(0));

    let counter = count.clone();
    my_model.on("foo bar", move |_, _| *counter.lock().unwrap() += 1);

    model.trigger("foo").trigger("bar");

    assert_eq!(*count.lock().unwrap(), 2);
}

#[test]
fn test_derived_instance_inherits_base_listeners() {
    init_tracing();
    let base = ModelType::base().extend("timestamped");
    base.on("initialize", |model, _| {
        model.set("version", 1);
    });
    let post = base.extend("post");

    let model = Model::new(&post);

    assert_eq!(model.get("version"), Some(json!(1)));
}

#[test]
fn test_changed_flags_example() {
    let model_type = ModelType::base();
    let mut model = Model::new(&model_type);

    model.set_many(record(json!({ "foo": 1 })));

    assert_eq!(model.get("foo"), Some(json!(1)));
    assert!(model.is_attribute_changed("foo"));
    assert!(!model.is_attribute_changed("bar"));
}

#[test]
fn test_named_setter_middleware() {
    let model_type = ModelType::base().extend("user");
    model_type
        .use_middleware(
            "set:tags",
            Middleware::value(|v| match v {
                Value::String(s) => json!(s.split(',').map(str::trim).collect::<Vec<_>>()),
                other => other,
            }),
        )
        .unwrap();

    let model = Model::with_attributes(&model_type, [("tags", json!("a, b"))]);

    assert_eq!(model.get("tags"), Some(json!(["a", "b"])));
}

fn stamp_slug(model: &mut Model) -> BoxFuture<'_, MiddlewareResult> {
    Box::pin(async move {
        let slug = model
            .get("title")
            .and_then(|title| title.as_str().map(|t| t.to_lowercase().replace(' ', "-")))
            .ok_or_else(|| MiddlewareError::failed("title is missing"))?;
        model.set("slug", slug);
        Ok::<(), MiddlewareError>(())
    })
}

#[tokio::test]
async fn test_memory_adapter_round_trip() {
    init_tracing();
    let adapter = MemoryAdapter::new();
    let post_type = ModelType::base().extend("post");
    post_type
        .use_persist(PersistAction::Create, stamp_slug)
        .use_adapter(adapter.clone());

    let mut post = Model::with_attributes(&post_type, [("title", json!("Hello World"))]);
    post.save().unwrap().await.unwrap();

    let identity = post.identity().and_then(Value::as_str).unwrap().to_string();
    let stored = adapter.get(&identity).unwrap();
    assert_eq!(stored.get("slug"), Some(&json!("hello-world")));
    assert!(!post.is_changed());
    assert_eq!(post.to_json().get("id"), Some(&json!(identity)));

    post.set("title", "Renamed");
    post.save().unwrap().await.unwrap();
    assert_eq!(
        adapter.get(&identity).unwrap().get("title"),
        Some(&json!("Renamed"))
    );

    post.delete().unwrap().await.unwrap();
    assert!(adapter.is_empty());
}

#[tokio::test]
async fn test_failed_middleware_skips_adapter_and_events() {
    let adapter = MemoryAdapter::new();
    let post_type = ModelType::base().extend("post");
    let saved = Arc::new(Mutex::new(false));

    let flag = saved.clone();
    post_type
        .on("save", move |_, _| *flag.lock().unwrap() = true)
        .use_persist(PersistAction::Create, stamp_slug)
        .use_adapter(adapter.clone());

    let mut post = Model::with_attributes(&post_type, [("body", json!("no title"))]);
    let err = post.save().unwrap().await.unwrap_err();

    assert_eq!(
        err.middleware_error(),
        Some(&MiddlewareError::failed("title is missing"))
    );
    assert!(adapter.is_empty());
    assert!(!post.is_created());
    assert!(post.is_changed());
    assert!(!*saved.lock().unwrap());
}

#[tokio::test]
async fn test_adapter_update_of_unknown_record_fails() {
    let adapter = MemoryAdapter::new();
    let post_type = ModelType::base().extend("post");
    post_type.use_adapter(adapter);

    let mut post = Model::new(&post_type);
    post.from_db(record(json!({ "_id": "missing", "title": "Ghost" })));
    post.set("title", "Still a ghost");

    let err = post.update().unwrap().await.unwrap_err();

    assert!(matches!(
        err,
        ModelError::Middleware {
            action: PersistAction::Update,
            source: MiddlewareError::NotFound(ref identity),
        } if identity == "missing"
    ));
    assert!(post.is_attribute_changed("title"));
}

fn clear_identity(model: &mut Model) -> BoxFuture<'_, MiddlewareResult> {
    Box::pin(async move {
        model.set("_id", Value::Null);
        Ok::<(), MiddlewareError>(())
    })
}

#[tokio::test]
async fn test_adapter_delete_without_identity_fails() {
    let adapter = MemoryAdapter::new();
    let post_type = ModelType::base().extend("post");
    post_type
        .use_persist(PersistAction::Delete, clear_identity)
        .use_adapter(adapter);

    let mut post = Model::new(&post_type);
    post.from_db(record(json!({ "_id": "abc", "title": "Gone soon" })));

    let err = post.delete().unwrap().await.unwrap_err();

    assert_eq!(err.middleware_error(), Some(&MiddlewareError::MissingIdentity));
}
