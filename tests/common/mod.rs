//! Shared fixtures for integration tests

#![allow(dead_code)]

use conftree::{Config, Schema, SchemaRef, Setting, Value};

/// Initialize test logging (safe to call from every test)
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A schema exercising every setting kind, including self-referential
/// nesting through `fallback` and `peers`.
pub fn node_schema() -> Schema {
    let nested = SchemaRef::deferred();
    let schema = Schema::new(vec![
        Setting::text("name").help("Node name."),
        Setting::choice(
            "role",
            vec![("primary", Value::Int(0)), ("replica", Value::Int(1))],
        )
        .help("Role in the cluster."),
        Setting::boolean("alive").help("Node is reachable."),
        Setting::integer("weight").help("Scheduling weight.").default(13_i64),
        Setting::float("load").help("Load average.").default(1.3),
        Setting::text_list("tags")
            .help("Free-form labels.")
            .default(vec!["fast", "cheap"]),
        Setting::integer_list("ports").default(vec![1_i64, 2]),
        Setting::float_list("scores").default(vec![5.4, 3.2, 1.0]),
        Setting::config("fallback", nested.clone()).help("Node to fail over to."),
        Setting::config_list("peers", nested.clone()).help("Known peers."),
    ]);
    nested.bind(&schema);
    schema
}

/// A node config with only its name set
pub fn named_node(schema: &Schema, name: &str) -> Config {
    let mut config = Config::new(schema);
    config.set("name", name).unwrap();
    config
}
