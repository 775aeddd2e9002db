use confit::{
    ConfigClass, ConfigError, FieldSpec, FieldValue, NO_DEFAULT, coerce, json, kwargs,
};

fn server_class() -> ConfigClass {
    ConfigClass::builder("ServerConfig")
        .set("host", "localhost")
        .typed("port", 8080, coerce::integer())
        .field("token", FieldSpec::typed(NO_DEFAULT, coerce::string()))
        .build()
}

fn server() -> confit::ConfigObject {
    server_class()
        .instantiate(kwargs! { token: "abc" })
        .unwrap()
}

#[test]
fn update_assigns_known_fields() {
    confit_testhelpers::setup();

    let mut conf = server();
    conf.update(kwargs! { host: "example.com", port: "9090" }).unwrap();
    assert_eq!(conf["host"], "example.com");
    assert_eq!(conf["port"], 9090);
}

#[test]
fn update_applies_pairs_in_order_until_the_first_unknown_name() {
    confit_testhelpers::setup();

    let mut conf = server();
    let err = conf
        .update(kwargs! { host: "example.com", bogus: 1, port: 1 })
        .unwrap_err();
    assert!(matches!(err, ConfigError::NoSuchField { ref field, .. } if field == "bogus"));

    // Pairs before the failing one stay applied; later ones were never
    // reached.
    assert_eq!(conf["host"], "example.com");
    assert_eq!(conf["port"], 8080);
}

#[test]
fn assigning_unset_after_construction_fails_and_preserves_the_value() {
    confit_testhelpers::setup();

    let mut conf = server();
    let err = conf.set("port", FieldValue::Unset).unwrap_err();
    assert_eq!(
        err,
        ConfigError::UnsetAfterInit {
            class: "ServerConfig".to_string(),
            field: "port".to_string(),
        }
    );
    assert_eq!(conf["port"], 8080);
}

#[test]
fn failed_coercion_preserves_the_prior_value() {
    confit_testhelpers::setup();

    let mut conf = server();
    let err = conf.set("port", "not a number").unwrap_err();
    assert!(matches!(err, ConfigError::Coerce(_)));
    assert_eq!(conf["port"], 8080);
}

#[test]
fn allow_none_controls_null_handling() {
    confit_testhelpers::setup();

    let class = ConfigClass::builder("Nullable")
        .typed("relaxed", 1, coerce::integer())
        .field(
            "strict",
            FieldSpec::typed(FieldValue::of(1), coerce::integer()).allow_none(false),
        )
        .build();

    let mut obj = class.instantiate(kwargs! {}).unwrap();

    // allow_none (the default): null bypasses the coercer.
    obj.set("relaxed", json!(null)).unwrap();
    assert_eq!(obj["relaxed"], json!(null));

    // allow_none(false): the coercer sees null and rejects it.
    let err = obj.set("strict", json!(null)).unwrap_err();
    match err {
        ConfigError::Coerce(coerce_err) => assert_eq!(coerce_err.coercer, "integer"),
        other => panic!("expected Coerce, got {other}"),
    }
    assert_eq!(obj["strict"], 1);
}

#[test]
fn typed_assignment_coerces_strings() {
    confit_testhelpers::setup();

    let mut conf = server();
    conf.set("port", "5").unwrap();
    assert_eq!(conf["port"], 5);
}

#[test]
fn to_dict_round_trips() {
    confit_testhelpers::setup();

    let class = server_class();
    let a = class
        .instantiate(kwargs! { host: "example.com", port: 42, token: "t" })
        .unwrap();

    let kwargs: confit::Kwargs = a
        .to_dict()
        .into_iter()
        .map(|(name, value)| (name, FieldValue::Set(value)))
        .collect();
    let b = class.instantiate(kwargs).unwrap();
    assert!(a == b);
}

#[test]
fn to_dict_keeps_declaration_order() {
    confit_testhelpers::setup();

    let conf = server();
    let dict = conf.to_dict();
    let keys: Vec<&str> = dict.keys().map(String::as_str).collect();
    assert_eq!(keys, ["host", "port", "token"]);
}

#[test]
fn iteration_is_restartable_and_ordered() {
    confit_testhelpers::setup();

    let conf = server();

    let first: Vec<&str> = conf.keys().collect();
    let second: Vec<&str> = conf.keys().collect();
    assert_eq!(first, second);
    assert_eq!(first, ["host", "port", "token"]);

    let items: Vec<(&str, &FieldValue)> = conf.items().collect();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].0, "host");
    assert_eq!(*items[1].1, json!(8080));

    let via_ref: Vec<&str> = (&conf).into_iter().map(|(name, _)| name).collect();
    assert_eq!(via_ref, first);
}

#[test]
fn defaults_are_independent_of_current_state() {
    confit_testhelpers::setup();

    let mut conf = server();
    conf.set("host", "elsewhere").unwrap();

    let defaults: Vec<(&str, &FieldValue)> = conf.defaults().collect();
    assert_eq!(defaults[0], ("host", &FieldValue::of("localhost")));
    assert_eq!(defaults[2], ("token", &FieldValue::Unset));

    assert_eq!(*conf.default("host").unwrap(), json!("localhost"));
    assert!(conf.default("token").unwrap().is_unset());

    let err = conf.default("bogus").unwrap_err();
    assert!(matches!(err, ConfigError::NoSuchField { ref field, .. } if field == "bogus"));
}

#[test]
fn indexed_access_uses_the_lookup_error_kind() {
    confit_testhelpers::setup();

    let mut conf = server();

    assert_eq!(*conf.get_item("host").unwrap(), json!("localhost"));
    conf.set_item("host", "elsewhere").unwrap();
    assert_eq!(conf["host"], "elsewhere");

    let err = conf.get_item("bogus").unwrap_err();
    assert_eq!(
        err,
        ConfigError::NoSuchKey {
            key: "bogus".to_string(),
        }
    );
    let err = conf.set_item("bogus", 1).unwrap_err();
    assert_eq!(
        err,
        ConfigError::NoSuchKey {
            key: "bogus".to_string(),
        }
    );

    // Attribute-style access reports the field-error kind instead.
    let err = conf.get("bogus").unwrap_err();
    assert!(matches!(err, ConfigError::NoSuchField { .. }));
}

#[test]
#[should_panic(expected = "no such key")]
fn indexing_an_unknown_key_panics() {
    confit_testhelpers::setup();

    let conf = server();
    let _ = &conf["bogus"];
}

#[test]
fn display_is_deterministic_and_ordered() {
    confit_testhelpers::setup();

    let conf = server_class()
        .instantiate(kwargs! { port: "9090", token: "abc" })
        .unwrap();
    assert_eq!(
        conf.to_string(),
        r#"<ServerConfig: {host: "localhost", port: 9090, token: "abc"}>"#
    );
}

#[test]
fn serializes_as_an_ordered_map() {
    confit_testhelpers::setup();

    let conf = server_class()
        .instantiate(kwargs! { port: "9090", token: "abc" })
        .unwrap();
    assert_eq!(
        serde_json::to_string(&conf).unwrap(),
        r#"{"host":"localhost","port":9090,"token":"abc"}"#
    );
}
