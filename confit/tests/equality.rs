use confit::{ConfigClass, json, kwargs};

fn point_class() -> ConfigClass {
    ConfigClass::builder("Point")
        .set("x", 0)
        .set("y", 0)
        .method("magnitude2", |obj, _args| {
            let x = obj.get("x").unwrap().as_i64().unwrap();
            let y = obj.get("y").unwrap().as_i64().unwrap();
            json!(x * x + y * y)
        })
        .build()
}

#[test]
fn same_class_same_values_are_equal() {
    confit_testhelpers::setup();

    let class = point_class();
    let a = class.instantiate(kwargs! { x: 1, y: 2 }).unwrap();
    let b = class.instantiate(kwargs! { x: 1, y: 2 }).unwrap();
    let c = class.instantiate(kwargs! { x: 1, y: 3 }).unwrap();

    assert!(a == b);
    assert!(a != c);
}

#[test]
fn structurally_identical_but_unrelated_classes_are_never_equal() {
    confit_testhelpers::setup();

    let a = point_class().instantiate(kwargs! {}).unwrap();
    // A separately built class is a distinct identity even with the same
    // body.
    let b = point_class().instantiate(kwargs! {}).unwrap();

    assert!(a != b);
}

#[test]
fn subclass_compares_on_the_base_field_set() {
    confit_testhelpers::setup();

    let base = point_class();
    let sub = ConfigClass::builder("Point3")
        .set("x", 0)
        .set("y", 0)
        .set("z", 0)
        .extends(base.clone())
        .build();

    let flat = base.instantiate(kwargs! { x: 1, y: 2 }).unwrap();
    let deep = sub.instantiate(kwargs! { x: 1, y: 2, z: 9 }).unwrap();

    // Comparison runs over the ancestor class's fields; z is ignored.
    assert!(flat == deep);
    assert!(deep == flat);

    let moved = sub.instantiate(kwargs! { x: 5, y: 2, z: 9 }).unwrap();
    assert!(flat != moved);
}

#[test]
fn sibling_subclasses_are_not_equal_to_each_other() {
    confit_testhelpers::setup();

    let base = point_class();
    let left = ConfigClass::builder("Left")
        .set("x", 0)
        .set("y", 0)
        .extends(base.clone())
        .build();
    let right = ConfigClass::builder("Right")
        .set("x", 0)
        .set("y", 0)
        .extends(base)
        .build();

    let a = left.instantiate(kwargs! {}).unwrap();
    let b = right.instantiate(kwargs! {}).unwrap();
    // Neither extends the other, so the shared base does not help.
    assert!(a != b);
}

#[test]
fn methods_resolve_through_the_base_chain() {
    confit_testhelpers::setup();

    let base = point_class();
    let sub = ConfigClass::builder("Point3")
        .set("x", 3)
        .set("y", 4)
        .set("z", 0)
        .extends(base.clone())
        .build();

    assert!(sub.is_subclass_of(&base));
    assert!(!base.is_subclass_of(&sub));

    let obj = sub.instantiate(kwargs! {}).unwrap();
    assert_eq!(obj.call("magnitude2", &[]).unwrap(), json!(25));
}

#[test]
fn overriding_a_method_shadows_the_base_definition() {
    confit_testhelpers::setup();

    let base = point_class();
    let sub = ConfigClass::builder("Loud")
        .set("x", 1)
        .set("y", 1)
        .extends(base)
        .method("magnitude2", |_obj, _args| json!(-1))
        .build();

    let obj = sub.instantiate(kwargs! {}).unwrap();
    assert_eq!(obj.call("magnitude2", &[]).unwrap(), json!(-1));
}
