//! Process-wide registry tests

use skein::foundation::{ClassRecipe, Instance, Properties, Recipe, Value};

#[test]
fn global_registry_has_builtins() {
    let registry = skein::global_registry();
    for name in ["Array", "Set", "Map", "Date", "Object"] {
        assert!(registry.contains(name));
    }
}

#[test]
fn registered_class_members_survive_decode() {
    skein::register_class(ClassRecipe::new("GlobalWidget").with_members(|| {
        Properties::from([("kind".to_string(), Value::from("widget"))])
    }));
    let text = concat!(
        r#"{"$type":"GlobalWidget","$id":"GlobalWidget_0","#,
        r#""$props":{"kind":"other","size":3}}"#,
    );
    let value = skein::deserialize(text).unwrap();

    assert_eq!(value.type_name(), "GlobalWidget");
    assert_eq!(value.property("kind"), Some(Value::from("widget")));
    assert_eq!(value.property("size"), Some(Value::Int(3)));
}

#[test]
fn register_under_alias() {
    skein::register("Legacy", Recipe::Record);
    assert!(skein::global_registry().contains("Legacy"));

    let value =
        skein::deserialize(r#"{"$type":"Legacy","$id":"Legacy_0","$props":{"a":1}}"#).unwrap();
    assert_eq!(value.property("a"), Some(Value::Int(1)));
}

#[test]
fn managed_marker_is_written() {
    skein::register_class(ClassRecipe::new("Managed"));
    let value = Value::instance(Instance::new("Managed").with_managed(true));
    let text = skein::serialize(&value).unwrap();
    assert!(text.contains(r#""$managed":true"#));
}
