//! Integration tests for ClassRegistry
//!
//! Tests built-in kinds, class registration, and kind resolution.

use skein_foundation::{ClassRecipe, ClassRegistry, Instance, Properties, Recipe, Value};

#[test]
fn builtins_are_registered() {
    let registry = ClassRegistry::new();
    for name in ["Array", "Set", "Map", "Date", "Object"] {
        assert!(registry.contains(name), "missing {name}");
    }
    assert_eq!(registry.len(), 5);
}

#[test]
fn kind_of_builtins() {
    let registry = ClassRegistry::new();
    let (name, recipe) = registry.kind_of(&Value::set([])).unwrap();
    assert_eq!(name, "Set");
    assert!(matches!(recipe, Recipe::Set));
    assert!(registry.kind_of(&Value::Int(1)).is_none());
}

#[test]
fn kind_of_unregistered_class_is_none() {
    let registry = ClassRegistry::new();
    let value = Value::instance(Instance::new("Stranger"));
    assert!(registry.kind_of(&value).is_none());
}

#[test]
fn class_allocation_supplies_members() {
    let mut registry = ClassRegistry::new();
    registry.register_class(ClassRecipe::new("Counter").with_members(|| {
        Properties::from([("count".to_string(), Value::Int(0))])
    }));

    let shell = registry.lookup("Counter").unwrap().allocate();
    assert_eq!(shell.type_name(), "Counter");
    assert_eq!(shell.property("count"), Some(Value::Int(0)));

    // Each allocation is a fresh shell.
    let other = registry.lookup("Counter").unwrap().allocate();
    assert!(!shell.same_identity(&other));
}

#[test]
fn wrapped_class_names_resolve() {
    let mut registry = ClassRegistry::new();
    registry.register_class(ClassRecipe::new("Person"));
    let value = Value::instance(Instance::new("bound Person"));
    let (name, _) = registry.kind_of(&value).unwrap();
    assert_eq!(name, "Person");
}

#[test]
fn reregistering_replaces_entry() {
    let mut registry = ClassRegistry::new();
    registry.register("Thing", Recipe::Record);
    registry.register_class(ClassRecipe::new("Thing"));
    assert_eq!(registry.len(), 6);
    assert!(matches!(registry.lookup("Thing"), Some(Recipe::Class(_))));
}

#[test]
fn mismatched_recipe_does_not_claim_value() {
    let mut registry = ClassRegistry::new();
    registry.register("Array", Recipe::Map);
    assert!(registry.kind_of(&Value::seq([])).is_none());
}
