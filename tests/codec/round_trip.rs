//! Round-trip tests
//!
//! Serializes graphs and rebuilds them, checking kinds, contents, and
//! sharing topology.

use chrono::{DateTime, Utc};
use skein_codec::{CodecConfig, Decoder, Encoder};
use skein_foundation::{ClassRecipe, ClassRegistry, Instance, Value};

fn round_trip(registry: &ClassRegistry, value: &Value) -> Value {
    let text = Encoder::new(registry).serialize(value).unwrap();
    Decoder::new(registry).deserialize(&text).unwrap()
}

// =============================================================================
// Kinds
// =============================================================================

#[test]
fn set_of_numbers() {
    let registry = ClassRegistry::new();
    let set = Value::set([Value::Int(1), Value::Int(2), Value::Int(3)]);
    let back = round_trip(&registry, &set);

    let members = back.as_set().unwrap().borrow();
    assert_eq!(members.len(), 3);
    for n in 1..=3 {
        assert!(members.contains(&Value::Int(n)));
    }
}

#[test]
fn map_with_composite_keys() {
    let registry = ClassRegistry::new();
    let key = Value::seq([Value::Int(1)]);
    let map = Value::map([(key.clone(), Value::from("one")), (Value::Int(2), key)]);
    let back = round_trip(&registry, &map);

    assert!(map.structurally_eq(&back));
    let entries = back.as_map().unwrap().borrow();
    let (first_key, _) = entries.get_index(0).unwrap();
    let (_, second_value) = entries.get_index(1).unwrap();
    assert!(first_key.same_identity(second_value));
}

#[test]
fn timestamps_keep_their_instant() {
    let registry = ClassRegistry::new();
    for iso in ["2020-01-01T00:00:00Z", "1999-12-31T23:59:59.123456789Z"] {
        let at: DateTime<Utc> = iso.parse().unwrap();
        let back = round_trip(&registry, &Value::timestamp(at));
        assert_eq!(*back.as_timestamp().unwrap().borrow(), at);
    }
}

#[test]
fn registered_instance_keeps_class() {
    let mut registry = ClassRegistry::new();
    registry.register_class(ClassRecipe::new("Person"));
    let person = Value::instance(Instance::new("Person").with_property("name", "Ada"));
    let back = round_trip(&registry, &person);

    assert_eq!(back.type_name(), "Person");
    assert_eq!(back.property("name"), Some(Value::from("Ada")));
}

#[test]
fn unregistered_instance_comes_back_as_record() {
    let registry = ClassRegistry::new();
    let ghost = Value::instance(Instance::new("Ghost").with_property("boo", true));
    let back = round_trip(&registry, &ghost);

    assert!(back.as_record().is_some());
    assert_eq!(back.property("boo"), Some(Value::Bool(true)));
}

// =============================================================================
// Topology
// =============================================================================

#[test]
fn shared_child_stays_shared() {
    let registry = ClassRegistry::new();
    let shared = Value::record([("n", Value::Int(1))]);
    let root = Value::record([("a", shared.clone()), ("b", shared)]);
    let back = round_trip(&registry, &root);

    let a = back.property("a").unwrap();
    let b = back.property("b").unwrap();
    assert!(a.same_identity(&b));
}

#[test]
fn self_referencing_map() {
    let registry = ClassRegistry::new();
    let map = Value::map([]);
    map.as_map()
        .unwrap()
        .borrow_mut()
        .insert(Value::from("self"), map.clone());
    let back = round_trip(&registry, &map);

    let inner = back
        .as_map()
        .unwrap()
        .borrow()
        .get(&Value::from("self"))
        .cloned()
        .unwrap();
    assert!(inner.same_identity(&back));
}

#[test]
fn mutual_cycle_through_sequence() {
    let registry = ClassRegistry::new();
    let parent = Value::record([("name", Value::from("parent"))]);
    let child = Value::record([("parent", parent.clone())]);
    parent.set_property("children", Value::seq([child]));
    let back = round_trip(&registry, &parent);

    assert!(parent.structurally_eq(&back));
    let children = back.property("children").unwrap();
    let child = children.as_seq().unwrap().borrow()[0].clone();
    assert!(child.property("parent").unwrap().same_identity(&back));
}

#[test]
fn deep_chain_of_records() {
    let registry = ClassRegistry::new();
    let mut chain = Value::record([("end", Value::Bool(true))]);
    for i in 0..250 {
        chain = Value::record([("index", Value::Int(i)), ("next", chain)]);
    }
    let back = round_trip(&registry, &chain);

    assert!(chain.structurally_eq(&back));
    let mut node = back;
    let mut links = 0;
    while let Some(next) = node.property("next") {
        node = next;
        links += 1;
    }
    assert_eq!(links, 250);
    assert_eq!(node.property("end"), Some(Value::Bool(true)));
}

#[test]
fn deep_ring_closes_on_its_head() {
    let registry = ClassRegistry::new();
    let head = Value::record([("index", Value::Int(0))]);
    let mut tail = head.clone();
    for i in 1..200 {
        let next = Value::record([("index", Value::Int(i))]);
        tail.set_property("next", next.clone());
        tail = next;
    }
    tail.set_property("next", head.clone());
    let back = round_trip(&registry, &head);

    let mut node = back.clone();
    for _ in 0..200 {
        node = node.property("next").unwrap();
    }
    assert!(node.same_identity(&back));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn pretty_output_decodes_identically() {
    let registry = ClassRegistry::new();
    let root = Value::seq([Value::set([Value::from("x")]), Value::Float(0.5)]);
    let compact = Encoder::new(&registry).serialize(&root).unwrap();
    let pretty = Encoder::new(&registry)
        .with_config(CodecConfig::pretty())
        .serialize(&root)
        .unwrap();

    assert_ne!(compact, pretty);
    let decoder = Decoder::new(&registry);
    let a = decoder.deserialize(&compact).unwrap();
    let b = decoder.deserialize(&pretty).unwrap();
    assert!(a.structurally_eq(&b));
}
