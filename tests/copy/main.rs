//! Integration tests for Layer 1: Copy
//!
//! Tests for depth-limited deep copies and property assignment.

use chrono::{DateTime, Utc};
use skein_copy::{DeepCopier, Depth, assign_matching};
use skein_foundation::{ClassRecipe, ClassRegistry, Instance, Value};

fn copy(value: &Value, depth: Depth) -> Value {
    DeepCopier::new(&ClassRegistry::new()).copy(value, depth)
}

// =============================================================================
// Depth
// =============================================================================

#[test]
fn date_inside_record_is_detached() {
    let at: DateTime<Utc> = "2020-01-01T00:00:00Z".parse().unwrap();
    let source = Value::record([("x", Value::timestamp(at))]);
    let result = copy(&source, Depth::Unlimited);

    let x = result.property("x").unwrap();
    assert!(!x.same_identity(&source.property("x").unwrap()));
    assert_eq!(*x.as_timestamp().unwrap().borrow(), at);
}

#[test]
fn shallow_copy_detaches_only_the_top() {
    let inner = Value::map([(Value::from("k"), Value::Int(1))]);
    let source = Value::seq([inner.clone(), Value::Int(2)]);
    let result = copy(&source, Depth::shallow());

    assert!(!result.same_identity(&source));
    let items = result.as_seq().unwrap().borrow();
    assert!(items[0].same_identity(&inner));
    assert_eq!(items[1], Value::Int(2));
}

#[test]
fn each_level_detaches_one_more_layer() {
    let mut chain = Value::record([("end", Value::Bool(true))]);
    let mut originals = vec![chain.clone()];
    for _ in 0..4 {
        chain = Value::record([("next", chain)]);
        originals.push(chain.clone());
    }
    originals.reverse();

    for levels in 0..4u32 {
        let result = copy(&chain, Depth::Levels(levels));
        let mut node = result;
        for (depth, original) in originals.iter().enumerate() {
            let detached = depth <= levels as usize;
            assert_eq!(!node.same_identity(original), detached, "levels {levels} depth {depth}");
            match node.property("next") {
                Some(next) => node = next,
                None => break,
            }
        }
    }
}

#[test]
fn full_copy_mutation_does_not_leak() {
    let source = Value::record([("list", Value::seq([Value::Int(1)]))]);
    let result = copy(&source, Depth::Unlimited);

    let list = result.property("list").unwrap();
    list.as_seq().unwrap().borrow_mut().push(Value::Int(2));

    let original = source.property("list").unwrap();
    assert_eq!(original.as_seq().unwrap().borrow().len(), 1);
}

// =============================================================================
// Topology
// =============================================================================

#[test]
fn cycles_are_rebuilt_among_copies() {
    let a = Value::record([("name", Value::from("a"))]);
    let b = Value::record([("name", Value::from("b")), ("peer", a.clone())]);
    a.set_property("peer", b.clone());

    let a2 = copy(&a, Depth::Unlimited);
    let b2 = a2.property("peer").unwrap();
    assert!(!b2.same_identity(&b));
    assert!(b2.property("peer").unwrap().same_identity(&a2));
    assert!(a.structurally_eq(&a2));
}

#[test]
fn shared_set_is_copied_once() {
    let tags = Value::set([Value::from("x")]);
    let source = Value::map([
        (Value::from("first"), tags.clone()),
        (Value::from("second"), tags.clone()),
    ]);
    let result = copy(&source, Depth::Unlimited);

    let entries = result.as_map().unwrap().borrow();
    let first = entries.get(&Value::from("first")).unwrap();
    let second = entries.get(&Value::from("second")).unwrap();
    assert!(first.same_identity(second));
    assert!(!first.same_identity(&tags));
}

// =============================================================================
// Classes
// =============================================================================

#[test]
fn instances_copy_through_their_recipe() {
    let mut registry = ClassRegistry::new();
    registry.register_class(ClassRecipe::new("Point"));
    let point = Value::instance(Instance::new("Point").with_property("x", 1).with_managed(true));

    let result = DeepCopier::new(&registry).copy(&point, Depth::Unlimited);
    assert!(!result.same_identity(&point));
    assert_eq!(result.type_name(), "Point");
    assert_eq!(result.property("x"), Some(Value::Int(1)));
    assert!(result.as_instance().unwrap().borrow().managed);
}

#[test]
fn unregistered_instances_are_shared() {
    let stranger = Value::instance(Instance::new("Stranger"));
    let source = Value::seq([stranger.clone()]);
    let result = copy(&source, Depth::Unlimited);
    assert!(result.as_seq().unwrap().borrow()[0].same_identity(&stranger));
}

// =============================================================================
// Property Assignment
// =============================================================================

#[test]
fn assign_matching_fills_existing_slots() {
    let target = Value::record([("a", Value::Null), ("b", Value::Null)]);
    let source = Value::record([("a", Value::Int(1)), ("z", Value::Int(26))]);

    assert_eq!(assign_matching(&target, &source), 1);
    assert_eq!(target.property("a"), Some(Value::Int(1)));
    assert_eq!(target.property("b"), Some(Value::Null));
    assert_eq!(target.property("z"), None);
}

#[test]
fn assign_matching_replaces_sequence_contents() {
    let target = Value::seq(vec![Value::Int(0); 4]);
    let source = Value::seq([Value::Int(1)]);
    assign_matching(&target, &source);
    assert_eq!(target.as_seq().unwrap().borrow().as_slice(), &[Value::Int(1)]);
}
