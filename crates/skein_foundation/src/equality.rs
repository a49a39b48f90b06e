//! Structural equality across two value graphs.
//!
//! Two graphs are structurally equal when every pair of corresponding nodes
//! has the same kind and contents, and the pairing of composite identities is
//! a bijection. The bijection check is what makes sharing topology part of
//! equality: a node reached twice on one side must be reached twice, as the
//! same node, on the other.

use std::collections::HashMap;

use crate::identity::Identity;
use crate::value::Value;

impl Value {
    /// Compares two graphs by kind, contents, and sharing topology.
    ///
    /// Terminates on cyclic graphs. Set members and map entries are compared
    /// in iteration order; record and instance properties by name. The
    /// managed marker of instances is not compared.
    #[must_use]
    pub fn structurally_eq(&self, other: &Value) -> bool {
        Pairing::default().eq(self, other)
    }
}

#[derive(Default)]
struct Pairing {
    forward: HashMap<Identity, Identity>,
    backward: HashMap<Identity, Identity>,
}

impl Pairing {
    fn eq(&mut self, left: &Value, right: &Value) -> bool {
        let (Some(l), Some(r)) = (left.identity(), right.identity()) else {
            return !left.is_composite() && !right.is_composite() && left == right;
        };

        match (self.forward.get(&l), self.backward.get(&r)) {
            (Some(seen_r), Some(seen_l)) => return *seen_r == r && *seen_l == l,
            (None, None) => {}
            _ => return false,
        }
        self.forward.insert(l, r);
        self.backward.insert(r, l);

        match (left, right) {
            (Value::Seq(a), Value::Seq(b)) => {
                let (a, b) = (a.borrow().clone(), b.borrow().clone());
                a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| self.eq(x, y))
            }
            (Value::Set(a), Value::Set(b)) => {
                let (a, b) = (a.borrow().clone(), b.borrow().clone());
                a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| self.eq(x, y))
            }
            (Value::Map(a), Value::Map(b)) => {
                let (a, b) = (a.borrow().clone(), b.borrow().clone());
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(&b)
                        .all(|((ka, va), (kb, vb))| self.eq(ka, kb) && self.eq(va, vb))
            }
            (Value::Timestamp(a), Value::Timestamp(b)) => *a.borrow() == *b.borrow(),
            (Value::Record(a), Value::Record(b)) => {
                let (a, b) = (a.borrow().clone(), b.borrow().clone());
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(k, va)| b.get(k).is_some_and(|vb| self.eq(va, vb)))
            }
            (Value::Instance(a), Value::Instance(b)) => {
                let (a, b) = (a.borrow().clone(), b.borrow().clone());
                a.class_name() == b.class_name()
                    && a.properties.len() == b.properties.len()
                    && a
                        .properties
                        .iter()
                        .all(|(k, va)| b.properties.get(k).is_some_and(|vb| self.eq(va, vb)))
            }
            _ => false,
        }
    }
}
