//! Property copy onto an existing shell.

use skein_foundation::Value;

/// Copies matching properties from `source` onto `target`.
///
/// For a record or instance target, every property the target already has
/// is overwritten when `source` defines it; properties the target lacks are
/// never added. When both are sequences the target is cleared and refilled
/// with the source's elements. Any other combination does nothing.
///
/// Values are assigned by reference, not copied. Returns the number of
/// slots written.
pub fn assign_matching(target: &Value, source: &Value) -> usize {
    match (target, source) {
        (Value::Seq(target), Value::Seq(source)) => {
            let items = source.borrow().clone();
            let written = items.len();
            *target.borrow_mut() = items;
            written
        }
        (Value::Record(_) | Value::Instance(_), Value::Record(_) | Value::Instance(_)) => {
            let props = match source {
                Value::Record(props) => props.borrow().clone(),
                Value::Instance(instance) => instance.borrow().properties.clone(),
                _ => return 0,
            };
            let mut written = 0;
            for (name, value) in props {
                if target.property(&name).is_some() {
                    target.set_property(name, value);
                    written += 1;
                }
            }
            written
        }
        _ => 0,
    }
}
