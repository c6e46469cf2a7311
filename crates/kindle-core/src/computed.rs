//! Computed properties.
//!
//! A computed property is a method flagged `PROPERTY` with a list of source
//! properties. Its value is never cached here: [`Instance::get`] calls the
//! method on every read. What this module wires up is the invalidation
//! path: a change to any source re-notifies the computed property's own
//! observers with `force` set and `Null` for both values, meaning
//! "recompute on read".
//!
//! Re-notification of a property that is already being re-notified is
//! skipped, so cycles between computed properties terminate.

use crate::object::Instance;
use crate::observer::Observer;
use crate::value::Value;

impl Instance {
    pub(crate) fn setup_computed(&self) {
        for (name, deps) in self.computed_properties() {
            self.track_computed(&name, &deps);
        }
    }

    /// Registers the recompute observer for `name` on each of `deps`.
    /// Idempotent.
    pub(crate) fn track_computed(&self, name: &str, deps: &[String]) {
        for dep in deps {
            if dep == name {
                self.warn(format_args!("computed property `{name}` depends on itself; ignored"));
                continue;
            }
            self.add_observer(dep, Observer::Recompute(name.to_string()));
        }
    }

    pub(crate) fn renotify_computed(&self, name: &str) {
        if self.0.recomputing.borrow().iter().any(|n| n == name) {
            log::trace!("{}: `{name}` already re-notifying; cycle cut", self.describe());
            return;
        }
        self.0.recomputing.borrow_mut().push(name.to_string());
        self.notify_observers(name, &Value::Null, &Value::Null, true);
        self.0.recomputing.borrow_mut().retain(|n| n != name);
    }

    /// `(name, source properties)` for every visible computed property with
    /// at least one source.
    pub fn computed_properties(&self) -> Vec<(String, Vec<String>)> {
        self.0
            .methods
            .borrow()
            .iter()
            .filter_map(|(name, chain)| {
                chain
                    .top()
                    .filter(|m| m.is_computed() && !m.deps().is_empty())
                    .map(|m| (name.to_string(), m.deps().to_vec()))
            })
            .collect()
    }

    pub fn is_computed(&self, name: &str) -> bool {
        self.0
            .methods
            .borrow()
            .top(name)
            .is_some_and(|m| m.is_computed())
    }
}
