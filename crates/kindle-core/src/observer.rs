//! Per-instance observer registry and change notification.
//!
//! Dispatch order for a property change: registered observers in
//! registration order, then the `<prop>_changed` hook if the instance has
//! one. Observers receive `(owner, prop, old, new)`; the hook receives
//! `[old, new]`. While notifications are stopped, every dispatch is routed
//! into the [`NotificationQueue`](crate::queue::NotificationQueue) instead.

use std::collections::HashMap;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::object::{Instance, WeakInstance};
use crate::queue::{NotifyArgs, Target};
use crate::value::Value;

pub type ObserverFn = Rc<dyn Fn(&Instance, &str, &Value, &Value)>;

#[derive(Clone)]
pub enum Observer {
    Callback(ObserverFn),
    /// A method on `context`, called with `[prop, old, new]`.
    Method { context: WeakInstance, name: String },
    /// Generated for computed properties: re-notifies `name` with `force`.
    Recompute(String),
    Noop,
}

impl Observer {
    pub fn new(f: impl Fn(&Instance, &str, &Value, &Value) + 'static) -> Self {
        Observer::Callback(Rc::new(f))
    }

    pub fn method(context: &Instance, name: impl Into<String>) -> Self {
        Observer::Method {
            context: context.downgrade(),
            name: name.into(),
        }
    }

    /// Identity: same closure allocation, same bound method, same
    /// recompute target.
    pub fn same(&self, other: &Observer) -> bool {
        match (self, other) {
            (Observer::Callback(a), Observer::Callback(b)) => Rc::ptr_eq(a, b),
            (
                Observer::Method { context: c1, name: n1 },
                Observer::Method { context: c2, name: n2 },
            ) => c1.ptr_eq(c2) && n1 == n2,
            (Observer::Recompute(a), Observer::Recompute(b)) => a == b,
            (Observer::Noop, Observer::Noop) => true,
            _ => false,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Observer::Noop)
    }

    pub(crate) fn dispatch(&self, owner: &Instance, prop: &str, old: &Value, new: &Value) {
        match self {
            Observer::Callback(f) => f(owner, prop, old, new),
            Observer::Method { context, name } => {
                if let Some(ctx) = context.upgrade() {
                    ctx.call(name, &[Value::from(prop), old.clone(), new.clone()]);
                }
            }
            Observer::Recompute(name) => owner.renotify_computed(name),
            Observer::Noop => {}
        }
    }
}

impl PartialEq for Observer {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Observer::Callback(cb) => write!(f, "Callback({:p})", Rc::as_ptr(cb)),
            Observer::Method { context, name } => write!(f, "Method({context:?}, {name})"),
            Observer::Recompute(name) => write!(f, "Recompute({name})"),
            Observer::Noop => f.write_str("Noop"),
        }
    }
}

pub type ObserverList = SmallVec<[Observer; 2]>;

#[derive(Default)]
pub struct ObserverRegistry {
    entries: HashMap<String, ObserverList>,
}

impl ObserverRegistry {
    /// Returns `false` if an identical observer was already registered.
    pub fn add(&mut self, prop: &str, observer: Observer) -> bool {
        let list = self.entries.entry(prop.to_string()).or_default();
        if list.iter().any(|o| o.same(&observer)) {
            return false;
        }
        list.push(observer);
        true
    }

    pub fn remove(&mut self, prop: &str, observer: &Observer) -> bool {
        let Some(list) = self.entries.get_mut(prop) else {
            return false;
        };
        let Some(pos) = list.iter().position(|o| o.same(observer)) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.entries.remove(prop);
        }
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn snapshot(&self, prop: &str) -> ObserverList {
        self.entries.get(prop).cloned().unwrap_or_default()
    }

    pub fn len(&self, prop: &str) -> usize {
        self.entries.get(prop).map_or(0, SmallVec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(prop, observer count)` sorted by property.
    pub fn counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<_> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.len()))
            .collect();
        counts.sort();
        counts
    }
}

pub fn change_hook_name(prop: &str) -> String {
    format!("{prop}_changed")
}

impl Instance {
    /// Registers `observer` for `prop` and returns what was stored.
    ///
    /// A method observer whose context is gone, or which names a method
    /// the context lacks, is replaced with [`Observer::Noop`] and a warning
    /// is logged. Registering the same observer twice is a no-op.
    pub fn add_observer(&self, prop: &str, observer: Observer) -> Observer {
        let observer = self.resolve_observer(observer);
        if !self.0.observers.borrow_mut().add(prop, observer.clone()) {
            log::trace!("{}: observer already registered for `{prop}`", self.describe());
        }
        observer
    }

    fn resolve_observer(&self, observer: Observer) -> Observer {
        let Observer::Method { context, name } = &observer else {
            return observer;
        };
        match context.upgrade() {
            Some(ctx) if ctx.has_method(name) => observer,
            Some(ctx) => {
                self.warn(format_args!(
                    "observer method `{name}` not found on {}; using a no-op",
                    ctx.describe()
                ));
                Observer::Noop
            }
            None => {
                self.warn(format_args!(
                    "observer method `{name}` bound to a dropped instance; using a no-op"
                ));
                Observer::Noop
            }
        }
    }

    /// Always succeeds; returns whether anything was removed.
    pub fn remove_observer(&self, prop: &str, observer: &Observer) -> bool {
        self.0.observers.borrow_mut().remove(prop, observer)
    }

    pub fn remove_all_observers(&self) {
        self.0.observers.borrow_mut().clear();
    }

    pub fn observer_count(&self, prop: &str) -> usize {
        self.0.observers.borrow().len(prop)
    }

    /// Dispatches a change of `prop`, or queues it while notifications are
    /// stopped. `force` travels with the notification; it marks
    /// "recompute on read" signals from computed properties.
    pub fn notify_observers(&self, prop: &str, old: &Value, new: &Value, force: bool) {
        let observers = self.0.observers.borrow().snapshot(prop);
        let hook = change_hook_name(prop);
        let has_hook = self.has_method(&hook);
        if observers.is_empty() && !has_hook {
            return;
        }

        for observer in observers {
            if self.notifications_enabled() {
                observer.dispatch(self, prop, old, new);
            } else {
                self.enqueue(prop, Target::Observer(observer), old, new, force);
            }
        }
        if has_hook {
            if self.notifications_enabled() {
                self.call(&hook, &[old.clone(), new.clone()]);
            } else {
                self.enqueue(prop, Target::ChangeHook, old, new, force);
            }
        }
    }

    fn enqueue(&self, prop: &str, target: Target, old: &Value, new: &Value, force: bool) {
        let args = NotifyArgs {
            old: old.clone(),
            new: new.clone(),
            force,
        };
        self.0.queue.borrow_mut().enqueue(prop, target, args);
    }

    /// Wires every declarative observer method to the properties it watches.
    pub(crate) fn setup_observers(&self) {
        let declared: Vec<(String, Vec<String>)> = self
            .0
            .methods
            .borrow()
            .iter()
            .filter_map(|(name, chain)| {
                chain
                    .top()
                    .filter(|m| m.is_observer())
                    .map(|m| (name.to_string(), m.deps().to_vec()))
            })
            .collect();
        for (name, props) in declared {
            for prop in props {
                self.add_observer(&prop, Observer::method(self, name.clone()));
            }
        }
    }
}
