//! Instances of a [`Kind`].
//!
//! An [`Instance`] is a cheap, cloneable handle (`Rc`) to one object's
//! runtime state: its property bag, method table, observer registry,
//! notification queue, bindings and applied mixins. Everything is
//! single-threaded; callbacks run synchronously on the caller's stack.
//!
//! # Invariants
//!
//! 1. No `RefCell` borrow is held while user code (methods, observers,
//!    bindings, mixins) runs, so that code may freely re-enter the instance.
//! 2. Construction sets up declarative observers, computed properties and
//!    declared bindings before any mixin is applied.

use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::binding::BindingRef;
use crate::kind::Kind;
use crate::method::{Method, MethodTable};
use crate::mixin::Extend;
use crate::observer::ObserverRegistry;
use crate::path::{self, PathError};
use crate::queue::NotificationQueue;
use crate::value::{Map, Value};

// Diagnostic only: counts every instance ever created, never decremented.
// Relaxed ordering is enough and wrap-around is harmless.
static INSTANCE_COUNT: AtomicU64 = AtomicU64::new(0);

/// Number of instances created so far in this process.
pub fn instance_count() -> u64 {
    INSTANCE_COUNT.load(Ordering::Relaxed)
}

pub(crate) struct Inner {
    pub(crate) id: u64,
    pub(crate) kind: Rc<Kind>,
    pub(crate) props: RefCell<Map>,
    pub(crate) methods: RefCell<MethodTable>,
    pub(crate) observers: RefCell<ObserverRegistry>,
    pub(crate) queue: RefCell<NotificationQueue>,
    pub(crate) bindings: RefCell<Vec<BindingRef>>,
    pub(crate) mixins: RefCell<Vec<String>>,
    pub(crate) recomputing: RefCell<Vec<String>>,
    pub(crate) destroyed: Cell<bool>,
}

#[derive(Clone)]
pub struct Instance(pub(crate) Rc<Inner>);

/// Non-owning reference to an [`Instance`].
#[derive(Clone, Default)]
pub struct WeakInstance(Weak<Inner>);

impl WeakInstance {
    pub fn upgrade(&self) -> Option<Instance> {
        self.0.upgrade().map(Instance)
    }

    pub fn ptr_eq(&self, other: &WeakInstance) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }

    pub fn is(&self, instance: &Instance) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&instance.0))
    }
}

impl std::fmt::Debug for WeakInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.upgrade() {
            Some(inst) => write!(f, "WeakInstance({})", inst.describe()),
            None => f.write_str("WeakInstance(<dropped>)"),
        }
    }
}

impl Instance {
    pub fn new(kind: &Rc<Kind>) -> Self {
        let id = INSTANCE_COUNT.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let proto = kind.prototype();
        let inst = Instance(Rc::new(Inner {
            id,
            kind: kind.clone(),
            props: RefCell::new(proto.props.clone()),
            methods: RefCell::new(proto.methods.clone()),
            observers: RefCell::new(ObserverRegistry::default()),
            queue: RefCell::new(NotificationQueue::default()),
            bindings: RefCell::new(Vec::new()),
            mixins: RefCell::new(Vec::new()),
            recomputing: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
        }));

        inst.setup_observers();
        inst.setup_computed();
        for spec in kind.bindings() {
            inst.binding([spec.clone()]);
        }
        inst.extend(kind.mixins().iter().cloned().map(Extend::Mixin));

        log::trace!("created {}", inst.describe());
        inst
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn kind(&self) -> &Rc<Kind> {
        &self.0.kind
    }

    pub fn kind_name(&self) -> &str {
        self.0.kind.name()
    }

    /// `Kind#id`, used as a prefix in log lines.
    pub fn describe(&self) -> String {
        format!("{}#{}", self.kind_name(), self.0.id)
    }

    pub fn downgrade(&self) -> WeakInstance {
        WeakInstance(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Reads `path`. A computed property of that name is evaluated on
    /// every read; nothing is cached. User accessors are bypassed; see
    /// [`get_property`](Self::get_property).
    pub fn get(&self, path: &str) -> Value {
        if self.is_computed(path) {
            return self.call(path, &[]);
        }
        path::get(&self.0.props.borrow(), path)
    }

    /// Writes `path` and notifies observers if the value changed.
    /// Returns whether it changed.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<bool, PathError> {
        self.set_with(path, value.into(), false)
    }

    /// Like [`set`](Self::set), but notifies even when the value is equal.
    pub fn set_forced(&self, path: &str, value: impl Into<Value>) -> Result<bool, PathError> {
        self.set_with(path, value.into(), true)
    }

    fn set_with(&self, path: &str, value: Value, force: bool) -> Result<bool, PathError> {
        let old = path::set(&mut self.0.props.borrow_mut(), path, value.clone())?;
        let changed = old != value;
        if changed || force {
            self.notify_observers(path, &old, &value, force);
        }
        Ok(changed)
    }

    /// Snapshot of the property bag.
    pub fn props(&self) -> Map {
        self.0.props.borrow().clone()
    }

    /// Raw write, bypassing notification.
    pub(crate) fn put_prop(&self, name: &str, value: Value) {
        self.0.props.borrow_mut().insert(name.to_string(), value);
    }

    /// Invokes the visible contribution of `name`. Missing methods yield
    /// `Null`.
    pub fn call(&self, name: &str, args: &[Value]) -> Value {
        let chain = self.0.methods.borrow().get(name).cloned();
        match chain {
            Some(chain) => chain.invoke(self, name, args),
            None => {
                log::debug!("{}: no method `{name}`", self.describe());
                Value::Null
            }
        }
    }

    /// Invokes a contribution stored under `extension`'s namespace by a
    /// preserving extension. Its `inherited` is the currently visible chain.
    pub fn call_preserved(&self, extension: &str, name: &str, args: &[Value]) -> Option<Value> {
        let (method, chain) = {
            let methods = self.0.methods.borrow();
            let method = methods.preserved(extension, name)?.clone();
            (method, methods.get(name).cloned().unwrap_or_default())
        };
        Some(chain.invoke_over(&method, self, name, args))
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.0.methods.borrow().contains(name)
    }

    /// The visible contribution for `name`.
    pub fn method(&self, name: &str) -> Option<Method> {
        self.0.methods.borrow().top(name).cloned()
    }

    /// How many contributions are stacked under `name`.
    pub fn method_depth(&self, name: &str) -> usize {
        self.0.methods.borrow().get(name).map_or(0, |c| c.depth())
    }

    pub fn methods(&self) -> Ref<'_, MethodTable> {
        self.0.methods.borrow()
    }

    /// Names of the mixins applied so far, in application order.
    pub fn applied_mixins(&self) -> Vec<String> {
        self.0.mixins.borrow().clone()
    }

    /// Tears down bindings, observers and any pending notifications.
    /// Safe to call more than once.
    pub fn destroy(&self) {
        if self.0.destroyed.replace(true) {
            return;
        }
        self.clear_bindings();
        self.remove_all_observers();
        self.0.queue.borrow_mut().reset();
        log::trace!("destroyed {}", self.describe());
    }

    pub fn is_destroyed(&self) -> bool {
        self.0.destroyed.get()
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("kind", &self.kind_name())
            .field("id", &self.0.id)
            .field("props", &*self.0.props.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "inspector")]
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub kind: String,
    pub id: u64,
    pub props: Map,
    pub observers: Vec<(String, usize)>,
    pub notifications_enabled: bool,
    pub pending: Vec<String>,
    pub bindings: usize,
    pub mixins: Vec<String>,
    pub methods: Vec<(String, usize)>,
    pub preserved: Vec<(String, String)>,
    pub computed: Vec<(String, Vec<String>)>,
}

#[cfg(feature = "inspector")]
impl Instance {
    pub fn snapshot(&self) -> Snapshot {
        let methods = self.0.methods.borrow();
        let queue = self.0.queue.borrow();
        Snapshot {
            kind: self.kind_name().to_string(),
            id: self.0.id,
            props: self.props(),
            observers: self.0.observers.borrow().counts(),
            notifications_enabled: queue.enabled(),
            pending: queue.props().map(str::to_string).collect(),
            bindings: self.0.bindings.borrow().len(),
            mixins: self.applied_mixins(),
            methods: methods
                .iter()
                .map(|(name, chain)| (name.to_string(), chain.depth()))
                .collect(),
            preserved: methods
                .preserved_keys()
                .map(|(e, n)| (e.to_string(), n.to_string()))
                .collect(),
            computed: self.computed_properties(),
        }
    }
}
