//! Bindings owned by an instance.
//!
//! The binding object itself sits behind the [`Binding`] trait and is
//! produced by a [`BindingFactory`]. The instance only keeps an ordered
//! list of the bindings it owns and offers bulk refresh/clear.
//!
//! [`PropertyBinding`] is the stock implementation: it keeps
//! `source.from` and `target.to` in sync, in both directions unless
//! `one_way` is set.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::object::{Instance, WeakInstance};
use crate::observer::Observer;
use crate::value::Value;

pub trait Binding {
    /// Pushes the source value to the target.
    fn refresh(&self);
    /// Disconnects and detaches from the owner. Must be idempotent.
    fn destroy(&self);
    fn is_destroyed(&self) -> bool {
        false
    }
}

pub type BindingRef = Rc<dyn Binding>;

/// Identity comparison of two binding handles.
pub fn same_binding(a: &BindingRef, b: &BindingRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

#[derive(Clone, Debug)]
pub struct BindingOptions {
    pub owner: WeakInstance,
    pub auto_connect: bool,
}

/// Declarative description of a binding. Unset fields fall back to the
/// owner (`source`, `target`), to `from` (`to`) and to two-way sync.
#[derive(Clone, Debug, Default)]
pub struct BindingSpec {
    pub from: Option<String>,
    pub to: Option<String>,
    pub source: Option<WeakInstance>,
    pub target: Option<WeakInstance>,
    pub one_way: Option<bool>,
}

impl BindingSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, path: impl Into<String>) -> Self {
        self.from = Some(path.into());
        self
    }

    pub fn to(mut self, path: impl Into<String>) -> Self {
        self.to = Some(path.into());
        self
    }

    pub fn source(mut self, source: &Instance) -> Self {
        self.source = Some(source.downgrade());
        self
    }

    pub fn target(mut self, target: &Instance) -> Self {
        self.target = Some(target.downgrade());
        self
    }

    pub fn one_way(mut self, one_way: bool) -> Self {
        self.one_way = Some(one_way);
        self
    }

    /// Fields set on `other` win.
    pub fn merge(self, other: BindingSpec) -> Self {
        Self {
            from: other.from.or(self.from),
            to: other.to.or(self.to),
            source: other.source.or(self.source),
            target: other.target.or(self.target),
            one_way: other.one_way.or(self.one_way),
        }
    }
}

pub trait BindingFactory {
    fn create(&self, options: BindingOptions, spec: BindingSpec) -> BindingRef;
}

/// Produces [`PropertyBinding`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct PropertyBindingFactory;

impl BindingFactory for PropertyBindingFactory {
    fn create(&self, options: BindingOptions, spec: BindingSpec) -> BindingRef {
        PropertyBinding::new(options, spec)
    }
}

pub struct PropertyBinding {
    this: Weak<PropertyBinding>,
    owner: WeakInstance,
    source: WeakInstance,
    target: WeakInstance,
    from: Option<String>,
    to: Option<String>,
    one_way: bool,
    forward: RefCell<Option<Observer>>,
    backward: RefCell<Option<Observer>>,
    destroyed: Cell<bool>,
}

impl PropertyBinding {
    pub fn new(options: BindingOptions, spec: BindingSpec) -> Rc<PropertyBinding> {
        let to = spec.to.or_else(|| spec.from.clone());
        let binding = Rc::new_cyclic(|this| PropertyBinding {
            this: this.clone(),
            source: spec.source.unwrap_or_else(|| options.owner.clone()),
            target: spec.target.unwrap_or_else(|| options.owner.clone()),
            owner: options.owner,
            from: spec.from,
            to,
            one_way: spec.one_way.unwrap_or(false),
            forward: RefCell::new(None),
            backward: RefCell::new(None),
            destroyed: Cell::new(false),
        });
        if options.auto_connect {
            binding.connect();
            binding.refresh();
        }
        binding
    }

    pub fn is_connected(&self) -> bool {
        self.forward.borrow().is_some()
    }

    pub fn connect(&self) {
        if self.destroyed.get() || self.is_connected() {
            return;
        }
        let (Some(from), Some(to)) = (self.from.as_deref(), self.to.as_deref()) else {
            log::warn!("binding has no `from` path; left disconnected");
            return;
        };
        let (Some(source), Some(target)) = (self.source.upgrade(), self.target.upgrade()) else {
            log::warn!("binding endpoint dropped before connect ({from} -> {to})");
            return;
        };

        let this = self.this.clone();
        let forward = source.add_observer(
            from,
            Observer::new(move |_, _, _, _| {
                if let Some(b) = this.upgrade() {
                    b.push_forward();
                }
            }),
        );
        *self.forward.borrow_mut() = Some(forward);

        if !self.one_way {
            let this = self.this.clone();
            let backward = target.add_observer(
                to,
                Observer::new(move |_, _, _, _| {
                    if let Some(b) = this.upgrade() {
                        b.push_backward();
                    }
                }),
            );
            *self.backward.borrow_mut() = Some(backward);
        }
        log::trace!(
            "connected binding {}.{from} -> {}.{to}{}",
            source.describe(),
            target.describe(),
            if self.one_way { "" } else { " (two-way)" }
        );
    }

    pub fn disconnect(&self) {
        if let Some(observer) = self.forward.borrow_mut().take()
            && let (Some(source), Some(from)) = (self.source.upgrade(), self.from.as_deref())
        {
            source.remove_observer(from, &observer);
        }
        if let Some(observer) = self.backward.borrow_mut().take()
            && let (Some(target), Some(to)) = (self.target.upgrade(), self.to.as_deref())
        {
            target.remove_observer(to, &observer);
        }
    }

    // The observed value is re-read rather than taken from the
    // notification: computed sources notify with `Null`. A queued
    // notification may still arrive after `destroy`.
    fn push_forward(&self) {
        if self.destroyed.get() {
            return;
        }
        Self::copy(&self.source, self.from.as_deref(), &self.target, self.to.as_deref());
    }

    fn push_backward(&self) {
        if self.destroyed.get() {
            return;
        }
        Self::copy(&self.target, self.to.as_deref(), &self.source, self.from.as_deref());
    }

    fn copy(src: &WeakInstance, src_path: Option<&str>, dst: &WeakInstance, dst_path: Option<&str>) {
        let (Some(src), Some(dst), Some(src_path), Some(dst_path)) =
            (src.upgrade(), dst.upgrade(), src_path, dst_path)
        else {
            return;
        };
        let value: Value = src.get(src_path);
        if let Err(err) = dst.set(dst_path, value) {
            dst.warn(format_args!("binding could not write `{dst_path}`: {err}"));
        }
    }
}

impl Binding for PropertyBinding {
    fn refresh(&self) {
        if !self.destroyed.get() {
            self.push_forward();
        }
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.disconnect();
        if let (Some(owner), Some(this)) = (self.owner.upgrade(), self.this.upgrade()) {
            let this: BindingRef = this;
            owner.remove_binding(&this);
        }
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}

// An owner dropped without `destroy` still unhooks from the other endpoint.
impl Drop for PropertyBinding {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl Instance {
    /// Merges `specs` left to right and creates a [`PropertyBinding`] owned
    /// by this instance.
    pub fn binding(&self, specs: impl IntoIterator<Item = BindingSpec>) -> BindingRef {
        self.binding_with(&PropertyBindingFactory, specs)
    }

    pub fn binding_with(
        &self,
        factory: &dyn BindingFactory,
        specs: impl IntoIterator<Item = BindingSpec>,
    ) -> BindingRef {
        let spec = specs
            .into_iter()
            .fold(BindingSpec::default(), BindingSpec::merge);
        let options = BindingOptions {
            owner: self.downgrade(),
            auto_connect: true,
        };
        let binding = factory.create(options, spec);
        self.0.bindings.borrow_mut().push(binding.clone());
        binding
    }

    pub fn bindings(&self) -> Vec<BindingRef> {
        self.0.bindings.borrow().clone()
    }

    /// Destroys every owned binding and empties the list.
    pub fn clear_bindings(&self) {
        let bindings = std::mem::take(&mut *self.0.bindings.borrow_mut());
        for binding in bindings {
            binding.destroy();
        }
    }

    /// Destroys every binding in `list`, draining it, and drops each from
    /// this instance's own list if present.
    pub fn clear_bindings_in(&self, list: &mut Vec<BindingRef>) {
        for binding in list.drain(..) {
            binding.destroy();
            self.remove_binding(&binding);
        }
    }

    pub fn refresh_bindings(&self) {
        self.refresh_bindings_in(&self.bindings());
    }

    pub fn refresh_bindings_in(&self, list: &[BindingRef]) {
        for binding in list {
            binding.refresh();
        }
    }

    /// Removes `binding` by identity. Returns `false` if it was not owned.
    pub fn remove_binding(&self, binding: &BindingRef) -> bool {
        let removed = {
            let mut bindings = self.0.bindings.borrow_mut();
            bindings
                .iter()
                .position(|b| same_binding(b, binding))
                .map(|pos| bindings.remove(pos))
        };
        // Dropped here, outside the borrow: the last handle disconnects.
        removed.is_some()
    }
}
