//! Extending instances after construction.
//!
//! [`Instance::extend`] takes a list of [`Extend`] arguments and applies
//! them left to right. A [`Mixin`] applies itself through its `apply`
//! method; a plain [`Extension`] copies its properties and composes its
//! methods onto the instance's chains, so each new contribution can reach
//! the previous one through [`Call::inherited`](crate::Call::inherited).
//!
//! A named extension with `preserve` set does not touch a chain that
//! already exists (or any chain, with `preserve_all`). Its methods are
//! stored under the extension's name instead and run via
//! [`Instance::call_preserved`]. A second preserving extension with the
//! same name replaces the first one's entries.

use std::rc::Rc;

use crate::method::{Call, Method, MethodFlags};
use crate::object::Instance;
use crate::observer::Observer;
use crate::value::Value;

pub trait Mixin {
    /// Applied-mixin name. Named mixins are applied at most once per
    /// instance; an empty name opts out of that check.
    fn name(&self) -> &str;
    fn apply(&self, target: &Instance);
}

/// A plain bundle of properties and methods.
#[derive(Clone, Debug, Default)]
pub struct Extension {
    name: Option<String>,
    preserve: bool,
    preserve_all: bool,
    as_mixin: bool,
    props: Vec<(String, Value)>,
    methods: Vec<(String, Method)>,
}

impl Extension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Keep existing methods visible; store ours under this extension's
    /// name. Only honoured for named extensions.
    pub fn preserve(mut self) -> Self {
        self.preserve = true;
        self
    }

    /// With `preserve`, also store methods that do not exist yet.
    pub fn preserve_all(mut self) -> Self {
        self.preserve = true;
        self.preserve_all = true;
        self
    }

    /// Route through the mixin path, recording the name as applied.
    pub fn as_mixin(mut self) -> Self {
        self.as_mixin = true;
        self
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.push((name.into(), value.into()));
        self
    }

    pub fn method(
        mut self,
        name: impl Into<String>,
        body: impl Fn(&Call<'_>, &[Value]) -> Value + 'static,
    ) -> Self {
        self.methods.push((name.into(), Method::new(body)));
        self
    }

    pub fn method_record(mut self, name: impl Into<String>, method: Method) -> Self {
        self.methods.push((name.into(), method));
        self
    }

    pub fn extension_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_mixin(&self) -> bool {
        self.as_mixin
    }
}

impl Mixin for Extension {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    fn apply(&self, target: &Instance) {
        target.apply_extension(self);
    }
}

pub enum Extend {
    Mixin(Rc<dyn Mixin>),
    Extension(Extension),
}

impl Extend {
    pub fn mixin(mixin: impl Mixin + 'static) -> Self {
        Extend::Mixin(Rc::new(mixin))
    }
}

impl From<Extension> for Extend {
    fn from(ext: Extension) -> Self {
        Extend::Extension(ext)
    }
}

impl From<Rc<dyn Mixin>> for Extend {
    fn from(mixin: Rc<dyn Mixin>) -> Self {
        Extend::Mixin(mixin)
    }
}

impl Instance {
    pub fn extend<E: Into<Extend>>(&self, args: impl IntoIterator<Item = E>) {
        for arg in args {
            match arg.into() {
                Extend::Mixin(mixin) => self.apply_mixin(mixin.as_ref()),
                Extend::Extension(ext) if ext.is_mixin() => self.apply_mixin(&ext),
                Extend::Extension(ext) => self.apply_extension(&ext),
            }
        }
    }

    pub fn has_mixin(&self, name: &str) -> bool {
        self.0.mixins.borrow().iter().any(|m| m == name)
    }

    fn apply_mixin(&self, mixin: &dyn Mixin) {
        let name = mixin.name();
        if !name.is_empty() {
            if self.has_mixin(name) {
                log::debug!("{}: mixin `{name}` already applied", self.describe());
                return;
            }
            self.0.mixins.borrow_mut().push(name.to_string());
        }
        log::trace!("{}: applying mixin `{name}`", self.describe());
        mixin.apply(self);
    }

    pub(crate) fn apply_extension(&self, ext: &Extension) {
        for (name, value) in &ext.props {
            self.put_prop(name, value.clone());
        }
        for (name, method) in &ext.methods {
            if let Some(ext_name) = ext.extension_name()
                && ext.preserve
                && (ext.preserve_all || self.has_method(name))
            {
                self.0
                    .methods
                    .borrow_mut()
                    .preserve(ext_name, name, method.clone());
                continue;
            }
            self.compose_method(name, method.clone());
        }
    }

    /// Pushes `method` on top of `name`'s chain.
    ///
    /// Shadowing a computed property keeps `name` computed, even when the
    /// new contribution is a plain method. Sources declared on the new
    /// contribution win; without any, the shadowed property's are kept.
    pub fn compose_method(&self, name: &str, mut method: Method) {
        {
            let mut methods = self.0.methods.borrow_mut();
            if let Some(prior) = methods.top(name).filter(|m| m.is_computed()) {
                method.insert_flags(MethodFlags::PROPERTY);
                if method.deps().is_empty() {
                    method.set_deps(prior.deps().to_vec());
                }
            }
            methods.install(name, method.clone());
        }
        if method.is_computed() {
            self.track_computed(name, method.deps());
        }
        if method.is_observer() {
            for prop in method.deps() {
                self.add_observer(prop, Observer::method(self, name));
            }
        }
    }
}
