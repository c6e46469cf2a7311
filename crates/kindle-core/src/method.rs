//! Tagged method records and per-name call chains.
//!
//! Every method lives in a [`MethodChain`]: an ordered stack of
//! contributions for one name. The last contribution is the visible one;
//! each contribution reaches the one below it through [`Call::inherited`].
//! Contributions are never mutated in place, so a chain can be snapshotted
//! (cheap `Rc` clones) before it runs and the running body is free to
//! extend its own instance.

use std::collections::BTreeMap;
use std::rc::Rc;

use bitflags::bitflags;

use crate::object::Instance;
use crate::value::Value;

bitflags! {
    /// Metadata describing what a method is for.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MethodFlags: u8 {
        /// Computed property; `deps` lists its source properties.
        const PROPERTY = 1 << 0;
        /// Declarative observer; `deps` lists the watched properties.
        const OBSERVER = 1 << 1;
        /// Accessor generated for a published property.
        const ACCESSOR = 1 << 2;
        /// User accessor that takes precedence over a generated one.
        const OVERLOADED = 1 << 3;
    }
}

pub type MethodBody = Rc<dyn Fn(&Call<'_>, &[Value]) -> Value>;

#[derive(Clone)]
pub struct Method {
    body: MethodBody,
    flags: MethodFlags,
    deps: Vec<String>,
}

impl Method {
    pub fn new(body: impl Fn(&Call<'_>, &[Value]) -> Value + 'static) -> Self {
        Self {
            body: Rc::new(body),
            flags: MethodFlags::empty(),
            deps: Vec::new(),
        }
    }

    /// A computed property re-notified whenever one of `deps` changes.
    pub fn computed<S: Into<String>>(
        deps: impl IntoIterator<Item = S>,
        body: impl Fn(&Call<'_>, &[Value]) -> Value + 'static,
    ) -> Self {
        Self {
            body: Rc::new(body),
            flags: MethodFlags::PROPERTY,
            deps: deps.into_iter().map(Into::into).collect(),
        }
    }

    /// An observer method wired to `props` when the instance is set up.
    /// It is called with `[prop, old, new]`.
    pub fn observer<S: Into<String>>(
        props: impl IntoIterator<Item = S>,
        body: impl Fn(&Call<'_>, &[Value]) -> Value + 'static,
    ) -> Self {
        Self {
            body: Rc::new(body),
            flags: MethodFlags::OBSERVER,
            deps: props.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_flags(mut self, flags: MethodFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn flags(&self) -> MethodFlags {
        self.flags
    }

    pub(crate) fn insert_flags(&mut self, flags: MethodFlags) {
        self.flags |= flags;
    }

    pub fn deps(&self) -> &[String] {
        &self.deps
    }

    pub(crate) fn set_deps(&mut self, deps: Vec<String>) {
        self.deps = deps;
    }

    pub fn is_computed(&self) -> bool {
        self.flags.contains(MethodFlags::PROPERTY)
    }

    pub fn is_observer(&self) -> bool {
        self.flags.contains(MethodFlags::OBSERVER)
    }

    pub fn is_generated_accessor(&self) -> bool {
        self.flags.contains(MethodFlags::ACCESSOR) && !self.flags.contains(MethodFlags::OVERLOADED)
    }

    pub fn is_overloaded(&self) -> bool {
        self.flags.contains(MethodFlags::OVERLOADED)
    }

    pub fn ptr_eq(&self, other: &Method) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

impl std::fmt::Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method")
            .field("flags", &self.flags)
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}

/// Context handed to a running method body.
pub struct Call<'a> {
    instance: &'a Instance,
    name: &'a str,
    below: &'a [Method],
}

impl<'a> Call<'a> {
    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn has_inherited(&self) -> bool {
        !self.below.is_empty()
    }

    /// Runs the next contribution down the chain. With nothing below, this
    /// is a no-op returning `Null`.
    pub fn inherited(&self, args: &[Value]) -> Value {
        match self.below.split_last() {
            Some((next, rest)) => (next.body)(
                &Call {
                    instance: self.instance,
                    name: self.name,
                    below: rest,
                },
                args,
            ),
            None => Value::Null,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MethodChain {
    layers: Vec<Method>,
}

impl MethodChain {
    pub fn top(&self) -> Option<&Method> {
        self.layers.last()
    }

    pub(crate) fn top_mut(&mut self) -> Option<&mut Method> {
        self.layers.last_mut()
    }

    pub(crate) fn push(&mut self, method: Method) {
        self.layers.push(method);
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub(crate) fn invoke(&self, instance: &Instance, name: &str, args: &[Value]) -> Value {
        let call = Call {
            instance,
            name,
            below: &self.layers,
        };
        call.inherited(args)
    }

    /// Runs `method` with this chain underneath it, without installing it.
    pub(crate) fn invoke_over(
        &self,
        method: &Method,
        instance: &Instance,
        name: &str,
        args: &[Value],
    ) -> Value {
        let call = Call {
            instance,
            name,
            below: &self.layers,
        };
        (method.body)(&call, args)
    }
}

/// All methods of a prototype or instance, plus contributions preserved
/// under an extension's namespace.
#[derive(Clone, Debug, Default)]
pub struct MethodTable {
    chains: BTreeMap<String, MethodChain>,
    preserved: BTreeMap<(String, String), Method>,
}

impl MethodTable {
    pub fn get(&self, name: &str) -> Option<&MethodChain> {
        self.chains.get(name)
    }

    pub fn top(&self, name: &str) -> Option<&Method> {
        self.chains.get(name).and_then(MethodChain::top)
    }

    pub(crate) fn top_mut(&mut self, name: &str) -> Option<&mut Method> {
        self.chains.get_mut(name).and_then(MethodChain::top_mut)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.top(name).is_some()
    }

    /// Pushes `method` on top of `name`'s chain.
    pub(crate) fn install(&mut self, name: &str, method: Method) {
        self.chains.entry(name.to_string()).or_default().push(method);
    }

    pub(crate) fn preserve(&mut self, extension: &str, name: &str, method: Method) {
        self.preserved
            .insert((extension.to_string(), name.to_string()), method);
    }

    pub fn preserved(&self, extension: &str, name: &str) -> Option<&Method> {
        self.preserved
            .get(&(extension.to_string(), name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MethodChain)> {
        self.chains.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn preserved_keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.preserved.keys().map(|(e, n)| (e.as_str(), n.as_str()))
    }
}
