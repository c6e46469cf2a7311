//! Kind descriptors and the published-property accessor generator.
//!
//! A [`Kind`] is the declarative recipe for instances: default property
//! values, methods, computed properties, declarative observers, binding
//! specs and mixins. Kinds may extend a base kind, in which case their
//! methods stack on top of the base's chains.

use std::rc::Rc;

use crate::binding::BindingSpec;
use crate::method::{Call, Method, MethodFlags, MethodTable};
use crate::mixin::Mixin;
use crate::object::Instance;
use crate::path::PathError;
use crate::value::{Map, Value};

/// Default property values and methods shared by every instance of a kind.
#[derive(Clone, Debug, Default)]
pub struct Prototype {
    pub(crate) props: Map,
    pub(crate) methods: MethodTable,
}

impl Prototype {
    pub fn props(&self) -> &Map {
        &self.props
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }
}

pub fn getter_name(prop: &str) -> String {
    format!("get_{prop}")
}

pub fn setter_name(prop: &str) -> String {
    format!("set_{prop}")
}

/// Installs `name` on `proto` with `default` and generates `get_<name>` /
/// `set_<name>` unless the user already supplied them, in which case the
/// user's accessor is flagged `OVERLOADED`.
///
/// A computed property of the same name is never published over; returns
/// `false` in that case.
pub fn publish(name: &str, default: Value, proto: &mut Prototype) -> bool {
    if proto.methods.top(name).is_some_and(Method::is_computed) {
        log::debug!("`{name}` is a computed property; not publishing a default over it");
        return false;
    }
    proto.props.insert(name.to_string(), default);

    let getter = getter_name(name);
    match proto.methods.top_mut(&getter) {
        Some(existing) => {
            if !existing.flags().contains(MethodFlags::ACCESSOR) {
                existing.insert_flags(MethodFlags::OVERLOADED);
            }
        }
        None => {
            let prop = name.to_string();
            let generated =
                Method::new(move |call: &Call<'_>, _args: &[Value]| call.instance().get(&prop))
                    .with_flags(MethodFlags::ACCESSOR);
            proto.methods.install(&getter, generated);
        }
    }

    let setter = setter_name(name);
    match proto.methods.top_mut(&setter) {
        Some(existing) => {
            if !existing.flags().contains(MethodFlags::ACCESSOR) {
                existing.insert_flags(MethodFlags::OVERLOADED);
            }
        }
        None => {
            let prop = name.to_string();
            let generated = Method::new(move |call: &Call<'_>, args: &[Value]| {
                let value = args.first().cloned().unwrap_or_default();
                match call.instance().set(&prop, value) {
                    Ok(changed) => Value::Bool(changed),
                    Err(err) => {
                        call.instance().warn(format_args!("{err}"));
                        Value::Bool(false)
                    }
                }
            })
            .with_flags(MethodFlags::ACCESSOR);
            proto.methods.install(&setter, generated);
        }
    }
    true
}

impl Instance {
    /// Reads a published property through `get_<name>` when the visible
    /// getter is not the generated one, otherwise through
    /// [`Instance::get`].
    pub fn get_property(&self, name: &str) -> Value {
        let getter = getter_name(name);
        if self.user_accessor(&getter) {
            return self.call(&getter, &[]);
        }
        self.get(name)
    }

    /// Writes a published property through `set_<name>` when the visible
    /// setter is not the generated one, otherwise through
    /// [`Instance::set`]. A user setter reports a change by returning
    /// `Bool(true)`.
    pub fn set_property(&self, name: &str, value: impl Into<Value>) -> Result<bool, PathError> {
        let value = value.into();
        let setter = setter_name(name);
        if self.user_accessor(&setter) {
            return Ok(self.call(&setter, &[value]).as_bool().unwrap_or(false));
        }
        self.set(name, value)
    }

    fn user_accessor(&self, name: &str) -> bool {
        self.method(name).is_some_and(|m| !m.is_generated_accessor())
    }
}

pub struct Kind {
    name: String,
    prototype: Prototype,
    published: Vec<String>,
    bindings: Vec<BindingSpec>,
    mixins: Vec<Rc<dyn Mixin>>,
}

impl Kind {
    pub fn builder(name: impl Into<String>) -> KindBuilder {
        KindBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prototype(&self) -> &Prototype {
        &self.prototype
    }

    /// Names of the properties that got generated accessors.
    pub fn published(&self) -> &[String] {
        &self.published
    }

    pub fn bindings(&self) -> &[BindingSpec] {
        &self.bindings
    }

    pub fn mixins(&self) -> &[Rc<dyn Mixin>] {
        &self.mixins
    }

    pub fn create(self: &Rc<Self>) -> Instance {
        Instance::new(self)
    }
}

impl std::fmt::Debug for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kind")
            .field("name", &self.name)
            .field("published", &self.published)
            .field("bindings", &self.bindings.len())
            .field("mixins", &self.mixins.len())
            .finish()
    }
}

pub struct KindBuilder {
    name: String,
    base: Option<Rc<Kind>>,
    props: Vec<(String, Value)>,
    published: Vec<(String, Value)>,
    methods: Vec<(String, Method)>,
    bindings: Vec<BindingSpec>,
    mixins: Vec<Rc<dyn Mixin>>,
}

impl KindBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            props: Vec::new(),
            published: Vec::new(),
            methods: Vec::new(),
            bindings: Vec::new(),
            mixins: Vec::new(),
        }
    }

    /// Inherit the base kind's prototype, bindings and mixins.
    pub fn extends(mut self, base: &Rc<Kind>) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Plain default value, without generated accessors.
    pub fn prop(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.props.push((name.into(), default.into()));
        self
    }

    pub fn published(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.published.push((name.into(), default.into()));
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

    pub fn computed<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        deps: impl IntoIterator<Item = S>,
        body: impl Fn(&Call<'_>, &[Value]) -> Value + 'static,
    ) -> Self {
        self.methods
            .push((name.into(), Method::computed(deps, body)));
        self
    }

    pub fn observer<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        props: impl IntoIterator<Item = S>,
        body: impl Fn(&Call<'_>, &[Value]) -> Value + 'static,
    ) -> Self {
        self.methods
            .push((name.into(), Method::observer(props, body)));
        self
    }

    pub fn binding(mut self, spec: BindingSpec) -> Self {
        self.bindings.push(spec);
        self
    }

    pub fn mixin(mut self, mixin: impl Mixin + 'static) -> Self {
        self.mixins.push(Rc::new(mixin));
        self
    }

    pub fn build(self) -> Rc<Kind> {
        let (mut prototype, mut published, mut bindings, mut mixins) = match &self.base {
            Some(base) => (
                base.prototype.clone(),
                base.published.clone(),
                base.bindings.clone(),
                base.mixins.clone(),
            ),
            None => Default::default(),
        };

        for (name, value) in self.props {
            prototype.props.insert(name, value);
        }
        // Methods first so that publishing sees user accessors and
        // computed properties regardless of declaration order.
        for (name, method) in self.methods {
            prototype.methods.install(&name, method);
        }
        for (name, default) in self.published {
            if publish(&name, default, &mut prototype) && !published.contains(&name) {
                published.push(name);
            }
        }
        bindings.extend(self.bindings);
        mixins.extend(self.mixins);

        log::trace!(
            "built kind `{}` ({} published, {} bindings, {} mixins)",
            self.name,
            published.len(),
            bindings.len(),
            mixins.len()
        );

        Rc::new(Kind {
            name: self.name,
            prototype,
            published,
            bindings,
            mixins,
        })
    }
}
