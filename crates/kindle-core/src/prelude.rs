pub use crate::binding::{
    Binding, BindingFactory, BindingOptions, BindingRef, BindingSpec, PropertyBinding,
    PropertyBindingFactory,
};
pub use crate::kind::{Kind, KindBuilder, publish};
pub use crate::method::{Call, Method, MethodFlags};
pub use crate::mixin::{Extend, Extension, Mixin};
pub use crate::object::{Instance, WeakInstance, instance_count};
pub use crate::observer::Observer;
pub use crate::path::PathError;
pub use crate::value::{Map, Value};
