//! # Kinds, Properties, and Observers
//!
//! Kindle's object model is built from a handful of pieces:
//!
//! - [`Kind`] — declarative recipe for instances (published properties,
//!   methods, computed properties, bindings, mixins).
//! - [`Instance`] — a runtime object with a property bag and method chains.
//! - [`Observer`] — callbacks fired when a property changes.
//! - [`Binding`] — keeps properties of two instances in sync.
//! - [`Mixin`] / [`Extension`] — behaviour composed onto an instance.
//!
//! ## Published properties
//!
//! Publishing a property installs a default value plus generated
//! `get_<name>` / `set_<name>` methods:
//!
//! ```rust
//! use kindle_core::*;
//!
//! let button = Kind::builder("Button").published("label", "OK").build();
//! let b = button.create();
//!
//! b.call("set_label", &[Value::from("Cancel")]);
//! assert_eq!(b.call("get_label", &[]), Value::from("Cancel"));
//! ```
//!
//! ## Observers and change hooks
//!
//! Writes that change a value notify the property's observers in
//! registration order, then the `<prop>_changed` method if the kind has one:
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use kindle_core::*;
//!
//! let seen = Rc::new(Cell::new(0));
//! let kind = Kind::builder("Slider").published("value", 0).build();
//! let slider = kind.create();
//!
//! let s = seen.clone();
//! slider.add_observer("value", Observer::new(move |_, _, _, new| {
//!     s.set(new.as_int().unwrap_or_default());
//! }));
//! slider.set("value", 7).unwrap();
//! assert_eq!(seen.get(), 7);
//! ```
//!
//! Wrap a burst of writes in `stop_notifications` / `start_notifications`
//! to coalesce them: each observer then runs once, with the newest values.
//!
//! ## Computed properties
//!
//! A computed property is evaluated on read. When one of its sources
//! changes, its observers are told to recompute (with `Null` values):
//!
//! ```rust
//! use kindle_core::*;
//!
//! let person = Kind::builder("Person")
//!     .published("first", "Jane")
//!     .published("last", "Doe")
//!     .computed("full", ["first", "last"], |call, _| {
//!         let me = call.instance();
//!         Value::from(format!("{} {}", me.get("first"), me.get("last")))
//!     })
//!     .build();
//!
//! let p = person.create();
//! assert_eq!(p.get("full"), Value::from("Jane Doe"));
//! ```
//!
//! ## Extending instances
//!
//! Methods added through [`Instance::extend`] stack on top of existing ones;
//! the new body reaches the old one via [`Call::inherited`]:
//!
//! ```rust
//! use kindle_core::*;
//!
//! let kind = Kind::builder("Greeter")
//!     .method("greet", |_, _| Value::from("hello"))
//!     .build();
//! let g = kind.create();
//!
//! g.extend([Extension::new().method("greet", |call, args| {
//!     Value::from(format!("{}, world", call.inherited(args)))
//! })]);
//! assert_eq!(g.call("greet", &[]), Value::from("hello, world"));
//! ```

pub mod binding;
pub mod computed;
pub mod kind;
pub mod logging;
pub mod method;
pub mod mixin;
pub mod object;
pub mod observer;
pub mod path;
pub mod prelude;
pub mod queue;
pub mod tests;
pub mod value;

pub use binding::*;
pub use kind::*;
pub use logging::*;
pub use method::*;
pub use mixin::*;
pub use object::*;
pub use observer::*;
pub use path::PathError;
pub use queue::*;
pub use value::*;
