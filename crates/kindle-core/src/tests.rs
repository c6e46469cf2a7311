#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::binding::*;
    use crate::kind::*;
    use crate::method::*;
    use crate::mixin::*;
    use crate::object::*;
    use crate::observer::*;
    use crate::value::*;

    type Log = Rc<RefCell<Vec<String>>>;

    fn counter_kind() -> Rc<Kind> {
        Kind::builder("Counter").published("count", 0).build()
    }

    fn recorder(log: &Log, tag: &'static str) -> Observer {
        let log = log.clone();
        Observer::new(move |_, prop, old, new| {
            log.borrow_mut().push(format!("{tag}:{prop}:{old}->{new}"));
        })
    }

    #[test]
    fn test_duplicate_observer_fires_once() {
        let c = counter_kind().create();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let obs = Observer::new(move |_, _, _, _| h.set(h.get() + 1));

        c.add_observer("count", obs.clone());
        c.add_observer("count", obs);
        assert_eq!(c.observer_count("count"), 1);

        c.set("count", 1).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_remove_unregistered_observer_is_noop() {
        let c = counter_kind().create();
        let log: Log = Default::default();
        c.add_observer("count", recorder(&log, "a"));

        assert!(!c.remove_observer("count", &recorder(&log, "b")));
        assert!(!c.remove_observer("missing", &Observer::Noop));
        assert_eq!(c.observer_count("count"), 1);

        c.set("count", 1).unwrap();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_remove_observer_stops_delivery() {
        let c = counter_kind().create();
        let log: Log = Default::default();
        let obs = c.add_observer("count", recorder(&log, "a"));

        assert!(c.remove_observer("count", &obs));
        c.set("count", 1).unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_remove_all_observers() {
        let c = counter_kind().create();
        let log: Log = Default::default();
        c.add_observer("count", recorder(&log, "a"));
        c.add_observer("other", recorder(&log, "b"));

        c.remove_all_observers();
        assert_eq!(c.observer_count("count"), 0);
        assert_eq!(c.observer_count("other"), 0);

        c.set("count", 3).unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_unchanged_write_does_not_notify_unless_forced() {
        let c = counter_kind().create();
        let log: Log = Default::default();
        c.add_observer("count", recorder(&log, "o"));

        assert!(!c.set("count", 0).unwrap());
        assert!(log.borrow().is_empty());

        assert!(!c.set_forced("count", 0).unwrap());
        assert_eq!(*log.borrow(), vec!["o:count:0->0"]);
    }

    #[test]
    fn test_observers_then_change_hook() {
        let log: Log = Default::default();
        let hook_log = log.clone();
        let kind = Kind::builder("Counter")
            .published("count", 0)
            .method("count_changed", move |_, args| {
                hook_log
                    .borrow_mut()
                    .push(format!("hook:{}->{}", args[0], args[1]));
                Value::Null
            })
            .build();
        let c = kind.create();
        c.add_observer("count", recorder(&log, "first"));
        c.add_observer("count", recorder(&log, "second"));

        c.set("count", 4).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["first:count:0->4", "second:count:0->4", "hook:0->4"]
        );
    }

    #[test]
    fn test_suspended_notifications_coalesce_to_latest_args() {
        let log: Log = Default::default();
        let hook_log = log.clone();
        let kind = Kind::builder("Counter")
            .published("count", 0)
            .method("count_changed", move |_, args| {
                hook_log
                    .borrow_mut()
                    .push(format!("hook:{}->{}", args[0], args[1]));
                Value::Null
            })
            .build();
        let c = kind.create();
        c.add_observer("count", recorder(&log, "o"));

        c.stop_notifications();
        assert!(!c.notifications_enabled());
        c.set("count", 1).unwrap();
        c.set("count", 2).unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(c.pending_notifications(), vec!["count"]);

        c.start_notifications();
        assert!(c.notifications_enabled());
        assert_eq!(*log.borrow(), vec!["o:count:1->2", "hook:1->2"]);
        assert!(c.pending_notifications().is_empty());
    }

    #[test]
    fn test_suspended_distinct_props_each_flush_once() {
        let kind = Kind::builder("Pair")
            .published("left", 0)
            .published("right", 0)
            .build();
        let p = kind.create();
        let log: Log = Default::default();
        p.add_observer("left", recorder(&log, "l"));
        p.add_observer("right", recorder(&log, "r"));

        p.stop_notifications();
        p.set("left", 1).unwrap();
        p.set("right", 1).unwrap();
        p.start_notifications();

        assert_eq!(*log.borrow(), vec!["l:left:0->1", "r:right:0->1"]);
    }

    #[test]
    fn test_stop_notifications_discards_queue() {
        let c = counter_kind().create();
        let log: Log = Default::default();
        c.add_observer("count", recorder(&log, "o"));

        c.stop_notifications();
        c.set("count", 1).unwrap();
        c.stop_notifications();
        c.start_notifications();

        assert!(log.borrow().is_empty());
        assert_eq!(c.get("count"), Value::Int(1));
    }

    #[test]
    fn test_forced_flag_is_queued() {
        let c = counter_kind().create();
        c.add_observer("count", Observer::Noop);

        c.stop_notifications();
        c.set_forced("count", 0).unwrap();
        let forced = c.0.queue.borrow().args("count").map(|a| a.force);
        assert_eq!(forced, Some(true));
        c.start_notifications();
    }

    #[test]
    fn test_computed_renotified_on_source_change() {
        let person = Kind::builder("Person")
            .published("first", "Jane")
            .published("last", "Doe")
            .computed("full", ["first", "last"], |call, _| {
                let me = call.instance();
                Value::from(format!("{} {}", me.get("first"), me.get("last")))
            })
            .build();
        let p = person.create();
        let log: Log = Default::default();
        p.add_observer("full", recorder(&log, "full"));

        p.set("first", "John").unwrap();
        assert_eq!(*log.borrow(), vec!["full:full:null->null"]);
        assert_eq!(p.get("full"), Value::from("John Doe"));
        assert_eq!(
            p.computed_properties(),
            vec![("full".to_string(), vec!["first".to_string(), "last".to_string()])]
        );
    }

    #[test]
    fn test_computed_cycle_terminates() {
        let kind = Kind::builder("Loop")
            .computed("a", ["b"], |_, _| Value::Null)
            .computed("b", ["a"], |_, _| Value::Null)
            .build();
        let inst = kind.create();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        inst.add_observer("a", Observer::new(move |_, _, _, _| h.set(h.get() + 1)));

        inst.notify_observers("a", &Value::Null, &Value::Null, true);
        assert!(hits.get() >= 1);
    }

    #[test]
    fn test_computed_deps_carried_over_on_compose() {
        let kind = Kind::builder("Rect")
            .published("w", 2)
            .published("h", 3)
            .computed("area", ["w", "h"], |call, _| {
                let me = call.instance();
                let w = me.get("w").as_int().unwrap_or_default();
                let h = me.get("h").as_int().unwrap_or_default();
                Value::from(w * h)
            })
            .build();
        let r = kind.create();

        r.compose_method(
            "area",
            Method::computed(Vec::<String>::new(), |call, args| {
                let base = call.inherited(args).as_int().unwrap_or_default();
                Value::from(base + 1)
            }),
        );

        let area = r.method("area").unwrap();
        assert_eq!(area.deps(), ["w".to_string(), "h".to_string()]);
        assert_eq!(r.get("area"), Value::Int(7));
    }

    #[test]
    fn test_extend_twice_inherited_reaches_first() {
        let kind = Kind::builder("Widget").build();
        let w = kind.create();

        w.extend([Extension::new().method("render", |call, args| {
            assert!(!call.has_inherited());
            assert_eq!(call.inherited(args), Value::Null);
            Value::from("first")
        })]);
        w.extend([Extension::new().method("render", |call, args| call.inherited(args))]);

        assert_eq!(w.method_depth("render"), 2);
        assert_eq!(w.call("render", &[]), Value::from("first"));
    }

    #[test]
    fn test_extension_copies_props_without_notifying() {
        let w = counter_kind().create();
        let log: Log = Default::default();
        w.add_observer("title", recorder(&log, "t"));

        w.extend([Extension::new().prop("title", "hello")]);
        assert_eq!(w.get("title"), Value::from("hello"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_preserve_keeps_visible_method() {
        let kind = Kind::builder("Widget")
            .method("render", |_, _| Value::from("base"))
            .build();
        let w = kind.create();

        w.extend([Extension::named("Fancy")
            .preserve()
            .method("render", |call, args| {
                Value::from(format!("fancy+{}", call.inherited(args)))
            })
            .method("sparkle", |_, _| Value::from("*"))]);

        assert_eq!(w.call("render", &[]), Value::from("base"));
        assert_eq!(w.method_depth("render"), 1);
        assert_eq!(
            w.call_preserved("Fancy", "render", &[]),
            Some(Value::from("fancy+base"))
        );
        // Nothing to shadow, so it is installed normally.
        assert_eq!(w.call("sparkle", &[]), Value::from("*"));
        assert_eq!(w.call_preserved("Fancy", "sparkle", &[]), None);
    }

    #[test]
    fn test_preserve_all_and_same_name_replacement() {
        let w = Kind::builder("Widget").build().create();

        w.extend([Extension::named("A")
            .preserve_all()
            .method("fresh", |_, _| Value::from(1))]);
        assert!(!w.has_method("fresh"));
        assert_eq!(w.call_preserved("A", "fresh", &[]), Some(Value::from(1)));

        w.extend([
            Extension::named("A")
                .preserve_all()
                .method("fresh", |_, _| Value::from(2)),
            Extension::named("B")
                .preserve_all()
                .method("fresh", |_, _| Value::from(3)),
        ]);
        assert_eq!(w.call_preserved("A", "fresh", &[]), Some(Value::from(2)));
        assert_eq!(w.call_preserved("B", "fresh", &[]), Some(Value::from(3)));
    }

    #[test]
    fn test_unnamed_preserve_composes() {
        let kind = Kind::builder("Widget")
            .method("render", |_, _| Value::from("base"))
            .build();
        let w = kind.create();

        w.extend([Extension::new()
            .preserve()
            .method("render", |_, _| Value::from("new"))]);
        assert_eq!(w.call("render", &[]), Value::from("new"));
    }

    struct Tally;

    impl Mixin for Tally {
        fn name(&self) -> &str {
            "Tally"
        }

        fn apply(&self, target: &Instance) {
            let n = target.get("applied").as_int().unwrap_or_default();
            target.set("applied", n + 1).unwrap();
        }
    }

    #[test]
    fn test_named_mixin_applies_once() {
        let kind = Kind::builder("Thing").mixin(Tally).build();
        let t = kind.create();
        assert_eq!(t.get("applied"), Value::Int(1));
        assert!(t.has_mixin("Tally"));

        t.extend([Extend::mixin(Tally)]);
        assert_eq!(t.get("applied"), Value::Int(1));
        assert_eq!(t.applied_mixins(), vec!["Tally"]);
    }

    #[test]
    fn test_extension_as_mixin_is_recorded() {
        let t = Kind::builder("Thing").build().create();
        let loud = Extension::named("Loud")
            .as_mixin()
            .method("shout", |_, _| Value::from("HEY"));

        t.extend([loud.clone(), loud]);
        assert!(t.has_mixin("Loud"));
        assert_eq!(t.method_depth("shout"), 1);
        assert_eq!(t.call("shout", &[]), Value::from("HEY"));
    }

    #[test]
    fn test_mixins_see_computed_setup() {
        struct Probe;
        impl Mixin for Probe {
            fn name(&self) -> &str {
                "Probe"
            }
            fn apply(&self, target: &Instance) {
                let wired = target.observer_count("w") > 0;
                target.set("wired", wired).unwrap();
            }
        }

        let kind = Kind::builder("Box")
            .computed("area", ["w"], |_, _| Value::Null)
            .mixin(Probe)
            .build();
        assert_eq!(kind.create().get("wired"), Value::Bool(true));
    }

    #[test]
    fn test_generated_accessors() {
        let c = counter_kind().create();
        assert!(c.method("get_count").unwrap().is_generated_accessor());
        assert!(c.method("set_count").unwrap().is_generated_accessor());

        assert_eq!(c.call("set_count", &[Value::from(5)]), Value::Bool(true));
        assert_eq!(c.call("get_count", &[]), Value::Int(5));
    }

    #[test]
    fn test_user_accessor_is_overloaded() {
        let kind = Kind::builder("Counter")
            .method("get_count", |call, _| {
                let v = call.instance().get("count").as_int().unwrap_or_default();
                Value::from(v * 10)
            })
            .published("count", 2)
            .build();

        let methods = kind.prototype().methods();
        assert!(methods.top("get_count").unwrap().is_overloaded());
        assert!(methods.top("set_count").unwrap().is_generated_accessor());
        assert_eq!(kind.create().call("get_count", &[]), Value::Int(20));
    }

    #[test]
    fn test_republish_keeps_generated_accessor() {
        let mut proto = Prototype::default();
        assert!(publish("x", Value::from(1), &mut proto));
        assert!(publish("x", Value::from(2), &mut proto));

        let getter = proto.methods().top("get_x").unwrap();
        assert!(getter.is_generated_accessor());
        assert!(!getter.is_overloaded());
        assert_eq!(proto.props().get("x"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_publish_skips_computed_property() {
        let kind = Kind::builder("Label")
            .computed("text", ["raw"], |call, _| {
                Value::from(format!("<{}>", call.instance().get("raw")))
            })
            .published("raw", "a")
            .published("text", "default")
            .build();

        assert_eq!(kind.published(), ["raw".to_string()]);
        assert!(!kind.prototype().props().contains_key("text"));
        assert!(!kind.prototype().methods().contains("get_text"));

        let label = kind.create();
        assert_eq!(label.get("text"), Value::from("<a>"));
    }

    #[test]
    fn test_subkind_stacks_on_base_methods() {
        let base = Kind::builder("Base")
            .published("size", 1)
            .method("describe", |_, _| Value::from("base"))
            .build();
        let derived = Kind::builder("Derived")
            .extends(&base)
            .method("describe", |call, args| {
                Value::from(format!("derived<{}>", call.inherited(args)))
            })
            .build();

        let d = derived.create();
        assert_eq!(d.call("describe", &[]), Value::from("derived<base>"));
        assert_eq!(d.get("size"), Value::Int(1));
        assert_eq!(derived.published(), ["size".to_string()]);
        assert_eq!(base.create().call("describe", &[]), Value::from("base"));
    }

    #[test]
    fn test_missing_observer_method_becomes_noop() {
        let c = counter_kind().create();
        let stored = c.add_observer("count", Observer::method(&c, "nope"));

        assert!(stored.is_noop());
        assert_eq!(c.observer_count("count"), 1);
        c.set("count", 1).unwrap();
    }

    #[test]
    fn test_observer_method_runs_on_context() {
        let watcher = Kind::builder("Watcher")
            .method("on_value", |call, args| {
                call.instance().set("seen", args[2].clone()).unwrap();
                Value::Null
            })
            .build()
            .create();
        let c = counter_kind().create();

        c.add_observer("count", Observer::method(&watcher, "on_value"));
        c.set("count", 3).unwrap();
        assert_eq!(watcher.get("seen"), Value::Int(3));
    }

    #[test]
    fn test_declarative_observer_is_wired() {
        let kind = Kind::builder("Counter")
            .published("count", 0)
            .prop("hits", 0)
            .observer("watch", ["count"], |call, args| {
                let me = call.instance();
                assert_eq!(args[0], Value::from("count"));
                let n = me.get("hits").as_int().unwrap_or_default();
                me.set("hits", n + 1).unwrap();
                Value::Null
            })
            .build();
        let c = kind.create();

        c.set("count", 1).unwrap();
        c.set("count", 2).unwrap();
        assert_eq!(c.get("hits"), Value::Int(2));
    }

    #[test]
    fn test_nested_path_notifies_full_path() {
        let c = counter_kind().create();
        let log: Log = Default::default();
        c.add_observer("style.color", recorder(&log, "s"));

        c.set("style.color", "red").unwrap();
        assert_eq!(c.get("style.color"), Value::from("red"));
        assert_eq!(*log.borrow(), vec!["s:style.color:null->red"]);
        assert!(c.set("count.deep", 1).is_err());
    }

    #[derive(Default)]
    struct Counters {
        created: Cell<u32>,
        refreshed: Rc<Cell<u32>>,
        destroyed: Rc<Cell<u32>>,
    }

    struct CountingBinding {
        refreshed: Rc<Cell<u32>>,
        destroyed: Rc<Cell<u32>>,
    }

    impl Binding for CountingBinding {
        fn refresh(&self) {
            self.refreshed.set(self.refreshed.get() + 1);
        }

        fn destroy(&self) {
            self.destroyed.set(self.destroyed.get() + 1);
        }
    }

    impl BindingFactory for Counters {
        fn create(&self, options: BindingOptions, spec: BindingSpec) -> BindingRef {
            assert!(options.auto_connect);
            assert!(options.owner.upgrade().is_some());
            assert_eq!(spec.from.as_deref(), Some("b"));
            self.created.set(self.created.get() + 1);
            Rc::new(CountingBinding {
                refreshed: self.refreshed.clone(),
                destroyed: self.destroyed.clone(),
            })
        }
    }

    #[test]
    fn test_clear_bindings_destroys_each_once() {
        let c = counter_kind().create();
        let counters = Counters::default();
        for _ in 0..3 {
            c.binding_with(&counters, [BindingSpec::new().from("a"), BindingSpec::new().from("b")]);
        }
        assert_eq!(counters.created.get(), 3);
        assert_eq!(c.bindings().len(), 3);

        c.refresh_bindings();
        assert_eq!(counters.refreshed.get(), 3);
        assert_eq!(c.bindings().len(), 3);

        c.clear_bindings();
        assert!(c.bindings().is_empty());
        assert_eq!(counters.destroyed.get(), 3);

        c.clear_bindings();
        assert_eq!(counters.destroyed.get(), 3);
    }

    #[test]
    fn test_clear_bindings_in_subset() {
        let c = counter_kind().create();
        let counters = Counters::default();
        let first = c.binding_with(&counters, [BindingSpec::new().from("b")]);
        let second = c.binding_with(&counters, [BindingSpec::new().from("b")]);

        let mut subset = vec![first];
        c.clear_bindings_in(&mut subset);
        assert!(subset.is_empty());
        assert_eq!(counters.destroyed.get(), 1);

        let remaining = c.bindings();
        assert_eq!(remaining.len(), 1);
        assert!(same_binding(&remaining[0], &second));
    }

    #[test]
    fn test_remove_binding_by_identity() {
        let c = counter_kind().create();
        let counters = Counters::default();
        let b = c.binding_with(&counters, [BindingSpec::new().from("b")]);

        assert!(c.remove_binding(&b));
        assert!(!c.remove_binding(&b));
        assert!(c.bindings().is_empty());
        assert_eq!(counters.destroyed.get(), 0);
    }

    #[test]
    fn test_binding_spec_merge_right_wins() {
        let merged = BindingSpec::new()
            .from("a")
            .to("x")
            .merge(BindingSpec::new().from("b").one_way(true));
        assert_eq!(merged.from.as_deref(), Some("b"));
        assert_eq!(merged.to.as_deref(), Some("x"));
        assert_eq!(merged.one_way, Some(true));
    }

    #[test]
    fn test_two_way_property_binding() {
        let kind = Kind::builder("Field").published("value", 0).build();
        let a = kind.create();
        let b = kind.create();
        a.set("value", 5).unwrap();

        let binding = a.binding([BindingSpec::new().from("value").target(&b)]);
        assert_eq!(b.get("value"), Value::Int(5));

        a.set("value", 6).unwrap();
        assert_eq!(b.get("value"), Value::Int(6));
        b.set("value", 9).unwrap();
        assert_eq!(a.get("value"), Value::Int(9));

        binding.destroy();
        assert!(binding.is_destroyed());
        assert!(a.bindings().is_empty());
        b.set("value", 10).unwrap();
        assert_eq!(a.get("value"), Value::Int(9));
    }

    #[test]
    fn test_one_way_binding_and_refresh() {
        let kind = Kind::builder("Field").published("value", 0).build();
        let a = kind.create();
        let b = kind.create();

        a.binding([BindingSpec::new()
            .from("value")
            .to("mirror")
            .target(&b)
            .one_way(true)]);
        a.set("value", 1).unwrap();
        assert_eq!(b.get("mirror"), Value::Int(1));

        b.set("mirror", 2).unwrap();
        assert_eq!(a.get("value"), Value::Int(1));

        a.refresh_bindings();
        assert_eq!(b.get("mirror"), Value::Int(1));
    }

    #[test]
    fn test_binding_follows_computed_source() {
        let person = Kind::builder("Person")
            .published("first", "Jane")
            .computed("greeting", ["first"], |call, _| {
                Value::from(format!("hi {}", call.instance().get("first")))
            })
            .build();
        let p = person.create();
        let view = Kind::builder("View").build().create();

        p.binding([BindingSpec::new()
            .from("greeting")
            .to("text")
            .target(&view)
            .one_way(true)]);
        assert_eq!(view.get("text"), Value::from("hi Jane"));

        p.set("first", "Ann").unwrap();
        assert_eq!(view.get("text"), Value::from("hi Ann"));
    }

    #[test]
    fn test_declared_binding_on_kind() {
        let kind = Kind::builder("Mirror")
            .published("value", 3)
            .binding(BindingSpec::new().from("value").to("shadow").one_way(true))
            .build();
        let m = kind.create();
        assert_eq!(m.get("shadow"), Value::Int(3));
        m.set("value", 4).unwrap();
        assert_eq!(m.get("shadow"), Value::Int(4));
    }

    #[test]
    fn test_destroy_tears_down() {
        let kind = Kind::builder("Field").published("value", 0).build();
        let a = kind.create();
        let b = kind.create();
        a.binding([BindingSpec::new().from("value").target(&b)]);
        a.add_observer("value", Observer::Noop);

        a.destroy();
        a.destroy();
        assert!(a.is_destroyed());
        assert!(a.bindings().is_empty());
        assert_eq!(a.observer_count("value"), 0);
        assert_eq!(b.observer_count("value"), 0);
    }

    #[test]
    fn test_instance_count_increments() {
        let kind = counter_kind();
        let before = instance_count();
        let first = kind.create();
        let second = kind.create();

        assert!(instance_count() >= before + 2);
        assert!(second.id() > first.id());
        assert_eq!(first.kind_name(), "Counter");
        assert!(first.describe().starts_with("Counter#"));
    }

    #[test]
    fn test_weak_instance_identity() {
        let c = counter_kind().create();
        let weak = c.downgrade();
        assert!(weak.is(&c));
        assert!(weak.upgrade().is_some_and(|i| i.ptr_eq(&c)));

        drop(c);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_plain_override_keeps_property_computed() {
        let person = Kind::builder("Person")
            .published("first", "Jane")
            .computed("full", ["first"], |call, _| {
                Value::from(format!("{}!", call.instance().get("first")))
            })
            .build();
        let p = person.create();

        p.extend([Extension::new().method("full", |call, args| call.inherited(args))]);

        assert!(p.is_computed("full"));
        assert_eq!(p.method("full").unwrap().deps(), ["first".to_string()]);
        assert_eq!(p.get("full"), Value::from("Jane!"));

        let log: Log = Default::default();
        p.add_observer("full", recorder(&log, "full"));
        p.set("first", "Ann").unwrap();
        assert_eq!(*log.borrow(), vec!["full:full:null->null"]);
        assert_eq!(p.get("full"), Value::from("Ann!"));
    }

    #[test]
    fn test_composed_computed_own_deps_win() {
        let kind = Kind::builder("Rect")
            .published("w", 2)
            .published("h", 3)
            .computed("area", ["w", "h"], |_, _| Value::Null)
            .build();
        let r = kind.create();

        r.compose_method("area", Method::computed(["w"], |_, _| Value::Null));
        assert_eq!(r.method("area").unwrap().deps(), ["w".to_string()]);
    }

    #[test]
    fn test_destroyed_binding_ignores_queued_notification() {
        let kind = Kind::builder("Field").published("x", 0).build();
        let a = kind.create();
        let b = kind.create();
        let binding = a.binding([BindingSpec::new()
            .from("x")
            .to("y")
            .target(&b)
            .one_way(true)]);
        b.set("y", Value::Null).unwrap();

        a.stop_notifications();
        a.set("x", 5).unwrap();
        binding.destroy();
        a.start_notifications();

        assert!(binding.is_destroyed());
        assert_eq!(b.get("y"), Value::Null);
    }

    #[test]
    fn test_dropped_owner_unhooks_binding() {
        let kind = Kind::builder("Field").published("value", 0).build();
        let b = kind.create();
        {
            let a = kind.create();
            a.binding([BindingSpec::new().from("value").target(&b)]);
            assert_eq!(b.observer_count("value"), 1);
        }
        assert_eq!(b.observer_count("value"), 0);
        b.set("value", 3).unwrap();
    }

    #[test]
    fn test_property_access_prefers_user_accessors() {
        let kind = Kind::builder("Counter")
            .method("get_count", |call, _| {
                let v = call.instance().get("count").as_int().unwrap_or_default();
                Value::from(v * 10)
            })
            .method("set_count", |call, args| {
                let v = args[0].as_int().unwrap_or_default();
                Value::from(call.instance().set("count", v.max(0)).unwrap_or(false))
            })
            .published("count", 2)
            .published("step", 1)
            .build();
        let c = kind.create();

        assert_eq!(c.get("count"), Value::Int(2));
        assert_eq!(c.get_property("count"), Value::Int(20));

        assert!(c.set_property("count", -4).unwrap());
        assert_eq!(c.get("count"), Value::Int(0));
        assert!(!c.set_property("count", -1).unwrap());
        assert!(c.set_property("count", 3).unwrap());
        assert_eq!(c.get_property("count"), Value::Int(30));

        // Generated accessors go straight to the property bag.
        assert!(c.set_property("step", 5).unwrap());
        assert_eq!(c.get_property("step"), Value::Int(5));
    }
}
