use std::rc::Rc;

use kindle_core::prelude::*;
use kindle_devtools::Inspector;

/// Logs every write to `count`.
struct Audit;

impl Mixin for Audit {
    fn name(&self) -> &str {
        "Audit"
    }

    fn apply(&self, target: &Instance) {
        target.add_observer(
            "count",
            Observer::new(|inst, prop, old, new| {
                log::info!("[audit] {}.{prop}: {old} -> {new}", inst.describe());
            }),
        );
    }
}

fn counter_kind() -> Rc<Kind> {
    Kind::builder("Counter")
        .published("count", 0)
        .published("step", 1)
        .computed("label", ["count"], |call, _| {
            Value::from(format!("Count = {}", call.instance().get("count")))
        })
        .method("increment", |call, _| {
            let me = call.instance();
            let count = me.get("count").as_int().unwrap_or_default();
            let step = me.get("step").as_int().unwrap_or(1);
            me.call("set_count", &[Value::from(count + step)])
        })
        .method("count_changed", |call, args| {
            log::debug!("{} changed {} -> {}", call.instance().describe(), args[0], args[1]);
            Value::Null
        })
        .mixin(Audit)
        .build()
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let kind = counter_kind();
    let counter = kind.create();
    let display = Kind::builder("Display").build().create();

    counter.binding([BindingSpec::new()
        .from("label")
        .to("text")
        .target(&display)
        .one_way(true)]);
    println!("{}", display.get("text"));

    counter.call("increment", &[]);
    println!("{}", display.get("text"));

    // Burst of writes: observers and the change hook run once at the end.
    counter.stop_notifications();
    for _ in 0..5 {
        counter.call("increment", &[]);
    }
    println!("while paused: {}", display.get("text"));
    counter.start_notifications();
    println!("after flush: {}", display.get("text"));

    counter.extend([Extension::named("Doubler").method("increment", |call, args| {
        call.inherited(args);
        call.inherited(args)
    })]);
    counter.call("increment", &[]);
    println!("{}", display.get("text"));

    counter.set("step", 10)?;
    counter.call("increment", &[]);
    println!("{}", display.get("text"));

    let mut inspector = Inspector::new();
    inspector.toggle();
    if let Some(report) = inspector.inspect(&counter) {
        println!("{report}");
    }

    counter.destroy();
    println!("instances created: {}", instance_count());
    Ok(())
}
