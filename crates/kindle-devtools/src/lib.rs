use std::fmt;

use kindle_core::{Instance, Snapshot};

/// Human-readable view of an instance's runtime tables.
#[derive(Clone, Debug)]
pub struct InstanceReport {
    pub snapshot: Snapshot,
}

impl InstanceReport {
    pub fn pending(&self) -> &[String] {
        &self.snapshot.pending
    }

    pub fn observer_total(&self) -> usize {
        self.snapshot.observers.iter().map(|(_, n)| n).sum()
    }

    /// Methods with more than one stacked contribution.
    pub fn overridden(&self) -> impl Iterator<Item = (&str, usize)> {
        self.snapshot
            .methods
            .iter()
            .filter(|(_, depth)| *depth > 1)
            .map(|(name, depth)| (name.as_str(), *depth))
    }
}

impl fmt::Display for InstanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.snapshot;
        let mut lines = vec![
            format!("{}#{}", s.kind, s.id),
            format!("props: {}", s.props.len()),
            format!("observers: {}", self.observer_total()),
            format!("bindings: {}", s.bindings),
        ];
        if !s.notifications_enabled {
            lines.push(format!("paused ({} pending)", s.pending.len()));
        }
        if !s.mixins.is_empty() {
            lines.push(format!("mixins: {}", s.mixins.join(", ")));
        }
        let overridden: Vec<_> = self
            .overridden()
            .map(|(name, depth)| format!("{name}x{depth}"))
            .collect();
        if !overridden.is_empty() {
            lines.push(format!("chains: {}", overridden.join(", ")));
        }
        if !s.preserved.is_empty() {
            let preserved: Vec<_> = s
                .preserved
                .iter()
                .map(|(ext, name)| format!("{ext}.{name}"))
                .collect();
            lines.push(format!("preserved: {}", preserved.join(", ")));
        }
        for (name, deps) in &s.computed {
            lines.push(format!("{name} <- {}", deps.join("+")));
        }
        f.write_str(&lines.join("  |  "))
    }
}

pub struct Inspector {
    pub enabled: bool,
    inspections: u64,
    last: Option<InstanceReport>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            enabled: false,
            inspections: 0,
            last: None,
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn inspections(&self) -> u64 {
        self.inspections
    }

    pub fn last(&self) -> Option<&InstanceReport> {
        self.last.as_ref()
    }

    pub fn report(instance: &Instance) -> InstanceReport {
        InstanceReport {
            snapshot: instance.snapshot(),
        }
    }

    /// Snapshots `instance` and logs it at debug level. Does nothing while
    /// disabled.
    pub fn inspect(&mut self, instance: &Instance) -> Option<&InstanceReport> {
        if !self.enabled {
            return None;
        }
        self.inspections += 1;
        let report = Self::report(instance);
        log::debug!("{report}");
        self.last = Some(report);
        self.last.as_ref()
    }
}
