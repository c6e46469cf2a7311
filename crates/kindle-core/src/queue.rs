//! Buffering of notifications while they are stopped.
//!
//! Entries coalesce per property: the newest arguments replace older ones,
//! and the targets are the union of everything queued for that property.
//! On flush each target runs exactly once, with the newest arguments.
//! Properties flush in the order they were first queued.

use smallvec::SmallVec;

use crate::object::Instance;
use crate::observer::{Observer, change_hook_name};
use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct NotifyArgs {
    pub old: Value,
    pub new: Value,
    pub force: bool,
}

#[derive(Clone, Debug)]
pub(crate) enum Target {
    Observer(Observer),
    ChangeHook,
}

impl Target {
    fn same(&self, other: &Target) -> bool {
        match (self, other) {
            (Target::Observer(a), Target::Observer(b)) => a.same(b),
            (Target::ChangeHook, Target::ChangeHook) => true,
            _ => false,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Pending {
    pub(crate) prop: String,
    pub(crate) args: NotifyArgs,
    pub(crate) targets: SmallVec<[Target; 4]>,
}

#[derive(Debug)]
pub struct NotificationQueue {
    enabled: bool,
    pending: Vec<Pending>,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self {
            enabled: true,
            pending: Vec::new(),
        }
    }
}

impl NotificationQueue {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queued properties, in flush order.
    pub fn props(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(|p| p.prop.as_str())
    }

    /// Newest arguments queued for `prop`.
    pub fn args(&self, prop: &str) -> Option<&NotifyArgs> {
        self.pending.iter().find(|p| p.prop == prop).map(|p| &p.args)
    }

    pub(crate) fn enqueue(&mut self, prop: &str, target: Target, args: NotifyArgs) {
        match self.pending.iter_mut().find(|p| p.prop == prop) {
            Some(entry) => {
                entry.args = args;
                if !entry.targets.iter().any(|t| t.same(&target)) {
                    entry.targets.push(target);
                }
            }
            None => {
                let mut targets = SmallVec::new();
                targets.push(target);
                self.pending.push(Pending {
                    prop: prop.to_string(),
                    args,
                    targets,
                });
            }
        }
    }

    pub(crate) fn stop(&mut self) {
        self.enabled = false;
        self.pending.clear();
    }

    pub(crate) fn start(&mut self) -> Vec<Pending> {
        self.enabled = true;
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn reset(&mut self) {
        self.pending.clear();
    }
}

impl Instance {
    /// Stops dispatching notifications and empties the queue. Subsequent
    /// notifications are buffered until [`start_notifications`].
    ///
    /// Calls do not nest: a second stop discards whatever was queued.
    ///
    /// [`start_notifications`]: Instance::start_notifications
    pub fn stop_notifications(&self) {
        self.0.queue.borrow_mut().stop();
    }

    /// Re-enables dispatch and synchronously flushes everything queued.
    pub fn start_notifications(&self) {
        let pending = self.0.queue.borrow_mut().start();
        if !pending.is_empty() {
            log::trace!(
                "{}: flushing {} queued notification(s)",
                self.describe(),
                pending.len()
            );
        }
        for entry in pending {
            let NotifyArgs { old, new, .. } = &entry.args;
            for target in &entry.targets {
                match target {
                    Target::Observer(observer) => observer.dispatch(self, &entry.prop, old, new),
                    Target::ChangeHook => {
                        self.call(&change_hook_name(&entry.prop), &[old.clone(), new.clone()]);
                    }
                }
            }
        }
    }

    pub fn notifications_enabled(&self) -> bool {
        self.0.queue.borrow().enabled()
    }

    /// Properties with notifications waiting for [`start_notifications`].
    ///
    /// [`start_notifications`]: Instance::start_notifications
    pub fn pending_notifications(&self) -> Vec<String> {
        self.0
            .queue
            .borrow()
            .props()
            .map(str::to_string)
            .collect()
    }
}
