//! The duel log and its subscribers.
//!
//! The log is the event stream a renderer consumes. It grows by whole
//! command batches when a command is executed or redone, and shrinks by the
//! tail run of one command's entries when that command is undone.
//!
//! Subscribers receive:
//! - `LogNotice::NewLog(entry)` once per appended entry
//! - `LogNotice::UpdateLogs(all)` once after any change in entry count
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use duel_engine::log::{DuelLog, LogNotice};
//!
//! let seen = Rc::new(RefCell::new(0));
//! let counter = Rc::clone(&seen);
//!
//! let mut log = DuelLog::new();
//! log.subscribe(move |notice| {
//!     if let LogNotice::UpdateLogs(all) = notice {
//!         *counter.borrow_mut() = all.len();
//!     }
//! });
//! assert_eq!(*seen.borrow(), 0);
//! ```

pub mod entry;

pub use entry::{LogEntry, LogKind};

use std::fmt;

use crate::core::entity::CommandId;

/// Notification delivered to log subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogNotice<'a> {
    NewLog(&'a LogEntry),
    UpdateLogs(&'a [LogEntry]),
}

/// Handle returned by `DuelLog::subscribe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Subscriber = Box<dyn FnMut(LogNotice<'_>)>;

/// Ordered list of emitted log entries.
#[derive(Default)]
pub struct DuelLog {
    entries: Vec<LogEntry>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u32,
}

impl DuelLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber.
    pub fn subscribe(&mut self, subscriber: impl FnMut(LogNotice<'_>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Append a batch of entries, notifying once per entry and once for the
    /// new count.
    pub fn extend(&mut self, entries: Vec<LogEntry>) {
        if entries.is_empty() {
            return;
        }
        for entry in entries {
            self.entries.push(entry);
            if let Some(entry) = self.entries.last() {
                for (_, subscriber) in &mut self.subscribers {
                    subscriber(LogNotice::NewLog(entry));
                }
            }
        }
        self.notify_update();
    }

    /// Remove the tail run of entries carrying `command_id`. Returns how many
    /// were removed.
    pub fn remove_command(&mut self, command_id: CommandId) -> usize {
        let keep = self
            .entries
            .iter()
            .rposition(|entry| entry.command_id != command_id)
            .map_or(0, |i| i + 1);
        self.truncate(keep)
    }

    /// Drop entries past `len`. Returns how many were removed.
    pub fn truncate(&mut self, len: usize) -> usize {
        let removed = self.entries.len().saturating_sub(len);
        if removed > 0 {
            self.entries.truncate(len);
            self.notify_update();
        }
        removed
    }

    fn notify_update(&mut self) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(LogNotice::UpdateLogs(&self.entries));
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries emitted by one command.
    pub fn for_command(&self, command_id: CommandId) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.command_id == command_id)
    }
}

impl fmt::Debug for DuelLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuelLog")
            .field("entries", &self.entries)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandType;
    use crate::core::player::PlayerId;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn entry(command: u32) -> LogEntry {
        let mut entry = LogEntry::new(CommandType::Draw, PlayerId::FIRST);
        entry.command_id = CommandId(command);
        entry
    }

    #[test]
    fn test_notifications() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let mut log = DuelLog::new();
        log.subscribe(move |notice| {
            let label = match notice {
                LogNotice::NewLog(e) => format!("new {}", e.command_id.raw()),
                LogNotice::UpdateLogs(all) => format!("update {}", all.len()),
            };
            sink.borrow_mut().push(label);
        });

        log.extend(vec![entry(1), entry(1)]);
        log.remove_command(CommandId(1));

        assert_eq!(*events.borrow(), vec!["new 1", "new 1", "update 2", "update 0"]);
    }

    #[test]
    fn test_remove_command_only_tail_run() {
        let mut log = DuelLog::new();
        log.extend(vec![entry(1), entry(2), entry(2), entry(3)]);

        assert_eq!(log.remove_command(CommandId(2)), 0);
        assert_eq!(log.remove_command(CommandId(3)), 1);
        assert_eq!(log.remove_command(CommandId(2)), 2);
        assert_eq!(log.len(), 1);
        assert_eq!(log.for_command(CommandId(1)).count(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let calls = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&calls);

        let mut log = DuelLog::new();
        let id = log.subscribe(move |_| *sink.borrow_mut() += 1);
        assert!(log.unsubscribe(id));
        assert!(!log.unsubscribe(id));

        log.extend(vec![entry(1)]);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_empty_batch_is_silent() {
        let calls = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&calls);

        let mut log = DuelLog::new();
        log.subscribe(move |_| *sink.borrow_mut() += 1);
        log.extend(Vec::new());
        log.truncate(0);
        assert_eq!(*calls.borrow(), 0);
    }
}
