//! Bounded in-memory trace of engine operations.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::config::DEFAULT_DEBUG_LOG_CAPACITY;

/// The engine operation an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Generate,
    PushContext,
    PopContext,
    SetScreenContext,
    Configure,
    /// An identifier was issued more than once in a session.
    Collision,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::PushContext => "push_context",
            Self::PopContext => "pop_context",
            Self::SetScreenContext => "set_screen_context",
            Self::Configure => "configure",
            Self::Collision => "collision",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a debug event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventLevel {
    Info,
    Warning,
}

/// One recorded engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugEvent {
    pub operation: Operation,
    pub level: EventLevel,
    /// Human-readable summary of the operation's inputs.
    pub inputs: String,
    /// The operation's result, if it has one.
    pub output: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl DebugEvent {
    pub fn info(operation: Operation, inputs: impl Into<String>, output: Option<String>) -> Self {
        Self {
            operation,
            level: EventLevel::Info,
            inputs: inputs.into(),
            output,
            timestamp: Utc::now(),
        }
    }

    pub fn warning(operation: Operation, inputs: impl Into<String>) -> Self {
        Self {
            operation,
            level: EventLevel::Warning,
            inputs: inputs.into(),
            output: None,
            timestamp: Utc::now(),
        }
    }

    pub fn is_warning(&self) -> bool {
        self.level == EventLevel::Warning
    }
}

impl fmt::Display for DebugEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            EventLevel::Info => "INFO",
            EventLevel::Warning => "WARN",
        };
        write!(
            f,
            "{} {level} {}: {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.operation,
            self.inputs
        )?;
        if let Some(output) = &self.output {
            write!(f, " -> {output}")?;
        }
        Ok(())
    }
}

/// A FIFO of debug events that evicts the oldest entry when full.
#[derive(Debug, Clone)]
pub struct DebugLog {
    events: VecDeque<DebugEvent>,
    capacity: usize,
}

impl DebugLog {
    /// Create a log holding at most `capacity` events (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the bound, evicting the oldest events if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.evict();
    }

    pub fn record(&mut self, event: DebugEvent) {
        self.events.push_back(event);
        self.evict();
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &DebugEvent> {
        self.events.iter()
    }

    pub fn last(&self) -> Option<&DebugEvent> {
        self.events.back()
    }

    /// Events as an owned, ordered list.
    pub fn to_vec(&self) -> Vec<DebugEvent> {
        self.events.iter().cloned().collect()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DebugEvent> {
        self.events.iter().filter(|event| event.is_warning())
    }

    /// One line per event.
    pub fn format(&self) -> String {
        if self.events.is_empty() {
            return "Accessibility identifier debug log (empty)\n".to_string();
        }
        let mut output = format!(
            "Accessibility identifier debug log ({} events):\n",
            self.events.len()
        );
        for event in &self.events {
            output.push_str("  ");
            output.push_str(&event.to_string());
            output.push('\n');
        }
        output
    }

    fn evict(&mut self) {
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
    }
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DEBUG_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(n: usize) -> DebugEvent {
        DebugEvent::info(Operation::Generate, format!("request {n}"), Some(format!("id{n}")))
    }

    #[test]
    fn test_oldest_evicted_first() {
        let mut log = DebugLog::with_capacity(3);
        for n in 0..5 {
            log.record(generate(n));
        }

        assert_eq!(log.len(), 3);
        let inputs: Vec<_> = log.iter().map(|e| e.inputs.as_str()).collect();
        assert_eq!(inputs, ["request 2", "request 3", "request 4"]);
    }

    #[test]
    fn test_shrinking_capacity_evicts() {
        let mut log = DebugLog::with_capacity(10);
        for n in 0..6 {
            log.record(generate(n));
        }
        log.set_capacity(2);

        assert_eq!(log.len(), 2);
        assert_eq!(log.iter().next().unwrap().inputs, "request 4");
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut log = DebugLog::with_capacity(0);
        log.record(generate(1));
        log.record(generate(2));
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.last().unwrap().inputs, "request 2");
    }

    #[test]
    fn test_warnings_filter() {
        let mut log = DebugLog::default();
        log.record(generate(1));
        log.record(DebugEvent::warning(Operation::PopContext, "empty stack"));

        let warnings: Vec<_> = log.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].operation, Operation::PopContext);
    }

    #[test]
    fn test_format() {
        let mut log = DebugLog::default();
        assert!(log.format().contains("(empty)"));

        log.record(generate(7));
        let output = log.format();
        assert!(output.contains("1 events"));
        assert!(output.contains("INFO generate: request 7 -> id7"));
    }

    #[test]
    fn test_clear() {
        let mut log = DebugLog::default();
        log.record(generate(1));
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.capacity(), DEFAULT_DEBUG_LOG_CAPACITY);
    }
}
