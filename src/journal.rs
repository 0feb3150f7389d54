//! Bounded event journal.
//!
//! Records every tracking event with a wall-clock timestamp and a level, so a
//! debug screen can show what the engine decided and a tester can export it.

use std::collections::VecDeque;
use std::sync::Mutex;

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::events::{SpeedSeverity, TrackingEvent, TrackingObserver};
use crate::territory::format_area;

/// Default number of entries kept before the oldest is dropped.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 200;

const DISPLAY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");
const EXPORT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Entry level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl JournalLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalLevel::Info => "INFO",
            JournalLevel::Success => "SUCCESS",
            JournalLevel::Warning => "WARNING",
            JournalLevel::Error => "ERROR",
        }
    }
}

/// One journal line.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub timestamp: OffsetDateTime,
    pub level: JournalLevel,
    pub message: String,
}

impl JournalEntry {
    fn render(&self, format: &[BorrowedFormatItem<'static>]) -> String {
        let time = self
            .timestamp
            .format(format)
            .unwrap_or_else(|_| self.timestamp.unix_timestamp().to_string());
        format!("[{}] [{}] {}", time, self.level.as_str(), self.message)
    }

    /// `[HH:MM:SS] [LEVEL] message`
    pub fn display_text(&self) -> String {
        self.render(DISPLAY_FORMAT)
    }

    /// `[YYYY-MM-DD HH:MM:SS] [LEVEL] message`
    pub fn export_text(&self) -> String {
        self.render(EXPORT_FORMAT)
    }
}

/// Observer that keeps the most recent events as journal entries.
#[derive(Debug)]
pub struct EventJournal {
    entries: Mutex<VecDeque<JournalEntry>>,
    capacity: usize,
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::new()
    }
}

impl EventJournal {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_JOURNAL_CAPACITY)
    }

    /// Journal keeping at most `capacity` entries. A capacity of 0 is raised
    /// to 1 so the latest event is always visible.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_JOURNAL_CAPACITY))),
            capacity: capacity.max(1),
        }
    }

    /// Append a free-form entry.
    pub fn log(&self, message: impl Into<String>, level: JournalLevel) {
        let entry = JournalEntry {
            timestamp: OffsetDateTime::now_utc(),
            level,
            message: message.into(),
        };
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries
            .lock()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Display lines joined by newlines.
    pub fn display_text(&self) -> String {
        let entries = self.entries();
        if entries.is_empty() {
            return "No entries".to_string();
        }
        entries
            .iter()
            .map(JournalEntry::display_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Full export with a header block.
    pub fn export(&self) -> String {
        let entries = self.entries();
        let now = OffsetDateTime::now_utc();
        let exported_at = now
            .format(EXPORT_FORMAT)
            .unwrap_or_else(|_| now.unix_timestamp().to_string());

        let mut text = format!(
            "=== Territory tracking journal ===\nExported: {}\nEntries: {}\n\n",
            exported_at,
            entries.len()
        );
        for entry in &entries {
            text.push_str(&entry.export_text());
            text.push('\n');
        }
        text
    }
}

fn describe_event(event: &TrackingEvent) -> (JournalLevel, String) {
    match event {
        TrackingEvent::TrackingStarted => (JournalLevel::Info, "Tracking started".to_string()),
        TrackingEvent::TrackingStopped => (JournalLevel::Info, "Tracking stopped".to_string()),
        TrackingEvent::TrackingResumed => (JournalLevel::Info, "Tracking resumed".to_string()),
        TrackingEvent::PathCleared => (JournalLevel::Info, "Path cleared".to_string()),
        TrackingEvent::PathPointAdded { count } => {
            (JournalLevel::Info, format!("Point recorded, {} total", count))
        }
        TrackingEvent::SpeedWarning {
            speed_kmh,
            severity: SpeedSeverity::Warn,
        } => (
            JournalLevel::Warning,
            format!("Moving too fast ({:.1} km/h), sample ignored", speed_kmh),
        ),
        TrackingEvent::SpeedWarning {
            speed_kmh,
            severity: SpeedSeverity::Pause,
        } => (
            JournalLevel::Error,
            format!("Speed {:.1} km/h exceeds limit, tracking paused", speed_kmh),
        ),
        TrackingEvent::SpeedNormal => (JournalLevel::Info, "Speed back to normal".to_string()),
        TrackingEvent::PathClosed => (JournalLevel::Success, "Loop closed".to_string()),
        TrackingEvent::ValidationCompleted { result } => match result.failure_reason {
            None => (
                JournalLevel::Success,
                format!("Territory valid, area {}", format_area(result.area)),
            ),
            Some(reason) => (
                JournalLevel::Error,
                format!("Territory rejected: {}", reason.as_str()),
            ),
        },
    }
}

impl TrackingObserver for EventJournal {
    fn on_event(&self, event: &TrackingEvent) {
        let (level, message) = describe_event(event);
        self.log(message, level);
    }
}
