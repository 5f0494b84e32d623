//! Mirrors game events to the debug probe.
//!
//! The core keeps the last few events in its own ring; this forwarder remembers
//! which id it printed last and emits everything newer through defmt on the
//! board, or stdout on a host build.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use luminus_core::telemetry::{EventId, EventLog, EventRecord};

pub struct TelemetryForwarder {
    next: EventId,
}

impl TelemetryForwarder {
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Emits records added since the previous call and returns how many.
    pub fn forward<const CAPACITY: usize>(&mut self, log: &EventLog<CAPACITY>) -> usize {
        let mut emitted = 0;
        for record in log.since(self.next) {
            emit_log(record);
            emitted += 1;
        }
        self.next = log.next_id();
        emitted
    }
}

impl Default for TelemetryForwarder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "none")]
fn emit_log(record: &EventRecord) {
    defmt::info!(
        "telemetry:game #{} t={}ms {}",
        record.id,
        record.at.as_millis() as u64,
        defmt::Display2Format(&record.event)
    );
}

#[cfg(not(target_os = "none"))]
fn emit_log(record: &EventRecord) {
    println!("telemetry:game {record}");
}
