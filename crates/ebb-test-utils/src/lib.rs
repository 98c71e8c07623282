//! Test utilities for Ebb framework development.
//!
//! Provides [`ScriptedModel`], a [`HydroModel`] whose phases do nothing
//! but record their invocation into a shared [`EventLog`], plus a
//! [`ConcurrencyGauge`] for asserting how many phase bodies ran
//! simultaneously. Engine scenario tests are built on these.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};

use ebb_core::Timestep;
use ebb_model::{HydroModel, ModelError, PhaseSchedule};

/// One recorded phase invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseEvent {
    pub domain: String,
    pub ts: Timestep,
    pub phase: u32,
}

/// Shared, append-only record of phase invocations across domain
/// workers.
///
/// Backed by an unbounded channel: sends are totally ordered by the
/// queue, so the drained vector reflects the global order in which
/// phase bodies reported themselves.
pub struct EventLog {
    tx: Sender<PhaseEvent>,
    rx: Receiver<PhaseEvent>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A sender handle for models to record through.
    pub fn sender(&self) -> Sender<PhaseEvent> {
        self.tx.clone()
    }

    /// Drain everything recorded so far.
    pub fn drain(&self) -> Vec<PhaseEvent> {
        self.rx.try_iter().collect()
    }

    /// Events recorded so far for one domain, in order.
    pub fn for_domain(events: &[PhaseEvent], domain: &str) -> Vec<(Timestep, u32)> {
        events
            .iter()
            .filter(|e| e.domain == domain)
            .map(|e| (e.ts, e.phase))
            .collect()
    }
}

/// Tracks how many phase bodies are inside their critical section at
/// once, and the maximum ever observed.
#[derive(Debug, Default)]
pub struct ConcurrencyGauge {
    current: AtomicU32,
    peak: AtomicU32,
}

impl ConcurrencyGauge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    pub fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    /// Highest simultaneous occupancy observed.
    pub fn peak(&self) -> u32 {
        self.peak.load(Ordering::SeqCst)
    }
}

/// A model whose phases record themselves and optionally dawdle.
///
/// Registers `n_phases` phases during `do_initialize`; each phase sends
/// a [`PhaseEvent`] naming the domain, timestep, and phase index, and
/// then sleeps for the configured delay (default: none).
pub struct ScriptedModel {
    name: String,
    nts: Timestep,
    n_phases: u32,
    events: Sender<PhaseEvent>,
    phase_delay: Duration,
    gauge: Option<Arc<ConcurrencyGauge>>,
}

impl ScriptedModel {
    pub fn new(name: &str, nts: Timestep, n_phases: u32, events: Sender<PhaseEvent>) -> Self {
        Self {
            name: name.to_string(),
            nts,
            n_phases,
            events,
            phase_delay: Duration::ZERO,
            gauge: None,
        }
    }

    /// Sleep this long inside every phase body.
    pub fn with_phase_delay(mut self, delay: Duration) -> Self {
        self.phase_delay = delay;
        self
    }

    /// Track phase-body concurrency through the given gauge.
    pub fn with_gauge(mut self, gauge: Arc<ConcurrencyGauge>) -> Self {
        self.gauge = Some(gauge);
        self
    }

    fn run_phase(&mut self, phase: u32, ts: Timestep) {
        if let Some(gauge) = &self.gauge {
            gauge.enter();
        }
        // Receiver may be gone when a test only counts invocations.
        let _ = self.events.send(PhaseEvent {
            domain: self.name.clone(),
            ts,
            phase,
        });
        if !self.phase_delay.is_zero() {
            std::thread::sleep(self.phase_delay);
        }
        if let Some(gauge) = &self.gauge {
            gauge.exit();
        }
    }
}

impl HydroModel for ScriptedModel {
    fn instantiate_members(&mut self, _phases: &mut PhaseSchedule<Self>) -> Result<(), ModelError> {
        Ok(())
    }

    fn read_inputs(&mut self) -> Result<(), ModelError> {
        Ok(())
    }

    fn do_initialize(&mut self, phases: &mut PhaseSchedule<Self>) -> Result<(), ModelError> {
        for p in 0..self.n_phases {
            phases.insert_phase(move |model: &mut Self, ts| model.run_phase(p, ts))?;
        }
        Ok(())
    }

    fn nts(&self) -> Timestep {
        self.nts
    }

    fn post_process(&mut self) -> Result<(), ModelError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_log_preserves_send_order() {
        let log = EventLog::new();
        let tx = log.sender();
        for i in 0..3 {
            tx.send(PhaseEvent {
                domain: "d".into(),
                ts: 1,
                phase: i,
            })
            .unwrap();
        }
        let events = log.drain();
        let phases: Vec<u32> = events.iter().map(|e| e.phase).collect();
        assert_eq!(phases, vec![0, 1, 2]);
        assert!(log.drain().is_empty());
    }

    #[test]
    fn gauge_tracks_peak_occupancy() {
        let gauge = ConcurrencyGauge::new();
        gauge.enter();
        gauge.enter();
        gauge.exit();
        gauge.enter();
        assert_eq!(gauge.peak(), 2);
    }
}
