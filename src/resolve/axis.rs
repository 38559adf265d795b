use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::candidate::CandidateList;

use super::{walk_chain, ChainOutcome, ExistenceProbe};

/// Where an axis currently stands. `Idle` means no resolution was needed
/// (nothing selected on the axis); `Exhausted` means every candidate missed
/// and the base asset stays displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AxisState {
    #[default]
    Idle,
    Pending,
    Resolved(String),
    Exhausted,
}

/// Snapshot of an axis slot: the generation it belongs to plus its state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    pub generation: u64,
    pub state: AxisState,
}

/// Hook fired after a live (non-stale) asynchronous state write.
pub type ChangeHook = Arc<dyn Fn() + Send + Sync>;

/// Resolution state machine for one variant axis.
///
/// Every `submit` bumps a monotonic generation and logically cancels the
/// walk before it: the superseded task re-checks the generation at each
/// suspension point, stops probing, and never writes. Completions whose
/// generation no longer matches the slot are dropped silently, so only the
/// most recently submitted context can ever become visible, regardless of
/// how completions interleave in real time.
pub struct AxisResolver<P> {
    label: &'static str,
    probe: Arc<P>,
    generation: Arc<AtomicU64>,
    slot: Arc<Mutex<Resolution>>,
    on_change: ChangeHook,
}

impl<P: ExistenceProbe> AxisResolver<P> {
    pub fn new(label: &'static str, probe: Arc<P>, on_change: ChangeHook) -> Self {
        Self {
            label,
            probe,
            generation: Arc::new(AtomicU64::new(0)),
            slot: Arc::new(Mutex::new(Resolution::default())),
            on_change,
        }
    }

    /// Start resolving a new candidate chain, superseding any walk in
    /// flight. An empty chain short-circuits to `Exhausted` without
    /// touching the network. Must be called from within a tokio runtime.
    pub fn submit(&self, list: CandidateList) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if list.is_empty() {
            let mut slot = self.slot.lock().unwrap();
            slot.generation = generation;
            slot.state = AxisState::Exhausted;
            return generation;
        }

        {
            let mut slot = self.slot.lock().unwrap();
            slot.generation = generation;
            slot.state = AxisState::Pending;
        }

        let label = self.label;
        let probe = self.probe.clone();
        let current = self.generation.clone();
        let slot = self.slot.clone();
        let on_change = self.on_change.clone();
        tokio::spawn(async move {
            let outcome = walk_chain(probe.as_ref(), &list, || {
                current.load(Ordering::SeqCst) == generation
            })
            .await;

            let state = match outcome {
                ChainOutcome::Found(url) => AxisState::Resolved(url),
                ChainOutcome::Exhausted => AxisState::Exhausted,
                ChainOutcome::Superseded => return,
            };

            {
                let mut slot = slot.lock().unwrap();
                if slot.generation != generation {
                    // Completed after being superseded; drop on arrival.
                    log::trace!("{}: dropping stale generation {}", label, generation);
                    return;
                }
                slot.state = state;
            }
            (on_change)();
        });

        generation
    }

    /// No selection on this axis: bump the generation (cancelling any walk
    /// in flight) and settle on `Idle` without networking.
    pub fn reset(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut slot = self.slot.lock().unwrap();
        slot.generation = generation;
        slot.state = AxisState::Idle;
        generation
    }

    pub fn resolution(&self) -> Resolution {
        self.slot.lock().unwrap().clone()
    }

    /// The resolved URL, if the live resolution found one.
    pub fn resolved_url(&self) -> Option<String> {
        match &self.slot.lock().unwrap().state {
            AxisState::Resolved(url) => Some(url.clone()),
            _ => None,
        }
    }
}
