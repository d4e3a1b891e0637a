//! Event types and sinks for observing placement sampling.
//!
//! This module defines [`PlacementEvent`] and a set of sinks and adapters to emit,
//! collect, or forward events while sampling a [`crate::area::PlantingArea`] via
//! [`crate::placement::sampler::sample_with_events`] or
//! [`crate::placement::sampler::PlacementSampler`].
use crossbeam_channel::Sender;
use glam::Vec3;

use crate::area::DescriptorId;
use crate::filter::resolve::OverrideSource;
use crate::placement::{Placement, PlacementResult};

/// Describes events emitted while sampling an area.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum PlacementEvent {
    /// Emitted when sampling of an area starts.
    SampleStarted {
        /// Descriptors in evaluation order.
        descriptors: Vec<DescriptorId>,
        /// Grid positions per axis (columns, rows).
        grid_dims: (usize, usize),
    },

    /// Emitted when sampling finishes.
    SampleFinished {
        /// The complete result.
        result: PlacementResult,
    },

    /// Emitted when sampling was abandoned because the configuration changed.
    SampleAborted {
        /// Candidate points evaluated before the abort.
        candidates_evaluated: usize,
    },

    /// Emitted after a candidate point was evaluated for all descriptors.
    PointEvaluated {
        /// Surface point position.
        position: Vec3,
        /// Per-descriptor outcome at this point, in evaluation order.
        evaluations: Vec<DescriptorEvaluation>,
        /// Descriptor that claimed the point, if any.
        claimed_by: Option<DescriptorId>,
    },

    /// Emitted when a placement is made.
    PlacementMade {
        /// The placement data.
        placement: Placement,
    },

    /// Non-fatal warning generated during sampling.
    Warning {
        /// Context string (e.g. descriptor id).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`PlacementEvent`], used by sinks to opt out of costly events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementEventKind {
    SampleStarted,
    SampleFinished,
    SampleAborted,
    PointEvaluated,
    PlacementMade,
    Warning,
}

impl PlacementEvent {
    pub fn kind(&self) -> PlacementEventKind {
        match self {
            PlacementEvent::SampleStarted { .. } => PlacementEventKind::SampleStarted,
            PlacementEvent::SampleFinished { .. } => PlacementEventKind::SampleFinished,
            PlacementEvent::SampleAborted { .. } => PlacementEventKind::SampleAborted,
            PlacementEvent::PointEvaluated { .. } => PlacementEventKind::PointEvaluated,
            PlacementEvent::PlacementMade { .. } => PlacementEventKind::PlacementMade,
            PlacementEvent::Warning { .. } => PlacementEventKind::Warning,
        }
    }
}

/// Filter outcome of one descriptor at a candidate point.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorEvaluation {
    /// Descriptor evaluated.
    pub descriptor: DescriptorId,
    /// Whether its effective filter came from the area or the descriptor.
    pub source: OverrideSource,
    /// Whether the effective filter accepted the point.
    pub passed: bool,
}

impl DescriptorEvaluation {
    pub fn new(descriptor: DescriptorId, source: OverrideSource, passed: bool) -> Self {
        Self {
            descriptor,
            source,
            passed,
        }
    }
}

/// A generic event sink that accepts [`PlacementEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: PlacementEvent);

    /// Whether events of `kind` should be built at all.
    fn wants(&self, _kind: PlacementEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = PlacementEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: PlacementEvent) {}

    #[inline]
    fn wants(&self, _kind: PlacementEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    #[inline]
    fn send(&mut self, event: PlacementEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally restricted to some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<PlacementEvent>,
    only: Option<Vec<PlacementEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            only: None,
        }
    }

    /// Collects only events of the given kinds.
    pub fn only(kinds: impl IntoIterator<Item = PlacementEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<PlacementEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[PlacementEvent] {
        &self.events
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
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: PlacementEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: PlacementEventKind) -> bool {
        self.only.as_ref().is_none_or(|only| only.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: PlacementEvent) {
        let targets: Vec<usize> = (0..self.sinks.len())
            .filter(|&i| self.sinks[i].wants(event.kind()))
            .collect();
        let Some((&last, rest)) = targets.split_last() else {
            return;
        };
        for &i in rest {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: PlacementEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}

/// Event sink that forwards events over a channel, e.g. to another thread.
pub struct ChannelSink {
    pub tx: Sender<PlacementEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<PlacementEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    #[inline]
    fn send(&mut self, event: PlacementEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(context: &str) -> PlacementEvent {
        PlacementEvent::Warning {
            context: context.into(),
            message: "msg".into(),
        }
    }

    #[test]
    fn descriptor_evaluation_constructor_sets_fields() {
        let eval = DescriptorEvaluation::new(DescriptorId(2), OverrideSource::Descriptor, true);
        assert_eq!(eval.descriptor, DescriptorId(2));
        assert_eq!(eval.source, OverrideSource::Descriptor);
        assert!(eval.passed);
    }

    #[test]
    fn vec_sink_collects_events() {
        let mut sink = VecSink::new();
        assert!(sink.is_empty());
        sink.send(warning("a"));
        sink.send(warning("b"));
        assert_eq!(sink.len(), 2);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn vec_sink_only_keeps_requested_kinds() {
        let mut sink = VecSink::only([PlacementEventKind::SampleAborted]);
        assert!(!sink.wants(PlacementEventKind::Warning));
        sink.send(warning("a"));
        sink.send(PlacementEvent::SampleAborted {
            candidates_evaluated: 3,
        });
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn multi_sink_fans_out_events() {
        let mut multi = MultiSink::with_sinks(vec![VecSink::new(), VecSink::new()]);
        multi.send(warning("ctx"));
        assert_eq!(multi.len(), 2);
        assert_eq!(multi.sinks[0].len(), 1);
        assert_eq!(multi.sinks[1].len(), 1);
        matches!(multi.sinks[0].as_slice()[0], PlacementEvent::Warning { .. })
            .then_some(())
            .expect("event captured");
    }

    #[test]
    fn fn_sink_invokes_callback() {
        let mut count = 0;
        let mut sink = FnSink::new(|_event| {
            count += 1;
        });
        sink.send(warning("ctx"));
        assert_eq!(count, 1);
    }

    #[test]
    fn channel_sink_forwards_events() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut sink = ChannelSink::new(tx);
        sink.send(warning("ctx"));
        assert!(matches!(rx.try_recv(), Ok(PlacementEvent::Warning { .. })));
    }

    #[test]
    fn unit_sink_wants_nothing() {
        assert!(!().wants(PlacementEventKind::PlacementMade));
    }
}
