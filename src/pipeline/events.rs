// src/pipeline/events.rs
//
// Events emitted by the pipeline for one frame, in the order they happened.

use crate::analysis::Phase;
use crate::types::{AntResult, RepMetric};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    PhaseChanged {
        from: Phase,
        to: Phase,
        rep_count: usize,
        timestamp: f64,
    },

    /// Every completed rep, valid or rejected
    RepCompleted(RepMetric),

    /// Emitted once, on the rep that latched the result
    AntReached(AntResult),
}

impl PipelineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::PhaseChanged { .. } => "phase_changed",
            PipelineEvent::RepCompleted(_) => "rep_completed",
            PipelineEvent::AntReached(_) => "ant_reached",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_change_serializes_with_tag() {
        let event = PipelineEvent::PhaseChanged {
            from: Phase::Drop,
            to: Phase::Hike,
            rep_count: 3,
            timestamp: 4.5,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "phase_changed");
        assert_eq!(json["from"], "DROP");
        assert_eq!(json["to"], "HIKE");
        assert_eq!(json["rep_count"], 3);
        assert_eq!(event.name(), "phase_changed");
    }
}
