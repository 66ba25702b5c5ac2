use std::sync::Mutex;

use kvdeploy::domain::ports::{DeployEvent, DeployEventSink};
use kvdeploy::domain::value_objects::Phase;

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DeployEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<DeployEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn phases_started(&self) -> Vec<Phase> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DeployEvent::PhaseStarted { phase, .. } => Some(phase),
                _ => None,
            })
            .collect()
    }

    pub fn started(&self, phase: Phase) -> bool {
        self.phases_started().contains(&phase)
    }

    pub fn failover_rounds(&self) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DeployEvent::FailoverRound { round, .. } => Some(round),
                _ => None,
            })
            .collect()
    }
}

impl DeployEventSink for RecordingSink {
    fn on_event(&self, event: DeployEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn wants_detailed_events(&self) -> bool {
        true
    }
}
