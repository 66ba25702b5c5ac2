//! Failover protocol pieces
//!
//! `TimeoutWindow` captures the node-liveness timeout, widens it for the
//! duration of the failover and puts the original values back.
//! `FailoverLoop` drives the bounded, all-or-nothing failover rounds.

use std::thread;

use crate::application::settings::FailoverSettings;
use crate::domain::entities::{classify_response, FailoverAttempt, FailoverOutcome, PromotionCheck};
use crate::domain::ports::{DeployEvent, DeployEventSink, NodeControl, NodeRole};
use crate::domain::value_objects::{NodeAddr, Phase};
use crate::error::{DeployError, DeployResult};

/// Node-liveness timeout values captured before widening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutWindow {
    pub key: String,
    pub master_value: String,
    pub slave_value: String,
}

impl TimeoutWindow {
    /// Read the current value from the first master and the first slave
    pub fn capture(
        nodes: &dyn NodeControl,
        key: &str,
        first_master: &NodeAddr,
        first_slave: &NodeAddr,
    ) -> DeployResult<Self> {
        let phase = Phase::WidenTimeout;
        let master_value = nodes
            .config_get(first_master, key)
            .map_err(|e| DeployError::node(phase, first_master, e))?;
        let slave_value = nodes
            .config_get(first_slave, key)
            .map_err(|e| DeployError::node(phase, first_slave, e))?;
        Ok(Self {
            key: key.to_string(),
            master_value,
            slave_value,
        })
    }

    pub fn widen(&self, nodes: &dyn NodeControl, all: &[NodeAddr], value: &str) -> DeployResult<()> {
        for node in all {
            nodes
                .config_set(node, &self.key, value)
                .map_err(|e| DeployError::node(Phase::WidenTimeout, node, e))?;
        }
        Ok(())
    }

    /// Put the captured values back on every node, masters and slaves by
    /// their original role. Every node is attempted; the first failure is
    /// reported.
    pub fn restore(
        &self,
        nodes: &dyn NodeControl,
        masters: &[NodeAddr],
        slaves: &[NodeAddr],
    ) -> DeployResult<()> {
        let assignments = masters
            .iter()
            .map(|node| (node, &self.master_value))
            .chain(slaves.iter().map(|node| (node, &self.slave_value)));

        let mut first_error = None;
        for (node, value) in assignments {
            if let Err(err) = nodes.config_set(node, &self.key, value) {
                if first_error.is_none() {
                    first_error = Some(DeployError::node(Phase::RestoreTimeout, node, err));
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Bounded failover retry loop
///
/// Each round asks every target to take over. A round succeeds only when
/// every target confirms; otherwise the whole round is retried after
/// `round_delay`, up to `max_rounds`.
pub struct FailoverLoop<'a> {
    nodes: &'a dyn NodeControl,
    settings: &'a FailoverSettings,
    events: &'a dyn DeployEventSink,
}

impl<'a> FailoverLoop<'a> {
    pub fn new(
        nodes: &'a dyn NodeControl,
        settings: &'a FailoverSettings,
        events: &'a dyn DeployEventSink,
    ) -> Self {
        Self {
            nodes,
            settings,
            events,
        }
    }

    /// Run rounds until every target is promoted; returns the round count
    pub fn run(&self, targets: &[NodeAddr]) -> DeployResult<u32> {
        let max_rounds = self.settings.max_rounds;
        let mut pending: Vec<NodeAddr> = targets.to_vec();

        for round in 1..=max_rounds {
            let attempts: Vec<FailoverAttempt> = targets
                .iter()
                .map(|target| self.attempt(target, round))
                .collect();
            pending = attempts
                .iter()
                .filter(|a| !a.outcome.is_promoted())
                .map(|a| a.target.clone())
                .collect();

            self.events.on_event(DeployEvent::FailoverRound {
                round,
                max_rounds,
                attempts,
            });

            if pending.is_empty() {
                return Ok(round);
            }
            if round < max_rounds && !self.settings.round_delay.is_zero() {
                thread::sleep(self.settings.round_delay);
            }
        }

        Err(DeployError::Failover {
            rounds: max_rounds,
            pending,
        })
    }

    fn attempt(&self, target: &NodeAddr, round: u32) -> FailoverAttempt {
        let outcome = match self.nodes.failover(target) {
            Err(err) => FailoverOutcome::Error(err.to_string()),
            Ok(reply) => match self.settings.check {
                PromotionCheck::Response => {
                    classify_response(&reply, &self.settings.promoted_response)
                }
                PromotionCheck::Role => match self.nodes.role(target) {
                    Ok(NodeRole::Master) => FailoverOutcome::Promoted,
                    Ok(NodeRole::Slave) => FailoverOutcome::NotYetSlave,
                    Err(err) => FailoverOutcome::Error(err.to_string()),
                },
            },
        };
        FailoverAttempt {
            target: target.clone(),
            attempt: round,
            outcome,
        }
    }
}
