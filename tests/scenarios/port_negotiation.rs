use std::sync::atomic::{AtomicU32, Ordering};

use kvdeploy::application::PortNegotiator;
use kvdeploy::domain::entities::{PortAssignment, PortConflict};
use kvdeploy::domain::ports::{AcceptConflicts, PortResolution, PortResolver, RejectConflicts};
use kvdeploy::domain::value_objects::{Host, PortSet};
use kvdeploy::DeployError;

use crate::common::*;

fn assignment(master: &str, slave: &str) -> PortAssignment {
    let master = PortSet::parse(master).unwrap();
    let slave = PortSet::parse(slave).unwrap();
    let replicas = (slave.len() / master.len()) as u32;
    PortAssignment::new(master, slave, replicas).unwrap()
}

fn hosts() -> Vec<Host> {
    vec![Host::new("host-a"), Host::new("host-b")]
}

/// Fleet where host-a listens on 7000 and ssh, host-b on 9000
fn busy_env() -> TestEnv {
    let env = TestEnv::empty();
    env.fleet.listen("host-a", &[7000, 22]);
    env.fleet.listen("host-b", &[9000]);
    env
}

/// Moves every port up by 100 on each call
#[derive(Default)]
struct ShiftUp {
    calls: AtomicU32,
}

impl PortResolver for ShiftUp {
    fn resolve(&self, _conflicts: &[PortConflict], current: &PortAssignment) -> PortResolution {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let shift = |set: &PortSet| set.iter().map(|p| p + 100).collect::<PortSet>();
        match PortAssignment::new(shift(current.master()), shift(current.slave()), current.replicas()) {
            Ok(next) => PortResolution::Reassign(next),
            Err(_) => PortResolution::Abort,
        }
    }
}

#[test]
fn check_reports_exactly_the_listening_candidates() {
    let env = busy_env();
    let services = env.services();

    let conflicts = PortNegotiator::new(&services)
        .check_conflicts(&hosts(), &assignment("7000-7001", ""))
        .unwrap();

    assert_eq!(conflicts, vec![PortConflict::new(Host::new("host-a"), 7000)]);
}

#[test]
fn check_covers_slave_ports_on_every_host() {
    let env = busy_env();
    let services = env.services();

    let conflicts = PortNegotiator::new(&services)
        .check_conflicts(&hosts(), &assignment("7000", "9000"))
        .unwrap();

    assert_eq!(
        conflicts,
        vec![
            PortConflict::new(Host::new("host-a"), 7000),
            PortConflict::new(Host::new("host-b"), 9000),
        ]
    );
}

#[test]
fn free_ports_need_no_resolver_decision() {
    let env = busy_env();
    let services = env.services();

    let negotiated = PortNegotiator::new(&services)
        .negotiate(&hosts(), assignment("8000-8001", "8100-8101"), &RejectConflicts)
        .unwrap();

    assert!(negotiated.accepted.is_empty());
    assert_eq!(negotiated.ports.master().format(), "8000-8001");
}

#[test]
fn reassignment_repeats_until_clear() {
    let env = busy_env();
    env.fleet.listen("host-b", &[9000, 7100]);
    let services = env.services();
    let resolver = ShiftUp::default();

    let negotiated = PortNegotiator::new(&services)
        .negotiate(&hosts(), assignment("7000-7001", ""), &resolver)
        .unwrap();

    assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    assert_eq!(negotiated.ports.master().format(), "7200-7201");
    assert!(negotiated.accepted.is_empty());
}

#[test]
fn rejecting_resolver_aborts_with_the_conflicts() {
    let env = busy_env();
    let services = env.services();

    let err = PortNegotiator::new(&services)
        .negotiate(&hosts(), assignment("7000-7001", ""), &RejectConflicts)
        .unwrap_err();

    match err {
        DeployError::PortConflict { conflicts } => {
            assert_eq!(conflicts, vec![PortConflict::new(Host::new("host-a"), 7000)]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn accepting_resolver_keeps_ports_and_records_conflicts() {
    let env = busy_env();
    let services = env.services();

    let negotiated = PortNegotiator::new(&services)
        .negotiate(&hosts(), assignment("7000-7001", ""), &AcceptConflicts)
        .unwrap();

    assert_eq!(negotiated.ports.master().format(), "7000-7001");
    assert_eq!(
        negotiated.accepted,
        vec![PortConflict::new(Host::new("host-a"), 7000)]
    );
}

#[test]
fn unreachable_host_fails_the_probe() {
    let env = busy_env();
    env.fleet.set_unreachable("host-b");
    let services = env.services();

    let err = PortNegotiator::new(&services)
        .check_conflicts(&hosts(), &assignment("8000", ""))
        .unwrap_err();

    assert!(matches!(err, DeployError::Connectivity { .. }));
}
