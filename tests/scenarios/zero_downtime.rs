use kvdeploy::application::{ZeroDowntimeOptions, ZeroDowntimeUseCase};
use kvdeploy::domain::entities::{BackupTag, PropertiesDocument};
use kvdeploy::domain::ports::DeployEvent;
use kvdeploy::domain::value_objects::{Host, Phase, PortSet};
use kvdeploy::DeployError;

use crate::common::*;

const MASTERS: [&str; 4] = ["local:18100", "local:18101", "node-b:18100", "node-b:18101"];
const SLAVES: [&str; 4] = ["local:18150", "local:18151", "node-b:18150", "node-b:18151"];

/// Replicas sit on the other host, one per master
fn cluster() -> FakeNodes {
    FakeNodes::cluster(
        &[
            ("local:18100", "node-b:18150"),
            ("local:18101", "node-b:18151"),
            ("node-b:18100", "local:18150"),
            ("node-b:18101", "local:18151"),
        ],
        "15000",
        "16000",
    )
}

fn deployed(nodes: FakeNodes) -> TestEnv {
    let env = TestEnv::new(nodes);
    env.seed_deployed(DEPLOYED_PROPERTIES, "6.0");
    env
}

fn options(env: &TestEnv) -> ZeroDowntimeOptions {
    ZeroDowntimeOptions::new(cluster_id(), env.installer("7.0"))
        .with_tag(BackupTag::new("zdt").unwrap())
}

#[test]
fn promotes_every_replica_and_swaps_the_port_lists() {
    let env = deployed(cluster().promote_after(4));
    let services = env.services();

    let outcome = ZeroDowntimeUseCase::new(&services)
        .execute(&options(&env))
        .unwrap();

    assert_eq!(outcome.rounds, 4);
    assert_eq!(env.events.failover_rounds(), vec![1, 2, 3, 4]);
    for slave in SLAVES {
        assert!(env.nodes.is_master(slave), "{slave} should be a master");
    }
    for master in MASTERS {
        assert!(!env.nodes.is_master(master), "{master} should be demoted");
    }

    assert_eq!(outcome.ports.master().format(), "18150-18151");
    assert_eq!(outcome.ports.slave().format(), "18100-18101");
    let doc = PropertiesDocument::parse(&env.local_properties()).unwrap();
    assert_eq!(doc.get("sr2_redis_master_ports"), Some("18150-18151"));
    assert_eq!(doc.get("sr2_redis_slave_ports"), Some("18100-18101"));
    assert_eq!(doc.get("custom_tuning"), Some("keep-me"));
    assert_eq!(
        env.fleet.read(REMOTE, &env.paths().properties_path).as_deref(),
        Some(env.local_properties().as_str())
    );

    assert_eq!(env.version_on(LOCAL).as_deref(), Some("7.0"));
    assert_eq!(env.version_on(REMOTE).as_deref(), Some("7.0"));
    assert!(!env.sentinel_on(LOCAL));
    assert!(!env.sentinel_on(REMOTE));
}

#[test]
fn original_timeouts_are_restored_by_role() {
    let env = deployed(cluster().promote_after(4));
    let services = env.services();

    ZeroDowntimeUseCase::new(&services)
        .execute(&options(&env))
        .unwrap();

    for master in MASTERS {
        assert_eq!(env.nodes.timeout(master).as_deref(), Some("15000"));
    }
    for slave in SLAVES {
        assert_eq!(env.nodes.timeout(slave).as_deref(), Some("16000"));
    }
}

#[test]
fn slaves_restart_before_failover_and_masters_after() {
    let env = deployed(cluster());
    let services = env.services();

    ZeroDowntimeUseCase::new(&services)
        .execute(&options(&env))
        .unwrap();

    let slave_ports = PortSet::parse("18150-18151").unwrap();
    let master_ports = PortSet::parse("18100-18101").unwrap();
    let lifecycle = env.nodes.lifecycle();
    let first_master_start = lifecycle
        .iter()
        .position(|e| matches!(e, Lifecycle::Start(_, ports) if *ports == master_ports))
        .unwrap();
    let last_slave_start = lifecycle
        .iter()
        .rposition(|e| matches!(e, Lifecycle::Start(_, ports) if *ports == slave_ports))
        .unwrap();
    assert!(last_slave_start < first_master_start);
    assert!(lifecycle.contains(&Lifecycle::Configure(Host::new(REMOTE), master_ports)));

    assert_eq!(
        env.events.phases_started(),
        vec![
            Phase::Validating,
            Phase::Snapshot,
            Phase::InstallMasters,
            Phase::RestartSlaves,
            Phase::VerifyReplicas,
            Phase::WidenTimeout,
            Phase::Failover,
            Phase::RestoreTimeout,
            Phase::RestartMasters,
            Phase::PersistTopology,
        ]
    );
}

#[test]
fn exhausted_failover_keeps_old_masters_and_restores_timeouts() {
    let env = deployed(cluster().promote_after(u32::MAX));
    let services = env.services();

    let err = ZeroDowntimeUseCase::new(&services)
        .execute(&options(&env))
        .unwrap_err();

    match err {
        DeployError::Failover { rounds, pending } => {
            assert_eq!(rounds, 10);
            assert_eq!(pending.len(), 4);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(env.nodes.failover_requests("node-b:18150"), 10);
    assert!(!env.events.started(Phase::RestartMasters));
    assert!(!env.events.started(Phase::PersistTopology));
    for master in MASTERS {
        assert!(env.nodes.is_master(master));
        assert_eq!(env.nodes.timeout(master).as_deref(), Some("15000"));
    }
    for slave in SLAVES {
        assert_eq!(env.nodes.timeout(slave).as_deref(), Some("16000"));
    }
    let doc = PropertiesDocument::parse(&env.local_properties()).unwrap();
    assert_eq!(doc.get("sr2_redis_master_ports"), Some("18100-18101"));
}

#[test]
fn refused_timeout_widening_is_not_reported_and_is_rolled_back() {
    let env = deployed(cluster());
    env.nodes.refuse_next_config_set("local:18151");
    let services = env.services();

    let err = ZeroDowntimeUseCase::new(&services)
        .execute(&options(&env))
        .unwrap_err();

    assert!(matches!(err, DeployError::Node { phase: Phase::WidenTimeout, .. }));
    assert!(!env
        .events
        .events()
        .iter()
        .any(|e| matches!(e, DeployEvent::TimeoutWidened { .. })));
    assert!(!env.events.started(Phase::Failover));
    for master in MASTERS {
        assert_eq!(env.nodes.timeout(master).as_deref(), Some("15000"));
        assert!(env.nodes.is_master(master));
    }
    for slave in SLAVES {
        assert_eq!(env.nodes.timeout(slave).as_deref(), Some("16000"));
    }
}

#[test]
fn dead_master_aborts_before_anything_changes() {
    let nodes = cluster();
    nodes.kill("local:18101");
    let env = deployed(nodes);
    let services = env.services();

    let err = ZeroDowntimeUseCase::new(&services)
        .execute(&options(&env))
        .unwrap_err();

    match err {
        DeployError::Validation(message) => {
            assert!(message.contains("1 of 4"), "{message}");
            assert!(message.contains("local:18101"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!env.fleet.ran("install "));
    assert!(!env.paths().conf_backup_root.exists());
    assert_eq!(env.version_on(LOCAL).as_deref(), Some("6.0"));
}

#[test]
fn master_without_alive_replica_stops_before_failover() {
    let nodes = cluster();
    nodes.kill("node-b:18151");
    let env = deployed(nodes);
    let services = env.services();

    let err = ZeroDowntimeUseCase::new(&services)
        .execute(&options(&env))
        .unwrap_err();

    assert!(matches!(err, DeployError::Node { .. } | DeployError::Validation(_)));
    assert!(!env.events.started(Phase::Failover));
    assert!(env.nodes.is_master("local:18101"));
}

#[test]
fn cluster_without_replicas_is_rejected() {
    let env = TestEnv::empty();
    env.seed_deployed(
        "sr2_redis_master_hosts = local, node-b\nsr2_redis_master_ports = 18100-18101\n",
        "6.0",
    );
    let services = env.services();

    let err = ZeroDowntimeUseCase::new(&services)
        .execute(&options(&env))
        .unwrap_err();

    assert!(matches!(err, DeployError::Validation(ref m) if m.contains("no slaves")));
}

#[test]
fn undeployed_cluster_is_rejected() {
    let env = TestEnv::empty();
    let services = env.services();

    let err = ZeroDowntimeUseCase::new(&services)
        .execute(&options(&env))
        .unwrap_err();

    assert!(matches!(err, DeployError::Validation(ref m) if m.contains("not deployed")));
}
