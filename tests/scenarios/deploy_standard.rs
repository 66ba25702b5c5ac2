use kvdeploy::application::{DeployOptions, DeployUseCase, PropertiesSource};
use kvdeploy::domain::entities::{BackupTag, PortAssignment, PropertiesDocument, Topology};
use kvdeploy::domain::ports::RejectConflicts;
use kvdeploy::domain::value_objects::{DeployState, Host, Phase, PortSet};
use kvdeploy::DeployError;

use crate::common::*;

fn new_cluster() -> PropertiesSource {
    let ports = PortAssignment::new(
        PortSet::parse("18100-18101").unwrap(),
        PortSet::parse("18150-18151").unwrap(),
        1,
    )
    .unwrap();
    let topology = Topology::new(
        vec![Host::new(LOCAL), Host::new(REMOTE)],
        ports,
        2,
        "~/sata_ssd/ssd_",
    )
    .unwrap();
    PropertiesSource::New(topology)
}

#[test]
fn fresh_deploy_installs_everywhere_and_syncs_properties() {
    let env = TestEnv::empty();
    let services = env.services();
    let options = DeployOptions::new(cluster_id(), env.installer("7.0"), new_cluster());

    let outcome = DeployUseCase::new(&services, &RejectConflicts)
        .execute(&options)
        .unwrap();

    assert_eq!(outcome.previous_state, DeployState::Absent);
    assert!(!outcome.is_redeploy());
    assert!(outcome.conf_backup.is_none());
    assert_eq!(env.version_on(LOCAL).as_deref(), Some("7.0"));
    assert_eq!(env.version_on(REMOTE).as_deref(), Some("7.0"));
    assert!(!env.sentinel_on(LOCAL));
    assert!(!env.sentinel_on(REMOTE));

    let doc = PropertiesDocument::parse(&env.local_properties()).unwrap();
    assert_eq!(doc.get("sr2_redis_master_hosts"), Some("local, node-b"));
    assert_eq!(doc.get("sr2_redis_master_ports"), Some("18100-18101"));
    assert_eq!(doc.get("sr2_redis_slave_ports"), Some("18150-18151"));
    assert_eq!(doc.get("ssd_count"), Some("2"));
    assert!(!doc.is_enabled("sr2_redis_data"));

    // the remote host got the same conf
    let remote = env.fleet.read(REMOTE, &env.paths().properties_path);
    assert_eq!(remote.as_deref(), Some(env.local_properties().as_str()));
    // the installer artifact does not stay behind
    assert!(!env
        .fleet
        .exists(REMOTE, &env.paths().cluster_path.join("kv-server.bin")));
}

#[test]
fn phases_run_in_order() {
    let env = TestEnv::empty();
    let services = env.services();
    let options = DeployOptions::new(cluster_id(), env.installer("7.0"), new_cluster());

    DeployUseCase::new(&services, &RejectConflicts)
        .execute(&options)
        .unwrap();

    assert_eq!(
        env.events.phases_started(),
        vec![
            Phase::Validating,
            Phase::Negotiating,
            Phase::CollisionCheck,
            Phase::Installing,
            Phase::WritingProperties,
            Phase::ConfSyncing,
            Phase::Completing,
        ]
    );
}

#[test]
fn failed_install_leaves_hosts_pending_and_retry_wipes_them() {
    let mut env = TestEnv::empty();
    env.settings.max_parallel_hosts = 1;
    env.fleet.fail_install(REMOTE, true);
    let installer = env.installer("7.0");

    {
        let services = env.services();
        let options = DeployOptions::new(cluster_id(), &installer, new_cluster());
        let err = DeployUseCase::new(&services, &RejectConflicts)
            .execute(&options)
            .unwrap_err();
        assert!(matches!(err, DeployError::Install { ref host, .. } if host.as_str() == REMOTE));
    }
    assert!(env.sentinel_on(LOCAL));
    assert!(env.sentinel_on(REMOTE));

    env.fleet.fail_install(REMOTE, false);
    let services = env.services();
    let options = DeployOptions::new(cluster_id(), &installer, new_cluster());
    let outcome = DeployUseCase::new(&services, &RejectConflicts)
        .execute(&options)
        .unwrap();

    assert_eq!(outcome.previous_state, DeployState::Pending);
    assert_eq!(outcome.discarded, vec![Host::new(LOCAL), Host::new(REMOTE)]);
    assert!(!env.sentinel_on(LOCAL));
    assert!(!env.sentinel_on(REMOTE));
}

#[test]
fn foreign_cluster_directory_is_a_collision() {
    let env = TestEnv::empty();
    env.fleet.write(
        REMOTE,
        &env.paths().cluster_path.join("bin").join("VERSION"),
        "6.0",
    );
    let services = env.services();
    let options = DeployOptions::new(cluster_id(), env.installer("7.0"), new_cluster());

    let err = DeployUseCase::new(&services, &RejectConflicts)
        .execute(&options)
        .unwrap_err();

    match err {
        DeployError::ClusterCollision { hosts, .. } => assert_eq!(hosts, vec![Host::new(REMOTE)]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!env.fleet.ran("install "));
    assert_eq!(env.version_on(REMOTE).as_deref(), Some("6.0"));
}

#[test]
fn unreachable_host_stops_the_deploy_before_install() {
    let env = TestEnv::empty();
    env.fleet.set_unreachable(REMOTE);
    let services = env.services();
    let options = DeployOptions::new(cluster_id(), env.installer("7.0"), new_cluster());

    let err = DeployUseCase::new(&services, &RejectConflicts)
        .execute(&options)
        .unwrap_err();

    assert!(matches!(err, DeployError::Connectivity { .. }));
    assert!(!env.fleet.ran("install "));
}

#[test]
fn redeploy_restores_the_properties_the_installer_overwrote() {
    let env = TestEnv::empty();
    env.seed_deployed(DEPLOYED_PROPERTIES, "6.0");
    let services = env.services();
    let options = DeployOptions::new(cluster_id(), env.installer("7.0"), PropertiesSource::Restore)
        .with_tag(BackupTag::new("pre").unwrap());

    let outcome = DeployUseCase::new(&services, &RejectConflicts)
        .execute(&options)
        .unwrap();

    assert!(outcome.is_redeploy());
    assert_eq!(env.version_on(LOCAL).as_deref(), Some("7.0"));
    assert_eq!(env.version_on(REMOTE).as_deref(), Some("7.0"));
    // archived values laid over the new template
    let expected = "\
## cluster layout
sr2_redis_master_hosts = local, node-b
sr2_redis_master_ports = 18100-18101
sr2_redis_slave_hosts = local, node-b
sr2_redis_slave_ports = 18150-18151
ssd_count = 3
#sr2_redis_data = ~/sata_ssd/ssd_
#sr2_redis_db_path = ~/sata_ssd/ssd_
#sr2_flash_db_path = ~/sata_ssd/ssd_
custom_tuning = keep-me
";
    assert_eq!(env.local_properties(), expected);
    assert_eq!(
        env.fleet.read(REMOTE, &env.paths().properties_path).as_deref(),
        Some(expected)
    );

    let conf_backup = outcome.conf_backup.unwrap();
    assert!(conf_backup.ends_with("cluster_3_conf_bak_pre"));
    assert_eq!(outcome.data_backups.len(), 2);
    // data archives hold the previous package
    let archived = env.paths().data_backup_root.join("cluster_3_bak_pre").join("bin").join("VERSION");
    assert_eq!(env.fleet.read(REMOTE, &archived).as_deref(), Some("6.0"));
}

#[test]
fn clean_redeploy_stops_and_resets_every_node() {
    let env = TestEnv::empty();
    env.seed_deployed(DEPLOYED_PROPERTIES, "6.0");
    let services = env.services();
    let options = DeployOptions::new(cluster_id(), env.installer("7.0"), PropertiesSource::Restore)
        .with_clean(true);

    DeployUseCase::new(&services, &RejectConflicts)
        .execute(&options)
        .unwrap();

    let all = PortSet::parse("18100-18101,18150-18151").unwrap();
    let lifecycle = env.nodes.lifecycle();
    for host in [LOCAL, REMOTE] {
        assert!(lifecycle.contains(&Lifecycle::Stop(Host::new(host), all.clone())));
        assert!(lifecycle.contains(&Lifecycle::Reset(Host::new(host), all.clone())));
    }
    assert!(env.events.started(Phase::Cleaning));
}

#[test]
fn edited_properties_replace_the_restored_ones() {
    let env = TestEnv::empty();
    env.seed_deployed(DEPLOYED_PROPERTIES, "6.0");
    let edited = PropertiesDocument::parse(
        "sr2_redis_master_hosts = local, node-b\n\
         sr2_redis_master_ports = 18200-18201\n\
         sr2_redis_slave_ports = 18250-18251\n",
    )
    .unwrap();
    let services = env.services();
    let options = DeployOptions::new(
        cluster_id(),
        env.installer("7.0"),
        PropertiesSource::Edited(edited),
    );

    let outcome = DeployUseCase::new(&services, &RejectConflicts)
        .execute(&options)
        .unwrap();

    assert_eq!(outcome.ports.master().format(), "18200-18201");
    let doc = PropertiesDocument::parse(&env.local_properties()).unwrap();
    assert_eq!(doc.get("sr2_redis_master_ports"), Some("18200-18201"));
    assert_eq!(doc.get("custom_tuning"), None);
}

#[test]
fn second_workflow_on_the_same_cluster_is_locked_out() {
    use kvdeploy::domain::entities::LockRecord;
    use kvdeploy::domain::ports::ClusterLocker;

    let env = TestEnv::empty();
    let paths = env.paths();
    let _held = env
        .locker
        .acquire(&paths.lock_path, LockRecord::new(cluster_id(), "other", "elsewhere"))
        .unwrap();
    let services = env.services();
    let options = DeployOptions::new(cluster_id(), env.installer("7.0"), new_cluster());

    let err = DeployUseCase::new(&services, &RejectConflicts)
        .execute(&options)
        .unwrap_err();

    match err {
        DeployError::ClusterLocked { holder, .. } => assert!(holder.contains("other@elsewhere")),
        other => panic!("unexpected error: {other}"),
    }
}
