use kvdeploy::application::{
    BackupOptions, BackupOutcome, RestoreOptions, RestoreOutcome, SnapshotUseCase,
};
use kvdeploy::domain::entities::{BackupKind, BackupTag};
use kvdeploy::domain::value_objects::{DeployState, Host};
use kvdeploy::{DeployError, DeployResult};

use crate::common::*;

fn tag(value: &str) -> BackupTag {
    BackupTag::new(value).unwrap()
}

fn backup(env: &TestEnv, value: &str, include_data: bool) -> DeployResult<BackupOutcome> {
    let services = env.services();
    SnapshotUseCase::new(&services).backup(&BackupOptions {
        cluster_id: cluster_id(),
        tag: Some(tag(value)),
        include_data,
    })
}

fn restore(env: &TestEnv, value: &str, sync: bool) -> DeployResult<RestoreOutcome> {
    let services = env.services();
    SnapshotUseCase::new(&services).restore(&RestoreOptions {
        cluster_id: cluster_id(),
        tag: tag(value),
        sync,
    })
}

#[test]
fn backup_archives_conf_and_every_host() {
    let env = TestEnv::empty();
    env.seed_deployed(DEPLOYED_PROPERTIES, "6.0");

    let outcome = backup(&env, "nightly", true).unwrap();

    assert!(outcome.conf_backup.ends_with("cluster_3_conf_bak_nightly"));
    assert_eq!(
        std::fs::read_to_string(outcome.conf_backup.join("redis.properties")).unwrap(),
        DEPLOYED_PROPERTIES
    );
    let hosts: Vec<&Host> = outcome.data_backups.iter().map(|(h, _)| h).collect();
    assert_eq!(hosts, vec![&Host::new(LOCAL), &Host::new(REMOTE)]);
    let remote_archive = &outcome.data_backups[1].1;
    assert!(remote_archive.ends_with("cluster_3_bak_nightly"));
    assert_eq!(
        env.fleet.read(REMOTE, &remote_archive.join("bin").join("VERSION")).as_deref(),
        Some("6.0")
    );
}

#[test]
fn conf_only_backup_leaves_hosts_alone() {
    let env = TestEnv::empty();
    env.seed_deployed(DEPLOYED_PROPERTIES, "6.0");

    let outcome = backup(&env, "conf", false).unwrap();

    assert!(outcome.data_backups.is_empty());
    assert!(!env.paths().data_backup_root.exists());
    assert!(!env.fleet.exists(REMOTE, &env.paths().data_backup_root));
}

#[test]
fn reusing_a_tag_is_refused() {
    let env = TestEnv::empty();
    env.seed_deployed(DEPLOYED_PROPERTIES, "6.0");
    backup(&env, "once", false).unwrap();

    let err = backup(&env, "once", false).unwrap_err();

    assert!(matches!(err, DeployError::BackupExists { .. }));
}

#[test]
fn list_returns_conf_archives_by_tag() {
    let env = TestEnv::empty();
    env.seed_deployed(DEPLOYED_PROPERTIES, "6.0");
    backup(&env, "b-second", false).unwrap();
    backup(&env, "a-first", false).unwrap();
    let services = env.services();

    let archives = SnapshotUseCase::new(&services).list(cluster_id()).unwrap();

    let tags: Vec<&str> = archives.iter().map(|a| a.tag.as_str()).collect();
    assert_eq!(tags, vec!["a-first", "b-second"]);
    assert!(archives.iter().all(|a| a.kind == BackupKind::Conf));
}

#[test]
fn list_of_unknown_cluster_is_empty() {
    let env = TestEnv::empty();
    let services = env.services();

    let archives = SnapshotUseCase::new(&services).list(cluster_id()).unwrap();

    assert!(archives.is_empty());
}

#[test]
fn restore_brings_back_conf_and_syncs_remote_hosts() {
    let env = TestEnv::empty();
    env.seed_deployed(DEPLOYED_PROPERTIES, "6.0");
    backup(&env, "good", false).unwrap();
    let edited = DEPLOYED_PROPERTIES.replace("keep-me", "broken");
    env.fleet.write(LOCAL, &env.paths().properties_path, &edited);
    env.fleet.write(REMOTE, &env.paths().properties_path, &edited);

    let outcome = restore(&env, "good", true).unwrap();

    assert_eq!(outcome.synced, vec![Host::new(REMOTE)]);
    assert!(outcome
        .files
        .iter()
        .any(|f| f.as_os_str() == "redis.properties"));
    assert_eq!(env.local_properties(), DEPLOYED_PROPERTIES);
    assert_eq!(
        env.fleet.read(REMOTE, &env.paths().properties_path).as_deref(),
        Some(DEPLOYED_PROPERTIES)
    );
}

#[test]
fn restore_without_sync_only_touches_local_conf() {
    let env = TestEnv::empty();
    env.seed_deployed(DEPLOYED_PROPERTIES, "6.0");
    backup(&env, "good", false).unwrap();
    let edited = DEPLOYED_PROPERTIES.replace("keep-me", "broken");
    env.fleet.write(REMOTE, &env.paths().properties_path, &edited);

    let outcome = restore(&env, "good", false).unwrap();

    assert!(outcome.synced.is_empty());
    assert_eq!(
        env.fleet.read(REMOTE, &env.paths().properties_path),
        Some(edited)
    );
}

#[test]
fn restoring_unknown_tag_fails() {
    let env = TestEnv::empty();
    env.seed_deployed(DEPLOYED_PROPERTIES, "6.0");

    let err = restore(&env, "missing", true).unwrap_err();

    assert!(matches!(err, DeployError::BackupNotFound { .. }));
    assert_eq!(env.local_properties(), DEPLOYED_PROPERTIES);
}

#[test]
fn state_reports_every_host_of_a_deployed_cluster() {
    let env = TestEnv::empty();
    env.seed_deployed(DEPLOYED_PROPERTIES, "6.0");
    env.fleet.write(REMOTE, &env.paths().sentinel, "");
    let services = env.services();

    let report = SnapshotUseCase::new(&services).state(cluster_id()).unwrap();

    assert_eq!(report.local, DeployState::Deployed);
    assert_eq!(
        report.hosts,
        vec![
            (Host::new(LOCAL), DeployState::Deployed),
            (Host::new(REMOTE), DeployState::Pending),
        ]
    );
}

#[test]
fn state_of_absent_cluster_skips_hosts() {
    let env = TestEnv::empty();
    let services = env.services();

    let report = SnapshotUseCase::new(&services).state(cluster_id()).unwrap();

    assert_eq!(report.local, DeployState::Absent);
    assert!(report.hosts.is_empty());
    assert!(env.fleet.commands().is_empty());
}
