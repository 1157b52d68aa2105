// ABOUTME: Integration tests for the environment stage against a scripted remote host.
// ABOUTME: Idempotent installs, per-dependency failure codes and the non-root sudo path.

mod support;

use dockhand::deploy::{EnvironmentReport, InstallOutcome, prepare_remote};
use dockhand::diagnostics::{Diagnostics, WarningKind};
use support::{ScriptedRunner, failed, remote};

fn bare_host() -> ScriptedRunner {
    ScriptedRunner::new()
        .respond_times("command -v docker", 1, failed(1, ""))
        .respond_times("docker compose version", 1, failed(1, ""))
        .respond_times("command -v nginx", 1, failed(1, ""))
}

#[tokio::test]
async fn second_run_detects_everything_and_installs_nothing() {
    support::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let target = remote(dir.path(), "root");
    let runner = bare_host();

    let first = prepare_remote(&runner, &target, &mut Diagnostics::default())
        .await
        .unwrap();
    let second = prepare_remote(&runner, &target, &mut Diagnostics::default())
        .await
        .unwrap();

    assert_eq!(
        first,
        EnvironmentReport {
            engine: InstallOutcome::Installed,
            compose: InstallOutcome::Installed,
            proxy: InstallOutcome::Installed,
        }
    );
    assert_eq!(
        second,
        EnvironmentReport {
            engine: InstallOutcome::AlreadyPresent,
            compose: InstallOutcome::AlreadyPresent,
            proxy: InstallOutcome::AlreadyPresent,
        }
    );

    assert_eq!(runner.count("get.docker.com"), 1);
    assert_eq!(runner.count("apt-get install -y docker-compose-plugin"), 1);
    assert_eq!(runner.count("apt-get install -y nginx"), 1);
    assert_eq!(runner.count("apt-get update"), 1);
    assert_eq!(runner.count("systemctl enable --now docker"), 2);
    assert_eq!(runner.count("systemctl enable --now nginx"), 2);
}

#[tokio::test]
async fn present_dependencies_skip_the_package_index() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new();

    prepare_remote(&runner, &remote(dir.path(), "root"), &mut Diagnostics::default())
        .await
        .unwrap();

    assert_eq!(runner.count("apt-get"), 0);
    assert_eq!(runner.count("get.docker.com"), 0);
}

#[tokio::test]
async fn each_install_failure_has_its_own_code() {
    let cases = [
        ("command -v docker", "get.docker.com", 9),
        ("docker compose version", "docker-compose-plugin", 10),
        ("command -v nginx", "apt-get install -y nginx", 11),
    ];

    for (presence, install, code) in cases {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new()
            .fail(presence, 1, "")
            .fail(install, 100, "E: Unable to locate package");

        let err = prepare_remote(&runner, &remote(dir.path(), "root"), &mut Diagnostics::default())
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), code, "{install}: {err}");
    }
}

#[tokio::test]
async fn install_that_leaves_tool_missing_fails() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new().fail("command -v docker", 1, "");

    let err = prepare_remote(&runner, &remote(dir.path(), "root"), &mut Diagnostics::default())
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), 9);
    assert!(err.to_string().contains("still missing"));
}

#[tokio::test]
async fn failed_index_refresh_is_only_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new()
        .respond_times("command -v nginx", 1, failed(1, ""))
        .fail("apt-get update", 100, "Temporary failure resolving");
    let mut diag = Diagnostics::default();

    let report = prepare_remote(&runner, &remote(dir.path(), "root"), &mut diag)
        .await
        .unwrap();

    assert_eq!(report.proxy, InstallOutcome::Installed);
    assert_eq!(diag.count(WarningKind::PackageIndex), 1);
}

#[tokio::test]
async fn service_start_failure_is_code_12() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new().fail("systemctl enable --now nginx", 1, "Unit not found");

    let err = prepare_remote(&runner, &remote(dir.path(), "root"), &mut Diagnostics::default())
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 12);
}

#[tokio::test]
async fn non_root_user_gets_sudo_and_docker_group() {
    let dir = tempfile::tempdir().unwrap();
    let runner = bare_host();

    prepare_remote(&runner, &remote(dir.path(), "deploy"), &mut Diagnostics::default())
        .await
        .unwrap();

    assert_eq!(runner.count("sudo sh /tmp/get-docker.sh"), 1);
    assert_eq!(runner.count("sudo DEBIAN_FRONTEND=noninteractive apt-get install -y nginx"), 1);
    assert_eq!(runner.count("sudo apt-get update"), 1);
    assert_eq!(runner.count("sudo systemctl enable --now docker"), 1);
    assert_eq!(runner.count("sudo usermod -aG docker deploy"), 1);
}

#[tokio::test]
async fn root_is_not_added_to_the_docker_group() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new();

    prepare_remote(&runner, &remote(dir.path(), "root"), &mut Diagnostics::default())
        .await
        .unwrap();

    assert_eq!(runner.count("usermod"), 0);
    assert_eq!(runner.count("sudo"), 0);
}
