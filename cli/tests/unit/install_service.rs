//! Tests for the `install` application service.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use ovnode_cli::application::services::install::install_node;
use ovnode_cli::domain::{InstallerConfig, Protocol, ProvisionError, StageFailed};

use crate::helpers::{FakeFs, FixedAddress, RecordingReporter, ScriptedPrompter, fake_host};

const SERVER_CONF: &str = "/etc/openvpn/server/server.conf";
const CLIENT_TEMPLATE: &str = "/etc/openvpn/server/client-common.txt";
const STATE_FILE: &str = "/opt/ov-node/.env";

const TEMPLATE: &str = "\
# node settings
SERVICE_PORT =
API_KEY =
TUNNEL_ADDRESS =
PROTOCOL =
OVPN_PORT =
";

fn installed_fs() -> FakeFs {
    FakeFs::new().with_file("/opt/ov-node/.env.example", TEMPLATE)
}

fn host_with_installer(fs: &FakeFs) -> crate::helpers::FakeHost {
    let mut host = fake_host(fs);
    host.driver = host
        .driver
        .creating(SERVER_CONF, "port 1194\nproto udp\ndev tun\n")
        .creating(CLIENT_TEMPLATE, "client\nremote 198.51.100.1 1194\nproto udp\n");
    host
}

#[tokio::test]
async fn existing_daemon_dir_aborts_without_side_effects() {
    let fs = FakeFs::new().with_dir("/etc/openvpn");
    let host = fake_host(&fs);
    let prompter = ScriptedPrompter::default();
    let reporter = RecordingReporter::default();

    let err = install_node(
        &InstallerConfig::default(),
        &host,
        &prompter,
        &FixedAddress(None),
        &reporter,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ProvisionError>(),
        Some(ProvisionError::AlreadyInstalled { .. })
    ));
    assert!(fs.log().is_empty(), "filesystem touched: {:?}", fs.log());
    assert!(host.supervisor.calls().is_empty());
    assert!(host.driver.calls().is_empty());
    assert!(host.remote.urls().is_empty());
    assert!(prompter.prompts().is_empty());
    assert!(reporter.steps().is_empty());
}

#[tokio::test]
async fn install_configures_daemon_state_and_service() {
    let fs = installed_fs();
    let host = host_with_installer(&fs);
    let prompter = ScriptedPrompter::answering(&["203.0.113.9", "tcp", "51820", "", "secret"]);
    let reporter = RecordingReporter::default();

    let summary = install_node(
        &InstallerConfig::default(),
        &host,
        &prompter,
        &FixedAddress(Some("192.0.2.10")),
        &reporter,
    )
    .await
    .unwrap();

    assert_eq!(summary.desired.tunnel_address, "203.0.113.9");
    assert_eq!(summary.desired.protocol, Protocol::Tcp);
    assert_eq!(summary.desired.vpn_port, 51820);
    assert_eq!(summary.desired.service_port, 9090);
    assert_eq!(summary.desired.api_key, "secret");
    assert_eq!(summary.report.completed.len(), 8);
    assert!(summary.report.warnings.is_empty());

    let server = fs.file(SERVER_CONF).unwrap();
    assert_eq!(
        server,
        "port 51820\nproto tcp-server\ndev tun\nclient-config-dir /etc/openvpn/ccd\nccd-exclusive\n"
    );
    assert_eq!(
        fs.file(CLIENT_TEMPLATE).unwrap(),
        "client\nremote 203.0.113.9 51820\nproto tcp-client\n"
    );
    let state = fs.file(STATE_FILE).unwrap();
    assert!(state.starts_with("# node settings\n"));
    assert!(state.contains("TUNNEL_ADDRESS = 203.0.113.9\n"));
    assert!(state.contains("PROTOCOL = tcp\n"));
    assert!(state.contains("OVPN_PORT = 51820\n"));
    assert!(state.contains("SERVICE_PORT = 9090\n"));
    assert!(state.contains("API_KEY = secret\n"));
    assert_eq!(fs.mode("/etc/openvpn/ccd"), Some(0o755));

    // The ccd dir was created, so the daemon restarts twice.
    assert_eq!(
        host.supervisor.calls(),
        [
            "restart openvpn-server@server.service",
            "restart openvpn-server@server.service",
            "install ov-node",
        ]
    );
    let (program, args, steps) = &host.driver.calls()[0];
    assert_eq!(program, "bash");
    assert_eq!(args, &["/root/openvpn-install.sh"]);
    assert_eq!(*steps, 6);
    assert_eq!(host.remote.urls(), ["https://git.io/vpn"]);
    assert_eq!(
        prompter.prompts(),
        [
            "Tunnel Address",
            "Protocol - tcp or udp",
            "OpenVPN Port",
            "OV-Node service port",
            "OV-Node API key",
        ]
    );
    assert_eq!(reporter.steps()[0], "[1/8] fetch installer");
}

#[tokio::test]
async fn empty_answers_select_defaults_and_bad_input_warns() {
    let fs = installed_fs();
    let host = host_with_installer(&fs);
    let prompter = ScriptedPrompter::answering(&["", "gre", "99999", "", ""]);
    let reporter = RecordingReporter::default();

    let summary = install_node(
        &InstallerConfig::default(),
        &host,
        &prompter,
        &FixedAddress(Some("192.0.2.10")),
        &reporter,
    )
    .await
    .unwrap();

    let desired = &summary.desired;
    assert_eq!(desired.tunnel_address, "192.0.2.10");
    assert_eq!(desired.protocol, Protocol::Udp);
    assert_eq!(desired.vpn_port, 1194);
    // The generated key is a UUID v4.
    assert_eq!(desired.api_key.len(), 36);
    assert_eq!(summary.report.warnings.len(), 2);
    assert_eq!(reporter.warnings().len(), 2);
}

#[tokio::test]
async fn unresolvable_host_offers_placeholder_address() {
    let fs = installed_fs();
    let host = host_with_installer(&fs);
    let prompter = ScriptedPrompter::default();

    let summary = install_node(
        &InstallerConfig::default(),
        &host,
        &prompter,
        &FixedAddress(None),
        &RecordingReporter::default(),
    )
    .await
    .unwrap();

    assert_eq!(summary.desired.tunnel_address, "YOUR_SERVER_IP");
}

#[tokio::test]
async fn missing_template_and_client_file_degrade_to_warnings() {
    let fs = FakeFs::new();
    let mut host = fake_host(&fs);
    host.driver = host.driver.creating(SERVER_CONF, "port 1194\nproto udp\n");
    let reporter = RecordingReporter::default();

    let summary = install_node(
        &InstallerConfig::default(),
        &host,
        &ScriptedPrompter::default(),
        &FixedAddress(Some("192.0.2.10")),
        &reporter,
    )
    .await
    .unwrap();

    let warnings = &summary.report.warnings;
    assert!(warnings.iter().any(|w| w.contains(".env.example")));
    assert!(warnings.iter().any(|w| w.contains("client-common.txt")));
    // Seeded from the built-in template, then patched.
    let state = fs.file(STATE_FILE).unwrap();
    assert!(state.contains("TUNNEL_ADDRESS = 192.0.2.10"));
    assert!(state.contains("# OV-Node configuration"));
}

#[tokio::test]
async fn failing_installer_stops_after_first_stage() {
    let fs = installed_fs();
    let mut host = host_with_installer(&fs);
    host.driver.exit_code = 1;

    let err = install_node(
        &InstallerConfig::default(),
        &host,
        &ScriptedPrompter::default(),
        &FixedAddress(None),
        &RecordingReporter::default(),
    )
    .await
    .unwrap_err();

    let failed = err.downcast_ref::<StageFailed>().expect("stage context");
    assert_eq!(failed.stage, "run installer");
    assert_eq!(failed.index, 2);
    assert_eq!(failed.completed, ["fetch installer"]);
    assert!(host.supervisor.calls().is_empty());
    assert!(fs.file(STATE_FILE).is_none());
}
