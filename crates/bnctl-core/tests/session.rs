mod common;

use std::net::Ipv4Addr;

use bnctl_core::device::{ConfigSession, SessionConfig};
use bnctl_core::keymap::{prepare_set, ConfigValue};
use bnctl_core::events::testing::RecordingSink;
use bnctl_core::{ConfigError, CoreError, Credentials, Device, Priority, FOS, RPS};

use common::{mac, serve_once};

fn session(port: u16) -> ConfigSession {
    let device = Device::new(mac(1), Ipv4Addr::LOCALHOST)
        .with_port(port)
        .with_credentials(Credentials::new("admin", "secret"));
    ConfigSession::new(device, &FOS, &SessionConfig::default()).unwrap()
}

fn request_line(head: &str) -> &str {
    head.lines().next().unwrap_or_default()
}

#[tokio::test]
async fn test_set_dhcp_sends_command_path() {
    let (port, server) = serve_once(200, vec![]).await;

    let prepared = prepare_set(&FOS, "dhcp", Some("0")).unwrap();
    session(port).commit_set(&prepared).await.unwrap();

    let head = server.await.unwrap();
    assert_eq!(request_line(&head), "GET /?cmd=3&dhcp=0 HTTP/1.1");
    // admin:secret
    assert!(head
        .to_ascii_lowercase()
        .contains("authorization: basic ywrtaw46c2vjcmv0"));
    assert!(head.contains("bnctl"));
}

#[tokio::test]
async fn test_set_unauthorized_is_auth_failure() {
    let (port, server) = serve_once(401, vec![]).await;
    let events = RecordingSink::shared();

    let err = session(port)
        .with_event_sink(events.clone())
        .set("power1", Some("yes"))
        .await
        .unwrap_err();
    let head = server.await.unwrap();

    assert_eq!(request_line(&head), "GET /?cmd=5&p=0&s=1 HTTP/1.1");
    assert_eq!(
        err.to_string(),
        "Config error: Invalid username/password for 127.0.0.1"
    );
    assert!(matches!(err, CoreError::Config(ConfigError::AuthFailure { .. })));
    assert_eq!(
        events.messages(Priority::Error),
        vec!["Invalid username/password to change value!".to_string()]
    );
}

#[tokio::test]
async fn test_set_server_error_is_command_failure() {
    let (port, server) = serve_once(500, vec![]).await;

    let err = session(port).set("port", Some("8080")).await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(
        err,
        CoreError::Config(ConfigError::CommandFailed { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_invalid_value_sends_nothing() {
    let s = session(9);
    let err = s.set("port", Some("0")).await.unwrap_err();
    assert!(matches!(err, CoreError::Config(ConfigError::Validation { .. })));
}

#[tokio::test]
async fn test_dump_streams_chunked_body() {
    let (port, server) = serve_once(
        200,
        vec![
            "bnfos_confmap_magic=0.1\n3_dhcp=che",
            "cked\n3_ip=10.0.0.7\n3_",
            "port=8080\n5_p0=0\n",
        ],
    )
    .await;

    let dump = session(port).dump().await.unwrap();
    let head = server.await.unwrap();

    assert_eq!(request_line(&head), "GET /config.txt HTTP/1.1");
    assert_eq!(dump.get("dhcp"), Some(&ConfigValue::Flag(true)));
    assert_eq!(
        dump.get("address"),
        Some(&ConfigValue::Address(Ipv4Addr::new(10, 0, 0, 7)))
    );
    assert_eq!(dump.get("port"), Some(&ConfigValue::Text("8080".to_string())));
    assert_eq!(dump.get("power1"), Some(&ConfigValue::Flag(false)));
    assert_eq!(dump.len(), 4);
}

#[tokio::test]
async fn test_dump_without_magic_is_no_configuration() {
    let (port, server) = serve_once(200, vec!["3_dhcp=1\n"]).await;

    let err = session(port).dump().await.unwrap_err();
    server.await.unwrap();

    assert_eq!(
        err.to_string(),
        "Config error: No valid configuration found on 127.0.0.1"
    );
}

#[tokio::test]
async fn test_dump_version_mismatch_warns() {
    let (port, server) = serve_once(200, vec!["bnrps_confmap_magic=0.3\n4_dhcp=1\n"]).await;
    let events = RecordingSink::shared();

    let device = Device::new(mac(2), Ipv4Addr::LOCALHOST).with_port(port);
    let session = ConfigSession::new(device, &RPS, &SessionConfig::default())
        .unwrap()
        .with_event_sink(events.clone());

    let value = session.get_value("dhcp").await.unwrap();
    server.await.unwrap();

    assert_eq!(value, Some(ConfigValue::Flag(true)));
    let warnings = events.messages(Priority::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("0.3"));
}
