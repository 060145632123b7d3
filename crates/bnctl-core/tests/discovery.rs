mod common;

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use bnctl_core::discovery::{discover, probe, scan, ScanControl};
use bnctl_core::protocol::{Command, Packet};
use bnctl_core::{CoreError, DeviceError, FOS, RPS};

use common::{discovered, netconf_frame, recv_frame, MockDevice};

/// Answer the next get-netconf request with `frames`.
fn answer(mock: MockDevice, frames: Vec<Vec<u8>>) -> tokio::task::JoinHandle<MockDevice> {
    tokio::spawn(async move {
        let (request, src) = recv_frame(&mock.socket, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(request.command, Command::GetNetconf);
        assert!(request.payload.is_empty());
        for frame in frames {
            mock.socket.send_to(&frame, src).await.unwrap();
        }
        mock
    })
}

#[tokio::test]
async fn test_scan_collects_matching_devices_in_arrival_order() {
    let mock = MockDevice::new().await;
    let transport = mock.transport(500).await;

    let mut corrupted = netconf_frame(&discovered(9, 0x50));
    let last = corrupted.len() - 1;
    corrupted[last] ^= 0xff;
    let wrong_command = Packet::new(Command::Ping, vec![0u8; 8]).unwrap().encode().to_vec();

    let frames = vec![
        netconf_frame(&discovered(1, 0x50)),
        netconf_frame(&discovered(2, 0x35)),
        corrupted,
        netconf_frame(&discovered(3, 0xbb)),
        wrong_command,
        netconf_frame(&discovered(4, 0x1234)),
        netconf_frame(&discovered(5, 0x50)),
    ];
    let responder = answer(mock, frames);

    let devices = discover(&transport, &FOS, Some(Ipv4Addr::LOCALHOST), Duration::from_millis(500))
        .await
        .unwrap();
    responder.await.unwrap();

    let macs: Vec<u8> = devices.iter().map(|d| d.mac.0[5]).collect();
    assert_eq!(macs, vec![1, 3, 5]);
    assert_eq!(devices[0], discovered(1, 0x50));
}

#[tokio::test]
async fn test_scan_filters_by_family() {
    let mock = MockDevice::new().await;
    let transport = mock.transport(300).await;

    let frames = vec![
        netconf_frame(&discovered(1, 0x50)),
        netconf_frame(&discovered(2, 0x35)),
        netconf_frame(&discovered(3, 0xbb)),
    ];
    let responder = answer(mock, frames);

    let devices = discover(&transport, &RPS, Some(Ipv4Addr::LOCALHOST), Duration::from_millis(300))
        .await
        .unwrap();
    responder.await.unwrap();

    let macs: Vec<u8> = devices.iter().map(|d| d.mac.0[5]).collect();
    assert_eq!(macs, vec![2, 3]);
}

#[tokio::test]
async fn test_scan_without_matches_succeeds() {
    let mock = MockDevice::new().await;
    let transport = mock.transport(200).await;
    let responder = answer(mock, vec![netconf_frame(&discovered(1, 0x99))]);

    let mut calls = 0;
    scan(
        &transport,
        &FOS,
        Some(Ipv4Addr::LOCALHOST),
        Duration::from_millis(200),
        |_| {
            calls += 1;
            ScanControl::Continue
        },
    )
    .await
    .unwrap();
    responder.await.unwrap();

    assert_eq!(calls, 0);
}

#[tokio::test]
async fn test_abort_stops_collection_early() {
    let mock = MockDevice::new().await;
    let transport = mock.transport(3_000).await;
    let frames = (1..=3).map(|i| netconf_frame(&discovered(i, 0x50))).collect();
    let responder = answer(mock, frames);

    let started = Instant::now();
    let mut seen = Vec::new();
    scan(
        &transport,
        &FOS,
        Some(Ipv4Addr::LOCALHOST),
        Duration::from_secs(3),
        |device| {
            seen.push(device.mac.0[5]);
            ScanControl::Abort
        },
    )
    .await
    .unwrap();
    responder.await.unwrap();

    assert_eq!(seen, vec![1]);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_probe_returns_first_device() {
    let mock = MockDevice::new().await;
    let transport = mock.transport(1_000).await;
    let mut flashing = discovered(7, 0xbb);
    flashing.flash_mode = true;
    let responder = answer(mock, vec![netconf_frame(&flashing)]);

    let device = probe(&transport, &FOS, Ipv4Addr::LOCALHOST, Duration::from_secs(1))
        .await
        .unwrap();
    responder.await.unwrap();

    assert!(device.flash_mode);
    assert_eq!(device.mode_name(), "FLASH MODE");
}

#[tokio::test]
async fn test_probe_without_reply_is_not_found() {
    let mock = MockDevice::new().await;
    let transport = mock.transport(100).await;

    let err = probe(&transport, &FOS, Ipv4Addr::LOCALHOST, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Device(DeviceError::NotFound(_))));
}

#[tokio::test]
async fn test_scan_requires_initialized_transport() {
    let mock = MockDevice::new().await;
    let transport = mock.transport(100).await;
    transport.teardown().await;

    let err = discover(&transport, &FOS, None, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Device(DeviceError::NotInitialized)));
}
