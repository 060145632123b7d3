mod common;

use std::io::Write;
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::time::Duration;

use bnctl_core::device::{flash, flash_file, FlashProgress, NoopProgress};
use bnctl_core::protocol::payload::FLASH_PAGE_SIZE;
use bnctl_core::protocol::{Command, Packet};
use bnctl_core::{CoreError, Device, DeviceError};

use common::{mac, recv_frame, MockDevice};

#[derive(Default)]
struct Progress {
    prepared: Mutex<Option<u16>>,
    pages: Mutex<Vec<u16>>,
    completed: Mutex<bool>,
    errors: Mutex<Vec<String>>,
}

impl FlashProgress for Progress {
    fn on_prepared(&self, total_pages: u16) {
        *self.prepared.lock().unwrap() = Some(total_pages);
    }
    fn on_page(&self, index: u16, _total_pages: u16) {
        self.pages.lock().unwrap().push(index);
    }
    fn on_complete(&self) {
        *self.completed.lock().unwrap() = true;
    }
    fn on_error(&self, error: &str) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}

/// Frames received by the mock flash target.
struct Received {
    prepare: Vec<u8>,
    pages: Vec<Vec<u8>>,
}

/// Acknowledge the prepare request and every page before `fail_at`.
/// Keeps listening briefly after the last ack to catch stray pages.
fn flash_target(mock: MockDevice, fail_at: Option<u16>) -> tokio::task::JoinHandle<Received> {
    tokio::spawn(async move {
        let (prepare, src) = recv_frame(&mock.socket, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(prepare.command, Command::FlashPrepare);
        let ack = Packet::new(Command::FlashPrepare, prepare.payload[..6].to_vec()).unwrap();
        mock.socket.send_to(&ack.encode(), src).await.unwrap();

        let mut pages = Vec::new();
        while let Some((page, src)) = recv_frame(&mock.socket, Duration::from_millis(400)).await {
            assert_eq!(page.command, Command::FlashPage);
            let index = u16::from_be_bytes([page.payload[6], page.payload[7]]);
            pages.push(page.payload.to_vec());
            if Some(index) == fail_at {
                continue;
            }
            let ack = Packet::new(Command::FlashPage, page.payload[..8].to_vec()).unwrap();
            mock.socket.send_to(&ack.encode(), src).await.unwrap();
        }

        Received {
            prepare: prepare.payload.to_vec(),
            pages,
        }
    })
}

fn image(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8 + 1).collect()
}

#[tokio::test]
async fn test_flash_sends_every_page() {
    let mock = MockDevice::new().await;
    let transport = mock.transport(1_000).await;
    let target = flash_target(mock, None);

    let data = image(3 * FLASH_PAGE_SIZE + 100);
    let progress = Progress::default();
    let device = Device::new(mac(1), Ipv4Addr::LOCALHOST);

    flash(&transport, &device, &data, &progress).await.unwrap();
    let received = target.await.unwrap();

    let checksum = data.iter().fold(0u8, |acc, b| acc ^ b);
    assert_eq!(&received.prepare[..6], &mac(1).0);
    assert_eq!(&received.prepare[6..], &[0x00, 0x04, checksum]);

    assert_eq!(received.pages.len(), 4);
    for (i, page) in received.pages.iter().enumerate() {
        assert_eq!(page.len(), 6 + 2 + FLASH_PAGE_SIZE);
        assert_eq!(u16::from_be_bytes([page[6], page[7]]), i as u16);
    }
    let last = &received.pages[3][8..];
    assert_eq!(&last[..100], &data[3 * FLASH_PAGE_SIZE..]);
    assert!(last[100..].iter().all(|b| *b == 0));

    assert_eq!(*progress.prepared.lock().unwrap(), Some(4));
    assert_eq!(*progress.pages.lock().unwrap(), vec![0, 1, 2, 3]);
    assert!(*progress.completed.lock().unwrap());
}

#[tokio::test]
async fn test_flash_aborts_on_missing_page_ack() {
    let mock = MockDevice::new().await;
    let transport = mock.transport(200).await;
    let target = flash_target(mock, Some(2));

    let data = image(5 * FLASH_PAGE_SIZE);
    let progress = Progress::default();
    let device = Device::new(mac(1), Ipv4Addr::LOCALHOST);

    let err = flash(&transport, &device, &data, &progress)
        .await
        .unwrap_err();
    let received = target.await.unwrap();

    assert!(matches!(
        err,
        CoreError::Device(DeviceError::FlashAborted { page: 2, total: 5, .. })
    ));
    assert_eq!(received.pages.len(), 3);
    assert_eq!(*progress.pages.lock().unwrap(), vec![0, 1]);
    assert_eq!(progress.errors.lock().unwrap().len(), 1);
    assert!(!*progress.completed.lock().unwrap());
}

#[tokio::test]
async fn test_flash_fails_without_prepare_ack() {
    let mock = MockDevice::new().await;
    let transport = mock.transport(100).await;
    let device = Device::new(mac(1), Ipv4Addr::LOCALHOST);

    let err = flash(&transport, &device, &image(10), &NoopProgress)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Device(DeviceError::Timeout { ref operation, .. }) if operation == "flash-prepare"
    ));

    let (prepare, _) = recv_frame(&mock.socket, Duration::from_millis(100))
        .await
        .unwrap();
    assert_eq!(prepare.command, Command::FlashPrepare);
    assert!(recv_frame(&mock.socket, Duration::from_millis(100)).await.is_none());
}

#[tokio::test]
async fn test_empty_image_is_rejected() {
    let mock = MockDevice::new().await;
    let transport = mock.transport(100).await;
    let device = Device::new(mac(1), Ipv4Addr::LOCALHOST);

    let err = flash(&transport, &device, &[], &NoopProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Device(DeviceError::InvalidFirmware(_))));
    assert!(recv_frame(&mock.socket, Duration::from_millis(100)).await.is_none());
}

#[tokio::test]
async fn test_flash_file_reads_image() {
    let mock = MockDevice::new().await;
    let transport = mock.transport(1_000).await;
    let target = flash_target(mock, None);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&image(FLASH_PAGE_SIZE + 1)).unwrap();
    file.flush().unwrap();

    let device = Device::new(mac(1), Ipv4Addr::LOCALHOST);
    flash_file(&transport, &device, file.path(), &NoopProgress)
        .await
        .unwrap();

    let received = target.await.unwrap();
    assert_eq!(received.pages.len(), 2);
}
