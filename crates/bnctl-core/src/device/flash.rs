//! Paged firmware flashing.
//!
//! A flash announces the page count and a whole-image XOR checksum, then
//! sends every 512-byte page and waits for its acknowledgment before sending
//! the next one. The exchange lock is held for the whole transfer and a
//! started flash cannot be cancelled.

use std::path::Path;

use crate::error::{CoreError, DeviceError, Result};
use crate::events::Priority;
use crate::protocol::payload::{self, FLASH_PAGE_SIZE};
use crate::protocol::{Command, Packet};
use crate::transport::Transport;
use crate::types::Device;

use super::ops::timeout_error;

/// Trait for receiving flash progress updates.
///
/// The CLI drives an `indicatif` progress bar from it.
pub trait FlashProgress: Send + Sync {
    fn on_prepared(&self, total_pages: u16);
    /// Called after page `index` (zero-based) has been acknowledged.
    fn on_page(&self, index: u16, total_pages: u16);
    fn on_complete(&self);
    fn on_error(&self, error: &str);
}

/// No-op progress handler for when progress tracking isn't needed.
pub struct NoopProgress;

impl FlashProgress for NoopProgress {
    fn on_prepared(&self, _total_pages: u16) {}
    fn on_page(&self, _index: u16, _total_pages: u16) {}
    fn on_complete(&self) {}
    fn on_error(&self, _error: &str) {}
}

/// XOR of every byte of the image.
pub fn image_checksum(image: &[u8]) -> u8 {
    image.iter().fold(0, |acc, b| acc ^ b)
}

/// Number of pages needed for an image of `len` bytes.
pub fn page_count(len: usize) -> std::result::Result<u16, DeviceError> {
    if len == 0 {
        return Err(DeviceError::InvalidFirmware("image is empty".to_string()));
    }
    let pages = len.div_ceil(FLASH_PAGE_SIZE);
    u16::try_from(pages).map_err(|_| {
        DeviceError::InvalidFirmware(format!("image of {} bytes needs too many pages", len))
    })
}

/// Flash `image` to a device that is in flash mode.
pub async fn flash<P>(transport: &Transport, device: &Device, image: &[u8], progress: &P) -> Result<()>
where
    P: FlashProgress + ?Sized,
{
    let result = flash_inner(transport, device, image, progress).await;
    match &result {
        Ok(()) => progress.on_complete(),
        Err(e) => progress.on_error(&e.to_string()),
    }
    result
}

async fn flash_inner<P>(transport: &Transport, device: &Device, image: &[u8], progress: &P) -> Result<()>
where
    P: FlashProgress + ?Sized,
{
    let total = page_count(image.len())?;
    let checksum = image_checksum(image);
    let wait = transport.config().timeout();
    let events = transport.events();

    let exchange = transport.exchange().await?;

    tracing::info!(device = %device.mac, pages = total, checksum, "Preparing flash");
    let prepare = Packet::new(
        Command::FlashPrepare,
        payload::flash_prepare_request(device.mac, total, checksum),
    )?;
    exchange
        .request(&prepare, device.address, wait)
        .await?
        .ok_or_else(|| timeout_error(device, Command::FlashPrepare))?;
    progress.on_prepared(total);

    for (index, chunk) in (0..total).zip(image.chunks(FLASH_PAGE_SIZE)) {
        let page = Packet::new(
            Command::FlashPage,
            payload::flash_page_request(device.mac, index, chunk),
        )?;

        let acked = exchange.request(&page, device.address, wait).await?;
        if acked.is_none() {
            tracing::warn!(device = %device.mac, page = index, total, "Page not acknowledged");
            return Err(CoreError::Device(DeviceError::FlashAborted {
                device: device.address.to_string(),
                page: index,
                total,
            }));
        }

        events.log(
            Priority::Info,
            &format!("Page {} of {} flashed...", index + 1, total),
        );
        progress.on_page(index, total);
    }

    tracing::info!(device = %device.mac, pages = total, "Flash complete");
    Ok(())
}

/// Read a firmware image from disk and flash it.
pub async fn flash_file<P>(transport: &Transport, device: &Device, path: &Path, progress: &P) -> Result<()>
where
    P: FlashProgress + ?Sized,
{
    let image = tokio::fs::read(path).await?;
    flash(transport, device, &image, progress).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_checksum() {
        assert_eq!(image_checksum(&[]), 0);
        assert_eq!(image_checksum(&[0x0f, 0xf0, 0xaa]), 0x55);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(1).unwrap(), 1);
        assert_eq!(page_count(512).unwrap(), 1);
        assert_eq!(page_count(513).unwrap(), 2);
        assert_eq!(page_count(512 * 65535).unwrap(), 65535);
        assert!(matches!(page_count(0), Err(DeviceError::InvalidFirmware(_))));
        assert!(page_count(512 * 65535 + 1).is_err());
    }
}
