//! Flash command implementation.

use bnctl_core::device::{flash_file, FlashProgress};
use bnctl_core::discovery::probe;
use bnctl_core::{CoreError, DeviceError};
use indicatif::{ProgressBar, ProgressStyle};

use super::{target_device, Context};
use crate::cli::FlashArgs;
use crate::error::CliError;

/// Progress bar driven by flash progress callbacks.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(json: bool) -> Self {
        let bar = if json {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages {msg}",
        )
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }
}

impl FlashProgress for CliProgress {
    fn on_prepared(&self, total_pages: u16) {
        self.bar.set_length(u64::from(total_pages));
        self.bar.set_message("flashing");
    }

    fn on_page(&self, index: u16, _total_pages: u16) {
        self.bar.set_position(u64::from(index) + 1);
    }

    fn on_complete(&self) {
        self.bar.finish_with_message("done");
    }

    fn on_error(&self, error: &str) {
        self.bar.abandon_with_message(format!("failed: {}", error));
    }
}

/// Run the flash command
pub async fn run_flash(args: FlashArgs, ctx: &Context) -> Result<(), CliError> {
    let formatter = ctx.formatter();
    let transport = ctx.transport().await?;
    let device = target_device(&args.target);
    let target = device.mac.to_string();

    if !args.file.is_file() {
        return Err(CliError::InvalidArgument(format!(
            "Could not open firmware file: {}",
            args.file.display()
        )));
    }

    let found = match probe(&transport, ctx.family, device.address, ctx.timeout).await {
        Ok(found) => found,
        Err(e @ CoreError::Device(DeviceError::NotFound(_))) => {
            println!("{}", formatter.format_result("flash", &target, false, "Device not found!"));
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    if !found.flash_mode {
        println!(
            "{}",
            formatter.format_result("flash", &target, false, "Device not in flashmode!")
        );
        return Err(DeviceError::NotInFlashMode(found.mac.to_string()).into());
    }

    let progress = CliProgress::new(ctx.json);
    if let Err(e) = flash_file(&transport, &device, &args.file, &progress).await {
        println!("{}", formatter.format_result("flash", &target, false, "Flashing failed!"));
        return Err(e.into());
    }

    println!("{}", formatter.format_result("flash", &target, true, "Flashing succeeded!"));
    Ok(())
}
