//! Kick command implementation.

use std::sync::Arc;

use bnctl_core::device::{kick_watchdog, KickerSettings, WatchdogKicker, WatchdogListener, WatchdogState};
use chrono::{DateTime, Local, Utc};
use colored::*;

use super::{target_device, Context};
use crate::cli::KickArgs;
use crate::error::CliError;

/// Prints kicker state changes as they happen.
struct KickReporter {
    json: bool,
}

impl WatchdogListener for KickReporter {
    fn on_state(&self, name: &str, state: WatchdogState, at: DateTime<Utc>) {
        if self.json {
            let line = serde_json::json!({
                "device": name,
                "state": state,
                "at": at.to_rfc3339(),
            });
            println!("{}", line);
            return;
        }

        let label = match state {
            WatchdogState::WatchdogOk => "Watchdog successfully kicked!".green(),
            WatchdogState::WatchdogFailed => "Watchdog did not response!".red(),
            other => other.to_string().dimmed(),
        };
        println!(
            "[{}] {}: {}",
            at.with_timezone(&Local).format("%H:%M:%S"),
            name,
            label
        );
    }
}

/// Run the kick command
pub async fn run_kick(args: KickArgs, ctx: &Context) -> Result<(), CliError> {
    let transport = ctx.transport().await?;
    let device = target_device(&args.target);

    if !args.repeat.continuous {
        let formatter = ctx.formatter();
        let target = device.mac.to_string();
        return match kick_watchdog(&transport, &device).await {
            Ok(()) => {
                println!(
                    "{}",
                    formatter.format_result("kick", &target, true, "Watchdog successfully kicked!")
                );
                Ok(())
            }
            Err(e) => {
                println!(
                    "{}",
                    formatter.format_result("kick", &target, false, "Watchdog did not response!")
                );
                Err(e.into())
            }
        };
    }

    let settings = KickerSettings {
        interval_secs: args.repeat.wait,
        start_delay_secs: Some(0),
    };
    let name = device.mac.to_string();
    let listener = Arc::new(KickReporter { json: ctx.json });
    let kicker = WatchdogKicker::start(transport, device, name, settings, listener)?;

    if !ctx.json {
        eprintln!("Kicking watchdog of {} (press Ctrl+C to stop)...", kicker.name());
    }
    tokio::signal::ctrl_c().await?;
    kicker.stop().await;
    Ok(())
}
