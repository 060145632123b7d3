//! Configuration commands over the HTTP interface: set, get and show.

use bnctl_core::keymap::prepare_set;
use bnctl_core::DeviceFamily;

use super::{pause, Context};
use crate::cli::{GetArgs, SetArgs, ShowArgs};
use crate::error::{CliError, ConfigError};

/// Split `<key>=<value>`. A bare key has no value.
pub fn parse_assignment(assignment: &str) -> (&str, Option<&str>) {
    match assignment.split_once('=') {
        Some((key, value)) => (key, Some(value)),
        None => (assignment, None),
    }
}

fn key_hint(family: &DeviceFamily, err: ConfigError) -> CliError {
    match err {
        ConfigError::UnknownKey(key) => CliError::InvalidArgument(format!(
            "Invalid key '{}' for {} devices, run 'bnctl --family {} keys' for valid keys",
            key, family.name, family.name
        )),
        other => other.into(),
    }
}

/// Run the set command
pub async fn run_set(args: SetArgs, ctx: &Context) -> Result<(), CliError> {
    let formatter = ctx.formatter();
    let (key, value) = parse_assignment(&args.assignment);

    let prepared = prepare_set(ctx.family, key, value).map_err(|e| key_hint(ctx.family, e))?;
    let keyword = prepared.descriptor().keyword;

    let session = ctx.session(&args.http)?;
    session.commit_set(&prepared).await?;

    println!(
        "{}",
        formatter.format_result(
            "set",
            &args.http.host.to_string(),
            true,
            &format!("Setting {} succeeded!", keyword)
        )
    );
    Ok(())
}

/// Run the get command
pub async fn run_get(args: GetArgs, ctx: &Context) -> Result<(), CliError> {
    let formatter = ctx.formatter();
    let descriptor = ctx
        .family
        .lookup(&args.key)
        .map_err(|e| key_hint(ctx.family, e))?;
    let session = ctx.session(&args.http)?;

    loop {
        let value = session.get_value(descriptor.keyword).await?;
        println!("{}", formatter.format_value(descriptor.keyword, value.as_ref()));

        if !pause(&args.repeat).await {
            break;
        }
    }

    Ok(())
}

/// Run the show command
pub async fn run_show(args: ShowArgs, ctx: &Context) -> Result<(), CliError> {
    let formatter = ctx.formatter();
    let session = ctx.session(&args.http)?;

    loop {
        let dump = session.dump().await?;
        println!("{}", formatter.format_dump(&dump));

        if !pause(&args.repeat).await {
            break;
        }
        println!();
    }

    Ok(())
}
