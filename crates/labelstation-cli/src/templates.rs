//! # Templates and Preview Subcommands
//!
//! `templates` lists the label layouts and whether their base artwork is in
//! place. `preview` composes one label exactly as an issuance would and
//! writes the printer job to a file, without touching the database or the
//! printer.

use anyhow::{Context as _, Result, bail};
use clap::Args;
use labelstation_core::SerialNumber;
use labelstation_label::{PageArtifact, tspl};
use labelstation_station::{StationConfig, station};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{Context, EXIT_OK, render};

/// Arguments for the `labelstation preview` subcommand.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Serial number, e.g. RC-103-000123.
    #[arg(value_name = "SERIAL")]
    pub serial: String,

    /// TSPL output file. Defaults to `<SERIAL>.tspl`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Also write the composed page as a PNG.
    #[arg(long)]
    pub png: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PreviewReport<'a> {
    serial: &'a str,
    device_type: String,
    width_dots: u32,
    height_dots: u32,
    dpi: u32,
    symbol: bool,
    tspl: &'a Path,
    tspl_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    png: Option<&'a Path>,
}

/// Execute the templates subcommand.
pub fn run_templates(ctx: &Context) -> Result<u8> {
    let composer = station::composer(&ctx.config)?;
    let registry = composer.registry();
    let templates: Vec<_> = registry.iter().collect();

    ctx.output.emit(&mut io::stdout(), &templates, || {
        templates
            .iter()
            .map(|t| render::template(t, composer.assets()))
            .collect::<Vec<_>>()
            .join("\n")
    })?;

    Ok(EXIT_OK)
}

/// Compose the label for `serial` and encode it for the configured printer.
pub fn preview_label(config: &StationConfig, serial: &str) -> Result<(PageArtifact, Vec<u8>)> {
    let serial = match SerialNumber::parse(serial) {
        Ok(serial) => serial,
        Err(e) => bail!("invalid serial number {serial:?}: {e}"),
    };

    let composer = station::composer(config)?;
    let artifact = composer
        .compose(serial.as_str(), serial.device_type(), serial.as_str().as_bytes())
        .with_context(|| format!("failed to compose label for {serial}"))?;
    let job = tspl::encode(&artifact, &config.printer.print_settings());

    Ok((artifact, job))
}

/// Execute the preview subcommand.
pub fn run_preview(args: &PreviewArgs, ctx: &Context) -> Result<u8> {
    let (artifact, job) = preview_label(&ctx.config, &args.serial)?;

    let tspl_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.tspl", artifact.serial)));
    std::fs::write(&tspl_path, &job)
        .with_context(|| format!("failed to write {}", tspl_path.display()))?;

    if let Some(png) = &args.png {
        artifact
            .flatten()
            .save_with_format(png, image::ImageFormat::Png)
            .with_context(|| format!("failed to write {}", png.display()))?;
    }

    info!(serial = %artifact.serial, path = %tspl_path.display(), "Preview written");

    let report = PreviewReport {
        serial: &artifact.serial,
        device_type: artifact.device_type.to_string(),
        width_dots: artifact.width_dots,
        height_dots: artifact.height_dots,
        dpi: artifact.dpi,
        symbol: artifact.has_symbol(),
        tspl: &tspl_path,
        tspl_bytes: job.len(),
        png: args.png.as_deref(),
    };

    ctx.output.emit(&mut io::stdout(), &report, || {
        let symbol = if report.symbol { "with symbol" } else { "without symbol" };
        format!(
            "{} ({}) composed at {} x {} dots, {}; {} bytes written to {}",
            report.serial,
            report.device_type,
            report.width_dots,
            report.height_dots,
            symbol,
            report.tspl_bytes,
            tspl_path.display()
        )
    })?;

    Ok(EXIT_OK)
}
