//! A station assembled from configuration.

use crate::config::StationConfig;
use crate::confirmation::{AnyConfirmationSource, StoreConfirmationSource};
use crate::coordinator::{IssuanceCoordinator, StationIdentity};
use crate::error::Result;
use crate::mock::RecordingPrintSink;
use crate::policy::PolicyHandle;
use crate::printer::{AnyPrintSink, RawPrinterSink};
use labelstation_hardware::mock::{MockDeviceLink, passing_snapshot};
use labelstation_hardware::{AnyDeviceLink, WrapperDeviceLink};
use labelstation_label::{
    DmtxCommandRenderer, LabelComposer, SymbolRenderer, TemplateRegistry,
    UnavailableRenderer,
};
use labelstation_storage::{Database, DatabaseConfig, SqliteIssuanceRepository};
use labelstation_tracking::{TrackingClient, TrackingConfig};
use std::time::Duration;
use tracing::{info, warn};

/// The coordinator over the production collaborators.
pub type Station =
    IssuanceCoordinator<AnyDeviceLink, SqliteIssuanceRepository, AnyPrintSink, AnyConfirmationSource>;

/// Open the database, build every collaborator and return the station.
///
/// The [`Database`] is returned so the caller can close it on shutdown.
pub async fn open(config: &StationConfig) -> Result<(Station, Database)> {
    let db_config = DatabaseConfig::new(config.database.path.clone())
        .max_connections(config.database.max_connections);
    let db = Database::open(db_config).await?;
    let store = SqliteIssuanceRepository::new(db.pool().clone());

    let station = assemble(config, store)?;
    info!(
        station = %station.identity().station_id,
        printer = station.printer_id(),
        "Station ready"
    );
    Ok((station, db))
}

/// Build a station over an existing store.
pub fn assemble(config: &StationConfig, store: SqliteIssuanceRepository) -> Result<Station> {
    let confirmations = confirmation_source(config, &store)?;

    let identity = StationIdentity {
        station_id: config.station.station_id.clone(),
        scanner_id: config.station.scanner_id.clone(),
    };

    Ok(IssuanceCoordinator::new(
        device_link(config),
        composer(config)?,
        store,
        print_sink(config),
        confirmations,
    )
    .with_policy(PolicyHandle::new(config.policy))
    .with_identity(identity)
    .with_printer(config.printer.id.clone()))
}

pub fn device_link(config: &StationConfig) -> AnyDeviceLink {
    let hardware = &config.hardware;

    if let Some(serial) = &hardware.simulate_serial {
        warn!(serial = %serial, "Using a simulated device");
        let (link, _handle) = MockDeviceLink::with_device(passing_snapshot(1, serial));
        return link.into();
    }

    let mut link = WrapperDeviceLink::new(&hardware.wrapper_path)
        .with_timeout(Duration::from_secs(hardware.timeout_secs));
    if let Some(launcher) = &hardware.launcher {
        link = link.with_launcher(launcher);
    }
    link.into()
}

/// Label composer with the built-in templates.
///
/// # Errors
///
/// Fails if a built-in template does not fit its page.
pub fn composer(config: &StationConfig) -> Result<LabelComposer> {
    let registry = TemplateRegistry::builtin();
    registry.validate()?;

    let renderer: Box<dyn SymbolRenderer> = match &config.templates.symbol_encoder {
        Some(program) => Box::new(
            DmtxCommandRenderer::new(program)
                .with_timeout(Duration::from_secs(config.templates.encoder_timeout_secs)),
        ),
        None => Box::new(UnavailableRenderer),
    };

    Ok(LabelComposer::new(registry, config.templates.base_assets(), renderer)
        .with_dpi(config.printer.dpi))
}

pub fn print_sink(config: &StationConfig) -> AnyPrintSink {
    if config.printer.simulate {
        return RecordingPrintSink::new().into();
    }
    RawPrinterSink::new(config.printer.print_settings())
        .with_timeout(Duration::from_secs(config.printer.timeout_secs))
        .into()
}

fn confirmation_source(
    config: &StationConfig,
    store: &SqliteIssuanceRepository,
) -> Result<AnyConfirmationSource> {
    Ok(match &config.tracking.base_url {
        Some(url) => {
            let tracking = TrackingConfig::parse(url)?.with_timeout_secs(config.tracking.timeout_secs);
            TrackingClient::new(tracking)?.into()
        }
        None => StoreConfirmationSource::new(store.clone()).into(),
    })
}
