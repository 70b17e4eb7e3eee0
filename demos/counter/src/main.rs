//! Key press counter plugin.
//!
//! Every key running this action shows how often it has been pressed. The
//! count is stored in the action's settings so it survives restarts.
//!
//! The Stream Deck application launches the binary itself:
//!   counter -port 28196 -pluginUUID <uuid> -registerEvent registerPlugin -info '{...}'

mod counter;

use std::sync::Arc;

use streamdeck_client::{Connection, RegistrationArgs};
use streamdeck_core::TypeRegistry;
use streamdeck_core::received::{KeyUp, WillAppear, WillDisappear};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::counter::{Counters, Update};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("counter=info".parse()?)
                .add_directive("streamdeck_client=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = RegistrationArgs::from_env()?;
    let info = args.info()?;
    tracing::info!(
        "Starting on port {} (Stream Deck {})",
        args.port,
        info["application"]["version"].as_str().unwrap_or("unknown")
    );

    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let mut conn = Connection::new(Arc::new(TypeRegistry::builtin()));

    let tx = updates_tx.clone();
    conn.on(move |event: WillAppear| {
        let count = counter::count_from_settings(&event.payload.settings);
        let _ = tx.send(Update::Appeared {
            context: event.context,
            count,
        });
    })?;

    let tx = updates_tx.clone();
    conn.on(move |event: KeyUp| {
        let _ = tx.send(Update::Pressed {
            context: event.context,
        });
    })?;

    let tx = updates_tx;
    conn.on(move |event: WillDisappear| {
        let _ = tx.send(Update::Disappeared {
            context: event.context,
        });
    })?;

    let plugin = conn.connect(&args).await?;
    tokio::spawn(Counters::default().run(plugin.clone(), updates_rx));

    plugin.wait_for_exit().await;
    tracing::info!("Stream Deck closed the connection");
    Ok(())
}
