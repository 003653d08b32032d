use crate::{BusError, BusResult, EventBus, InMemoryBus, NatsBus};
use std::str::FromStr;
use std::sync::Arc;

/// Which transport backs the process-wide bus handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusType {
    Nats,
    InMemory,
}

impl FromStr for BusType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nats" => Ok(BusType::Nats),
            "inmemory" => Ok(BusType::InMemory),
            other => Err(format!(
                "Invalid BUS_TYPE: {}. Must be 'inmemory' or 'nats'",
                other
            )),
        }
    }
}

/// Build the single shared bus handle for a process
///
/// Called once from `main`; the returned handle is cloned into every
/// publisher and subscriber.
pub async fn connect(bus_type: BusType, nats_url: &str) -> BusResult<Arc<dyn EventBus>> {
    match bus_type {
        BusType::InMemory => {
            tracing::info!("Using InMemory event bus");
            Ok(Arc::new(InMemoryBus::new()))
        }
        BusType::Nats => {
            tracing::info!(nats_url = %nats_url, "Connecting to NATS");
            let client = async_nats::connect(nats_url)
                .await
                .map_err(|e| BusError::ConnectionError(e.to_string()))?;
            Ok(Arc::new(NatsBus::new(client)))
        }
    }
}
