//! Endpoint discovery with graceful degradation.
//!
//! Restricted targets ship the enumerator but answer enumeration and
//! notification registration with an "unsupported" status. Discovery treats
//! that as an expected outcome: it falls back to the default endpoint, then
//! to the platform's default stream, and records what it could not do.

use super::device::{DataFlow, DeviceEvent, DeviceRole, Endpoint, EndpointError};
use super::enumerator::{DeviceEnumerator, NotificationRegistration};
use super::notifications::{create_event_channel, DeviceNotificationClient};
use crate::config::DiscoveryConfig;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;
use tracing::{info, warn};

/// Where the backend's endpoint list came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndpointSource {
    /// Full enumeration succeeded
    Enumerated { endpoints: Vec<Endpoint> },

    /// Enumeration is unsupported; only the default endpoint is known
    DefaultOnly { endpoint: Endpoint },

    /// Nothing could be resolved; open the platform default stream
    SystemDefault { reason: String },
}

/// Outcome of notification registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSupport {
    Registered,
    Unsupported,
    Disabled,
}

/// Summary of one discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub flow: DataFlow,
    pub role: DeviceRole,
    pub source: EndpointSource,
    pub notifications: NotificationSupport,
}

impl DiscoveryReport {
    /// True when any part of discovery fell back.
    pub fn is_degraded(&self) -> bool {
        !matches!(self.source, EndpointSource::Enumerated { .. })
            || self.notifications == NotificationSupport::Unsupported
    }

    /// Endpoints known to the backend, in enumeration order.
    pub fn endpoints(&self) -> Vec<&Endpoint> {
        match &self.source {
            EndpointSource::Enumerated { endpoints } => endpoints.iter().collect(),
            EndpointSource::DefaultOnly { endpoint } => vec![endpoint],
            EndpointSource::SystemDefault { .. } => Vec::new(),
        }
    }
}

/// A live notification registration and its event stream.
pub struct DeviceWatcher {
    // Held for its Drop, which unregisters the client
    _registration: NotificationRegistration,
    events: Receiver<DeviceEvent>,
}

impl DeviceWatcher {
    pub fn events(&self) -> &Receiver<DeviceEvent> {
        &self.events
    }

    /// Drain the events delivered so far.
    pub fn pending_events(&self) -> Vec<DeviceEvent> {
        self.events.try_iter().collect()
    }
}

/// Result of [`discover`]: the report plus the watcher, if one was registered.
pub struct Discovery {
    pub report: DiscoveryReport,
    pub watcher: Option<DeviceWatcher>,
}

/// Discover endpoints for `config.flow`, degrading on unsupported operations.
///
/// Only failures other than the restricted-target statuses are returned as
/// errors.
pub fn discover(
    enumerator: &DeviceEnumerator,
    config: &DiscoveryConfig,
) -> Result<Discovery, EndpointError> {
    let source = match enumerator.endpoints(config.flow, config.state_mask()) {
        Ok(endpoints) => EndpointSource::Enumerated { endpoints },
        Err(e) if e.is_unsupported() => fallback(enumerator, config, &e),
        Err(e) => return Err(e),
    };

    let (notifications, watcher) = if config.watch_notifications {
        watch(enumerator)?
    } else {
        (NotificationSupport::Disabled, None)
    };

    let report = DiscoveryReport {
        flow: config.flow,
        role: config.role,
        source,
        notifications,
    };
    info!(
        flow = ?report.flow,
        endpoints = report.endpoints().len(),
        notifications = ?report.notifications,
        degraded = report.is_degraded(),
        "endpoint discovery finished"
    );

    Ok(Discovery { report, watcher })
}

fn fallback(
    enumerator: &DeviceEnumerator,
    config: &DiscoveryConfig,
    cause: &EndpointError,
) -> EndpointSource {
    // GetDefaultAudioEndpoint does not accept eAll
    let flow = match config.flow {
        DataFlow::All => DataFlow::Render,
        flow => flow,
    };

    match enumerator.default_endpoint(flow, config.role) {
        Ok(Some(endpoint)) => {
            warn!(id = %endpoint.id, "falling back to the default endpoint");
            EndpointSource::DefaultOnly { endpoint }
        }
        Ok(None) => {
            warn!(?flow, "no default endpoint; falling back to the system default stream");
            EndpointSource::SystemDefault {
                reason: format!("{cause}; no default {flow:?} endpoint"),
            }
        }
        Err(e) => {
            warn!(error = %e, "default endpoint unavailable; falling back to the system default stream");
            EndpointSource::SystemDefault {
                reason: format!("{cause}; {e}"),
            }
        }
    }
}

fn watch(
    enumerator: &DeviceEnumerator,
) -> Result<(NotificationSupport, Option<DeviceWatcher>), EndpointError> {
    let (sender, events) = create_event_channel();

    match DeviceNotificationClient::new(sender).register(enumerator) {
        Ok(registration) => Ok((
            NotificationSupport::Registered,
            Some(DeviceWatcher {
                _registration: registration,
                events,
            }),
        )),
        Err(e) if e.is_unsupported() => {
            warn!(error = %e, "endpoint notifications are not available");
            Ok((NotificationSupport::Unsupported, None))
        }
        Err(e) => Err(e),
    }
}
