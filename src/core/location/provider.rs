//! Location capture with protection against out-of-order completions.

use super::{Coordinate, FixOptions, LocationContext, LocationStatus, PositionSource};
use crate::core::geocode::ReverseGeocoder;
use crate::error::LocationError;
use std::sync::Arc;

/// Identifies one capture request.
///
/// Ids increase monotonically; only the most recently issued ticket may
/// write to the location context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocationTicket {
    id: u64,
}

impl LocationTicket {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Address obtained for a coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddress {
    pub address: String,
    /// True when the lookup failed and the coordinate text was used instead
    pub degraded: bool,
}

/// Final result of a capture request
#[derive(Debug, Clone, PartialEq)]
pub enum LocationOutcome {
    Resolved {
        coordinate: Coordinate,
        address: ResolvedAddress,
    },
    Failed(LocationError),
}

/// What happened when an outcome was applied to the context
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// The context was updated
    Updated,
    /// A newer request was issued meanwhile; nothing was written
    Stale,
    /// The fix failed; the context is now `Failed`
    Failed(LocationError),
}

/// Captures the device position and resolves it to an address
pub struct LocationProvider {
    source: Arc<dyn PositionSource>,
    geocoder: Arc<dyn ReverseGeocoder>,
    options: FixOptions,
    latest: u64,
}

impl LocationProvider {
    pub fn new(source: Arc<dyn PositionSource>, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        Self {
            source,
            geocoder,
            options: FixOptions::default(),
            latest: 0,
        }
    }

    /// Set the fix options used for every request
    pub fn with_options(mut self, options: FixOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> FixOptions {
        self.options
    }

    /// Start a new capture. Supersedes any request still in flight.
    pub fn begin(&mut self, context: &mut LocationContext) -> LocationTicket {
        self.latest += 1;
        context.status = LocationStatus::Loading;
        tracing::debug!(request = self.latest, source = self.source.name(), "location capture started");
        LocationTicket { id: self.latest }
    }

    /// Whether the ticket belongs to the most recent request
    pub fn is_current(&self, ticket: &LocationTicket) -> bool {
        ticket.id == self.latest
    }

    /// Request a one-shot fix, bounded by the configured timeout
    pub async fn fix(&self, ticket: &LocationTicket) -> Result<Coordinate, LocationError> {
        let timeout = self.options.timeout;
        let request = self.source.current_position(self.options);

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => {
                if let Err(ref e) = result {
                    tracing::warn!(request = ticket.id, error = %e, "position fix failed");
                }
                result
            }
            Err(_) => {
                tracing::warn!(request = ticket.id, "position fix timed out");
                Err(LocationError::Timeout {
                    seconds: timeout.as_secs(),
                })
            }
        }
    }

    /// Resolve a coordinate to an address, falling back to the coordinate text
    pub async fn lookup_address(&self, coordinate: Coordinate) -> ResolvedAddress {
        match self.geocoder.reverse(coordinate).await {
            Ok(address) => ResolvedAddress {
                address,
                degraded: false,
            },
            Err(e) => {
                tracing::warn!(error = %e, "reverse geocoding failed, using coordinates");
                ResolvedAddress {
                    address: coordinate.fallback_address(),
                    degraded: true,
                }
            }
        }
    }

    /// Record the result of [`fix`](Self::fix)
    pub fn apply_fix(
        &self,
        ticket: &LocationTicket,
        fix: &Result<Coordinate, LocationError>,
        context: &mut LocationContext,
    ) -> Applied {
        if !self.is_current(ticket) {
            tracing::debug!(request = ticket.id, latest = self.latest, "discarding stale fix");
            return Applied::Stale;
        }

        match fix {
            Ok(coordinate) => {
                context.coordinate = Some(*coordinate);
                context.status = LocationStatus::ResolvingAddress;
                Applied::Updated
            }
            Err(e) => {
                context.coordinate = None;
                context.address.clear();
                context.status = LocationStatus::Failed;
                Applied::Failed(e.clone())
            }
        }
    }

    /// Record the result of [`lookup_address`](Self::lookup_address)
    pub fn apply_address(
        &self,
        ticket: &LocationTicket,
        address: &ResolvedAddress,
        context: &mut LocationContext,
    ) -> Applied {
        if !self.is_current(ticket) {
            tracing::debug!(request = ticket.id, latest = self.latest, "discarding stale address");
            return Applied::Stale;
        }

        context.address = address.address.clone();
        context.status = LocationStatus::Resolved;
        Applied::Updated
    }

    /// Run a request to completion without touching any context
    pub async fn resolve(&self, ticket: &LocationTicket) -> LocationOutcome {
        match self.fix(ticket).await {
            Ok(coordinate) => LocationOutcome::Resolved {
                coordinate,
                address: self.lookup_address(coordinate).await,
            },
            Err(e) => LocationOutcome::Failed(e),
        }
    }

    /// Apply a completed outcome, unless a newer request has been issued
    pub fn apply(
        &self,
        ticket: &LocationTicket,
        outcome: &LocationOutcome,
        context: &mut LocationContext,
    ) -> Applied {
        match outcome {
            LocationOutcome::Resolved {
                coordinate,
                address,
            } => match self.apply_fix(ticket, &Ok(*coordinate), context) {
                Applied::Updated => self.apply_address(ticket, address, context),
                other => other,
            },
            LocationOutcome::Failed(e) => self.apply_fix(ticket, &Err(e.clone()), context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::location::{FixedPosition, Unavailable};
    use crate::error::GeocodeError;
    use async_trait::async_trait;
    use std::time::Duration;

    struct StaticGeocoder(&'static str);

    #[async_trait]
    impl ReverseGeocoder for StaticGeocoder {
        async fn reverse(&self, _coordinate: Coordinate) -> Result<String, GeocodeError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingGeocoder;

    #[async_trait]
    impl ReverseGeocoder for FailingGeocoder {
        async fn reverse(&self, _coordinate: Coordinate) -> Result<String, GeocodeError> {
            Err(GeocodeError::Transport("timed out".to_string()))
        }
    }

    struct NeverSource;

    #[async_trait]
    impl PositionSource for NeverSource {
        async fn current_position(&self, _options: FixOptions) -> Result<Coordinate, LocationError> {
            std::future::pending().await
        }

        fn name(&self) -> &'static str {
            "never"
        }
    }

    fn provider(geocoder: Arc<dyn ReverseGeocoder>) -> LocationProvider {
        LocationProvider::new(
            Arc::new(FixedPosition::new(Coordinate::new(-33.45, -70.66))),
            geocoder,
        )
    }

    #[tokio::test]
    async fn resolves_address_from_geocoder() {
        let mut provider = provider(Arc::new(StaticGeocoder("Santiago, Chile")));
        let mut context = LocationContext::default();

        let ticket = provider.begin(&mut context);
        assert_eq!(context.status, LocationStatus::Loading);

        let outcome = provider.resolve(&ticket).await;
        assert_eq!(provider.apply(&ticket, &outcome, &mut context), Applied::Updated);

        assert_eq!(context.status, LocationStatus::Resolved);
        assert_eq!(context.address, "Santiago, Chile");
        assert_eq!(context.coordinate, Some(Coordinate::new(-33.45, -70.66)));
    }

    #[tokio::test]
    async fn geocode_failure_falls_back_to_coordinates() {
        let mut provider = provider(Arc::new(FailingGeocoder));
        let mut context = LocationContext::default();

        let ticket = provider.begin(&mut context);
        let outcome = provider.resolve(&ticket).await;
        provider.apply(&ticket, &outcome, &mut context);

        assert_eq!(context.status, LocationStatus::Resolved);
        assert_eq!(context.address, "-33.450000, -70.660000");
    }

    #[tokio::test]
    async fn missing_positioning_fails_without_coordinate() {
        let mut provider =
            LocationProvider::new(Arc::new(Unavailable), Arc::new(StaticGeocoder("x")));
        let mut context = LocationContext::default();

        let ticket = provider.begin(&mut context);
        let outcome = provider.resolve(&ticket).await;
        let applied = provider.apply(&ticket, &outcome, &mut context);

        assert_eq!(applied, Applied::Failed(LocationError::Unsupported));
        assert_eq!(context.status, LocationStatus::Failed);
        assert!(context.coordinate.is_none());
        assert!(context.address.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fix_times_out() {
        let mut provider = LocationProvider::new(Arc::new(NeverSource), Arc::new(StaticGeocoder("x")))
            .with_options(FixOptions {
                timeout: Duration::from_secs(10),
                ..Default::default()
            });
        let mut context = LocationContext::default();

        let ticket = provider.begin(&mut context);
        let result = provider.fix(&ticket).await;

        assert_eq!(result, Err(LocationError::Timeout { seconds: 10 }));
    }

    #[tokio::test]
    async fn older_request_completing_late_is_discarded() {
        let mut provider = provider(Arc::new(StaticGeocoder("unused")));
        let mut context = LocationContext::default();

        let older = provider.begin(&mut context);
        let newer = provider.begin(&mut context);

        let newer_outcome = LocationOutcome::Resolved {
            coordinate: Coordinate::new(-33.45, -70.66),
            address: ResolvedAddress {
                address: "Santiago, Chile".to_string(),
                degraded: false,
            },
        };
        let older_outcome = LocationOutcome::Resolved {
            coordinate: Coordinate::new(-36.82, -73.05),
            address: ResolvedAddress {
                address: "Concepción, Chile".to_string(),
                degraded: false,
            },
        };

        assert_eq!(provider.apply(&newer, &newer_outcome, &mut context), Applied::Updated);
        assert_eq!(provider.apply(&older, &older_outcome, &mut context), Applied::Stale);

        assert_eq!(context.address, "Santiago, Chile");
        assert_eq!(context.coordinate, Some(Coordinate::new(-33.45, -70.66)));
        assert_eq!(context.status, LocationStatus::Resolved);
    }

    #[tokio::test]
    async fn stale_failure_does_not_clear_newer_location() {
        let mut provider = provider(Arc::new(StaticGeocoder("Santiago, Chile")));
        let mut context = LocationContext::default();

        let older = provider.begin(&mut context);
        let newer = provider.begin(&mut context);

        let outcome = provider.resolve(&newer).await;
        provider.apply(&newer, &outcome, &mut context);

        let late_failure = LocationOutcome::Failed(LocationError::PermissionDenied);
        assert_eq!(provider.apply(&older, &late_failure, &mut context), Applied::Stale);
        assert_eq!(context.status, LocationStatus::Resolved);
        assert_eq!(context.address, "Santiago, Chile");
    }

    #[test]
    fn tickets_increase_monotonically() {
        let mut provider = provider(Arc::new(StaticGeocoder("x")));
        let mut context = LocationContext::default();

        let first = provider.begin(&mut context);
        let second = provider.begin(&mut context);

        assert!(second > first);
        assert!(!provider.is_current(&first));
        assert!(provider.is_current(&second));
    }
}
