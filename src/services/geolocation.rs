use crate::error::{AppError, AppResult};
use crate::models::punch::GeoLocation;

/// Captures the device position at punch time.
///
/// Implementations report permission denial, missing hardware and timeouts
/// as `AppError::GeolocationUnavailable`.
pub trait LocationProvider: Send + Sync {
    fn capture(&self) -> AppResult<GeoLocation>;
}

/// A terminal bolted to a known spot, e.g. the ward entrance.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    location: GeoLocation,
}

impl FixedLocation {
    pub fn new(latitude: f64, longitude: f64) -> AppResult<Self> {
        let location = GeoLocation::new(latitude, longitude);
        if !location.is_valid() {
            return Err(AppError::validation(format!(
                "coordinates out of range: {latitude}, {longitude}"
            )));
        }
        Ok(Self { location })
    }
}

impl LocationProvider for FixedLocation {
    fn capture(&self) -> AppResult<GeoLocation> {
        Ok(self.location)
    }
}

/// Device without positioning support.
#[derive(Debug, Clone)]
pub struct UnavailableLocation {
    reason: String,
}

impl UnavailableLocation {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl LocationProvider for UnavailableLocation {
    fn capture(&self) -> AppResult<GeoLocation> {
        Err(AppError::geolocation_unavailable(self.reason.clone()))
    }
}

/// Capture and sanity-check a position before anything touches the store.
pub(crate) fn capture_checked(provider: &dyn LocationProvider) -> AppResult<GeoLocation> {
    ensure_valid(provider.capture()?)
}

/// Rejects NaN or out-of-range coordinates; no punch is stored without a
/// usable position.
pub(crate) fn ensure_valid(location: GeoLocation) -> AppResult<GeoLocation> {
    if !location.is_valid() {
        return Err(AppError::geolocation_unavailable(format!(
            "invalid coordinates: {}, {}",
            location.latitude, location.longitude
        )));
    }
    Ok(location)
}
