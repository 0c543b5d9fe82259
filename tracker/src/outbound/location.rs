//! Last-known-location source fixed at startup.

use async_trait::async_trait;

use crate::domain::Coordinate;
use crate::domain::ports::{LocationProvider, LocationProviderError};

/// Reports the same last fix, or none, on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedLocationProvider {
    location: Option<Coordinate>,
}

impl FixedLocationProvider {
    /// Provider reporting `location`.
    #[must_use]
    pub const fn new(location: Option<Coordinate>) -> Self {
        Self { location }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn last_known_location(&self) -> Result<Option<Coordinate>, LocationProviderError> {
        Ok(self.location)
    }
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        reason = "test code uses expect for clear failure messages"
    )]

    use rstest::rstest;

    use super::*;
    use crate::test_support::catalogs::central_lausanne;

    #[rstest]
    #[case::known(Some(central_lausanne()))]
    #[case::unknown(None)]
    #[tokio::test]
    async fn reports_the_configured_fix(#[case] location: Option<Coordinate>) {
        let provider = FixedLocationProvider::new(location);

        let reported = provider
            .last_known_location()
            .await
            .expect("fixed provider never fails");

        assert_eq!(reported, location);
    }
}
