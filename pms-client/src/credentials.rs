use std::fmt;

/// The property used when the caller does not name one.
pub const DEFAULT_PROPERTY_ID: &str = "6000";

/// Credentials for the property-management API. These are supplied by the caller for every run
/// and are only ever read. The access token is never printed, not even by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_token: String,
    property_id: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, property_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into().trim().to_string(),
            property_id: property_id.into().trim().to_string(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn property_id(&self) -> &str {
        &self.property_id
    }

    pub fn has_access_token(&self) -> bool {
        !self.access_token.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("property_id", &self.property_id)
            .finish()
    }
}
