//! DA server blob locators of the form `<namespace>/<height>/<index>`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum LocatorError {
    #[error("locator {0:?} does not have three '/'-separated parts")]
    Malformed(String),

    #[error("locator {locator:?} has non-numeric height {height:?}")]
    InvalidHeight { locator: String, height: String },
}

/// Parsed DA server locator.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BlobLocator {
    namespace: String,
    height: u64,
    index: String,
}

impl BlobLocator {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Height at which the DA layer included the blob.
    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn index(&self) -> &str {
        &self.index
    }
}

impl FromStr for BlobLocator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        let (Some(namespace), Some(height), Some(index), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(LocatorError::Malformed(s.to_owned()));
        };

        let height = height.parse().map_err(|_| LocatorError::InvalidHeight {
            locator: s.to_owned(),
            height: height.to_owned(),
        })?;

        Ok(Self {
            namespace: namespace.to_owned(),
            height,
            index: index.to_owned(),
        })
    }
}

impl fmt::Display for BlobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.height, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locator() {
        let loc: BlobLocator = "ns/42/0".parse().unwrap();
        assert_eq!(loc.namespace(), "ns");
        assert_eq!(loc.height(), 42);
        assert_eq!(loc.index(), "0");
        assert_eq!(loc.to_string(), "ns/42/0");
    }

    #[test]
    fn test_parse_locator_errors() {
        assert!(matches!(
            "ns/42".parse::<BlobLocator>(),
            Err(LocatorError::Malformed(_))
        ));
        assert!(matches!(
            "ns/42/0/extra".parse::<BlobLocator>(),
            Err(LocatorError::Malformed(_))
        ));
        assert!(matches!(
            "ns/tall/0".parse::<BlobLocator>(),
            Err(LocatorError::InvalidHeight { .. })
        ));
    }

    #[test]
    fn test_locator_serde() {
        let loc: BlobLocator = "celestia/100/3".parse().unwrap();
        let json = serde_json::to_string(&loc).unwrap();
        assert!(json.contains("\"height\":100"));
    }
}
