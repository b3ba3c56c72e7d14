//! Storage class tiers

use crate::{Error, Result};

/// S3 storage tiers a lifecycle transition can target.
///
/// `Standard` is the only non-transitable member: objects land there on
/// upload and can only be moved out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    Standard,
    Glacier,
    StandardIa,
    OnezoneIa,
    IntelligentTiering,
    DeepArchive,
    GlacierIr,
}

impl Default for StorageClass {
    fn default() -> Self {
        Self::Standard
    }
}

impl StorageClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Glacier => "GLACIER",
            Self::StandardIa => "STANDARD_IA",
            Self::OnezoneIa => "ONEZONE_IA",
            Self::IntelligentTiering => "INTELLIGENT_TIERING",
            Self::DeepArchive => "DEEP_ARCHIVE",
            Self::GlacierIr => "GLACIER_IR",
        }
    }

    /// Parse a storage class name, case-insensitively. An unrecognised
    /// name is an error so that a typo in a declaration cannot silently
    /// retarget a transition at `STANDARD`.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "STANDARD" => Ok(Self::Standard),
            "GLACIER" => Ok(Self::Glacier),
            "STANDARD_IA" => Ok(Self::StandardIa),
            "ONEZONE_IA" => Ok(Self::OnezoneIa),
            "INTELLIGENT_TIERING" => Ok(Self::IntelligentTiering),
            "DEEP_ARCHIVE" => Ok(Self::DeepArchive),
            "GLACIER_IR" => Ok(Self::GlacierIr),
            _ => Err(Error::UnknownStorageClass(s.to_string())),
        }
    }

    /// Whether objects may be moved into this tier by a transition.
    pub fn is_transitable(&self) -> bool {
        !matches!(self, Self::Standard)
    }

    pub fn is_non_transitable(&self) -> bool {
        !self.is_transitable()
    }
}

impl std::fmt::Display for StorageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StorageClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(StorageClass::parse("glacier").unwrap(), StorageClass::Glacier);
        assert_eq!(
            StorageClass::parse("Standard_IA").unwrap(),
            StorageClass::StandardIa
        );
    }

    #[test]
    fn test_parse_unknown_is_error() {
        assert!(matches!(
            StorageClass::parse("GLACIER_DEEP"),
            Err(Error::UnknownStorageClass(_))
        ));
    }

    #[test]
    fn test_transitable_partition() {
        assert!(StorageClass::Standard.is_non_transitable());
        for class in [
            StorageClass::Glacier,
            StorageClass::StandardIa,
            StorageClass::OnezoneIa,
            StorageClass::IntelligentTiering,
            StorageClass::DeepArchive,
            StorageClass::GlacierIr,
        ] {
            assert!(class.is_transitable(), "{class} should be transitable");
        }
    }

    #[test]
    fn test_round_trip_names() {
        for class in [
            StorageClass::Standard,
            StorageClass::Glacier,
            StorageClass::StandardIa,
            StorageClass::OnezoneIa,
            StorageClass::IntelligentTiering,
            StorageClass::DeepArchive,
            StorageClass::GlacierIr,
        ] {
            assert_eq!(StorageClass::parse(class.as_str()).unwrap(), class);
        }
    }
}
