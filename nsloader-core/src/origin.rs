//! Partition origin of a class loader, derived from its dex path.

use crate::error::FatalError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static VENDOR_DEX_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|:)/vendor/").expect("vendor dex path pattern"));

static PRODUCT_DEX_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|:)(/system)?/product/").expect("product dex path pattern"));

/// Partition an APK was installed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OriginClass {
    #[default]
    Default,
    Vendor,
    Product,
}

impl OriginClass {
    /// Partition name used in logs.
    pub fn partition(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Vendor => "vendor",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for OriginClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.partition())
    }
}

/// Classifies a colon-joined dex path.
///
/// A path element under `/vendor/` makes the origin [`OriginClass::Vendor`];
/// one under `/product/` or `/system/product/` makes it
/// [`OriginClass::Product`]. A dex path touching both partitions is a
/// [`FatalError::AmbiguousOrigin`].
pub fn classify(dex_path: Option<&str>) -> Result<OriginClass, FatalError> {
    let Some(dex_path) = dex_path else {
        return Ok(OriginClass::Default);
    };

    let vendor = VENDOR_DEX_PATH.is_match(dex_path);
    let product = PRODUCT_DEX_PATH.is_match(dex_path);

    match (vendor, product) {
        (true, true) => Err(FatalError::AmbiguousOrigin {
            dex_path: dex_path.to_string(),
        }),
        (true, false) => Ok(OriginClass::Vendor),
        (false, true) => Ok(OriginClass::Product),
        (false, false) => Ok(OriginClass::Default),
    }
}
