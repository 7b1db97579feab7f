use serde::Serialize;
use std::fmt;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub vendor: String,
    pub version: String,
}

impl Inventory {
    pub fn new(vendor: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vendor.is_empty() {
            return f.write_str("Unknown");
        }
        if self.version.is_empty() {
            return f.write_str(&self.vendor);
        }
        write!(f, "{} {}", self.vendor, self.version)
    }
}
