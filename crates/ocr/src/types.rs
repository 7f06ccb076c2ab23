use serde::{Deserialize, Serialize};

/// Best-effort structured fields parsed from the OCR text of a phone price
/// tag or listing. Each field is independently present or absent; a value is
/// always one of the (trimmed) input lines. There is no cross-field
/// validation, and all-absent is a normal outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedListing {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub price: Option<String>,
    pub ram: Option<String>,
    pub storage: Option<String>,
}

impl ExtractedListing {
    /// True when no field matched anything.
    pub fn is_empty(&self) -> bool {
        self.brand.is_none()
            && self.model.is_none()
            && self.price.is_none()
            && self.ram.is_none()
            && self.storage.is_none()
    }
}
