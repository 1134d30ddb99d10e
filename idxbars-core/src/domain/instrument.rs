use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// An index constituent: pricing-source ticker plus display name.
///
/// Identity is the symbol; two instruments with the same symbol are equal
/// regardless of display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
}

impl Instrument {
    pub fn new(symbol: String, name: String) -> Self {
        Self { symbol, name }
    }
}

impl PartialEq for Instrument {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Instrument {}

impl Hash for Instrument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}
