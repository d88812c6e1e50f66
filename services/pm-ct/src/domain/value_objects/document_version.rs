//! 单据版本号

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 单据版本号，一位小数，每次修订加 0.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentVersion(Decimal);

impl DocumentVersion {
    const STEP: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

    pub fn initial() -> Self {
        Self(Decimal::from_parts(10, 0, 0, false, 1))
    }

    pub fn next(&self) -> Self {
        Self(self.0 + Self::STEP)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Default for DocumentVersion {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}
