use serde::{Deserialize, Serialize};

/// One distinct security held in the account, with its looked-up type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityInfo {
    /// Symbol/ticker (e.g., "VTI")
    pub symbol: String,

    /// Name as shown by the brokerage
    pub descriptor: Option<String>,

    /// Normalized type (e.g., "Stock", "ETF"), or `None` when the lookup failed
    pub security_type: Option<String>,
}

impl SecurityInfo {
    pub fn new(symbol: impl Into<String>, descriptor: Option<String>) -> Self {
        Self {
            symbol: symbol.into(),
            descriptor,
            security_type: None,
        }
    }

    pub fn with_security_type(mut self, security_type: impl Into<String>) -> Self {
        self.security_type = Some(security_type.into());
        self
    }
}
