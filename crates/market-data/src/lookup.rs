//! Batch classification of the securities in a portfolio.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::models::SecurityInfo;
use crate::provider::SecurityTypeLookup;

/// Look up the type of every distinct symbol, in first-seen order.
///
/// Blank symbols are skipped. A failed lookup leaves `security_type` empty
/// and the next symbol is still attempted; requests are issued one at a
/// time and paced by the provider.
pub async fn lookup_security_types<I>(lookup: &dyn SecurityTypeLookup, securities: I) -> Vec<SecurityInfo>
where
    I: IntoIterator<Item = (String, Option<String>)>,
{
    let mut seen = HashSet::new();
    let mut infos = Vec::new();

    for (symbol, descriptor) in securities {
        let symbol = symbol.trim().to_string();
        if symbol.is_empty() || !seen.insert(symbol.clone()) {
            continue;
        }

        let mut info = SecurityInfo::new(symbol, descriptor);
        match lookup.lookup_security_type(&info.symbol).await {
            Ok(security_type) => {
                debug!("{}: {}", info.symbol, security_type);
                info.security_type = Some(security_type);
            }
            Err(e) => warn!(
                "{} lookup failed for {}: {}",
                lookup.id(),
                info.symbol,
                e
            ),
        }
        infos.push(info);
    }

    let resolved = infos.iter().filter(|i| i.security_type.is_some()).count();
    info!(
        "Resolved security types for {}/{} symbols via {}",
        resolved,
        infos.len(),
        lookup.id()
    );
    infos
}
