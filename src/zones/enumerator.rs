use std::collections::HashSet;
use tracing::debug;

use super::{HostedZone, ZoneProvider};
use crate::errors::{ProviderError, ScanError};

/// List every public hosted zone of the account, draining the zone-listing
/// pagination. Any failed page fails the whole listing, as does a marker
/// the provider has already handed out.
pub async fn list_public_zones(provider: &dyn ZoneProvider) -> Result<Vec<HostedZone>, ScanError> {
    let mut zones = Vec::new();
    let mut marker: Option<String> = None;
    let mut sent: HashSet<String> = HashSet::new();
    let mut skipped = 0usize;

    loop {
        let page = provider
            .list_zones_page(marker.take())
            .await
            .map_err(ScanError::Enumeration)?;

        for zone in page.zones {
            if zone.is_private {
                skipped += 1;
                continue;
            }
            zones.push(zone);
        }

        match page.next_marker {
            Some(m) if !sent.insert(m.clone()) => {
                return Err(ScanError::Enumeration(ProviderError::new(
                    "ListHostedZones",
                    format!("marker did not advance: {m}"),
                )));
            }
            Some(m) => marker = Some(m),
            None => break,
        }
    }

    debug!(public = zones.len(), private = skipped, "hosted zones enumerated");
    Ok(zones)
}
