use std::collections::HashSet;
use tracing::debug;

use super::{PaginationCursor, RecordSet, ZoneProvider};
use crate::errors::ScanError;

/// Fetch all record sets of `zone_id` and keep the CNAMEs.
///
/// Pages are requested until the provider reports the listing is no longer
/// truncated. Every continuation field is forwarded; a truncated page that
/// hands back any cursor already sent is an error rather than a loop.
pub async fn list_cname_records(
    provider: &dyn ZoneProvider,
    zone_id: &str,
) -> Result<Vec<RecordSet>, ScanError> {
    let mut cnames = Vec::new();
    let mut cursor: Option<PaginationCursor> = None;
    let mut sent: HashSet<PaginationCursor> = HashSet::new();
    let mut pages = 0usize;
    let mut seen = 0usize;

    loop {
        let page = provider
            .list_records_page(zone_id, cursor.as_ref())
            .await
            .map_err(|e| ScanError::pagination(zone_id, e))?;
        pages += 1;
        seen += page.record_sets.len();

        cnames.extend(page.record_sets.into_iter().filter(RecordSet::is_cname));

        if !page.is_truncated {
            break;
        }

        let next = page.next.ok_or_else(|| {
            ScanError::pagination(zone_id, "truncated page without a continuation cursor")
        })?;
        if !sent.insert(next.clone()) {
            return Err(ScanError::pagination(
                zone_id,
                format!("cursor did not advance past {} {}", next.next_name, next.next_type),
            ));
        }
        cursor = Some(next);
    }

    debug!(zone = %zone_id, pages, records = seen, cnames = cnames.len(), "record sets listed");
    Ok(cnames)
}
