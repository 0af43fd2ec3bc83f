//! Following-list extraction

use std::collections::HashSet;

use crate::browser::BrowserSession;
use crate::data::{dedup_ids, RelationshipId};
use crate::error::Result;

/// Turn one page's raw links into unique confirmed relationship ids.
///
/// Absent links, pending follow requests and links without a user id are dropped.
pub fn filter_page_links(links: Vec<Option<String>>) -> Vec<RelationshipId> {
    let ids = links.into_iter().flatten().filter_map(|link| {
        let id = RelationshipId::from_link(&link);
        if id.is_none() {
            tracing::debug!(link = %link, "Skipping link without a confirmed user id");
        }
        id
    });
    dedup_ids(ids)
}

/// Walk every page of the listing currently shown in `session`.
///
/// The caller selects the tier beforehand. Items can move between pages while
/// the list is read, so the result is deduplicated across pages as well.
pub async fn extract(session: &mut dyn BrowserSession) -> Result<Vec<RelationshipId>> {
    let mut collected: Vec<RelationshipId> = Vec::new();
    let mut seen: HashSet<RelationshipId> = HashSet::new();
    let mut page = 1usize;

    loop {
        session.wait_for_listing().await?;

        let links = session.listing_links().await?;
        let raw = links.len();
        let ids = filter_page_links(links);
        let new = ids.iter().filter(|id| seen.insert((*id).clone())).count();
        tracing::debug!(page, raw, ids = ids.len(), new, "Read listing page");
        if new == 0 && !ids.is_empty() {
            tracing::warn!(page, "Listing page had no unseen ids, the list may have shifted");
        }
        collected.extend(ids);

        if !session.next_page().await? {
            break;
        }
        page += 1;
    }

    Ok(dedup_ids(collected))
}
