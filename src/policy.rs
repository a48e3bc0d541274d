use crate::{
    auth::Viewer,
    structs::{News, Owned},
};

/// Owners and admins may edit or delete a record. Callers must pass the
/// freshly fetched row, never anything taken from the submitted form.
pub fn may_mutate<R: Owned>(viewer: &Viewer, record: &R) -> bool {
    match viewer.principal() {
        Some(principal) => principal.is_admin || principal.user_id == record.owner_id(),
        None => false,
    }
}

pub fn may_read_news(viewer: &Viewer, news: &News) -> bool {
    !news.is_private || viewer.user_id() == Some(news.owner_id())
}

/// Keeps `record` only when the viewer may mutate it; denial looks like a missing row.
pub fn owned_or_not_found<R: Owned>(viewer: &Viewer, record: Option<R>) -> Option<R> {
    match record {
        Some(record) if may_mutate(viewer, &record) => Some(record),
        Some(record) => {
            log::debug!("Viewer {:?} may not mutate record owned by {}", viewer, record.owner_id());
            None
        }
        None => None,
    }
}
