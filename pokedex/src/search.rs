use crate::state::ListEntry;

/// Narrows `list` to entries whose id equals the `#`-stripped query or
/// whose name contains the query, case-insensitively. An empty query keeps
/// every entry. Relative order is preserved and `list` is never touched.
pub fn search_in_list<'a>(list: &'a [ListEntry], query: &str) -> Vec<&'a ListEntry> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return list.iter().collect();
    }
    let id_query = query.strip_prefix('#').unwrap_or(&query);
    list.iter()
        .filter(|entry| entry.id == id_query || entry.name.to_lowercase().contains(&query))
        .collect()
}
