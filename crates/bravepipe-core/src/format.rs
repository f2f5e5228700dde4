use crate::SearchHit;

/// Returned instead of an empty listing. Distinct from every error string.
pub const NO_RESULTS: &str = "No search results found for your query.";

/// Render hits as numbered blocks separated by a blank line.
///
/// Ordinals start at `offset + 1` so a paged listing keeps its global position.
pub fn format_results(hits: &[SearchHit], offset: u32) -> String {
    if hits.is_empty() {
        return NO_RESULTS.to_string();
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            let ordinal = u64::from(offset) + i as u64 + 1;
            format!(
                "[Result {ordinal}]\n  Title: {}\n  URL: {}\n  Description: {}",
                hit.title, hit.url, hit.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
