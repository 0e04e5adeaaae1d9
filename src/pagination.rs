use serde::Serialize;

/// Every list page in the app shows at most this many posts.
pub const POSTS_PER_PAGE_LIMIT: usize = 10;

/// One page of an ordered result set, plus the metadata the rendering
/// layer needs for page navigation.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Slices `items` down to the requested page. `raw_page` is the raw
/// query-string value: absent or non-numeric values fall back to page 1,
/// and out-of-range numbers are clamped to the nearest valid page rather
/// than producing an error.
pub fn paginate<T>(items: Vec<T>, limit: usize, raw_page: Option<&str>) -> Page<T> {
    let total_items = items.len();
    let total_pages = total_items.div_ceil(limit).max(1);
    let requested = raw_page
        .and_then(|page| page.trim().parse::<usize>().ok())
        .filter(|&page| page >= 1)
        .unwrap_or(1);
    let number = requested.min(total_pages);

    let items = items
        .into_iter()
        .skip((number - 1) * limit)
        .take(limit)
        .collect();

    Page {
        items,
        number,
        total_items,
        total_pages,
        has_previous: number > 1,
        has_next: number < total_pages,
    }
}
