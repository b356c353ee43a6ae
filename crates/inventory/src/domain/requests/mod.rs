pub mod category;
pub mod listing;
pub mod product;

const MAX_PAGE_SIZE: i32 = 100;

/// Clamps a requested page to `page >= 1` and `1 <= page_size <= 100`.
pub fn page_window(page: i32, page_size: i32) -> (i32, i32) {
    (page.max(1), page_size.clamp(1, MAX_PAGE_SIZE))
}

/// `LIMIT` and `OFFSET` for a clamped page.
pub fn limit_offset(page: i32, page_size: i32) -> (i64, i64) {
    let (page, page_size) = page_window(page, page_size);
    (page_size as i64, ((page - 1) as i64) * page_size as i64)
}

/// Total rows behind a page read with `COUNT(*) OVER()`. An empty page past
/// the first carries no window total, so the caller has to count again.
pub fn window_total(first_row_total: Option<i64>, offset: i64) -> Option<i64> {
    match first_row_total {
        Some(total) => Some(total),
        None if offset == 0 => Some(0),
        None => None,
    }
}

/// The clamped page of an already ordered list, with the list's length.
pub fn page_slice<T>(items: Vec<T>, page: i32, page_size: i32) -> (Vec<T>, i64) {
    let (limit, offset) = limit_offset(page, page_size);
    let total = items.len() as i64;
    let page = items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    (page, total)
}

/// `ILIKE` pattern matching `search` anywhere, with `%`, `_` and `\` taken
/// literally. Queries pair it with `ESCAPE '\'`. Blank searches match all.
pub fn contains_pattern(search: &str) -> Option<String> {
    let search = search.trim();
    if search.is_empty() {
        return None;
    }

    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    Some(pattern)
}
