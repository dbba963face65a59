use serde::Serialize;

/// Rows per page for every listing endpoint.
pub const PAGE_SIZE: u32 = 10;

/// Page links shown on each side of the current page before the list is elided.
const ON_EACH_SIDE: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLink {
    pub url: Option<String>,
    pub label: String,
    pub active: bool,
}

/// Paginated listing envelope, shaped the way the dashboard frontend expects.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub current_page: u32,
    pub data: Vec<T>,
    pub first_page_url: String,
    pub from: Option<u64>,
    pub last_page: u32,
    pub last_page_url: String,
    pub links: Vec<PageLink>,
    pub next_page_url: Option<String>,
    pub path: String,
    pub per_page: u32,
    pub prev_page_url: Option<String>,
    pub to: Option<u64>,
    pub total: u64,
}

/// Offset of the first row on `page` (1-based).
pub fn offset(page: u32) -> u32 {
    page.saturating_sub(1).saturating_mul(PAGE_SIZE)
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, path: &str) -> Self {
        let per_page = PAGE_SIZE;
        let last_page = (total.div_ceil(u64::from(per_page))).max(1) as u32;
        let url = |n: u32| format!("{path}?page={n}");

        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let first = u64::from(offset(page)) + 1;
            (Some(first), Some(first + data.len() as u64 - 1))
        };

        let prev_page_url = (page > 1).then(|| url(page - 1));
        let next_page_url = (page < last_page).then(|| url(page + 1));

        let window = page_window(page, last_page);
        let mut links = Vec::with_capacity(window.len() + 2);
        links.push(PageLink {
            url: prev_page_url.clone(),
            label: "&laquo; Previous".to_string(),
            active: false,
        });
        for slot in window {
            links.push(match slot {
                Some(n) => PageLink {
                    url: Some(url(n)),
                    label: n.to_string(),
                    active: n == page,
                },
                None => PageLink {
                    url: None,
                    label: "...".to_string(),
                    active: false,
                },
            });
        }
        links.push(PageLink {
            url: next_page_url.clone(),
            label: "Next &raquo;".to_string(),
            active: false,
        });

        Self {
            current_page: page,
            data,
            first_page_url: url(1),
            from,
            last_page,
            last_page_url: url(last_page),
            links,
            next_page_url,
            path: path.to_string(),
            per_page,
            prev_page_url,
            to,
            total,
        }
    }
}

/// Page numbers to link for `current` out of `last`, `None` marking a "..." gap.
///
/// Short listings link every page.  Longer ones keep the first and last two
/// pages plus a slider of [`ON_EACH_SIDE`] pages around the current one; near
/// either end the slider merges into that end's block.
fn page_window(current: u32, last: u32) -> Vec<Option<u32>> {
    let pages = |from: u32, to: u32| (from..=to).map(Some);

    if last < ON_EACH_SIDE * 2 + 8 {
        return pages(1, last).collect();
    }

    let window = ON_EACH_SIDE + 4;
    if current <= window {
        pages(1, window + ON_EACH_SIDE)
            .chain([None])
            .chain(pages(last - 1, last))
            .collect()
    } else if current > last - window {
        pages(1, 2)
            .chain([None])
            .chain(pages(last - (window + ON_EACH_SIDE - 1), last))
            .collect()
    } else {
        pages(1, 2)
            .chain([None])
            .chain(pages(current - ON_EACH_SIDE, current + ON_EACH_SIDE))
            .chain([None])
            .chain(pages(last - 1, last))
            .collect()
    }
}
