//! Community-browsing helpers.

/// Default page size for the community listing.
pub const DEFAULT_PAGE_LIMIT: u32 = 24;

/// Whether another page can be requested after `page` of `total_pages`.
pub fn has_more(page: u32, total_pages: u32) -> bool {
    page < total_pages
}

/// Rewrite a CDN delivery URL so the browser downloads instead of renders.
///
/// Inserts the attachment flag after the first `/upload` path segment;
/// URLs without that segment are returned unchanged.
pub fn download_url(image_url: &str) -> String {
    image_url.replacen("/upload", "/upload/fl_attachment", 1)
}
