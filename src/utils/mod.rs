/// Turns an image `src` from the page into an absolute URL.
///
/// `//host/path` gets the https scheme, `/path` is joined to the base origin,
/// and any other relative path is joined to the base with a slash.
pub fn resolve_url(base_url: &str, src: &str) -> String {
    let src = src.trim();
    let base = base_url.trim_end_matches('/');

    if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("data:") {
        src.to_string()
    } else if let Some(rest) = src.strip_prefix("//") {
        format!("https://{}", rest)
    } else if src.starts_with('/') {
        format!("{}{}", base, src)
    } else {
        format!("{}/{}", base, src.trim_start_matches("./"))
    }
}
