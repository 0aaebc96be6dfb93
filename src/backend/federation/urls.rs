//! URL normalization and rewriting helpers.
//!
//! Federation peers identify each other by site URL, and callers present
//! those URLs with or without a trailing slash, so every comparison goes
//! through [`normalize_site_url`]. Content travels between instances with
//! embedded relative asset paths; [`rewrite_relative_urls`] roots them at
//! the origin the consumer actually knows the provider by, since the
//! consumer has no other base to resolve against.

use crate::shared::federation::FederatedPost;
use crate::shared::models::Post;

/// Markers that introduce a URL inside post content: HTML attributes and
/// markdown link/image targets.
const URL_MARKERS: [&str; 5] = ["src=\"", "href=\"", "src='", "href='", "]("];

/// Canonicalize a site URL for storage and comparison: trim whitespace and
/// any trailing slashes.
pub fn normalize_site_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Rewrite root-relative URLs in post content to absolute URLs under
/// `base`. Protocol-relative (`//host/...`) and already-absolute URLs are
/// left alone.
pub fn rewrite_relative_urls(content: &str, base: &str) -> String {
    let base = normalize_site_url(base);
    let mut out = String::with_capacity(content.len() + 64);
    let mut rest = content;

    while !rest.is_empty() {
        let mut earliest: Option<(usize, &str)> = None;
        for marker in URL_MARKERS {
            if let Some(idx) = rest.find(marker) {
                if earliest.map_or(true, |(best, _)| idx < best) {
                    earliest = Some((idx, marker));
                }
            }
        }

        match earliest {
            Some((idx, marker)) => {
                let after = idx + marker.len();
                out.push_str(&rest[..after]);
                let tail = &rest[after..];
                if tail.starts_with('/') && !tail.starts_with("//") {
                    out.push_str(&base);
                }
                rest = tail;
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }

    out
}

/// Make a single path absolute under `base`. Absolute URLs pass through.
pub fn absolutize(path: &str, base: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
        return path.to_string();
    }
    let base = normalize_site_url(base);
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Compute the canonical `remote_uri` for a mirrored post.
///
/// The provider-supplied URI is advisory: its origin may be misconfigured
/// or rotated. Only its path is kept, re-rooted at the canonical
/// `site_url` this instance knows the remote blog by. Absent or unusable
/// URIs fall back to the `{site_url}/posts/{id}` default.
pub fn canonicalize_remote_uri(uri: Option<&str>, site_url: &str, post_id: &str) -> String {
    let base = normalize_site_url(site_url);

    let path = uri.and_then(|u| {
        let u = u.trim();
        if u.is_empty() {
            return None;
        }
        if let Some(scheme_end) = u.find("://") {
            let host_start = scheme_end + 3;
            u[host_start..]
                .find('/')
                .map(|i| u[host_start + i..].to_string())
        } else if u.starts_with('/') {
            Some(u.to_string())
        } else {
            None
        }
    });

    match path {
        Some(p) => format!("{base}{p}"),
        None => format!("{base}/posts/{post_id}"),
    }
}

/// Project a local post into its wire shape, with content and cover image
/// rewritten to absolute URLs under this instance's own site URL.
pub fn project_post(post: &Post, site_url: &str) -> FederatedPost {
    let base = normalize_site_url(site_url);
    FederatedPost {
        id: post.id.to_string(),
        title: post.title.clone(),
        slug: post.slug.clone(),
        content: rewrite_relative_urls(&post.content, &base),
        excerpt: post.excerpt.clone(),
        cover_image: post.cover_image.as_deref().map(|c| absolutize(c, &base)),
        uri: Some(format!("{base}/posts/{}", post.id)),
        author_name: Some(post.author_name.clone()),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_trailing_slash() {
        assert_eq!(normalize_site_url("https://a.com/"), "https://a.com");
        assert_eq!(normalize_site_url("https://a.com"), "https://a.com");
        assert_eq!(normalize_site_url("  https://a.com//  "), "https://a.com");
    }

    #[test]
    fn test_rewrite_html_attributes() {
        let content = r#"<img src="/uploads/a.png"> <a href="/posts/1">x</a>"#;
        let out = rewrite_relative_urls(content, "https://blog.example/");
        assert_eq!(
            out,
            r#"<img src="https://blog.example/uploads/a.png"> <a href="https://blog.example/posts/1">x</a>"#
        );
    }

    #[test]
    fn test_rewrite_markdown_and_absolute_untouched() {
        let content = "![pic](/img/x.png) [site](https://other.example/p)";
        let out = rewrite_relative_urls(content, "https://blog.example");
        assert_eq!(
            out,
            "![pic](https://blog.example/img/x.png) [site](https://other.example/p)"
        );
    }

    #[test]
    fn test_rewrite_leaves_protocol_relative() {
        let content = r#"<img src="//cdn.example/a.png">"#;
        assert_eq!(
            rewrite_relative_urls(content, "https://blog.example"),
            content
        );
    }

    #[test]
    fn test_canonicalize_rewrites_foreign_origin() {
        // Remote advertises a stale origin; we re-root at the one we know.
        let uri = canonicalize_remote_uri(
            Some("http://old-host.internal/posts/42"),
            "https://blog.example",
            "42",
        );
        assert_eq!(uri, "https://blog.example/posts/42");
    }

    #[test]
    fn test_canonicalize_defaults_without_uri() {
        assert_eq!(
            canonicalize_remote_uri(None, "https://blog.example/", "42"),
            "https://blog.example/posts/42"
        );
        assert_eq!(
            canonicalize_remote_uri(Some(""), "https://blog.example", "42"),
            "https://blog.example/posts/42"
        );
        // Origin with no path at all
        assert_eq!(
            canonicalize_remote_uri(Some("https://old.example"), "https://blog.example", "42"),
            "https://blog.example/posts/42"
        );
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize("/uploads/a.png", "https://a.com/"),
            "https://a.com/uploads/a.png"
        );
        assert_eq!(
            absolutize("https://cdn.example/a.png", "https://a.com"),
            "https://cdn.example/a.png"
        );
    }
}
