//! Link and image reference rewriting.
//!
//! Exported documents route every external link through a redirect URL
//! (`https://www.google.com/url?q=<target>&sa=D&...`) and reference images
//! relative to the export folder (`images/image1.png`). Both are rewritten
//! for the packaged book.

use percent_encoding::percent_decode_str;

use crate::dom::{Dom, NodeId};

/// URL prefixes of redirect wrappers whose `q` parameter holds the target.
pub const REDIRECT_PREFIXES: &[&str] = &[
    "https://www.google.com/url?",
    "http://www.google.com/url?",
    "https://google.com/url?",
];

/// Image folder used by the export.
pub const EXPORT_IMAGE_PREFIX: &str = "images/";

/// Extract the wrapped target from a redirect URL.
///
/// The value of the `q` parameter up to the next `&` is percent-decoded
/// once. Returns `None` for URLs that are not redirect wrappers or that
/// carry no `q` parameter.
pub fn unwrap_redirect(href: &str) -> Option<String> {
    let query = REDIRECT_PREFIXES
        .iter()
        .find_map(|prefix| href.strip_prefix(prefix))?;
    let value = query
        .split('&')
        .find_map(|param| param.strip_prefix("q="))?;
    Some(percent_decode_str(value).decode_utf8_lossy().into_owned())
}

/// Rewrite an export image path onto `prefix`; other paths are left alone.
pub fn rewrite_image_src(src: &str, prefix: &str) -> Option<String> {
    src.strip_prefix(EXPORT_IMAGE_PREFIX)
        .map(|rest| format!("{prefix}{rest}"))
}

/// Replace redirect hrefs under `root` by their targets. Returns how many
/// anchors were rewritten.
pub fn fix_links(dom: &mut Dom, root: NodeId) -> usize {
    let mut rewritten = 0;
    for anchor in dom.select(root, &["a"]) {
        let target = dom.get_attr(anchor, "href").and_then(unwrap_redirect);
        if let Some(target) = target {
            dom.set_attr(anchor, "href", &target);
            rewritten += 1;
        }
    }
    rewritten
}

/// Move image sources under `root` onto `prefix` and return every image
/// element in document order.
pub fn fix_images(dom: &mut Dom, root: NodeId, prefix: &str) -> Vec<NodeId> {
    let images = dom.select(root, &["img"]);
    for &image in &images {
        let rewritten = dom
            .get_attr(image, "src")
            .and_then(|src| rewrite_image_src(src, prefix));
        if let Some(src) = rewritten {
            dom.set_attr(image, "src", &src);
        }
    }
    images
}
