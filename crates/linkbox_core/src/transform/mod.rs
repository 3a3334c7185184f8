//! Pure text transforms over link blocks.
//!
//! Results are handed to the copy sink and never written back to a group.

const REDIRECT_MARKER: &str = "redirect.php";
const SHORT_REDIRECT: &str = "r.php";

/// Rewrites every line of a link block to point at the short redirect path.
///
/// Lines containing `redirect.php` have their first occurrence renamed to
/// `r.php`; other lines get `r.php` appended as a new path segment.
pub fn append_redirect_suffix(links: &str) -> String {
    links
        .split('\n')
        .map(rewrite_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn rewrite_line(line: &str) -> String {
    if line.contains(REDIRECT_MARKER) {
        return line.replacen(REDIRECT_MARKER, SHORT_REDIRECT, 1);
    }
    if line.ends_with('/') {
        format!("{line}{SHORT_REDIRECT}")
    } else {
        format!("{line}/{SHORT_REDIRECT}")
    }
}
