//! Return-URL handling for post-login redirects
//!
//! Only application-relative paths are honoured. Anything that could make the
//! browser leave the site (absolute URLs, protocol-relative `//host`, the
//! backslash variant `/\host` that browsers normalise to `//host`, or values
//! carrying control characters) is replaced with the site root.

/// Fallback target for missing or rejected return URLs
pub const SITE_ROOT: &str = "/";

/// Returns true if `url` is a path on this site
pub fn is_local_url(url: &str) -> bool {
    let bytes = url.as_bytes();

    if bytes.first() != Some(&b'/') {
        return false;
    }
    if matches!(bytes.get(1), Some(b'/') | Some(b'\\')) {
        return false;
    }

    !url.chars().any(char::is_control)
}

/// Sanitises an optional return URL, falling back to the site root
pub fn local_redirect_target(return_url: Option<&str>) -> String {
    match return_url {
        Some(url) if is_local_url(url) => url.to_string(),
        Some(url) => {
            tracing::warn!("Rejected non-local return URL: {:?}", url);
            SITE_ROOT.to_string()
        }
        None => SITE_ROOT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_local_paths_are_accepted() {
        for url in ["/", "/conference", "/proposal/add?conferenceId=3", "/a/b#frag"] {
            assert!(is_local_url(url), "{url} should be local");
            assert_eq!(local_redirect_target(Some(url)), url);
        }
    }

    #[test]
    fn test_offsite_targets_fall_back_to_root() {
        for url in [
            "https://evil.example/x",
            "//evil.example/x",
            "/\\evil.example/x",
            "evil.example",
            "javascript:alert(1)",
            "",
            "/next\r\nSet-Cookie: x=1",
        ] {
            assert!(!is_local_url(url), "{url:?} should not be local");
            assert_eq!(local_redirect_target(Some(url)), SITE_ROOT);
        }
    }

    #[test]
    fn test_missing_return_url_is_root() {
        assert_eq!(local_redirect_target(None), SITE_ROOT);
    }

    proptest! {
        #[test]
        fn prop_redirect_target_never_leaves_site(url in ".*") {
            let target = local_redirect_target(Some(&url));
            prop_assert!(target.starts_with('/'));
            prop_assert!(!target.starts_with("//"));
            prop_assert!(!target.starts_with("/\\"));
            prop_assert!(!target.chars().any(char::is_control));
        }

        #[test]
        fn prop_absolute_urls_are_rejected(host in "[a-z]{1,12}\\.[a-z]{2,5}", path in "[a-z/]{0,16}") {
            let url = format!("https://{host}/{path}");
            prop_assert_eq!(local_redirect_target(Some(&url)), SITE_ROOT);
        }
    }
}
