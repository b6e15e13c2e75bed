use fbget_lib::link::{classify, normalize, Platform};
use proptest::prelude::*;

fn host() -> impl Strategy<Value = String> {
    (
        prop::option::of("[a-zA-Z]{1,6}"),
        "[a-zA-Z0-9]{1,12}",
        prop::sample::select(vec!["com", "watch", "be", "net", "org"]),
    )
        .prop_map(|(sub, name, tld)| match sub {
            Some(sub) => format!("{}.{}.{}", sub, name, tld),
            None => format!("{}.{}", name, tld),
        })
}

fn rest() -> impl Strategy<Value = String> {
    (
        "(/[a-zA-Z0-9_-]{0,8}){0,3}",
        prop::option::of("[a-z]{1,4}=[a-zA-Z0-9]{0,6}"),
        prop::option::of("[a-zA-Z0-9_-]{0,8}"),
    )
        .prop_map(|(path, query, fragment)| {
            let mut out = path;
            if let Some(query) = query {
                out.push('?');
                out.push_str(&query);
            }
            if let Some(fragment) = fragment {
                out.push('#');
                out.push_str(&fragment);
            }
            out
        })
}

fn link() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["", "http://", "https://", "HTTPS://", "Http://"]),
        host(),
        rest(),
        prop::sample::select(vec!["", " ", "\n", "\t "]),
    )
        .prop_map(|(scheme, host, rest, pad)| format!("{}{}{}{}{}", pad, scheme, host, rest, pad))
}

proptest! {
    #[test]
    fn missing_scheme_defaults_to_https(host in host(), rest in rest()) {
        let url = normalize(&format!("{}{}", host, rest)).unwrap();
        prop_assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn fragment_is_never_kept(raw in link()) {
        let url = normalize(&raw).unwrap();
        prop_assert!(!url.as_str().contains('#'));
        prop_assert!(url.as_url().fragment().is_none());
    }

    #[test]
    fn host_is_lowercase_and_present(raw in link()) {
        let url = normalize(&raw).unwrap();
        prop_assert!(!url.host().is_empty());
        prop_assert_eq!(url.host(), url.host().to_lowercase());
    }

    #[test]
    fn normalize_is_idempotent(raw in link()) {
        let once = normalize(&raw).unwrap();
        let twice = normalize(once.as_str()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalize_never_panics(raw in ".{0,64}") {
        let _ = normalize(&raw);
    }

    #[test]
    fn classify_is_total_and_deterministic(raw in link()) {
        let url = normalize(&raw).unwrap();
        let first = classify(&url);
        prop_assert_eq!(first, classify(&url));
        prop_assert!(matches!(
            first,
            Platform::Supported | Platform::KnownUnsupported(_) | Platform::Unsupported
        ));
    }
}

#[test]
fn facebook_share_scenario_normalizes_to_https() {
    let url = normalize("facebook.com/share/r/abc123").unwrap();
    assert_eq!(url.as_str(), "https://facebook.com/share/r/abc123");
    assert_eq!(classify(&url), Platform::Supported);
}
