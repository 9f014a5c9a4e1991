use super::*;

fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn exposed(creds: &[Credential]) -> Vec<&str> {
    creds.iter().map(Credential::expose).collect()
}

#[test]
fn credentials_default_comes_first() {
    let creds = credentials_from_vars(vars(&[("LLM_API_KEY_1", "one"), ("LLM_API_KEY", "default")]));
    assert_eq!(exposed(&creds), vec!["default", "one"]);
}

#[test]
fn credentials_numbered_sorted_numerically_with_gaps() {
    let creds = credentials_from_vars(vars(&[
        ("LLM_API_KEY_10", "ten"),
        ("LLM_API_KEY_2", "two"),
        ("LLM_API_KEY_5", "five"),
    ]));
    assert_eq!(exposed(&creds), vec!["two", "five", "ten"]);
}

#[test]
fn credentials_deduplicated_keeping_first_position() {
    let creds = credentials_from_vars(vars(&[
        ("LLM_API_KEY", "shared"),
        ("LLM_API_KEY_1", "shared"),
        ("LLM_API_KEY_2", "other"),
        ("LLM_API_KEY_3", " other "),
    ]));
    assert_eq!(exposed(&creds), vec!["shared", "other"]);
}

#[test]
fn credentials_ignore_blank_and_unrelated_vars() {
    let creds = credentials_from_vars(vars(&[
        ("LLM_API_KEY", "   "),
        ("LLM_API_KEY_X", "not-numbered"),
        ("LLM_API_KEY_ENV", "nope"),
        ("OTHER_KEY_1", "nope"),
        ("LLM_API_KEY_1", "real"),
    ]));
    assert_eq!(exposed(&creds), vec!["real"]);
}

#[test]
fn credentials_empty_when_nothing_configured() {
    assert!(credentials_from_vars(Vec::new()).is_empty());
}

#[cfg(unix)]
#[test]
fn non_utf8_env_entries_are_skipped() {
    use std::os::unix::ffi::OsStringExt;

    let raw = vec![
        (OsString::from("LLM_API_KEY"), OsString::from("default")),
        (OsString::from("LLM_API_KEY_1"), OsString::from_vec(vec![0x66, 0xff, 0x6f])),
        (OsString::from_vec(vec![0xfe, 0x41]), OsString::from("orphan")),
        (OsString::from("LLM_API_KEY_2"), OsString::from("two")),
    ];
    let creds = credentials_from_vars(utf8_vars(raw));
    assert_eq!(exposed(&creds), vec!["default", "two"]);
}

#[test]
fn env_parse_opt_missing_or_invalid_is_none() {
    assert_eq!(env_parse_opt::<f32>("__TEST_STOREFRONT_OPT_MISSING__"), None);
    unsafe { std::env::set_var("__TEST_STOREFRONT_OPT__", "0.25") };
    assert_eq!(env_parse_opt::<f32>("__TEST_STOREFRONT_OPT__"), Some(0.25));
    unsafe { std::env::remove_var("__TEST_STOREFRONT_OPT__") };
}

#[test]
fn limits_default_matches_constants() {
    let limits = Limits::default();
    assert_eq!(limits.max_history_length, 20);
    assert_eq!(limits.daily_rate_limit, 50);
    assert_eq!(limits.credential_daily_limit, 10_000);
}

#[test]
fn env_parse_missing_returns_default() {
    let val: u32 = env_parse("__TEST_STOREFRONT_MISSING__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__TEST_STOREFRONT_INVALID__", "many") };
    let val: usize = env_parse("__TEST_STOREFRONT_INVALID__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__TEST_STOREFRONT_INVALID__") };
}

#[test]
fn catalog_path_must_be_absolute_and_free() {
    assert!(valid_catalog_path("/produk.json"));
    assert!(valid_catalog_path("/catalog/products.json"));
    assert!(!valid_catalog_path("produk.json"));
    assert!(!valid_catalog_path("/ai-assistant"));
    assert!(!valid_catalog_path("/chat-history"));
    assert!(!valid_catalog_path("/{file}"));
}
