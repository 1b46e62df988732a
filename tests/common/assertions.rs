//! Custom assertions for stored output

use entsoe_extract::MemoryBlobStore;

/// Assert exactly one object exists in `bucket` and return its key and body
pub fn assert_single_object(store: &MemoryBlobStore, bucket: &str) -> (String, String) {
    let keys = store.keys(bucket);
    assert_eq!(keys.len(), 1, "expected one object, found {keys:?}");
    assert_eq!(store.len(), 1, "objects written outside {bucket}");

    let key = keys.into_iter().next().unwrap();
    let body = store.get(bucket, &key).unwrap();
    (key, String::from_utf8(body).expect("CSV output should be UTF-8"))
}

/// Assert that a run left storage untouched
pub fn assert_nothing_written(store: &MemoryBlobStore) {
    assert!(store.is_empty(), "expected no objects, found {}", store.len());
}

/// Assert `key` has the `{prefix}-{YYYYMMDDThhmmss}[-{8 hex}].csv` shape
pub fn assert_key_shape(key: &str, prefix: &str, unique: bool) {
    let rest = key
        .strip_prefix(prefix)
        .and_then(|r| r.strip_prefix('-'))
        .and_then(|r| r.strip_suffix(".csv"))
        .unwrap_or_else(|| panic!("key {key:?} does not match {prefix}-*.csv"));

    let (stamp, suffix) = match rest.split_once('-') {
        Some((stamp, suffix)) => (stamp, Some(suffix)),
        None => (rest, None),
    };

    assert_eq!(stamp.len(), 15, "timestamp in {key:?}");
    assert_eq!(&stamp[8..9], "T", "timestamp in {key:?}");
    assert!(
        stamp.chars().enumerate().all(|(i, c)| i == 8 || c.is_ascii_digit()),
        "timestamp in {key:?}"
    );

    match (unique, suffix) {
        (true, Some(s)) => {
            assert_eq!(s.len(), 8, "suffix in {key:?}");
            assert!(s.chars().all(|c| c.is_ascii_hexdigit()), "suffix in {key:?}");
        }
        (false, None) => {}
        _ => panic!("unexpected suffix state in {key:?} (unique = {unique})"),
    }
}
