#![no_main]

use fieldchain::{FieldPath, FieldValue, Selector};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // The first byte picks the split between selector and JSON value.
    let split = data[0] as usize % data.len();
    let (selector_bytes, value_bytes) = data.split_at(split);
    let selector = String::from_utf8_lossy(selector_bytes);

    let Ok(selector) = Selector::parse(&selector) else {
        return;
    };
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(value_bytes) else {
        return;
    };
    let root = FieldValue::from(value);

    for (path, matched) in selector.expand(&root) {
        assert_eq!(root.get_path(path.segments()), matched);
        assert_eq!(FieldPath::parse(&path.to_string()).as_ref(), Ok(&path));
    }
});
