#![no_main]

use libfuzzer_sys::fuzz_target;
use ferrous_ioc::naming::{bean_name_for_type_name, decapitalize, simple_type_name};

fuzz_target!(|data: &[u8]| {
    let Ok(type_name) = std::str::from_utf8(data) else {
        return;
    };

    let simple = simple_type_name(type_name);
    assert!(!simple.contains("::"));
    assert!(type_name.contains(simple));

    let name = bean_name_for_type_name(type_name);
    assert_eq!(name, decapitalize(simple));

    // Only the first character may change
    let mut original = simple.chars();
    let mut derived = name.chars();
    if let Some(first) = original.next() {
        let lowered: String = first.to_lowercase().collect();
        let prefix: String = derived.by_ref().take(lowered.chars().count()).collect();
        assert_eq!(prefix, lowered);
    }
    assert_eq!(original.as_str(), derived.as_str());
});
