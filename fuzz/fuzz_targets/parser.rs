#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|source: &str| {
    if let Ok(root) = ownlisp::parse(source) {
        let _ = ownlisp::Value::from_node(&root);
    }
});
