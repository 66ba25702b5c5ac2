#![no_main]

use kvdeploy::domain::entities::PropertiesDocument;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(doc) = PropertiesDocument::parse(content) {
            // Untouched documents render byte-for-byte
            assert_eq!(doc.render(), content);
        }
    }
});
