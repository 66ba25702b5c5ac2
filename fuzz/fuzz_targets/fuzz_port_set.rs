#![no_main]

use kvdeploy::domain::value_objects::PortSet;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(ports) = PortSet::parse(content) {
            let reparsed = PortSet::parse(&ports.format()).expect("formatted ports reparse");
            assert_eq!(reparsed, ports);
        }
    }
});
