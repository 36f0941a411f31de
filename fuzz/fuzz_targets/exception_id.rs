#![no_main]

use catex::survey::ExceptionId;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing must never panic, and accepted ids keep their sequence number
        if let Ok(id) = input.parse::<ExceptionId>() {
            assert!(input.ends_with(&id.index.to_string()));
        }
    }
});
