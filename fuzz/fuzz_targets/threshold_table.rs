#![no_main]

use catex::threshold::ThresholdSet;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = ThresholdSet::from_toml_str(input);
    }
});
