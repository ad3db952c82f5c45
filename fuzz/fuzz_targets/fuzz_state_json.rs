#![no_main]

use std::path::Path;

use keepsync::infrastructure::repositories::parse_state;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Lock file parsing must reject, never panic
    let _ = parse_state(data, Path::new(".keepsync.lock"));
});
