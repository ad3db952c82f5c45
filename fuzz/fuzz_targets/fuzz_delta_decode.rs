#![no_main]

use keepsync::EditScript;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(encoded) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(script) = EditScript::decode(encoded) {
        // A decoded script either applies cleanly or reports a mismatch
        let _ = script.apply(data);
        let _ = script.invert().apply(data);
        let _ = script.regions();
    }
});
