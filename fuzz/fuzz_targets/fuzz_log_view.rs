#![no_main]

use libfuzzer_sys::fuzz_target;
use opstack_errors::{Error, MAX_FIELD_OUTPUT_LEN};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data).into_owned();
    let err = Error::new("fuzz", Error::from_message(text.clone(), text.clone()).with_message(text));

    let mut line = String::new();
    if err.log_view().write_to(&mut line).is_ok() {
        assert!(line.len() < 5 * MAX_FIELD_OUTPUT_LEN);
    }
});
