#![no_main]

use libfuzzer_sys::fuzz_target;
use opstack_errors::{kinds, ops, unwrap_terminal, Error, Kind, Stack};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data).into_owned();
    let depth = data.first().map_or(1, |b| usize::from(*b % 32) + 1);

    let mut err = Error::from_message(text.clone(), text.clone());
    for i in 1..depth {
        err = Error::new(format!("layer_{}", i), err);
        if let Some(kind) = data.get(i).map(|b| u32::from(*b)).and_then(|b| Kind::checked_custom(b).ok()) {
            err = err.with_kind(kind);
        }
    }

    let rendered = err.to_string();
    assert!(rendered.contains(&text));
    assert_eq!(ops(&err).len(), depth);
    assert_eq!(unwrap_terminal(&err).to_string(), text);
    let _ = kinds(&err);
    let _ = Stack::capture_bounded(&err, 8);
});
