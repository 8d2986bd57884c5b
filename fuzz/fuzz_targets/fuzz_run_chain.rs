#![no_main]

use fieldchain::{OptionalOptions, RequestState, body};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(request) = fieldchain::request::parse(s) else {
        return;
    };

    let Ok(chain) = body("items[*].name")
        .optional_with(OptionalOptions {
            nullable: true,
            check_falsy: false,
        })
        .trim()
        .not_empty()
        .bail()
        .to_int()
        .default_to(0i64)
        .is_int()
        .build()
    else {
        return;
    };

    let state = RequestState::new(request);
    let result = futures::executor::block_on(chain.run(&state));
    assert_eq!(result.errors.len(), state.errors().len());
});
