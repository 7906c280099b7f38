#![no_main]
use libfuzzer_sys::fuzz_target;
use mcc_common::{Code, InputFiles};
use mcc_parser::{assemble, tokenize, NoKeywords};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let mut files = InputFiles::default();
        let id = files.add_input(Code {
            source: s.into(),
            path: None,
        });
        if let Ok(tokens) = tokenize(files.get_code_ref(id), &NoKeywords) {
            let _ = assemble(tokens);
        }
    }
});
