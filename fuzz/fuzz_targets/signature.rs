#![no_main]

use dotlink::{metadata::signatures::import_signature, prelude::project_method_def_sig, Token};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut keep = |token: Token| -> dotlink::Result<Token> { Ok(token) };
    if let Ok(imported) = import_signature(data, &mut keep, 64) {
        // re-encoding is canonical, a second pass must not change anything
        let again = import_signature(&imported, &mut keep, 64).unwrap();
        assert_eq!(again, imported);
    }
    let _ = project_method_def_sig(data);
});
