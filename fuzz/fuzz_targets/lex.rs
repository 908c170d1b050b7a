#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary text must lex without panicking, spans inside the input
    if let Ok(s) = std::str::from_utf8(data) {
        let lexed = asls_core::lexer::lex(s);
        for tok in &lexed.tokens {
            assert!(tok.span.end <= s.len());
        }
    }
});
