use oat_lexer::{tokenize, TokenKind};
use proptest::prelude::*;

/// Decimal or `0x` hexadecimal literal text, optionally signed
fn arb_int_literal() -> impl Strategy<Value = String> {
    let decimal = "[0-9]{1,19}";
    let hex = "0x[0-9A-Fa-f]{1,16}";
    (any::<bool>(), prop_oneof![decimal, hex])
        .prop_map(|(negative, digits)| if negative { format!("-{digits}") } else { digits })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn int_literal_is_exactly_one_token(text in arb_int_literal()) {
        let tokens = tokenize(&text, 0).collect_tokens().unwrap();

        prop_assert_eq!(tokens.len(), 2, "tokens: {:?}", tokens);
        prop_assert_eq!(tokens[0].kind, TokenKind::IntLit);
        prop_assert_eq!(tokens[0].text, text.as_str());
        prop_assert_eq!(tokens[0].span.start.offset, 0);
        prop_assert_eq!(tokens[0].span.end.offset, text.len());
        prop_assert!(tokens[1].is_eof());
    }

    #[test]
    fn never_panics_and_progresses(s in ".*") {
        let mut last_end = 0usize;
        let mut saw_eof = false;

        for (steps, item) in tokenize(&s, 0).enumerate() {
            prop_assert!(!saw_eof, "token after eof in {:?}", s);
            let span = match item {
                Ok(token) => {
                    saw_eof = token.is_eof();
                    token.span
                }
                Err(err) => err.span,
            };

            prop_assert!(span.start.offset <= span.end.offset);
            prop_assert!(span.end.offset <= s.len());
            prop_assert!(span.start.offset >= last_end, "token moved backwards in {:?}", s);
            last_end = span.end.offset;

            prop_assert!(steps <= s.len() + 1, "too many steps for {:?}", s);
        }
    }
}
