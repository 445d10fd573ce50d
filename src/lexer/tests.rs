use super::*;
use crate::matcher::Token;
use crate::regex::{ParseOptions, Universe, parse};

fn matcher(rules: &[(&str, &str)]) -> Matcher {
    let mut matcher = Matcher::new();
    for (name, pattern) in rules {
        matcher
            .register_pattern(*name, pattern, &ParseOptions::default())
            .unwrap();
    }
    matcher
}

fn lexer(states: &[(&str, &[(&str, &str)])]) -> LexerGenerator {
    let mut lexer = LexerGenerator::new();
    for (name, rules) in states {
        lexer.add_state_matcher(*name, matcher(rules)).unwrap();
    }
    lexer
}

fn expect_token<'i>(outcome: Result<MatchOutcome<'i>, LexerError>) -> Token<'i> {
    match outcome {
        Ok(MatchOutcome::Matched(token)) => token,
        other => panic!("expected a token, got {other:?}"),
    }
}

fn tokens(lexer: &mut LexerGenerator, input: &str) -> Vec<(String, String)> {
    lexer
        .scanner(input.as_bytes())
        .map(|item| {
            let token = item.unwrap();
            (token.rule.to_string(), String::from_utf8_lossy(token.bytes).into_owned())
        })
        .collect()
}

const IDENTS: &[(&str, &str)] = &[
    ("id", "[a-zA-Z_][a-zA-Z_0-9]*"),
    ("space", "[ \\t]+"),
    ("num", "[0-9]+"),
];

#[test]
fn test_identifier_space_number() {
    let mut lexer = lexer(&[(INITIAL, IDENTS)]);
    let input = b"a 123";

    let token = expect_token(lexer.find(input, 0));
    assert_eq!((&*token.rule, token.bytes, token.end), ("id", &b"a"[..], 1));

    let token = expect_token(lexer.find(input, 1));
    assert_eq!((&*token.rule, token.bytes, token.end), ("space", &b" "[..], 2));

    let token = expect_token(lexer.find(input, 2));
    assert_eq!((&*token.rule, token.bytes, token.end), ("num", &b"123"[..], 5));

    assert_eq!(lexer.find(input, 5), Ok(MatchOutcome::Eof));
}

#[test]
fn test_keyword_beats_identifier() {
    let mut lexer = lexer(&[(INITIAL, &[("kw", "if"), ("id", "[a-zA-Z]+")])]);
    let token = expect_token(lexer.find(b"if", 0));
    assert_eq!((&*token.rule, token.bytes, token.end), ("kw", &b"if"[..], 2));
}

#[test]
fn test_unregistered_byte_is_no_match() {
    let mut lexer = lexer(&[(INITIAL, IDENTS)]);
    assert_eq!(lexer.find(b"#", 0), Ok(MatchOutcome::NoMatch));
}

#[test]
fn test_eof_regardless_of_rules() {
    let mut empty = lexer(&[(INITIAL, &[])]);
    assert_eq!(empty.find(b"", 0), Ok(MatchOutcome::Eof));
    let mut full = lexer(&[(INITIAL, IDENTS)]);
    assert_eq!(full.find(b"abc", 3), Ok(MatchOutcome::Eof));
}

#[test]
fn test_longest_match() {
    let mut lexer = lexer(&[(INITIAL, &[("short", "ab"), ("long", "abcd")])]);
    let token = expect_token(lexer.find(b"abcd", 0));
    assert_eq!(token.rule.as_ref(), "long");
    assert_eq!(token.end, 4);
}

#[test]
fn test_initial_is_active_when_added() {
    let lexer = lexer(&[("COMMENT", &[("text", "[^*]+")]), (INITIAL, IDENTS)]);
    assert_eq!(lexer.current_state(), Some(INITIAL));
    assert_eq!(lexer.state_names().collect::<Vec<_>>(), vec!["COMMENT", INITIAL]);
}

#[test]
fn test_find_without_initial() {
    let mut lexer = lexer(&[("OTHER", IDENTS)]);
    assert_eq!(lexer.current_state(), None);
    assert_eq!(lexer.find(b"a", 0), Err(LexerError::MissingInitial));
    assert_eq!(lexer.export(), Err(LexerError::MissingInitial));
}

#[test]
fn test_duplicate_state() {
    let mut lexer = lexer(&[(INITIAL, IDENTS)]);
    assert_eq!(
        lexer.add_state_matcher(INITIAL, Matcher::new()),
        Err(LexerError::DuplicateState(INITIAL.to_string()))
    );
}

#[test]
fn test_unknown_state() {
    let mut lexer = lexer(&[(INITIAL, IDENTS)]);
    assert_eq!(
        lexer.set_state("NOPE"),
        Err(LexerError::UnknownState("NOPE".to_string()))
    );
    assert_eq!(lexer.current_state(), Some(INITIAL));
}

#[test]
fn test_state_switch_changes_rules() {
    let mut lexer = lexer(&[
        (INITIAL, &[("open", "/\\*"), ("word", "[a-z]+")]),
        ("COMMENT", &[("close", "\\*/"), ("text", "[^*]+|\\*")]),
    ]);
    let input = b"/*ab*/";
    assert_eq!(expect_token(lexer.find(input, 0)).rule.as_ref(), "open");
    lexer.set_state("COMMENT").unwrap();
    assert_eq!(expect_token(lexer.find(input, 2)).rule.as_ref(), "text");
    assert_eq!(expect_token(lexer.find(input, 4)).rule.as_ref(), "close");
    lexer.set_state(INITIAL).unwrap();
    assert_eq!(expect_token(lexer.find(b"ab", 0)).rule.as_ref(), "word");
}

#[test]
fn test_rules_added_through_matcher_mut() {
    let mut lexer = lexer(&[(INITIAL, &[("id", "[a-z]+")])]);
    assert_eq!(lexer.find(b"42", 0), Ok(MatchOutcome::NoMatch));
    lexer
        .matcher_mut(INITIAL)
        .unwrap()
        .register_pattern("num", "[0-9]+", &ParseOptions::default())
        .unwrap();
    let token = expect_token(lexer.find(b"42", 0));
    assert_eq!((&*token.rule, token.end), ("num", 2));
    assert!(lexer.matcher_mut("NOPE").is_none());
}

#[test]
fn test_scanner_tokenizes_whole_input() {
    let mut lexer = lexer(&[(INITIAL, IDENTS)]);
    assert_eq!(
        tokens(&mut lexer, "x1 22\tfoo"),
        vec![
            ("id".to_string(), "x1".to_string()),
            ("space".to_string(), " ".to_string()),
            ("num".to_string(), "22".to_string()),
            ("space".to_string(), "\t".to_string()),
            ("id".to_string(), "foo".to_string()),
        ]
    );
}

#[test]
fn test_scanner_stops_at_unexpected_byte() {
    let mut lexer = lexer(&[(INITIAL, IDENTS)]);
    let items: Vec<_> = lexer.scanner(b"ab #cd").collect();
    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok());
    assert!(items[1].is_ok());
    assert_eq!(
        items[2],
        Err(ScanError::UnexpectedByte { byte: b'#', pos: 3 })
    );
    assert_eq!(
        ScanError::UnexpectedByte { byte: b'#', pos: 3 }.to_string(),
        "unexpected byte '#' at 3"
    );
}

#[test]
fn test_scanner_switches_state_between_tokens() {
    let mut lexer = lexer(&[
        (INITIAL, &[("quote", "\\\""), ("word", "[a-z]+"), ("space", " ")]),
        ("STRING", &[("quote", "\\\""), ("chars", "[^\"]+")]),
    ]);
    let input = b"say \"hi there\" ok";
    let mut scanner = lexer.scanner(input);
    let mut seen = Vec::new();
    while let Some(item) = scanner.next() {
        let token = item.unwrap();
        seen.push(format!("{}:{}", token.rule, String::from_utf8_lossy(token.bytes)));
        if &*token.rule == "quote" {
            let next = if scanner.current_state() == Some(INITIAL) {
                "STRING"
            } else {
                INITIAL
            };
            scanner.set_state(next).unwrap();
        }
    }
    assert_eq!(
        seen,
        vec!["word:say", "space: ", "quote:\"", "chars:hi there", "quote:\"", "space: ", "word:ok"]
    );
    assert_eq!(scanner.position(), input.len());
}

#[test]
fn test_export_per_state() {
    let mut initial = Matcher::new();
    let node = parse("[0-9]+", &ParseOptions::default()).unwrap();
    initial.register_rule("num", node, Some("return NUM;".to_string()));
    let mut lexer = LexerGenerator::new();
    lexer.add_state_matcher(INITIAL, initial).unwrap();
    lexer.add_state_matcher("OTHER", matcher(&[("x", "x")])).unwrap();

    let export = lexer.export().unwrap();
    assert_eq!(export.len(), 2);
    assert_eq!(export[0].state, INITIAL);
    assert_eq!(export[0].rule_names, vec!["num".to_string()]);
    assert_eq!(export[0].actions, vec![Some("return NUM;".to_string())]);
    assert_eq!(export[1].state, "OTHER");
    assert_eq!(export[1].actions, vec![None]);

    let tables = &export[0].tables;
    assert_eq!(tables.state_count(), 2);
    assert_eq!(tables.accept, vec![-1, 0]);
    let sentinel = tables.sentinel();
    assert_eq!(tables.transitions[0][usize::from(b'5')], 1);
    assert_eq!(tables.transitions[1][usize::from(b'5')], 1);
    assert_eq!(tables.transitions[1][usize::from(b'a')], sentinel);
}

#[test]
fn test_exported_tables_match_the_dfa() {
    let mut lexer = lexer(&[(INITIAL, IDENTS)]);
    lexer.compile();
    let export = lexer.export().unwrap();
    let dfa = lexer.matcher(INITIAL).unwrap().dfa().unwrap();
    let tables = &export[0].tables;
    for (id, state) in dfa.automaton().states() {
        assert_eq!(tables.accept(id.index()), state.accept());
        for byte in 0..=u8::MAX {
            assert_eq!(tables.next(id.index(), byte), dfa.next(id, byte).map(|s| s.index()));
        }
    }
}

#[test]
fn test_wildcard_universe_policy() {
    let mut ascii = Matcher::new();
    ascii.register_pattern("any", ".+", &ParseOptions::default()).unwrap();
    let mut bytes = Matcher::new();
    bytes
        .register_pattern(
            "any",
            ".+",
            &ParseOptions {
                universe: Universe::Bytes,
            },
        )
        .unwrap();
    let input = "aé\n".as_bytes();
    let MatchOutcome::Matched(token) = ascii.find(input, 0) else {
        panic!("expected a match");
    };
    assert_eq!(token.end, 1);
    let MatchOutcome::Matched(token) = bytes.find(input, 0) else {
        panic!("expected a match");
    };
    assert_eq!(token.end, 3);
}

#[test]
fn test_multibyte_literal_rule() {
    let mut lexer = lexer(&[(INITIAL, &[("arrow", "→"), ("other", "[a-z]")])]);
    let token = expect_token(lexer.find("→x".as_bytes(), 0));
    assert_eq!(token.rule.as_ref(), "arrow");
    assert_eq!(token.end, 3);
}
