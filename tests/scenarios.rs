use regdfa::{compile, compile_minimal, compile_nfa, parse_regex, tokenize, Alphabet, Error, Node};

fn alphabet(symbols: &[&str]) -> Alphabet {
    Alphabet::new(symbols.iter().cloned())
}

fn accepted<'a>(regex: &str, symbols: &[&str], inputs: &[&'a str]) -> Vec<&'a str> {
    let dfa = compile(regex, &alphabet(symbols)).unwrap();
    inputs
        .iter()
        .cloned()
        .filter(|s| dfa.execute(s).unwrap())
        .collect()
}

#[test]
fn alternation_of_single_symbols() {
    let dfa = compile("a+b", &alphabet(&["a", "b"])).unwrap();
    assert!(dfa.execute("a").unwrap());
    assert!(dfa.execute("b").unwrap());
    assert!(!dfa.execute("").unwrap());
    assert!(!dfa.execute("ab").unwrap());
}

#[test]
fn concatenation_accepts_only_the_word() {
    assert_eq!(
        accepted("ab", &["a", "b"], &["", "a", "b", "ab", "ba"]),
        vec!["ab"]
    );
}

#[test]
fn bounded_repetition() {
    assert_eq!(
        accepted("a{2,3}", &["a"], &["", "a", "aa", "aaa", "aaaa"]),
        vec!["aa", "aaa"]
    );
}

#[test]
fn open_ended_repetition() {
    let dfa = compile("a{2,}", &alphabet(&["a"])).unwrap();
    for k in 0..12 {
        assert_eq!(dfa.execute(&"a".repeat(k)).unwrap(), k >= 2, "k = {}", k);
    }
}

#[test]
fn malformed_quantifier_stops_at_the_lexer() {
    let err = compile("a{2,d}", &alphabet(&["a"])).unwrap_err();
    assert!(matches!(err, Error::Lexical { .. }));
    assert!(tokenize("a{2,d}", &alphabet(&["a"])).is_err());
}

#[test]
fn minimization_collapses_states() {
    let symbols = ["a", "b"];
    let dfa = compile("ab+a", &alphabet(&symbols)).unwrap();
    let min = dfa.minimize();
    assert!(min.len() < dfa.len());

    for input in &["", "a", "b", "ab", "ba", "aa", "aba", "abb"] {
        assert_eq!(min.execute(input), dfa.execute(input), "{}", input);
    }
}

#[test]
fn syntax_errors_are_distinguished() {
    let err = compile("(a+b", &alphabet(&["a", "b"])).unwrap_err();
    assert!(err.is_syntax());
    assert!(!err.is_lexical());
}

#[test]
fn quantifier_then_star() {
    let ast = parse_regex("x{2}*", &alphabet(&["x"])).unwrap();
    assert_eq!(
        ast,
        Node::star(Node::RepeatExactly(Box::new(Node::literal("x")), 2))
    );
    assert_eq!(
        accepted("x{2}*", &["x"], &["", "x", "xx", "xxx", "xxxx"]),
        vec!["", "xx", "xxxx"]
    );
}

#[test]
fn zero_lower_bound_allows_empty() {
    assert_eq!(
        accepted("ba{0,2}", &["a", "b"], &["", "b", "ba", "baa", "baaa"]),
        vec!["b", "ba", "baa"]
    );
    assert_eq!(
        accepted("ba{0}", &["a", "b"], &["", "b", "bb"]),
        vec!["b"]
    );
    assert_eq!(
        accepted("ba{0,}", &["a", "b"], &["b", "ba", "baaaa", "bb"]),
        vec!["b", "ba", "baaaa"]
    );
}

#[test]
fn multi_character_alphabet() {
    let symbols = ["A", "AB", "1", "2"];
    let dfa = compile_minimal("ε1A+(AB{1,2})*AABABA2ε", &alphabet(&symbols)).unwrap();
    assert!(dfa.execute("1A").unwrap());
    assert!(dfa.execute("AABABA2").unwrap());
    assert!(dfa.execute("ABAABABA2").unwrap());
    assert!(dfa.execute("ABABABAABABA2").unwrap());
    assert!(!dfa.execute("1AAABABA2").unwrap());
    assert!(!dfa.execute("").unwrap());
    assert!(dfa.execute("1C").unwrap_err().is_usage());
}

#[test]
fn one_bad_regex_does_not_stop_a_batch() {
    let batch: Vec<(&str, Vec<&str>)> = vec![
        ("εa{7,6}", vec!["a"]),
        ("a{2,6}*b+cde{2,4}", vec!["a", "b", "c", "d", "e"]),
        ("εa{3,6}bdSTOPε", vec!["a", "b", "d", "STOP"]),
        ("STa*Bg{1,2}eε", vec!["ST", "a", "Bg", "e"]),
        ("εAaa{1,3}be*a+de", vec!["A", "aa", "b", "e", "a", "d"]),
    ];

    let outcomes: Vec<bool> = batch
        .iter()
        .map(|(regex, symbols)| compile_minimal(regex, &alphabet(symbols)).is_ok())
        .collect();

    assert_eq!(outcomes, vec![false, true, true, true, true]);
}

#[test]
fn nfa_interchange_names_start_and_end_first() {
    let nfa = compile_nfa("a+b", &alphabet(&["a", "b"])).unwrap().to_serialized();
    assert_eq!(nfa.starting_state, "0");
    assert!(nfa.state("1").unwrap().is_terminating_state);
    assert_eq!(
        nfa.state("0").unwrap().transitions["epsilon"],
        vec!["2".to_owned(), "3".to_owned()]
    );
}

#[test]
fn minimal_dfa_survives_json() {
    let symbols = ["a", "b"];
    let min = compile_minimal("(ab)*a", &alphabet(&symbols)).unwrap();
    let json = min.to_serialized().to_json().unwrap();
    let restored =
        regdfa::Dfa::from_serialized(&regdfa::SerializedDfa::from_json(&json).unwrap()).unwrap();

    for input in &["", "a", "aba", "ababa", "ab", "aa", "b"] {
        assert_eq!(restored.execute(input), min.execute(input), "{}", input);
    }
    assert_eq!(restored.minimize().len(), min.len());
}
