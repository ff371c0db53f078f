use chrono::{TimeZone, Utc};
use stix_patterns::ast::*;
use stix_patterns::parse;

fn prop(name: &str) -> PathComponent {
    PathComponent::Property(name.to_string())
}

fn eq_int(object_type: &str, property: &str, n: i64) -> Comparison {
    Comparison::new(
        ObjectPath::new(object_type, vec![prop(property)]),
        ComparisonOp::Eq,
        StixValue::Int(n),
    )
}

fn obs(n: i64) -> PatternExpression {
    PatternExpression::observation(eq_int("a", "b", n))
}

// ==============================================================================
// Observation layer precedence

#[test]
fn test_and_binds_tighter_than_or() {
    let parsed = parse("[a:b=1] OR [a:b=2] AND [a:b=3]").unwrap();
    assert_eq!(parsed, obs(1).or(obs(2).and(obs(3))));
}

#[test]
fn test_followedby_binds_tighter_than_and() {
    let parsed = parse("[a:b=1] AND [a:b=2] FOLLOWEDBY [a:b=3]").unwrap();
    assert_eq!(parsed, obs(1).and(obs(2).followed_by(obs(3))));
}

#[test]
fn test_observation_operators_are_left_associative() {
    let parsed = parse("[a:b=1] OR [a:b=2] OR [a:b=3]").unwrap();
    assert_eq!(parsed, obs(1).or(obs(2)).or(obs(3)));

    let parsed = parse("[a:b=1] FOLLOWEDBY [a:b=2] FOLLOWEDBY [a:b=3]").unwrap();
    assert_eq!(parsed, obs(1).followed_by(obs(2)).followed_by(obs(3)));
}

#[test]
fn test_parentheses_override_precedence() {
    let parsed = parse("([a:b=1] OR [a:b=2]) AND [a:b=3]").unwrap();
    assert_eq!(parsed, obs(1).or(obs(2)).and(obs(3)));
}

// ==============================================================================
// Comparison layer precedence

#[test]
fn test_comparison_and_binds_tighter_than_or() {
    let parsed = parse("[a:b=1 OR a:b=2 AND a:b=3]").unwrap();
    let expected = ComparisonExpression::from(eq_int("a", "b", 1))
        .or(ComparisonExpression::from(eq_int("a", "b", 2)).and(eq_int("a", "b", 3)));
    assert_eq!(parsed, PatternExpression::observation(expected));
}

#[test]
fn test_parenthesized_comparisons() {
    let parsed = parse("[(a:b=1 OR a:b=2) AND a:b=3]").unwrap();
    let expected = ComparisonExpression::from(eq_int("a", "b", 1))
        .or(eq_int("a", "b", 2))
        .and(eq_int("a", "b", 3));
    assert_eq!(parsed, PatternExpression::observation(expected));
}

// ==============================================================================
// Qualifiers

#[test]
fn test_chained_qualifiers_nest_outer_last() {
    let parsed = parse("[a:b=1] REPEATS 2 TIMES WITHIN 10 SECONDS").unwrap();
    assert_eq!(
        parsed,
        obs(1)
            .qualify(Qualifier::Repeats(2))
            .qualify(Qualifier::Within(10.0))
    );

    let PatternExpression::Qualified(outer) = parsed else {
        panic!("expected qualified pattern");
    };
    assert_eq!(outer.qualifier, Qualifier::Within(10.0));
    assert!(matches!(
        *outer.pattern,
        PatternExpression::Qualified(ref inner) if inner.qualifier == Qualifier::Repeats(2)
    ));
}

#[test]
fn test_qualifier_applies_to_whole_expression() {
    let parsed =
        parse("[file:name = 'a'] AND [network-traffic:dst_port = 443] WITHIN 300 SECONDS")
            .unwrap();
    let PatternExpression::Qualified(q) = parsed else {
        panic!("expected qualified pattern");
    };
    assert_eq!(q.qualifier, Qualifier::Within(300.0));
    assert!(matches!(*q.pattern, PatternExpression::Composite(_)));
}

#[test]
fn test_qualifier_followed_by_operator_binds_to_preceding_operand() {
    assert_eq!(
        parse("[a:b = 1] REPEATS 2 TIMES AND [a:b = 2]").unwrap(),
        obs(1).qualify(Qualifier::Repeats(2)).and(obs(2))
    );
    assert_eq!(
        parse("[a:b = 1] FOLLOWEDBY [a:b = 2] WITHIN 5 SECONDS OR [a:b = 3]").unwrap(),
        obs(1)
            .followed_by(obs(2).qualify(Qualifier::Within(5.0)))
            .or(obs(3))
    );
}

#[test]
fn test_operand_and_trailing_qualifiers_combine() {
    let parsed =
        parse("[a:b = 1] REPEATS 2 TIMES WITHIN 5 SECONDS AND [a:b = 2] REPEATS 3 TIMES").unwrap();
    let expected = obs(1)
        .qualify(Qualifier::Repeats(2))
        .qualify(Qualifier::Within(5.0))
        .and(obs(2))
        .qualify(Qualifier::Repeats(3));
    assert_eq!(parsed, expected);
    assert_eq!(
        parsed.to_string(),
        "([a:b = 1] REPEATS 2 TIMES WITHIN 5 SECONDS) AND [a:b = 2] REPEATS 3 TIMES"
    );
}

#[test]
fn test_start_stop_qualifier() {
    let parsed = parse(
        "[file:name = 'a'] START t'2016-06-01T00:00:00Z' STOP t'2016-07-01T00:00:00.5Z'",
    )
    .unwrap();
    let start = Utc.with_ymd_and_hms(2016, 6, 1, 0, 0, 0).unwrap();
    let stop = Utc.with_ymd_and_hms(2016, 7, 1, 0, 0, 0).unwrap() + chrono::Duration::milliseconds(500);
    let PatternExpression::Qualified(q) = parsed else {
        panic!("expected qualified pattern");
    };
    assert_eq!(q.qualifier, Qualifier::StartStop { start, stop });
}

// ==============================================================================
// Comparisons

#[test]
fn test_negation_is_recorded_on_the_comparison() {
    let parsed = parse("[a:b NOT = 1]").unwrap();
    assert_eq!(parsed, PatternExpression::observation(eq_int("a", "b", 1).negate()));

    let plain = parse("[a:b = 1]").unwrap();
    assert_ne!(parsed, plain);
}

#[test]
fn test_exists() {
    let parsed = parse("[EXISTS windows-registry-key:values]").unwrap();
    let expected = Comparison::exists(ObjectPath::new("windows-registry-key", vec![prop("values")]));
    assert_eq!(parsed, PatternExpression::observation(expected));
}

#[test]
fn test_every_operator() {
    let cases = [
        ("=", ComparisonOp::Eq),
        ("!=", ComparisonOp::Neq),
        ("<>", ComparisonOp::Neq),
        (">", ComparisonOp::Gt),
        ("<", ComparisonOp::Lt),
        (">=", ComparisonOp::Ge),
        ("<=", ComparisonOp::Le),
        ("LIKE", ComparisonOp::Like),
        ("matches", ComparisonOp::Matches),
        ("ISSUBSET", ComparisonOp::IsSubset),
        ("IsSuperSet", ComparisonOp::IsSuperset),
    ];
    for (text, op) in cases {
        let input = format!("[a:b {} 'x']", text);
        let parsed = parse(&input).unwrap_or_else(|e| panic!("{}: {}", input, e));
        let c = parsed.comparisons().next().unwrap();
        assert_eq!(c.binary_op(), Some(op), "{}", input);
    }
}

#[test]
fn test_literal_values_are_decoded() {
    let cases = [
        ("'it\\'s'", StixValue::String("it's".to_string())),
        ("-12", StixValue::Int(-12)),
        ("2.5e1", StixValue::Float(25.0)),
        ("TRUE", StixValue::Bool(true)),
        ("h'00ff'", StixValue::Hex(vec![0x00, 0xff])),
        ("b'aGk='", StixValue::Binary(b"hi".to_vec())),
        (
            "t'2014-06-29T13:49:37+02:00'",
            StixValue::Timestamp(Utc.with_ymd_and_hms(2014, 6, 29, 11, 49, 37).unwrap()),
        ),
    ];
    for (text, value) in cases {
        let input = format!("[a:b = {}]", text);
        let parsed = parse(&input).unwrap();
        let c = parsed.comparisons().next().unwrap();
        assert_eq!(c.value, Some(ComparisonRhs::Value(value)), "{}", input);
    }
}

#[test]
fn test_keywords_are_case_insensitive() {
    assert_eq!(
        parse("[a:b=1] or [a:b=2] And [a:b=3]").unwrap(),
        parse("[a:b=1] OR [a:b=2] AND [a:b=3]").unwrap()
    );
}

#[test]
fn test_realistic_indicator() {
    let parsed = parse(
        "[email-message:from_ref.value MATCHES '.+\\\\@example\\\\.com$' AND \
         email-message:body_multipart[*].body_raw_ref.name LIKE 'pdf%'] \
         FOLLOWEDBY [file:hashes.'SHA-256' = 'aec070645fe53ee3b3763059376134f058cc337247c978add178b6ccdfb0019f'] \
         WITHIN 300 SECONDS",
    )
    .unwrap();
    let paths: Vec<String> = parsed.comparisons().map(|c| c.path.to_string()).collect();
    assert_eq!(
        paths,
        [
            "email-message:from_ref.value",
            "email-message:body_multipart[*].body_raw_ref.name",
            "file:hashes.'SHA-256'",
        ]
    );
}
