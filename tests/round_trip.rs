use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use stix_patterns::ast::*;
use stix_patterns::parse;

// ==============================================================================
// Canonical text renders back unchanged

#[test]
fn test_canonical_patterns_round_trip() {
    let canonical = [
        "[file:name = 'foo.exe']",
        "[file:hashes.'SHA-256' = 'abcd'] AND [network-traffic:dst_port = 443] WITHIN 300 SECONDS",
        "[a:b = 1] OR [a:b = 2] AND [a:b = 3]",
        "([a:b = 1] OR [a:b = 2]) AND [a:b = 3]",
        "[a:b = 1] AND ([a:b = 2] AND [a:b = 3])",
        "[a:b = 1] REPEATS 2 TIMES WITHIN 10 SECONDS",
        "([a:b = 1] REPEATS 2 TIMES) FOLLOWEDBY [a:c = 2]",
        "[a:b = 1] WITHIN 0.5 SECONDS",
        "[a:b NOT = 1]",
        "[a:b = 1 AND (a:c = 2 OR a:d = 3)]",
        "[EXISTS windows-registry-key:values[*].name]",
        "[process:arguments[0] LIKE '%cmd%']",
        "[ipv4-addr:value IN ('10.0.0.1', '10.0.0.2')]",
        "[ipv4-addr:value ISSUBSET '198.51.100.0/24']",
        "[x-custom:'odd key'.times[-1] != true]",
        "[a:b = h'deadbeef' OR a:c = b'aGVsbG8=']",
        "[a:b > 1.5 AND a:c <= -3e-7]",
        "[file:created > t'2016-02-14T00:00:00Z']",
        "[a:b = 'it\\'s a \\\\path']",
        "[a:b = 1] START t'2016-06-01T00:00:00Z' STOP t'2016-07-01T00:00:00.250Z'",
    ];

    for text in canonical {
        let parsed = parse(text).unwrap_or_else(|e| panic!("{}: {}", text, e));
        assert_eq!(parsed.to_string(), text);
    }
}

#[test]
fn test_spelling_variants_render_canonically() {
    let cases = [
        ("[a:b=1]", "[a:b = 1]"),
        ("[a:b <> 1]", "[a:b != 1]"),
        ("[NOT a:b = 1]", "[a:b NOT = 1]"),
        ("[a:b = 1e2]", "[a:b = 100.0]"),
        ("[a:b = TRUE]", "[a:b = true]"),
        ("[a:b = h'DEAD']", "[a:b = h'dead']"),
        ("[a:b = t'2016-02-14T02:00:00+02:00']", "[a:b = t'2016-02-14T00:00:00Z']"),
        ("([a:b = 1])", "[a:b = 1]"),
        ("[a:b = 1] startstop t'2016-06-01T00:00:00Z' t'2016-07-01T00:00:00Z'",
         "[a:b = 1] START t'2016-06-01T00:00:00Z' STOP t'2016-07-01T00:00:00Z'"),
        ("[a:b = 1] within 300.0 seconds", "[a:b = 1] WITHIN 300 SECONDS"),
    ];

    for (input, canonical) in cases {
        assert_eq!(parse(input).unwrap().to_string(), canonical, "{}", input);
    }
}

// ==============================================================================
// Arbitrary trees survive render + parse

const KEYWORDS: &[&str] = &[
    "and", "or", "not", "followedby", "within", "seconds", "repeats", "times", "startstop",
    "start", "stop", "like", "matches", "issubset", "issuperset", "in", "exists", "true",
    "false",
];

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}".prop_filter("keywords are not object types", |s| {
        !KEYWORDS.contains(&s.as_str())
    })
}

fn arb_object_type() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_name(),
        Just("network-traffic".to_string()),
        Just("x-custom-object".to_string()),
    ]
}

fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000, prop_oneof![Just(0u32), 0u32..1_000_000_000])
        .prop_filter_map("valid timestamp", |(secs, nanos)| {
            Utc.timestamp_opt(secs, nanos).single()
        })
}

fn arb_component() -> impl Strategy<Value = PathComponent> {
    prop_oneof![
        3 => "[a-z_][a-z0-9_]{0,8}".prop_map(PathComponent::Property),
        1 => "[ -~]{0,12}".prop_map(PathComponent::Key),
        1 => prop_oneof![
            (-5i64..100).prop_map(ListIndex::Position),
            Just(ListIndex::Any),
        ]
        .prop_map(PathComponent::Index),
    ]
}

fn arb_path() -> impl Strategy<Value = ObjectPath> {
    (
        arb_object_type(),
        prop_oneof![
            "[a-z_][a-z0-9_]{0,8}".prop_map(PathComponent::Property),
            "[ -~]{1,12}".prop_map(PathComponent::Key),
        ],
        prop::collection::vec(arb_component(), 0..4),
    )
        .prop_map(|(object_type, first, rest)| {
            let mut components = vec![first];
            components.extend(rest);
            ObjectPath::new(object_type, components)
        })
}

fn arb_value() -> impl Strategy<Value = StixValue> {
    prop_oneof![
        "[ -~]{0,16}".prop_map(StixValue::String),
        any::<i64>().prop_map(StixValue::Int),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(StixValue::Float),
        any::<bool>().prop_map(StixValue::Bool),
        arb_timestamp().prop_map(StixValue::Timestamp),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(StixValue::Hex),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(StixValue::Binary),
    ]
}

fn arb_comparison() -> impl Strategy<Value = Comparison> {
    let scalar = (
        arb_path(),
        prop_oneof![Just(ComparisonOp::Eq), Just(ComparisonOp::Neq)],
        arb_value(),
        any::<bool>(),
    )
        .prop_map(|(path, op, value, negated)| Comparison {
            path,
            op: op.into(),
            value: Some(value.into()),
            negated,
        });

    let ordered = (
        arb_path(),
        prop_oneof![
            Just(ComparisonOp::Gt),
            Just(ComparisonOp::Lt),
            Just(ComparisonOp::Ge),
            Just(ComparisonOp::Le),
        ],
        prop_oneof![
            any::<i64>().prop_map(StixValue::Int),
            "[ -~]{0,8}".prop_map(StixValue::String),
            arb_timestamp().prop_map(StixValue::Timestamp),
        ],
    )
        .prop_map(|(path, op, value)| Comparison::new(path, op, value));

    let set = (
        arb_path(),
        prop_oneof![
            Just(ComparisonOp::In),
            Just(ComparisonOp::IsSubset),
            Just(ComparisonOp::IsSuperset),
        ],
        prop::collection::vec(arb_value(), 1..4),
    )
        .prop_map(|(path, op, values)| Comparison::new(path, op, values));

    let string = (
        arb_path(),
        prop_oneof![Just(ComparisonOp::Like), Just(ComparisonOp::Matches)],
        "[ -~]{0,12}",
    )
        .prop_map(|(path, op, s)| Comparison::new(path, op, StixValue::String(s)));

    prop_oneof![
        3 => scalar,
        1 => ordered,
        1 => set,
        1 => string,
        1 => arb_path().prop_map(Comparison::exists),
    ]
}

fn arb_comparison_expr() -> impl Strategy<Value = ComparisonExpression> {
    arb_comparison()
        .prop_map(ComparisonExpression::from)
        .prop_recursive(3, 8, 2, |inner| {
            (inner.clone(), prop_oneof![Just(BooleanOp::And), Just(BooleanOp::Or)], inner)
                .prop_map(|(l, op, r)| {
                    ComparisonExpression::Composite(CompositeComparison::new(l, op, r))
                })
        })
}

fn arb_qualifier() -> impl Strategy<Value = Qualifier> {
    prop_oneof![
        (1u32..=u32::MAX).prop_map(Qualifier::Repeats),
        (1u32..100_000).prop_map(|n| Qualifier::Within(n as f64)),
        (1u32..100_000).prop_map(|n| Qualifier::Within(n as f64 / 8.0)),
        (arb_timestamp(), 1i64..1_000_000).prop_map(|(start, offset)| Qualifier::StartStop {
            start,
            stop: start + chrono::Duration::seconds(offset),
        }),
    ]
}

fn arb_pattern() -> impl Strategy<Value = PatternExpression> {
    arb_comparison_expr()
        .prop_map(PatternExpression::Observation)
        .prop_recursive(4, 12, 2, |inner| {
            prop_oneof![
                (
                    inner.clone(),
                    prop_oneof![
                        Just(ObservationOp::And),
                        Just(ObservationOp::Or),
                        Just(ObservationOp::FollowedBy),
                    ],
                    inner.clone(),
                )
                    .prop_map(|(l, op, r)| {
                        PatternExpression::Composite(CompositePattern::new(l, op, r))
                    }),
                (inner, arb_qualifier()).prop_map(|(p, q)| p.qualify(q)),
            ]
        })
}

proptest! {
    #[test]
    fn test_rendered_tree_parses_back_to_itself(tree in arb_pattern()) {
        let text = tree.to_string();
        match parse(&text) {
            Ok(parsed) => prop_assert_eq!(parsed, tree, "rendered as `{}`", text),
            Err(e) => prop_assert!(false, "failed to parse `{}`: {}", text, e),
        }
    }

    #[test]
    fn test_rendering_is_a_fixed_point(tree in arb_pattern()) {
        let once = tree.to_string();
        let twice = parse(&once).map(|t| t.to_string());
        prop_assert_eq!(Ok(once), twice.map_err(|e| e.to_string()));
    }
}
