use super::*;

fn interpret(raw: &str, query: &str) -> Result<Plan, AgentError> {
    interpret_plan(raw, query, &ExtractionDefaults::default())
}

// -----------------------------------------------------------------------
// unwrapping
// -----------------------------------------------------------------------

#[test]
fn accepts_bare_array() {
    let plan = interpret(
        r#"[{"tool":"product-scraper","args":{"search":"gaming keyboard","limit":5}}]"#,
        "gaming keyboard",
    )
    .expect("plan");
    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].args.search, "gaming keyboard");
    assert!(plan.steps[0].yields_items());
}

#[test]
fn strips_code_fences() {
    let raw = "```json\n[{\"tool\":\"product-scraper\",\"args\":{\"search\":\"mouse\"}}]\n```";
    let plan = interpret(raw, "mouse").expect("plan");
    assert_eq!(plan.steps[0].args.search, "mouse");
}

#[test]
fn slices_array_out_of_prose() {
    let raw = "Sure! Here is the plan:\n```json\n[{\"tool\":\"product-scraper\",\"args\":{\"search\":\"ssd\"}}]\n```\nLet me know.";
    let plan = interpret(raw, "ssd").expect("plan");
    assert_eq!(plan.steps[0].args.search, "ssd");
}

#[test]
fn accepts_single_step_and_wrapped_array() {
    let single = interpret(r#"{"tool":"product-scraper","args":{"search":"hdd"}}"#, "hdd")
        .expect("single step");
    assert_eq!(single.steps.len(), 1);

    let wrapped = interpret(
        r#"{"steps":[{"tool":"product-scraper","args":{"search":"a"}},{"tool":"product-scraper","args":{"search":"b"}}]}"#,
        "a and b",
    )
    .expect("wrapped");
    let searches: Vec<_> = wrapped.steps.iter().map(|s| s.args.search.as_str()).collect();
    assert_eq!(searches, ["a", "b"]);
}

#[test]
fn wrapper_prefers_the_array_of_tool_steps() {
    let plan = interpret(
        r#"{"notes": [], "steps": [{"tool":"product-scraper","args":{"search":"mouse"}}]}"#,
        "mouse",
    )
    .expect("plan");
    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].args.search, "mouse");

    let plan = interpret(
        r#"{"alternatives": [{"label":"cheap"}], "plan": [{"tool":"product-scraper","args":{"search":"ssd"}}]}"#,
        "ssd",
    )
    .expect("plan");
    assert_eq!(plan.steps[0].args.search, "ssd");
}

#[test]
fn garbage_is_a_parse_error_with_raw_text() {
    let err = interpret("I cannot help with that.", "laptop").expect_err("garbage");
    match err {
        AgentError::PlanParse { raw, .. } => assert_eq!(raw, "I cannot help with that."),
        other => panic!("expected PlanParse, got: {other:?}"),
    }
}

#[test]
fn empty_plan_is_rejected() {
    let err = interpret("[]", "laptop").expect_err("empty");
    assert!(matches!(err, AgentError::PlanParse { .. }), "got: {err:?}");
}

#[test]
fn unknown_tool_rejects_whole_plan() {
    let raw = r#"[{"tool":"product-scraper","args":{"search":"a"}},{"tool":"price-history","args":{}}]"#;
    let err = interpret(raw, "a").expect_err("unknown tool");
    assert!(
        matches!(err, AgentError::UnknownTool { ref tool } if tool == "price-history"),
        "got: {err:?}"
    );
}

// -----------------------------------------------------------------------
// args
// -----------------------------------------------------------------------

#[test]
fn missing_search_falls_back_to_query() {
    let plan = interpret(r#"[{"tool":"product-scraper","args":{"search":"  "}}]"#, " usb hub ")
        .expect("plan");
    assert_eq!(plan.steps[0].args.search, "usb hub");

    let no_args = interpret(r#"[{"tool":"product-scraper"}]"#, "usb hub").expect("plan");
    assert_eq!(no_args.steps[0].args.search, "usb hub");
}

#[test]
fn numeric_strings_are_accepted() {
    let plan = interpret(
        r#"[{"tool":"product-scraper","args":{"search":"tv","limit":"8","minRating":"4","maxPrice":"30000","platform":"Flipkart"}}]"#,
        "tv",
    )
    .expect("plan");
    let args = &plan.steps[0].args;
    assert_eq!(args.limit, 8);
    assert_eq!(args.min_rating, Some(4.0));
    assert_eq!(args.max_price, Some(30_000.0));
    assert_eq!(args.platform, SourceSelector::Flipkart);
}

#[test]
fn extraction_limit_is_floored_and_capped() {
    let small = interpret(r#"[{"tool":"product-scraper","args":{"search":"x","limit":1}}]"#, "x")
        .expect("plan");
    assert_eq!(small.steps[0].args.limit, 5);
    let large = interpret(r#"[{"tool":"product-scraper","args":{"search":"x","limit":90}}]"#, "x")
        .expect("plan");
    assert_eq!(large.steps[0].args.limit, 20);
}

#[test]
fn smart_floor_from_lone_max_price() {
    let plan = interpret(
        r#"[{"tool":"product-scraper","args":{"search":"keyboard","maxPrice":3500}}]"#,
        "keyboard under 3500",
    )
    .expect("plan");
    let args = &plan.steps[0].args;
    assert_eq!(args.min_price, Some(1_750.0));
    assert_eq!(args.max_price, Some(3_500.0));
}

#[test]
fn smart_floor_respects_explicit_minimum() {
    let plan = interpret(
        r#"[{"tool":"product-scraper","args":{"search":"k","minPrice":500,"maxPrice":3500}}]"#,
        "k",
    )
    .expect("plan");
    assert_eq!(plan.steps[0].args.min_price, Some(500.0));

    let zero_min = interpret(
        r#"[{"tool":"product-scraper","args":{"search":"k","minPrice":0,"maxPrice":1000}}]"#,
        "k",
    )
    .expect("plan");
    assert_eq!(zero_min.steps[0].args.min_price, Some(500.0));
}

#[test]
fn no_max_price_means_no_floor() {
    let plan = interpret(r#"[{"tool":"product-scraper","args":{"search":"k"}}]"#, "k").expect("plan");
    assert_eq!(plan.steps[0].args.min_price_bound(), None);
    assert_eq!(plan.steps[0].args.max_price, None);
}

// -----------------------------------------------------------------------
// display limit
// -----------------------------------------------------------------------

#[test]
fn display_limit_defaults_to_five() {
    let plan = interpret(r#"[{"tool":"product-scraper","args":{"search":"k"}}]"#, "keyboard").expect("plan");
    assert_eq!(plan.display_limit, 5);
}

#[test]
fn display_limit_is_clamped() {
    let over = interpret(
        r#"[{"tool":"product-scraper","args":{"search":"k"},"displayLimit":8}]"#,
        "keyboard",
    )
    .expect("plan");
    assert_eq!(over.display_limit, 5);

    let under = interpret(
        r#"[{"tool":"product-scraper","args":{"search":"k"},"displayLimit":0}]"#,
        "keyboard",
    )
    .expect("plan");
    assert_eq!(under.display_limit, 5);

    let nested = interpret(
        r#"[{"tool":"product-scraper","args":{"search":"k","displayLimit":"2"}}]"#,
        "keyboard",
    )
    .expect("plan");
    assert_eq!(nested.display_limit, 2);
}

#[test]
fn superlative_query_caps_display_limit() {
    let plan = interpret(
        r#"[{"tool":"product-scraper","args":{"search":"laptop"},"displayLimit":10}]"#,
        "top 10 laptops",
    )
    .expect("plan");
    assert_eq!(plan.display_limit, 3);
    assert_eq!(resolve_display_limit(Some(2.0), "BEST mouse"), 2);
}

#[test]
fn superlative_needs_whole_word() {
    assert!(has_superlative("Premium headphones"));
    assert!(has_superlative("the ultimate SSD"));
    assert!(!has_superlative("laptop stand"));
    assert!(!has_superlative("desktop speakers"));
}

#[test]
fn display_hint_comes_from_first_step_only() {
    let plan = interpret(
        r#"[{"tool":"product-scraper","args":{"search":"a"}},{"tool":"product-scraper","args":{"search":"b"},"displayLimit":2}]"#,
        "a and b",
    )
    .expect("plan");
    assert_eq!(plan.display_limit, 5);
}
