//! Code-block extraction properties.
//!
//! Round-trip, qualification and brace-balance invariants of the rewriter,
//! exercised through the public API.

use rstest::rstest;

use matforge::TokenCursor;
use matforge::dsl::block::read_next_block;
use matforge::dsl::{CodeBlock, CodeBlockParserOptions, NameRegistry};
use matforge::lexer::tokenize;

fn plain_options() -> CodeBlockParserOptions {
    CodeBlockParserOptions {
        emit_line_markers: false,
        ..CodeBlockParserOptions::default()
    }
}

fn qualified_options() -> CodeBlockParserOptions {
    CodeBlockParserOptions {
        qualify_members: true,
        emit_line_markers: false,
        ..CodeBlockParserOptions::default()
    }
}

fn registry_with(variables: &[&str]) -> NameRegistry {
    let mut registry = NameRegistry::new();
    for name in variables {
        registry.register_variable(name, false).unwrap();
    }
    registry
}

fn extract(source: &str, options: &CodeBlockParserOptions, registry: &NameRegistry) -> CodeBlock {
    let tokens = tokenize(source);
    let mut cursor = TokenCursor::new(&tokens);
    read_next_block(&mut cursor, options, registry, "test.mfront").unwrap()
}

// ============================================================================
// Round-trip: no-op rewriting reproduces the token text
// ============================================================================

#[rstest]
#[case("{ a = b + 1 ; }")]
#[case("{ if ( x > 0 ) { y = sqrt ( x ) ; } }")]
#[case("{ sig = lambda * trace ( eel ) * id + 2 * mu * eel ; }")]
fn test_noop_rewrite_is_identity_modulo_whitespace(#[case] source: &str) {
    let block = extract(source, &plain_options(), &NameRegistry::new());
    let inner: Vec<String> = tokenize(source)
        .iter()
        .skip(1)
        .map(|t| t.text.to_string())
        .collect();
    let expected = inner[..inner.len() - 1].join(" ");
    assert_eq!(block.code.split_whitespace().collect::<Vec<_>>().join(" "), expected);
    assert!(block.variables.is_empty());
    assert!(block.static_variables.is_empty());
}

// ============================================================================
// Qualification invariant
// ============================================================================

#[rstest]
#[case("{ a = b + 1 ; }", "self.a = self.b + 1 ;")]
#[case("{ a = a + b ; }", "self.a = self.a + self.b ;")]
#[case("{ x . a = b ; }", "x . a = self.b ;")]
#[case("{ x -> a = b ; }", "x -> a = self.b ;")]
#[case("{ x :: a = b ; }", "x :: a = self.b ;")]
fn test_member_qualification(#[case] source: &str, #[case] expected: &str) {
    let registry = registry_with(&["a", "b"]);
    let block = extract(source, &qualified_options(), &registry);
    assert_eq!(block.code.trim_end(), expected);
}

#[test]
fn test_scenario_a_references_and_rewrite() {
    let registry = registry_with(&["a", "b"]);
    let block = extract("{ a = b + 1 ; }", &qualified_options(), &registry);
    assert_eq!(block.code.trim_end(), "self.a = self.b + 1 ;");
    let variables: Vec<&str> = block.variables.iter().map(String::as_str).collect();
    assert_eq!(variables, vec!["a", "b"]);
    assert!(block.static_variables.is_empty());
}

#[test]
fn test_scenario_b_empty_block() {
    let block = extract("{ }", &qualified_options(), &registry_with(&["a"]));
    assert_eq!(block.code, "");
    assert!(block.variables.is_empty());
    assert!(block.static_variables.is_empty());
}

// ============================================================================
// Brace balance
// ============================================================================

#[rstest]
#[case("{ } after", 0)]
#[case("{ a { b } c } after", 1)]
#[case("{ { { x } } } after", 2)]
fn test_extraction_stops_at_matching_close(#[case] source: &str, #[case] _nested: u32) {
    let tokens = tokenize(source);
    let mut cursor = TokenCursor::new(&tokens);
    read_next_block(&mut cursor, &plain_options(), &NameRegistry::new(), "t").unwrap();
    assert_eq!(cursor.peek().unwrap().text, "after");
}

#[test]
fn test_two_sibling_blocks_from_one_start_via_replay() {
    let tokens = tokenize("{ a = b ; } tail");
    let mut cursor = TokenCursor::new(&tokens);
    let registry = registry_with(&["a", "b"]);
    let mark = cursor.save();
    let plain = read_next_block(&mut cursor, &plain_options(), &registry, "t").unwrap();
    let end = cursor.position();
    cursor.restore(mark);
    let qualified = read_next_block(&mut cursor, &qualified_options(), &registry, "t").unwrap();
    assert_eq!(cursor.position(), end);
    assert_eq!(plain.code.trim_end(), "a = b ;");
    assert_eq!(qualified.code.trim_end(), "self.a = self.b ;");
    assert_eq!(plain.variables, qualified.variables);
}

// ============================================================================
// Line markers
// ============================================================================

#[test]
fn test_markers_map_tokens_back_to_source_lines() {
    let tokens = tokenize("{\nf = 0 ;\ng = 1 ;\n}");
    let mut cursor = TokenCursor::new(&tokens);
    let block = read_next_block(
        &mut cursor,
        &CodeBlockParserOptions::default(),
        &NameRegistry::new(),
        "Norton.mfront",
    )
    .unwrap();
    assert!(block.code.contains("// line 2 \"Norton.mfront\""));
    assert!(block.code.contains("// line 3 \"Norton.mfront\""));
}
