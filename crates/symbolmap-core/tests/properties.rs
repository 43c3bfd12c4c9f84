//! Property-based tests for scanner robustness and strategy equivalence

use proptest::prelude::*;
use symbolmap_core::{
    KeywordTable, SymbolExtractionStrategy, SymbolKind, TextScanStrategy, TextScanner,
    TokenStreamStrategy,
};

// Type names that can never collide with a keyword
fn type_name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}".prop_map(|s| format!("Sym{s}"))
}

fn function_name() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,6}".prop_map(|s| format!("fn_{s}"))
}

fn namespace_name() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Z][a-z]{1,4}", 1..3).prop_map(|parts| format!("Ns{}", parts.join("\\")))
}

// Well-formed top-level statements, some of which hide keywords
fn statement() -> impl Strategy<Value = String> {
    prop_oneof![
        type_name().prop_map(|n| format!(
            "class {n} {{ public function m() {{ return '{{'; }} }}"
        )),
        type_name().prop_map(|n| format!("interface {n} {{}}")),
        type_name().prop_map(|n| format!("trait {n} {{ function t() {{}} }}")),
        type_name().prop_map(|n| format!("enum {n}: string {{ case A = 'a'; }}")),
        function_name().prop_map(|f| format!("function {f}() {{ return function () {{}}; }}")),
        namespace_name().prop_map(|ns| format!("namespace {ns};")),
        type_name().prop_map(|n| format!("$x = new class {{ function {n}() {{}} }};")),
        type_name().prop_map(|n| format!("// class {n} {{}}")),
        type_name().prop_map(|n| format!("/* interface {n} {{}} */")),
        type_name().prop_map(|n| format!("$s = \"interface {n} {{\";")),
        type_name().prop_map(|n| format!("echo {n}::class;")),
        type_name().prop_map(|n| format!("$h = <<<EOT\nclass {n} {{\nEOT;")),
        type_name().prop_map(|n| format!("?>\n<div>class {n} {{}}</div>\n<?php")),
        type_name().prop_map(|n| format!("$a = ['k'=>function() {{ class {n} {{}} }}];")),
        type_name().prop_map(|n| format!("$b = $a ?:function() {{ function {n}() {{}} }};")),
        type_name().prop_map(|n| format!("map(class: {n}::class, enum: 1);")),
        Just("$f = fn() => 1;".to_string()),
        Just("use function Foo\\bar;".to_string()),
    ]
}

fn php_source() -> impl Strategy<Value = String> {
    prop::collection::vec(statement(), 0..20)
        .prop_map(|statements| format!("<?php\n{}\n", statements.join("\n")))
}

proptest! {
    /// Property: neither strategy panics on arbitrary bytes
    #[test]
    fn prop_never_panics_on_bytes(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = TextScanStrategy::new().extract(&bytes);
        let _ = TokenStreamStrategy.extract(&bytes);
    }

    /// Property: neither strategy panics on PHP-flavoured noise
    #[test]
    fn prop_never_panics_on_php_noise(
        body in "[ \na-zA-Z_${}();'\"/*#:<>?&=\\\\-]{0,300}"
    ) {
        let source = format!("<?php {body}");
        let _ = TextScanStrategy::new().extract(source.as_bytes());
        let _ = TokenStreamStrategy.extract(source.as_bytes());
        let _ = TextScanner::new(source.as_bytes(), KeywordTable::class_like()).find_first();
    }

    /// Property: both strategies agree on well-formed input
    #[test]
    fn prop_strategies_agree(source in php_source()) {
        let text = TextScanStrategy::new().extract(source.as_bytes());
        let tokens = TokenStreamStrategy.extract(source.as_bytes());
        prop_assert!(text.is_ok(), "text scan failed: {:?}", text);
        prop_assert!(tokens.is_ok(), "token stream failed: {:?}", tokens);
        prop_assert_eq!(text.unwrap(), tokens.unwrap());
    }

    /// Property: hidden keywords never surface as declarations
    #[test]
    fn prop_only_real_declarations(source in php_source()) {
        let symbols = TextScanStrategy::new().extract(source.as_bytes()).unwrap();
        for kind in SymbolKind::ALL {
            for name in symbols.get(kind) {
                let local = name.rsplit('\\').next().unwrap_or(name.as_str());
                let declared = format!("{} {}", kind.as_str(), local);
                prop_assert!(source.contains(&declared), "{} not declared in source", declared);
            }
        }
    }
}
