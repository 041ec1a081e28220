//! Property-Based Tests for the Statement Splitter
//!
//! Tests the following invariants:
//! - Whitespace-only scripts produce no statements
//! - Without directives, one statement per delimiter occurrence
//! - Re-joining the output and splitting again is a fixed point
//! - A mid-script directive moves boundaries and is never emitted

use proptest::prelude::*;

use scriptrun_splitter::{split, SplitError, SplitOptions, Splitter};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_whitespace() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just(' '), Just('\n'), Just('\t'), Just('\r')], 0..32)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Statement bodies: no delimiter, no line breaks, never blank, never a directive
fn arb_statement() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_(),'=*]{1,12}( [A-Za-z0-9_(),'=*]{1,12}){0,4}"
        .prop_filter("must not look like a directive", |s| {
            !s.to_ascii_uppercase().starts_with("DELIMITER")
        })
}

fn arb_delimiter() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(";".to_string()),
        Just("$$".to_string()),
        Just("//".to_string()),
        Just("#".to_string()),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn whitespace_only_scripts_are_empty(script in arb_whitespace(), delimiter in arb_delimiter()) {
        let result = split(&script, &delimiter).unwrap();
        prop_assert!(result.statements.is_empty());
        prop_assert_eq!(result.delimiter, delimiter);
    }

    #[test]
    fn one_statement_per_delimiter(
        bodies in prop::collection::vec(arb_statement(), 0..12),
        gaps in prop::collection::vec(arb_whitespace(), 12),
    ) {
        let mut script = String::new();
        for (body, gap) in bodies.iter().zip(gaps.iter()) {
            script.push_str(gap);
            script.push_str(body);
            script.push(';');
        }

        let result = split(&script, ";").unwrap();
        prop_assert_eq!(result.statements.len(), script.matches(';').count());
        prop_assert_eq!(result.statements, bodies);
    }

    #[test]
    fn resplitting_output_is_fixed_point(
        bodies in prop::collection::vec(arb_statement(), 1..12),
        delimiter in arb_delimiter(),
    ) {
        let script = bodies.join(&format!("{delimiter}\n"));
        let first = split(&script, &delimiter).unwrap();

        let rejoined = first.statements.join(&delimiter);
        let second = split(&rejoined, &delimiter).unwrap();
        prop_assert_eq!(second.statements, first.statements);
    }

    #[test]
    fn directive_switches_boundaries(
        before in prop::collection::vec(arb_statement(), 0..5),
        after in prop::collection::vec(arb_statement(), 1..5),
    ) {
        let mut script = String::new();
        for body in &before {
            script.push_str(body);
            script.push_str(";\n");
        }
        script.push_str("DELIMITER $$\n");
        for body in &after {
            // The old delimiter is plain text once the directive has run.
            script.push_str(body);
            script.push_str("; ");
            script.push_str(body);
            script.push_str("$$\n");
        }

        let result = split(&script, ";").unwrap();
        prop_assert_eq!(result.statements.len(), before.len() + after.len());
        prop_assert!(result.statements.iter().all(|s| !s.to_ascii_uppercase().starts_with("DELIMITER")));
        for (statement, body) in result.statements[before.len()..].iter().zip(after.iter()) {
            prop_assert_eq!(statement, &format!("{body}; {body}"));
        }
        prop_assert_eq!(result.delimiter, "$$");
    }

    #[test]
    fn statements_never_contain_line_breaks(
        bodies in prop::collection::vec(arb_statement(), 1..8),
    ) {
        let script = bodies
            .iter()
            .map(|b| b.replace(' ', "\n"))
            .collect::<Vec<_>>()
            .join(";\r\n");
        let result = split(&script, ";").unwrap();
        prop_assert!(result.statements.iter().all(|s| !s.contains('\n') && !s.contains('\r')));
    }

    #[test]
    fn empty_delimiter_always_fails(script in ".{0,64}") {
        let splitter = Splitter::new(SplitOptions::default());
        prop_assert_eq!(splitter.split(&script, ""), Err(SplitError::EmptyDelimiter));
    }
}
