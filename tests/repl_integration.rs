// ABOUTME: Integration tests for the REPL's line highlighter
//
// The read-eval-print loop itself (history file, Ctrl-C/Ctrl-D handling) is
// exercised manually; what's testable here is the `Highlighter` impl it wires
// into rustyline, since that runs as plain string-in string-out logic.

use lumisp::highlighter::LispHelper;
use rustyline::highlight::Highlighter;

#[test]
fn special_forms_and_builtins_are_colorized() {
    let helper = LispHelper::new();
    let highlighted = helper.highlight("(defn add [a b] (+ a b))", 0);
    assert!(highlighted.contains("defn"));
    assert!(highlighted.contains("\x1b["));
}

#[test]
fn plain_text_without_lisp_syntax_is_returned_unchanged_in_content() {
    let helper = LispHelper::new();
    let highlighted = helper.highlight("hello", 0);
    assert!(highlighted.contains("hello"));
}
