//! Property tests over the public operation contract.
//!
//! These drive random operation sequences through the editor and check the
//! structural invariants that must hold after every public call, plus the
//! undo/redo round-trip laws.

use edit_core::{Clipboard, CodeEditor, Coordinate, LocalClipboard, SelectionMode};
use edit_text::utf8;
use proptest::prelude::*;

/// What `set_text` keeps: everything except `\r` and control bytes other
/// than `\n` and `\t`.
fn filtered(input: &str) -> String {
    input
        .chars()
        .filter(|c| !(*c == '\r' || (c.is_ascii_control() && *c != '\n' && *c != '\t')))
        .collect()
}

fn check_invariants(editor: &CodeEditor) {
    // P1: the buffer never empties.
    assert!(editor.total_lines() >= 1);

    // P2: the selection stays ordered.
    assert!(editor.selection_start() <= editor.selection_end());

    // P3: the (sanitized) cursor is a valid coordinate.
    let cursor = editor.cursor_position();
    assert!(cursor.line < editor.total_lines());
    assert!(cursor.column <= editor.buffer().line_max_column(cursor.line));

    // P4: no orphan continuation bytes anywhere.
    for line in 0..editor.total_lines() {
        let bytes = editor.buffer().line_bytes(line);
        let mut index = 0;
        while index < bytes.len() {
            assert!(
                !utf8::is_continuation(bytes[index]),
                "orphan continuation byte at {line}:{index}"
            );
            let len = utf8::sequence_length(bytes[index]).min(bytes.len() - index);
            for offset in 1..len {
                assert!(utf8::is_continuation(bytes[index + offset]));
            }
            index += len;
        }
    }

    // P7: text and lines agree.
    assert_eq!(editor.text(), editor.text_lines().join("\n"));
}

#[derive(Debug, Clone)]
enum Op {
    Insert(String),
    Enter(char, bool),
    Backspace,
    Delete,
    Paste(String),
    Cut,
    ClearText,
    SetCursor(u8, u8),
    Select(u8, u8, u8, u8, u8),
    MoveLeft(u8, bool, bool),
    MoveRight(u8, bool, bool),
    MoveUp(u8, bool),
    MoveDown(u8, bool),
    Home(bool),
    End(bool),
    SelectAll,
}

fn any_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('0', '9'),
        Just(' '),
        Just('\t'),
        Just('\n'),
        Just('é'),
        Just('π'),
        Just('😀'),
    ]
}

fn text_fragment() -> impl Strategy<Value = String> {
    proptest::collection::vec(any_char(), 0..8).prop_map(|chars| chars.into_iter().collect())
}

fn any_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        text_fragment().prop_map(Op::Insert),
        (any_char(), any::<bool>()).prop_map(|(c, shift)| Op::Enter(c, shift)),
        Just(Op::Backspace),
        Just(Op::Delete),
        text_fragment().prop_map(Op::Paste),
        Just(Op::Cut),
        Just(Op::ClearText),
        (any::<u8>(), any::<u8>()).prop_map(|(l, c)| Op::SetCursor(l, c)),
        (any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>(), 0u8..3)
            .prop_map(|(a, b, c, d, m)| Op::Select(a, b, c, d, m)),
        (0u8..5, any::<bool>(), any::<bool>()).prop_map(|(n, s, w)| Op::MoveLeft(n, s, w)),
        (0u8..5, any::<bool>(), any::<bool>()).prop_map(|(n, s, w)| Op::MoveRight(n, s, w)),
        (0u8..5, any::<bool>()).prop_map(|(n, s)| Op::MoveUp(n, s)),
        (0u8..5, any::<bool>()).prop_map(|(n, s)| Op::MoveDown(n, s)),
        any::<bool>().prop_map(Op::Home),
        any::<bool>().prop_map(Op::End),
        Just(Op::SelectAll),
    ]
}

/// Mutating subset used by the round-trip laws.
fn mutating_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        text_fragment().prop_map(Op::Insert),
        (any_char(), any::<bool>()).prop_map(|(c, shift)| Op::Enter(c, shift)),
        Just(Op::Backspace),
        Just(Op::Delete),
        text_fragment().prop_map(Op::Paste),
        Just(Op::Cut),
        Just(Op::ClearText),
    ]
}

fn apply(editor: &mut CodeEditor, clipboard: &mut LocalClipboard, op: &Op) {
    match op {
        Op::Insert(text) => editor.insert_text(text),
        Op::Enter(c, shift) => editor.enter_character(*c as u32, *shift),
        Op::Backspace => editor.backspace(),
        Op::Delete => editor.delete(),
        Op::Paste(text) => {
            clipboard.set(text.clone());
            editor.paste(clipboard);
        }
        Op::Cut => editor.cut(clipboard),
        Op::ClearText => editor.clear_text(),
        Op::SetCursor(line, column) => {
            editor.set_cursor_position(Coordinate::new(*line as usize, *column as usize));
        }
        Op::Select(a, b, c, d, mode) => {
            let mode = match mode % 3 {
                0 => SelectionMode::Normal,
                1 => SelectionMode::Word,
                _ => SelectionMode::Line,
            };
            editor.set_selection(
                Coordinate::new(*a as usize, *b as usize),
                Coordinate::new(*c as usize, *d as usize),
                mode,
            );
        }
        Op::MoveLeft(n, select, word) => editor.move_left(*n as u32, *select, *word),
        Op::MoveRight(n, select, word) => editor.move_right(*n as u32, *select, *word),
        Op::MoveUp(n, select) => editor.move_up(*n as u32, *select),
        Op::MoveDown(n, select) => editor.move_down(*n as u32, *select),
        Op::Home(select) => editor.move_home(*select),
        Op::End(select) => editor.move_end(*select),
        Op::SelectAll => editor.select_all(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    // Scenario 7: arbitrary text survives `set_text` modulo stripping.
    #[test]
    fn set_text_round_trips_filtered_input(
        chars in proptest::collection::vec(any::<char>(), 0..120),
    ) {
        let input: String = chars.into_iter().collect();
        let mut editor = CodeEditor::new();
        editor.set_text(&input);
        prop_assert_eq!(editor.text(), filtered(&input));
        check_invariants(&editor);
    }

    // P9: re-setting the current text is idempotent and clears history.
    #[test]
    fn set_text_of_own_text_is_idempotent(input in "[a-zé😀 \\t\\n]{0,60}") {
        let mut editor = CodeEditor::new();
        editor.set_text(&input);
        let first = editor.text();
        editor.set_text(&first);
        prop_assert_eq!(editor.text(), first);
        prop_assert_eq!(editor.undo_len(), 0);
    }

    // P1-P4, P7: invariants hold after any operation sequence.
    #[test]
    fn invariants_hold_after_any_op_sequence(
        seed in "[a-z \\t\\n]{0,40}",
        ops in proptest::collection::vec(any_op(), 0..24),
    ) {
        let mut editor = CodeEditor::new();
        let mut clipboard = LocalClipboard::new();
        editor.set_text(&seed);
        check_invariants(&editor);
        for op in &ops {
            apply(&mut editor, &mut clipboard, op);
            check_invariants(&editor);
        }
    }

    // P8: select-all covers every character.
    #[test]
    fn select_all_covers_everything(
        seed in "[a-z \\t\\n]{0,40}",
        ops in proptest::collection::vec(any_op(), 0..12),
    ) {
        let mut editor = CodeEditor::new();
        let mut clipboard = LocalClipboard::new();
        editor.set_text(&seed);
        for op in &ops {
            apply(&mut editor, &mut clipboard, op);
        }
        editor.select_all();
        prop_assert_eq!(editor.selected_text(), editor.text());
    }

    // P5: undoing everything restores the original text.
    #[test]
    fn undo_all_restores_original_text(
        seed in "[a-z \\t\\n]{0,40}",
        ops in proptest::collection::vec(any_op(), 0..20),
    ) {
        let mut editor = CodeEditor::new();
        let mut clipboard = LocalClipboard::new();
        editor.set_text(&seed);
        let original = editor.text();

        for op in &ops {
            apply(&mut editor, &mut clipboard, op);
        }

        let steps = editor.undo_index() as u32;
        editor.undo(steps);
        prop_assert_eq!(editor.text(), original);
        prop_assert!(!editor.can_undo());
        check_invariants(&editor);
    }

    // P6: undo then redo reproduces the post-sequence state exactly.
    #[test]
    fn undo_redo_reproduces_final_state(
        seed in "[a-z \\t\\n]{0,40}",
        ops in proptest::collection::vec(mutating_op(), 1..16),
    ) {
        let mut editor = CodeEditor::new();
        let mut clipboard = LocalClipboard::new();
        editor.set_text(&seed);

        for op in &ops {
            apply(&mut editor, &mut clipboard, op);
        }

        let text = editor.text();
        let cursor = editor.cursor_position();
        let selection = (editor.selection_start(), editor.selection_end());

        let steps = editor.undo_index() as u32;
        editor.undo(steps);
        editor.redo(steps);

        prop_assert_eq!(editor.text(), text);
        prop_assert_eq!(editor.cursor_position(), cursor);
        prop_assert_eq!((editor.selection_start(), editor.selection_end()), selection);
        check_invariants(&editor);
    }

    // P10: changing the tab size between append and replay never corrupts.
    #[test]
    fn undo_is_tab_size_invariant(
        seed in "[a-z\\t \\n]{0,40}",
        ops in proptest::collection::vec(mutating_op(), 1..12),
        tab_a in 1usize..=32,
        tab_b in 1usize..=32,
    ) {
        let mut editor = CodeEditor::new();
        let mut clipboard = LocalClipboard::new();
        editor.set_tab_size(tab_a);
        editor.set_text(&seed);
        let original = editor.text();

        for op in &ops {
            apply(&mut editor, &mut clipboard, op);
        }
        let final_text = editor.text();

        editor.set_tab_size(tab_b);
        let steps = editor.undo_index() as u32;
        editor.undo(steps);
        prop_assert_eq!(editor.text(), original);

        editor.redo(steps);
        prop_assert_eq!(editor.text(), final_text);
        check_invariants(&editor);
    }

    // Arbitrary coordinates are sanitized, never rejected or out of range.
    #[test]
    fn arbitrary_coordinates_are_always_sanitized(
        seed in "[a-z \\t\\n]{0,30}",
        line in any::<usize>(),
        column in any::<usize>(),
    ) {
        let mut editor = CodeEditor::new();
        editor.set_text(&seed);
        editor.set_cursor_position(Coordinate::new(line, column));
        check_invariants(&editor);
        editor.set_selection(
            Coordinate::new(column, line),
            Coordinate::new(line, column),
            SelectionMode::Normal,
        );
        check_invariants(&editor);
    }
}
