use codebug_editor::{CodeEditor, EditCommand, RenderOrigin, parse_markup, plain_text};
use codebug_editor_highlight_simple::RegexHighlighter;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FRAGMENTS: &[&str] = &[
    "def ", "class ", "f", "(", ")", ":", "\n", "    ", "return ", "x", " < ", " > ", " & ",
    "\"", "'", "\"\"\"", "#", "@", "1.5e3", "0x1F", "None", "print", " ", "&lt;", "<b>", "值",
];

#[test]
fn random_python_text_survives_highlighting() {
    let highlighter = RegexHighlighter::python_default().unwrap();
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..300 {
        let count = rng.gen_range(0..40);
        let source: String = (0..count)
            .map(|_| FRAGMENTS[rng.gen_range(0..FRAGMENTS.len())])
            .collect();
        let markup = highlighter.render(&source);
        assert_eq!(plain_text(&parse_markup(&markup)), source);
    }
}

#[test]
fn editor_uses_python_engine() {
    let engine = RegexHighlighter::python_default().unwrap();
    let mut editor = CodeEditor::new("", Some(Box::new(engine)));
    assert_eq!(editor.overlay().engine_name(), Some("python"));

    editor.edit(EditCommand::Insert {
        text: "def f(a):\n    return a < 1".to_string(),
    });
    let rendered = editor.rendered();
    assert_eq!(rendered.origin, RenderOrigin::Engine);

    let lines = parse_markup(&rendered.markup);
    assert!(lines[0][0].has_class("keyword"));
    assert_eq!(plain_text(&lines), editor.text().as_str());
}
