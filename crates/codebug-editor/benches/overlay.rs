use codebug_editor::{CodeEditor, EditCommand, HighlightOverlay, SourceText, parse_markup};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "def f_{i:06}(a, b):  return a < b and b > 0 & 1  # overlay benchmark line\n"
        ));
    }
    out.pop();
    out
}

fn bench_fallback_refresh(c: &mut Criterion) {
    let source = SourceText::from(large_text(10_000));
    let mut overlay = HighlightOverlay::plain();
    c.bench_function("overlay_refresh/fallback_10k_lines", |b| {
        b.iter(|| {
            let rendered = overlay.refresh(black_box(&source));
            black_box(rendered.markup.len());
        })
    });
}

fn bench_typing_rederives(c: &mut Criterion) {
    let text = large_text(2_000);
    c.bench_function("typing/50_inserts_2k_lines", |b| {
        b.iter_batched(
            || {
                let mut editor = CodeEditor::plain(text.as_str());
                editor.set_cursor_char(text.chars().count() / 2);
                editor
            },
            |mut editor| {
                for _ in 0..50 {
                    editor.edit(EditCommand::Insert {
                        text: "<".to_string(),
                    });
                }
                black_box(editor.rendered().markup.len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_parse_markup(c: &mut Criterion) {
    let editor = CodeEditor::plain(large_text(10_000));
    let markup = editor.rendered().markup.clone();
    c.bench_function("parse_markup/10k_lines", |b| {
        b.iter(|| {
            let lines = parse_markup(black_box(&markup));
            black_box(lines.len());
        })
    });
}

criterion_group!(
    benches,
    bench_fallback_refresh,
    bench_typing_rederives,
    bench_parse_markup
);
criterion_main!(benches);
