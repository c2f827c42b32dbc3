use clozewright::cloze::parse_clozes;
use clozewright::document::{BlockKind, parse_content};
use clozewright::editor::insert_next_cloze;
use clozewright::highlight::{self, SyntectHighlighter};
use clozewright::render::{
    ClozeView, RenderMode, RenderOptions, cloze_count, render, render_for_output,
    render_for_preview,
};

const CARD: &str = include_str!("fixtures/card.txt");

fn visible_text(html: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    html_escape::decode_html_entities(&out).into_owned()
}

fn span_balance(html: &str) -> (usize, usize) {
    (html.matches("<span").count(), html.matches("</span>").count())
}

#[test]
fn test_fixture_shape() {
    let blocks = parse_content(CARD);
    let kinds: Vec<_> = blocks.iter().map(|b| b.kind).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::Prose,
            BlockKind::Code,
            BlockKind::Prose,
            BlockKind::Code,
            BlockKind::Code
        ]
    );
    assert_eq!(blocks[1].language.as_deref(), Some("typescript"));
    assert_eq!(blocks[3].language.as_deref(), Some("css"));
    assert_eq!(blocks[4].language.as_deref(), Some("plaintext"));
    assert_eq!(cloze_count(CARD), 6);
}

#[test]
fn test_output_with_highlighting_keeps_every_cloze() {
    let highlighter = SyntectHighlighter::load_defaults();
    let html = render_for_output(CARD, Some(&highlighter));
    let visible = visible_text(&html);

    assert!(html.contains("<span style=\"color:"), "code should be highlighted");
    for cloze in parse_clozes(CARD) {
        let marker = format!("{{{{c{}::", cloze.cloze_number);
        assert!(html.contains(&marker), "missing {marker}");
        assert!(visible.contains(&cloze.content), "missing {}", cloze.content);
        if let Some(hint) = &cloze.hint {
            assert!(visible.contains(&format!("::{hint}}}}}")), "missing hint {hint}");
        }
    }
}

#[test]
fn test_output_without_highlighter_reproduces_markers() {
    let html = render_for_output(CARD, None);
    let visible = visible_text(&html);
    for cloze in parse_clozes(CARD) {
        assert!(visible.contains(&CARD[cloze.start_index..cloze.end_index]));
    }
}

#[test]
fn test_preview_hidden_hides_only_active_cloze() {
    let highlighter = SyntectHighlighter::load_defaults();
    let html = render_for_preview(CARD, Some(&highlighter), ClozeView::Hidden { active: 4 });
    let visible = visible_text(&html);

    assert!(!visible.contains("independent"));
    assert!(visible.contains("[...]"));
    assert!(visible.contains("closure"));
    assert!(!visible.contains("{{c"));

    let (open, close) = span_balance(&html);
    assert_eq!(open, close);
}

#[test]
fn test_preview_hidden_shows_hint_in_code() {
    let highlighter = SyntectHighlighter::load_defaults();
    let html = render_for_preview(CARD, Some(&highlighter), ClozeView::Hidden { active: 3 });
    assert!(visible_text(&html).contains("[current value]"));
}

#[test]
fn test_preview_edit_view_is_balanced() {
    let highlighter = SyntectHighlighter::load_defaults();
    let html = render_for_preview(CARD, Some(&highlighter), ClozeView::Edit);
    let (open, close) = span_balance(&html);
    assert_eq!(open, close);
    for n in 1..=6 {
        assert!(visible_text(&html).contains(&format!("c{n}")));
    }
}

#[test]
fn test_shared_loader_feeds_render() {
    let state = highlight::shared().wait();
    let options = RenderOptions::new(RenderMode::Output, state.as_dyn());
    let html = render("```js\nlet {{c1::x}} = 1;\n```", &options);
    assert!(html.contains("{{c1::"));
    assert!(html.contains("<span style=\"color:"));
}

#[test]
fn test_unknown_theme_falls_back_to_plain_code() {
    let highlighter = SyntectHighlighter::load_defaults();
    let options = RenderOptions::new(RenderMode::Output, Some(&highlighter)).with_theme("nope");
    let html = render("```js\nlet {{c1::x}} = 1;\n```", &options);
    assert!(html.contains("let {{c1::x}} = 1;"));
}

#[test]
fn test_edit_then_render() {
    let start = CARD.find("environment").unwrap();
    let end = start + "environment".len();
    let edited = insert_next_cloze(CARD, start, end);

    assert_eq!(cloze_count(&edited.text), 7);
    let html = render_for_output(&edited.text, None);
    assert!(html.contains("{{c7::environment}}"));
}
