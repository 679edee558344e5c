//! Property tests for cue marking and composition.

use proptest::prelude::*;
use syncbook::cue::{cue_elements, fragment_id, mark_cues};
use syncbook::dom::{Dom, NodeId, parse_html};
use syncbook::style::parse_stylesheet;
use syncbook::{Composer, ComposerConfig};

const STYLESHEET: &str =
    ".c0{background-color:#fce5cd}.c1{font-weight:700}.c2{background-color:#d9ead3}";

/// One span: class index, word, and whether it sits one level deeper
/// inside an `<em>`.
type Item = (usize, String, bool);

fn span_markup((class, word, nested): &Item) -> String {
    let span = format!(r#"<span class="c{class}">{word} </span>"#);
    if *nested {
        format!("<em>{span}</em>")
    } else {
        span
    }
}

fn document(paragraphs: &[Vec<Item>]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|items| format!("<p>{}</p>", items.iter().map(span_markup).collect::<String>()))
        .collect();
    format!("<html><head><style>{STYLESHEET}</style></head><body>{body}</body></html>")
}

fn item_strategy() -> impl Strategy<Value = Item> {
    (0usize..3, "[a-z]{1,8}", any::<bool>())
}

fn paragraph_strategy() -> impl Strategy<Value = Vec<Vec<Item>>> {
    prop::collection::vec((0usize..3, "[a-z]{1,8}").prop_map(|(c, w)| (c, w, false)), 1..12)
        .prop_map(|items| vec![items])
}

fn chapter_strategy() -> impl Strategy<Value = Vec<Vec<Item>>> {
    prop::collection::vec(prop::collection::vec(item_strategy(), 1..6), 1..5)
}

fn highlighted(dom: &Dom) -> Vec<NodeId> {
    dom.select(dom.document(), &["span"])
        .into_iter()
        .filter(|&id| {
            dom.element_classes(id)
                .iter()
                .any(|c| *c == "c0" || *c == "c2")
        })
        .collect()
}

fn cue_ancestors(dom: &Dom, cues: &[NodeId], element: NodeId) -> usize {
    let mut count = 0;
    let mut current = Some(element);
    while let Some(id) = current {
        if cues.contains(&id) {
            count += 1;
        }
        current = dom.parent(id);
    }
    count
}

fn body_text(dom: &Dom) -> String {
    let body = dom.find_by_tag("body").unwrap();
    dom.deep_text(body).split_whitespace().collect()
}

proptest! {
    #[test]
    fn prop_marking_preserves_text(paragraphs in chapter_strategy()) {
        let mut dom = parse_html(&document(&paragraphs));
        let before = body_text(&dom);

        mark_cues(&mut dom, &parse_stylesheet(STYLESHEET)).unwrap();

        prop_assert_eq!(body_text(&dom), before);
    }

    #[test]
    fn prop_every_highlight_is_inside_a_cue(paragraphs in chapter_strategy()) {
        let mut dom = parse_html(&document(&paragraphs));
        let highlights = highlighted(&dom);

        let cues = mark_cues(&mut dom, &parse_stylesheet(STYLESHEET)).unwrap();

        for element in highlights {
            prop_assert!(cue_ancestors(&dom, &cues, element) >= 1);
        }
    }

    #[test]
    fn prop_composition_preserves_text(paragraphs in chapter_strategy()) {
        let html = document(&paragraphs);
        let before = body_text(&parse_html(&html));
        let composer = Composer::new().with_config(ComposerConfig {
            hyphenate: false,
            ..ComposerConfig::default()
        });

        let composition = composer.compose(&html, None).unwrap();

        prop_assert_eq!(body_text(&parse_html(&composition.xhtml)), before);
    }

    #[test]
    fn prop_each_highlight_has_one_cue(paragraphs in paragraph_strategy()) {
        let mut dom = parse_html(&document(&paragraphs));
        let highlights = highlighted(&dom);

        let cues = mark_cues(&mut dom, &parse_stylesheet(STYLESHEET)).unwrap();

        for element in highlights {
            prop_assert_eq!(cue_ancestors(&dom, &cues, element), 1);
        }
    }

    #[test]
    fn prop_cue_ids_are_sequential(paragraphs in paragraph_strategy()) {
        let mut dom = parse_html(&document(&paragraphs));

        let cues = mark_cues(&mut dom, &parse_stylesheet(STYLESHEET)).unwrap();

        let found = cue_elements(&dom);
        prop_assert_eq!(&found, &cues);
        for (index, &cue) in found.iter().enumerate() {
            let expected = fragment_id(index);
            prop_assert_eq!(dom.element_id(cue), Some(expected.as_str()));
        }
    }
}
