use scraper::Html;

/// Elements whose text never renders.
const HIDDEN: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Visible text of an HTML page, one text node per line.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut lines = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let text = text.trim();
        if !text.is_empty() {
            lines.push(text);
        }
    }

    lines.join("\n")
}
