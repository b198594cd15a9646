use scraper::ElementRef;

/// Text content of a node with non-breaking spaces and runs of whitespace
/// collapsed to single spaces.
pub fn extract_text(node: ElementRef) -> String {
    node.text()
        .collect::<String>()
        .replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Direct element children of `node` with the given tag name, in document order.
pub fn child_elements<'a>(
    node: ElementRef<'a>,
    tag: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    node.children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
}
