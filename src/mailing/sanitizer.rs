use ammonia::Builder;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "strong", "em", "u", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "a",
    "img",
];
const ALLOWED_LINK_ATTRIBUTES: &[&str] = &["href", "target"];
const ALLOWED_IMAGE_ATTRIBUTES: &[&str] = &["src", "alt", "width", "height"];

static SANITIZER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let tags = ALLOWED_TAGS.iter().copied().collect::<HashSet<&str>>();
    let tag_attributes: HashMap<&str, HashSet<&str>> = HashMap::from([
        ("a", ALLOWED_LINK_ATTRIBUTES.iter().copied().collect()),
        ("img", ALLOWED_IMAGE_ATTRIBUTES.iter().copied().collect()),
    ]);

    let mut builder = Builder::default();
    builder
        .tags(tags)
        .tag_attributes(tag_attributes)
        .generic_attributes(HashSet::new())
        .link_rel(None);
    builder
});

/// Build the HTML variant of a message body.
/// Tags and attributes out of the allow-list are stripped, not escaped:
/// their text content stays, except for `script` and `style` which go away entirely.
pub fn sanitize_html(body: &str) -> String {
    SANITIZER.clean(body).to_string()
}
