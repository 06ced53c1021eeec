//! Turns fetched page text into markup that is safe to inject into the
//! host page's preview pane.
//!
//! The pane markup comes from an `ammonia` allowlist cleaner:
//!
//! - only a fixed set of HTML tags and attributes survive; scripts, styles,
//!   SVG/MathML, frames and plugin elements are dropped with their content
//! - URLs are limited to http/https/mailto and relative ones are resolved
//!   against the page (or its `<base href>`)
//! - anchors open in a new browsing context
//! - a viewport directive and a fit-to-panel stylesheet are prepended
//!
//! `scraper` (html5ever underneath, so malformed input degrades to a
//! best-effort tree instead of failing) supplies the title, the base URL
//! and a plain-text outline. Every tree walk here is iterative; nesting
//! depth in fetched pages is unbounded.

use std::collections::HashSet;

use ammonia::{Builder, UrlRelative};
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// Elements skipped by the outline, children included.
const HIDDEN_ELEMENTS: &[&str] = &[
    "script", "noscript", "template", "style", "title", "head", "object", "embed", "applet",
    "iframe", "svg", "math",
];

/// Elements kept in the pane markup.
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "article", "aside", "b", "blockquote", "br", "caption", "cite", "code", "dd",
    "del", "details", "div", "dl", "dt", "em", "figcaption", "figure", "footer", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hr", "i", "img", "ins", "kbd", "li", "main", "mark",
    "nav", "ol", "p", "pre", "q", "s", "section", "small", "span", "strong", "sub", "summary",
    "sup", "table", "tbody", "td", "tfoot", "th", "thead", "time", "tr", "u", "ul",
];

/// Elements removed from the pane markup together with their content.
const STRIPPED_WITH_CONTENT: &[&str] = &[
    "script", "style", "title", "noscript", "template", "iframe", "frame", "frameset", "object",
    "embed", "applet", "svg", "math", "textarea", "select",
];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

const DANGEROUS_SCHEMES: &[&str] = &["javascript", "vbscript"];

/// Upper bound on outline entries for text-only hosts.
const MAX_OUTLINE_BLOCKS: usize = 400;

pub const VIEWPORT_META: &str =
    r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#;

pub const FIT_STYLESHEET: &str = "<style>\
body { width: 100% !important; max-width: 100% !important; margin: 0 !important; \
padding: 0 !important; overflow-x: hidden !important; } \
img, video, iframe { max-width: 100% !important; height: auto !important; }\
</style>";

/// A plain-text view of the page for hosts that cannot render HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    Link { text: String, href: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedPage {
    /// `<title>` text, or the page URL when there is none.
    pub title: String,
    /// Markup for the content pane.
    pub html: String,
    pub outline: Vec<Block>,
    pub scripts_removed: usize,
}

/// Sanitize `raw` fetched from `page_url`.
pub fn sanitize_document(raw: &str, page_url: &str) -> SanitizedPage {
    let document = Html::parse_document(raw);
    let base = document_base(&document, page_url);

    let title = first_match(&document, "title")
        .map(|el| el.text().collect::<String>())
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| page_url.to_string());

    let scripts_removed = Selector::parse("script")
        .map(|sel| document.select(&sel).count())
        .unwrap_or(0);
    if scripts_removed > 0 {
        log::debug!("stripping {} script element(s) from {}", scripts_removed, page_url);
    }

    let cleaned = cleaner(base.clone()).clean(raw).to_string();
    let mut html =
        String::with_capacity(VIEWPORT_META.len() + FIT_STYLESHEET.len() + cleaned.len());
    html.push_str(VIEWPORT_META);
    html.push_str(FIT_STYLESHEET);
    html.push_str(&cleaned);

    let body = first_match(&document, "body").unwrap_or_else(|| document.root_element());
    let outline = collect_outline(body, base.as_ref());

    SanitizedPage {
        title,
        html,
        outline,
        scripts_removed,
    }
}

fn cleaner(base: Option<Url>) -> Builder<'static> {
    let mut b = Builder::new();
    b.tags(ALLOWED_TAGS.iter().copied().collect::<HashSet<_>>());
    b.clean_content_tags(STRIPPED_WITH_CONTENT.iter().copied().collect::<HashSet<_>>());
    b.add_tag_attributes("img", &["loading", "decoding"]);
    b.add_tag_attributes("td", &["colspan", "rowspan"]);
    b.add_tag_attributes("th", &["colspan", "rowspan", "scope"]);
    b.url_schemes(URL_SCHEMES.iter().copied().collect::<HashSet<_>>());
    b.url_relative(match base {
        Some(url) => UrlRelative::RewriteWithBase(url),
        None => UrlRelative::Deny,
    });
    b.link_rel(Some("noopener noreferrer"));
    b.set_tag_attribute_value("a", "target", "_blank");
    b.strip_comments(true);
    b
}

fn first_match<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    document.select(&sel).next()
}

/// The page URL, overridden by a `<base href>` if the document has one.
fn document_base(document: &Html, page_url: &str) -> Option<Url> {
    let page = Url::parse(page_url).ok()?;
    let declared = first_match(document, "base[href]")
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| page.join(href.trim()).ok());
    Some(declared.unwrap_or(page))
}

/// Resolve `value` against `base`. Unresolvable values are kept verbatim;
/// script-bearing schemes yield `None`.
pub fn resolve_reference(base: Option<&Url>, value: &str) -> Option<String> {
    let trimmed = value.trim();
    let resolved = match base {
        Some(b) => b.join(trimmed).ok(),
        None => Url::parse(trimmed).ok(),
    };
    match resolved {
        Some(u) if DANGEROUS_SCHEMES.contains(&u.scheme()) => None,
        Some(u) => Some(u.to_string()),
        None => {
            let scheme = trimmed.split(':').next().unwrap_or("").trim().to_ascii_lowercase();
            if trimmed.contains(':') && DANGEROUS_SCHEMES.contains(&scheme.as_str()) {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
    }
}

// ─── Outline ─────────────────────────────────────────────────────────────────

enum Step<'a> {
    Enter(ElementRef<'a>),
    Leave(ElementRef<'a>),
    Text(&'a str),
}

enum BlockKind {
    Heading(u8),
    Paragraph,
}

/// A heading or paragraph whose text is being gathered.
struct OpenBlock<'a> {
    element: ElementRef<'a>,
    kind: BlockKind,
    words: Vec<String>,
    links: Vec<Block>,
}

struct OpenLink<'a> {
    element: ElementRef<'a>,
    href: Option<String>,
    words: Vec<String>,
}

fn block_kind(tag: &str) -> Option<BlockKind> {
    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            Some(BlockKind::Heading(tag.as_bytes()[1] - b'0'))
        }
        "p" | "li" | "blockquote" | "pre" | "dd" | "figcaption" => Some(BlockKind::Paragraph),
        _ => None,
    }
}

/// Headings, paragraphs and links in document order. Blocks do not nest:
/// the outermost one gathers all text below it. Links inside a paragraph
/// follow that paragraph; links inside a heading are not listed.
fn collect_outline(root: ElementRef<'_>, base: Option<&Url>) -> Vec<Block> {
    let mut out = Vec::new();
    let mut block: Option<OpenBlock<'_>> = None;
    let mut link: Option<OpenLink<'_>> = None;
    let mut stack = vec![Step::Enter(root)];

    while let Some(step) = stack.pop() {
        if out.len() >= MAX_OUTLINE_BLOCKS {
            break;
        }
        match step {
            Step::Text(t) => {
                let words = t.split_whitespace().map(str::to_string);
                if let Some(l) = link.as_mut() {
                    l.words.extend(words.clone());
                }
                if let Some(b) = block.as_mut() {
                    b.words.extend(words);
                }
            }
            Step::Enter(el) => {
                let tag = el.value().name();
                if HIDDEN_ELEMENTS.contains(&tag) {
                    continue;
                }
                if block.is_none() && link.is_none() {
                    if let Some(kind) = block_kind(tag) {
                        block = Some(OpenBlock {
                            element: el,
                            kind,
                            words: Vec::new(),
                            links: Vec::new(),
                        });
                    }
                }
                let in_heading = matches!(
                    block,
                    Some(OpenBlock {
                        kind: BlockKind::Heading(_),
                        ..
                    })
                );
                if tag == "a" && link.is_none() && !in_heading {
                    link = Some(OpenLink {
                        element: el,
                        href: el.value().attr("href").and_then(|h| resolve_reference(base, h)),
                        words: Vec::new(),
                    });
                }
                stack.push(Step::Leave(el));
                for child in el.children().rev() {
                    match child.value() {
                        Node::Text(t) => stack.push(Step::Text(&**t)),
                        Node::Element(_) => {
                            if let Some(child_el) = ElementRef::wrap(child) {
                                stack.push(Step::Enter(child_el));
                            }
                        }
                        _ => {}
                    }
                }
            }
            Step::Leave(el) => {
                if link.as_ref().is_some_and(|l| l.element.id() == el.id()) {
                    if let Some(finished) = link.take().and_then(finish_link) {
                        match block.as_mut() {
                            Some(b) => b.links.push(finished),
                            None => out.push(finished),
                        }
                    }
                }
                if block.as_ref().is_some_and(|b| b.element.id() == el.id()) {
                    if let Some(finished) = block.take() {
                        finish_block(finished, &mut out);
                    }
                }
            }
        }
    }
    out.truncate(MAX_OUTLINE_BLOCKS);
    out
}

fn finish_link(link: OpenLink<'_>) -> Option<Block> {
    let href = link.href?;
    let text = if link.words.is_empty() {
        href.clone()
    } else {
        link.words.join(" ")
    };
    Some(Block::Link { text, href })
}

fn finish_block(block: OpenBlock<'_>, out: &mut Vec<Block>) {
    let text = block.words.join(" ");
    if !text.is_empty() {
        out.push(match block.kind {
            BlockKind::Heading(level) => Block::Heading { level, text },
            BlockKind::Paragraph => Block::Paragraph(text),
        });
    }
    out.extend(block.links);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_page_is_stripped_and_rewritten() {
        let raw = "<html><head><title>T</title></head><body><script>evil()</script>\
                   <a href='/y'>go</a></body></html>";
        let page = sanitize_document(raw, "https://a.test/page");
        assert_eq!(page.title, "T");
        assert!(!page.html.contains("<script"));
        assert!(!page.html.contains("evil"));
        assert!(page.html.contains(r#"href="https://a.test/y""#));
        assert_eq!(page.scripts_removed, 1);
        assert_eq!(
            page.outline,
            vec![Block::Link {
                text: "go".into(),
                href: "https://a.test/y".into()
            }]
        );
    }

    #[test]
    fn relative_href_resolves_against_page() {
        let page = sanitize_document(r#"<a href="/x">x</a>"#, "https://example.com/a");
        assert!(page.html.contains(r#"href="https://example.com/x""#));
    }

    #[test]
    fn title_falls_back_to_url() {
        let page = sanitize_document("<p>no title here</p>", "https://example.com/a");
        assert_eq!(page.title, "https://example.com/a");
        let page = sanitize_document("<title>   </title><p>x</p>", "https://example.com/b");
        assert_eq!(page.title, "https://example.com/b");
    }

    #[test]
    fn title_text_stays_out_of_the_pane() {
        let page = sanitize_document(
            "<title>Secret Title</title><p>body</p>",
            "https://example.com/",
        );
        assert_eq!(page.title, "Secret Title");
        assert!(!page.html.contains("Secret Title"));
    }

    #[test]
    fn anchors_open_in_new_context() {
        let page = sanitize_document(
            r#"<a href="b.html" target="_self" rel="opener">b</a>"#,
            "https://example.com/dir/a.html",
        );
        assert!(page.html.contains(r#"href="https://example.com/dir/b.html""#));
        assert!(page.html.contains(r#"target="_blank""#));
        assert!(page.html.contains(r#"rel="noopener noreferrer""#));
        assert!(!page.html.contains("_self"));
        assert!(!page.html.contains(r#"rel="opener""#));
    }

    #[test]
    fn event_handlers_and_javascript_urls_are_dropped() {
        let page = sanitize_document(
            r#"<img src="p.png" onerror="steal()"><a href="javascript:steal()">x</a>"#,
            "https://example.com/",
        );
        assert!(!page.html.contains("onerror"));
        assert!(!page.html.contains("javascript:"));
        assert!(page.html.contains(r#"src="https://example.com/p.png""#));
    }

    #[test]
    fn encoded_markup_in_svg_style_stays_inert() {
        let page = sanitize_document(
            "<svg><style>&lt;/style&gt;&lt;img src=x onerror=alert(1)&gt;</style></svg><p>ok</p>",
            "https://example.com/",
        );
        assert!(!page.html.contains("onerror"));
        assert!(!page.html.contains("<img"));
        assert!(!page.html.contains("<svg"));
        assert!(page.html.ends_with("<p>ok</p>"));
    }

    #[test]
    fn svg_animation_cannot_inject_javascript_href() {
        let page = sanitize_document(
            concat!(
                r#"<svg><a><animate attributeName="href" values="javascript:alert(1)"/>"#,
                r#"<set attributeName="href" to="javascript:alert(2)"/><text>x</text></a></svg>"#,
            ),
            "https://example.com/",
        );
        assert!(!page.html.contains("javascript:"));
        assert!(!page.html.contains("<animate"));
        assert!(!page.html.contains("<set"));
    }

    #[test]
    fn resources_are_absolute_and_srcset_is_dropped() {
        let page = sanitize_document(
            r#"<img src="img/a.png" srcset="a-1x.png 1x, /a-2x.png 2x">"#,
            "https://cdn.test/gallery/",
        );
        assert!(page.html.contains(r#"src="https://cdn.test/gallery/img/a.png""#));
        assert!(!page.html.contains("srcset"));
    }

    #[test]
    fn base_href_overrides_page_url() {
        let page = sanitize_document(
            r#"<head><base href="https://mirror.test/root/"></head><a href="x">x</a>"#,
            "https://example.com/a",
        );
        assert!(page.html.contains(r#"href="https://mirror.test/root/x""#));
        assert!(!page.html.contains("<base"));
    }

    #[test]
    fn viewport_and_stylesheet_come_first() {
        let page = sanitize_document("<p>hi</p>", "https://example.com/");
        assert!(page.html.starts_with(VIEWPORT_META));
        assert!(page.html[VIEWPORT_META.len()..].starts_with(FIT_STYLESHEET));
        assert!(page.html.ends_with("<p>hi</p>"));
    }

    #[test]
    fn frames_and_plugins_are_removed() {
        let page = sanitize_document(
            concat!(
                r#"<iframe src="/embed" srcdoc="<script>x()</script>"></iframe>"#,
                r#"<object data="/x.swf"></object><p>after</p>"#,
            ),
            "https://example.com/",
        );
        assert!(!page.html.contains("<iframe"));
        assert!(!page.html.contains("srcdoc"));
        assert!(!page.html.contains("<object"));
        assert!(page.html.contains("<p>after</p>"));
    }

    #[test]
    fn malformed_markup_degrades_gracefully() {
        let page = sanitize_document(
            "<div><p>unclosed <b>bold <a href=/z>link</div><script>",
            "https://example.com/",
        );
        assert!(page.html.contains("unclosed"));
        assert!(page.html.contains(r#"href="https://example.com/z""#));
        assert!(!page.html.contains("<script"));
    }

    #[test]
    fn deeply_nested_markup_does_not_exhaust_the_stack() {
        let depth = 100_000;
        let raw = format!(
            "{}<a href='/deep'>x</a>{}",
            "<span>".repeat(depth),
            "</span>".repeat(depth)
        );
        let page = sanitize_document(&raw, "https://example.com/");
        assert!(page.html.contains(r#"href="https://example.com/deep""#));
        assert_eq!(
            page.outline,
            vec![Block::Link {
                text: "x".into(),
                href: "https://example.com/deep".into()
            }]
        );
    }

    #[test]
    fn text_is_escaped() {
        let page = sanitize_document("<p>1 &lt; 2 &amp; &quot;q&quot;</p>", "https://example.com/");
        assert!(page.html.contains("<p>1 &lt; 2 &amp; \"q\"</p>"));
    }

    #[test]
    fn outline_collects_headings_paragraphs_links() {
        let page = sanitize_document(
            "<h2>News</h2><p>Read <a href='/more'>more</a> today</p><script>hidden()</script>",
            "https://example.com/",
        );
        assert_eq!(
            page.outline,
            vec![
                Block::Heading {
                    level: 2,
                    text: "News".into()
                },
                Block::Paragraph("Read more today".into()),
                Block::Link {
                    text: "more".into(),
                    href: "https://example.com/more".into()
                },
            ]
        );
    }

    #[test]
    fn outline_skips_heading_links_and_hidden_text() {
        let page = sanitize_document(
            "<h1><a href='/self'>Top</a></h1><div><style>p{}</style><a href='/bare'></a></div>",
            "https://example.com/",
        );
        assert_eq!(
            page.outline,
            vec![
                Block::Heading {
                    level: 1,
                    text: "Top".into()
                },
                Block::Link {
                    text: "https://example.com/bare".into(),
                    href: "https://example.com/bare".into()
                },
            ]
        );
    }
}
