//! Confluence storage format to Markdown conversion.
//!
//! Storage format is XHTML with `ac:` (macro) and `ri:` (resource)
//! elements. Those are rewritten into plain HTML first, then the result is
//! handed to `html2md`.

use std::sync::LazyLock;

use cfmd_export::Converter;
use regex::{Captures, Regex};

const MACRO_OPEN: &str = "<ac:structured-macro";
const MACRO_CLOSE: &str = "</ac:structured-macro>";

/// Body-less macros such as `toc` or `anchor`.
static EMPTY_MACRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<ac:structured-macro\b[^>]*/>").expect("invalid empty macro regex")
});

static MACRO_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bac:name="([^"]*)""#).expect("invalid macro name regex")
});

static LANGUAGE_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<ac:parameter\b[^>]*\bac:name="language"[^>]*>([^<]*)</ac:parameter>"#)
        .expect("invalid language regex")
});

static TITLE_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<ac:parameter\b[^>]*\bac:name="title"[^>]*>([^<]*)</ac:parameter>"#)
        .expect("invalid title regex")
});

static PLAIN_TEXT_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ac:plain-text-body>\s*<!\[CDATA\[(.*?)\]\]>\s*</ac:plain-text-body>")
        .expect("invalid plain text body regex")
});

static RICH_TEXT_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ac:rich-text-body>(.*)</ac:rich-text-body>")
        .expect("invalid rich text body regex")
});

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ac:link(?:\s[^>]*)?>(.*?)</ac:link>").expect("invalid link regex")
});

static LINK_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<ac:plain-text-link-body>\s*<!\[CDATA\[(.*?)\]\]>\s*</ac:plain-text-link-body>|<ac:link-body>(.*?)</ac:link-body>",
    )
    .expect("invalid link body regex")
});

static CONTENT_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bri:content-title="([^"]*)""#).expect("invalid content title regex")
});

static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ac:image\b[^>]*?(?:/>|>.*?</ac:image>)").expect("invalid image regex")
});

static IMAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:ac:alt|ri:filename)="([^"]*)""#).expect("invalid image name regex")
});

/// Elements whose content is metadata, never page text.
static HIDDEN_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<ac:(?:parameter|task-id|task-status|placeholder)\b[^>]*>.*?</ac:(?:parameter|task-id|task-status|placeholder)>",
    )
    .expect("invalid hidden element regex")
});

static TASK_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)ac:task-list>").expect("invalid task list regex"));

static TASK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)ac:task>").expect("invalid task regex"));

static CDATA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("invalid CDATA regex"));

/// Any remaining `ac:`/`ri:` tag; the text between tags is kept.
static NAMESPACED_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?(?:ac|ri):[^>]*>").expect("invalid tag regex"));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("invalid blank lines regex"));

/// Converts Confluence storage format to Markdown.
///
/// Conversion never fails: unknown macros are reduced to their text and
/// malformed markup is passed through to `html2md` as is.
#[derive(Debug, Default, Clone, Copy)]
pub struct StorageConverter;

impl Converter for StorageConverter {
    fn to_markdown(&self, html: &str) -> String {
        let html = preprocess(html);
        let markdown = html2md::parse_html(&html);
        let markdown = BLANK_LINES.replace_all(markdown.trim(), "\n\n");
        if markdown.is_empty() {
            String::new()
        } else {
            format!("{markdown}\n")
        }
    }
}

/// Rewrite storage-format elements into plain HTML.
pub(crate) fn preprocess(html: &str) -> String {
    let html = EMPTY_MACRO.replace_all(html, "");
    let html = rewrite_macros(&html);
    let html = LINK.replace_all(&html, |caps: &Captures| link_text(&caps[0], &caps[1]));
    let html = IMAGE.replace_all(&html, |caps: &Captures| image_placeholder(&caps[0]));
    let html = HIDDEN_ELEMENT.replace_all(&html, "");
    let html = TASK_LIST.replace_all(&html, "<${1}ul>");
    let html = TASK.replace_all(&html, "<${1}li>");
    let html = CDATA.replace_all(&html, |caps: &Captures| escape_html(&caps[1]));
    NAMESPACED_TAG.replace_all(&html, "").into_owned()
}

/// Replace structured macros innermost first, so an outer macro only ever
/// sees the already rewritten output of the macros it contains.
fn rewrite_macros(html: &str) -> String {
    let mut html = html.to_owned();
    while let Some(close) = html.find(MACRO_CLOSE) {
        let end = close + MACRO_CLOSE.len();
        // The first closing tag belongs to the nearest opening tag before it.
        let (start, replacement) = match html[..close].rfind(MACRO_OPEN) {
            Some(open) => (open, rewrite_macro(&html[open..close])),
            None => (close, String::new()),
        };
        html.replace_range(start..end, &replacement);
    }
    html
}

/// Rewrite one macro given its opening tag and content.
fn rewrite_macro(element: &str) -> String {
    let (tag, inner) = element
        .find('>')
        .map_or((element, ""), |i| (&element[..=i], &element[i + 1..]));
    let name = MACRO_NAME
        .captures(tag)
        .map_or("", |c| c.get(1).map_or("", |m| m.as_str()));

    match name {
        "code" | "noformat" => code_block(inner),
        "info" | "note" | "warning" | "tip" | "panel" => panel(name, inner),
        "status" => TITLE_PARAM
            .captures(inner)
            .map(|c| c[1].trim().to_owned())
            .unwrap_or_default(),
        _ => macro_body(inner),
    }
}

/// Text content of an unknown macro.
fn macro_body(inner: &str) -> String {
    if let Some(body) = RICH_TEXT_BODY.captures(inner).and_then(|c| c.get(1)) {
        return body.as_str().to_owned();
    }
    PLAIN_TEXT_BODY
        .captures(inner)
        .and_then(|c| c.get(1))
        .map(|m| format!("<pre>{}</pre>", escape_html(m.as_str())))
        .unwrap_or_default()
}

fn code_block(inner: &str) -> String {
    let code = PLAIN_TEXT_BODY
        .captures(inner)
        .map_or("", |c| c.get(1).map_or("", |m| m.as_str()));
    let class = LANGUAGE_PARAM
        .captures(inner)
        .map(|c| format!(r#" class="language-{}""#, c[1].trim()))
        .unwrap_or_default();
    format!("<pre><code{class}>{}</code></pre>", escape_html(code))
}

fn panel(kind: &str, inner: &str) -> String {
    let label = TITLE_PARAM
        .captures(inner)
        .map(|c| c[1].trim().to_owned())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| capitalize(kind));
    let body = RICH_TEXT_BODY
        .captures(inner)
        .map_or("", |c| c.get(1).map_or("", |m| m.as_str()));
    format!(
        "<blockquote><p><strong>{}:</strong></p>{body}</blockquote>",
        escape_html(&label)
    )
}

fn link_text(whole: &str, inner: &str) -> String {
    if let Some(caps) = LINK_BODY.captures(inner) {
        if let Some(text) = caps.get(1) {
            return escape_html(text.as_str());
        }
        if let Some(body) = caps.get(2) {
            return body.as_str().to_owned();
        }
    }
    CONTENT_TITLE
        .captures(whole)
        .map(|c| escape_html(&c[1]))
        .unwrap_or_default()
}

fn image_placeholder(element: &str) -> String {
    IMAGE_NAME
        .captures(element)
        .map(|c| format!("<em>image: {}</em>", escape_html(&c[1])))
        .unwrap_or_default()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
