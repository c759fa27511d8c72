// Wiki page -> title, plain text and spell links

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

use super::parsers::ParseError;

const BLOCK_ELEMENTS: [&str; 22] = [
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "table", "tr", "tbody",
    "thead", "blockquote", "pre", "hr", "dl", "dt", "dd",
];

const TITLE_SUFFIX: &str = " - D&D 2024";

fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|err| ParseError::Selector(format!("{css}: {err:?}")))
}

fn spell_href() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)/(spell:|spell/)").expect("valid regex"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiPage {
    pub title: Option<String>,
    /// Content rendered with one line per block element.
    pub text: String,
    /// Text of `#page-content` links that point at spell pages.
    pub linked_spells: Vec<String>,
}

fn render(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    let block = BLOCK_ELEMENTS.contains(&name);
    if block && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if !matches!(child_element.value().name(), "script" | "style") {
                render(child_element, out);
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
    if block && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Trims each line and keeps at most one blank line between paragraphs.
fn normalize(raw: &str) -> String {
    let cleaned = raw.replace('\r', "");
    let mut lines: Vec<&str> = Vec::new();
    for line in cleaned.split('\n').map(str::trim) {
        if line.is_empty() && lines.last().map(|last| last.is_empty()).unwrap_or(true) {
            continue;
        }
        lines.push(line);
    }
    lines.join("\n").trim().to_string()
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn strip_site_suffix(title: &str) -> String {
    let without_edition = title.replace(TITLE_SUFFIX, "");
    match without_edition.rsplit_once(" - ") {
        Some((page, _site)) => page.trim().to_string(),
        None => without_edition.trim().to_string(),
    }
}

pub fn parse_page(html: &str) -> Result<WikiPage, ParseError> {
    let document = Html::parse_document(html);

    let heading = [".page-title", "h1"]
        .iter()
        .map(|css| selector(css))
        .collect::<Result<Vec<_>, _>>()?
        .iter()
        .find_map(|sel| document.select(sel).next())
        .map(text_of)
        .filter(|title| !title.is_empty());
    let title = match heading {
        Some(title) => Some(title),
        None => document
            .select(&selector("title")?)
            .next()
            .map(|element| strip_site_suffix(&text_of(element)))
            .filter(|title| !title.is_empty()),
    };

    let content = document
        .select(&selector("#page-content")?)
        .next()
        .or_else(|| document.select(&selector("body").ok()?).next())
        .ok_or(ParseError::MissingContent)?;

    let mut raw = String::new();
    render(content, &mut raw);

    let linked_spells = document
        .select(&selector("#page-content a[href]")?)
        .filter(|link| {
            link.value()
                .attr("href")
                .map(|href| spell_href().is_match(href))
                .unwrap_or(false)
        })
        .map(text_of)
        .collect();

    Ok(WikiPage {
        title,
        text: normalize(&raw),
        linked_spells,
    })
}
