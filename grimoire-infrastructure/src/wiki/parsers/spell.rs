use regex::Regex;
use std::sync::OnceLock;

use grimoire_domain::{RecordError, ReferenceKind, SpellRecord};

use super::{clamp_name, ParseError};
use crate::wiki::page::WikiPage;

const SCHOOLS: [&str; 8] = [
    "Abjuration",
    "Conjuration",
    "Divination",
    "Enchantment",
    "Evocation",
    "Illusion",
    "Necromancy",
    "Transmutation",
];

const HIGHER_LEVEL_MARKERS: [&str; 2] = ["At Higher Levels", "Using a Higher-Level Spell Slot"];

struct SpellPatterns {
    leading_level: Regex,
    labelled_level: Regex,
    school: Regex,
    casting_time: Regex,
    range: Regex,
    components: Regex,
    duration: Regex,
    at_higher_levels: Regex,
    higher_level_slot: Regex,
    higher_levels_end: Regex,
}

fn patterns() -> &'static SpellPatterns {
    static PATTERNS: OnceLock<SpellPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| SpellPatterns {
        leading_level: Regex::new(r"(?i)(?:^|\n)\s*(Cantrip|\d+)(?:st|nd|rd|th)?(?:-?level)?").expect("valid regex"),
        labelled_level: Regex::new(r"(?i)\bLevel\s*(\d+)\b").expect("valid regex"),
        school: Regex::new(&format!("(?i)({})", SCHOOLS.join("|"))).expect("valid regex"),
        casting_time: Regex::new(r"(?i)Casting Time:\s*([^\n]+)").expect("valid regex"),
        range: Regex::new(r"(?i)Range:\s*([^\n]+)").expect("valid regex"),
        components: Regex::new(r"(?i)Components?:\s*([^\n]+)").expect("valid regex"),
        duration: Regex::new(r"(?i)Duration:\s*([^\n]+)").expect("valid regex"),
        at_higher_levels: Regex::new(r"(?i)At Higher Levels[:\s]*").expect("valid regex"),
        higher_level_slot: Regex::new(r"(?i)Using a Higher-Level Spell Slot\.?\s*").expect("valid regex"),
        higher_levels_end: Regex::new(r"(?i)\n\n|\*\*|Available").expect("valid regex"),
    })
}

fn labelled(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// "Cantrip" -> 0, "3rd-level" -> 3, "Level 3" -> 3, otherwise 0.
fn spell_level(text: &str) -> i64 {
    let patterns = patterns();
    let level_text = patterns
        .leading_level
        .captures(text)
        .or_else(|| patterns.labelled_level.captures(text))
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str().to_string());
    match level_text {
        Some(value) if value.eq_ignore_ascii_case("cantrip") => 0,
        Some(value) => value.parse().unwrap_or(0),
        None => 0,
    }
}

fn school(text: &str) -> Option<String> {
    let found = patterns().school.captures(text)?.get(1)?.as_str().to_lowercase();
    SCHOOLS
        .iter()
        .find(|school| school.to_lowercase() == found)
        .map(|school| school.to_string())
}

/// Text between the Duration line and the first higher-level marker.
fn description(text: &str) -> String {
    let Some(duration_at) = text.find("Duration:") else {
        return String::new();
    };
    let after_duration = &text[duration_at..];
    let Some(line_end) = after_duration.find('\n') else {
        return String::new();
    };
    let start = line_end + 1;
    let end = HIGHER_LEVEL_MARKERS
        .iter()
        .filter_map(|marker| after_duration.find(marker))
        .filter(|index| *index > 0)
        .min()
        .unwrap_or(after_duration.len());
    if end <= start {
        return String::new();
    }
    after_duration[start..end].trim().to_string()
}

fn higher_levels(text: &str) -> Option<String> {
    let patterns = patterns();
    let marker = patterns
        .at_higher_levels
        .find(text)
        .or_else(|| patterns.higher_level_slot.find(text))?;
    let rest = &text[marker.end()..];
    // at least one character belongs to the clause before a terminator can match
    let first_len = rest.chars().next().map(char::len_utf8).unwrap_or(0);
    let end = patterns
        .higher_levels_end
        .find_at(rest, first_len)
        .map(|terminator| terminator.start())
        .unwrap_or(rest.len());
    let clause = rest[..end].trim();
    (!clause.is_empty()).then(|| clause.to_string())
}

pub fn parse_spell(page: &WikiPage) -> Result<SpellRecord, ParseError> {
    let title = page.title.as_deref().ok_or(ParseError::MissingName("spell"))?;
    let text = page.text.as_str();
    let patterns = patterns();

    let description = description(text);
    if description.is_empty() {
        return Err(RecordError::MissingDescription {
            kind: ReferenceKind::Spell,
            name: title.to_string(),
        }
        .into());
    }
    let level = spell_level(text);
    let level = u8::try_from(level)
        .ok()
        .filter(|level| *level <= 9)
        .ok_or_else(|| RecordError::LevelOutOfRange {
            name: title.to_string(),
            level,
        })?;

    Ok(SpellRecord {
        name: clamp_name(title),
        level,
        school: school(text),
        casting_time: labelled(&patterns.casting_time, text),
        range: labelled(&patterns.range, text),
        components: labelled(&patterns.components, text),
        duration: labelled(&patterns.duration, text),
        description,
        higher_levels: higher_levels(text),
    })
}
