use regex::Regex;
use std::sync::OnceLock;

use grimoire_domain::{BenefitExtractor, FeatRecord};

use super::clamp_name;
use crate::wiki::page::WikiPage;

fn prerequisite() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Prerequisites?:\s*([^\n]+)").expect("valid regex"))
}

pub fn parse_feat(page: &WikiPage, requested_name: &str, extractor: &dyn BenefitExtractor) -> FeatRecord {
    let text = page.text.as_str();
    let (prerequisites, description) = match prerequisite().captures(text) {
        Some(captures) => {
            let whole = captures.get(0).map(|found| found.end()).unwrap_or(0);
            let value = captures.get(1).map(|found| found.as_str().trim().to_string());
            (value, text[whole..].trim().to_string())
        }
        None => (None, text.trim().to_string()),
    };
    let benefits = (!description.is_empty()).then(|| extractor.extract(&description, &page.linked_spells));

    FeatRecord {
        name: clamp_name(page.title.as_deref().unwrap_or(requested_name)),
        prerequisites,
        description,
        benefits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiki::benefits::HeuristicBenefitExtractor;
    use grimoire_domain::SpellGrant;

    #[test]
    fn splits_prerequisites_from_benefits() {
        let page = WikiPage {
            title: Some("Fey Touched".to_string()),
            text: "Origin feat\nPrerequisite: Level 4+\nFey Magic. You learn the Misty Step spell.".to_string(),
            linked_spells: vec!["Misty Step".to_string()],
        };
        let feat = parse_feat(&page, "fey touched", &HeuristicBenefitExtractor);
        assert_eq!(feat.prerequisites.as_deref(), Some("Level 4+"));
        assert_eq!(feat.description, "Fey Magic. You learn the Misty Step spell.");
        let benefits = feat.benefits.expect("benefits");
        assert_eq!(
            benefits.spells,
            vec![SpellGrant::Named {
                name: "Misty Step".to_string()
            }]
        );
    }

    #[test]
    fn without_prerequisites_everything_is_description() {
        let page = WikiPage {
            title: None,
            text: "You gain proficiency in the Stealth skill.".to_string(),
            linked_spells: Vec::new(),
        };
        let feat = parse_feat(&page, "Skulker", &HeuristicBenefitExtractor);
        assert_eq!(feat.name, "Skulker");
        assert_eq!(feat.prerequisites, None);
        assert_eq!(feat.description, "You gain proficiency in the Stealth skill.");
    }
}
