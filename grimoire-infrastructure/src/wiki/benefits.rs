// Heuristic feat benefit mining.
//
// Every section is best effort: a phrase that does not match leaves the
// section empty, it never fails the page.

use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use grimoire_domain::{
    Ability, AbilityScoreIncrease, AdvantageGrants, BenefitCapability, BenefitExtractor, Bonuses,
    ExpertiseGrant, FeatBenefits, FightingStyleGrant, HpBonus, MovementGrants, MovementSpeed,
    ProficiencyGrants, Resistances, ResourceClause, SenseType, SpellChoice, SpellGrant,
    WeaponMasteryGrant,
};

const NOT_SPELL_NAMES: [&str; 6] = ["Ability Score Increase", "Fey Magic", "Each", "Either", "That", "These"];

const NUMBER_WORDS: [&str; 10] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

const EQUAL_TO_WALKING: &str = "walking speed";

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

struct BenefitPatterns {
    asi_fixed: Regex,
    asi_choice: Regex,
    proficiency: Regex,
    of_your_choice: Regex,
    list_separator: Regex,
    spell_learn: Regex,
    spell_cast: Regex,
    spell_choice: Regex,
    school_separator: Regex,
    spell_name: Regex,
    hp_per_level: Regex,
    hp_again: Regex,
    hp_flat: Regex,
    speed: Regex,
    ac: Regex,
    attack: Regex,
    damage: Regex,
    initiative: Regex,
    fighting_style: Regex,
    fighting_style_choice: Regex,
    fighting_style_list: Regex,
    expertise: Regex,
    advantage: Regex,
    condition: Regex,
    resistance: Regex,
    senses: Vec<(SenseType, Regex)>,
    climb: Regex,
    swim: Regex,
    fly: Regex,
    weapon_mastery: Regex,
    weapon_mastery_choice: Regex,
    resource_uses: Regex,
    resource_recharge: Regex,
}

fn patterns() -> &'static BenefitPatterns {
    static PATTERNS: OnceLock<BenefitPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| BenefitPatterns {
        asi_fixed: re(r"(?i)increase your ([A-Za-z ,or]+?) score by (\d)"),
        asi_choice: re(r"(?i)increase one ability score of your choice by (\d)"),
        proficiency: re(r"(?i)gain proficiency (?:with|in) ([^.\n]+)"),
        of_your_choice: re(r"(?i)\bof your choice\b"),
        list_separator: re(r"(?i),|\band\b|\bor\b"),
        spell_learn: re(r"(?i)learn the ([A-Z][A-Za-z'\- ]+?) spell"),
        spell_cast: re(r"(?i)cast ([A-Z][A-Za-z'\- ]+?) spell"),
        spell_choice: re(r"(?i)choose (\w+) level (\d+) spell from the ([A-Za-z\s]+?) school"),
        school_separator: re(r"(?i)\bor\b|,"),
        spell_name: re(r"^[A-Za-z'\- ]+$"),
        hp_per_level: re(r"(?i)hit point maximum (?:increases|increase) by (\d+) for each level"),
        hp_again: re(r"(?i)hit point maximum (?:increases|increase) by (\d+)[^.\n]*again whenever you gain a level"),
        hp_flat: re(r"(?i)hit point maximum (?:increases|increase) by (\d+)"),
        speed: re(r"(?i)speed (?:increases|increase) by (\d+)"),
        ac: re(r"(?i)\+?(\d+) bonus to AC|AC increases by (\d+)"),
        attack: re(r"(?i)\+?(\d+) bonus to (?:attack|attack rolls)"),
        damage: re(r"(?i)\+?(\d+) bonus to (?:damage|damage rolls)"),
        initiative: re(r"(?i)bonus to initiative (?:rolls )?equal to (\d+)"),
        fighting_style: re(r"(?i)fighting style"),
        fighting_style_choice: re(r"(?i)fighting style of your choice"),
        fighting_style_list: re(r"(?i)following fighting styles?: ([^.\n]+)"),
        expertise: re(r"(?i)expertise in ([^.\n]+)"),
        advantage: re(r"(?i)advantage on ([^.\n]+)"),
        condition: re(r"(?i)condition|charmed|frightened|poisoned|paralyzed|stunned"),
        resistance: re(r"(?i)resistance to ([a-z\s]+?) damage"),
        senses: SenseType::ALL
            .into_iter()
            .map(|sense| (sense, re(&format!(r"(?i){} (?:out to|of)?\s*(\d+)", sense.as_str()))))
            .collect(),
        climb: re(r"(?i)climbing speed (?:of|equal to)?\s*(\d+)?"),
        swim: re(r"(?i)swimming speed (?:of|equal to)?\s*(\d+)?"),
        fly: re(r"(?i)flying speed (?:of|equal to)?\s*(\d+)?"),
        weapon_mastery: re(r"(?i)weapon mastery"),
        weapon_mastery_choice: re(r"(?i)choose (\w+) weapon mastery"),
        resource_uses: re(r"(?i)number of times equal to ([^.\n]+)"),
        resource_recharge: re(r"(?i)regain all expended uses when you finish a ([^.\n]+)"),
    })
}

/// Digits or a spelled-out number from one to ten.
fn parse_count(word: &str) -> Option<u32> {
    let lower = word.trim().to_lowercase();
    lower.parse().ok().or_else(|| {
        NUMBER_WORDS
            .iter()
            .position(|number| *number == lower)
            .map(|index| index as u32 + 1)
    })
}

fn first_number(regex: &Regex, text: &str) -> Option<i64> {
    regex
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|value| value.as_str().parse().ok())
}

/// Splits a prose list on commas, "and" and "or", dropping the keyword words.
fn extract_list(payload: &str, keywords: &[&str]) -> Vec<String> {
    let patterns = patterns();
    let lower = payload.to_lowercase();
    let cleaned = patterns.of_your_choice.replace_all(&lower, "");
    patterns
        .list_separator
        .split(&cleaned)
        .map(|part| {
            part.split_whitespace()
                .filter(|word| !keywords.contains(word))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|part| !part.is_empty())
        .collect()
}

pub fn is_likely_spell_name(name: &str) -> bool {
    let cleaned = name.trim();
    cleaned.chars().count() >= 3
        && !NOT_SPELL_NAMES.contains(&cleaned)
        && cleaned.chars().any(|c| c.is_ascii_uppercase())
        && patterns().spell_name.is_match(cleaned)
}

fn ability_score_increase(text: &str) -> Option<AbilityScoreIncrease> {
    let patterns = patterns();
    if let Some(captures) = patterns.asi_fixed.captures(text) {
        let amount = captures.get(2).and_then(|value| value.as_str().parse().ok()).unwrap_or(1);
        let raw = captures.get(1).map(|value| value.as_str()).unwrap_or("");
        let mut abilities: Vec<Ability> = patterns
            .list_separator
            .split(raw)
            .flat_map(|part| part.split_whitespace())
            .filter(|word| !word.eq_ignore_ascii_case("score"))
            .filter_map(Ability::from_label)
            .collect();
        abilities.dedup();
        match abilities.len() {
            0 => {}
            1 => {
                return Some(AbilityScoreIncrease::Fixed {
                    fixed: abilities[0],
                    amount,
                })
            }
            _ => {
                return Some(AbilityScoreIncrease::Choice {
                    choice: abilities,
                    amount,
                })
            }
        }
    }

    let amount = first_number(&patterns.asi_choice, text)?;
    Some(AbilityScoreIncrease::Choice {
        choice: Ability::ALL.to_vec(),
        amount: u8::try_from(amount).unwrap_or(1),
    })
}

fn proficiencies(text: &str) -> Option<ProficiencyGrants> {
    let payload = patterns().proficiency.captures(text)?.get(1)?.as_str().trim().to_string();
    let lower = payload.to_lowercase();
    let mut grants = ProficiencyGrants::default();
    if lower.contains("skill") {
        grants.skills = extract_list(&payload, &["skill", "skills"]);
    } else if lower.contains("tool") {
        grants.tools = extract_list(&payload, &["tool", "tools"]);
    } else if lower.contains("weapon") {
        grants.weapons = extract_list(&payload, &["weapon", "weapons"]);
    } else if lower.contains("armor") {
        grants.armor = extract_list(&payload, &["armor"]);
    } else if lower.contains("language") {
        grants.languages = extract_list(&payload, &["language", "languages"]);
    } else {
        grants.other = vec![payload];
    }
    Some(grants)
}

fn spell_grants(text: &str, linked_spells: &[String]) -> Vec<SpellGrant> {
    let patterns = patterns();
    let mut seen = HashSet::new();
    let mut grants = Vec::new();
    let mut push_named = |name: &str| {
        let name = name.trim();
        let name = name
            .strip_prefix("the ")
            .or_else(|| name.strip_prefix("The "))
            .unwrap_or(name)
            .trim();
        if is_likely_spell_name(name) && seen.insert(name.to_string()) {
            grants.push(SpellGrant::Named { name: name.to_string() });
        }
    };

    for name in linked_spells {
        push_named(name);
    }
    for regex in [&patterns.spell_learn, &patterns.spell_cast] {
        for captures in regex.captures_iter(text) {
            if let Some(name) = captures.get(1) {
                push_named(name.as_str());
            }
        }
    }

    if let Some(captures) = patterns.spell_choice.captures(text) {
        let count = captures.get(1).and_then(|value| parse_count(value.as_str())).unwrap_or(1);
        let level = captures.get(2).and_then(|value| value.as_str().parse().ok());
        let schools = captures
            .get(3)
            .map(|value| {
                patterns
                    .school_separator
                    .split(value.as_str())
                    .map(|school| school.trim().to_lowercase())
                    .filter(|school| !school.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if let Some(level) = level {
            grants.push(SpellGrant::Choice {
                choice: SpellChoice { count, level, schools },
            });
        }
    }
    grants
}

fn bonuses(text: &str) -> Option<Bonuses> {
    let patterns = patterns();
    let hp = if let Some(per_level) = first_number(&patterns.hp_per_level, text) {
        Some(HpBonus::Scaling { base: None, per_level })
    } else if let Some(amount) = first_number(&patterns.hp_again, text) {
        Some(HpBonus::Scaling {
            base: Some(amount),
            per_level: amount,
        })
    } else {
        first_number(&patterns.hp_flat, text).map(HpBonus::Flat)
    };

    let ac = patterns.ac.captures(text).and_then(|captures| {
        captures
            .get(1)
            .or_else(|| captures.get(2))
            .and_then(|value| value.as_str().parse().ok())
    });

    let bonuses = Bonuses {
        hp,
        speed: first_number(&patterns.speed, text),
        ac,
        attack: first_number(&patterns.attack, text),
        damage: first_number(&patterns.damage, text),
        initiative: first_number(&patterns.initiative, text),
    };
    (!bonuses.is_empty()).then_some(bonuses)
}

fn fighting_styles(text: &str) -> Option<FightingStyleGrant> {
    let patterns = patterns();
    if !patterns.fighting_style.is_match(text) {
        return None;
    }
    let choice = FightingStyleGrant {
        choice: true,
        options: Vec::new(),
    };
    if patterns.fighting_style_choice.is_match(text) {
        return Some(choice);
    }
    let options = patterns
        .fighting_style_list
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|list| extract_list(list.as_str(), &["fighting", "style", "styles"]))
        .unwrap_or_default();
    if options.is_empty() {
        Some(choice)
    } else {
        Some(FightingStyleGrant { choice: false, options })
    }
}

fn expertise(text: &str) -> Option<ExpertiseGrant> {
    let clause = patterns().expertise.captures(text)?.get(1)?.as_str();
    let skills = extract_list(clause, &["skill", "skills"]);
    if skills.is_empty() {
        Some(ExpertiseGrant {
            skills,
            other: vec![clause.trim().to_string()],
        })
    } else {
        Some(ExpertiseGrant {
            skills,
            other: Vec::new(),
        })
    }
}

fn advantages(text: &str) -> Option<AdvantageGrants> {
    let patterns = patterns();
    let mut grants = AdvantageGrants::default();
    for captures in patterns.advantage.captures_iter(text) {
        let Some(clause) = captures.get(1) else { continue };
        let clause = clause.as_str().trim().to_string();
        let lower = clause.to_lowercase();
        if lower.contains("saving throw") {
            grants.saves.push(clause);
        } else if lower.contains("check") {
            grants.checks.push(clause);
        } else if patterns.condition.is_match(&clause) {
            grants.conditions.push(clause);
        } else {
            grants.other.push(clause);
        }
    }
    (!grants.is_empty()).then_some(grants)
}

fn resistances(text: &str) -> Option<Resistances> {
    let damage_types: Vec<String> = patterns()
        .resistance
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|value| value.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    (!damage_types.is_empty()).then_some(Resistances { damage_types })
}

fn senses(text: &str) -> BTreeMap<SenseType, i64> {
    patterns()
        .senses
        .iter()
        .filter_map(|(sense, regex)| first_number(regex, text).map(|range| (*sense, range)))
        .collect()
}

fn movement_speed(regex: &Regex, text: &str) -> Option<MovementSpeed> {
    let captures = regex.captures(text)?;
    Some(
        match captures.get(1).and_then(|value| value.as_str().parse().ok()) {
            Some(feet) => MovementSpeed::Feet(feet),
            None => MovementSpeed::EqualTo(EQUAL_TO_WALKING.to_string()),
        },
    )
}

fn movement(text: &str) -> Option<MovementGrants> {
    let patterns = patterns();
    let grants = MovementGrants {
        climb: movement_speed(&patterns.climb, text),
        swim: movement_speed(&patterns.swim, text),
        fly: movement_speed(&patterns.fly, text),
    };
    (grants.climb.is_some() || grants.swim.is_some() || grants.fly.is_some()).then_some(grants)
}

fn weapon_mastery(text: &str) -> Option<WeaponMasteryGrant> {
    let patterns = patterns();
    if !patterns.weapon_mastery.is_match(text) {
        return None;
    }
    let choice = patterns
        .weapon_mastery_choice
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|count| parse_count(count.as_str()))
        .unwrap_or(1);
    Some(WeaponMasteryGrant { choice })
}

fn resources(text: &str) -> Vec<ResourceClause> {
    let patterns = patterns();
    let clause = |regex: &Regex| {
        regex
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|value| value.as_str().trim().to_string())
    };
    let mut resources = Vec::new();
    if let Some(uses) = clause(&patterns.resource_uses) {
        resources.push(ResourceClause {
            name: "feat".to_string(),
            uses: Some(uses),
            recharge: None,
        });
    }
    if let Some(recharge) = clause(&patterns.resource_recharge) {
        resources.push(ResourceClause {
            name: "feat".to_string(),
            uses: None,
            recharge: Some(recharge),
        });
    }
    resources
}

/// Regex-driven extractor covering every benefit category.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicBenefitExtractor;

impl BenefitExtractor for HeuristicBenefitExtractor {
    fn capabilities(&self) -> &'static [BenefitCapability] {
        &BenefitCapability::ALL
    }

    fn extract(&self, text: &str, linked_spells: &[String]) -> FeatBenefits {
        let normalized = text.replace('\r', "");
        let normalized = normalized.trim();
        FeatBenefits {
            effects: normalized
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            ability_score_increase: ability_score_increase(normalized),
            proficiencies: proficiencies(normalized),
            spells: spell_grants(normalized, linked_spells),
            bonuses: bonuses(normalized),
            fighting_styles: fighting_styles(normalized),
            expertise: expertise(normalized),
            advantages: advantages(normalized),
            resistances: resistances(normalized),
            senses: senses(normalized),
            movement: movement(normalized),
            weapon_mastery: weapon_mastery(normalized),
            resources: resources(normalized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> FeatBenefits {
        HeuristicBenefitExtractor.extract(text, &[])
    }

    #[test]
    fn ability_increase_fixed_or_choice() {
        assert_eq!(
            extract("Increase your Charisma score by 1, to a maximum of 20.").ability_score_increase,
            Some(AbilityScoreIncrease::Fixed {
                fixed: Ability::Charisma,
                amount: 1
            })
        );
        assert_eq!(
            extract("Increase your Intelligence, Wisdom, or Charisma score by 1.").ability_score_increase,
            Some(AbilityScoreIncrease::Choice {
                choice: vec![Ability::Intelligence, Ability::Wisdom, Ability::Charisma],
                amount: 1
            })
        );
        assert_eq!(
            extract("Increase one ability score of your choice by 2.").ability_score_increase,
            Some(AbilityScoreIncrease::Choice {
                choice: Ability::ALL.to_vec(),
                amount: 2
            })
        );
    }

    #[test]
    fn proficiencies_are_classified_by_keyword() {
        let grants = extract("You gain proficiency in the Stealth and Perception skills.")
            .proficiencies
            .expect("proficiencies");
        assert_eq!(grants.skills, vec!["the stealth", "perception"]);

        let grants = extract("You gain proficiency with heavy armor.").proficiencies.expect("armor");
        assert_eq!(grants.armor, vec!["heavy"]);

        let grants = extract("You gain proficiency with improvised things.")
            .proficiencies
            .expect("other");
        assert_eq!(grants.other, vec!["improvised things"]);
    }

    #[test]
    fn spells_from_links_phrases_and_choices() {
        let benefits = HeuristicBenefitExtractor.extract(
            "You learn the Misty Step spell and one level 1 spell of your choice. \
             You can cast the Hex spell. Choose one level 1 spell from the Divination or Enchantment school.",
            &["Misty Step".to_string(), "Fey Magic".to_string()],
        );
        assert_eq!(
            benefits.spells,
            vec![
                SpellGrant::Named {
                    name: "Misty Step".to_string()
                },
                SpellGrant::Named {
                    name: "Hex".to_string()
                },
                SpellGrant::Choice {
                    choice: SpellChoice {
                        count: 1,
                        level: 1,
                        schools: vec!["divination".to_string(), "enchantment".to_string()],
                    }
                },
            ]
        );
    }

    #[test]
    fn spell_name_heuristic() {
        assert!(is_likely_spell_name("Misty Step"));
        assert!(is_likely_spell_name("Tasha's Hideous Laughter"));
        assert!(!is_likely_spell_name("Fey Magic"));
        assert!(!is_likely_spell_name("Hx"));
        assert!(!is_likely_spell_name("lowercase"));
        assert!(!is_likely_spell_name("Spell 2"));
    }

    #[test]
    fn hit_point_bonus_shapes() {
        let per_level = extract("Your Hit Point maximum increases by 2 for each level you have.");
        assert_eq!(
            per_level.bonuses.and_then(|b| b.hp),
            Some(HpBonus::Scaling {
                base: None,
                per_level: 2
            })
        );
        let again = extract("Your Hit Point maximum increases by 1, and it increases by 1 again whenever you gain a level.");
        assert_eq!(
            again.bonuses.and_then(|b| b.hp),
            Some(HpBonus::Scaling {
                base: Some(1),
                per_level: 1
            })
        );
        let flat = extract("Your hit point maximum increases by 5.");
        assert_eq!(flat.bonuses.and_then(|b| b.hp), Some(HpBonus::Flat(5)));
    }

    #[test]
    fn numeric_bonuses() {
        let bonuses = extract(
            "Your speed increases by 10 feet. You gain a +1 bonus to AC. \
             You have a +2 bonus to attack rolls. You can add a bonus to initiative rolls equal to 3.",
        )
        .bonuses
        .expect("bonuses");
        assert_eq!(bonuses.speed, Some(10));
        assert_eq!(bonuses.ac, Some(1));
        assert_eq!(bonuses.attack, Some(2));
        assert_eq!(bonuses.damage, None);
        assert_eq!(bonuses.initiative, Some(3));
    }

    #[test]
    fn senses_movement_and_resistances() {
        let benefits = extract(
            "You gain Darkvision out to 60 feet and Blindsight of 10 feet. You have a climbing speed equal to your Speed \
             and a swimming speed of 30 feet. You have resistance to fire damage and resistance to cold damage.",
        );
        assert_eq!(benefits.senses.get(&SenseType::Darkvision), Some(&60));
        assert_eq!(benefits.senses.get(&SenseType::Blindsight), Some(&10));
        let movement = benefits.movement.expect("movement");
        assert_eq!(movement.climb, Some(MovementSpeed::EqualTo("walking speed".to_string())));
        assert_eq!(movement.swim, Some(MovementSpeed::Feet(30)));
        assert_eq!(movement.fly, None);
        assert_eq!(
            benefits.resistances.expect("resistances").damage_types,
            vec!["fire", "cold"]
        );
    }

    #[test]
    fn advantages_expertise_styles_mastery_resources() {
        let benefits = extract(
            "You have Advantage on saving throws against being Charmed. You have advantage on Wisdom (Perception) checks.\n\
             You gain Expertise in one skill of your choice.\n\
             You gain a Fighting Style of your choice.\n\
             Choose two weapon mastery properties.\n\
             You can use this a number of times equal to your Proficiency Bonus, and you regain all expended uses when you finish a Long Rest.",
        );
        let advantages = benefits.advantages.expect("advantages");
        assert_eq!(advantages.saves, vec!["saving throws against being Charmed"]);
        assert_eq!(advantages.checks, vec!["Wisdom (Perception) checks"]);
        assert_eq!(benefits.expertise.expect("expertise").skills, vec!["one"]);
        assert!(benefits.fighting_styles.expect("styles").choice);
        assert_eq!(benefits.weapon_mastery, Some(WeaponMasteryGrant { choice: 2 }));
        assert_eq!(benefits.resources.len(), 2);
        assert_eq!(benefits.resources[0].uses.as_deref(), Some("your Proficiency Bonus, and you regain all expended uses when you finish a Long Rest"));
        assert_eq!(benefits.resources[1].recharge.as_deref(), Some("Long Rest"));
        assert_eq!(benefits.effects.len(), 5);
    }

    #[test]
    fn plain_prose_yields_only_effects() {
        let benefits = extract("You are very lucky.\n\nNothing else happens.");
        assert_eq!(benefits.effects, vec!["You are very lucky.", "Nothing else happens."]);
        assert!(benefits.is_structurally_empty());
        assert_eq!(HeuristicBenefitExtractor.capabilities().len(), 13);
    }
}
