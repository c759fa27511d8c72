use serde_json::Value;

use super::export::{array, at, i64_at, nonzero_i64_at, str_at};
use crate::entities::{CharacterFeature, FeatureSource, ResetCadence};
use crate::utils::strip_html;

fn feature_from(entry: &Value, source: FeatureSource) -> Option<CharacterFeature> {
    let definition = at(entry, &["definition"])?;
    Some(CharacterFeature {
        name: str_at(definition, &["name"]).unwrap_or("Unnamed Feature").to_string(),
        source,
        description: strip_html(str_at(definition, &["description"]).unwrap_or("")),
        max_uses: nonzero_i64_at(entry, &["limitedUse", "maxUses"]),
        reset_on: i64_at(entry, &["limitedUse", "resetType"]).and_then(ResetCadence::from_export_id),
    })
}

/// Species traits, then features unlocked at each class's current level, then the background feature.
pub(super) fn extract_features(root: &Value) -> Vec<CharacterFeature> {
    let mut features: Vec<CharacterFeature> = array(root, &["race", "racialTraits"])
        .iter()
        .filter_map(|trait_entry| feature_from(trait_entry, FeatureSource::Species))
        .collect();

    for class in array(root, &["classes"]) {
        let class_level = i64_at(class, &["level"]).unwrap_or(0);
        for entry in array(class, &["classFeatures"]) {
            let unlocked = i64_at(entry, &["definition", "requiredLevel"])
                .map(|required| required <= class_level)
                .unwrap_or(true);
            if !unlocked {
                continue;
            }
            if let Some(feature) = feature_from(entry, FeatureSource::Class) {
                features.push(feature);
            }
        }
    }

    if let Some(name) = str_at(root, &["background", "definition", "featureName"]) {
        features.push(CharacterFeature {
            name: name.to_string(),
            source: FeatureSource::Background,
            description: strip_html(
                str_at(root, &["background", "definition", "featureDescription"]).unwrap_or(""),
            ),
            max_uses: None,
            reset_on: None,
        });
    }
    features
}
