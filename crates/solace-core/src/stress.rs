// Stress-signal detection
//
// A keyword heuristic over a single incoming message. On a match the
// pipeline skips both model stages for that cycle and offers a calming
// activity instead of a generated reply. Pure apart from the activity
// pick, which uses a caller-supplied RNG so tests can seed it.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Keywords that trigger the stress short-circuit, in priority order.
/// Matching is case-insensitive substring containment; the first entry
/// found in the message is reported as the trigger.
pub const STRESS_KEYWORDS: [&str; 10] = [
    "stress",
    "anxiety",
    "worried",
    "panic",
    "overwhelmed",
    "nervous",
    "tense",
    "pressure",
    "can't cope",
    "exhausted",
];

/// Kind of calming activity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Breathing,
    Garden,
    Forest,
    Waves,
}

/// One entry of the calming-activity catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CalmingActivity {
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
}

/// Result of a stress match. Ephemeral: returned to the caller for the
/// current cycle, never persisted in the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StressPrompt {
    pub trigger: String,
    pub activity: CalmingActivity,
}

/// The fixed catalog of calming activities offered on a stress match
pub fn activity_catalog() -> [CalmingActivity; 4] {
    [
        CalmingActivity {
            kind: ActivityKind::Breathing,
            title: "Breathing Exercise".to_string(),
            description: "Follow calming breathing exercises with visual guidance".to_string(),
        },
        CalmingActivity {
            kind: ActivityKind::Garden,
            title: "Zen Garden".to_string(),
            description: "Create and maintain your digital peaceful space".to_string(),
        },
        CalmingActivity {
            kind: ActivityKind::Forest,
            title: "Mindful Forest".to_string(),
            description: "Take a peaceful walk through a virtual forest".to_string(),
        },
        CalmingActivity {
            kind: ActivityKind::Waves,
            title: "Ocean Waves".to_string(),
            description: "Match your breath with gentle ocean waves".to_string(),
        },
    ]
}

/// Scan `text` for stress keywords. The first keyword in list order wins;
/// the offered activity is picked uniformly from the catalog via `rng`.
pub fn detect(text: &str, rng: &mut impl Rng) -> Option<StressPrompt> {
    let lowered = text.to_lowercase();
    let trigger = STRESS_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| lowered.contains(keyword))?;

    let catalog = activity_catalog();
    let activity = catalog[rng.gen_range(0..catalog.len())].clone();

    Some(StressPrompt {
        trigger: trigger.to_string(),
        activity,
    })
}
