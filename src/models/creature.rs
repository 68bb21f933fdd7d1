//! Boosted creature and boss records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name shown until real data arrives.
pub const PLACEHOLDER_NAME: &str = "Loading...";

/// Which daily highlight a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreatureKind {
    Creature,
    Boss,
}

impl CreatureKind {
    /// Element id used for the image on the site's home page.
    pub fn element_id(self) -> &'static str {
        match self {
            CreatureKind::Creature => "Creature",
            CreatureKind::Boss => "Boss",
        }
    }
}

impl fmt::Display for CreatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_id())
    }
}

/// Outfit-rendering parameters for the animated image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outfit {
    pub id: u32,
    pub addons: u32,
    pub head: u32,
    pub body: u32,
    pub legs: u32,
    pub feet: u32,
    pub mount: u32,
}

impl Outfit {
    /// Fill an image path template with these parameters.
    pub fn render(&self, template: &str) -> String {
        template
            .replace("{id}", &self.id.to_string())
            .replace("{addons}", &self.addons.to_string())
            .replace("{head}", &self.head.to_string())
            .replace("{body}", &self.body.to_string())
            .replace("{legs}", &self.legs.to_string())
            .replace("{feet}", &self.feet.to_string())
            .replace("{mount}", &self.mount.to_string())
    }
}

/// A boosted creature or boss as announced on the website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostedCreature {
    pub name: String,
    pub kind: CreatureKind,
    pub image_url: Option<String>,
    pub outfit: Outfit,
}

impl BoostedCreature {
    /// Record shown when nothing could be extracted.
    pub fn placeholder(kind: CreatureKind) -> Self {
        Self {
            name: PLACEHOLDER_NAME.to_string(),
            kind,
            image_url: None,
            outfit: Outfit::default(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.name == PLACEHOLDER_NAME
    }
}

/// Today's boosted creature and boss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostedPair {
    pub creature: BoostedCreature,
    pub boss: BoostedCreature,
}

impl BoostedPair {
    pub fn placeholder() -> Self {
        Self {
            creature: BoostedCreature::placeholder(CreatureKind::Creature),
            boss: BoostedCreature::placeholder(CreatureKind::Boss),
        }
    }
}
