use serde::{Deserialize, Serialize};

/// One extracted recipe, keyed by `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub category: String,
    pub title: String,
    #[serde(rename = "prepTime")]
    pub prep_time: String,
    /// `None` when the page has no usable servings heading; written as `null`.
    pub servings: Option<u32>,
    pub img: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<InstructionStep>,
    pub source: String,
}

impl Recipe {
    /// A record with every field at its default.
    pub fn empty(source: impl Into<String>) -> Self {
        Self {
            category: String::new(),
            title: String::new(),
            prep_time: String::new(),
            servings: None,
            img: String::new(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionStep {
    pub step: String,
    pub image: Option<String>,
}
