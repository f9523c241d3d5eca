use super::pipeline::{DataKind, Operator};
use super::{FeatureCollection, PreprocessingError};
use serde_json::Value;
use std::collections::HashMap;

const OPERATOR_NAME: &str = "train-data-operator";
pub const DEFAULT_CATEGORY: &str = "class";

/// Derives integer training classes from a categorical feature attribute.
///
/// Every distinct value of `attribute` gets the next id starting at 1, in
/// first-seen order, stored under `category`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainDataOperator {
    attribute: String,
    category: String,
}

impl TrainDataOperator {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self::with_category(attribute, DEFAULT_CATEGORY)
    }

    pub fn with_category(attribute: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            category: category.into(),
        }
    }
}

impl Operator<FeatureCollection> for TrainDataOperator {
    fn name(&self) -> &str {
        OPERATOR_NAME
    }

    fn supported_kind(&self) -> DataKind {
        DataKind::FeatureCollection
    }

    fn process(&self, input: FeatureCollection) -> Result<FeatureCollection, PreprocessingError> {
        let mut keys = Vec::with_capacity(input.len());
        for (index, feature) in input.features.iter().enumerate() {
            let value = feature.property_ignore_case(&self.attribute).ok_or_else(|| {
                PreprocessingError::operator(
                    OPERATOR_NAME,
                    format!(
                        "feature {index} does not have the attribute <{}>",
                        self.attribute
                    ),
                )
            })?;
            keys.push(class_key(value));
        }

        if self.attribute == self.category {
            return Ok(input);
        }

        let mut classes: HashMap<String, u64> = HashMap::new();
        let mut output = input;
        for (feature, key) in output.features.iter_mut().zip(keys) {
            let next = classes.len() as u64 + 1;
            let class_id = *classes.entry(key).or_insert(next);
            feature
                .properties
                .insert(self.category.clone(), Value::from(class_id));
        }
        Ok(output)
    }
}

fn class_key(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
