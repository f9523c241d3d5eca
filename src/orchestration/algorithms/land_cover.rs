use super::gdal_warp::warp_to_epsg;
use crate::command::CommandValue;
use crate::orchestration::{Algorithm, OrchestratorError, PreprocessingContext};
use crate::preprocessing::{
    preprocess_batch, FeatureCollection, GeoJsonWriter, Pipeline, PreprocessingError,
    ReprojectingOperator, TrainDataOperator,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

pub const PROCESS_ID: &str = "de.hsbo.wacodis.land_cover_classification";
pub const TOOL_CONFIG: &str = "land-cover-classification.yml";
pub const RESULT_NAME_PREFIX: &str = "land_cover_classification_result";

pub const OPTICAL_IMAGES_SOURCES: &str = "OPTICAL_IMAGES_SOURCES";
pub const REFERENCE_DATA: &str = "REFERENCE_DATA";

const DEFAULT_TRAINING_ATTRIBUTE: &str = "class";

/// Supervised land cover classification of optical satellite scenes.
///
/// Every scene is fetched into the work directory and warped to the
/// configured EPSG; scenes that fail are skipped. Reference data is
/// reprojected, labelled with training classes and written as GeoJSON.
pub struct LandCoverClassification {
    optical_images_sources: Vec<String>,
    reference_data: FeatureCollection,
    training_attribute: String,
}

impl LandCoverClassification {
    pub fn new(optical_images_sources: Vec<String>, reference_data: FeatureCollection) -> Self {
        Self {
            optical_images_sources,
            reference_data,
            training_attribute: DEFAULT_TRAINING_ATTRIBUTE.to_string(),
        }
    }

    /// Attribute of the reference features holding the land cover category.
    pub fn with_training_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.training_attribute = attribute.into();
        self
    }

    fn preprocess_optical_images(
        &self,
        context: &PreprocessingContext<'_>,
    ) -> Result<Vec<PathBuf>, OrchestratorError> {
        let epsg = &context.settings().epsg;
        let outcome = preprocess_batch(
            &self.optical_images_sources,
            |reference| -> Result<Vec<PathBuf>, OrchestratorError> {
                let fetched = context
                    .fetcher()
                    .fetch(reference, context.work_dir())
                    .map_err(|source| PreprocessingError::Fetch {
                        reference: reference.clone(),
                        source,
                    })?;
                Ok(vec![warp_to_epsg(context, &fetched, epsg)?])
            },
        )?;
        info!(
            images = outcome.processed.len(),
            skipped = outcome.failures.len(),
            "optical images preprocessed"
        );
        Ok(outcome.processed)
    }

    fn preprocess_reference_data(
        &self,
        context: &PreprocessingContext<'_>,
    ) -> Result<PathBuf, OrchestratorError> {
        let target = context
            .work_dir()
            .join(format!("traindata{}.geojson", context.run_suffix()));
        let pipeline = Pipeline::new(GeoJsonWriter::new(target))
            .with_operator(ReprojectingOperator::new(context.settings().epsg.as_str()))
            .with_operator(TrainDataOperator::new(self.training_attribute.as_str()));
        Ok(pipeline.execute(self.reference_data.clone())?)
    }
}

impl Algorithm for LandCoverClassification {
    fn process_id(&self) -> &str {
        PROCESS_ID
    }

    fn tool_config_name(&self) -> &str {
        TOOL_CONFIG
    }

    fn result_name_prefix(&self) -> &str {
        RESULT_NAME_PREFIX
    }

    fn source_references(&self) -> Vec<String> {
        self.optical_images_sources.clone()
    }

    fn create_input_values(
        &mut self,
        context: &PreprocessingContext<'_>,
    ) -> Result<BTreeMap<String, CommandValue>, OrchestratorError> {
        if self.optical_images_sources.is_empty() {
            return Err(OrchestratorError::invalid_input(
                PROCESS_ID,
                OPTICAL_IMAGES_SOURCES,
                "at least one source is required",
            ));
        }
        if self.reference_data.is_empty() {
            return Err(OrchestratorError::invalid_input(
                PROCESS_ID,
                REFERENCE_DATA,
                "reference data holds no features",
            ));
        }

        let images = self.preprocess_optical_images(context)?;
        let reference = self.preprocess_reference_data(context)?;

        Ok(BTreeMap::from([
            (OPTICAL_IMAGES_SOURCES.to_string(), context.tool_paths(&images)),
            (
                REFERENCE_DATA.to_string(),
                CommandValue::single(context.tool_path(&reference)),
            ),
        ]))
    }
}
