pub mod batch;
pub mod crs;
pub mod error;
pub mod features;
pub mod file_data;
pub mod pipeline;
pub mod reproject;
pub mod train_data;
pub mod writers;

pub use batch::{preprocess_batch, BatchOutcome};
pub use crs::EpsgCode;
pub use error::PreprocessingError;
pub use features::{Feature, FeatureCollection, Geometry};
pub use file_data::FileData;
pub use pipeline::{DataKind, FnOperator, Operator, Pipeline, Writer};
pub use reproject::{CoordinateTransform, ReprojectingOperator, SphericalMercator};
pub use train_data::TrainDataOperator;
pub use writers::{FileDataWriter, GeoJsonWriter};
