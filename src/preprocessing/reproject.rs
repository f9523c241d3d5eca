use super::features::Position;
use super::pipeline::{DataKind, Operator};
use super::{EpsgCode, FeatureCollection, PreprocessingError};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::sync::Arc;
use tracing::debug;

const OPERATOR_NAME: &str = "reprojecting-operator";

/// Converts positions between two reference systems.
pub trait CoordinateTransform: Send + Sync {
    fn supports(&self, source: EpsgCode, target: EpsgCode) -> bool;

    fn transform(
        &self,
        source: EpsgCode,
        target: EpsgCode,
        position: &mut Position,
    ) -> Result<(), PreprocessingError>;
}

/// WGS84 geographic coordinates to and from web mercator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalMercator;

impl SphericalMercator {
    pub const EARTH_RADIUS: f64 = 6_378_137.0;
    pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;
}

impl CoordinateTransform for SphericalMercator {
    fn supports(&self, source: EpsgCode, target: EpsgCode) -> bool {
        matches!(
            (source, target),
            (EpsgCode::WGS84, EpsgCode::WEB_MERCATOR) | (EpsgCode::WEB_MERCATOR, EpsgCode::WGS84)
        )
    }

    fn transform(
        &self,
        source: EpsgCode,
        target: EpsgCode,
        position: &mut Position,
    ) -> Result<(), PreprocessingError> {
        if position.len() < 2 {
            return Err(PreprocessingError::operator(
                OPERATOR_NAME,
                format!("position {position:?} has fewer than two ordinates"),
            ));
        }
        let (x, y) = (position[0], position[1]);
        let (nx, ny) = if source == EpsgCode::WGS84 && target == EpsgCode::WEB_MERCATOR {
            let lat = y.clamp(-Self::MAX_LATITUDE, Self::MAX_LATITUDE).to_radians();
            (
                Self::EARTH_RADIUS * x.to_radians(),
                Self::EARTH_RADIUS * (FRAC_PI_4 + lat / 2.0).tan().ln(),
            )
        } else if source == EpsgCode::WEB_MERCATOR && target == EpsgCode::WGS84 {
            (
                (x / Self::EARTH_RADIUS).to_degrees(),
                (2.0 * (y / Self::EARTH_RADIUS).exp().atan() - FRAC_PI_2).to_degrees(),
            )
        } else {
            return Err(PreprocessingError::operator(
                OPERATOR_NAME,
                format!("no transformation from {source} to {target}"),
            ));
        };
        position[0] = nx;
        position[1] = ny;
        Ok(())
    }
}

/// Brings a feature collection into the target reference system.
///
/// A collection that declares no CRS is only tagged with the target.
#[derive(Clone)]
pub struct ReprojectingOperator {
    target_epsg: String,
    transform: Arc<dyn CoordinateTransform>,
}

impl ReprojectingOperator {
    pub fn new(target_epsg: impl Into<String>) -> Self {
        Self::with_transform(target_epsg, Arc::new(SphericalMercator))
    }

    pub fn with_transform(
        target_epsg: impl Into<String>,
        transform: Arc<dyn CoordinateTransform>,
    ) -> Self {
        Self {
            target_epsg: target_epsg.into(),
            transform,
        }
    }

    pub fn target_epsg(&self) -> &str {
        &self.target_epsg
    }
}

impl Operator<FeatureCollection> for ReprojectingOperator {
    fn name(&self) -> &str {
        OPERATOR_NAME
    }

    fn supported_kind(&self) -> DataKind {
        DataKind::FeatureCollection
    }

    fn process(&self, input: FeatureCollection) -> Result<FeatureCollection, PreprocessingError> {
        let target = EpsgCode::parse(&self.target_epsg)?;
        let source = match input.epsg()? {
            Some(source) if source == target => return Ok(input),
            Some(source) => source,
            None => return Ok(input.with_epsg(target)),
        };
        if !self.transform.supports(source, target) {
            return Err(PreprocessingError::operator(
                OPERATOR_NAME,
                format!("unsupported reprojection from {source} to {target}"),
            ));
        }

        debug!(%source, %target, features = input.len(), "reprojecting feature collection");
        let mut output = input;
        for feature in &mut output.features {
            if let Some(geometry) = feature.geometry.as_mut() {
                geometry.try_for_each_position(&mut |position: &mut Position| {
                    self.transform.transform(source, target, position)
                })?;
            }
        }
        Ok(output.with_epsg(target))
    }
}
