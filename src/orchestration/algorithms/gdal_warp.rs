use crate::command::CommandValue;
use crate::orchestration::{OrchestratorError, PreprocessingContext};
use crate::shared::paths::file_name_of;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const GDAL_WARP_CONFIG: &str = "gdal-warp.yml";
const WARPED_POSTFIX: &str = "_warped";

/// `scene.tif` becomes `scene_warped.tif`.
pub fn warped_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    match input.extension() {
        Some(extension) => format!("{stem}{WARPED_POSTFIX}.{}", extension.to_string_lossy()),
        None => format!("{stem}{WARPED_POSTFIX}"),
    }
}

/// Reprojects a raster in the work directory with the `gdal-warp` tool and
/// returns the host path of the warped copy.
pub fn warp_to_epsg(
    context: &PreprocessingContext<'_>,
    input: &Path,
    target_epsg: &str,
) -> Result<PathBuf, OrchestratorError> {
    let tools = context.tools();
    let (descriptor, _) = tools.resolve(GDAL_WARP_CONFIG)?;
    let input_name = file_name_of(input).unwrap_or_default();
    let output_name = warped_file_name(input);

    let values = BTreeMap::from([
        (
            "INPUT".to_string(),
            CommandValue::single(tools.tool_path(&descriptor, &input_name)),
        ),
        ("TARGET_EPSG".to_string(), CommandValue::single(target_epsg)),
        (
            "OUTPUT".to_string(),
            CommandValue::single(tools.tool_path(&descriptor, &output_name)),
        ),
    ]);
    debug!(input = %input.display(), target_epsg, "warping raster");
    tools.run(&descriptor, &values, context.cancel())?;
    Ok(context.work_dir().join(output_name))
}
