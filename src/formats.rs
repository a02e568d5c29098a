use std::path::Path;

use crate::error::{PipelineError, Result};

/// Model file formats the import dispatcher recognizes. Whether a given
/// backend can actually read a format is up to the backend; unknown
/// extensions are rejected here before a backend is ever consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Blend,
    Obj,
    Fbx,
    Stl,
    Gltf,
}

impl ModelFormat {
    /// Probe order for extension-less model names, matching the dispatch
    /// table below.
    pub const SUPPORTED_EXTENSIONS: [&'static str; 6] =
        ["blend", "obj", "fbx", "stl", "glb", "gltf"];

    pub fn from_path(path: &Path) -> Result<ModelFormat> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "blend" => Ok(ModelFormat::Blend),
            "obj" => Ok(ModelFormat::Obj),
            "fbx" => Ok(ModelFormat::Fbx),
            "stl" => Ok(ModelFormat::Stl),
            "glb" | "gltf" => Ok(ModelFormat::Gltf),
            _ => Err(PipelineError::UnsupportedFormat(extension)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelFormat::Blend => "Blend",
            ModelFormat::Obj => "OBJ",
            ModelFormat::Fbx => "FBX",
            ModelFormat::Stl => "STL",
            ModelFormat::Gltf => "glTF",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_known_extensions() {
        assert_eq!(
            ModelFormat::from_path(Path::new("model/car.blend")).unwrap(),
            ModelFormat::Blend
        );
        assert_eq!(
            ModelFormat::from_path(Path::new("car.obj")).unwrap(),
            ModelFormat::Obj
        );
        assert_eq!(
            ModelFormat::from_path(Path::new("car.glb")).unwrap(),
            ModelFormat::Gltf
        );
        assert_eq!(
            ModelFormat::from_path(Path::new("car.gltf")).unwrap(),
            ModelFormat::Gltf
        );
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert_eq!(
            ModelFormat::from_path(Path::new("CAR.FBX")).unwrap(),
            ModelFormat::Fbx
        );
    }

    #[test]
    fn rejects_unknown_extensions() {
        let err = ModelFormat::from_path(Path::new("car.usdz")).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(ext) if ext == "usdz"));
    }

    #[test]
    fn rejects_missing_extension() {
        assert!(ModelFormat::from_path(Path::new("car")).is_err());
    }
}
