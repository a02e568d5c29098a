use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::error::{PipelineError, Result};
use crate::formats::ModelFormat;

pub const DEFAULT_MODEL_FILE: &str = "car.blend";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    pub path: PathBuf,
    pub name: String,
}

/// Extracts the model argument from a host-launcher style argument list:
/// everything before a literal `--` belongs to the launcher, the first
/// argument after it names the model. Without a separator the first
/// argument is taken as-is.
pub fn model_argument(args: &[String]) -> Option<&str> {
    match args.iter().position(|arg| arg == "--") {
        Some(index) => args.get(index + 1).map(String::as_str),
        None => args.first().map(String::as_str),
    }
}

/// Resolves a model name against the model directory.
///
/// A name with an extension is joined directly. A bare name probes the
/// supported extensions in a fixed order; several hits resolve to the
/// first with an explicit ambiguity warning. No name falls back to the
/// default model.
pub fn resolve_model(name: Option<&str>, model_dir: &Path) -> Result<ResolvedModel> {
    let Some(name) = name else {
        let path = model_dir.join(DEFAULT_MODEL_FILE);
        log::info!("no model argument; defaulting to {}", path.display());
        return Ok(ResolvedModel {
            path,
            name: stem_of(Path::new(DEFAULT_MODEL_FILE)),
        });
    };

    if Path::new(name).extension().is_some() {
        let path = model_dir.join(name);
        return Ok(ResolvedModel {
            name: stem_of(&path),
            path,
        });
    }

    let candidates = ModelFormat::SUPPORTED_EXTENSIONS
        .iter()
        .map(|extension| model_dir.join(format!("{name}.{extension}")))
        .filter(|candidate| candidate.exists())
        .collect::<Vec<_>>();

    match candidates.as_slice() {
        [] => Err(PipelineError::FileNotFound(model_dir.join(name))),
        [only] => Ok(ResolvedModel {
            name: stem_of(only),
            path: only.clone(),
        }),
        [first, ..] => {
            log::warn!(
                "multiple candidates for {name:?}: {}; using {}",
                candidates.iter().map(|path| path.display()).join(", "),
                first.display()
            );
            Ok(ResolvedModel {
                name: stem_of(first),
                path: first.clone(),
            })
        }
    }
}

pub fn resolve_from_args(args: &[String], model_dir: &Path) -> Result<ResolvedModel> {
    resolve_model(model_argument(args), model_dir)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn model_argument_follows_the_separator() {
        let args = strings(&["--background", "--python", "script", "--", "car"]);
        assert_eq!(model_argument(&args), Some("car"));

        let args = strings(&["car.obj"]);
        assert_eq!(model_argument(&args), Some("car.obj"));

        assert_eq!(model_argument(&[]), None);

        // Separator with nothing after it means no argument.
        let args = strings(&["--background", "--"]);
        assert_eq!(model_argument(&args), None);
    }

    #[test]
    fn explicit_extension_is_joined_directly() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_model(Some("car.glb"), dir.path()).unwrap();
        assert_eq!(resolved.path, dir.path().join("car.glb"));
        assert_eq!(resolved.name, "car");
    }

    #[test]
    fn bare_name_with_one_match_resolves_unambiguously() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("car.blend"), b"").unwrap();

        let resolved = resolve_model(Some("car"), dir.path()).unwrap();
        assert_eq!(resolved.path, dir.path().join("car.blend"));
        assert_eq!(resolved.name, "car");
    }

    #[test]
    fn bare_name_with_many_matches_takes_the_first_probe_hit() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("car.obj"), b"").unwrap();
        fs::write(dir.path().join("car.fbx"), b"").unwrap();

        // Probe order is the supported-extension order, so .obj wins.
        let resolved = resolve_model(Some("car"), dir.path()).unwrap();
        assert_eq!(resolved.path, dir.path().join("car.obj"));
    }

    #[test]
    fn bare_name_with_no_match_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_model(Some("car"), dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn no_argument_falls_back_to_the_default_model() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_from_args(&[], dir.path()).unwrap();
        assert_eq!(resolved.path, dir.path().join(DEFAULT_MODEL_FILE));
        assert_eq!(resolved.name, "car");
    }
}
