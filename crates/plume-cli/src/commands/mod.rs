//! CLI command implementations

pub mod config;
pub mod render;
pub mod run;
pub mod simulate;

use anyhow::{Context, Result};
use plume_particles::{DemoConfig, Preset};
use std::path::{Path, PathBuf};

/// Where a demo's parameters come from: a preset, optionally layered with a
/// TOML override file and a seed
pub struct DemoSource {
    pub preset: Preset,
    pub config: Option<PathBuf>,
    pub seed: Option<u32>,
}

/// A resolved demo ready to hand to a backend
pub struct LoadedDemo {
    pub config: DemoConfig,
    pub texture: Option<PathBuf>,
}

impl DemoSource {
    pub fn load(&self) -> Result<LoadedDemo> {
        let mut config = self.preset.config();
        let mut base_dir = PathBuf::new();

        if let Some(path) = &self.config {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config '{}'", path.display()))?;
            config = config
                .merged_with(&text)
                .with_context(|| format!("Invalid config '{}'", path.display()))?;
            if overrides_texture(&text) {
                if let Some(parent) = path.parent() {
                    base_dir = parent.to_path_buf();
                }
            }
        }

        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        let texture = resolve_texture(&config, &base_dir);
        tracing::info!(
            demo = %config.name,
            particles = config.simulation.particle_count,
            seed = config.seed,
            "demo loaded"
        );
        Ok(LoadedDemo { config, texture })
    }
}

/// True when the override document sets `sprite.texture` itself
fn overrides_texture(text: &str) -> bool {
    toml::from_str::<toml::Table>(text)
        .ok()
        .and_then(|table| table.get("sprite")?.get("texture").cloned())
        .is_some()
}

/// Texture paths in an override file are relative to that file; preset
/// paths are relative to the working directory
fn resolve_texture(config: &DemoConfig, base_dir: &Path) -> Option<PathBuf> {
    let texture = Path::new(config.sprite.texture.as_deref()?);
    if texture.is_absolute() {
        Some(texture.to_path_buf())
    } else {
        Some(base_dir.join(texture))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_without_overrides() {
        let demo = DemoSource {
            preset: Preset::Fire,
            config: None,
            seed: Some(9),
        }
        .load()
        .unwrap();
        assert_eq!(demo.config.seed, 9);
        assert_eq!(demo.texture, Some(PathBuf::from("assets/fire.png")));
    }

    #[test]
    fn texture_resolves_against_override_dir() {
        let mut config = Preset::Smoke.config();
        config.sprite.texture = Some("puff.png".into());
        assert_eq!(
            resolve_texture(&config, Path::new("demos")),
            Some(PathBuf::from("demos/puff.png"))
        );

        config.sprite.texture = None;
        assert_eq!(resolve_texture(&config, Path::new("demos")), None);
    }

    fn write_override(test: &str, text: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("plume-cli-{test}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("override.toml");
        std::fs::write(&path, text).unwrap();
        (dir, path)
    }

    #[test]
    fn override_file_is_layered_over_preset() {
        let (dir, path) = write_override("layered", "[simulation]\nlifetime = 2.0\n");

        let demo = DemoSource {
            preset: Preset::Fountain,
            config: Some(path),
            seed: None,
        }
        .load()
        .unwrap();
        assert_eq!(demo.config.simulation.lifetime, 2.0);
        assert_eq!(
            demo.config.simulation.particle_count,
            Preset::Fountain.config().simulation.particle_count
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn preset_texture_survives_unrelated_override() {
        let (dir, path) = write_override("unrelated", "[simulation]\nlifetime = 3.0\n");

        let demo = DemoSource {
            preset: Preset::Fire,
            config: Some(path),
            seed: None,
        }
        .load()
        .unwrap();
        assert_eq!(demo.config.simulation.lifetime, 3.0);
        assert_eq!(demo.texture, Some(PathBuf::from("assets/fire.png")));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn override_texture_is_relative_to_its_file() {
        let (dir, path) = write_override("texture", "[sprite]\ntexture = \"puff.png\"\n");

        let demo = DemoSource {
            preset: Preset::Fire,
            config: Some(path),
            seed: None,
        }
        .load()
        .unwrap();
        assert_eq!(demo.texture, Some(dir.join("puff.png")));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn detects_texture_overrides() {
        assert!(overrides_texture("[sprite]\ntexture = \"a.png\"\n"));
        assert!(!overrides_texture("[sprite]\nadditive = true\n"));
        assert!(!overrides_texture("[simulation]\nlifetime = 3.0\n"));
        assert!(!overrides_texture("not toml ["));
    }

    #[test]
    fn missing_override_file_is_an_error() {
        let result = DemoSource {
            preset: Preset::Fountain,
            config: Some(PathBuf::from("does/not/exist.toml")),
            seed: None,
        }
        .load();
        assert!(result.is_err());
    }
}
