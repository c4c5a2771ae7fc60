//! Print a preset as an editable TOML document

use anyhow::Result;
use plume_particles::Preset;

pub fn run(preset: Preset) -> Result<()> {
    print!("{}", preset.config().to_toml_string()?);
    Ok(())
}
