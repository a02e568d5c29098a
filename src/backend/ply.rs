use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::generate::bundle::GaussianSplats;

// Zeroth-order spherical harmonics basis constant.
const SH_C0: f32 = 0.282_094_8;

const PROPERTIES: [&str; 17] = [
    "x", "y", "z", "nx", "ny", "nz", "f_dc_0", "f_dc_1", "f_dc_2", "opacity", "scale_0",
    "scale_1", "scale_2", "rot_0", "rot_1", "rot_2", "rot_3",
];

/// Writes splats in the layout common 3DGS viewers expect: DC color as SH
/// coefficients, log-encoded scales and logit-encoded opacity.
pub fn write_splat_ply(splats: &GaussianSplats, out_path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(out_path)?);

    writeln!(writer, "ply")?;
    writeln!(writer, "format binary_little_endian 1.0")?;
    writeln!(writer, "element vertex {}", splats.len())?;
    for property in PROPERTIES {
        writeln!(writer, "property float {property}")?;
    }
    writeln!(writer, "end_header")?;

    for splat in &splats.splats {
        let mut fields = [0.0f32; 17];
        fields[0..3].copy_from_slice(&splat.position.to_array());
        // Normals stay zero, like most splat exporters write them.
        for (field, channel) in fields[6..9].iter_mut().zip(splat.color) {
            *field = (channel as f32 / 255.0 - 0.5) / SH_C0;
        }
        fields[9] = logit(splat.opacity);
        for (field, scale) in fields[10..13].iter_mut().zip(splat.scale.to_array()) {
            *field = scale.max(f32::MIN_POSITIVE).ln();
        }
        fields[13] = splat.rotation.w;
        fields[14] = splat.rotation.x;
        fields[15] = splat.rotation.y;
        fields[16] = splat.rotation.z;

        for field in fields {
            writer.write_all(&field.to_le_bytes())?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn logit(opacity: f32) -> f32 {
    let clamped = opacity.clamp(1e-6, 1.0 - 1e-6);
    (clamped / (1.0 - clamped)).ln()
}
