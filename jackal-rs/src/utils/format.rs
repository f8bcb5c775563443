//! Formatting utilities

use glam::{Mat4, Vec3};
use humansize::{DECIMAL, format_size};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a clip length in ticks, with seconds when the rate is known
pub fn format_duration(duration: f32, seconds: Option<f32>) -> String {
    match seconds {
        Some(seconds) => format!("{duration} ticks ({seconds:.2} s)"),
        None => format!("{duration} ticks"),
    }
}

/// Format a point with three decimals per axis
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

/// Render a matrix row by row
pub fn format_matrix(m: &Mat4, indent: &str) -> String {
    let mut out = String::new();
    for row in 0..4 {
        let r = m.row(row);
        out.push_str(&format!(
            "{indent}[{:>9.4} {:>9.4} {:>9.4} {:>9.4}]\n",
            r.x, r.y, r.z, r.w
        ));
    }
    out
}
