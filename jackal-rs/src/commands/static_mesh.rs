//! Static mesh command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

use jkl_model::StaticMesh;
use jkl_model::static_mesh::StaticVertex;

use crate::utils::format_bytes;

#[derive(Subcommand)]
pub enum StaticCommands {
    /// Display information about a static mesh file
    Info {
        /// Path to the static mesh file
        file: PathBuf,
    },
}

pub fn execute(command: StaticCommands) -> Result<()> {
    match command {
        StaticCommands::Info { file } => execute_info(&file),
    }
}

fn execute_info(path: &Path) -> Result<()> {
    use console::style;

    let mesh = StaticMesh::load(path)
        .with_context(|| format!("Failed to load static mesh: {}", path.display()))?;
    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?
        .len();
    let vertices = mesh
        .flatten()
        .context("Failed to flatten static mesh")?
        .len();

    println!("\n{}", style("Static Mesh Information").bold().underlined());
    println!("File: {}", style(path.display()).cyan());
    println!("Size: {}", style(format_bytes(size)).yellow());

    println!("\n{}", style("Tables").bold());
    println!("Positions: {}", style(mesh.positions.len()).green());
    println!("UVs: {}", style(mesh.uvs.len()).green());
    println!("Normals: {}", style(mesh.normals.len()).green());
    println!("Triangles: {}", style(mesh.triangles.len()).green());
    println!(
        "Materials: {} ({} textured)",
        style(mesh.materials.len()).green(),
        mesh.materials.iter().filter(|m| m.textured).count()
    );

    println!("\n{}", style("Draw data").bold());
    println!("Flattened vertices: {}", style(vertices).green());
    println!(
        "Vertex buffer: {}",
        style(format_bytes(
            (vertices * StaticVertex::FLOATS * size_of::<f32>()) as u64
        ))
        .green()
    );

    Ok(())
}
