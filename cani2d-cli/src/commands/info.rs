//! Model information display

use anyhow::{Context, Result};
use cani2d::animation::CurveTarget;
use cani2d::{CURRENT_FORMAT_VERSION, Mesh, MeshOptions};
use image::RgbaImage;
use std::path::Path;

use super::load_document;
use crate::utils::{add_table_row, create_table, render_bone_tree};

pub fn execute(path: &Path, detailed: bool) -> Result<()> {
    println!("Loading model: {}", path.display());

    let document = load_document(path)?;
    let vertex_count = document.vertex_count();
    let face_count = document.faces.len();
    let uv_count = document.uv.len() / 2;

    // Tiles are not needed here, an empty texture keeps them empty
    let mesh = Mesh::new(
        document.into_geometry(),
        &RgbaImage::new(0, 0),
        &MeshOptions::default(),
    )
    .with_context(|| format!("Invalid model: {}", path.display()))?;

    println!("\n=== Model Information ===");
    match mesh.exporter_version() {
        Some(version) if mesh.is_version_compatible() => println!("Exporter version: {version}"),
        Some(version) => println!(
            "Exporter version: {version} (unsupported, runtime expects {CURRENT_FORMAT_VERSION})"
        ),
        None => println!("Exporter version: unknown"),
    }
    println!("Vertices: {vertex_count}");
    println!("Faces: {face_count} ({} skipped)", mesh.skipped_faces());
    println!("Triangles: {}", mesh.triangles().len());
    println!("UV coordinates: {uv_count}");
    println!(
        "Weighted vertices: {}/{}",
        mesh.weights().weighted_count(),
        mesh.weights().len()
    );
    println!("Bones: {}", mesh.skeleton().len());
    println!("Animations: {}", mesh.animations().len());

    if !mesh.skeleton().is_empty() {
        println!("\n=== Skeleton ===");
        print!("{}", render_bone_tree(mesh.skeleton()));
    }

    if !mesh.animations().is_empty() {
        println!("\n=== Animations ===");
        let mut table = create_table(vec!["Name", "Frames", "Seconds @30fps", "Curves", "Rotation"]);
        for clip in mesh.animations() {
            add_table_row(
                &mut table,
                vec![
                    clip.name.clone(),
                    format!("{}", clip.length),
                    format!("{:.2}", clip.length / cani2d::animation::DEFAULT_FPS),
                    clip.curves().len().to_string(),
                    clip.rotation_curve_count().to_string(),
                ],
            );
        }
        table.printstd();
    }

    if detailed {
        print_details(&mesh);
    }

    Ok(())
}

fn print_details(mesh: &Mesh) {
    let skeleton = mesh.skeleton();

    if !skeleton.is_empty() {
        println!("\n=== Bones ===");
        let mut table = create_table(vec!["#", "Name", "Parent", "Head", "Local head", "Vertices"]);
        for bone in skeleton.bones() {
            let influenced = (0..mesh.weights().len())
                .filter(|&v| {
                    mesh.weights()
                        .influence(v)
                        .is_some_and(|influence| influence.bones.contains(&bone.index))
                })
                .count();
            add_table_row(
                &mut table,
                vec![
                    bone.index.to_string(),
                    bone.name.clone(),
                    bone.parent
                        .and_then(|parent| skeleton.bone(parent))
                        .map_or_else(|| "-".to_string(), |parent| parent.name.clone()),
                    format!("({:.2}, {:.2})", bone.head.x, bone.head.y),
                    format!("({:.2}, {:.2})", bone.local_head.x, bone.local_head.y),
                    influenced.to_string(),
                ],
            );
        }
        table.printstd();
    }

    for clip in mesh.animations() {
        println!("\n=== Curves: {} ===", clip.name);
        let mut table = create_table(vec!["Bone", "Channel", "Keys", "First", "Last"]);
        for bone_curve in clip.curves() {
            let bone = skeleton
                .bone(bone_curve.bone)
                .map_or_else(|| bone_curve.bone.to_string(), |b| b.name.clone());
            let channel = match &bone_curve.curve.target {
                CurveTarget::Rotation(axis) => format!("rotation.{axis:?}").to_lowercase(),
                CurveTarget::Other { kind, index } => format!("{kind}[{index}] (ignored)"),
            };
            let keys = bone_curve.curve.keys();
            let span = |key: Option<&cani2d::animation::Keyframe>| {
                key.map_or_else(
                    || "-".to_string(),
                    |k| format!("{:.1} = {:.3}", k.time, k.value),
                )
            };
            add_table_row(
                &mut table,
                vec![
                    bone,
                    channel,
                    keys.len().to_string(),
                    span(keys.first()),
                    span(keys.last()),
                ],
            );
        }
        table.printstd();
    }
}
