use std::env;
use std::path::Path;

use log::{info, warn};
use skinned_assets::assets::classify;
use skinned_assets::{
    AnimationPlayer, AssetError, AssetKind, AssetManifest, Hierarchy, Model, SkinnedAnimation, SkinnedModel,
    SkinnedVertex, StaticVertex,
};

const USAGE: &str = "usage: asset_tool inspect <manifest.json | asset>\n       asset_tool convert <input> <output>";

fn inspect_hierarchy(hierarchy: &Hierarchy) {
    for id in hierarchy.iter() {
        let mut depth = 0;
        let mut parent = hierarchy[id].parent();
        while let Some(p) = parent {
            depth += 1;
            parent = hierarchy[p].parent();
        }
        info!("{:indent$}{} at {}", "", hierarchy[id].name(), hierarchy.world_position(id), indent = depth * 2);
    }
}

fn inspect_model(model: &Model<StaticVertex>) -> Result<(), AssetError> {
    for (i, mesh) in model.meshes.iter().enumerate() {
        let material = model.material(mesh)?;
        info!(
            "mesh {}: {} vertices, {} indices, material '{}'",
            i,
            mesh.vertices.len(),
            mesh.indices.len(),
            material.name
        );
    }
    Ok(())
}

fn inspect_skinned_model(model: &SkinnedModel<SkinnedVertex>) -> Result<(), AssetError> {
    inspect_hierarchy(&model.hierarchy);
    for (i, mesh) in model.meshes.iter().enumerate() {
        let material = model.material(mesh)?;
        info!(
            "mesh {}: {} vertices, {} indices, {} bones, material '{}'",
            i,
            mesh.vertices.len(),
            mesh.indices.len(),
            mesh.bones.len(),
            material.name
        );
    }
    Ok(())
}

fn inspect_animation(animation: &SkinnedAnimation) {
    let bound = animation.tracks().iter().filter(|t| t.transform.is_some()).count();
    info!(
        "{} tracks ({} bound), {:.3}s",
        animation.tracks().len(),
        bound,
        animation.max_animation_time()
    );
}

fn inspect_manifest(path: &Path) -> Result<(), AssetError> {
    let manifest = AssetManifest::load(path)?;
    match classify(&manifest.model)?.0 {
        AssetKind::Model => {
            let model = Model::<StaticVertex>::load(&manifest.model)?;
            inspect_model(&model)?;
            if !manifest.animations.is_empty() {
                warn!("{} has no hierarchy, skipping animations", manifest.model.display());
            }
        }
        AssetKind::SkinnedModel => {
            let mut model = SkinnedModel::<SkinnedVertex>::load(&manifest.model)?;
            inspect_skinned_model(&model)?;
            for animation_path in &manifest.animations {
                let animation = SkinnedAnimation::load(animation_path, &model.hierarchy)?;
                inspect_animation(&animation);
                let mut player = AnimationPlayer::for_animation(&animation, manifest.time_wrap);
                for &time in &manifest.sample_times {
                    player.seek(time);
                    let sample_time = player.sample_time();
                    animation.set_transform(sample_time, &mut model.hierarchy);
                    for (i, mesh) in model.meshes.iter().enumerate() {
                        let palette = mesh.skinning_palette(&model.hierarchy);
                        info!("t={:.3} mesh {}: {:?}", sample_time, i, palette.first().map(|m| m.rows));
                    }
                }
            }
        }
        AssetKind::Animation => {
            warn!("{} names an animation as its model", path.display());
        }
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<(), AssetError> {
    if path.extension().is_some_and(|e| e == "json") {
        return inspect_manifest(path);
    }
    match classify(path)?.0 {
        AssetKind::Model => inspect_model(&Model::<StaticVertex>::load(path)?),
        AssetKind::SkinnedModel => inspect_skinned_model(&SkinnedModel::<SkinnedVertex>::load(path)?),
        AssetKind::Animation => {
            inspect_animation(&SkinnedAnimation::load_unbound(path)?);
            Ok(())
        }
    }
}

fn convert(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (kind, _) = classify(input)?;
    let (output_kind, _) = classify(output)?;
    if kind != output_kind {
        return Err(format!("cannot convert {:?} to {:?}", kind, output_kind).into());
    }
    match kind {
        AssetKind::Model => Model::<StaticVertex>::load(input)?.save(output)?,
        AssetKind::SkinnedModel => SkinnedModel::<SkinnedVertex>::load(input)?.save(output)?,
        AssetKind::Animation => SkinnedAnimation::load_unbound(input)?.save(output)?,
    }
    info!("wrote {}", output.display());
    Ok(())
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("inspect") if args.len() == 3 => inspect(Path::new(&args[2]))?,
        Some("convert") if args.len() == 4 => convert(Path::new(&args[2]), Path::new(&args[3]))?,
        _ => return Err(USAGE.into()),
    }
    Ok(())
}
