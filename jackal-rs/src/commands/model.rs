//! JKL skinned model command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use glam::{Mat4, Quat, Vec3};
use std::path::{Path, PathBuf};

use jkl_model::{
    AnimationClip, BoneTrack, HierarchyNode, JklModel, KeyPosition, KeyRotation, KeyScale,
    LeafBonePolicy, Mesh, NO_BONE, SkeletonHierarchy, Vertex, lint_model, validate_strict,
};
use jkl_runtime::headless::{
    HeadlessPlatform, MemoryGeometry, RecordingRenderer, RecordingUniforms, StubTextures,
};
use jkl_runtime::{
    BONES_UNIFORM, Collaborators, Engine, EngineConfig, FrameContext, InitContext,
    RuntimeError, Scene, SkinnedModel, TextureHandle,
};

use crate::utils::{
    TreeOptions, format_bytes, format_duration, format_matrix, format_vec3, model_tree,
    render_tree,
};

#[derive(Subcommand)]
pub enum ModelCommands {
    /// Display information about a JKL model
    Info {
        /// Path to the JKL file
        file: PathBuf,
    },

    /// Show the mesh list and skeleton hierarchy as a tree
    Tree {
        /// Path to the JKL file
        file: PathBuf,

        /// Maximum depth to display
        #[arg(long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Hide per-node details
        #[arg(long)]
        compact: bool,
    },

    /// Validate a JKL model and report suspicious content
    Validate {
        /// Path to the JKL file
        file: PathBuf,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Evaluate the skeleton at a point in time and print the bone matrices
    Pose {
        /// Path to the JKL file
        file: PathBuf,

        /// Clip time in ticks
        #[arg(short, long, default_value_t = 0.0)]
        time: f32,

        /// Give bones on leaf nodes a final transform
        #[arg(long)]
        include_leaf_bones: bool,
    },

    /// Run the frame loop headlessly and report what each frame uploads
    Play {
        /// Path to the JKL file
        file: PathBuf,

        /// Number of frames to run
        #[arg(short, long, default_value_t = 60)]
        frames: u64,

        /// Seconds per frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,

        /// Engine configuration file (JSON)
        #[arg(short, long, env = "JACKAL_CONFIG")]
        config: Option<PathBuf>,

        /// Give bones on leaf nodes a final transform
        #[arg(long)]
        include_leaf_bones: bool,

        /// Clamp each frame's delta time to this many seconds
        #[arg(long)]
        max_frame_delta: Option<f32>,
    },

    /// Write a small animated two-bone model
    Demo {
        /// Path to write the JKL file
        output: PathBuf,
    },
}

pub fn execute(command: ModelCommands) -> Result<()> {
    match command {
        ModelCommands::Info { file } => execute_info(&file),
        ModelCommands::Tree {
            file,
            depth,
            no_color,
            compact,
        } => execute_tree(&file, depth, no_color, compact),
        ModelCommands::Validate { file, strict } => execute_validate(&file, strict),
        ModelCommands::Pose {
            file,
            time,
            include_leaf_bones,
        } => execute_pose(&file, time, leaf_policy(include_leaf_bones)),
        ModelCommands::Play {
            file,
            frames,
            dt,
            config,
            include_leaf_bones,
            max_frame_delta,
        } => execute_play(
            &file,
            frames,
            dt,
            config.as_deref(),
            include_leaf_bones,
            max_frame_delta,
        ),
        ModelCommands::Demo { output } => execute_demo(&output),
    }
}

fn leaf_policy(include: bool) -> LeafBonePolicy {
    if include {
        LeafBonePolicy::Include
    } else {
        LeafBonePolicy::Exclude
    }
}

fn load_model(path: &Path) -> Result<JklModel> {
    JklModel::load(path).with_context(|| format!("Failed to load JKL model: {}", path.display()))
}

fn execute_info(path: &Path) -> Result<()> {
    use console::style;

    let model = load_model(path)?;
    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?
        .len();
    let clip = model.clip();

    println!("\n{}", style("JKL Model Information").bold().underlined());
    println!("File: {}", style(path.display()).cyan());
    println!("Size: {}", style(format_bytes(size)).yellow());

    println!("\n{}", style("Geometry").bold());
    println!("Meshes: {}", style(model.meshes().len()).green());
    println!("Vertices: {}", style(model.vertex_count()).green());
    println!(
        "Triangles: {}",
        style(model.meshes().iter().map(Mesh::triangle_count).sum::<usize>()).green()
    );

    println!("\n{}", style("Animation").bold());
    println!(
        "Duration: {}",
        style(format_duration(clip.duration(), clip.duration_seconds())).green()
    );
    println!("Ticks per second: {}", style(clip.ticks_per_second()).green());
    println!("Bones: {}", style(clip.bone_count()).green());
    println!("Hierarchy nodes: {}", style(clip.hierarchy().len()).green());

    if model.trailing_bytes() > 0 {
        println!(
            "\n{} {} trailing bytes after the node table",
            style("⚠").yellow(),
            model.trailing_bytes()
        );
    }

    let warnings = lint_model(&model);
    if !warnings.is_empty() {
        println!(
            "\n{} {} warning(s); run `model validate` for details",
            style("⚠").yellow(),
            warnings.len()
        );
    }

    Ok(())
}

fn execute_tree(path: &Path, depth: Option<usize>, no_color: bool, compact: bool) -> Result<()> {
    let model = load_model(path)?;
    let size = std::fs::metadata(path).ok().map(|m| m.len());
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let tree = model_tree(&name, &model, size, depth);
    let options = TreeOptions {
        max_depth: depth,
        no_color,
        show_metadata: !compact,
    };
    print!("{}", render_tree(&tree, &options));

    Ok(())
}

fn execute_validate(path: &Path, strict: bool) -> Result<()> {
    use console::style;

    let model = load_model(path)?;
    let warnings = lint_model(&model);

    for warning in &warnings {
        println!("{} {warning}", style("⚠").yellow());
    }

    if strict {
        validate_strict(&model).context("Validation failed")?;
    }

    if warnings.is_empty() {
        println!(
            "✓ JKL file '{}' is valid",
            style(path.display()).cyan()
        );
    } else {
        println!(
            "✓ JKL file '{}' loaded with {} warning(s)",
            style(path.display()).cyan(),
            warnings.len()
        );
    }

    Ok(())
}

fn execute_pose(path: &Path, time: f32, policy: LeafBonePolicy) -> Result<()> {
    use console::style;

    if !time.is_finite() {
        anyhow::bail!("Pose time must be finite, got {time}");
    }

    let mut model = load_model(path)?;
    let clip = model.clip_mut();
    clip.set_leaf_policy(policy);
    let visited = clip.evaluate_pose(time);

    println!(
        "Pose at {} ticks ({} nodes visited)",
        style(time).yellow(),
        visited
    );
    for (bone_id, matrix) in clip.final_transforms().iter().enumerate() {
        println!(
            "\n{} at {}",
            style(format!("Bone {bone_id}")).bold(),
            format_vec3(matrix.w_axis.truncate())
        );
        print!("{}", format_matrix(matrix, "  "));
    }

    Ok(())
}

/// Per-frame facts gathered by [`PlaybackScene`]
struct FrameRecord {
    frame: u64,
    time: f32,
    bones: usize,
}

/// Loads one model and drives it the way an interactive viewer would
struct PlaybackScene {
    path: PathBuf,
    model: Option<SkinnedModel>,
    texture: Option<TextureHandle>,
    camera: Vec3,
    records: Vec<FrameRecord>,
}

impl PlaybackScene {
    const CAMERA_SPEED: f32 = 2.5;

    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            model: None,
            texture: None,
            camera: Vec3::new(0.0, 5.0, 15.0),
            records: Vec::new(),
        }
    }
}

impl Scene for PlaybackScene {
    fn init(&mut self, ctx: &mut InitContext<'_>) -> jkl_runtime::Result<()> {
        let mut model = SkinnedModel::load(&self.path, ctx.geometry, ctx.config.leaf_bone_policy)?;
        model.play();
        self.model = Some(model);

        ctx.uniforms.set_vec3("dirLight.direction", Vec3::new(-0.2, -1.0, -0.3));
        ctx.uniforms.set_vec3("dirLight.ambient", Vec3::splat(0.8));
        ctx.uniforms.set_vec3("dirLight.diffuse", Vec3::ONE);
        ctx.uniforms.set_vec3("dirLight.specular", Vec3::ONE);
        self.texture = Some(ctx.textures.load(&ctx.config.texture)?);
        ctx.uniforms.set_int("ourTexture", 0);
        Ok(())
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>, dt: f32) -> jkl_runtime::Result<()> {
        let step = ctx.direction.to_vector() * Self::CAMERA_SPEED * dt;
        self.camera += Vec3::new(step.x, 0.0, -step.y);

        let projection = Mat4::perspective_rh_gl(
            60f32.to_radians(),
            ctx.config.aspect_ratio(),
            0.1,
            5000.0,
        );
        let view = Mat4::look_to_rh(self.camera, Vec3::NEG_Z, Vec3::Y);
        ctx.uniforms.set_mat4("projection", &projection);
        ctx.uniforms.set_mat4("view", &view);
        ctx.uniforms.set_vec3("viewPos", self.camera);

        let model = self
            .model
            .as_mut()
            .ok_or_else(|| RuntimeError::Scene("frame before init".to_string()))?;
        model.update(dt);
        model.upload_pose(ctx.uniforms);
        model.draw(ctx.uniforms, ctx.renderer);

        self.records.push(FrameRecord {
            frame: ctx.frame,
            time: model.player().current_time(),
            bones: model.player().final_bone_matrices().len(),
        });
        Ok(())
    }
}

fn execute_play(
    path: &Path,
    frames: u64,
    dt: f64,
    config_path: Option<&Path>,
    include_leaf_bones: bool,
    max_frame_delta: Option<f32>,
) -> Result<()> {
    use console::style;

    if !dt.is_finite() || dt < 0.0 {
        anyhow::bail!("Frame time must be a non-negative number of seconds, got {dt}");
    }

    let mut config = match config_path {
        Some(config_path) => EngineConfig::from_json_file(config_path).with_context(|| {
            format!("Failed to load engine config: {}", config_path.display())
        })?,
        None => EngineConfig::default(),
    };
    if include_leaf_bones {
        config = config.with_leaf_bone_policy(LeafBonePolicy::Include);
    }
    if max_frame_delta.is_some() {
        config = config.with_max_frame_delta(max_frame_delta);
    }

    let engine = Engine::new(config).context("Invalid engine configuration")?;
    let mut scene = PlaybackScene::new(path);
    let mut platform = HeadlessPlatform::new(frames, dt);
    let mut uniforms = RecordingUniforms::new();
    let mut geometry = MemoryGeometry::new();
    let mut textures = StubTextures::default();
    let mut renderer = RecordingRenderer::new();

    let summary = engine
        .run(
            &mut scene,
            Collaborators {
                platform: &mut platform,
                uniforms: &mut uniforms,
                geometry: &mut geometry,
                textures: &mut textures,
                renderer: &mut renderer,
            },
        )
        .with_context(|| format!("Playback failed: {}", path.display()))?;

    for record in &scene.records {
        println!(
            "Frame {:>4}: t = {:>8.3} ticks, {} bone matrices",
            record.frame, record.time, record.bones
        );
    }

    println!(
        "\n{} {} frames over {:.3} s, {} draw calls, {} uploads of {}",
        style("✓").green(),
        summary.frames,
        summary.elapsed,
        renderer.draws.len(),
        uniforms.array_upload_count(BONES_UNIFORM),
        BONES_UNIFORM
    );
    if let (Some(handle), Some(texture)) = (scene.texture, textures.loaded.first()) {
        println!("Texture {handle:?}: {}", texture.display());
    }

    if let Some(model) = scene.model.take() {
        model.release(&mut geometry);
    }

    Ok(())
}

fn execute_demo(output: &Path) -> Result<()> {
    use console::style;

    let model = demo_model().context("Failed to build demo model")?;
    model
        .save(output)
        .with_context(|| format!("Failed to write JKL file: {}", output.display()))?;

    println!(
        "✓ Wrote demo model to {} ({} bones, {} ticks)",
        style(output.display()).cyan(),
        model.clip().bone_count(),
        model.clip().duration()
    );
    Ok(())
}

/// A two-segment arm: the upper bone swings 90° about Z, the lower one
/// stretches along X and back over one second.
fn demo_model() -> jkl_model::Result<JklModel> {
    let vertex = |x: f32, y: f32, bone: i32| Vertex {
        position: Vec3::new(x, y, 0.0),
        normal: Vec3::Z,
        uv: glam::Vec2::new(x / 2.0, y + 0.5),
        tangent: Vec3::X,
        bitangent: Vec3::Y,
        bone_ids: [bone, NO_BONE, NO_BONE, NO_BONE],
        weights: [1.0, 0.0, 0.0, 0.0],
    };
    let mesh = Mesh::new(
        vec![
            vertex(0.0, -0.5, 0),
            vertex(1.0, -0.5, 0),
            vertex(1.0, 0.5, 0),
            vertex(0.0, 0.5, 0),
            vertex(2.0, -0.5, 1),
            vertex(2.0, 0.5, 1),
        ],
        vec![0, 1, 2, 0, 2, 3, 1, 4, 5, 1, 5, 2],
    );

    let hierarchy = SkeletonHierarchy::new(vec![
        HierarchyNode::new(NO_BONE, Mat4::IDENTITY, vec![1]),
        HierarchyNode::new(0, Mat4::IDENTITY, vec![2]),
        HierarchyNode::new(1, Mat4::from_translation(Vec3::X), vec![]),
    ])?;

    let upper = BoneTrack::new(
        0,
        vec![KeyPosition::new(Vec3::ZERO, 0.0)],
        vec![
            KeyRotation::new(Quat::IDENTITY, 0.0),
            KeyRotation::new(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2), 15.0),
            KeyRotation::new(Quat::IDENTITY, 30.0),
        ],
        vec![KeyScale::new(Vec3::ONE, 0.0)],
        Mat4::IDENTITY,
    );
    let lower = BoneTrack::new(
        1,
        vec![
            KeyPosition::new(Vec3::X, 0.0),
            KeyPosition::new(Vec3::new(1.5, 0.0, 0.0), 15.0),
            KeyPosition::new(Vec3::X, 30.0),
        ],
        vec![KeyRotation::new(Quat::IDENTITY, 0.0)],
        vec![KeyScale::new(Vec3::ONE, 0.0)],
        Mat4::from_translation(Vec3::NEG_X),
    )
    .with_rest_local(Mat4::from_translation(Vec3::X));

    let clip = AnimationClip::new(30.0, 30, hierarchy, vec![upper, lower])?;
    JklModel::new(vec![mesh], clip)
}
