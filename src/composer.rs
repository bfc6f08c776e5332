//! The desk, written down as draw recipes.
//!
//! Every object is a [`DrawRecipe`]; objects that share a UV override travel
//! together in a [`RenderGroup`] so the override is scoped to exactly those
//! draws.

use glam::{Vec2, Vec3, Vec4};

use crate::pipeline::{ShaderPipeline, Transform};
use crate::render::{GraphicsBackend, MeshKind};

/// What the fragment stage samples for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    Texture(&'static str),
    Color(Vec4),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRecipe {
    pub mesh: MeshKind,
    pub transform: Transform,
    /// `None` keeps whatever material the previous draw loaded.
    pub material: Option<&'static str>,
    pub surface: Surface,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderGroup {
    pub name: &'static str,
    pub uv_scale: Option<Vec2>,
    pub recipes: Vec<DrawRecipe>,
}

/// Per-frame draw accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub lookup_misses: usize,
    pub groups: Vec<(&'static str, usize)>,
}

/// Plays a fixed list of render groups through the pipeline.
#[derive(Debug, Clone)]
pub struct SceneComposer {
    groups: Vec<RenderGroup>,
}

impl Default for SceneComposer {
    fn default() -> Self {
        Self::new(desk_layout())
    }
}

impl SceneComposer {
    pub fn new(groups: Vec<RenderGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[RenderGroup] {
        &self.groups
    }

    pub fn draw_count(&self) -> usize {
        self.groups.iter().map(|group| group.recipes.len()).sum()
    }

    /// Issues every group in order, one draw per recipe.
    pub fn render<B>(&self, pipeline: &mut ShaderPipeline, backend: &mut B) -> FrameStats
    where
        B: GraphicsBackend + ?Sized,
    {
        let mut stats = FrameStats::default();
        for group in &self.groups {
            let misses = match group.uv_scale {
                Some(scale) => pipeline.with_uv_scale(backend, scale, |pipeline, backend| {
                    draw_all(pipeline, backend, &group.recipes)
                }),
                None => draw_all(pipeline, backend, &group.recipes),
            };
            stats.draw_calls += group.recipes.len();
            stats.lookup_misses += misses;
            stats.groups.push((group.name, group.recipes.len()));
        }
        stats
    }
}

fn draw_all<B>(pipeline: &mut ShaderPipeline, backend: &mut B, recipes: &[DrawRecipe]) -> usize
where
    B: GraphicsBackend + ?Sized,
{
    recipes
        .iter()
        .map(|recipe| draw_recipe(pipeline, backend, recipe))
        .sum()
}

/// transform, then material, then texture or color, then the draw.
/// Returns the number of failed lookups.
pub fn draw_recipe<B>(pipeline: &mut ShaderPipeline, backend: &mut B, recipe: &DrawRecipe) -> usize
where
    B: GraphicsBackend + ?Sized,
{
    let mut misses = 0;
    pipeline.set_transform(backend, &recipe.transform);
    if let Some(material) = recipe.material {
        misses += usize::from(pipeline.set_material(backend, material).is_err());
    }
    match recipe.surface {
        Surface::Texture(tag) => {
            misses += usize::from(pipeline.set_texture(backend, tag).is_err());
            backend.draw_mesh(recipe.mesh);
        }
        Surface::Color(color) => {
            pipeline.with_solid_color(backend, color, |_, backend| {
                backend.draw_mesh(recipe.mesh)
            });
        }
    }
    misses
}

fn place(scale: Vec3, position: Vec3) -> Transform {
    Transform::new(scale, Vec3::ZERO, position)
}

fn recipe(
    mesh: MeshKind,
    transform: Transform,
    material: Option<&'static str>,
    surface: Surface,
) -> DrawRecipe {
    DrawRecipe {
        mesh,
        transform,
        material,
        surface,
    }
}

/// Every group of the desk, in draw order.
pub fn desk_layout() -> Vec<RenderGroup> {
    vec![
        table(),
        monitor(),
        keyboard(),
        keyboard_keys(),
        mouse(),
        books(),
        pencil_holder(),
        pencils(),
    ]
}

fn table() -> RenderGroup {
    RenderGroup {
        name: "table",
        uv_scale: Some(Vec2::splat(5.0)),
        recipes: vec![recipe(
            MeshKind::Plane,
            place(Vec3::new(20.0, 1.0, 10.0), Vec3::new(0.0, -0.5, 0.0)),
            Some("wood"),
            Surface::Texture("tabletop"),
        )],
    }
}

fn monitor() -> RenderGroup {
    RenderGroup {
        name: "monitor",
        uv_scale: None,
        recipes: vec![
            recipe(
                MeshKind::Box,
                place(Vec3::new(2.0, 0.2, 0.5), Vec3::new(0.0, 0.1, 0.0)),
                Some("metal"),
                Surface::Texture("brushed_metal"),
            ),
            recipe(
                MeshKind::Box,
                place(Vec3::new(8.0, 5.0, 0.5), Vec3::new(0.0, 3.0, 0.0)),
                Some("metal"),
                Surface::Texture("matte_plastic"),
            ),
            recipe(
                MeshKind::Box,
                place(Vec3::new(7.5, 4.5, 0.1), Vec3::new(0.0, 3.0, 0.26)),
                Some("glass"),
                Surface::Color(Vec4::ONE),
            ),
        ],
    }
}

fn keyboard() -> RenderGroup {
    RenderGroup {
        name: "keyboard",
        uv_scale: None,
        recipes: vec![recipe(
            MeshKind::Box,
            place(Vec3::new(6.0, 0.2, 1.5), Vec3::new(0.0, -0.2, 2.5)),
            Some("metal"),
            Surface::Texture("matte_plastic"),
        )],
    }
}

const KEY_ROWS: usize = 4;
const KEY_COLUMNS: usize = 10;
const KEY_SPACING: Vec2 = Vec2::new(0.4, 0.4);

fn keyboard_keys() -> RenderGroup {
    let start = Vec3::new(-1.8, -0.08, 2.0);
    let scale = Vec3::new(0.35, 0.1, 0.35);
    let recipes = (0..KEY_ROWS)
        .flat_map(|row| (0..KEY_COLUMNS).map(move |column| (row, column)))
        .map(|(row, column)| {
            let position = start
                + Vec3::new(
                    column as f32 * KEY_SPACING.x,
                    0.0,
                    row as f32 * KEY_SPACING.y,
                );
            recipe(
                MeshKind::Box,
                place(scale, position),
                None,
                Surface::Texture("keycaps"),
            )
        })
        .collect();
    RenderGroup {
        name: "keyboard keys",
        uv_scale: Some(Vec2::splat(4.0)),
        recipes,
    }
}

fn mouse() -> RenderGroup {
    RenderGroup {
        name: "mouse",
        uv_scale: None,
        recipes: vec![recipe(
            MeshKind::Sphere,
            place(Vec3::new(0.5, 0.3, 0.8), Vec3::new(3.5, -0.15, 2.5)),
            Some("metal"),
            Surface::Texture("brushed_metal"),
        )],
    }
}

/// Three stacked books, nudged alternately left/right by index parity.
fn books() -> RenderGroup {
    const COVERS: [(&str, &str); 3] = [
        ("cover_fabric", "fabric"),
        ("cover_leather", "wood"),
        ("cover_floral", "plate"),
    ];
    let base_scale = Vec3::new(2.8, 0.3, 1.8);
    let spacing = 0.05;
    let mut stack = Vec3::new(-6.5, 0.2, 0.0);

    let mut recipes = Vec::with_capacity(COVERS.len());
    for (index, (texture, material)) in COVERS.into_iter().enumerate() {
        let even = index % 2 == 0;
        let mut scale = base_scale;
        match index {
            1 => scale.y *= 1.2,
            2 => scale.y *= 1.1,
            _ => {}
        }
        let nudge = if even {
            Vec3::new(-0.1, 0.0, 0.05)
        } else {
            Vec3::new(0.1, 0.0, -0.05)
        };
        let yaw = match (index, even) {
            (0, _) => 0.0,
            (_, true) => -5.0,
            (_, false) => 5.0,
        };
        recipes.push(recipe(
            MeshKind::Box,
            Transform::new(scale, Vec3::new(0.0, yaw, 0.0), stack + nudge),
            Some(material),
            Surface::Texture(texture),
        ));
        stack.y += scale.y + spacing;
    }
    RenderGroup {
        name: "books",
        uv_scale: None,
        recipes,
    }
}

fn pencil_holder() -> RenderGroup {
    RenderGroup {
        name: "pencil holder",
        uv_scale: None,
        recipes: vec![recipe(
            MeshKind::Cylinder,
            place(Vec3::new(0.6, 1.2, 0.6), Vec3::new(6.0, 0.6, 0.0)),
            Some("metal"),
            Surface::Texture("holder_ceramic"),
        )],
    }
}

/// Five pencils fanned out of the holder; tilt and color are fixed per index.
fn pencils() -> RenderGroup {
    const TILTS: [f32; 5] = [-10.0, 5.0, 15.0, -20.0, 10.0];
    const COLORS: [Vec3; 5] = [
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(1.0, 0.5, 0.0),
    ];
    let scale = Vec3::new(0.05, 1.8, 0.05);
    let base = Vec3::new(6.0, 1.4, 0.0);

    let recipes = TILTS
        .into_iter()
        .zip(COLORS)
        .enumerate()
        .map(|(index, (tilt, color))| {
            let even = index % 2 == 0;
            let offset = Vec3::new(
                if even { -0.1 } else { 0.1 },
                index as f32 * 0.1,
                if even { -0.05 } else { 0.05 },
            );
            recipe(
                MeshKind::Cylinder,
                Transform::new(scale, Vec3::new(tilt, 0.0, 0.0), base + offset),
                None,
                Surface::Color(color.extend(1.0)),
            )
        })
        .collect();
    RenderGroup {
        name: "pencils",
        uv_scale: None,
        recipes,
    }
}
