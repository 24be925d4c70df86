//! The grass block scene: a textured cube spinning above a wooden floor,
//! lit by an ambient and a shadow casting directional light.

use std::f32::consts::FRAC_PI_2;

use instant::Duration;
use winit::{
    event::{ElementState, WindowEvent},
    keyboard::Key,
};

use crate::{
    animation::AnimationDriver,
    config::SceneConfig,
    context::{Context, InitContext},
    data_structures::{
        geometry::{BoxGeometry, PlaneGeometry},
        light::{AmbientLight, DirectionalLight},
        model::{Material, Mesh, Model, Shading},
        scene_graph::{AxesHelper, ModelSlot, NodeId, Object3D, ObjectKind, Scene},
        texture::Texture,
        transform::Transform,
    },
    flow::{FlowConstructor, GraphicsFlow, Out},
    pipelines::{axes::AxesLines, light::LightUniform},
    render::Render,
    resources::load_textures,
};

pub const CUBE_SIZE: f32 = 4.0;
pub const FLOOR_SIZE: f32 = 20.0;
pub const FLOOR_HEIGHT: f32 = -3.0;
pub const AXES_SIZE: f32 = 5.0;

pub const CUBE_SLOT: ModelSlot = ModelSlot(0);
pub const FLOOR_SLOT: ModelSlot = ModelSlot(1);

pub const FLOOR_TEXTURE: &str = "textures/floor_wood.png";
pub const GRASS_TOP_TEXTURE: &str = "textures/grass_top.png";
pub const GRASS_SIDE_TEXTURE: &str = "textures/grass_side.png";
pub const GRASS_BOTTOM_TEXTURE: &str = "textures/grass_bottom.png";

/// Textures of the cube faces in box group order (+X, -X, +Y, -Y, +Z, -Z).
pub const CUBE_FACE_TEXTURES: [&str; 6] = [
    GRASS_SIDE_TEXTURE,
    GRASS_SIDE_TEXTURE,
    GRASS_TOP_TEXTURE,
    GRASS_BOTTOM_TEXTURE,
    GRASS_SIDE_TEXTURE,
    GRASS_SIDE_TEXTURE,
];

/// Node ids of everything the flow touches after setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneNodes {
    pub axes: NodeId,
    pub ambient: NodeId,
    pub sun: NodeId,
    pub cube: NodeId,
    pub floor: NodeId,
}

pub fn ambient_light() -> AmbientLight {
    AmbientLight::new(0xffffff, 0.4)
}

pub fn sun_light() -> DirectionalLight {
    DirectionalLight::new(0xffffff, 1.0).with_position([-5.0, 3.0, -10.0])
}

/// Lies flat, facing up, three units below the cube's centre.
pub fn floor_transform() -> Transform {
    Transform::new()
        .with_position([0.0, FLOOR_HEIGHT, 0.0])
        .with_rotation_x(cgmath::Rad(-FRAC_PI_2))
}

/// The scene graph without any GPU resources: axes, lights, cube and floor
/// in that order.
pub fn build_scene(config: &SceneConfig) -> (Scene, SceneNodes) {
    let mut scene = Scene::new();
    let axes = scene.add(
        Object3D::new("axes", ObjectKind::AxesHelper(AxesHelper::new(AXES_SIZE)))
            .with_visible(config.show_axes),
    );
    let ambient = scene.add(Object3D::new(
        "ambient light",
        ObjectKind::AmbientLight(ambient_light()),
    ));
    let sun = scene.add(
        Object3D::new("sun", ObjectKind::DirectionalLight(sun_light())).with_cast_shadow(true),
    );
    let cube = scene.add(Object3D::mesh("grass block", CUBE_SLOT).with_cast_shadow(true));
    let floor = scene.add(
        Object3D::mesh("floor", FLOOR_SLOT)
            .with_transform(floor_transform())
            .with_receive_shadow(true),
    );
    (
        scene,
        SceneNodes {
            axes,
            ambient,
            sun,
            cube,
            floor,
        },
    )
}

pub struct GrassBlock {
    scene: Scene,
    nodes: SceneNodes,
    models: Vec<Model>,
    axes: AxesLines,
    driver: AnimationDriver,
}

impl GrassBlock {
    pub async fn new(ctx: InitContext, config: SceneConfig) -> anyhow::Result<Self> {
        let (scene, nodes) = build_scene(&config);

        let textures = load_textures(
            &[
                GRASS_SIDE_TEXTURE,
                GRASS_TOP_TEXTURE,
                GRASS_BOTTOM_TEXTURE,
                FLOOR_TEXTURE,
            ],
            &ctx.device,
            &ctx.queue,
        )
        .await?;
        let [side, top, bottom, wood]: [Texture; 4] = textures
            .try_into()
            .map_err(|t: Vec<Texture>| anyhow::anyhow!("expected 4 textures, got {}", t.len()))?;

        let face_textures = [&side, &side, &top, &bottom, &side, &side];
        let cube_materials = CUBE_FACE_TEXTURES
            .iter()
            .zip(face_textures)
            .map(|(name, texture)| {
                Material::new(
                    &ctx.device,
                    name,
                    Shading::Basic,
                    texture.clone(),
                    &ctx.material_layout,
                )
            })
            .collect();
        let cube_mesh = Mesh::from_geometry(
            &ctx.device,
            "grass block",
            &BoxGeometry::new(CUBE_SIZE, CUBE_SIZE, CUBE_SIZE).build(),
        );

        let floor_material = Material::new(
            &ctx.device,
            FLOOR_TEXTURE,
            Shading::Standard,
            wood,
            &ctx.material_layout,
        );
        let floor_mesh = Mesh::from_geometry(
            &ctx.device,
            "floor",
            &PlaneGeometry::new(FLOOR_SIZE, FLOOR_SIZE).build(),
        );

        let raw_of = |id: NodeId| {
            scene
                .get(id)
                .map(Object3D::to_raw)
                .ok_or_else(|| anyhow::anyhow!("scene node {} is missing", id.index()))
        };
        // Indexed by CUBE_SLOT and FLOOR_SLOT
        let models = vec![
            Model::new(&ctx.device, cube_mesh, cube_materials, raw_of(nodes.cube)?),
            Model::new(&ctx.device, floor_mesh, vec![floor_material], raw_of(nodes.floor)?),
        ];

        let axes = AxesLines::new(&ctx.device, &AxesHelper::new(AXES_SIZE));
        log::info!("grass block scene built with {} objects", scene.len());

        Ok(Self {
            scene,
            nodes,
            models,
            axes,
            driver: AnimationDriver::new(config.spin_speed),
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn nodes(&self) -> SceneNodes {
        self.nodes
    }

    pub fn toggle_axes(&mut self) {
        let visible = self
            .scene
            .get(self.nodes.axes)
            .is_some_and(|axes| axes.visible);
        self.scene.set_visible(self.nodes.axes, !visible);
        log::debug!("axes helper {}", if visible { "hidden" } else { "shown" });
    }

    /// Boxed constructor for [`crate::flow::run`].
    pub fn constructor(config: SceneConfig) -> FlowConstructor {
        Box::new(move |ctx| {
            Box::pin(async move {
                let flow: Box<dyn GraphicsFlow> = Box::new(GrassBlock::new(ctx, config).await?);
                Ok(flow)
            })
        })
    }
}

impl GraphicsFlow for GrassBlock {
    fn on_init(&mut self, ctx: &mut Context) -> Out {
        let uniform = LightUniform::from_scene(
            &self.scene,
            ctx.renderer.shadow_map_enabled,
            ctx.light.shadow_map_size(),
        );
        ctx.light.update(&ctx.queue, uniform);
        self.driver.start();
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _dt: Duration) -> Out {
        let Some(cube) = self.scene.get_mut(self.nodes.cube) else {
            return Out::Empty;
        };
        self.driver.tick(&mut cube.transform);
        if let Some(model) = self.models.get(CUBE_SLOT.0) {
            model.write_transform(&ctx.queue, cube.to_raw());
        }
        Out::Empty
    }

    fn on_window_events(&mut self, _ctx: &Context, event: &WindowEvent) -> Out {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if event.state == ElementState::Pressed && !event.repeat {
                if let Key::Character(c) = &event.logical_key {
                    if c.eq_ignore_ascii_case("a") {
                        self.toggle_axes();
                    }
                }
            }
        }
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::from_scene(&self.scene, &self.models, Some(&self.axes))
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &mut self,
        _ctx: &Context,
        _texture: &image::RgbaImage,
    ) -> Result<crate::flow::ImageTestResult, anyhow::Error> {
        Ok(crate::flow::ImageTestResult::Passed)
    }
}
