//! Render composition and pipeline batching.
//!
//! Flows describe what they want drawn with a [`Render`] tree. The engine
//! flattens it into one batch per pipeline and records two passes per frame:
//! the shadow pass from the directional light, then the main pass into the
//! surface.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the enum describing render operations
//! - [`Drawable<'a>`] is a model together with its shadow flags
//! - [`Batches<'a>`] is the flattened render tree

use crate::{
    context::{Context, RenderTargets},
    data_structures::{
        model::{DrawModel, Model, Shading},
        scene_graph::Scene,
    },
    pipelines::axes::AxesLines,
};

/// A model and how it takes part in shadowing.
#[derive(Clone, Copy, Debug)]
pub struct Drawable<'a> {
    pub model: &'a Model,
    pub cast_shadow: bool,
}

/// Specifies how a scene object should be rendered.
///
/// - `Basic` renders an unlit textured model
/// - `Standard` renders a lit model that samples the shadow map
/// - `Lines` renders a line list such as the axes helper
/// - `Composed` renders each child in turn
#[derive(Debug)]
pub enum Render<'a> {
    Basic(Drawable<'a>),
    Standard(Drawable<'a>),
    Lines(&'a AxesLines),
    Composed(Vec<Render<'a>>),
}

/// The render tree flattened into one list per pipeline.
#[derive(Debug, Default)]
pub struct Batches<'a> {
    pub basics: Vec<Drawable<'a>>,
    pub standards: Vec<Drawable<'a>>,
    pub lines: Vec<&'a AxesLines>,
}

impl<'a> Batches<'a> {
    /// Everything that writes into the shadow map.
    pub fn shadow_casters(&self) -> impl Iterator<Item = &Drawable<'a>> {
        self.standards
            .iter()
            .chain(self.basics.iter())
            .filter(|d| d.cast_shadow)
    }
}

impl<'a> Render<'a> {
    /// Visible meshes of `scene` in insertion order, then the axes helper.
    ///
    /// Mesh nodes pick their model out of `models` by slot; a slot without a
    /// model is skipped with a warning. The axes helper is drawn from `axes`
    /// when it is visible. Lights draw nothing themselves.
    pub fn from_scene(scene: &Scene, models: &'a [Model], axes: Option<&'a AxesLines>) -> Self {
        let meshes = scene.visible_meshes().filter_map(|(object, slot)| {
            let Some(model) = models.get(slot.0) else {
                log::warn!("{} refers to missing model slot {}", object.name, slot.0);
                return None;
            };
            let drawable = Drawable {
                model,
                cast_shadow: object.cast_shadow,
            };
            Some(match model.shading() {
                Shading::Basic => Render::Basic(drawable),
                Shading::Standard => Render::Standard(drawable),
            })
        });
        let lines = axes
            .filter(|_| scene.visible_axes().next().is_some())
            .map(Render::Lines);
        Render::Composed(meshes.chain(lines).collect())
    }

    /// Sort the render tree into `batches`.
    pub fn set_pipelines(self, batches: &mut Batches<'a>) {
        match self {
            Render::Basic(drawable) => batches.basics.push(drawable),
            Render::Standard(drawable) => batches.standards.push(drawable),
            Render::Lines(lines) => batches.lines.push(lines),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(batches)),
        }
    }
}

/// Records the shadow pass and the main pass for one frame into `encoder`.
///
/// `target` is the view the frame ends up in and `targets` must have been
/// created with the same size.
pub fn draw_frame(
    ctx: &Context,
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    targets: &RenderTargets,
    batches: &Batches,
) {
    if ctx.renderer.shadow_map_enabled && ctx.light.uniform.shadows_enabled() {
        let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.light.shadow_map.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        shadow_pass.set_pipeline(&ctx.pipelines.shadow);
        shadow_pass.set_bind_group(0, &ctx.light.shadow_bind_group, &[]);
        for caster in batches.shadow_casters() {
            shadow_pass.draw_model_depth(caster.model);
        }
    }

    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Render Pass"),
        color_attachments: &[Some(targets.color_attachment(target, ctx.clear_colour))],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &targets.depth.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        occlusion_query_set: None,
        timestamp_writes: None,
    });

    if !batches.standards.is_empty() {
        render_pass.set_pipeline(&ctx.pipelines.standard);
        for drawable in &batches.standards {
            render_pass.draw_model(
                drawable.model,
                &ctx.camera.bind_group,
                Some(&ctx.light.bind_group),
            );
        }
    }

    if !batches.basics.is_empty() {
        render_pass.set_pipeline(&ctx.pipelines.basic);
        for drawable in &batches.basics {
            render_pass.draw_model(drawable.model, &ctx.camera.bind_group, None);
        }
    }

    if !batches.lines.is_empty() {
        render_pass.set_pipeline(&ctx.pipelines.axes);
        render_pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
        for lines in &batches.lines {
            render_pass.set_vertex_buffer(0, lines.vertex_buffer.slice(..));
            render_pass.draw(0..lines.vertex_count, 0..1);
        }
    }
}
