//! Flat scene graph.
//!
//! The scene is a list of [`Object3D`]s addressed by [`NodeId`]. Objects never
//! move between slots, so an id handed out by [`Scene::add`] stays valid for the
//! lifetime of the scene. GPU resources are not stored here: mesh nodes refer
//! to a model slot owned by whoever renders the scene, which keeps the graph
//! itself usable without a device.

use crate::data_structures::{
    light::{AmbientLight, DirectionalLight},
    transform::{Transform, TransformRaw},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Index of a GPU model in the renderer's model list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelSlot(pub usize);

/// The three coloured coordinate axes, drawn as lines from the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxesHelper {
    pub size: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl AxesHelper {
    pub fn new(size: f32) -> Self {
        Self { size }
    }

    /// Line list: X red, Y green, Z blue.
    pub fn line_vertices(&self) -> Vec<LineVertex> {
        let s = self.size;
        let axes = [
            ([s, 0.0, 0.0], [1.0, 0.0, 0.0]),
            ([0.0, s, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, s], [0.0, 0.0, 1.0]),
        ];
        axes.into_iter()
            .flat_map(|(end, color)| {
                [
                    LineVertex {
                        position: [0.0; 3],
                        color,
                    },
                    LineVertex {
                        position: end,
                        color,
                    },
                ]
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ObjectKind {
    Mesh(ModelSlot),
    AxesHelper(AxesHelper),
    AmbientLight(AmbientLight),
    DirectionalLight(DirectionalLight),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub kind: ObjectKind,
}

impl Object3D {
    pub fn new(name: &str, kind: ObjectKind) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::default(),
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
            kind,
        }
    }

    pub fn mesh(name: &str, slot: ModelSlot) -> Self {
        Self::new(name, ObjectKind::Mesh(slot))
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_cast_shadow(mut self, cast_shadow: bool) -> Self {
        self.cast_shadow = cast_shadow;
        self
    }

    pub fn with_receive_shadow(mut self, receive_shadow: bool) -> Self {
        self.receive_shadow = receive_shadow;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Instance data for the object's model, shadow flag included.
    pub fn to_raw(&self) -> TransformRaw {
        self.transform
            .to_raw()
            .with_receive_shadow(self.receive_shadow)
    }

    pub fn model_slot(&self) -> Option<ModelSlot> {
        match self.kind {
            ObjectKind::Mesh(slot) => Some(slot),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    objects: Vec<Object3D>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: Object3D) -> NodeId {
        log::debug!("adding {} to the scene", object.name);
        self.objects.push(object);
        NodeId(self.objects.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&Object3D> {
        self.objects.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Object3D> {
        self.objects.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = (NodeId, &Object3D)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(idx, object)| (NodeId(idx), object))
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.objects().find(|(_, o)| o.name == name).map(|(id, _)| id)
    }

    /// Sets the visibility flag of one object and nothing else.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        match self.get_mut(id) {
            Some(object) => {
                object.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Visible meshes with their model slots.
    pub fn visible_meshes(&self) -> impl Iterator<Item = (&Object3D, ModelSlot)> {
        self.objects
            .iter()
            .filter(|o| o.visible)
            .filter_map(|o| o.model_slot().map(|slot| (o, slot)))
    }

    pub fn visible_axes(&self) -> impl Iterator<Item = &AxesHelper> {
        self.objects.iter().filter(|o| o.visible).filter_map(|o| match &o.kind {
            ObjectKind::AxesHelper(axes) => Some(axes),
            _ => None,
        })
    }

    /// Sum of all visible ambient lights.
    pub fn ambient_radiance(&self) -> [f32; 3] {
        self.objects
            .iter()
            .filter(|o| o.visible)
            .filter_map(|o| match &o.kind {
                ObjectKind::AmbientLight(light) => Some(light.radiance()),
                _ => None,
            })
            .fold([0.0; 3], |acc, r| [acc[0] + r[0], acc[1] + r[1], acc[2] + r[2]])
    }

    /// The first visible directional light and whether it casts shadows.
    pub fn directional_light(&self) -> Option<(&DirectionalLight, bool)> {
        self.objects
            .iter()
            .filter(|o| o.visible)
            .find_map(|o| match &o.kind {
                ObjectKind::DirectionalLight(light) => Some((light, o.cast_shadow)),
                _ => None,
            })
    }
}
