use grass_block::data_structures::geometry::{BoxGeometry, PlaneGeometry};

#[test]
fn box_has_six_faces_with_one_group_each() {
    let geometry = BoxGeometry::new(4.0, 4.0, 4.0).build();
    assert_eq!(geometry.vertex_count(), 24);
    assert_eq!(geometry.indices.len(), 36);
    assert_eq!(geometry.groups.len(), 6);
    for (idx, group) in geometry.groups.iter().enumerate() {
        assert_eq!(group.material_index, idx);
        assert_eq!(group.start, idx as u32 * 6);
        assert_eq!(group.count, 6);
    }
}

#[test]
fn box_faces_follow_px_nx_py_ny_pz_nz_order() {
    let geometry = BoxGeometry::new(4.0, 4.0, 4.0).build();
    let expected = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];
    for (face, normal) in expected.iter().enumerate() {
        for vertex in face * 4..face * 4 + 4 {
            assert_eq!(&geometry.normals[vertex], normal, "face {face}");
            // Every vertex sits on its face's plane
            let axis = normal.iter().position(|c| *c != 0.0).unwrap();
            assert_eq!(geometry.positions[vertex][axis], normal[axis] * 2.0);
        }
    }
}

#[test]
fn box_is_centred_with_the_requested_extents() {
    let geometry = BoxGeometry::new(2.0, 4.0, 6.0).build();
    let (min, max) = geometry.bounds();
    assert_eq!(min, [-1.0, -2.0, -3.0]);
    assert_eq!(max, [1.0, 2.0, 3.0]);
}

#[test]
fn box_triangles_wind_counter_clockwise_from_outside() {
    let geometry = BoxGeometry::new(4.0, 4.0, 4.0).build();
    for tri in geometry.indices.chunks(3) {
        let [a, b, c] = [0, 1, 2].map(|i| cgmath::Vector3::from(geometry.positions[tri[i] as usize]));
        let face_normal = (b - a).cross(c - a);
        let normal = cgmath::Vector3::from(geometry.normals[tri[0] as usize]);
        assert!(cgmath::InnerSpace::dot(face_normal, normal) > 0.0);
    }
}

#[test]
fn box_tex_coords_span_each_face() {
    let geometry = BoxGeometry::new(4.0, 4.0, 4.0).build();
    for face in geometry.tex_coords.chunks(4) {
        assert_eq!(face, &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
    }
}

#[test]
fn segmented_box_grows_its_grid() {
    let mut shape = BoxGeometry::new(1.0, 1.0, 1.0);
    shape.width_segments = 2;
    let geometry = shape.build();
    // ±X faces 2x2 vertices, the four others 3x2
    assert_eq!(geometry.vertex_count(), 2 * 4 + 4 * 6);
    assert_eq!(geometry.indices.len(), 6 * (2 * 1 + 4 * 2));
}

#[test]
fn plane_faces_plus_z_with_one_implicit_group() {
    let geometry = PlaneGeometry::new(20.0, 20.0).build();
    assert_eq!(geometry.vertex_count(), 4);
    assert_eq!(geometry.indices.len(), 6);
    assert!(geometry.groups.is_empty());
    assert!(geometry.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));

    let groups = geometry.draw_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].count, 6);
    assert_eq!(groups[0].material_index, 0);

    let (min, max) = geometry.bounds();
    assert_eq!(min, [-10.0, -10.0, 0.0]);
    assert_eq!(max, [10.0, 10.0, 0.0]);
}

#[test]
fn vertices_interleave_position_uv_and_normal() {
    let geometry = PlaneGeometry::new(2.0, 2.0).build();
    let vertices = geometry.vertices();
    assert_eq!(vertices.len(), 4);
    assert_eq!(vertices[0].position, [-1.0, 1.0, 0.0]);
    assert_eq!(vertices[0].tex_coords, [0.0, 0.0]);
    assert_eq!(vertices[3].position, [1.0, -1.0, 0.0]);
    assert_eq!(vertices[3].tex_coords, [1.0, 1.0]);
}
