//! Loads rooms from STL files on disk and runs them through the whole core.

#![allow(clippy::unwrap_used)]

use std::fmt::Write as _;
use std::path::PathBuf;

use approx::assert_relative_eq;
use roomstudio::acoustics::WallMaterial;
use roomstudio::config::StudioConfig;
use roomstudio::error::{DegenerateMeshError, MeshLoadError};
use roomstudio::math::{Point2, Point3};
use roomstudio::picking::{OrbitCamera, Viewport};
use roomstudio::registry::{Appearance, Rgb};
use roomstudio::room::RoomModel;
use roomstudio::StudioError;

type Tri = [[f64; 3]; 3];

/// Outward-wound faces of an axis-aligned box, two triangles per face.
fn box_faces(min: [f64; 3], max: [f64; 3]) -> Vec<Tri> {
    let c = |x: usize, y: usize, z: usize| {
        [
            if x == 1 { max[0] } else { min[0] },
            if y == 1 { max[1] } else { min[1] },
            if z == 1 { max[2] } else { min[2] },
        ]
    };
    let quads = [
        [c(0, 0, 0), c(0, 1, 0), c(1, 1, 0), c(1, 0, 0)],
        [c(0, 0, 1), c(1, 0, 1), c(1, 1, 1), c(0, 1, 1)],
        [c(0, 0, 0), c(1, 0, 0), c(1, 0, 1), c(0, 0, 1)],
        [c(0, 1, 0), c(0, 1, 1), c(1, 1, 1), c(1, 1, 0)],
        [c(0, 0, 0), c(0, 0, 1), c(0, 1, 1), c(0, 1, 0)],
        [c(1, 0, 0), c(1, 1, 0), c(1, 1, 1), c(1, 0, 1)],
    ];
    quads
        .iter()
        .flat_map(|[a, b, c, d]| [[*a, *b, *c], [*a, *c, *d]])
        .collect()
}

fn ascii_stl(name: &str, tris: &[Tri]) -> String {
    let mut out = format!("solid {name}\n");
    for tri in tris {
        // Zero normals make the loader derive them from the winding.
        out.push_str("facet normal 0 0 0\n  outer loop\n");
        for v in tri {
            writeln!(out, "    vertex {} {} {}", v[0], v[1], v[2]).unwrap();
        }
        out.push_str("  endloop\nendfacet\n");
    }
    writeln!(out, "endsolid {name}").unwrap();
    out
}

fn write_room(file: &str, tris: &[Tri]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("roomstudio-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(file);
    std::fs::write(&path, ascii_stl("room", tris)).unwrap();
    path
}

#[test]
fn shoebox_room_end_to_end() {
    let path = write_room("shoebox.stl", &box_faces([0.0, 0.0, 0.0], [500.0, 400.0, 300.0]));
    let mut config = StudioConfig::default();
    config.export.scale_factor = 1.0 / 100.0;
    let mut room = RoomModel::load(&path, &config).unwrap();

    assert_eq!(room.mesh().triangle_count(), 12);
    assert_eq!(room.segmentation().len(), 6);
    let report = room.report();
    assert!(report.is_watertight);
    assert!(report.is_manifold);

    let center = room.room_center().unwrap();
    assert_relative_eq!(center.center, Point3::new(250.0, 200.0, 150.0), epsilon = 1e-6);
    assert_relative_eq!(center.volume, 500.0 * 400.0 * 300.0, max_relative = 1e-9);

    // Click the middle of the viewport: the camera looks at the room center,
    // so some wall is always hit.
    let camera = OrbitCamera::framing(&room.mesh().bounds());
    let viewport = Viewport::new(800.0, 600.0);
    let ray = camera.ray_through(Point2::new(400.0, 300.0), &viewport).unwrap();
    let green = Rgb::new(0.0, 1.0, 0.0);
    let surface = room.highlight_at(ray, green).unwrap().unwrap();
    assert_eq!(room.registry().appearance(surface).unwrap(), Appearance::Flat(green));

    room.set_wall_material(surface, WallMaterial::new(0.05, 0.3)).unwrap();
    let scene = room
        .scene_builder()
        .unwrap()
        .microphones([Point3::new(1.0, 1.0, 1.5), Point3::new(1.0, 1.4, 1.5)])
        .build()
        .unwrap();
    assert_eq!(scene.walls.len(), 12);
    assert_relative_eq!(scene.source, Point3::new(2.5, 2.0, 1.5), epsilon = 1e-9);
    for wall in &scene.walls {
        let expected = if wall.surface == surface { 0.05 } else { 0.2 };
        assert_relative_eq!(wall.absorption, expected);
        for v in &wall.vertices {
            assert!(v.x <= 5.0 + 1e-9 && v.y <= 4.0 + 1e-9 && v.z <= 3.0 + 1e-9);
        }
    }

    let json = serde_json::to_value(room.summary()).unwrap();
    assert_eq!(json["surfaces"].as_array().unwrap().len(), 6);
    assert_eq!(json["walls"], 12);
}

#[test]
fn open_room_loads_but_has_no_center() {
    let faces: Vec<Tri> = box_faces([0.0, 0.0, 0.0], [1.0, 1.0, 1.0])
        .into_iter()
        .skip(2)
        .collect();
    let path = write_room("open.stl", &faces);
    let room = RoomModel::load(&path, &StudioConfig::default()).unwrap();
    assert_eq!(room.report().boundary_edges, 4);
    assert!(matches!(
        room.room_center(),
        Err(StudioError::Degenerate(DegenerateMeshError::NotClosed { boundary_edges: 4 }))
    ));
}

#[test]
fn config_file_changes_segmentation() {
    let dir = std::env::temp_dir().join(format!("roomstudio-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let config_path = dir.join("merge.json");
    std::fs::write(&config_path, r#"{ "segmentation": { "angle_threshold_degrees": 120.0 } }"#)
        .unwrap();
    let config = StudioConfig::from_path(&config_path).unwrap();

    let path = write_room("merged.stl", &box_faces([0.0, 0.0, 0.0], [2.0, 2.0, 2.0]));
    let room = RoomModel::load(&path, &config).unwrap();
    assert_eq!(room.segmentation().len(), 1);
    assert!(room.feature_edges().is_empty());
}

#[test]
fn failed_load_reports_cause() {
    let err = RoomModel::load("/nonexistent/room.stl", &StudioConfig::default()).unwrap_err();
    assert!(matches!(err, StudioError::MeshLoad(MeshLoadError::NotFound(_))));

    let err = RoomModel::load("room.fbx", &StudioConfig::default()).unwrap_err();
    assert!(matches!(err, StudioError::MeshLoad(MeshLoadError::NotYetSupported(_))));
}
