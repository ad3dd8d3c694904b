use std::fs;
use std::path::Path;

use draco_bridge::{
    decode, decode_file, encode, encode_file, register_file_io, Advisory, BridgeError,
    EncodeOptions, ErrorKind, OutputFormat,
};
use draco_core::GeometryKind;
use draco_io::{ObjReader, PlyReader};
use tempfile::TempDir;

const CUBE_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 4 3 2
f 5 6 7 8
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4 1 5 8
";

// Position 1 is used with two different texture coordinates.
const SPLIT_QUAD_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vt 0.5 0.5
f 1/1 2/2 3/3
f 1/5 3/3 4/4
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        register_file_io();
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_str().unwrap().to_string()
    }

    fn write(&self, name: &str, contents: &str) -> String {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

fn exists(path: &str) -> bool {
    Path::new(path).exists()
}

#[test]
fn quantization_bits_above_thirty_fail_without_output() {
    let fx = Fixture::new();
    let input = fx.write("cube.obj", CUBE_OBJ);
    let output = fx.path("cube.drc");

    let variants = [
        EncodeOptions { pos_quantization_bits: 31, ..Default::default() },
        EncodeOptions { tex_coords_quantization_bits: 31, ..Default::default() },
        EncodeOptions { normals_quantization_bits: 64, ..Default::default() },
        EncodeOptions { generic_quantization_bits: 31, ..Default::default() },
    ];
    for options in &variants {
        assert!(!encode(&input, &output, options));
        assert!(!exists(&output));
        let err = encode_file(&input, &output, options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
    }
}

#[test]
fn negative_position_bits_fail() {
    let fx = Fixture::new();
    let input = fx.write("cube.obj", CUBE_OBJ);
    let output = fx.path("cube.drc");
    let options = EncodeOptions { pos_quantization_bits: -1, ..Default::default() };
    assert!(!encode(&input, &output, &options));
    assert!(matches!(
        encode_file(&input, &output, &options),
        Err(BridgeError::PositionSkipped)
    ));
    assert!(!exists(&output));
}

#[test]
fn compression_level_maps_to_speed() {
    let fx = Fixture::new();
    let input = fx.write("cube.obj", CUBE_OBJ);
    for (level, speed) in [(7, 3), (0, 10), (10, 0)] {
        let output = fx.path(&format!("cube_{}.drc", level));
        let options = EncodeOptions { compression_level: level, ..Default::default() };
        let report = encode_file(&input, &output, &options).unwrap();
        assert_eq!(report.speed, speed);
        assert_eq!(report.geometry, GeometryKind::Mesh);
        assert_eq!(report.encoded_size as u64, fs::metadata(&output).unwrap().len());
        if level < 10 {
            assert_eq!(
                report.advisories,
                vec![Advisory::IncreaseCompressionLevel { current: level }]
            );
        } else {
            assert!(report.advisories.is_empty());
        }
    }
}

#[test]
fn mesh_round_trip_keeps_topology() {
    let fx = Fixture::new();
    let input = fx.write("cube.obj", CUBE_OBJ);
    let encoded = fx.path("cube.drc");
    let decoded = fx.path("cube_out.obj");

    let original = ObjReader::from_bytes(CUBE_OBJ.as_bytes()).read_mesh().unwrap();
    assert!(encode(&input, &encoded, &EncodeOptions::default()));

    let report = decode_file(&encoded, &decoded).unwrap();
    assert_eq!(report.geometry, GeometryKind::Mesh);
    assert_eq!(report.format, OutputFormat::Obj);
    assert_eq!(report.num_points, original.num_points());
    assert_eq!(report.num_faces, original.num_faces());

    let text = fs::read_to_string(&decoded).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 8);
    assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 12);
    let again = ObjReader::from_bytes(text.as_bytes()).read_mesh().unwrap();
    assert_eq!(again.num_points(), original.num_points());
    assert_eq!(again.num_faces(), original.num_faces());
}

#[test]
fn mesh_round_trip_to_ply() {
    let fx = Fixture::new();
    let input = fx.write("cube.obj", CUBE_OBJ);
    let encoded = fx.path("cube.drc");
    let decoded = fx.path("cube_out.PLY");

    let options = EncodeOptions { compression_level: 10, ..Default::default() };
    assert!(encode(&input, &encoded, &options));
    assert!(decode(&encoded, &decoded));

    let mesh = PlyReader::from_bytes(fs::read(&decoded).unwrap()).read_mesh().unwrap();
    assert_eq!(mesh.num_points(), 8);
    assert_eq!(mesh.num_faces(), 12);
}

#[test]
fn point_cloud_mode_drops_faces() {
    let fx = Fixture::new();
    let input = fx.write("cube.obj", CUBE_OBJ);
    let encoded = fx.path("cloud.drc");
    let decoded = fx.path("cloud.ply");

    let options = EncodeOptions { is_point_cloud: true, ..Default::default() };
    let report = encode_file(&input, &encoded, &options).unwrap();
    assert_eq!(report.geometry, GeometryKind::PointCloud);

    let report = decode_file(&encoded, &decoded).unwrap();
    assert_eq!(report.geometry, GeometryKind::PointCloud);
    assert_eq!(report.num_faces, 0);
    assert_eq!(report.num_points, 8);
    assert!(!fs::read_to_string(&decoded).unwrap().contains("element face"));
}

#[test]
fn deleted_tex_coords_are_gone_and_points_merge() {
    let fx = Fixture::new();
    let input = fx.write("quad.obj", SPLIT_QUAD_OBJ);

    let keep = fx.path("keep.drc");
    assert!(encode(&input, &keep, &EncodeOptions::default()));
    let report = decode_file(&keep, &fx.path("keep.obj")).unwrap();
    assert_eq!(report.num_points, 5);
    assert!(fs::read_to_string(fx.path("keep.obj")).unwrap().contains("vt "));

    let options = EncodeOptions { tex_coords_quantization_bits: -1, ..Default::default() };
    let dropped = fx.path("dropped.drc");
    assert!(encode(&input, &dropped, &options));
    let report = decode_file(&dropped, &fx.path("dropped.obj")).unwrap();
    assert_eq!(report.num_points, 4);
    assert_eq!(report.num_faces, 2);
    assert!(!fs::read_to_string(fx.path("dropped.obj")).unwrap().contains("vt "));

    let options = EncodeOptions {
        tex_coords_quantization_bits: -1,
        deduplicate_point_ids: false,
        ..Default::default()
    };
    let undeduplicated = fx.path("undeduplicated.drc");
    assert!(encode(&input, &undeduplicated, &options));
    let report = decode_file(&undeduplicated, &fx.path("undeduplicated.obj")).unwrap();
    assert_eq!(report.num_points, 5);
}

#[test]
fn unsupported_output_extension_writes_nothing() {
    let fx = Fixture::new();
    let input = fx.write("cube.obj", CUBE_OBJ);
    let encoded = fx.path("cube.drc");
    assert!(encode(&input, &encoded, &EncodeOptions::default()));

    let output = fx.path("cube.xyz");
    assert!(!decode(&encoded, &output));
    assert!(!exists(&output));
}

#[test]
fn empty_paths_fail_immediately() {
    let fx = Fixture::new();
    let input = fx.write("cube.obj", CUBE_OBJ);
    let options = EncodeOptions::default();
    assert!(!encode("", &fx.path("a.drc"), &options));
    assert!(!encode(&input, "", &options));
    assert!(!decode("", &fx.path("a.obj")));
    assert!(!decode(&fx.path("a.drc"), ""));
    assert!(matches!(encode_file(&input, "", &options), Err(BridgeError::EmptyPath)));
}

#[test]
fn missing_output_directory_is_not_created() {
    let fx = Fixture::new();
    let input = fx.write("cube.obj", CUBE_OBJ);
    let missing_dir = fx.path("missing");

    let encoded = format!("{}/cube.drc", missing_dir);
    let err = encode_file(&input, &encoded, &EncodeOptions::default()).unwrap_err();
    assert!(matches!(err, BridgeError::Write { .. }));
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!exists(&missing_dir));

    let good = fx.path("cube.drc");
    assert!(encode(&input, &good, &EncodeOptions::default()));
    assert!(!decode(&good, &format!("{}/cube.obj", missing_dir)));
    assert!(!exists(&missing_dir));
}

#[test]
fn zero_byte_inputs_fail() {
    let fx = Fixture::new();
    let empty = fx.write("empty.obj", "");
    assert!(!encode(&empty, &fx.path("out.drc"), &EncodeOptions::default()));
    assert!(!exists(&fx.path("out.drc")));

    let empty_drc = fx.write("empty.drc", "");
    let err = decode_file(&empty_drc, &fx.path("out.obj")).unwrap_err();
    assert!(matches!(err, BridgeError::Read { .. }));
    assert!(!exists(&fx.path("out.obj")));
}

#[test]
fn non_draco_and_truncated_inputs_fail() {
    let fx = Fixture::new();
    let text = fx.write("cube.obj", CUBE_OBJ);
    assert!(matches!(
        decode_file(&text, &fx.path("a.obj")),
        Err(BridgeError::UnknownGeometryType { .. })
    ));

    let encoded = fx.path("cube.drc");
    assert!(encode(&text, &encoded, &EncodeOptions::default()));
    let bytes = fs::read(&encoded).unwrap();
    let truncated = fx.path("truncated.drc");
    fs::write(&truncated, &bytes[..bytes.len() - 3]).unwrap();
    let err = decode_file(&truncated, &fx.path("b.obj")).unwrap_err();
    assert!(matches!(err, BridgeError::Decode { .. }));
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert!(!exists(&fx.path("b.obj")));
}

#[test]
fn missing_input_is_an_io_error() {
    let fx = Fixture::new();
    let err = encode_file(&fx.path("nope.obj"), &fx.path("out.drc"), &EncodeOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    let err = decode_file(&fx.path("nope.drc"), &fx.path("out.obj")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}
