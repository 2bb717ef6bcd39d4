use std::io::Write;
use usd_scene::{SceneError, Stage};

const SCENE: &str = r#"#usda 1.0
def Xform "World"
{
    def Cube "Box1" {}
    def Cube "Box2"
    {
        float3 xformOp:scale = (2, 2, 2)
        uniform token[] xformOpOrder = ["xformOp:scale"]
    }
}
"#;

fn write_usdz(path: &std::path::Path, layer_name: &str, layer: &[u8]) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file(layer_name, zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(layer).unwrap();
    writer.finish().unwrap();
}

#[test]
fn opens_usdz_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.usdz");
    write_usdz(&path, "scene.usda", SCENE.as_bytes());

    let stage = Stage::open(&path).unwrap();
    let cubes: Vec<_> = stage
        .traverse()
        .into_iter()
        .filter(|p| p.is_a("Cube"))
        .map(|p| p.path().to_string())
        .collect();
    assert_eq!(cubes, ["/World/Box1", "/World/Box2"]);
}

#[test]
fn usdz_with_truncated_binary_root_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.usdz");
    write_usdz(&path, "scene.usdc", b"PXR-USDC\x00\x00");

    assert!(matches!(Stage::open(&path), Err(SceneError::Crate(_))));
}

#[test]
fn extension_does_not_decide_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actually_text.usdz");
    std::fs::write(&path, SCENE).unwrap();

    assert_eq!(Stage::open(&path).unwrap().traverse().len(), 3);
}
