use usda_parser::{parse, ParseErrorKind, Specifier, Value};

const KITCHEN: &str = r#"#usda 1.0
(
    defaultPrim = "Kitchen"
    metersPerUnit = 1
    upAxis = "Y"
)

def Xform "Kitchen" (
    kind = "assembly"
)
{
    double3 xformOp:translate = (0, 0, 5)
    uniform token[] xformOpOrder = ["xformOp:translate"]

    def Cube "Wall1"
    {
        double size = 2
        float3 xformOp:scale = (4, 2.5, 0.1)
        quatf xformOp:orient = (1, 0, 0, 0)
        uniform token[] xformOpOrder = ["xformOp:orient", "xformOp:scale"]
        color3f[] primvars:displayColor = [(0.8, 0.8, 0.8)]
    }

    def Cube "Cabinet12" (
        active = false
    )
    {
    }

    def Mesh "Counter"
    {
        int[] faceVertexCounts = [4]
        int[] faceVertexIndices = [0, 1, 2, 3]
        point3f[] points = [(0, 0, 0), (1, 0, 0), (1, 1, 0), (0, 1, 0)]
    }
}

class "_Prototype"
{
    def Cube "Hidden" {}
}
"#;

#[test]
fn parses_kitchen_layer() {
    let layer = parse(KITCHEN).into_result().unwrap();
    assert_eq!(layer.metadata.get("upAxis").and_then(Value::as_str), Some("Y"));
    assert_eq!(layer.prims.len(), 2);
    assert_eq!(layer.prims[1].specifier, Specifier::Class);

    let wall = layer.find_prim("/Kitchen/Wall1").unwrap();
    assert_eq!(wall.type_name.as_deref(), Some("Cube"));
    let orient = wall.attribute("xformOp:orient").and_then(|a| a.default.as_ref());
    assert_eq!(orient.and_then(Value::as_vec4), Some([1.0, 0.0, 0.0, 0.0]));

    let cabinet = layer.find_prim("/Kitchen/Cabinet12").unwrap();
    assert!(!cabinet.is_active());

    let counter = layer.find_prim("/Kitchen/Counter").unwrap();
    let points = counter.attribute("points").unwrap();
    assert!(points.is_array);
    assert_eq!(points.default.as_ref().and_then(Value::as_array).map(<[Value]>::len), Some(4));
}

#[test]
fn layer_serializes_to_json() {
    let layer = parse(KITCHEN).into_result().unwrap();
    let json = serde_json::to_string(&layer).unwrap();
    assert!(json.contains("Wall1"));
}

#[test]
fn binary_crate_payload_is_not_a_text_layer() {
    let parsed = parse("PXR-USDC\u{0}\u{0}");
    assert_eq!(parsed.errors[0].kind, ParseErrorKind::MissingHeader);
}

#[test]
fn error_positions_are_one_based_in_messages() {
    let err = parse("#usda 1.0\n\ndef Cube \"A\" {\n  double size = [1, 2\n}\n")
        .into_result()
        .unwrap_err();
    assert!(err.to_string().contains(" at 5:1"), "{err}");
}
