use swatch_ngin::{
    Capability, Category, EngineConfig, MeshNode, PartId, SelectionEvent, TextureConfig,
    TextureParam, Tint,
    library::UploadedImage,
    material::{MaterialStore, RenderScale},
    registry::{KeywordTable, PartRegistry},
    transform::{MapSource, TransformApplier},
};

use crate::common::test_utils::{MockRemote, engine, engine_with, png_bytes};

mod common;

#[test]
fn classification_is_stable_and_table_driven() {
    let registry = PartRegistry::new(KeywordTable::default());
    for _ in 0..3 {
        assert_eq!(registry.classify("Shape027_upper"), Capability::Interactive);
        assert_eq!(registry.category_of("Shape027_upper"), Some(Category::Vamp));
        assert_eq!(registry.category_of("xx_Shape026"), Some(Category::Shoelace));
        assert_eq!(registry.category_of("Line040"), Some(Category::Label));
        assert_eq!(registry.classify("Sole_main"), Capability::Inert);
        assert_eq!(registry.category_of(""), None);
    }
}

#[test]
fn first_keyword_wins_on_ambiguous_names() {
    let table = KeywordTable::default();
    assert_eq!(table.category_of("Shape026_Shape027"), Some(Category::Vamp));
    assert_eq!(
        table.ambiguous_matches("Shape026_Shape027"),
        vec!["Shape027", "Shape026"]
    );
}

#[test]
fn custom_keyword_table_replaces_the_default() {
    let table = KeywordTable::new([("Heel", Category::Label)]);
    assert_eq!(table.entries(), &[("Heel".to_string(), Category::Label)]);
    let mut registry = PartRegistry::new(table);
    let event = registry.resolve_click(&MeshNode::new(9, "Heel_cap", "Heel"));
    assert!(matches!(event, SelectionEvent::Select(part) if part.category == Some(Category::Label)));
    assert_eq!(
        registry.resolve_click(&MeshNode::new(1, "Shape027_upper", "Upper")),
        SelectionEvent::Deselect
    );
}

#[test]
fn clicks_select_interactive_parts_and_deselect_inert_ones() {
    let remote = MockRemote::new();
    let mut engine = engine(&remote);

    let event = engine.on_click(&MeshNode::new(1, "Shape027_upper", "Upper"));
    let SelectionEvent::Select(part) = event else {
        panic!("expected a selection");
    };
    assert_eq!(part.id, PartId(1));
    assert_eq!(part.material_name, "Upper");
    assert_eq!(engine.glow().energy(PartId(1)), 1.0);
    assert_eq!(engine.visible_category(), Some(Category::Vamp));
    assert_eq!(engine.visible_library().len(), 6);

    assert_eq!(
        engine.on_click(&MeshNode::new(4, "Sole_main", "Rubber")),
        SelectionEvent::Deselect
    );
    assert!(engine.selected().is_none());
    assert_eq!(engine.glow().energy(PartId(4)), 0.0);
    assert!(engine.visible_library().is_empty());

    engine.on_click(&MeshNode::new(3, "Line040_tag", "Tag"));
    assert_eq!(engine.on_miss(), SelectionEvent::Deselect);
    assert!(engine.selected().is_none());
}

#[test]
fn apply_creates_defaults_then_only_replaces_the_url() {
    let mut store = MaterialStore::new();
    let part = PartId(1);
    assert!(store.apply(part, "local://a.png"));
    assert_eq!(store.get(part), Some(&TextureConfig::with_source("local://a.png")));

    store.update(part, TextureParam::Roughness(0.3));
    assert!(store.apply(part, "local://b.png"));
    let config = store.get(part).unwrap();
    assert_eq!(config.source_url.as_deref(), Some("local://b.png"));
    assert_eq!(config.roughness, 0.3);

    let revision = store.revision();
    assert!(!store.apply(part, "local://b.png"));
    assert_eq!(store.revision(), revision);
}

#[test]
fn update_without_config_starts_from_defaults_without_a_texture() {
    let mut store = MaterialStore::new();
    store.update(PartId(5), TextureParam::Opacity(0.4));
    let config = store.get(PartId(5)).unwrap();
    assert_eq!(config.source_url, None);
    assert_eq!(config.opacity, 0.4);
    assert_eq!(config.scale, 2.5);
}

#[test]
fn derive_is_pure_and_does_not_touch_the_store() {
    let mut store = MaterialStore::new();
    store.apply(PartId(1), "local://a.png");
    store.update(PartId(2), TextureParam::Scale(0.0));
    let scale = RenderScale::default();

    let first = store.derive(&scale);
    let second = store.derive(&scale);
    assert_eq!(first, second);
    assert!((first[&PartId(1)].scale - 6.5).abs() < 1e-5);
    assert_eq!(first[&PartId(2)].scale, 3.0);
    assert_eq!(store.get(PartId(1)).unwrap().scale, 2.5);
}

#[test]
fn end_to_end_apply_update_derive() {
    let remote = MockRemote::new();
    let mut engine = engine(&remote);
    let part = PartId(1);
    engine.on_click(&MeshNode::new(1, "Shape027_upper", "Upper"));

    engine
        .apply_texture("local://sample.png")
        .expect("local references are always accepted");
    assert_eq!(
        engine.get(part),
        Some(&TextureConfig {
            source_url: Some("local://sample.png".into()),
            scale: 2.5,
            offset_x: 0.0,
            offset_y: 0.0,
            rotation_degrees: 0.0,
            roughness: 1.0,
            metalness: 0.0,
            opacity: 1.0,
            tint: None,
        })
    );

    assert!(engine.update(TextureParam::Scale(4.0)));
    let config = engine.get(part).unwrap();
    assert_eq!(config.scale, 4.0);
    assert_eq!(config.source_url.as_deref(), Some("local://sample.png"));
    assert!((engine.render_config()[&part].scale - 8.6).abs() < 1e-5);
}

#[test]
fn render_config_is_memoized_until_the_store_changes() {
    let remote = MockRemote::new();
    let mut engine = engine(&remote);
    engine.on_click(&MeshNode::new(2, "Shape026_laces", "Laces"));
    engine.update(TextureParam::OffsetX(0.2));

    let first = engine.render_config();
    let second = engine.render_config();
    assert!(std::rc::Rc::ptr_eq(&first, &second));

    engine.update(TextureParam::OffsetY(0.1));
    let third = engine.render_config();
    assert!(!std::rc::Rc::ptr_eq(&first, &third));
    assert_eq!(third[&PartId(2)].offset_y, 0.1);
}

#[test]
fn edits_without_selection_are_ignored() {
    let remote = MockRemote::new();
    let mut engine = engine(&remote);
    assert!(!engine.update(TextureParam::Scale(1.0)));
    assert!(engine.apply_texture("local://sample.png").unwrap().is_none());
    assert!(engine.render_config().is_empty());
}

#[test]
fn scene_reload_discards_everything() {
    let remote = MockRemote::new();
    let mut engine = engine(&remote);
    engine.on_click(&MeshNode::new(1, "Shape027_upper", "Upper"));
    engine.update(TextureParam::Metalness(0.5));

    engine.load_scene(&[MeshNode::new(10, "Shape027_v2", "Upper")]);
    assert!(engine.selected().is_none());
    assert!(engine.get(PartId(1)).is_none());
    assert!(engine.registry().get(PartId(1)).is_none());
    assert_eq!(engine.glow().energy(PartId(1)), 0.0);
    assert_eq!(engine.textures().original_material(PartId(10)), Some("Upper"));
}

#[test]
fn text_patches_parse_into_fields() {
    assert_eq!(TextureParam::parse("scale", "4"), Ok(TextureParam::Scale(4.0)));
    assert_eq!(
        TextureParam::parse("offsetX", "-0.25"),
        Ok(TextureParam::OffsetX(-0.25))
    );
    assert_eq!(
        TextureParam::parse("color", "#FF8000"),
        Ok(TextureParam::Tint(Some(Tint([255, 128, 0]))))
    );
    assert_eq!(TextureParam::parse("color", ""), Ok(TextureParam::Tint(None)));
    assert!(TextureParam::parse("scale", "big").is_err());
    assert!(TextureParam::parse("color", "#12345").is_err());
    assert!(TextureParam::parse("glossiness", "1").is_err());
    assert_eq!(Tint([255, 128, 0]).to_string(), "#ff8000");
}

#[test]
fn transform_maps_config_onto_renderer_parameters() {
    let applier = TransformApplier::default();
    let mut config = TextureConfig::with_source("local://a.png");
    config.scale = 8.6;
    config.offset_x = 0.1;
    config.offset_y = -0.2;
    config.rotation_degrees = 90.0;

    let params = applier.apply(&config);
    assert_eq!(params.uv.repeat.x, 8.6);
    assert_eq!(params.uv.repeat.y, 8.6);
    assert_eq!(params.uv.offset.x, 0.1);
    assert_eq!(params.uv.offset.y, -0.2);
    assert!((params.uv.rotation.0 - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    assert_eq!(params.uv.center.x, 0.5);
    assert_eq!(params.uv.center.y, 0.5);
    assert_eq!(params.color, [1.0, 1.0, 1.0]);
    assert_eq!(params.alpha_test, None);
    assert!(!params.transparent);
    assert!(params.double_sided);
    assert_eq!(params.map, MapSource::Original);
}

#[test]
fn transform_clamps_out_of_range_and_invalid_numbers() {
    let applier = TransformApplier::default();
    let config = TextureConfig {
        source_url: None,
        scale: -4.0,
        offset_x: f32::NAN,
        offset_y: f32::INFINITY,
        rotation_degrees: f32::NAN,
        roughness: 3.0,
        metalness: -1.0,
        opacity: f32::NAN,
        tint: None,
    };
    let params = applier.apply(&config);
    assert_eq!(params.uv.repeat.x, 0.0);
    assert_eq!(params.uv.offset.x, 0.0);
    assert_eq!(params.uv.offset.y, 0.0);
    assert_eq!(params.uv.rotation.0, 0.0);
    assert_eq!(params.roughness, 1.0);
    assert_eq!(params.metalness, 0.0);
    assert_eq!(params.opacity, 1.0);
}

#[test]
fn tint_and_transparency_enable_the_alpha_test() {
    let applier = TransformApplier::new(0.05);
    let mut config = TextureConfig::default();
    config.tint = Some(Tint([255, 0, 0]));
    let params = applier.apply(&config);
    assert_eq!(params.color, [1.0, 0.0, 0.0]);
    assert_eq!(params.alpha_test, Some(0.05));

    config.tint = None;
    config.opacity = 0.5;
    let params = applier.apply(&config);
    assert!(params.transparent);
    assert_eq!(params.alpha_test, Some(0.05));

    let uniform = params.to_uniform(0.08);
    assert_eq!(uniform.color, [1.0, 1.0, 1.0, 0.5]);
    assert_eq!(uniform.pbr, [1.0, 0.0, 0.05, 0.08]);
    assert_eq!(std::mem::size_of_val(&uniform), 80);
}

#[test]
fn frame_materials_cover_interactive_parts_only() {
    let remote = MockRemote::new();
    let mut engine = engine(&remote);
    engine.on_click(&MeshNode::new(3, "Line040_tag", "Tag"));
    engine.update(TextureParam::Roughness(0.2));

    let frame = engine.frame_materials();
    assert_eq!(frame.len(), 3);
    assert!(!frame.contains_key(&PartId(4)));
    let tag = &frame[&PartId(3)];
    let params = tag.params.as_ref().expect("configured part has params");
    assert_eq!(params.roughness, 0.2);
    // A config without a source removes the map.
    assert_eq!(params.map, MapSource::Cleared);
    assert!(frame[&PartId(1)].params.is_none());
    assert!(tag.uniform().is_some());
}

#[test]
fn glow_decays_through_the_frame_loop() {
    let remote = MockRemote::new();
    let mut engine = engine(&remote);
    engine.on_click(&MeshNode::new(1, "Shape027_upper", "Upper"));
    engine.on_update(std::time::Duration::from_millis(250));
    let frame = engine.frame_materials();
    assert!((frame[&PartId(1)].emissive_intensity - 0.1).abs() < 1e-5);
    for _ in 0..200 {
        engine.on_update(std::time::Duration::from_millis(16));
    }
    assert_eq!(engine.frame_materials()[&PartId(1)].emissive_intensity, 0.0);
}

#[test]
fn uploads_are_validated_before_anything_is_stored() {
    let remote = MockRemote::new();
    let mut config = EngineConfig::default();
    config.uploads.max_bytes = 1024;
    let mut engine = engine_with(&remote, config);

    let not_an_image = UploadedImage {
        file_name: "notes.txt".into(),
        mime: "text/plain".into(),
        bytes: b"hello".to_vec(),
    };
    assert!(matches!(
        engine.upload_texture(not_an_image),
        Err(swatch_ngin::BindError::InvalidInput(_))
    ));

    let too_large = UploadedImage {
        file_name: "huge.png".into(),
        mime: "image/png".into(),
        bytes: vec![0; 2048],
    };
    assert!(matches!(
        engine.upload_texture(too_large),
        Err(swatch_ngin::BindError::InvalidInput(_))
    ));
    assert_eq!(engine.libraries().get(Category::Vamp).len(), 6);

    let swatch = UploadedImage {
        file_name: "swatch.png".into(),
        mime: "image/png".into(),
        bytes: png_bytes(4, 4, [10, 20, 30, 255]),
    };
    let item = engine.upload_texture(swatch).expect("valid upload");
    assert!(item.url.starts_with("local://"));
    assert_eq!(engine.libraries().get(Category::Vamp)[0], item);
    assert_eq!(engine.libraries().get(Category::Vamp).len(), 7);
}

#[test]
fn control_fields_are_patched_by_name() {
    let remote = MockRemote::new();
    let mut engine = engine(&remote);
    engine.on_click(&MeshNode::new(1, "Shape027_upper", "Upper"));

    assert_eq!(engine.update_field("scale", "4.0"), Ok(true));
    assert_eq!(engine.update_field("color", "#00ff00"), Ok(true));
    assert!(matches!(
        engine.update_field("scale", "four"),
        Err(swatch_ngin::BindError::InvalidInput(_))
    ));
    let config = engine.get(PartId(1)).unwrap();
    assert_eq!(config.scale, 4.0);
    assert_eq!(config.tint, Some(Tint([0, 255, 0])));
}
