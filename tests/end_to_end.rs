use std::sync::Arc;

use itemcodecs::{
    BinaryCodec, Bootstrap, CodecConfig, CodecRegistry, CodecSpec, ItemValue, JsonCodec,
    NativeType, TextCodec,
};
use serde_json::json;

#[test]
fn register_encode_decode_alias() {
    let mut registry = CodecRegistry::new();
    registry
        .register("json", CodecSpec::codec(JsonCodec::new()), Some(NativeType::Mapping))
        .unwrap();
    registry
        .register("bin", CodecSpec::codec(BinaryCodec::new()), Some(NativeType::Bytes))
        .unwrap();
    registry
        .register("txt", CodecSpec::codec(TextCodec::new()), Some(NativeType::Text))
        .unwrap();
    registry.register("log", "txt", None).unwrap();

    let json = registry.codec_for_suffix("json").unwrap();
    let bytes = json.encode(&ItemValue::Json(json!({"x": 1}))).unwrap();
    let back = json.decode(&bytes).unwrap();
    assert_eq!(back, ItemValue::Json(json!({"x": 1})));

    assert!(Arc::ptr_eq(
        registry.codec_for_suffix("log").unwrap(),
        registry.codec_for_suffix("txt").unwrap()
    ));
}

#[test]
fn container_style_roundtrip() {
    let registry = Bootstrap::with_config(CodecConfig::default().with_verify_hash(true))
        .build()
        .unwrap();

    let items = vec![
        ("content.json", ItemValue::Json(json!({"containerType": {"name": "demo"}}))),
        ("meta.json", ItemValue::Json(json!({"title": "Ölfilm", "tags": ["a", "b"]}))),
        ("data/run.log", ItemValue::from("step 1\nstep 2\n")),
        ("data/scan.pgm", ItemValue::from("P2\n2 1\n255\n0 255\n")),
        ("data/blob.bin", ItemValue::from(vec![0u8, 1, 2, 254, 255])),
    ];

    for (name, value) in items {
        let item = registry.item_from_value(name, value).unwrap();
        let data = item.encode().unwrap();
        let loaded = registry.item_from_bytes(name, &data).unwrap();
        assert_eq!(loaded.value(), item.value(), "{name}");
        assert_eq!(loaded.hash().unwrap(), item.hash().unwrap(), "{name}");
        assert_eq!(item.hash().unwrap().len(), 64);
    }
}

#[test]
fn value_without_suffix_uses_type_default() {
    let registry = Bootstrap::new().build().unwrap();
    let item = registry
        .item_from_value("notes", ItemValue::from("plain"))
        .unwrap();
    assert_eq!(item.codec().name(), "text");
}

#[cfg(feature = "npy")]
#[test]
fn array_item_roundtrip() {
    use itemcodecs::NdArray;

    let registry = Bootstrap::new().build().unwrap();
    let array = NdArray::from_slice(&[2, 2], &[1.0f64, 2.0, 3.0, 4.0]).unwrap();
    let item = registry
        .item_from_value("data/matrix", ItemValue::Array(array.clone()))
        .unwrap();
    assert_eq!(item.codec().name(), "npy");

    let loaded = registry
        .item_from_bytes("data/matrix.npy", &item.encode().unwrap())
        .unwrap();
    assert_eq!(loaded.value().as_array(), Some(&array));
}

#[cfg(feature = "png")]
#[test]
fn image_hash_survives_recompression() {
    use itemcodecs::config::png_codec::Compression;
    use itemcodecs::{ImgVec, PixelData, Rgba};

    let pixels = (0..64u32)
        .map(|i| Rgba {
            r: (i * 4) as u8,
            g: (255 - i) as u8,
            b: (i % 3) as u8 * 100,
            a: 255,
        })
        .collect();
    let image = ItemValue::Image(PixelData::Rgba8(ImgVec::new(pixels, 8, 8)));

    let fast = Bootstrap::with_config(CodecConfig::default().with_png_compression(Compression::Fast))
        .build()
        .unwrap();
    let high = Bootstrap::with_config(CodecConfig::default().with_png_compression(Compression::High))
        .build()
        .unwrap();

    let a = fast.item_from_value("img.png", image.clone()).unwrap().encode().unwrap();
    let b = high.item_from_value("img.png", image.clone()).unwrap().encode().unwrap();

    let hash_a = fast.item_from_bytes("img.png", &a).unwrap().hash().unwrap();
    let hash_b = fast.item_from_bytes("img.png", &b).unwrap().hash().unwrap();
    assert_eq!(hash_a, hash_b);

    let mut other = image;
    if let ItemValue::Image(PixelData::Rgba8(img)) = &mut other {
        img.buf_mut()[0].a = 254;
    }
    let hash_other = fast.item_from_value("img.png", other).unwrap().hash().unwrap();
    assert_ne!(hash_a, hash_other);
}
