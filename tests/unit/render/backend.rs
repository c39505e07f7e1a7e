use super::*;

#[test]
fn solid_frame_has_tight_rgba_len() {
    let canvas = Canvas {
        width: 4,
        height: 2,
    };
    let f = FrameRGBA::solid(canvas, [1, 2, 3, 255]);
    assert_eq!(f.data.len(), canvas.rgba_len());
    assert_eq!(&f.data[28..32], &[1, 2, 3, 255]);
    assert!(f.premultiplied);
}

#[test]
fn opaque_conversion_flattens_over_background() {
    let canvas = Canvas {
        width: 2,
        height: 1,
    };
    let f = FrameRGBA::solid(canvas, [0, 0, 0, 0]);
    let out = f.to_opaque_rgba8([10, 20, 30, 255]).unwrap();
    assert_eq!(out, vec![10, 20, 30, 255, 10, 20, 30, 255]);
}

#[test]
fn opaque_conversion_rejects_short_buffers() {
    let f = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 4],
        premultiplied: true,
    };
    assert!(f.to_opaque_rgba8([0, 0, 0, 255]).is_err());
}

#[test]
fn settings_scale_region_to_even_canvas() {
    let s = SurfaceSettings::for_region(RegionBounds::from_size(101.0, 50.0), 2.0).unwrap();
    assert_eq!(
        s.canvas,
        Canvas {
            width: 202,
            height: 100
        }
    );

    let odd = SurfaceSettings::for_region(RegionBounds::from_size(10.5, 3.0), 1.0).unwrap();
    assert_eq!(odd.canvas.width % 2, 0);
    assert_eq!(odd.canvas.height % 2, 0);
}

#[test]
fn settings_reject_empty_region() {
    let err = SurfaceSettings::for_region(RegionBounds::from_size(0.0, 40.0), 2.0).unwrap_err();
    assert!(matches!(err, GlyphreelError::Validation(_)));
}

#[test]
fn backend_kind_defaults_to_cpu() {
    assert_eq!(BackendKind::default(), BackendKind::Cpu);
    let k: BackendKind = serde_json::from_str("\"cpu\"").unwrap();
    assert_eq!(k, BackendKind::Cpu);
}
