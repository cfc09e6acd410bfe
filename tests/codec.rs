use approx::assert_abs_diff_eq;
use rapid_blurhash::{
    decode83, encode83, linear_to_srgb, Components, DecodeError, Decoder, EncodeError, Encoder,
    LinearF32, Srgb8,
};

fn gradient(width: u32, height: u32) -> Vec<Srgb8> {
    let mut pixels = Vec::new();
    for y in 0..height {
        for x in 0..width {
            pixels.push(Srgb8 {
                r: (x * 255 / (width - 1).max(1)) as u8,
                g: (y * 255 / (height - 1).max(1)) as u8,
                b: 160,
            });
        }
    }
    pixels
}

// Quadrants with mild contrast, so punched decodes stay inside 0..=1.
fn soft_quadrants(width: u32, height: u32) -> Vec<Srgb8> {
    let mut pixels = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let on = (x < width / 2) ^ (y < height / 2);
            pixels.push(if on {
                Srgb8 {
                    r: 140,
                    g: 150,
                    b: 160,
                }
            } else {
                Srgb8 {
                    r: 120,
                    g: 120,
                    b: 120,
                }
            });
        }
    }
    pixels
}

#[test]
fn base83_round_trips_across_widths() {
    let mut buf = [0u8; 4];

    for value in 0..83u64 * 83 {
        let digits = if value < 83 { 1 } else { 2 };
        encode83(value, &mut buf[..digits]).unwrap();
        let text = core::str::from_utf8(&buf[..digits]).unwrap();
        assert_eq!(decode83(text), Ok(value));
    }

    for digits in [3usize, 4] {
        let limit = 83u64.pow(digits as u32);
        let mut value = 0;
        while value < limit {
            encode83(value, &mut buf[..digits]).unwrap();
            let text = core::str::from_utf8(&buf[..digits]).unwrap();
            assert_eq!(decode83(text), Ok(value));
            value += 7919;
        }

        encode83(limit - 1, &mut buf[..digits]).unwrap();
        let text = core::str::from_utf8(&buf[..digits]).unwrap();
        assert_eq!(decode83(text), Ok(limit - 1));
        assert_eq!(
            encode83(limit, &mut buf[..digits]),
            Err(EncodeError::ValueOutOfRange)
        );
    }
}

#[test]
fn decode_header_reads_the_known_hash() {
    let hash = "UBL_:rOpGG-oBUNG,qRj2so|=eE1w^n4S5NH";
    let components = Components::decode_header(hash).unwrap();
    assert_eq!(components, Components { x: 4, y: 4 });
    assert_eq!(components.hash_len(), hash.len());

    // The whole string validates too.
    let (decoded, pixels) = Decoder::default().decode_alloc::<Srgb8>(hash, 16, 16).unwrap();
    assert_eq!(decoded, components);
    assert_eq!(pixels.len(), 256);
}

#[test]
fn uniform_gray_survives_the_round_trip() {
    let gray = Srgb8 {
        r: 128,
        g: 128,
        b: 128,
    };
    let hash = Encoder {
        components: Components { x: 1, y: 1 },
    }
    .encode_alloc(&vec![gray; 16 * 16], 16, 16)
    .unwrap();
    assert_eq!(hash.len(), 6);

    let (_, decoded) = Decoder::default().decode_alloc::<Srgb8>(&hash, 8, 4).unwrap();
    for px in decoded {
        for channel in [px.r, px.g, px.b] {
            assert!((channel as i32 - 128).abs() <= 2, "channel {}", channel);
        }
    }
}

#[test]
fn only_the_marked_length_decodes() {
    let decoder = Decoder::default();
    let mut out = [Srgb8::default(); 4];

    // Marker 'L' names a 4x3 grid, which takes exactly 28 characters.
    for len in 6..=40usize {
        let mut hash = String::from("L");
        while hash.len() < len {
            hash.push('f');
        }

        let result = decoder.decode(&hash, 2, 2, &mut out);
        if len == 28 {
            assert!(result.is_ok(), "length {} failed: {:?}", len, result);
        } else {
            assert_eq!(result, Err(DecodeError::InvalidLength), "length {}", len);
        }
    }
}

#[test]
fn bytes_outside_the_alphabet_are_rejected() {
    let decoder = Decoder::default();
    let mut out = [Srgb8::default(); 4];

    assert_eq!(
        decoder.decode("€00000", 2, 2, &mut out),
        Err(DecodeError::InvalidCharacter)
    );
    // Six bytes, so the length gate passes and the multi-byte character
    // is caught inside the DC field rather than panicking on a char
    // boundary.
    assert_eq!(
        decoder.decode("00€0", 2, 2, &mut out),
        Err(DecodeError::InvalidCharacter)
    );
    assert_eq!(decode83("€"), Err(DecodeError::InvalidCharacter));
}

#[test]
fn sample_decoder_matches_dense_at_tile_centers() {
    let width = 96u32;
    let height = 96u32;
    let hash = Encoder {
        components: Components { x: 3, y: 3 },
    }
    .encode_alloc(&gradient(width, height), width, height)
    .unwrap();

    let decoder = Decoder::default();
    let (_, dense) = decoder.decode_alloc::<Srgb8>(&hash, width, height).unwrap();
    let (components, samples) = decoder.decode_samples_alloc(&hash, width, height).unwrap();
    assert_eq!(components.count(), samples.len());

    for sample in samples {
        // Tile centers land on integer pixels here (96 / 3 tiles of 32).
        let px = dense[sample.y as usize * width as usize + sample.x as usize];
        let dr = px.r as f64 - sample.color.r as f64;
        let dg = px.g as f64 - sample.color.g as f64;
        let db = px.b as f64 - sample.color.b as f64;
        let distance = (dr * dr + dg * dg + db * db).sqrt();
        assert!(
            distance <= 30.0,
            "distance {} at ({}, {})",
            distance,
            sample.x,
            sample.y
        );
    }
}

#[test]
fn sample_grid_covers_the_canvas() {
    let hash = Encoder {
        components: Components { x: 5, y: 2 },
    }
    .encode_alloc(&gradient(20, 20), 20, 20)
    .unwrap();

    let (components, samples) = Decoder::default()
        .decode_samples_alloc(&hash, 100, 40)
        .unwrap();
    assert_eq!(components, Components { x: 5, y: 2 });
    assert_eq!(samples.len(), 10);

    let xs: Vec<f32> = samples.iter().map(|s| s.x).collect();
    let ys: Vec<f32> = samples.iter().map(|s| s.y).collect();
    assert_eq!(
        xs,
        [10.0, 30.0, 50.0, 70.0, 90.0, 10.0, 30.0, 50.0, 70.0, 90.0]
    );
    assert_eq!(
        ys,
        [10.0, 10.0, 10.0, 10.0, 10.0, 30.0, 30.0, 30.0, 30.0, 30.0]
    );
}

#[test]
fn punch_scales_deviation_from_the_average() {
    let hash = Encoder {
        components: Components { x: 3, y: 3 },
    }
    .encode_alloc(&soft_quadrants(16, 16), 16, 16)
    .unwrap();

    let flat = Decoder { punch: 0.0 }
        .decode_alloc::<LinearF32>(&hash, 8, 8)
        .unwrap()
        .1;
    let normal = Decoder::default()
        .decode_alloc::<LinearF32>(&hash, 8, 8)
        .unwrap()
        .1;
    let punched = Decoder { punch: 2.0 }
        .decode_alloc::<LinearF32>(&hash, 8, 8)
        .unwrap()
        .1;

    let mut moved = false;
    for ((f, n), p) in flat.iter().zip(&normal).zip(&punched) {
        assert_abs_diff_eq!(p.r - f.r, 2.0 * (n.r - f.r), epsilon = 1e-4);
        assert_abs_diff_eq!(p.g - f.g, 2.0 * (n.g - f.g), epsilon = 1e-4);
        assert_abs_diff_eq!(p.b - f.b, 2.0 * (n.b - f.b), epsilon = 1e-4);
        moved |= (n.r - f.r).abs() > 0.01;
    }
    assert!(moved, "expected some AC energy in the test image");
}

#[test]
fn pixel_types_agree_on_the_same_hash() {
    let hash = Encoder::default()
        .encode_alloc(&gradient(12, 12), 12, 12)
        .unwrap();

    let decoder = Decoder::default();
    let (_, srgb) = decoder.decode_alloc::<Srgb8>(&hash, 10, 10).unwrap();
    let (_, linear) = decoder.decode_alloc::<LinearF32>(&hash, 10, 10).unwrap();

    for (a, b) in srgb.iter().zip(&linear) {
        let converted = Srgb8 {
            r: linear_to_srgb(b.r),
            g: linear_to_srgb(b.g),
            b: linear_to_srgb(b.b),
        };
        assert_eq!(*a, converted);
    }
}

#[test]
fn ecosystem_hash_decodes() {
    let hash = "LEHV6nWB2yk8pyo0adR*.7kCMdnj";

    let (components, pixels) = Decoder::default().decode_alloc::<Srgb8>(hash, 32, 32).unwrap();
    assert_eq!(components, Components { x: 4, y: 3 });
    assert_eq!(pixels.len(), 32 * 32);

    let (_, samples) = Decoder::default().decode_samples_alloc(hash, 32, 32).unwrap();
    assert_eq!(samples.len(), 12);
}
