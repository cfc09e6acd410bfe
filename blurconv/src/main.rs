use std::path::PathBuf;

use rapid_blurhash::{Components, Decoder, Encoder, Srgb8};

fn main() -> Result<(), ()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [input] => encode_image(input, Components::default()),
        [input, x, y] => {
            let x = parse_u32(x, "components-x")?;
            let y = parse_u32(y, "components-y")?;
            encode_image(input, Components { x, y })
        }
        [hash, output, width, height] => {
            let width = parse_u32(width, "width")?;
            let height = parse_u32(height, "height")?;
            decode_hash(hash, output, width, height)
        }
        _ => {
            eprintln!("Usage: blurconv <image-path> [<components-x> <components-y>]");
            eprintln!("       blurconv <hash> <output-path> <width> <height>");
            eprintln!("Prefix the hash with 'fake:' to render it from tile samples.");
            eprintln!("Example: blurconv images/foo.png 4 3");
            eprintln!("Example: blurconv 'LEHV6nWB2yk8pyo0adR*.7kCMdnj' images/foo.png 128 96");
            Err(())
        }
    }
}

fn parse_u32(arg: &str, name: &str) -> Result<u32, ()> {
    arg.parse()
        .map_err(|err| eprintln!("Failed to parse {} '{}'. {:#}", name, arg, err))
}

fn encode_image(input: &str, components: Components) -> Result<(), ()> {
    let input = PathBuf::from(input);

    let dynamic_image = image::open(&input)
        .map_err(|err| eprintln!("Failed to open input image '{}'. {:#}", input.display(), err))?;

    let rgb = dynamic_image.to_rgb8();
    let pixels: &[Srgb8] = bytemuck::cast_slice(rgb.as_raw());

    let encoder = Encoder { components };
    let hash = encoder
        .encode_alloc(pixels, rgb.width(), rgb.height())
        .map_err(|err| eprintln!("Failed to encode image '{}'. {:#?}", input.display(), err))?;

    println!("{}", hash);
    Ok(())
}

fn decode_hash(hash: &str, output: &str, width: u32, height: u32) -> Result<(), ()> {
    let output = PathBuf::from(output);

    if output.exists() {
        eprintln!("Output path '{}' already occupied", output.display());
        return Err(());
    }

    let image = match hash.strip_prefix("fake:") {
        Some(hash) => render_samples(hash, width, height)?,
        None => render_dense(hash, width, height)?,
    };

    image
        .save(&output)
        .map_err(|err| eprintln!("Failed to save image into '{}'. {:#}", output.display(), err))
}

fn render_dense(hash: &str, width: u32, height: u32) -> Result<image::RgbImage, ()> {
    let (_, pixels) = Decoder::default()
        .decode_alloc::<Srgb8>(hash, width, height)
        .map_err(|err| eprintln!("Failed to decode hash '{}'. {:#?}", hash, err))?;

    let raw = bytemuck::cast_slice::<Srgb8, u8>(&pixels).to_vec();
    Ok(image::RgbImage::from_raw(width, height, raw).unwrap())
}

fn render_samples(hash: &str, width: u32, height: u32) -> Result<image::RgbImage, ()> {
    let (components, samples) = Decoder::default()
        .decode_samples_alloc(hash, width, height)
        .map_err(|err| eprintln!("Failed to decode hash '{}'. {:#?}", hash, err))?;

    // Paint each sample over its whole tile, then blur the mosaic. A
    // sigma of a quarter tile is enough to hide the seams.
    let tile_w = width as f32 / components.x as f32;
    let tile_h = height as f32 / components.y as f32;

    let mosaic = image::RgbImage::from_fn(width, height, |x, y| {
        let i = ((x as f32 / tile_w) as u32).min(components.x - 1);
        let j = ((y as f32 / tile_h) as u32).min(components.y - 1);
        let color = samples[(j * components.x + i) as usize].color;
        image::Rgb([color.r, color.g, color.b])
    });

    Ok(image::imageops::blur(&mosaic, tile_w / 4.0))
}
