//! Simple benchmark suite comparing the dense and sample decoders

use std::time::{Duration, Instant};

use rapid_blurhash::{Components, Decoder, Encoder, Srgb8};

fn ns() -> Instant {
    Instant::now()
}

// -----------------------------------------------------------------------------
// benchmark runner

struct DecodeResult {
    w: u32,
    h: u32,
    dense_time: Duration,
    sparse_time: Duration,
}

#[inline(never)]
fn benchmark_fn(runs: u32, avg_time: &mut Duration, mut f: impl FnMut()) {
    f();

    let mut time = Duration::ZERO;
    for _ in 0..runs {
        let time_start = ns();
        f();
        time += time_start.elapsed();
    }

    *avg_time = time / runs;
}

fn benchmark_print_result(res: &DecodeResult) {
    let px = res.w as f64 * res.h as f64;
    let dense = res.dense_time.as_secs_f64();
    let sparse = res.sparse_time.as_secs_f64();
    println!(
        "{:5}x{:<5} {:10.3}  {:11.3}  {:11.3}  {:11.1}",
        res.w,
        res.h,
        dense * 1000.0,
        if res.dense_time.is_zero() {
            0.0
        } else {
            px / (dense * 1_000_000.0)
        },
        sparse * 1_000_000.0,
        if res.sparse_time.is_zero() {
            0.0
        } else {
            dense / sparse
        },
    );
}

fn source_pixels(path: Option<&str>) -> Result<(Vec<Srgb8>, u32, u32), ()> {
    match path {
        Some(path) => {
            let image = image::open(path)
                .map_err(|err| eprintln!("Failed to open image '{}'. {:#}", path, err))?;
            let rgb = image.to_rgb8();
            let (w, h) = (rgb.width(), rgb.height());
            Ok((bytemuck::cast_slice(rgb.as_raw()).to_vec(), w, h))
        }
        None => {
            // Smooth two-axis gradient, the typical placeholder content.
            let (w, h) = (256u32, 256u32);
            let mut pixels = Vec::with_capacity((w * h) as usize);
            for y in 0..h {
                for x in 0..w {
                    pixels.push(Srgb8 {
                        r: x as u8,
                        g: y as u8,
                        b: ((x + y) / 2) as u8,
                    });
                }
            }
            Ok((pixels, w, h))
        }
    }
}

fn main() -> Result<(), ()> {
    let mut args = std::env::args();

    if args.len() < 2 {
        eprintln!("Usage: blurbench <iterations> [<image>]");
        eprintln!("Example: blurbench 100 images/foo.png");
        return Err(());
    }

    args.next();
    let mut runs: u32 = args.next().unwrap().parse().unwrap();
    if runs < 1 {
        runs = 1;
    }

    let path = args.next();
    let (pixels, w, h) = source_pixels(path.as_deref())?;

    println!("## Benchmarking {}x{} source -- {} runs\n", w, h, runs);

    // Encoding

    let mut encode_time = Duration::ZERO;
    let mut hash_len = 0;
    for components in [Components { x: 4, y: 4 }, Components { x: 8, y: 8 }] {
        let encoder = Encoder { components };
        let size = &mut hash_len;
        benchmark_fn(runs, &mut encode_time, || {
            let hash = encoder.encode_alloc(&pixels, w, h).unwrap();
            *size = hash.len();
        });

        let px = w as f64 * h as f64;
        let secs = encode_time.as_secs_f64();
        println!(
            "encode {}x{}:  {:8.3} ms  {:8.3} mpps  {:4} chars",
            components.x,
            components.y,
            secs * 1000.0,
            if encode_time.is_zero() {
                0.0
            } else {
                px / (secs * 1_000_000.0)
            },
            hash_len,
        );
    }
    println!();

    // Decoding, dense against sparse across output resolutions. The
    // sample decoder's cost stays flat while the dense cost follows the
    // pixel count.

    let hash = Encoder::default().encode_alloc(&pixels, w, h).unwrap();
    println!("## Benchmarking decoders of '{}' -- {} runs\n", hash, runs);

    println!("   output      dense ms   dense mpps    sparse us  dense/sparse");

    let decoder = Decoder::default();
    for (dw, dh) in [
        (32u32, 32u32),
        (64, 64),
        (128, 128),
        (256, 256),
        (512, 512),
        (1024, 1024),
    ] {
        let mut res = DecodeResult {
            w: dw,
            h: dh,
            dense_time: Duration::ZERO,
            sparse_time: Duration::ZERO,
        };

        benchmark_fn(runs, &mut res.dense_time, || {
            decoder.decode_alloc::<Srgb8>(&hash, dw, dh).unwrap();
        });

        benchmark_fn(runs, &mut res.sparse_time, || {
            decoder.decode_samples_alloc(&hash, dw, dh).unwrap();
        });

        benchmark_print_result(&res);
    }

    Ok(())
}
