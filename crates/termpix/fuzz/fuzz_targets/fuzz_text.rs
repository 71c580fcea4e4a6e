#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use termpix::{
    render_sequential, render_text, ConversionOptions, DitherAlgorithm, RgbaSlice,
    SchedulerConfig,
};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    width: u8,
    height: u8,
    cols: u8,
    rows: u8,
    charset: String,
    invert: bool,
    edge_detect: bool,
    color: bool,
    half_block: bool,
    dither: u8,
    workers: u8,
    pixels: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let width = (input.width as usize).max(1);
    let height = (input.height as usize).max(1);

    let expected_size = width * height * 4;
    if input.pixels.len() < expected_size {
        return;
    }
    let Ok(src) = RgbaSlice::new(&input.pixels[..expected_size], width, height) else {
        return;
    };

    let algorithms = DitherAlgorithm::ALL;
    let opts = ConversionOptions {
        width: input.cols as usize,
        height: input.rows as usize,
        charset: input.charset,
        invert: input.invert,
        edge_detect: input.edge_detect,
        color: input.color,
        dither: algorithms[input.dither as usize % algorithms.len()],
        half_block: input.half_block,
    };

    // Row-parallel output must match the single-threaded rendering
    let config = SchedulerConfig::new(input.workers as usize % 8 + 1, 1);
    let parallel = render_text(&src, &opts, &config);
    let sequential = render_sequential(&src, &opts);
    if let (Ok(a), Ok(b)) = (parallel, sequential) {
        assert_eq!(a, b);
    }
});
