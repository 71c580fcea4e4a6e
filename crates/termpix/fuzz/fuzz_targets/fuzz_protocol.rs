#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use termpix::{render, Protocol, RgbaSlice};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    width: u8,
    height: u8,
    cols: u8,
    protocol: u8,
    pixels: Vec<u8>,
}

const PROTOCOLS: [Protocol; 5] = [
    Protocol::Sixel,
    Protocol::Kitty,
    Protocol::ITerm2,
    Protocol::WezTerm,
    Protocol::Terminology,
];

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

    // The encoders should never panic
    let protocol = PROTOCOLS[input.protocol as usize % PROTOCOLS.len()];
    let _ = render(&src, protocol, input.cols as usize);
});
