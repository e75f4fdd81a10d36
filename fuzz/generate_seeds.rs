#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs
//!
//! Seeds are raw BMP bytes; libfuzzer's arbitrary tuple decoding takes the
//! leading bytes for the conversion parameters.

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_convert";
    fs::create_dir_all(dir).unwrap();

    let params: &[u8] = &[8, 0, 64, 0, 1, 0, 0];

    // Minimal BMP 1x1 24-bit
    let mut bmp = vec![0u8; 58]; // 54 header + 4 pixel (3 + 1 padding)
    bmp[0] = b'B'; bmp[1] = b'M';
    bmp[2..6].copy_from_slice(&58u32.to_le_bytes()); // file size
    bmp[10..14].copy_from_slice(&54u32.to_le_bytes()); // data offset
    bmp[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size
    bmp[18..22].copy_from_slice(&1i32.to_le_bytes()); // width
    bmp[22..26].copy_from_slice(&1i32.to_le_bytes()); // height
    bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    bmp[28..30].copy_from_slice(&24u16.to_le_bytes()); // bpp
    bmp[54] = 0xff; bmp[55] = 0x00; bmp[56] = 0x00; // BGR
    fs::write(format!("{dir}/bmp_1x1.bin"), [params, &bmp[..]].concat()).unwrap();

    // 3x2 top-down
    let mut td = bmp[..54].to_vec();
    td[18..22].copy_from_slice(&3i32.to_le_bytes());
    td[22..26].copy_from_slice(&(-2i32).to_le_bytes());
    td.extend((0..24).map(|i| i as u8 * 10));
    fs::write(format!("{dir}/bmp_3x2_topdown.bin"), [params, &td[..]].concat()).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), params).unwrap();
    fs::write(format!("{dir}/bm_short.bin"), [params, &b"BM\x00\x00"[..]].concat()).unwrap();
    fs::write(format!("{dir}/header_only.bin"), [params, &bmp[..54]].concat()).unwrap();

    println!("Generated seed corpus in {dir}/");
}
