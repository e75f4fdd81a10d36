#![no_main]
use libfuzzer_sys::fuzz_target;
use staffbmp::*;

fuzz_target!(|input: (u16, u16, bool, u16, &[u8])| {
    let (out_width, max_height, rotate_cw, requested_height, data) = input;
    // keep the output small enough to finish quickly
    let out_width = out_width % 512;

    let mut storage = MemStorage::new();
    storage.insert("/in.bmp", data);
    let result = process_bmp_to_staff(
        &mut storage,
        "/in.bmp",
        "/out.bmp",
        out_width,
        max_height,
        rotate_cw,
        requested_height,
    );

    // Either a complete bitmap or nothing at the destination
    match storage.get("/out.bmp") {
        Some(out) => {
            assert!(result.ok, "output left behind after: {}", result.message);
            let img = bmp::decode_header(&out).expect("output must parse");
            assert_eq!(img.width, u32::from(result.out_width));
            assert_eq!(img.height, u32::from(result.out_height));
            assert_eq!(out.len(), 54 + img.row_size as usize * img.height as usize);
            assert!(out.len() - 54 <= 64_000);
        }
        None => assert!(!result.ok),
    }
});
