use proptest::prelude::*;
use staffbmp::bmp::{SourceImage, decode_header, row_size};
use staffbmp::*;

fn source(width: u32, height: u32) -> SourceImage {
    SourceImage {
        width,
        height,
        top_down: false,
        data_offset: 54,
        row_size: row_size(width).unwrap(),
    }
}

fn bmp_from(width: u32, height: u32, data: &[u8]) -> Vec<u8> {
    let rs = row_size(width).unwrap() as usize;
    let mut bmp = vec![0u8; 54];
    bmp[0..2].copy_from_slice(b"BM");
    bmp[10..14].copy_from_slice(&54u32.to_le_bytes());
    bmp[14..18].copy_from_slice(&40u32.to_le_bytes());
    bmp[18..22].copy_from_slice(&(width as i32).to_le_bytes());
    bmp[22..26].copy_from_slice(&(height as i32).to_le_bytes());
    bmp[26..28].copy_from_slice(&1u16.to_le_bytes());
    bmp[28..30].copy_from_slice(&24u16.to_le_bytes());
    for row in data.chunks_exact(width as usize * 3) {
        bmp.extend_from_slice(row);
        bmp.extend(std::iter::repeat_n(0u8, rs - row.len()));
    }
    bmp
}

proptest! {
    #[test]
    fn output_fits_budget(
        out_width in 0u16..=u16::MAX,
        max_height in 0u16..=u16::MAX,
        requested_height in 0u16..=u16::MAX,
        rotate_cw in any::<bool>(),
        w in 1u32..5000,
        h in 1u32..5000,
    ) {
        let spec = OutputSpec { out_width, max_height, rotate_cw, requested_height };
        match spec.resolve(&source(w, h), &Limits::default()) {
            Ok(g) => {
                prop_assert!(g.out_size > 0);
                prop_assert!(g.out_size <= 64_000);
                prop_assert_eq!(g.out_size, g.out_row_size * g.out_height);
                prop_assert!(g.out_height <= u32::from(max_height));
            }
            Err(e) => {
                let expected = matches!(
                    e,
                    StaffError::OutputTooLarge { .. } | StaffError::InvalidOutputWidth
                );
                prop_assert!(expected, "{e:?}");
            }
        }
    }

    #[test]
    fn auto_height_tracks_aspect(out_width in 1u16..200, w in 1u32..500, h in 1u32..500) {
        let g = OutputSpec::new(out_width, u16::MAX)
            .resolve(&source(w, h), &Limits::default())
            .unwrap();
        let expected = (f64::from(out_width) * f64::from(h) / f64::from(w)).round().max(1.0);
        let cap = f64::from(64_000 / g.out_row_size);
        if expected <= cap {
            prop_assert!((f64::from(g.out_height) - expected).abs() <= 1.0);
        } else {
            prop_assert_eq!(f64::from(g.out_height), cap);
        }
    }

    #[test]
    fn mapping_stays_inside_source(
        out_width in 1u16..64,
        requested_height in 1u16..64,
        rotate_cw in any::<bool>(),
        w in 1u32..100,
        h in 1u32..100,
    ) {
        let src = source(w, h);
        let spec = OutputSpec { out_width, max_height: 1000, rotate_cw, requested_height };
        let g = spec.resolve(&src, &Limits::default()).unwrap();
        for y in 0..g.out_height {
            for x in 0..g.out_width {
                let (sx, sy) = g.source_pixel(&src, x, y).unwrap();
                prop_assert!(sx < w && sy < h);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn same_size_is_identity(
        (w, h, data) in (1u32..12, 1u32..12).prop_flat_map(|(w, h)| {
            (Just(w), Just(h), prop::collection::vec(any::<u8>(), (w * h * 3) as usize))
        })
    ) {
        let mut storage = MemStorage::new();
        storage.insert("/in.bmp", bmp_from(w, h, &data));
        let result = process_bmp_to_staff(
            &mut storage, "/in.bmp", "/out.bmp", w as u16, 1000, false, h as u16,
        );
        prop_assert!(result.ok, "{}", result.message);

        let out = storage.get("/out.bmp").unwrap();
        let img = decode_header(&out).unwrap();
        prop_assert_eq!((img.width, img.height), (w, h));
        let expected = bmp_from(w, h, &data);
        prop_assert_eq!(&out[54..], &expected[54..]);
    }
}
