//! Property tests for the pooled encoder

use flate2::read::GzDecoder;
use proptest::prelude::*;
use squeeze_gzip::{CompressionLevel, GzipPool};
use std::io::Read;

fn gunzip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    GzDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

proptest! {
    #[test]
    fn pooled_encoder_roundtrips_chunked_input(
        level in 0i32..=9,
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..512), 0..16),
        flush_every in 1usize..8,
    ) {
        let pool = GzipPool::new(CompressionLevel::new(level).unwrap());
        let expected: Vec<u8> = chunks.concat();

        // Two passes so the second one runs on a reused encoder
        for _ in 0..2 {
            let mut encoder = pool.acquire();
            let mut out = Vec::new();
            for (i, chunk) in chunks.iter().enumerate() {
                let mut rest = &chunk[..];
                while !rest.is_empty() {
                    let n = encoder.write(rest, &mut out).unwrap();
                    rest = &rest[n..];
                }
                if i % flush_every == 0 {
                    encoder.flush(&mut out).unwrap();
                }
            }
            encoder.finish(&mut out).unwrap();
            prop_assert_eq!(gunzip(&out), expected.clone());
        }

        prop_assert_eq!(pool.created(), 1);
    }
}
