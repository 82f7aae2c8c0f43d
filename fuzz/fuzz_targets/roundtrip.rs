#![no_main]
use libfuzzer_sys::fuzz_target;
use xpack::{Compressor, Decompressor};

/// Feeds arbitrary bytes through `Decompressor` directly (it must reject
/// garbage cleanly, never panic) and also exercises a genuine
/// compress/decompress round trip on the same bytes, since a fuzzer is
/// just as likely to shake loose a codec bug as a framing bug.
fuzz_target!(|data: &[u8]| {
    let max_len = data.len().max(1);

    let mut decompressor = Decompressor::new(max_len);
    let mut scratch = vec![0u8; max_len];
    let _ = decompressor.decompress(data, &mut scratch, max_len);

    if let Ok(mut compressor) = Compressor::new(max_len, 6) {
        let mut compressed = vec![0u8; max_len * 2 + 1024];
        let written = compressor.compress(data, &mut compressed);
        if written > 0 {
            let mut decompressor = Decompressor::new(max_len);
            let mut output = vec![0u8; data.len()];
            let result = decompressor.decompress(&compressed[..written], &mut output, data.len());
            assert_eq!(result.ok(), Some(data.len()));
            assert_eq!(output, data);
        }
    }
});
