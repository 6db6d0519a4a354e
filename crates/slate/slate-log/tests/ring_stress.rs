//! Backpressure stress: small rings, mixed message lengths, byte-exact
//! recovery. Length mixes that wrap at awkward offsets exercise the pad
//! skip and the producer's spin-then-yield path.

mod util;

use std::fs;

const LENGTHS: [usize; 8] = [1, 2, 3, 59, 113, 307, 709, 5297];
const MESSAGES: usize = 1000;

#[test]
fn stressed_rings_reproduce_the_exact_stream() {
    for ring_bytes in [512usize, 8192] {
        let lengths: Vec<usize> = LENGTHS
            .iter()
            .copied()
            .filter(|&len| len < ring_bytes)
            .collect();

        let path = util::temp_path(&format!("stress_{ring_bytes}"));
        let mut logger = util::test_logger();
        logger.set_ring_size(ring_bytes);
        logger.open(&path).unwrap();

        let mut expected = Vec::new();
        for i in 0..MESSAGES {
            let msg = util::make_msg(lengths[i % lengths.len()], i);
            logger.log_raw(&msg);
            expected.extend_from_slice(&msg);
        }
        logger.close();

        assert_eq!(
            fs::read(&path).unwrap(),
            expected,
            "stream mismatch for ring size {ring_bytes}"
        );
        let _ = fs::remove_file(&path);
    }
}
