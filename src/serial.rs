use rand::Rng;

pub const SERIAL_PREFIX: &str = "GW";

/// Generates a giveaway serial number such as `GW-004213-0917`.
///
/// Two calls may return the same value; nothing checks for collisions.
pub fn generate() -> String {
    generate_with(&mut rand::thread_rng())
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let part_a: u32 = rng.gen_range(0..1_000_000);
    let part_b: u32 = rng.gen_range(0..10_000);
    format!("{SERIAL_PREFIX}-{part_a:06}-{part_b:04}")
}

#[cfg(test)]
mod serial_tests {
    use rand::{rngs::StdRng, SeedableRng};
    use regex::Regex;

    #[test]
    fn generated_serials_match_format() {
        let re = Regex::new(r"^GW-\d{6}-\d{4}$").unwrap();
        for _ in 0..1_000 {
            let serial = super::generate();
            assert!(re.is_match(&serial), "bad serial {serial}");
        }
    }

    #[test]
    fn small_segments_are_zero_padded() {
        struct Zero;
        impl rand::RngCore for Zero {
            fn next_u32(&mut self) -> u32 {
                0
            }
            fn next_u64(&mut self) -> u64 {
                0
            }
            fn fill_bytes(&mut self, dest: &mut [u8]) {
                dest.fill(0)
            }
            fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
                dest.fill(0);
                Ok(())
            }
        }
        assert_eq!(super::generate_with(&mut Zero), "GW-000000-0000");
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let a = super::generate_with(&mut StdRng::seed_from_u64(7));
        let b = super::generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }
}
