//! Seed material for the sequence generator.
//!
//! The RP2040 has no TRNG, so the seed is folded together from the noisy low
//! bits of a few joystick conversions and the timer count at boot.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

/// Low bits of a 12-bit conversion that carry mostly noise.
const NOISE_MASK: u16 = 0x000F;

/// Folds ADC noise and a timer value into a 64-bit seed.
pub fn seed_from_noise<I>(samples: I, ticks: u64) -> u64
where
    I: IntoIterator<Item = u16>,
{
    let folded = samples.into_iter().fold(0_u64, |acc, sample| {
        acc.rotate_left(4) ^ u64::from(sample & NOISE_MASK)
    });
    mix(folded ^ ticks.rotate_left(32))
}

/// SplitMix64 finaliser; spreads small differences over every bit.
const fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
