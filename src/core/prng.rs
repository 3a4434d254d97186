// Minimal PRNG (no external crates).
//
// This is NOT cryptographically secure.
// It is used only to draw initial states, phases and natural frequencies,
// and to make a seeded run reproducible.

#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        // Avoid a zero state.
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    /// Seed from the system clock. Used when a config carries no explicit seed.
    pub fn from_entropy() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::new(nanos)
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        // Marsaglia / Vigna family. Simple, fast, decent for simulation noise.
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    #[inline]
    pub fn next_f32_01(&mut self) -> f32 {
        unit_f32(self.next_u32())
    }

    #[inline]
    pub fn gen_range_f32(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_f32_01()
    }

    /// One standard-normal sample via the Box–Muller transform.
    ///
    /// Both uniform draws must land strictly inside (0, 1): a draw of
    /// exactly 0 is resampled so the logarithm stays finite.
    pub fn randn(&mut self) -> f32 {
        let mut u = self.next_f32_01();
        while u == 0.0 {
            u = self.next_f32_01();
        }
        let mut v = self.next_f32_01();
        while v == 0.0 {
            v = self.next_f32_01();
        }
        (-2.0 * u.ln()).sqrt() * (2.0 * core::f32::consts::PI * v).cos()
    }
}

/// Maps 32 random bits onto [0, 1).
///
/// Only the top 24 bits are used, scaled by 2^-24: every result is exact in
/// an f32 mantissa, so the interval is genuinely half-open. Dividing the full
/// 32-bit value by 2^32 is not — draws near `u32::MAX` round up to 1.0.
#[inline]
fn unit_f32(x: u32) -> f32 {
    (x >> 8) as f32 * (1.0 / (1 << 24) as f32)
}
