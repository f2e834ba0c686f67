/// Completion times in seconds for three, two and one stars.
pub const DEFAULT_STAR_TIMES: [f32; 3] = [60.0, 120.0, 240.0];

/// Stars earned for finishing in `elapsed` seconds.
/// Finishing always earns at least one star.
pub fn star_rating(thresholds: [f32; 3], elapsed: f32) -> u8 {
    if elapsed <= thresholds[0] {
        3
    } else if elapsed <= thresholds[1] {
        2
    } else {
        1
    }
}
