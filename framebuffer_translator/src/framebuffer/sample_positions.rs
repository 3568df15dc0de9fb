/// Standard multisample positions
///
/// Offsets are in 1/16 pixel from the pixel center, per supported sample
/// count.

use glam::Vec2;

const SAMPLES_1: [[i8; 2]; 1] = [[0, 0]];

const SAMPLES_2: [[i8; 2]; 2] = [[4, 4], [-4, -4]];

const SAMPLES_4: [[i8; 2]; 4] = [[-2, -6], [6, -2], [-6, 2], [2, 6]];

const SAMPLES_8: [[i8; 2]; 8] = [
    [1, -3], [-1, 3], [5, 1], [-3, -5],
    [-5, 5], [-7, -1], [3, 7], [7, -7],
];

const SAMPLES_16: [[i8; 2]; 16] = [
    [1, 1], [-1, -3], [-3, 2], [4, -1],
    [-5, -2], [2, 5], [5, 3], [3, -5],
    [-2, 6], [0, -7], [-4, -6], [-6, 4],
    [-8, 0], [7, -4], [6, 7], [-7, -8],
];

/// Offset table of a sample count, `None` for unsupported counts
pub fn standard_sample_positions(samples: u32) -> Option<&'static [[i8; 2]]> {
    match samples {
        1 => Some(&SAMPLES_1),
        2 => Some(&SAMPLES_2),
        4 => Some(&SAMPLES_4),
        8 => Some(&SAMPLES_8),
        16 => Some(&SAMPLES_16),
        _ => None,
    }
}

/// Convert a 1/16-pixel center offset to a position in `[0, 1)`
pub fn normalized_position(offset: [i8; 2]) -> Vec2 {
    (Vec2::new(offset[0] as f32, offset[1] as f32) + 8.0) / 16.0
}

#[cfg(test)]
#[path = "sample_positions_tests.rs"]
mod tests;
