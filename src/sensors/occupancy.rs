//! Seat occupancy from the ultrasonic range finder.
//!
//! The sensor points up from the seat base; anything closer than the
//! threshold is a person sitting down. Unknown distance means "empty".

/// Centimetres per metre.
const CM_PER_M: f32 = 100.0;

/// Occupied iff the distance is strictly below `threshold_cm`.
///
/// `None` (no echo yet) and non-finite values read as unoccupied.
pub fn is_occupied(distance_m: Option<f32>, threshold_cm: f32) -> bool {
    match distance_m {
        Some(m) if m.is_finite() => m * CM_PER_M < threshold_cm,
        _ => false,
    }
}
