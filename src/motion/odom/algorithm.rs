use crate::math::Angle;

/// Headings changing less than this per cycle are treated as a straight line.
const STRAIGHT_EPSILON: f64 = 1e-9;

/// Robot-frame displacement of the tracking centre over one cycle.
///
/// Uses the arc method: the robot is assumed to travel on a circular arc, so
/// the chord length is `2 sin(dθ/2)` times the arc radius of each wheel, with
/// the wheel offset removed to get the radius at the centre.
/// Equation 6 of <http://thepilons.ca/wp-content/uploads/2018/10/Tracking.pdf>.
///
/// Returns `(forward, right)` in inches.
pub(crate) fn local_displacement(
    delta_vertical: f64,
    delta_horizontal: f64,
    delta_t: Angle,
    vertical_offset: f64,
    horizontal_offset: f64,
) -> (f64, f64) {
    let dt = delta_t.as_radians();
    if dt.abs() < STRAIGHT_EPSILON {
        return (delta_vertical, delta_horizontal);
    }
    let chord = 2.0 * (dt / 2.0).sin();
    let forward = chord * (delta_vertical / dt - vertical_offset);
    let right = chord * (delta_horizontal / dt + horizontal_offset);
    (forward, right)
}

/// Rotates a robot-frame `(forward, right)` step into field `(dx, dy)` for a
/// robot facing `heading` (counter-clockwise from +x).
pub(crate) fn rotate_to_field(forward: f64, right: f64, heading: Angle) -> (f64, f64) {
    let (s, c) = (heading.sin(), heading.cos());
    (forward * c + right * s, forward * s - right * c)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn straight_line_passes_deltas_through() {
        let (f, r) = local_displacement(4.0, -1.0, Angle::ZERO, -3.0, -5.0);
        assert_eq!((f, r), (4.0, -1.0));
    }

    #[test]
    fn turning_in_place_does_not_translate() {
        // A quarter turn counter-clockwise: a wheel 3" left of centre rolls
        // backward, a wheel 5" behind centre rolls right.
        let dt = Angle::from_degrees(90.0);
        let dv = -3.0 * dt.as_radians();
        let dh = 5.0 * dt.as_radians();
        let (f, r) = local_displacement(dv, dh, dt, -3.0, -5.0);
        assert_relative_eq!(f, 0.0, epsilon = 1e-9);
        assert_relative_eq!(r, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn arc_chord_is_shorter_than_arc() {
        // Centre wheel rolling 10" while turning 90°: chord of a quarter
        // circle with radius 10/(π/2).
        let dt = Angle::from_degrees(90.0);
        let (f, _) = local_displacement(10.0, 0.0, dt, 0.0, 0.0);
        let radius = 10.0 / dt.as_radians();
        assert_relative_eq!(f, radius * 2.0_f64.sqrt(), epsilon = 1e-9);
        assert!(f < 10.0);
    }

    #[test]
    fn rotate_to_field_basic() {
        let (dx, dy) = rotate_to_field(1.0, 3.0, Angle::from_degrees(90.0));
        assert_relative_eq!(dx, 3.0, epsilon = 1e-10);
        assert_relative_eq!(dy, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn rotate_to_field_facing_plus_x() {
        let (dx, dy) = rotate_to_field(4.65, 7.89, Angle::ZERO);
        assert_relative_eq!(dx, 4.65, epsilon = 1e-10);
        assert_relative_eq!(dy, -7.89, epsilon = 1e-10);
    }
}
