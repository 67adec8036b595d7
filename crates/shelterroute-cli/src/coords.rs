//! Parsing of `X,Y` coordinate arguments.

use shelterroute_lib::Point;

/// Parse `"X,Y"` (meters) into a [`Point`]. Whitespace around either number is
/// ignored; both numbers must be finite.
pub fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", value))?;
    let x = parse_coordinate(x, "X")?;
    let y = parse_coordinate(y, "Y")?;
    Ok(Point::new(x, y))
}

fn parse_coordinate(raw: &str, axis: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{} coordinate '{}' is not a number", axis, raw.trim()))?;
    if !value.is_finite() {
        return Err(format!("{} coordinate must be finite", axis));
    }
    Ok(value)
}

/// Parse a strictly positive distance in meters.
pub fn parse_distance(value: &str) -> Result<f64, String> {
    let distance: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if distance.is_finite() && distance > 0.0 {
        Ok(distance)
    } else {
        Err("distance must be a positive number of meters".to_string())
    }
}
