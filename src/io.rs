//! Text formats for airfoils: `.dat` coordinate files and `.bez` Bezier definition files. Both
//! start with a line holding the airfoil name.

use crate::airfoil::{Airfoil, BezierSides, Side};
use crate::errors::{GeometryError, Result};
use crate::geometry::bezier::Bezier2;
use ncollide2d::na::Point2;
use tracing::warn;

fn parse_pair(line: &str, number: usize) -> Result<Option<Point2<f64>>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 2 {
        return Ok(None);
    }

    let parse = |s: &str| {
        s.parse::<f64>().map_err(|e| GeometryError::Parse {
            line: number,
            reason: format!("'{}': {}", s, e),
        })
    };
    Ok(Some(Point2::new(parse(fields[0])?, parse(fields[1])?)))
}

/// Renders an airfoil in the `.dat` format, one "x y" pair with 7 decimals per line
pub fn write_dat(name: &str, airfoil: &Airfoil) -> String {
    let mut text = format!("{}\n", name);
    for p in airfoil.points() {
        text.push_str(&format!("{:.7} {:.7}\n", p.x, p.y));
    }
    text
}

/// Reads a `.dat` file. Lines with fewer than two fields are skipped, and so are points which
/// repeat the previous one.
pub fn parse_dat(text: &str) -> Result<Airfoil> {
    let mut lines = text.lines();
    let name = lines.next().map(str::trim).unwrap_or_default().to_string();

    let mut points: Vec<Point2<f64>> = Vec::new();
    for (i, line) in lines.enumerate() {
        if let Some(p) = parse_pair(line, i + 2)? {
            if points.last() == Some(&p) {
                warn!(airfoil = %name, line = i + 2, "duplicate coordinate skipped");
                continue;
            }
            points.push(p);
        }
    }

    Airfoil::new(name, points)
}

/// Renders the control points of both sides in the `.bez` format
pub fn write_bez(name: &str, sides: &BezierSides) -> String {
    let mut text = format!("{}\n", name);
    for (label, side) in [("Top", Side::Upper), ("Bottom", Side::Lower)] {
        text.push_str(&format!("{} Start\n", label));
        for p in sides.side(side).points() {
            text.push_str(&format!("{:13.10} {:13.10}\n", p.x, p.y));
        }
        text.push_str(&format!("{} End\n", label));
    }
    text
}

/// Reads a `.bez` file and returns the airfoil name and both curves. The side markers are
/// matched case insensitively.
pub fn parse_bez(text: &str) -> Result<(String, BezierSides)> {
    let mut lines = text.lines();
    let name = lines.next().map(str::trim).unwrap_or_default().to_string();

    let mut upper: Option<Bezier2> = None;
    let mut lower: Option<Bezier2> = None;
    let mut open: Option<(Side, Vec<Point2<f64>>)> = None;

    for (i, line) in lines.enumerate() {
        let number = i + 2;
        let lowered = line.to_lowercase();
        let error = |reason: &str| GeometryError::Parse {
            line: number,
            reason: reason.to_string(),
        };

        if lowered.contains("start") {
            let side = if lowered.contains("top") { Side::Upper } else { Side::Lower };
            open = Some((side, Vec::new()));
        } else if lowered.contains("end") {
            let (side, points) = open.take().ok_or_else(|| error("end marker without start"))?;
            let closes = if lowered.contains("top") { Side::Upper } else { Side::Lower };
            if side != closes {
                return Err(error("end marker of the other side"));
            }
            let curve = Bezier2::new(points)?;
            match side {
                Side::Upper => upper = Some(curve),
                Side::Lower => lower = Some(curve),
            }
        } else if let Some(p) = parse_pair(line, number)? {
            match open.as_mut() {
                Some((_, points)) => points.push(p),
                None => return Err(error("control point outside of a side")),
            }
        }
    }

    match (upper, lower) {
        (Some(upper), Some(lower)) => Ok((name, BezierSides { upper, lower })),
        _ => Err(GeometryError::Parse {
            line: text.lines().count(),
            reason: "both a top and a bottom side are required".to_string(),
        }),
    }
}
