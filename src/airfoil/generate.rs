use crate::airfoil::{Airfoil, SurfaceOrder};
use crate::errors::{GeometryError, Result};
use ncollide2d::na::{Point2, Vector2};
use std::f64::consts::PI;

const EPSILON: f64 = 1e-3;

/// An AirfoilGenerator is an entity which can generate the x, y position of the mean camber line
/// and the airfoil thickness at fractions of the chord. This provides the information necessary
/// for a generator to compute the airfoil surfaces.
pub trait AirfoilGenerator {
    /// Return a 2D point with the position of the camber line at a fraction from 0.0 to 1.0
    fn camber_line(&self, x: f64) -> Point2<f64>;

    /// Return the full thickness of the airfoil with respect to the camber line at a fraction from
    /// 0.0 to 1.0
    fn thickness(&self, x: f64) -> f64;

    fn name(&self) -> String;

    /// The upper and lower surface point at a chord fraction, each offset by half the thickness
    /// normal to the camber line
    fn station_at(&self, x: f64) -> (Point2<f64>, Point2<f64>) {
        let x0 = (x - EPSILON).max(0.0);
        let x1 = (x + EPSILON).min(1.0);

        let clx = self.camber_line(x);
        let d = (self.camber_line(x1) - self.camber_line(x0)).normalize();
        let n = Vector2::new(-d.y, d.x);
        let t = self.thickness(x);

        (clx + n * (t / 2.0), clx - n * (t / 2.0))
    }

    /// Generates an airfoil with `points_per_side` points on each surface, spaced with a cosine
    /// distribution which clusters them at both edges
    fn airfoil(&self, points_per_side: usize) -> Result<Airfoil> {
        if points_per_side < 3 {
            return Err(GeometryError::NotEnoughPoints {
                needed: 3,
                found: points_per_side,
            });
        }

        let (upper, lower): (Vec<_>, Vec<_>) = (0..points_per_side)
            .map(|i| {
                let beta = PI * i as f64 / (points_per_side - 1) as f64;
                self.station_at(0.5 * (1.0 - beta.cos()))
            })
            .unzip();

        Airfoil::from_sides(self.name(), &upper, &lower, SurfaceOrder::default())
    }
}

/// A generator for a NACA 4-digit airfoil of the form MPTT, where M is the maximum camber P is the
/// location of the maximum camber, and TT is the maximum thickness of the airfoil as a fraction of
/// the chord.  For example, a NACA 2412 airfoil has a 2% camber at 40% of the chord and a max
/// thickness which is 12% of the chord length.
pub struct Naca4Digit {
    t: f64,
    chord_len: f64,
    m: f64,
    p: f64,
}

impl Naca4Digit {
    /// Create a new NACA 4 digit generator.
    ///
    /// # Arguments
    ///
    /// * `t_max` - the maximum thickness of the airfoil as a fraction of the chord length. For
    /// instance, on a NACA 2412 t_max should be 0.12
    ///
    /// * `chord_len` - the actual length of the airfoil chord
    ///
    /// * `max_camber` - The max camber as a fraction, for example on a NACA 2412 this value should
    /// be set to 0.02
    ///
    /// * `max_camber_chord` - The location of the max camber as a fraction of chord length. For
    /// example on a NACA 2412 this values should be 0.4
    pub fn new(t_max: f64, chord_len: f64, max_camber: f64, max_camber_chord: f64) -> Naca4Digit {
        Naca4Digit {
            t: t_max,
            chord_len,
            m: max_camber,
            p: max_camber_chord,
        }
    }

    /// Parses a designation like "2412" or "NACA 0008"
    pub fn from_designation(text: &str) -> Result<Naca4Digit> {
        let digits: Vec<u32> = text
            .trim()
            .trim_start_matches("NACA")
            .trim()
            .chars()
            .map(|c| c.to_digit(10))
            .collect::<Option<Vec<u32>>>()
            .filter(|d| d.len() == 4)
            .ok_or_else(|| GeometryError::Parse {
                line: 1,
                reason: format!("'{}' is not a NACA 4-digit designation", text),
            })?;

        Ok(Naca4Digit::new(
            (digits[2] * 10 + digits[3]) as f64 / 100.0,
            1.0,
            digits[0] as f64 / 100.0,
            digits[1] as f64 / 10.0,
        ))
    }
}

impl AirfoilGenerator for Naca4Digit {
    fn camber_line(&self, x: f64) -> Point2<f64> {
        let y = if self.p < 1e-6 {
            0.0
        } else if x < self.p {
            (self.m / self.p.powf(2.0)) * (2.0 * self.p * x - x.powf(2.0))
        } else {
            (self.m / (1.0 - self.p).powf(2.0))
                * ((1.0 - 2.0 * self.p) + 2.0 * self.p * x - x.powf(2.0))
        };

        Point2::new(x * self.chord_len, y * self.chord_len)
    }

    fn thickness(&self, x: f64) -> f64 {
        (2.0 * self.t * self.chord_len)
            * (1.485 * x.sqrt()
                + -0.630 * x
                + -1.758 * x.powf(2.0)
                + 1.4215 * x.powf(3.0)
                + -0.5075 * x.powf(4.0))
    }

    fn name(&self) -> String {
        format!(
            "NACA {}{}{:02}",
            (self.m * 100.0).round(),
            (self.p * 10.0).round(),
            (self.t * 100.0).round()
        )
    }
}
