/*!
 * Conversion out of the projected coordinate system the perimeters are distributed in.
 *
 * The only source projection supported is WKID 102008, North America Albers Equal Area Conic on
 * the NAD83 datum. The inverse is done on the GRS80 ellipsoid following the series in Snyder's
 * "Map Projections - A Working Manual" (USGS Professional Paper 1395), eqs. 14-19 to 14-21 and
 * 3-16. NAD83 and WGS84 differ by well under a meter over North America, so the output is taken
 * as WGS84 latitude and longitude directly.
 */
use super::{Coord, ProjectedPoint};
use crate::error::{FireSmokeError, FireSmokeResult};
use std::f64::consts::{FRAC_PI_2, PI};

/// ESRI identifier for North America Albers Equal Area Conic.
pub const NORTH_AMERICA_ALBERS_WKID: u32 = 102008;

const GRS80_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const GRS80_INVERSE_FLATTENING: f64 = 298.257_222_101;

const MAX_ITERATIONS: usize = 25;
const CONVERGENCE_TOLERANCE: f64 = 1.0e-12;
const POLE_TOLERANCE: f64 = 1.0e-10;

/// An ellipsoidal Albers equal area conic projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    wkid: u32,
    /// Semi-major axis, meters.
    a: f64,
    /// First eccentricity and its square.
    e: f64,
    e2: f64,
    /// Central meridian, radians.
    lon0: f64,
    /// Cone constant.
    n: f64,
    c: f64,
    /// Radius of the parallel of origin, meters.
    rho0: f64,
    /// Value of q at the pole, the largest valid magnitude.
    qp: f64,
}

impl Projection {
    /// Resolve a source projection by its well known identifier.
    ///
    /// An unknown identifier is a configuration error, every coordinate in the batch would fail.
    pub fn from_wkid(wkid: u32) -> FireSmokeResult<Self> {
        match wkid {
            NORTH_AMERICA_ALBERS_WKID => Ok(Self::north_america_albers()),
            _ => Err(FireSmokeError::config(format!(
                "unsupported source projection WKID: {}",
                wkid
            ))),
        }
    }

    /// WKID 102008.
    pub fn north_america_albers() -> Self {
        Self::albers(NORTH_AMERICA_ALBERS_WKID, 40.0, -96.0, 20.0, 60.0)
    }

    fn albers(wkid: u32, lat0: f64, lon0: f64, lat1: f64, lat2: f64) -> Self {
        let a = GRS80_SEMI_MAJOR_AXIS;
        let f = 1.0 / GRS80_INVERSE_FLATTENING;
        let e2 = f * (2.0 - f);
        let e = e2.sqrt();

        let m = |phi: f64| phi.cos() / (1.0 - e2 * phi.sin().powi(2)).sqrt();
        let q = |phi: f64| authalic_q(phi.sin(), e, e2);

        let (phi0, phi1, phi2) = (lat0.to_radians(), lat1.to_radians(), lat2.to_radians());

        let m1 = m(phi1);
        let m2 = m(phi2);
        let q1 = q(phi1);
        let q2 = q(phi2);
        let q0 = q(phi0);

        let n = (m1 * m1 - m2 * m2) / (q2 - q1);
        let c = m1 * m1 + n * q1;
        let rho0 = a * (c - n * q0).sqrt() / n;
        let qp = authalic_q(1.0, e, e2);

        Projection {
            wkid,
            a,
            e,
            e2,
            lon0: lon0.to_radians(),
            n,
            c,
            rho0,
            qp,
        }
    }

    pub fn wkid(&self) -> u32 {
        self.wkid
    }

    /// Convert a ring of projected points to geodetic coordinates.
    ///
    /// The output is in the same order as the input, including the closing point. Any point that
    /// cannot be converted fails the whole ring.
    pub fn project_to_geodetic(&self, ring: &[ProjectedPoint]) -> FireSmokeResult<Vec<Coord>> {
        ring.iter().map(|&pnt| self.to_geodetic(pnt)).collect()
    }

    /// Convert geodetic coordinates into the projection, the reverse of
    /// [project_to_geodetic](Projection::project_to_geodetic).
    pub fn project_from_geodetic(&self, ring: &[Coord]) -> FireSmokeResult<Vec<ProjectedPoint>> {
        ring.iter().map(|&coord| self.from_geodetic(coord)).collect()
    }

    /// Inverse projection of a single point.
    pub fn to_geodetic(&self, pnt: ProjectedPoint) -> FireSmokeResult<Coord> {
        let ProjectedPoint { x, y } = pnt;
        let err = |msg: &'static str| FireSmokeError::Projection { x, y, msg };

        if !x.is_finite() || !y.is_finite() {
            return Err(err("non-finite coordinate"));
        }

        let dy = self.rho0 - y;
        let rho = x.hypot(dy);
        let theta = x.atan2(dy);

        if theta.abs() > self.n * PI {
            return Err(err("outside the projection wedge"));
        }

        let mut q = (self.c - (rho * self.n / self.a).powi(2)) / self.n;
        if q.abs() > self.qp {
            if q.abs() - self.qp > POLE_TOLERANCE {
                return Err(err("beyond the pole"));
            }
            q = self.qp.copysign(q);
        }

        let phi = if self.qp - q.abs() < POLE_TOLERANCE {
            FRAC_PI_2.copysign(q)
        } else {
            self.latitude_from_q(q).ok_or_else(|| err("latitude did not converge"))?
        };

        let lon = wrap_longitude((self.lon0 + theta / self.n).to_degrees());

        Ok(Coord {
            lat: phi.to_degrees(),
            lon,
        })
    }

    /// Forward projection of a single point.
    pub fn from_geodetic(&self, coord: Coord) -> FireSmokeResult<ProjectedPoint> {
        let Coord { lat, lon } = coord;
        let err = |msg: &'static str| FireSmokeError::Projection { x: lon, y: lat, msg };

        if !lat.is_finite() || !lon.is_finite() {
            return Err(err("non-finite coordinate"));
        }

        if lat.abs() > 90.0 {
            return Err(err("latitude out of range"));
        }

        let q = authalic_q(lat.to_radians().sin(), self.e, self.e2);
        let rho = self.a * (self.c - self.n * q).max(0.0).sqrt() / self.n;

        let mut dlon = lon.to_radians() - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }
        let theta = self.n * dlon;

        Ok(ProjectedPoint {
            x: rho * theta.sin(),
            y: self.rho0 - rho * theta.cos(),
        })
    }

    /// Iterate for the latitude (radians) that has the authalic value q.
    fn latitude_from_q(&self, q: f64) -> Option<f64> {
        let (e, e2) = (self.e, self.e2);
        let mut phi = (q / 2.0).asin();

        for _ in 0..MAX_ITERATIONS {
            let sin_phi = phi.sin();
            let cos_phi = phi.cos();
            let es = e * sin_phi;
            let one_minus = 1.0 - es * es;

            let dphi = one_minus * one_minus / (2.0 * cos_phi)
                * (q / (1.0 - e2) - sin_phi / one_minus
                    + 1.0 / (2.0 * e) * ((1.0 - es) / (1.0 + es)).ln());

            phi += dphi;

            if !phi.is_finite() {
                return None;
            }

            if dphi.abs() < CONVERGENCE_TOLERANCE {
                return Some(phi);
            }
        }

        None
    }
}

/// Snyder eq. 3-12.
fn authalic_q(sin_phi: f64, e: f64, e2: f64) -> f64 {
    let es = e * sin_phi;
    (1.0 - e2) * (sin_phi / (1.0 - es * es) - 1.0 / (2.0 * e) * ((1.0 - es) / (1.0 + es)).ln())
}

fn wrap_longitude(mut lon: f64) -> f64 {
    while lon > 180.0 {
        lon -= 360.0;
    }
    while lon < -180.0 {
        lon += 360.0;
    }
    lon
}
