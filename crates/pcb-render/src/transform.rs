use crate::pcbdata::BBox;

pub fn deg2rad(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

/// 2D affine map in canvas `setTransform(a, b, c, d, e, f)` layout:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(tx: f64, ty: f64) -> Affine {
        Affine {
            e: tx,
            f: ty,
            ..Affine::IDENTITY
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Affine {
        Affine {
            a: sx,
            d: sy,
            ..Affine::IDENTITY
        }
    }

    pub fn rotate(radians: f64) -> Affine {
        let (sin, cos) = radians.sin_cos();
        Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Compose with `rhs` applied to the point first, matching the order
    /// successive canvas transform calls take effect in.
    pub fn mul(&self, rhs: &Affine) -> Affine {
        Affine {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            e: self.a * rhs.e + self.c * rhs.f + self.e,
            f: self.b * rhs.e + self.d * rhs.f + self.f,
        }
    }

    pub fn apply(&self, p: [f64; 2]) -> [f64; 2] {
        [
            self.a * p[0] + self.c * p[1] + self.e,
            self.b * p[0] + self.d * p[1] + self.f,
        ]
    }
}

/// Board-space to surface-space transform: uniform scale, an optional
/// 90° rotation about the surface center, then a shift so the board's
/// minimum corner lands at the surface origin. Deterministic in the
/// document bounding box, the rotate flag, and the scale factors alone.
pub fn surface_transform(bbox: &BBox, rotate: bool, pixel_ratio: f64, scale: f64) -> Affine {
    let k = scale * pixel_ratio;
    let mut t = Affine::scale(k, k);
    if rotate {
        // Surface dimensions are the board's, swapped.
        let x = bbox.height() / 2.0;
        let y = bbox.width() / 2.0;
        t = t
            .mul(&Affine::translate(x, y))
            .mul(&Affine::rotate(deg2rad(90.0)))
            .mul(&Affine::translate(-y, -x));
    }
    t.mul(&Affine::translate(-bbox.minx, -bbox.miny))
}
