use ndarray::{Array3, ArrayViewMut1, Axis, Zip};
use serde::{Deserialize, Serialize};

use crate::consts::{COLOR_CHANNEL_COUNT, LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};

/// Color space the magnification runs in.
///
/// Frames arrive and leave as RGB; the pipeline converts into the working
/// space before filtering and back afterwards, so channel flags and the
/// heartbeat analyzer see the working-space channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorSpace {
    #[default]
    Rgb,
    YCrCb,
    Yuv,
    Xyz,
    Hsv,
    Lab,
    Luv,
}

impl std::fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rgb => write!(f, "RGB"),
            Self::YCrCb => write!(f, "YCrCb"),
            Self::Yuv => write!(f, "YUV"),
            Self::Xyz => write!(f, "XYZ"),
            Self::Hsv => write!(f, "HSV"),
            Self::Lab => write!(f, "Lab"),
            Self::Luv => write!(f, "Luv"),
        }
    }
}

const CR_SCALE: f32 = 0.713;
const CB_SCALE: f32 = 0.564;
const U_SCALE: f32 = 0.492;
const V_SCALE: f32 = 0.877;
const CHROMA_OFFSET: f32 = 0.5;

// D65 reference white.
const WHITE_X: f32 = 0.950_456;
const WHITE_Z: f32 = 1.088_754;

// CIE lightness curve: cube root above DELTA^3, linear below.
const LAB_DELTA: f32 = 6.0 / 29.0;
const LAB_SLOPE: f32 = 841.0 / 108.0;
const LAB_OFFSET: f32 = 16.0 / 116.0;

// Lab and Luv are stored scaled into roughly [0, 1], matching their 8-bit
// encodings: L / 100, chroma shifted and divided by its range.
const L_RANGE: f32 = 100.0;
const LAB_AB_SHIFT: f32 = 128.0;
const LAB_AB_RANGE: f32 = 255.0;
const LUV_U_SHIFT: f32 = 134.0;
const LUV_U_RANGE: f32 = 354.0;
const LUV_V_SHIFT: f32 = 140.0;
const LUV_V_RANGE: f32 = 262.0;

const RGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.412_453, 0.357_580, 0.180_423],
    [0.212_671, 0.715_160, 0.072_169],
    [0.019_334, 0.119_193, 0.950_227],
];

const XYZ_TO_RGB: [[f32; 3]; 3] = [
    [3.240_479, -1.537_150, -0.498_535],
    [-0.969_256, 1.875_991, 0.041_556],
    [0.055_648, -0.204_043, 1.057_311],
];

impl ColorSpace {
    /// Convert RGB data into this color space in place.
    pub fn forward(&self, data: &mut Array3<f32>) {
        match self {
            Self::Rgb => {}
            Self::YCrCb => for_each_pixel(data, |r, g, b| {
                let y = luma(r, g, b);
                [y, (r - y) * CR_SCALE + CHROMA_OFFSET, (b - y) * CB_SCALE + CHROMA_OFFSET]
            }),
            Self::Yuv => for_each_pixel(data, |r, g, b| {
                let y = luma(r, g, b);
                [y, (b - y) * U_SCALE + CHROMA_OFFSET, (r - y) * V_SCALE + CHROMA_OFFSET]
            }),
            Self::Xyz => for_each_pixel(data, |r, g, b| mat_mul(&RGB_TO_XYZ, r, g, b)),
            Self::Hsv => for_each_pixel(data, rgb_to_hsv),
            Self::Lab => for_each_pixel(data, |r, g, b| {
                let [x, y, z] = mat_mul(&RGB_TO_XYZ, r, g, b);
                xyz_to_lab(x, y, z)
            }),
            Self::Luv => for_each_pixel(data, |r, g, b| {
                let [x, y, z] = mat_mul(&RGB_TO_XYZ, r, g, b);
                xyz_to_luv(x, y, z)
            }),
        }
    }

    /// Convert data in this color space back to RGB in place.
    pub fn backward(&self, data: &mut Array3<f32>) {
        match self {
            Self::Rgb => {}
            Self::YCrCb => for_each_pixel(data, |y, cr, cb| {
                let r = y + (cr - CHROMA_OFFSET) / CR_SCALE;
                let b = y + (cb - CHROMA_OFFSET) / CB_SCALE;
                [r, green_from_luma(y, r, b), b]
            }),
            Self::Yuv => for_each_pixel(data, |y, u, v| {
                let r = y + (v - CHROMA_OFFSET) / V_SCALE;
                let b = y + (u - CHROMA_OFFSET) / U_SCALE;
                [r, green_from_luma(y, r, b), b]
            }),
            Self::Xyz => for_each_pixel(data, |x, y, z| mat_mul(&XYZ_TO_RGB, x, y, z)),
            Self::Hsv => for_each_pixel(data, hsv_to_rgb),
            Self::Lab => for_each_pixel(data, |l, a, b| {
                let [x, y, z] = lab_to_xyz(l, a, b);
                mat_mul(&XYZ_TO_RGB, x, y, z)
            }),
            Self::Luv => for_each_pixel(data, |l, u, v| {
                let [x, y, z] = luv_to_xyz(l, u, v);
                mat_mul(&XYZ_TO_RGB, x, y, z)
            }),
        }
    }
}

fn luma(r: f32, g: f32, b: f32) -> f32 {
    LUMINANCE_R * r + LUMINANCE_G * g + LUMINANCE_B * b
}

fn green_from_luma(y: f32, r: f32, b: f32) -> f32 {
    (y - LUMINANCE_R * r - LUMINANCE_B * b) / LUMINANCE_G
}

/// Hue is stored as a fraction of a turn.
fn rgb_to_hsv(r: f32, g: f32, b: f32) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let s = if max > 0.0 { delta / max } else { 0.0 };
    let h = if delta <= 0.0 {
        0.0
    } else if max == r {
        (g - b) / delta
    } else if max == g {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    };
    [(h / 6.0).rem_euclid(1.0), s, max]
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let sector = h.rem_euclid(1.0) * 6.0;
    let i = sector.floor();
    let f = sector - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match i as u32 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

fn lab_f(t: f32) -> f32 {
    if t > LAB_DELTA.powi(3) {
        t.cbrt()
    } else {
        LAB_SLOPE * t + LAB_OFFSET
    }
}

fn lab_f_inv(f: f32) -> f32 {
    if f > LAB_DELTA {
        f.powi(3)
    } else {
        (f - LAB_OFFSET) / LAB_SLOPE
    }
}

/// CIE lightness in [0, 100]; exactly zero for black.
fn lightness(y: f32) -> f32 {
    if y > LAB_DELTA.powi(3) {
        116.0 * y.cbrt() - 16.0
    } else {
        116.0 * LAB_SLOPE * y
    }
}

fn xyz_to_lab(x: f32, y: f32, z: f32) -> [f32; 3] {
    let fx = lab_f(x / WHITE_X);
    let fy = lab_f(y);
    let fz = lab_f(z / WHITE_Z);
    [
        lightness(y) / L_RANGE,
        (500.0 * (fx - fy) + LAB_AB_SHIFT) / LAB_AB_RANGE,
        (200.0 * (fy - fz) + LAB_AB_SHIFT) / LAB_AB_RANGE,
    ]
}

fn lab_to_xyz(l: f32, a: f32, b: f32) -> [f32; 3] {
    let fy = (l * L_RANGE + 16.0) / 116.0;
    let fx = fy + (a * LAB_AB_RANGE - LAB_AB_SHIFT) / 500.0;
    let fz = fy - (b * LAB_AB_RANGE - LAB_AB_SHIFT) / 200.0;
    [lab_f_inv(fx) * WHITE_X, lab_f_inv(fy), lab_f_inv(fz) * WHITE_Z]
}

/// Chromaticity `(u', v')` of an XYZ color.
fn uv_prime(x: f32, y: f32, z: f32) -> (f32, f32) {
    let d = x + 15.0 * y + 3.0 * z;
    if d > 0.0 {
        (4.0 * x / d, 9.0 * y / d)
    } else {
        (0.0, 0.0)
    }
}

fn xyz_to_luv(x: f32, y: f32, z: f32) -> [f32; 3] {
    let (un, vn) = uv_prime(WHITE_X, 1.0, WHITE_Z);
    let (up, vp) = uv_prime(x, y, z);
    let l = lightness(y);
    [
        l / L_RANGE,
        (13.0 * l * (up - un) + LUV_U_SHIFT) / LUV_U_RANGE,
        (13.0 * l * (vp - vn) + LUV_V_SHIFT) / LUV_V_RANGE,
    ]
}

fn luv_to_xyz(l: f32, u: f32, v: f32) -> [f32; 3] {
    let l = l * L_RANGE;
    if l <= 0.0 {
        return [0.0; 3];
    }
    let (un, vn) = uv_prime(WHITE_X, 1.0, WHITE_Z);
    let up = (u * LUV_U_RANGE - LUV_U_SHIFT) / (13.0 * l) + un;
    let vp = (v * LUV_V_RANGE - LUV_V_SHIFT) / (13.0 * l) + vn;
    let y = lab_f_inv((l + 16.0) / 116.0);
    if vp <= 0.0 {
        return [0.0, y, 0.0];
    }
    [
        y * 9.0 * up / (4.0 * vp),
        y,
        y * (12.0 - 3.0 * up - 20.0 * vp) / (4.0 * vp),
    ]
}

fn mat_mul(m: &[[f32; 3]; 3], a: f32, b: f32, c: f32) -> [f32; 3] {
    [
        m[0][0] * a + m[0][1] * b + m[0][2] * c,
        m[1][0] * a + m[1][1] * b + m[1][2] * c,
        m[2][0] * a + m[2][1] * b + m[2][2] * c,
    ]
}

/// Apply a per-pixel 3-channel transform. Frames that are not 3-channel are
/// left untouched.
fn for_each_pixel<F>(data: &mut Array3<f32>, convert: F)
where
    F: Fn(f32, f32, f32) -> [f32; 3] + Sync,
{
    if data.dim().2 != COLOR_CHANNEL_COUNT {
        return;
    }
    Zip::from(data.lanes_mut(Axis(2))).par_for_each(|mut px: ArrayViewMut1<f32>| {
        let out = convert(px[0], px[1], px[2]);
        px[0] = out[0];
        px[1] = out[1];
        px[2] = out[2];
    });
}
