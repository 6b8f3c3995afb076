use image::GrayImage;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::raster::{Raster, Rgb};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColorMap {
    Jet,
    Hot,
    #[default]
    Ocean,
    Plasma,
    Inferno,
}

// 6th order polynomial fits of the matplotlib perceptual maps, per channel
const PLASMA: [[f32; 3]; 7] = [
    [0.058_732_344, 0.023_336_709, 0.543_340_2],
    [2.176_514_6, 0.238_383_42, 0.753_960_46],
    [-2.689_460_5, -7.455_851, 3.110_8],
    [6.130_348, 42.346_188, -28.518_855],
    [-11.107_436, -82.666_31, 60.139_847],
    [10.023_066, 71.413_62, -54.072_186],
    [-3.658_714, -22.931_535, 18.191_908],
];

const INFERNO: [[f32; 3]; 7] = [
    [0.000_218_940_37, 0.001_651_004_6, -0.019_480_899],
    [0.106_513_42, 0.563_956_4, 3.932_712_4],
    [11.602_493, -3.972_854, -15.942_394],
    [-41.703_995, 17.436_4, 44.354_145],
    [77.162_94, -33.402_36, -81.807_31],
    [-71.319_43, 32.626_064, 73.209_52],
    [25.131_126, -12.242_669, -23.070_325],
];

#[inline]
fn unit(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

fn poly(coeffs: &[[f32; 3]; 7], t: f32) -> [f32; 3] {
    let mut out = [0.0; 3];

    for (ch, o) in out.iter_mut().enumerate() {
        *o = coeffs.iter().rev().fold(0.0, |acc, c| acc * t + c[ch]);
    }

    out
}

impl ColorMap {
    pub const ALL: [ColorMap; 5] = [
        ColorMap::Jet,
        ColorMap::Hot,
        ColorMap::Ocean,
        ColorMap::Plasma,
        ColorMap::Inferno,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColorMap::Jet => "JET",
            ColorMap::Hot => "HOT",
            ColorMap::Ocean => "OCEAN",
            ColorMap::Plasma => "PLASMA",
            ColorMap::Inferno => "INFERNO",
        }
    }

    /// RGB in `[0, 1]` for `t` in `[0, 1]`.
    pub fn eval(&self, t: f32) -> [f32; 3] {
        let t = unit(t);

        let rgb = match self {
            ColorMap::Jet => [
                1.5 - (4.0 * t - 3.0).abs(),
                1.5 - (4.0 * t - 2.0).abs(),
                1.5 - (4.0 * t - 1.0).abs(),
            ],
            ColorMap::Hot => [3.0 * t, 3.0 * t - 1.0, 3.0 * t - 2.0],
            ColorMap::Ocean => [3.0 * t - 2.0, ((3.0 * t - 1.0) / 2.0).abs(), t],
            ColorMap::Plasma => poly(&PLASMA, t),
            ColorMap::Inferno => poly(&INFERNO, t),
        };

        [unit(rgb[0]), unit(rgb[1]), unit(rgb[2])]
    }

    pub fn color(&self, intensity: u8) -> Rgb {
        let [r, g, b] = self.eval(intensity as f32 / 255.0);
        let q = |v: f32| (v * 255.0).round() as u8;

        [q(r), q(g), q(b)]
    }

    pub fn lut(&self) -> Vec<Rgb> {
        (0..=255u8).map(|i| self.color(i)).collect()
    }

    /// Colorizes a grayscale image.
    pub fn apply(&self, gray: &GrayImage) -> Result<Raster, Error> {
        #[cfg(feature = "opencv")]
        let out = crate::cv::apply_color_map(gray, *self)?;

        #[cfg(not(feature = "opencv"))]
        let out = {
            let lut = self.lut();
            Raster::from_image(imageproc::map::map_colors(gray, |p: image::Luma<u8>| {
                image::Rgb(lut[p[0] as usize])
            }))
        };

        Ok(out)
    }
}

impl fmt::Display for ColorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorMap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorMap::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownColorMap(s.to_string()))
    }
}
