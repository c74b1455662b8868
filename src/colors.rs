use std::str::FromStr;

use image::Rgba;
use nanorand::{Rng, WyRand};
use palette::{Gradient, LinSrgb, Pixel, Srgb};

use crate::error::Error;

/// Named palettes for word coloring. Each scheme is a small table of sRGB
/// control points interpolated into a continuous gradient; words sample it
/// at a random position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Viridis,
    Plasma,
    Inferno,
    Magma,
    Cividis,
    Coolwarm,
    Bone,
    Copper,
    Gray,
}

impl ColorScheme {
    pub const ALL: &'static [ColorScheme] = &[
        ColorScheme::Viridis,
        ColorScheme::Plasma,
        ColorScheme::Inferno,
        ColorScheme::Magma,
        ColorScheme::Cividis,
        ColorScheme::Coolwarm,
        ColorScheme::Bone,
        ColorScheme::Copper,
        ColorScheme::Gray,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColorScheme::Viridis => "viridis",
            ColorScheme::Plasma => "plasma",
            ColorScheme::Inferno => "inferno",
            ColorScheme::Magma => "magma",
            ColorScheme::Cividis => "cividis",
            ColorScheme::Coolwarm => "coolwarm",
            ColorScheme::Bone => "bone",
            ColorScheme::Copper => "copper",
            ColorScheme::Gray => "gray",
        }
    }

    fn stops(&self) -> &'static [[f32; 3]] {
        match self {
            ColorScheme::Viridis => &[
                [0.267, 0.005, 0.329],
                [0.283, 0.141, 0.458],
                [0.254, 0.265, 0.530],
                [0.207, 0.372, 0.553],
                [0.164, 0.471, 0.558],
                [0.128, 0.567, 0.551],
                [0.135, 0.659, 0.518],
                [0.267, 0.749, 0.441],
                [0.478, 0.821, 0.318],
                [0.741, 0.873, 0.150],
                [0.993, 0.906, 0.144],
            ],
            ColorScheme::Plasma => &[
                [0.050, 0.030, 0.528],
                [0.294, 0.012, 0.631],
                [0.493, 0.012, 0.658],
                [0.658, 0.134, 0.588],
                [0.798, 0.280, 0.470],
                [0.902, 0.425, 0.360],
                [0.973, 0.586, 0.252],
                [0.993, 0.771, 0.155],
                [0.940, 0.975, 0.131],
            ],
            ColorScheme::Inferno => &[
                [0.001, 0.000, 0.014],
                [0.133, 0.047, 0.301],
                [0.342, 0.062, 0.429],
                [0.529, 0.134, 0.416],
                [0.716, 0.215, 0.330],
                [0.866, 0.350, 0.213],
                [0.956, 0.529, 0.076],
                [0.988, 0.761, 0.157],
                [0.988, 0.998, 0.645],
            ],
            ColorScheme::Magma => &[
                [0.001, 0.000, 0.014],
                [0.114, 0.065, 0.277],
                [0.317, 0.071, 0.485],
                [0.513, 0.148, 0.508],
                [0.716, 0.215, 0.475],
                [0.904, 0.320, 0.388],
                [0.987, 0.536, 0.382],
                [0.997, 0.770, 0.535],
                [0.987, 0.991, 0.750],
            ],
            ColorScheme::Cividis => &[
                [0.000, 0.135, 0.304],
                [0.122, 0.206, 0.439],
                [0.263, 0.293, 0.423],
                [0.386, 0.380, 0.425],
                [0.505, 0.469, 0.428],
                [0.634, 0.564, 0.402],
                [0.770, 0.664, 0.335],
                [0.905, 0.777, 0.232],
                [0.995, 0.909, 0.218],
            ],
            ColorScheme::Coolwarm => &[
                [0.230, 0.299, 0.754],
                [0.455, 0.540, 0.901],
                [0.690, 0.740, 0.928],
                [0.865, 0.865, 0.865],
                [0.926, 0.738, 0.648],
                [0.878, 0.519, 0.405],
                [0.706, 0.016, 0.150],
            ],
            ColorScheme::Bone => &[
                [0.000, 0.000, 0.000],
                [0.319, 0.319, 0.448],
                [0.652, 0.781, 0.781],
                [1.000, 1.000, 1.000],
            ],
            ColorScheme::Copper => &[
                [0.000, 0.000, 0.000],
                [0.621, 0.388, 0.247],
                [1.000, 0.781, 0.497],
            ],
            ColorScheme::Gray => &[[0.000, 0.000, 0.000], [1.000, 1.000, 1.000]],
        }
    }

    /// Builds the interpolating gradient for this scheme.
    pub fn gradient(&self) -> Gradient<LinSrgb> {
        Gradient::new(
            self.stops()
                .iter()
                .map(|&[r, g, b]| Srgb::new(r, g, b).into_linear())
                .collect::<Vec<_>>(),
        )
    }

    /// Samples the gradient at `t` in `[0, 1]`; out-of-range values clamp.
    pub fn sample(&self, t: f32) -> Rgba<u8> {
        let color = self.gradient().get(t.clamp(0.0, 1.0));
        let srgb: Srgb = Srgb::from_linear(color);

        let raw: [u8; 3] = srgb.into_format().into_raw();

        Rgba([raw[0], raw[1], raw[2], 255])
    }

    /// Samples the gradient at a uniformly random position, which is how
    /// placed words pick their color.
    pub fn pick(&self, rng: &mut WyRand) -> Rgba<u8> {
        let t = rng.generate_range(0..=1000u32) as f32 / 1000.0;
        self.sample(t)
    }
}

impl FromStr for ColorScheme {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.to_lowercase();
        ColorScheme::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.name() == lower)
            .ok_or_else(|| Error::UnknownColorScheme(value.to_string()))
    }
}
