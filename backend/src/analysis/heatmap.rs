use image::{Rgb, RgbImage};

/// JET colormap: 0 is dark blue, 255 dark red.
pub fn jet(value: u8) -> Rgb<u8> {
    let t = f64::from(value) / 255.0;
    let channel = |center: f64| {
        let level = (1.5 - (4.0 * t - center).abs()).clamp(0.0, 1.0);
        (level * 255.0).round() as u8
    };
    Rgb([channel(3.0), channel(2.0), channel(1.0)])
}

/// Inverts the mangrove mask so dense vegetation lands at the blue
/// ("high carbon") end of the colormap.
pub fn render(mask: &[u8], width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let value = mask[(y * width + x) as usize];
        jet(!value)
    })
}
