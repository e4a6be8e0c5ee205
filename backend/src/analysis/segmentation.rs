use image::{Rgb, RgbImage};

/// Class a pixel is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandCover {
    Mangrove,
    Water,
    Land,
}

impl LandCover {
    /// Paint color in the segmented image, matching the client legend.
    pub fn color(self) -> Rgb<u8> {
        match self {
            LandCover::Mangrove => Rgb([0x00, 0xFF, 0x00]),
            LandCover::Water => Rgb([0x00, 0x00, 0xFF]),
            LandCover::Land => Rgb([0xFF, 0xD7, 0x00]),
        }
    }

    /// Green-dominant pixels are vegetation, blue-dominant ones water,
    /// everything else land.
    pub fn classify(pixel: &Rgb<u8>, margin: u8) -> Self {
        let [r, g, b] = pixel.0.map(i16::from);
        let margin = i16::from(margin);
        if g >= r + margin && g >= b + margin {
            LandCover::Mangrove
        } else if b >= r + margin && b >= g + margin {
            LandCover::Water
        } else {
            LandCover::Land
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub mangrove: u64,
    pub water: u64,
    pub land: u64,
}

impl ClassCounts {
    pub fn total(&self) -> u64 {
        self.mangrove + self.water + self.land
    }

    fn add(&mut self, class: LandCover) {
        match class {
            LandCover::Mangrove => self.mangrove += 1,
            LandCover::Water => self.water += 1,
            LandCover::Land => self.land += 1,
        }
    }
}

/// Per-pixel class map of one image, row-major.
#[derive(Debug, Clone)]
pub struct Segmentation {
    width: u32,
    height: u32,
    classes: Vec<LandCover>,
    counts: ClassCounts,
}

impl Segmentation {
    pub fn classify(image: &RgbImage, margin: u8) -> Self {
        let mut counts = ClassCounts::default();
        let classes = image
            .pixels()
            .map(|pixel| {
                let class = LandCover::classify(pixel, margin);
                counts.add(class);
                class
            })
            .collect();

        Self {
            width: image.width(),
            height: image.height(),
            classes,
            counts,
        }
    }

    pub fn counts(&self) -> ClassCounts {
        self.counts
    }

    pub fn class_at(&self, x: u32, y: u32) -> LandCover {
        self.classes[(y * self.width + x) as usize]
    }

    pub fn render(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| self.class_at(x, y).color())
    }

    /// 255 where the pixel is mangrove, 0 elsewhere.
    pub fn mangrove_mask(&self) -> Vec<u8> {
        self.classes
            .iter()
            .map(|class| if *class == LandCover::Mangrove { 255 } else { 0 })
            .collect()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_channel_picks_the_class() {
        assert_eq!(LandCover::classify(&Rgb([20, 140, 30]), 10), LandCover::Mangrove);
        assert_eq!(LandCover::classify(&Rgb([10, 60, 180]), 10), LandCover::Water);
        assert_eq!(LandCover::classify(&Rgb([200, 180, 120]), 10), LandCover::Land);
        // grey has no dominant channel
        assert_eq!(LandCover::classify(&Rgb([90, 95, 92]), 10), LandCover::Land);
    }

    #[test]
    fn counts_cover_every_pixel() {
        let image = RgbImage::from_fn(4, 2, |x, _| match x {
            0 => Rgb([0, 200, 0]),
            1 => Rgb([0, 0, 200]),
            _ => Rgb([180, 160, 100]),
        });
        let segmentation = Segmentation::classify(&image, 10);

        assert_eq!(
            segmentation.counts(),
            ClassCounts { mangrove: 2, water: 2, land: 4 }
        );
        assert_eq!(segmentation.counts().total(), 8);
        assert_eq!(segmentation.render().get_pixel(1, 1), &LandCover::Water.color());
        assert_eq!(segmentation.mangrove_mask()[..4], [255, 0, 0, 0]);
    }
}
