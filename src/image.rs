use piet::kurbo::{Point, Rect};
use piet::{
    FontFamily, FontWeight, ImageFormat, InterpolationMode, RenderContext, Text, TextAttribute,
    TextLayout, TextLayoutBuilder,
};
use pangocairo::pango::prelude::{FontFamilyExt, FontMapExt};
use piet_common::Device;
use time::OffsetDateTime;

use crate::error::{DrawError, StartupError};
use crate::frame::{Bitmap, DisplayFrame, InfoFrame};
use crate::layout::{self, Anchor, Face, TextItem};
use crate::sources::Readings;

const HEADLINE_FAMILY: &str = "Noto Sans KR";
const DISPLAY_FAMILY: &str = "Pretendard";

#[derive(Clone, Debug)]
pub struct FontFace {
    pub family: FontFamily,
    pub weight: FontWeight,
    pub size: f64,
}

impl FontFace {
    fn new(family: &FontFamily, weight: FontWeight, size: f64) -> Self {
        Self {
            family: family.clone(),
            weight,
            size,
        }
    }
}

/// The five faces the kiosk draws with.
#[derive(Clone, Debug)]
pub struct Fonts {
    news: FontFace,
    weather: FontFace,
    dust_value: FontFace,
    time: FontFace,
    date: FontFace,
}

impl Fonts {
    /// Look up both families among the fonts pango can draw with. A missing family is fatal,
    /// since pango would otherwise substitute another font without saying so.
    pub fn resolve() -> Result<Self, StartupError> {
        Self::from_installed(&installed_families())
    }

    fn from_installed(installed: &[String]) -> Result<Self, StartupError> {
        let find = |family: &'static str| {
            installed
                .iter()
                .find(|name| name.eq_ignore_ascii_case(family))
                .map(|name| FontFamily::new_unchecked(name.as_str()))
                .ok_or(StartupError::Font(family))
        };

        Ok(Self::with_families(
            &find(HEADLINE_FAMILY)?,
            &find(DISPLAY_FAMILY)?,
        ))
    }

    /// Same sizes and weights, drawn with whatever the system uses for sans-serif.
    #[cfg(test)]
    pub fn system() -> Self {
        Self::with_families(&FontFamily::SANS_SERIF, &FontFamily::SANS_SERIF)
    }

    fn with_families(headline: &FontFamily, display: &FontFamily) -> Self {
        Self {
            news: FontFace::new(headline, FontWeight::MEDIUM, 50.),
            weather: FontFace::new(display, FontWeight::EXTRA_BOLD, 70.),
            dust_value: FontFace::new(display, FontWeight::REGULAR, 45.),
            time: FontFace::new(display, FontWeight::BLACK, 225.),
            date: FontFace::new(display, FontWeight::BOLD, 75.),
        }
    }

    pub fn face(&self, face: Face) -> &FontFace {
        match face {
            Face::News => &self.news,
            Face::Weather => &self.weather,
            Face::DustValue => &self.dust_value,
            Face::Time => &self.time,
            Face::Date => &self.date,
        }
    }
}

fn installed_families() -> Vec<String> {
    pangocairo::FontMap::default()
        .list_families()
        .iter()
        .map(|family| family.name().to_string())
        .collect()
}

/// Draws data and clock overlays. Every call starts from a fresh surface, so identical inputs
/// give identical pixels.
pub struct Composer {
    background: Bitmap,
    fonts: Fonts,
}

impl Composer {
    pub fn new(background: Bitmap, fonts: Fonts) -> Self {
        Self { background, fonts }
    }

    /// Size of every frame this composer produces.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.background.width(), self.background.height())
    }

    /// The bare background, for when nothing could be composed over it.
    pub fn background_frame(&self) -> InfoFrame {
        InfoFrame::from(self.background.clone())
    }

    pub fn compose_info(&self, readings: &Readings) -> Result<InfoFrame, DrawError> {
        paint(
            &self.background,
            &layout::info_layout(readings),
            &self.fonts,
        )
        .map(InfoFrame::from)
    }

    pub fn compose_clock(
        &self,
        info: &InfoFrame,
        now: OffsetDateTime,
    ) -> Result<DisplayFrame, DrawError> {
        paint(info.bitmap(), &layout::clock_layout(now), &self.fonts).map(DisplayFrame::from)
    }
}

/// Copy `base` onto a new surface and draw `items` over it.
fn paint(base: &Bitmap, items: &[TextItem], fonts: &Fonts) -> Result<Bitmap, DrawError> {
    let (width, height) = (base.width(), base.height());
    let mut device = Device::new()?;
    let mut target = device.bitmap_target(width, height, 1.)?;

    {
        let mut ctx = target.render_context();

        let background = ctx.make_image(width, height, base.pixels(), ImageFormat::RgbaPremul)?;
        ctx.draw_image(
            &background,
            Rect::from_origin_size(Point::ORIGIN, (width as f64, height as f64)),
            InterpolationMode::NearestNeighbor,
        );

        for item in items {
            let font = fonts.face(item.face);
            let text = ctx
                .text()
                .new_text_layout(item.text.clone())
                .font(font.family.clone(), font.size)
                .default_attribute(TextAttribute::Weight(font.weight))
                .text_color(item.fill.color())
                .build()?;

            let origin = match item.anchor {
                Anchor::TopLeft => item.position,
                Anchor::Center => Rect::from_center_size(item.position, text.size()).origin(),
            };
            ctx.draw_text(&text, origin);
        }

        ctx.finish()?;
    }

    let image = target.to_image_buf(ImageFormat::RgbaPremul)?;
    Ok(Bitmap::new(width, height, image.raw_pixels().to_vec()))
}
