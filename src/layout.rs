//! Where every piece of text goes, independent of how it is drawn.

use piet::kurbo::Point;
use piet::Color;
use time::OffsetDateTime;

use crate::dust::DustReading;
use crate::news::NewsItem;
use crate::sources::Readings;
use crate::weather::WeatherObservation;

/// Drawn in place of any field whose source could not be reached.
pub const UNAVAILABLE: &str = "정보 없음";

/// Headline slots, newest feed entry at the bottom.
pub const NEWS_POSITIONS: [Point; 3] = [
    Point::new(475., 990.),
    Point::new(475., 920.),
    Point::new(475., 850.),
];
pub const TEMPERATURE_POSITION: Point = Point::new(150., 715.);
pub const PRECIPITATION_POSITION: Point = Point::new(830., 715.);
pub const DUST_GRADE_POSITION: Point = Point::new(1485., 715.);
pub const DUST_VALUE_POSITION: Point = Point::new(1615., 735.);
pub const TIME_CENTER: Point = Point::new(960., 225.);
pub const DATE_CENTER: Point = Point::new(960., 375.);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fill {
    White,
    Black,
    Muted,
}

impl Fill {
    pub fn color(self) -> Color {
        match self {
            Self::White => Color::rgb8(0xFF, 0xFF, 0xFF),
            Self::Black => Color::rgb8(0x00, 0x00, 0x00),
            Self::Muted => Color::rgb8(0x80, 0x80, 0x80),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    News,
    Weather,
    DustValue,
    Time,
    Date,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    Center,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub position: Point,
    pub anchor: Anchor,
    pub face: Face,
    pub fill: Fill,
}

impl TextItem {
    fn at(position: Point, face: Face, fill: Fill, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position,
            anchor: Anchor::TopLeft,
            face,
            fill,
        }
    }

    fn centered(position: Point, face: Face, text: String) -> Self {
        Self {
            text,
            position,
            anchor: Anchor::Center,
            face,
            fill: Fill::Black,
        }
    }

    fn unavailable(position: Point, face: Face) -> Self {
        Self::at(position, face, Fill::Muted, UNAVAILABLE)
    }
}

pub fn info_layout(readings: &Readings) -> Vec<TextItem> {
    let mut items = news_layout(readings.news.as_deref());
    items.extend(weather_layout(readings.weather.as_ref()));
    items.extend(dust_layout(readings.dust.as_ref()));
    items
}

/// Every slot is filled: missing headlines, whether the feed failed or came up short, show the
/// placeholder.
pub fn news_layout(news: Option<&[NewsItem]>) -> Vec<TextItem> {
    NEWS_POSITIONS
        .iter()
        .enumerate()
        .map(|(slot, &position)| match news.and_then(|news| news.get(slot)) {
            Some(item) => TextItem::at(
                position,
                Face::News,
                Fill::White,
                format!(
                    "[{:02}:{:02}] {}",
                    item.published.hour(),
                    item.published.minute(),
                    item.headline
                ),
            ),
            None => TextItem::unavailable(position, Face::News),
        })
        .collect()
}

pub fn weather_layout(weather: Option<&WeatherObservation>) -> Vec<TextItem> {
    match weather {
        Some(weather) => vec![
            TextItem::at(
                TEMPERATURE_POSITION,
                Face::Weather,
                Fill::Black,
                weather.temperature_label(),
            ),
            TextItem::at(
                PRECIPITATION_POSITION,
                Face::Weather,
                Fill::Black,
                weather.precipitation.label(),
            ),
        ],
        None => vec![
            TextItem::unavailable(TEMPERATURE_POSITION, Face::Weather),
            TextItem::unavailable(PRECIPITATION_POSITION, Face::Weather),
        ],
    }
}

pub fn dust_layout(dust: Option<&DustReading>) -> Vec<TextItem> {
    match dust {
        Some(dust) => {
            let mut items = vec![TextItem::at(
                DUST_GRADE_POSITION,
                Face::Weather,
                Fill::Black,
                dust.grade.label(),
            )];
            if let Some(value) = dust.value_label() {
                items.push(TextItem::at(
                    DUST_VALUE_POSITION,
                    Face::DustValue,
                    Fill::Black,
                    value,
                ));
            }
            items
        }
        None => vec![TextItem::unavailable(DUST_GRADE_POSITION, Face::Weather)],
    }
}

/// `HH:MM:SS` above `YYYY년 MM월 DD일`.
pub fn clock_layout(now: OffsetDateTime) -> Vec<TextItem> {
    vec![
        TextItem::centered(
            TIME_CENTER,
            Face::Time,
            format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second()),
        ),
        TextItem::centered(
            DATE_CENTER,
            Face::Date,
            format!(
                "{}년 {:02}월 {:02}일",
                now.year(),
                u8::from(now.month()),
                now.day()
            ),
        ),
    ]
}
