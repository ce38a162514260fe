use std::future::Future;

use time::UtcOffset;

use crate::config::{self, REQUEST_TIMEOUT};
use crate::dust::{self, DustReading};
use crate::error::FetchError;
use crate::news::{self, NewsItem};
use crate::weather::{self, WeatherObservation};

/// Everything a refresh cycle learned. `None` means the source is unavailable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Readings {
    pub news: Option<Vec<NewsItem>>,
    pub weather: Option<WeatherObservation>,
    pub dust: Option<DustReading>,
}

/// Produces one full set of readings per refresh cycle.
pub trait Gather: Send + Sync + 'static {
    fn gather(&self) -> impl Future<Output = Readings> + Send;
}

pub struct Sources {
    client: reqwest::Client,
    service_key: Option<String>,
    offset: UtcOffset,
}

impl Sources {
    pub fn new(service_key: Option<String>, offset: UtcOffset) -> Result<Self, reqwest::Error> {
        if service_key.is_none() {
            log::warn!(
                target: "STARTUP",
                "service_key is not set; weather and fine dust will stay unavailable"
            );
        }

        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?,
            service_key,
            offset,
        })
    }

    /// Query all three sources concurrently. Each one fails on its own.
    pub async fn fetch_all(&self) -> Readings {
        let service_key = self.service_key.as_deref();
        let (news, weather, dust) = tokio::join!(
            news::fetch(&self.client),
            weather::fetch(&self.client, service_key, config::now_local(self.offset)),
            dust::fetch(&self.client, service_key),
        );

        Readings {
            news: settle("NEWS", news),
            weather: settle("WEATHER", weather),
            dust: settle("FINE_DUST", dust),
        }
    }
}

impl Gather for Sources {
    fn gather(&self) -> impl Future<Output = Readings> + Send {
        self.fetch_all()
    }
}

fn settle<T>(source: &str, result: Result<T, FetchError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!(target: source, "{}", err);
            None
        }
    }
}

/// A JSON scalar as display text. The public data APIs send numbers as either strings or
/// numbers depending on the endpoint.
pub(crate) fn json_text(value: &json::JsonValue) -> Option<String> {
    value
        .as_str()
        .map(str::to_owned)
        .or_else(|| value.as_number().map(|number| number.to_string()))
}
