use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;

use crate::error::FetchError;

pub const FEED_URL: &str = "https://www.yna.co.kr/rss/news.xml";

/// Headlines kept from each feed fetch.
pub const HEADLINES: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsItem {
    /// Time of day in the offset the feed published it with.
    pub published: time::Time,
    pub headline: String,
}

impl TryFrom<&rss::Item> for NewsItem {
    type Error = FetchError;

    fn try_from(item: &rss::Item) -> Result<Self, Self::Error> {
        let headline = item.title().ok_or(FetchError::Field("title"))?;
        let published = item.pub_date().ok_or(FetchError::Field("pubDate"))?;

        Ok(Self {
            published: OffsetDateTime::parse(published.trim(), &Rfc2822)
                .map_err(|source| FetchError::Timestamp {
                    text: published.to_string(),
                    source,
                })?
                .time(),
            headline: headline.trim().to_string(),
        })
    }
}

pub async fn fetch(client: &reqwest::Client) -> Result<Vec<NewsItem>, FetchError> {
    let body = client
        .get(FEED_URL)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    parse(&body[..])
}

/// The first [`HEADLINES`] items of an RSS document, in feed order.
pub fn parse(feed: &[u8]) -> Result<Vec<NewsItem>, FetchError> {
    rss::Channel::read_from(feed)?
        .items()
        .iter()
        .take(HEADLINES)
        .map(NewsItem::try_from)
        .collect()
}
