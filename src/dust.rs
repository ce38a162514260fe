use crate::error::FetchError;
use crate::sources::json_text;

pub const ENDPOINT: &str =
    "http://apis.data.go.kr/B552584/ArpltnInforInqireSvc/getMsrstnAcctoRltmMesureDnsty";

/// Air quality station reporting for the kiosk's location.
const STATION: &str = "모종동";

pub async fn fetch(
    client: &reqwest::Client,
    service_key: Option<&str>,
) -> Result<DustReading, FetchError> {
    let service_key = service_key.ok_or(FetchError::MissingKey)?;

    let body = client
        .get(ENDPOINT)
        .query(&[
            ("serviceKey", service_key),
            ("returnType", "json"),
            ("numOfRows", "10"),
            ("pageNo", "1"),
            ("stationName", STATION),
            ("dataTerm", "DAILY"),
        ])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    DustReading::try_from(json::parse(&body)?)
}

/// Latest PM10 measurement. Only the first (most recent) entry of the response is used.
///
/// ```json
/// {
///     "response": {
///         "body": {
///             "items": [
///                 { "dataTime": "2026-10-16 14:00", "pm10Value": "30", "pm10Grade": "2", ... },
///                 ...
///             ]
///         }
///     }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DustReading {
    pub grade: DustGrade,
    /// Concentration in ㎍/㎥.
    pub value: String,
}

impl DustReading {
    /// The parenthesised concentration, withheld at the worst grade.
    pub fn value_label(&self) -> Option<String> {
        if self.grade == DustGrade::VeryBad {
            None
        } else {
            Some(format!("({}㎍/㎥)", self.value))
        }
    }
}

impl TryFrom<json::JsonValue> for DustReading {
    type Error = FetchError;

    fn try_from(json: json::JsonValue) -> Result<Self, Self::Error> {
        let latest = &json["response"]["body"]["items"][0];

        Ok(Self {
            grade: DustGrade::try_from(
                json_text(&latest["pm10Grade"])
                    .ok_or(FetchError::Field("pm10Grade"))?
                    .as_str(),
            )?,
            value: json_text(&latest["pm10Value"]).ok_or(FetchError::Field("pm10Value"))?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DustGrade {
    Good,
    Moderate,
    Bad,
    VeryBad,
}

impl DustGrade {
    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "좋음",
            Self::Moderate => "보통",
            Self::Bad => "나쁨",
            Self::VeryBad => "매우 나쁨",
        }
    }
}

impl TryFrom<&str> for DustGrade {
    type Error = FetchError;

    fn try_from(code: &str) -> Result<Self, Self::Error> {
        match code.trim() {
            "1" => Ok(Self::Good),
            "2" => Ok(Self::Moderate),
            "3" => Ok(Self::Bad),
            "4" => Ok(Self::VeryBad),
            _ => Err(FetchError::Code {
                field: "pm10Grade",
                code: code.to_string(),
            }),
        }
    }
}
