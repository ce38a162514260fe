use std::collections::HashMap;

use time::OffsetDateTime;

use crate::error::FetchError;
use crate::sources::json_text;

pub const ENDPOINT: &str =
    "http://apis.data.go.kr/1360000/VilageFcstInfoService_2.0/getUltraSrtNcst";

/// Forecast grid cell queried for observations.
const GRID_X: &str = "60";
const GRID_Y: &str = "110";

pub async fn fetch(
    client: &reqwest::Client,
    service_key: Option<&str>,
    now: OffsetDateTime,
) -> Result<WeatherObservation, FetchError> {
    let service_key = service_key.ok_or(FetchError::MissingKey)?;
    let base_date = format!(
        "{:04}{:02}{:02}",
        now.year(),
        u8::from(now.month()),
        now.day()
    );
    let base_time = format!("{:02}00", now.hour());

    let body = client
        .get(ENDPOINT)
        .query(&[
            ("serviceKey", service_key),
            ("pageNo", "1"),
            ("numOfRows", "10"),
            ("dataType", "JSON"),
            ("base_date", base_date.as_str()),
            ("base_time", base_time.as_str()),
            ("nx", GRID_X),
            ("ny", GRID_Y),
        ])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    WeatherObservation::try_from(json::parse(&body)?)
}

/// ```json
/// {
///     "response": {
///         "header": { "resultCode": "00", "resultMsg": "NORMAL_SERVICE" },
///         "body": {
///             "items": {
///                 "item": [
///                     { "category": "PTY", "obsrValue": "0", ... },
///                     { "category": "T1H", "obsrValue": "12.3", ... },
///                     ...
///                 ]
///             }
///         }
///     }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeatherObservation {
    pub temperature_celsius: String,
    pub precipitation: Precipitation,
}

impl WeatherObservation {
    pub fn temperature_label(&self) -> String {
        format!("{}℃", self.temperature_celsius)
    }
}

impl TryFrom<json::JsonValue> for WeatherObservation {
    type Error = FetchError;

    fn try_from(json: json::JsonValue) -> Result<Self, Self::Error> {
        let observations: HashMap<&str, String> = json["response"]["body"]["items"]["item"]
            .members()
            .filter_map(|item| Some((item["category"].as_str()?, json_text(&item["obsrValue"])?)))
            .collect();

        Ok(Self {
            temperature_celsius: observations
                .get("T1H")
                .ok_or(FetchError::Field("T1H"))?
                .clone(),
            precipitation: Precipitation::try_from(
                observations
                    .get("PTY")
                    .ok_or(FetchError::Field("PTY"))?
                    .as_str(),
            )?,
        })
    }
}

/// Precipitation type (`PTY`) as reported by the observation service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precipitation {
    Clear,
    Rain,
    RainSnow,
    Snow,
    Drizzle,
    Sleet,
    SnowFlurry,
}

impl Precipitation {
    pub fn label(self) -> &'static str {
        match self {
            Self::Clear => "맑음",
            Self::Rain => "비",
            Self::RainSnow => "비/눈",
            Self::Snow => "눈",
            Self::Drizzle => "빗방울",
            Self::Sleet => "진눈깨비",
            Self::SnowFlurry => "눈날림",
        }
    }
}

impl TryFrom<&str> for Precipitation {
    type Error = FetchError;

    fn try_from(code: &str) -> Result<Self, Self::Error> {
        match code.trim() {
            "0" => Ok(Self::Clear),
            "1" => Ok(Self::Rain),
            "2" => Ok(Self::RainSnow),
            "3" => Ok(Self::Snow),
            "5" => Ok(Self::Drizzle),
            "6" => Ok(Self::Sleet),
            "7" => Ok(Self::SnowFlurry),
            _ => Err(FetchError::Code {
                field: "PTY",
                code: code.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use test_case::test_case;

    use super::*;

    fn response(items: &str) -> json::JsonValue {
        json::parse(&format!(
            r#"{{"response":{{"header":{{"resultCode":"00"}},"body":{{"dataType":"JSON","items":{{"item":[{}]}}}}}}}}"#,
            items
        ))
        .unwrap()
    }

    #[test]
    fn test_observation() {
        let observation = WeatherObservation::try_from(response(
            r#"{"category":"PTY","obsrValue":"1"},{"category":"REH","obsrValue":"80"},{"category":"T1H","obsrValue":"5"}"#,
        ))
        .unwrap();

        assert_eq!(
            observation,
            WeatherObservation {
                temperature_celsius: "5".to_string(),
                precipitation: Precipitation::Rain,
            }
        );
        assert_eq!(observation.temperature_label(), "5℃");
        assert_eq!(observation.precipitation.label(), "비");
    }

    #[test]
    fn test_numeric_values_are_accepted() {
        let observation = WeatherObservation::try_from(response(
            r#"{"category":"PTY","obsrValue":0},{"category":"T1H","obsrValue":-3.5}"#,
        ))
        .unwrap();

        assert_eq!(observation.temperature_celsius, "-3.5");
        assert_eq!(observation.precipitation, Precipitation::Clear);
    }

    #[test]
    fn test_missing_precipitation_fails_whole_observation() {
        assert!(matches!(
            WeatherObservation::try_from(response(r#"{"category":"T1H","obsrValue":"5"}"#)),
            Err(FetchError::Field("PTY"))
        ));
    }

    #[test]
    fn test_error_response() {
        let json = json::parse(r#"{"response":{"header":{"resultCode":"03","resultMsg":"NO_DATA"}}}"#)
            .unwrap();

        assert!(matches!(
            WeatherObservation::try_from(json),
            Err(FetchError::Field("T1H"))
        ));
    }

    #[test_case("0", Precipitation::Clear, "맑음")]
    #[test_case("1", Precipitation::Rain, "비")]
    #[test_case("2", Precipitation::RainSnow, "비/눈")]
    #[test_case("3", Precipitation::Snow, "눈")]
    #[test_case("5", Precipitation::Drizzle, "빗방울")]
    #[test_case("6", Precipitation::Sleet, "진눈깨비")]
    #[test_case("7", Precipitation::SnowFlurry, "눈날림")]
    fn test_precipitation_codes(code: &str, expected: Precipitation, label: &str) {
        let precipitation = Precipitation::try_from(code).unwrap();
        assert_eq!(precipitation, expected);
        assert_eq!(precipitation.label(), label);
    }

    #[test_case("4")]
    #[test_case("")]
    #[test_case("rain")]
    fn test_unknown_precipitation_code(code: &str) {
        assert!(matches!(
            Precipitation::try_from(code),
            Err(FetchError::Code { field: "PTY", .. })
        ));
    }
}
