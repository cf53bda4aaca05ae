use hyper::header::{ACCEPT, AUTHORIZATION};
use log::{debug, error, warn};
use mime::APPLICATION_JSON;
use reqwest_middleware::{
    reqwest::{StatusCode, Url},
    ClientWithMiddleware,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use crate::{
    config::StoreSettings,
    domain::{
        AccommodationOptionDocument, RegistrationSettingsDocument, RegistrationTypeDocument,
        SponsorshipTierDocument,
    },
    infra::secrets::read_token,
};

const REGISTRATION_SETTINGS_QUERY: &str = r#"*[_type == "registrationSettings"][0] {
  _id,
  pricingDates {
    earlyBirdStart,
    earlyBirdEnd,
    nextRoundStart,
    nextRoundEnd,
    spotRegistrationStart,
    registrationCloseDate
  }
}"#;

const REGISTRATION_TYPES_QUERY: &str = r#"*[_type == "registrationTypes" && isActive == true] | order(displayOrder asc) {
  _id,
  name,
  category,
  description,
  earlyBirdPrice,
  earlyBirdPriceEUR,
  earlyBirdPriceGBP,
  earlyBirdPriceINR,
  nextRoundPrice,
  nextRoundPriceEUR,
  nextRoundPriceGBP,
  nextRoundPriceINR,
  onSpotPrice,
  onSpotPriceEUR,
  onSpotPriceGBP,
  onSpotPriceINR,
  benefits,
  isActive,
  displayOrder,
  maxParticipants
}"#;

const SPONSORSHIP_TIERS_QUERY: &str = r#"*[_type == "sponsorshipTiers" && active == true] | order(order asc) {
  _id,
  name,
  price,
  priceEUR,
  priceGBP,
  priceINR,
  description,
  benefits,
  color,
  active,
  order,
  featured,
  slug
}"#;

const ACCOMMODATION_OPTIONS_QUERY: &str = r#"*[_type == "accommodationOptions" && isActive == true] | order(displayOrder asc) {
  _id,
  hotelName,
  hotelCategory,
  description,
  roomOptions[] {
    roomType,
    pricePerNight,
    pricePerNightEUR,
    pricePerNightGBP,
    pricePerNightINR,
    roomDescription,
    maxGuests,
    isAvailable
  },
  packageOptions[] {
    packageName,
    nights,
    checkInDate,
    checkOutDate,
    inclusions,
    isActive
  },
  location,
  amenities,
  isActive,
  displayOrder,
  maxRooms,
  currentBookings,
  availableFrom,
  availableUntil,
  images
}"#;

const PING_QUERY: &str = r#"count(*[_type == "registrationSettings"])"#;

#[derive(Error, Debug)]
pub enum Error {
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("problem sending request to document store: {0}")]
    Send(#[from] reqwest_middleware::reqwest::Error),
    #[error("problem sending request to document store: {0}")]
    SendRetry(#[from] reqwest_middleware::Error),
    #[error("problem requesting document store: {0}")]
    Request(String),
    #[error("document store temporarily unavailable: {0}")]
    Transient(String),
    #[error("invalid store configuration: {0}")]
    Config(String),
}

/// Read access to the CMS documents that drive registration pricing
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    /// The singleton settings document, `None` when it has not been created yet
    async fn registration_settings(&self) -> Result<Option<RegistrationSettingsDocument>, Error>;
    async fn registration_types(&self) -> Result<Vec<RegistrationTypeDocument>, Error>;
    async fn sponsorship_tiers(&self) -> Result<Vec<SponsorshipTierDocument>, Error>;
    async fn accommodation_options(&self) -> Result<Vec<AccommodationOptionDocument>, Error>;
    async fn ping(&self) -> Result<(), Error>;
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

#[derive(Clone)]
pub struct SanityClient {
    pub query_url: Url,
    pub client: ClientWithMiddleware,
    token: Option<SecretString>,
}

impl SanityClient {
    pub fn new(client: ClientWithMiddleware, settings: &StoreSettings) -> Result<Self, Error> {
        let token = match &settings.token_file {
            Some(path) => Some(
                read_token(path)
                    .map_err(|e| Error::Config(format!("failed to load store token: {}", e)))?,
            ),
            None => None,
        };

        Ok(Self {
            query_url: query_url(settings)?,
            client,
            token,
        })
    }

    async fn query<T>(&self, query: &str) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let mut url = self.query_url.clone();
        url.query_pairs_mut().append_pair("query", query);
        debug!("querying document store: {}", query);

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, APPLICATION_JSON.to_string());
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        let response = request.send().await.map_err(|e| {
            error!("error sending to document store: {}", e);
            Error::SendRetry(e)
        })?;

        let status = response.status();
        if status.is_success() {
            let body = response.json::<QueryResponse<T>>().await?;
            Ok(body.result)
        } else if status == StatusCode::NOT_FOUND {
            Err(Error::NotFound(format!(
                "dataset not found at {}",
                self.query_url
            )))
        } else if status == StatusCode::SERVICE_UNAVAILABLE
            || status == StatusCode::BAD_GATEWAY
            || status == StatusCode::GATEWAY_TIMEOUT
            || status == StatusCode::TOO_MANY_REQUESTS
        {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Transient(format!(
                "error response from document store with status {}: {:?}",
                status, body
            )))
        } else {
            let body = response.text().await?;
            Err(Error::Request(format!(
                "error response from document store with status {}: {:?}",
                status, body
            )))
        }
    }
}

/// Decodes a collection one document at a time, skipping any that do not fit
/// the expected shape. Missing collections come back as null.
fn decode_each<T>(kind: &str, documents: Option<Vec<serde_json::Value>>) -> Vec<T>
where
    T: DeserializeOwned,
{
    documents
        .unwrap_or_default()
        .into_iter()
        .filter_map(|document| {
            let id = document
                .get("_id")
                .and_then(|id| id.as_str())
                .unwrap_or("<no id>")
                .to_string();
            match serde_json::from_value::<T>(document) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!("skipping {} document {}: {}", kind, id, e);
                    None
                }
            }
        })
        .collect()
}

/// `{base}/v{api_version}/data/query/{dataset}`, where base defaults to the
/// project's live API host or its CDN host
pub fn query_url(settings: &StoreSettings) -> Result<Url, Error> {
    let base = match &settings.base_url {
        Some(base_url) => base_url.trim_end_matches('/').to_string(),
        None => {
            let host = if settings.use_cdn { "apicdn" } else { "api" };
            format!("https://{}.{}.sanity.io", settings.project_id, host)
        }
    };
    let raw = format!(
        "{}/v{}/data/query/{}",
        base, settings.api_version, settings.dataset
    );
    Url::parse(&raw).map_err(|e| Error::Config(format!("invalid store url {}: {}", raw, e)))
}

#[async_trait::async_trait]
impl ConfigStore for SanityClient {
    async fn registration_settings(&self) -> Result<Option<RegistrationSettingsDocument>, Error> {
        self.query(REGISTRATION_SETTINGS_QUERY).await
    }

    async fn registration_types(&self) -> Result<Vec<RegistrationTypeDocument>, Error> {
        // Missing collections come back as null
        let types: Option<Vec<RegistrationTypeDocument>> =
            self.query(REGISTRATION_TYPES_QUERY).await?;
        Ok(types.unwrap_or_default())
    }

    async fn sponsorship_tiers(&self) -> Result<Vec<SponsorshipTierDocument>, Error> {
        let tiers: Option<Vec<SponsorshipTierDocument>> =
            self.query(SPONSORSHIP_TIERS_QUERY).await?;
        Ok(tiers.unwrap_or_default())
    }

    async fn accommodation_options(&self) -> Result<Vec<AccommodationOptionDocument>, Error> {
        let options: Option<Vec<AccommodationOptionDocument>> =
            self.query(ACCOMMODATION_OPTIONS_QUERY).await?;
        Ok(options.unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), Error> {
        let _: serde_json::Value = self.query(PING_QUERY).await?;
        Ok(())
    }
}
