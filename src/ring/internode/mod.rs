pub mod messages;

use crate::{
    error::ChordError,
    ring::{
        identity::RingPosition,
        internode::messages::{ClaimResponse, Departure, LookupStep, Record},
        peer::Peer,
    },
};
use actix_web::web::Bytes;
use log::trace;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// HTTP client for the `/ring/*` endpoints of other nodes.
#[derive(Debug, Clone)]
pub struct PeerClient {
    client: Client,
}

impl PeerClient {
    pub fn new(timeout: Duration) -> Result<Self, ChordError> {
        // Pooled connections belong to the runtime that opened them, and every
        // actix worker runs its own.
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| ChordError::Configuration(format!("http client: {e}")))?;

        Ok(Self { client })
    }

    fn url(address: &str, segments: &[&str]) -> Result<Url, ChordError> {
        let has_port = address
            .rsplit_once(':')
            .is_some_and(|(_, port)| port.parse::<u16>().is_ok());

        if !has_port {
            return Err(ChordError::InvalidAddress(address.to_string()));
        }

        let mut url = Url::parse(&format!("http://{address}"))
            .map_err(|_| ChordError::InvalidAddress(address.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| ChordError::InvalidAddress(address.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn send(&self, address: &str, request: RequestBuilder) -> Result<Response, ChordError> {
        let response = request
            .send()
            .await
            .map_err(|e| ChordError::unreachable(address, e))?;

        trace!("{} answered {}", address, response.status());

        Ok(response)
    }

    async fn expect_ok(&self, address: &str, request: RequestBuilder) -> Result<Response, ChordError> {
        let response = self.send(address, request).await?;

        if !response.status().is_success() {
            return Err(ChordError::UnexpectedResponse {
                address: address.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }

    async fn expect_json<T: DeserializeOwned>(
        &self,
        address: &str,
        request: RequestBuilder,
    ) -> Result<T, ChordError> {
        self.expect_ok(address, request)
            .await?
            .json()
            .await
            .map_err(|e| ChordError::unreachable(address, e))
    }

    pub async fn lookup_step(&self, address: &str, id: RingPosition) -> Result<LookupStep, ChordError> {
        let id = id.to_string();
        let url = Self::url(address, &["ring", "step", &id])?;
        self.expect_json(address, self.client.get(url)).await
    }

    pub async fn predecessor(&self, address: &str) -> Result<Option<Peer>, ChordError> {
        let url = Self::url(address, &["ring", "predecessor"])?;
        self.expect_json(address, self.client.get(url)).await
    }

    pub async fn notify(&self, address: &str, candidate: &Peer) -> Result<(), ChordError> {
        let url = Self::url(address, &["ring", "notify"])?;
        self.expect_ok(address, self.client.post(url).json(candidate))
            .await?;
        Ok(())
    }

    pub async fn offer_successor(&self, address: &str, candidate: &Peer) -> Result<(), ChordError> {
        let url = Self::url(address, &["ring", "successor"])?;
        self.expect_ok(address, self.client.post(url).json(candidate))
            .await?;
        Ok(())
    }

    pub async fn claim(&self, address: &str, claimant: &Peer) -> Result<ClaimResponse, ChordError> {
        let url = Self::url(address, &["ring", "claim"])?;
        self.expect_json(address, self.client.post(url).json(claimant))
            .await
    }

    pub async fn release(&self, address: &str, records: &[Record]) -> Result<(), ChordError> {
        let url = Self::url(address, &["ring", "release"])?;
        self.expect_ok(address, self.client.post(url).json(records))
            .await?;
        Ok(())
    }

    pub async fn handoff(&self, address: &str, records: &[Record]) -> Result<(), ChordError> {
        let url = Self::url(address, &["ring", "handoff"])?;
        self.expect_ok(address, self.client.post(url).json(records))
            .await?;
        Ok(())
    }

    pub async fn depart(&self, address: &str, departure: &Departure) -> Result<(), ChordError> {
        let url = Self::url(address, &["ring", "departure"])?;
        self.expect_ok(address, self.client.post(url).json(departure))
            .await?;
        Ok(())
    }

    pub async fn store_record(&self, address: &str, key: &str, value: Bytes) -> Result<(), ChordError> {
        let url = Self::url(address, &["ring", "records", key])?;
        self.expect_ok(address, self.client.put(url).body(value))
            .await?;
        Ok(())
    }

    pub async fn fetch_record(&self, address: &str, key: &str) -> Result<Option<Bytes>, ChordError> {
        let url = Self::url(address, &["ring", "records", key])?;
        let response = self.send(address, self.client.get(url)).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .bytes()
                .await
                .map(Some)
                .map_err(|e| ChordError::unreachable(address, e)),
            status => Err(ChordError::UnexpectedResponse {
                address: address.to_string(),
                status: status.as_u16(),
            }),
        }
    }

    pub async fn ping(&self, address: &str) -> Result<(), ChordError> {
        let url = Self::url(address, &["helloworld"])?;
        self.expect_ok(address, self.client.get(url)).await?;
        Ok(())
    }
}
