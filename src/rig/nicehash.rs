// NiceHash Fleet API
//
// Signed REST client for the NiceHash private mining API (v2)

use crate::error::{MonitorError, Result};
use crate::network::{build_client, join_url};
use crate::rig::{DeviceSummary, FleetApi, RigDetail, RigOverview};
use crate::types::{MiningStatus, PowerAction};
use hmac::{Hmac, Mac};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::HashMap;
use std::time::Duration;

const TIME_PATH: &str = "/api/v2/time";
const RIGS_PATH: &str = "/main/api/v2/mining/rigs2";
const RIG_PATH: &str = "/main/api/v2/mining/rig2";
const RIG_STATUS_PATH: &str = "/main/api/v2/mining/rigs/status2";

type HmacSha256 = Hmac<Sha256>;

pub struct NiceHashClient {
    client: Client,
    api_url: String,
    organisation_id: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerTime {
    server_time: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RigsResponse {
    #[serde(default)]
    miner_statuses: HashMap<String, u32>,
    #[serde(default)]
    mining_rigs: Vec<RigResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RigResponse {
    rig_id: String,
    #[serde(default)]
    miner_status: Option<String>,
    #[serde(default)]
    devices: Vec<DeviceResponse>,
}

#[derive(Debug, Deserialize)]
struct DeviceResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    status: Option<EnumStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnumStatus {
    enum_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PowerRequest<'a> {
    rig_id: &'a str,
    device_id: &'a str,
    action: &'a str,
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

impl From<RigResponse> for RigDetail {
    fn from(rig: RigResponse) -> Self {
        RigDetail {
            rig_id: rig.rig_id,
            miner_status: rig
                .miner_status
                .as_deref()
                .map(MiningStatus::from_enum_name)
                .unwrap_or(MiningStatus::Idle),
            devices: rig
                .devices
                .into_iter()
                .map(|d| DeviceSummary {
                    id: d.id,
                    name: d.name,
                    // Only an explicit UNKNOWN counts as a hang
                    status: d
                        .status
                        .map(|s| MiningStatus::from_enum_name(&s.enum_name))
                        .unwrap_or(MiningStatus::Idle),
                })
                .collect(),
        }
    }
}

impl NiceHashClient {
    pub fn new(
        api_url: &str,
        organisation_id: &str,
        api_key: &str,
        api_secret: &str,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_url: api_url.to_string(),
            organisation_id: organisation_id.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        })
    }

    fn server_time(&self) -> Result<String> {
        let time: ServerTime = self
            .client
            .get(join_url(&self.api_url, TIME_PATH))
            .send()?
            .error_for_status()?
            .json()?;

        Ok(match time.server_time {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
    }

    fn signed_request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        time: &str,
        nonce: &str,
        request_id: &str,
    ) -> Result<RequestBuilder> {
        let signature = sign_request(
            &self.api_key,
            &self.api_secret,
            &self.organisation_id,
            time,
            nonce,
            method.as_str(),
            path,
            "",
            body.as_deref(),
        )?;

        let mut builder = self
            .client
            .request(method, join_url(&self.api_url, path))
            .header("X-Time", time)
            .header("X-Nonce", nonce)
            .header("X-Organization-Id", &self.organisation_id)
            .header("X-Request-Id", request_id)
            .header("X-Auth", format!("{}:{}", self.api_key, signature))
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(body) = body {
            builder = builder.body(body);
        }
        Ok(builder)
    }

    /// Send a signed request and return the raw response body
    fn send(&self, method: Method, path: &str, body: Option<String>) -> Result<String> {
        let time = self.server_time()?;
        let nonce = uuid::Uuid::new_v4().to_string();
        let request_id = uuid::Uuid::new_v4().to_string();

        let builder = self.signed_request(method, path, body, &time, &nonce, &request_id)?;
        Ok(builder.send()?.error_for_status()?.text()?)
    }

    fn request<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T> {
        let text = self.send(method, path, None)?;
        parse_json(path, &text)
    }
}

impl FleetApi for NiceHashClient {
    fn list_rigs(&self) -> Result<RigOverview> {
        let text = self.send(Method::GET, RIGS_PATH, None)?;
        parse_rigs(&text)
    }

    fn get_rig_status(&self, rig_id: &str) -> Result<RigDetail> {
        let path = format!("{}/{}", RIG_PATH, rig_id);
        let response: RigResponse = self.request(Method::GET, &path)?;
        Ok(response.into())
    }

    fn set_device_power(&self, rig_id: &str, device_id: &str, action: PowerAction) -> Result<()> {
        let body = serde_json::to_string(&PowerRequest {
            rig_id,
            device_id,
            action: action.as_str(),
        })
        .map_err(|e| MonitorError::CommandFailed(e.to_string()))?;

        let text = self
            .send(Method::POST, RIG_STATUS_PATH, Some(body))
            .map_err(|e| MonitorError::CommandFailed(format!("{} failed: {}", action, e)))?;
        parse_power_response(&text, action)
    }
}

fn parse_json<T: DeserializeOwned>(path: &str, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| {
        MonitorError::Unreachable(format!("malformed NiceHash response from {}: {}", path, e))
    })
}

fn parse_rigs(text: &str) -> Result<RigOverview> {
    let response: RigsResponse = parse_json(RIGS_PATH, text)?;
    Ok(RigOverview {
        rigs: response.mining_rigs.into_iter().map(RigDetail::from).collect(),
        miner_statuses: response.miner_statuses,
    })
}

/// Anything but an explicit `success: true` is a rejected command
fn parse_power_response(text: &str, action: PowerAction) -> Result<()> {
    let response: PowerResponse = serde_json::from_str(text)
        .map_err(|e| MonitorError::CommandFailed(format!("{} reply unreadable: {}", action, e)))?;

    if response.success {
        Ok(())
    } else {
        Err(MonitorError::CommandFailed(format!(
            "{} rejected: {}",
            action,
            response.message.unwrap_or_else(|| "no reason given".to_string())
        )))
    }
}

/// HMAC-SHA256 over the NUL-separated request description, hex encoded
#[allow(clippy::too_many_arguments)]
pub fn sign_request(
    api_key: &str,
    api_secret: &str,
    organisation_id: &str,
    time: &str,
    nonce: &str,
    method: &str,
    path: &str,
    query: &str,
    body: Option<&str>,
) -> Result<String> {
    let mut message = [
        api_key,
        time,
        nonce,
        "",
        organisation_id,
        "",
        method,
        path,
        query,
    ]
    .join("\0");

    if let Some(body) = body {
        message.push('\0');
        message.push_str(body);
    }

    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes())
        .map_err(|e| MonitorError::ConfigInvalid(format!("api_secret: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
