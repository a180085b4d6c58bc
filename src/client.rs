use chrono::{Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::load_config;
use crate::error::{Error, Result};
use crate::params::{HousingMarketGraph, ParamValue, Params, PropertyRef, PropertyType, Region};
use crate::payload::{self, MonthlyEstimate};
use crate::search::SearchResultsQuery;
use crate::util::urljoin;

/// Root of Redfin's internal API.
pub const DEFAULT_BASE_URL: &str = "https://redfin.com/stingray/";

const PROPERTY_DETAILS: &str = "api/home/details/";
const SEARCH_EXPORT: &str = "api/gis-csv";
const ACCESS_LEVEL: i64 = 1;
const PAGE_TYPE: i64 = 3;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every request path is appended to.
    pub url: String,
    /// Headers sent with every request.
    ///
    /// Redfin blocks requests without a browser-like `user-agent`; the default
    /// carries an empty one that should be replaced.
    pub headers: BTreeMap<String, String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BASE_URL.to_string(),
            headers: BTreeMap::from([("user-agent".to_string(), String::new())]),
            timeout: Duration::from_secs(60),
        }
    }
}

impl ClientConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Self {
        self.with_header("user-agent", user_agent)
    }

    /// Adds or replaces a header. Names are case-insensitive.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Blocking client for Redfin's stingray API.
///
/// Configuration is fixed at construction; the client is cheap to clone and
/// safe to share between threads.
#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    headers: BTreeMap<String, String>,
    timeout: Duration,
    progress: bool,

    http: HttpClient,
}

impl Client {
    /// Creates a client from `REDFIN_*` environment variables and/or `.redfinrc`.
    ///
    /// This is equivalent to `Client::new_with(None, None, None)`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::new_with(None, None, None)
    }

    /// Creates a client using (in order of precedence):
    /// - explicit arguments
    /// - environment variables `REDFIN_URL` / `REDFIN_USER_AGENT` / `REDFIN_TIMEOUT`
    /// - config file from `REDFIN_RC` or `.redfinrc`
    /// - built-in defaults
    pub fn new_with(
        url: Option<String>,
        user_agent: Option<String>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let cfg = load_config(url, user_agent, timeout)?;
        Ok(Self::new(cfg)?)
    }

    pub fn new(cfg: ClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in &cfg.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            default_headers.insert(header_name, header_value);
        }

        if cfg.headers.get("user-agent").is_none_or(|ua| ua.trim().is_empty()) {
            warn!("no user-agent configured; Redfin is likely to block these requests");
        }

        let http = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(cfg.timeout)
            .build()
            .map_err(Error::Build)?;

        Ok(Self {
            url: cfg.url,
            headers: cfg.headers,
            timeout: cfg.timeout,
            progress: true,
            http,
        })
    }

    /// Shows a progress bar while [`Client::download_search_results_table`] writes to disk.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issues a GET for `path` under the base URL and returns the raw response.
    ///
    /// Any non-2xx status is turned into [`Error::Request`]. Usable directly for
    /// endpoints this crate does not wrap.
    pub fn redfin_request(&self, path: &str, params: &Params) -> Result<Response> {
        let url = urljoin(&self.url, path);
        debug!(url = %url, params = params.len(), "GET");

        let resp = self
            .http
            .get(&url)
            .query(&params.to_query())
            .send()
            .map_err(|source| Error::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let url = resp.url().to_string();
            let body = resp.text().unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Redfin rejected request");
            return Err(Error::Request { url, status, body });
        }

        Ok(resp)
    }

    /// Requests `path` and decodes the JSON payload behind the preamble.
    pub fn get_json(&self, path: &str, params: &Params) -> Result<Value> {
        let resp = self.redfin_request(path, params)?;
        decode_response(resp)
    }

    /// Requests a `api/home/details/` endpoint.
    ///
    /// `accessLevel=1` is always sent, and `pageType=3` when `page` is set; both
    /// override caller-supplied values of the same keys.
    pub fn request_property_data(&self, path: &str, params: &Params, page: bool) -> Result<Value> {
        let path = format!("{PROPERTY_DETAILS}{path}");
        self.get_json(&path, &property_params(params, page))
    }

    /// Requests a `api/region/{type}/{id}/` endpoint, optionally narrowed to a property type.
    pub fn request_region_data(
        &self,
        path: &str,
        region: &Region,
        property_type: Option<&ParamValue>,
    ) -> Result<Value> {
        let path = region_path(region, property_type, path);
        self.get_json(&path, &Params::new())
    }

    /// Location autocomplete.
    pub fn search(&self, query: &str) -> Result<Value> {
        self.search_with(query, &Params::new())
    }

    /// Location autocomplete with extra query keys; `extra` overrides `location` and `v`.
    pub fn search_with(&self, query: &str, extra: &Params) -> Result<Value> {
        let mut params = Params::new().with("location", query).with("v", 2);
        params.extend(extra);
        self.get_json("do/location-autocomplete", &params)
    }

    /// Region id of the first autocomplete match; see [`crate::region_id_from_search`].
    pub fn region_id_from_search(&self, search: &Value) -> Result<String> {
        payload::region_id_from_search(search)
    }

    /// The search export as raw CSV bytes, exactly as served.
    pub fn get_search_results_table(&self, query: &SearchResultsQuery) -> Result<Vec<u8>> {
        let resp = self.redfin_request(SEARCH_EXPORT, &query.to_params())?;
        let url = resp.url().to_string();
        let body = resp
            .bytes()
            .map_err(|source| Error::Transport { url, source })?;
        Ok(body.to_vec())
    }

    /// Streams the search export to `target` and returns the written path.
    pub fn download_search_results_table(
        &self,
        query: &SearchResultsQuery,
        target: &Path,
    ) -> Result<PathBuf> {
        let mut resp = self.redfin_request(SEARCH_EXPORT, &query.to_params())?;
        let io_err = |source: std::io::Error| Error::Io {
            path: target.to_path_buf(),
            source,
        };

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| Error::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut out = File::create(target).map_err(io_err)?;
        let pb = self.progress.then(|| progress_bar(resp.content_length()));

        let mut written: u64 = 0;
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = match resp.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(io_err(e)),
            };
            out.write_all(&buf[..n]).map_err(io_err)?;
            written += n as u64;
            if let Some(pb) = &pb {
                pb.inc(n as u64);
            }
        }
        out.flush().map_err(io_err)?;

        if let Some(pb) = &pb {
            pb.finish_and_clear();
        }
        info!(path = %target.display(), bytes = written, "saved search results");
        Ok(target.to_path_buf())
    }

    /// Region info for a home page path such as `NY/Albany/363-Elk-St-12206/home/97942731`.
    pub fn primary_region(&self, path: &str) -> Result<Value> {
        let params = Params::new().with("path", path);
        self.get_json("api/home/details/primaryRegionInfo", &params)
    }

    /// Initial page info for a home page path; carries the listing id.
    pub fn initial_info(&self, path: &str) -> Result<Value> {
        let params = Params::new().with("path", path);
        self.get_json("api/home/details/initialInfo", &params)
    }

    pub fn shared_region(&self, table_id: impl Into<ParamValue>, extra: &Params) -> Result<Value> {
        let mut params = Params::new()
            .with("tableId", table_id)
            .with("regionTypeId", 2)
            .with("mapPageTypeId", 1);
        params.extend(extra);
        self.get_json("api/region/shared-region-info", &params)
    }

    pub fn get_recently_sold(&self, region: &Region) -> Result<Value> {
        self.get_json("api/gis/recently-sold", &region.to_query_params())
    }

    pub fn get_market_insights_page(&self, region: &Region) -> Result<Value> {
        self.get_json("api/market-insights-page", &region.to_query_params())
    }

    pub fn get_region_school_map(&self, region: &Region) -> Result<Value> {
        self.get_json("do/gis-school", &region.to_query_params())
    }

    /// Regional housing market graph. Redfin only serves the `All` property type here.
    pub fn get_regional_housing_market(
        &self,
        region: &Region,
        graph: HousingMarketGraph,
    ) -> Result<Value> {
        let path = format!(
            "api/graph/{}/{}/All/regional-housing-market/{}",
            region.region_type,
            region.region_id,
            graph.as_str()
        );
        self.get_json(&path, &Params::new())
    }

    // Property details

    /// Full below-the-fold detail payload.
    pub fn get_property_information(&self, property: &PropertyRef) -> Result<Value> {
        self.request_property_data("belowTheFold", &property.to_params(), false)
    }

    pub fn get_above_the_fold(&self, property: &PropertyRef) -> Result<Value> {
        self.request_property_data("aboveTheFold", &property.to_params(), false)
    }

    /// Compressed photo URLs, in listing order.
    pub fn get_property_images(&self, property: &PropertyRef) -> Result<Vec<String>> {
        let atf = self.get_above_the_fold(property)?;
        payload::photo_urls(&atf)
    }

    /// Historical estimates labelled by month, counted from today's date.
    pub fn get_property_timeseries_estimate(
        &self,
        property: &PropertyRef,
    ) -> Result<Vec<MonthlyEstimate>> {
        self.get_property_timeseries_estimate_at(property, Local::now().date_naive())
    }

    /// Like [`Client::get_property_timeseries_estimate`] with an explicit reference date.
    pub fn get_property_timeseries_estimate_at(
        &self,
        property: &PropertyRef,
        today: NaiveDate,
    ) -> Result<Vec<MonthlyEstimate>> {
        let history =
            self.request_property_data("avmHistoricalData", &property.to_params(), false)?;
        payload::label_estimates(&payload::month_labels(today), &history)
    }

    /// Automated valuation with comparable homes.
    pub fn get_similar_homes(&self, property: &PropertyRef) -> Result<Value> {
        self.request_property_data("avm", &property.to_params(), false)
    }

    pub fn get_similar_listings(
        &self,
        property: &PropertyRef,
        market_id: impl Into<ParamValue>,
    ) -> Result<Value> {
        let params = property.to_params().with("marketId", market_id);
        self.request_property_data("similars/listings", &params, false)
    }

    pub fn get_similar_solds(
        &self,
        property: &PropertyRef,
        market_id: impl Into<ParamValue>,
    ) -> Result<Value> {
        let params = property.to_params().with("marketId", market_id);
        self.request_property_data("similars/solds", &params, false)
    }

    pub fn get_main_house_info(&self, property: &PropertyRef) -> Result<Value> {
        self.request_property_data("mainHouseInfoPanelInfo", &property.to_params(), true)
    }

    pub fn get_property_parcel_info(&self, property: &PropertyRef) -> Result<Value> {
        self.request_property_data("propertyParcelInfo", &property.to_params(), true)
    }

    pub fn get_tour_insights(&self, property: &PropertyRef) -> Result<Value> {
        self.request_property_data("tourInsights", &property.to_params(), true)
    }

    pub fn get_descriptive_paragraph(&self, property: &PropertyRef) -> Result<Value> {
        self.request_property_data("descriptiveParagraph", &property.to_params(), false)
    }

    pub fn get_rental_estimate(&self, property: &PropertyRef) -> Result<Value> {
        self.request_property_data("rental-estimate", &property.to_params(), false)
    }

    pub fn get_activity_info(&self, property: &PropertyRef) -> Result<Value> {
        self.request_property_data("activityInfo", &property.to_params(), false)
    }

    pub fn get_owner_estimate(&self, property_id: impl Into<ParamValue>) -> Result<Value> {
        let params = Params::new().with("propertyId", property_id);
        self.get_json("api/home/details/owner-estimate", &params)
    }

    /// Mortgage and ownership cost breakdown.
    pub fn get_cost_of_home_ownership(&self, property_id: impl Into<ParamValue>) -> Result<Value> {
        let params = Params::new().with("propertyId", property_id);
        self.get_json("do/api/costOfHomeOwnershipDetails", &params)
    }

    // Region data

    pub fn get_offer_insights(
        &self,
        region: &Region,
        property_type: Option<PropertyType>,
    ) -> Result<Value> {
        self.region_by_type("offer-insights", region, property_type)
    }

    pub fn get_best_schools(
        &self,
        region: &Region,
        property_type: Option<PropertyType>,
    ) -> Result<Value> {
        self.region_by_type("best-schools", region, property_type)
    }

    pub fn get_walk_score_data(
        &self,
        region: &Region,
        property_type: Option<PropertyType>,
    ) -> Result<Value> {
        self.region_by_type("walk-score-data", region, property_type)
    }

    pub fn get_region_trends(
        &self,
        region: &Region,
        property_type: Option<PropertyType>,
    ) -> Result<Value> {
        self.region_by_type("trends", region, property_type)
    }

    pub fn get_flood_risk_data(&self, region: &Region) -> Result<Value> {
        self.request_region_data("floodRisk-data", region, None)
    }

    pub fn get_market_insights_interlinks(&self, region: &Region) -> Result<Value> {
        self.request_region_data("market-insights-interlinks", region, None)
    }

    pub fn get_env_risk_data(&self, region: &Region) -> Result<Value> {
        self.request_region_data("envRisk-data", region, None)
    }

    pub fn get_home_feature_trends(&self, region: &Region) -> Result<Value> {
        self.request_region_data("home-feature-trends/entrypoint", region, None)
    }

    pub fn get_compete_score(&self, region: &Region) -> Result<Value> {
        self.request_region_data("compete-score", region, None)
    }

    pub fn get_nearby_compete_scores(&self, region: &Region) -> Result<Value> {
        self.request_region_data("nearby-compete-scores", region, None)
    }

    fn region_by_type(
        &self,
        path: &str,
        region: &Region,
        property_type: Option<PropertyType>,
    ) -> Result<Value> {
        let property_type = property_type.map(ParamValue::from);
        self.request_region_data(path, region, property_type.as_ref())
    }
}

fn decode_response(resp: Response) -> Result<Value> {
    let url = resp.url().to_string();
    let text = resp.text().map_err(|source| Error::Transport {
        url: url.clone(),
        source,
    })?;
    debug!(url = %url, bytes = text.len(), "decoding response");
    payload::decode(&url, &text)
}

fn property_params(params: &Params, page: bool) -> Params {
    let mut merged = params.clone().with("accessLevel", ACCESS_LEVEL);
    if page {
        merged.insert("pageType", PAGE_TYPE);
    }
    merged
}

fn region_path(region: &Region, property_type: Option<&ParamValue>, suffix: &str) -> String {
    match property_type.filter(|p| !p.is_empty()) {
        Some(p) => format!(
            "api/region/{}/{}/{}/{}",
            region.region_type, region.region_id, p, suffix
        ),
        None => format!(
            "api/region/{}/{}/{}",
            region.region_type, region.region_id, suffix
        ),
    }
}

fn progress_bar(len: Option<u64>) -> ProgressBar {
    match len {
        Some(len) => {
            let pb = ProgressBar::new(len);
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} {bytes}/{total_bytes} ({bytes_per_sec}) {wide_bar} {eta}",
            ) {
                pb.set_style(style.progress_chars("=>-"));
            }
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {bytes} ({bytes_per_sec})") {
                pb.set_style(style);
            }
            pb
        }
    }
}
