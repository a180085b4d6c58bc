//! End-to-end behaviour of the blocking client against the mock stingray server.

mod common;

use chrono::NaiveDate;
use redfin::{
    Client, ClientConfig, Error, HousingMarketGraph, Params, PropertyRef, PropertyType, Region,
    RegionType, SearchResultsQuery,
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::time::Duration;

fn client() -> Client {
    let cfg = ClientConfig::default()
        .with_url(common::spawn())
        .with_user_agent(common::USER_AGENT)
        .with_timeout(Duration::from_secs(10));
    Client::new(cfg).unwrap().with_progress(false)
}

fn zip_8729() -> Region {
    Region::new(RegionType::Zip, 8729)
}

#[test]
fn region_data_path_with_and_without_property_type() {
    let c = client();

    let plain = c.get_region_trends(&zip_8729(), None).unwrap();
    assert_eq!(plain["path"], "api/region/2/8729/trends");

    let houses = c
        .get_region_trends(&zip_8729(), Some(PropertyType::House))
        .unwrap();
    assert_eq!(houses["path"], "api/region/2/8729/1/trends");
    assert_eq!(houses["query"], json!({}));
}

#[test]
fn region_endpoints_use_their_suffixes() {
    let c = client();
    let region = Region::new(6, "30749");

    let cases: Vec<(Value, &str)> = vec![
        (
            c.get_offer_insights(&region, Some(PropertyType::Condo)).unwrap(),
            "api/region/6/30749/2/offer-insights",
        ),
        (
            c.get_best_schools(&region, None).unwrap(),
            "api/region/6/30749/best-schools",
        ),
        (
            c.get_walk_score_data(&region, Some(PropertyType::Townhouse)).unwrap(),
            "api/region/6/30749/3/walk-score-data",
        ),
        (
            c.get_flood_risk_data(&region).unwrap(),
            "api/region/6/30749/floodRisk-data",
        ),
        (
            c.get_env_risk_data(&region).unwrap(),
            "api/region/6/30749/envRisk-data",
        ),
        (
            c.get_market_insights_interlinks(&region).unwrap(),
            "api/region/6/30749/market-insights-interlinks",
        ),
        (
            c.get_home_feature_trends(&region).unwrap(),
            "api/region/6/30749/home-feature-trends/entrypoint",
        ),
        (
            c.get_compete_score(&region).unwrap(),
            "api/region/6/30749/compete-score",
        ),
        (
            c.get_nearby_compete_scores(&region).unwrap(),
            "api/region/6/30749/nearby-compete-scores",
        ),
        (
            c.get_regional_housing_market(&region, HousingMarketGraph::Demand)
                .unwrap(),
            "api/graph/6/30749/All/regional-housing-market/demand",
        ),
    ];

    for (payload, path) in cases {
        assert_eq!(payload["path"], path);
    }
}

#[test]
fn region_query_endpoints_send_snake_case_keys() {
    let c = client();
    for payload in [
        c.get_recently_sold(&zip_8729()).unwrap(),
        c.get_market_insights_page(&zip_8729()).unwrap(),
        c.get_region_school_map(&zip_8729()).unwrap(),
    ] {
        assert_eq!(payload["query"], json!({"region_type": "2", "region_id": "8729"}));
    }
}

#[test]
fn property_data_injects_access_level() {
    let c = client();
    let home = PropertyRef::new(9701815).with_listing(104431105);

    let info = c.get_property_information(&home).unwrap();
    assert_eq!(info["path"], "api/home/details/belowTheFold");
    assert_eq!(
        info["query"],
        json!({"accessLevel": "1", "listingId": "104431105", "propertyId": "9701815"})
    );

    let panel = c.get_main_house_info(&home).unwrap();
    assert_eq!(panel["path"], "api/home/details/mainHouseInfoPanelInfo");
    assert_eq!(panel["query"]["pageType"], "3");
    assert_eq!(panel["query"]["accessLevel"], "1");

    let solds = c.get_similar_solds(&PropertyRef::new(9701815), 5).unwrap();
    assert_eq!(solds["path"], "api/home/details/similars/solds");
    assert_eq!(
        solds["query"],
        json!({"accessLevel": "1", "marketId": "5", "propertyId": "9701815"})
    );
}

#[test]
fn caller_cannot_override_access_level() {
    let c = client();
    let params = Params::new().with("propertyId", 1).with("accessLevel", 3);
    let payload = c
        .request_property_data("rental-estimate", &params, false)
        .unwrap();
    assert_eq!(payload["query"]["accessLevel"], "1");
}

#[test]
fn direct_property_endpoints_skip_access_level() {
    let c = client();
    let owner = c.get_owner_estimate(9701815).unwrap();
    assert_eq!(owner["path"], "api/home/details/owner-estimate");
    assert_eq!(owner["query"], json!({"propertyId": "9701815"}));

    let cost = c.get_cost_of_home_ownership("9701815").unwrap();
    assert_eq!(cost["path"], "do/api/costOfHomeOwnershipDetails");
}

#[test]
fn page_path_lookups() {
    let c = client();
    let page = "NY/Albany/363-Elk-St-12206/home/97942731";

    let primary = c.primary_region(page).unwrap();
    assert_eq!(primary["path"], "api/home/details/primaryRegionInfo");
    assert_eq!(primary["query"]["path"], page);

    let initial = c.initial_info(page).unwrap();
    assert_eq!(initial["path"], "api/home/details/initialInfo");
}

#[test]
fn shared_region_extras_win() {
    let c = client();
    let payload = c
        .shared_region(8729, &Params::new().with("regionTypeId", 6))
        .unwrap();
    assert_eq!(
        payload["query"],
        json!({"mapPageTypeId": "1", "regionTypeId": "6", "tableId": "8729"})
    );
}

#[test]
fn default_headers_are_sent() {
    let payload = client().get_json("anything", &Params::new()).unwrap();
    assert_eq!(payload["user_agent"], common::USER_AGENT);
}

#[test]
fn search_then_extract_region_id() {
    let c = client();
    let search = c.search("12206").unwrap();
    assert_eq!(search["query"], json!({"location": "12206", "v": "2"}));
    assert_eq!(c.region_id_from_search(&search).unwrap(), "8729");

    let overridden = c
        .search_with("12206", &Params::new().with("v", 3).with("al", 1))
        .unwrap();
    assert_eq!(overridden["query"]["v"], "3");
    assert_eq!(overridden["query"]["al"], "1");
}

#[test]
fn search_without_match_is_extraction_error() {
    let c = client();
    let search = c.search("nowhere").unwrap();
    let err = c.region_id_from_search(&search).unwrap_err();
    assert!(err.is_no_match(), "unexpected error: {err:?}");
}

#[test]
fn property_images_in_order() {
    let images = client()
        .get_property_images(&PropertyRef::new(9701815))
        .unwrap();
    assert_eq!(
        images,
        vec![
            "https://ssl.cdn-redfin.com/photo/1/mbpaddedwide/731/genMid.1_0.jpg".to_string(),
            "https://ssl.cdn-redfin.com/photo/1/mbpaddedwide/731/genMid.1_1.jpg".to_string(),
        ]
    );
}

#[test]
fn timeseries_labels_by_position() {
    let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let series = client()
        .get_property_timeseries_estimate_at(&PropertyRef::new(9701815), today)
        .unwrap();

    let labels = redfin::month_labels(today);
    assert_eq!(series.len(), 10);
    assert_eq!(series[0].month, "Dec 21");
    assert_eq!(series[0].estimate, Value::Null);
    assert_eq!(series[9].month, labels[9]);
    assert_eq!(series[9].estimate, json!(263_500));
}

#[test]
fn search_results_csv_is_untouched() {
    let query = SearchResultsQuery::new(8729, RegionType::Zip).market("albany");
    let body = client().get_search_results_table(&query).unwrap();
    assert_eq!(body, common::CSV.as_bytes());
}

#[test]
fn search_results_download_writes_body() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("exports").join("12206.csv");

    let query = SearchResultsQuery::new(8729, RegionType::Zip);
    let written = client()
        .download_search_results_table(&query, &target)
        .unwrap();

    assert_eq!(written, target);
    assert_eq!(std::fs::read(&target).unwrap(), common::CSV.as_bytes());
}

#[test]
fn missing_user_agent_is_request_error() {
    let c = Client::new(ClientConfig::default().with_url(common::spawn())).unwrap();
    let err = c.get_compete_score(&zip_8729()).unwrap_err();
    match err {
        Error::Request { status, body, .. } => {
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(body, "Access denied");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn non_success_status_is_not_decoded() {
    let err = client().get_json("missing", &Params::new()).unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert!(err.to_string().contains("base URL"));

    let err = client().redfin_request("missing", &Params::new()).unwrap_err();
    assert!(matches!(err, Error::Request { .. }));
}

#[test]
fn non_json_success_is_decode_error() {
    let c = client();
    assert!(matches!(
        c.get_json("html", &Params::new()),
        Err(Error::Decode { .. })
    ));
    assert!(matches!(
        c.get_json("short", &Params::new()),
        Err(Error::Decode { .. })
    ));
}

#[test]
fn escape_hatch_returns_raw_body() {
    let resp = client()
        .redfin_request("do/gis-school", &Params::new().with("region_id", 8729))
        .unwrap();
    assert!(resp.status().is_success());
    let text = resp.text().unwrap();
    assert!(text.starts_with(common::PREAMBLE));
}

#[test]
fn unreachable_host_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let cfg = ClientConfig::default()
        .with_url(format!("http://{addr}/stingray/"))
        .with_user_agent(common::USER_AGENT)
        .with_timeout(Duration::from_secs(2));
    let err = Client::new(cfg)
        .unwrap()
        .get_flood_risk_data(&zip_8729())
        .unwrap_err();
    assert!(matches!(err, Error::Transport { .. }), "unexpected error: {err:?}");
}
