//! In-process stand-in for the stingray API.
//!
//! JSON routes answer with the `{}&&` preamble like the real service. Unknown
//! paths echo back what was received (path, query, user-agent) so tests can
//! assert on request construction. Requests without a user-agent get a 403.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};

pub const PREAMBLE: &str = "{}&&";
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
pub const CSV: &str = "SALE TYPE,SOLD DATE,PROPERTY TYPE,ADDRESS,CITY,STATE OR PROVINCE,ZIP OR POSTAL CODE,PRICE\r\n\
MLS Listing,,Single Family Residential,363 Elk St,Albany,NY,12206,289000\r\n\
PAST SALE,June-14-2024,Condo/Co-op,\"12 Lark St, Unit 3\",Albany,NY,12210,215500\r\n";

/// Starts the mock server on a random port and returns its stingray base URL.
pub fn spawn() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr: SocketAddr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            axum::serve(listener, app()).await
        })
        .unwrap();
    });

    format!("http://{addr}/stingray/")
}

fn app() -> Router {
    Router::new().route("/stingray/{*path}", get(stingray))
}

async fn stingray(
    Path(path): Path<String>,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    if user_agent.is_empty() {
        return (StatusCode::FORBIDDEN, "Access denied").into_response();
    }

    match path.as_str() {
        "api/gis-csv" => ([(header::CONTENT_TYPE, "text/csv")], CSV).into_response(),
        "do/location-autocomplete" => {
            let sections = if query.get("location").map(String::as_str) == Some("nowhere") {
                json!([])
            } else {
                json!([{ "rows": [{ "id": "2_8729", "name": "12206", "type": "1" }], "name": "Places" }])
            };
            preamble_json(json!({
                "version": 2,
                "errorMessage": "Success",
                "resultCode": 0,
                "payload": { "sections": sections },
                "query": query,
            }))
        }
        "api/home/details/aboveTheFold" => preamble_json(json!({
            "resultCode": 0,
            "payload": { "mediaBrowserInfo": { "photos": [
                { "photoUrls": {
                    "nonFullScreenPhotoUrlCompressed": "https://ssl.cdn-redfin.com/photo/1/mbpaddedwide/731/genMid.1_0.jpg",
                    "fullScreenPhotoUrl": "https://ssl.cdn-redfin.com/photo/1/bigphoto/731/1_0.jpg"
                } },
                { "photoUrls": {
                    "nonFullScreenPhotoUrlCompressed": "https://ssl.cdn-redfin.com/photo/1/mbpaddedwide/731/genMid.1_1.jpg"
                } }
            ] } },
        })),
        "api/home/details/avmHistoricalData" => {
            let series: Vec<Value> = (0..10)
                .map(|i| if i == 0 { Value::Null } else { json!(250_000 + i * 1_500) })
                .collect();
            preamble_json(json!({ "payload": { "propertyTimeSeries": series } }))
        }
        "html" => "<!DOCTYPE html><html><body>Please verify you are a human</body></html>"
            .into_response(),
        "short" => "{}&".into_response(),
        "missing" => (StatusCode::NOT_FOUND, "no such endpoint").into_response(),
        _ => preamble_json(json!({
            "path": path,
            "query": query,
            "user_agent": user_agent,
        })),
    }
}

fn preamble_json(value: Value) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json")],
        format!("{PREAMBLE}{value}"),
    )
        .into_response()
}
