use actix_web::{App, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use std::collections::HashMap;

/// Site summaries served by the fake metrics endpoint
#[allow(dead_code)]
pub fn sample_summaries() -> HashMap<String, Value> {
    let mut summaries = HashMap::new();
    summaries.insert(
        "client.com".to_string(),
        json!({
            "domain": "client.com",
            "technical": {
                "missingTitlesPercent": 12.0,
                "missingDescriptionsPercent": 30.0,
                "schemaMarkupPercent": 10.0,
                "canonicalPercent": 40.0,
                "mobileViewportPercent": 95.0
            },
            "performance": { "load": 3100.0, "domContentLoaded": 1500.0, "firstPaint": 900.0 }
        }),
    );
    summaries.insert(
        "rival.com".to_string(),
        json!({
            "domain": "rival.com",
            "technical": {
                "missingTitlesPercent": 2.0,
                "missingDescriptionsPercent": 8.0,
                "schemaMarkupPercent": 60.0,
                "canonicalPercent": 90.0,
                "mobileViewportPercent": 100.0
            },
            "performance": { "load": 2500.0, "domContentLoaded": 1400.0, "firstPaint": 850.0 }
        }),
    );
    // Summary without a domain field, filled in from the request
    summaries.insert(
        "anonymous.com".to_string(),
        json!({ "performance": { "load": 2000.0 } }),
    );
    summaries
}

async fn site_summary(
    domain: web::Path<String>,
    summaries: web::Data<HashMap<String, Value>>,
) -> HttpResponse {
    let domain = domain.into_inner();
    match domain.as_str() {
        "broken.com" => HttpResponse::InternalServerError().body("Error"),
        "garbage.com" => HttpResponse::Ok()
            .content_type("application/json")
            .body("{not json"),
        _ => match summaries.get(&domain) {
            Some(summary) => HttpResponse::Ok().json(summary),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

/// Start a metrics server on a random port and return its base URL
#[allow(dead_code)]
pub async fn start_metrics_server() -> String {
    let summaries = web::Data::new(sample_summaries());

    let http_server = HttpServer::new(move || {
        App::new()
            .app_data(summaries.clone())
            .route("/api/sites/{domain}", web::get().to(site_summary))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind metrics test server");

    let addr = http_server
        .addrs()
        .first()
        .cloned()
        .expect("No address bound");
    let url = format!("http://{}/api", addr);

    let app_server = http_server.run();

    tokio::spawn(async move {
        if let Err(e) = app_server.await {
            eprintln!("Test server error: {}", e);
        }
    });

    url
}
