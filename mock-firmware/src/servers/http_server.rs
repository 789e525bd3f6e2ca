use std::time::Instant;

use actix_cors::Cors;
use actix_web::dev::ServerHandle;
use actix_web::middleware::{Condition, Logger};
use actix_web::web::Data;
use actix_web::{error, web, App, HttpRequest, HttpResponse, HttpServer};
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use log::{info, warn};
use mixia_ipc::{
    ErrorResponse, HealthResponse, MuteChannelRequest, SetVolumeRequest, StatusResponse,
};
use tokio::sync::oneshot::Sender;

use crate::primary_worker::MixerSender;
use crate::servers::server_packet::{
    handle_mute_channel, handle_reset, handle_set_volume, handle_status, ApiError,
};

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub bind_address: String,
    pub port: u16,
    pub cors_enabled: bool,
}

pub struct AppData {
    mixer_tx: MixerSender,
    firmware_version: String,
    started: Instant,
}

impl AppData {
    pub fn new(mixer_tx: MixerSender, firmware_version: String) -> Self {
        Self {
            mixer_tx,
            firmware_version,
            started: Instant::now(),
        }
    }
}

pub async fn spawn_http_server(
    app_data: AppData,
    handle_tx: Sender<ServerHandle>,
    settings: HttpSettings,
) -> Result<()> {
    let app_data = Data::new(app_data);
    let cors_enabled = settings.cors_enabled;
    let server = HttpServer::new(move || {
        // Anything on the network may drive the mock, the chat UI is served from elsewhere.
        let cors = Cors::permissive().max_age(300);
        App::new()
            .wrap(Condition::new(cors_enabled, cors))
            .wrap(Logger::new("%r %s"))
            .app_data(app_data.clone())
            .configure(configure)
    })
    .bind((settings.bind_address.clone(), settings.port))?
    .run();

    info!(
        "Mock Firmware Server running on http://{}:{}/",
        settings.bind_address.as_str(),
        settings.port,
    );

    let _ = handle_tx.send(server.handle());
    server.await?;
    Ok(())
}

/// Registers the firmware routes. Methods are matched per resource so that a wrong method on a
/// known path falls through to the same 404 as an unknown path.
pub fn configure(config: &mut web::ServiceConfig) {
    config
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            warn!("Rejected request body: {}", err);
            let body = ErrorResponse::new(err.to_string());
            error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
        }))
        .service(
            web::resource("/setVolume")
                .route(web::post().to(set_volume))
                .default_service(web::to(not_found)),
        )
        .service(
            web::resource("/muteChannel")
                .route(web::post().to(mute_channel))
                .default_service(web::to(not_found)),
        )
        .service(
            web::resource("/status")
                .route(web::get().to(status))
                .default_service(web::to(not_found)),
        )
        .service(
            web::resource("/reset")
                .route(web::post().to(reset))
                .default_service(web::to(not_found)),
        )
        .service(
            web::resource("/health")
                .route(web::get().to(health))
                .default_service(web::to(not_found)),
        )
        .default_service(web::to(not_found));
}

async fn set_volume(
    request: web::Json<SetVolumeRequest>,
    app_data: Data<AppData>,
) -> Result<HttpResponse, ApiError> {
    let response = handle_set_volume(request.into_inner(), &app_data.mixer_tx).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn mute_channel(
    request: web::Json<MuteChannelRequest>,
    app_data: Data<AppData>,
) -> Result<HttpResponse, ApiError> {
    let response = handle_mute_channel(request.into_inner(), &app_data.mixer_tx).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn status(app_data: Data<AppData>) -> Result<HttpResponse, ApiError> {
    let mixer = handle_status(&app_data.mixer_tx).await?;
    Ok(HttpResponse::Ok().json(StatusResponse {
        mixer,
        timestamp: timestamp(),
        firmware_version: app_data.firmware_version.clone(),
    }))
}

async fn reset(app_data: Data<AppData>) -> Result<HttpResponse, ApiError> {
    let response = handle_reset(&app_data.mixer_tx).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn health(app_data: Data<AppData>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".into(),
        uptime: app_data.started.elapsed().as_secs_f64(),
        timestamp: timestamp(),
    })
}

async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: "Endpoint not found".into(),
        message: None,
        path: Some(req.uri().to_string()),
    })
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::Mixer;
    use crate::primary_worker::spawn_mixer_worker;
    use crate::Shutdown;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};
    use tokio::sync::mpsc;

    fn app_data() -> Data<AppData> {
        let (mixer_tx, mixer_rx) = mpsc::channel(8);
        actix_web::rt::spawn(spawn_mixer_worker(mixer_rx, Shutdown::new(), Mixer::default()));
        Data::new(AppData::new(mixer_tx, "mock-1.0.0".into()))
    }

    #[actix_web::test]
    async fn set_volume_updates_and_unmutes() {
        let app = test::init_service(App::new().app_data(app_data()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/muteChannel")
            .set_json(json!({"instrument": "piano"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["muted"], json!(true));
        assert_eq!(body["message"], json!("piano muted"));

        let req = test::TestRequest::post()
            .uri("/setVolume")
            .set_json(json!({"instrument": "piano", "volume": 7}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["instrument"], json!("piano"));
        assert_eq!(body["volume"], json!(7));
        assert_eq!(body["state"], json!({"volume": 7, "muted": false}));
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .contains("Volume set successfully")
        );
    }

    #[actix_web::test]
    async fn set_volume_out_of_range_is_bad_request() {
        let app = test::init_service(App::new().app_data(app_data()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/setVolume")
            .set_json(json!({"instrument": "piano", "volume": 15}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("between 0 and 10"));

        let req = test::TestRequest::get().uri("/status").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["mixer"]["piano"]["volume"], json!(5));
    }

    #[actix_web::test]
    async fn every_out_of_range_number_gets_the_range_message() {
        let app = test::init_service(App::new().app_data(app_data()).configure(configure)).await;

        for payload in [
            r#"{"instrument": "piano", "volume": 15.5}"#,
            r#"{"instrument": "piano", "volume": 18446744073709551615}"#,
            r#"{"instrument": "piano", "volume": 1e3}"#,
            r#"{"instrument": "piano", "volume": -1}"#,
            r#"{"instrument": "piano", "volume": 2.5}"#,
        ] {
            let req = test::TestRequest::post()
                .uri("/setVolume")
                .insert_header(("content-type", "application/json"))
                .set_payload(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", payload);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({"error": "Volume must be between 0 and 10"}), "{}", payload);
        }

        let req = test::TestRequest::get().uri("/status").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["mixer"]["piano"]["volume"], json!(5));
    }

    #[actix_web::test]
    async fn instrument_names_are_case_sensitive() {
        let app = test::init_service(App::new().app_data(app_data()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/setVolume")
            .set_json(json!({"instrument": "PIANO", "volume": 3}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], json!("Instrument 'PIANO' not found"));

        let req = test::TestRequest::post()
            .uri("/muteChannel")
            .set_json(json!({"instrument": "Voz"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn missing_fields_and_unknown_instruments() {
        let app = test::init_service(App::new().app_data(app_data()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/setVolume")
            .set_json(json!({"instrument": "piano"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], json!("Missing instrument or volume parameter"));

        let req = test::TestRequest::post()
            .uri("/setVolume")
            .set_json(json!({"instrument": "unknown", "volume": 5}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], json!("Instrument 'unknown' not found"));

        let req = test::TestRequest::post()
            .uri("/muteChannel")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/muteChannel")
            .set_json(json!({"instrument": "unknown"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn malformed_body_is_bad_request() {
        let app = test::init_service(App::new().app_data(app_data()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/setVolume")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn status_reset_and_health() {
        let app = test::init_service(App::new().app_data(app_data()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/status").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["mixer"]["bateria"], json!({"volume": 7, "muted": false}));
        assert_eq!(body["firmware_version"], json!("mock-1.0.0"));
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));

        let req = test::TestRequest::post().uri("/reset").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], json!("Mixer reset successfully"));
        for (_, channel) in body["state"].as_object().unwrap() {
            assert_eq!(channel, &json!({"volume": 5, "muted": false}));
        }

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], json!("healthy"));
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);
    }

    #[actix_web::test]
    async fn unknown_routes_are_not_found() {
        let app = test::init_service(App::new().app_data(app_data()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/volume?x=1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "Endpoint not found", "path": "/volume?x=1"}));

        let req = test::TestRequest::get().uri("/setVolume").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
