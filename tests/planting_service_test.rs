// Planting and cancelling crops through the farmer record store

mod common;

use common::{dashboard_service, farmer_json, forecast_json, rabi_now, FARMER_ID, FARMER_PATH};
use crop_clock_service::services::planting_service::{CancelOutcome, PlantOutcome};
use crop_clock_service::services::{PlantingService, ServiceError};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use std::sync::{Arc, Mutex};

async fn mock_conditions(
    server: &mut ServerGuard,
    crops: serde_json::Value,
    humidity: Option<f64>,
) -> (Mock, Mock) {
    let farmer_mock = server
        .mock("GET", FARMER_PATH)
        .with_status(200)
        .with_body(farmer_json(crops))
        .create_async()
        .await;

    let forecast = server.mock("GET", "/v1/forecast").match_query(Matcher::Any);
    let forecast = match humidity {
        Some(h) => forecast.with_status(200).with_body(forecast_json(h)),
        None => forecast.with_status(503),
    };
    let forecast_mock = forecast.create_async().await;

    (farmer_mock, forecast_mock)
}

fn planting_service(server: &ServerGuard) -> PlantingService {
    PlantingService::new(dashboard_service(&server.url()))
}

#[tokio::test]
async fn test_plant_suitable_crop_stores_list() {
    let mut server = Server::new_async().await;
    let _mocks = mock_conditions(&mut server, json!([]), Some(70.0)).await;

    let put_mock = server
        .mock("PUT", FARMER_PATH)
        .match_body(Matcher::Regex(r#""cropName":"Tomato""#.to_string()))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let service = planting_service(&server);
    let outcome = service.plant(FARMER_ID, "Tomato", rabi_now()).await.unwrap();

    match outcome {
        PlantOutcome::Planted { crop } => {
            assert_eq!(crop.crop_name, "Tomato");
            assert_eq!(crop.plan_month.as_deref(), Some("Nov"));
            assert_eq!(crop.harvest_month.as_deref(), Some("Feb"));
            assert_eq!(crop.planted_date, rabi_now());
        }
        other => panic!("Expected Planted, got {:?}", other),
    }

    put_mock.assert_async().await;
}

#[tokio::test]
async fn test_plant_twice_is_noop() {
    let mut server = Server::new_async().await;
    let _mocks = mock_conditions(
        &mut server,
        json!([{"cropName": "Tomato", "planMonth": "Nov", "Harvest": "Feb"}]),
        Some(70.0),
    )
    .await;

    let put_mock = server
        .mock("PUT", FARMER_PATH)
        .expect(0)
        .create_async()
        .await;

    let service = planting_service(&server);
    let outcome = service.plant(FARMER_ID, "Tomato", rabi_now()).await.unwrap();
    assert!(matches!(outcome, PlantOutcome::AlreadyPlanted { .. }));

    put_mock.assert_async().await;
}

#[tokio::test]
async fn test_plant_unsuitable_crop_rejected() {
    let mut server = Server::new_async().await;
    let _mocks = mock_conditions(&mut server, json!([]), Some(70.0)).await;

    let put_mock = server
        .mock("PUT", FARMER_PATH)
        .expect(0)
        .create_async()
        .await;

    let service = planting_service(&server);
    assert!(matches!(
        service.plant(FARMER_ID, "Chili", rabi_now()).await,
        Err(ServiceError::NotPlantable { .. })
    ));

    put_mock.assert_async().await;
}

#[tokio::test]
async fn test_plant_with_unknown_conditions_rejected() {
    let mut server = Server::new_async().await;
    let _mocks = mock_conditions(&mut server, json!([]), None).await;

    let service = planting_service(&server);
    match service.plant(FARMER_ID, "Tomato", rabi_now()).await {
        Err(ServiceError::NotPlantable { crop, .. }) => assert_eq!(crop, "Tomato"),
        other => panic!("Expected NotPlantable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_plant_crop_missing_from_catalog() {
    let server = Server::new_async().await;

    let service = planting_service(&server);
    assert!(matches!(
        service.plant(FARMER_ID, "Jute", rabi_now()).await,
        Err(ServiceError::UnknownCrop(_))
    ));
}

/// Farmer record only; the forecast must not be requested
async fn mock_farmer_without_forecast(
    server: &mut ServerGuard,
    crops: serde_json::Value,
) -> (Mock, Mock) {
    let farmer_mock = server
        .mock("GET", FARMER_PATH)
        .with_status(200)
        .with_body(farmer_json(crops))
        .create_async()
        .await;
    let forecast_mock = server
        .mock("GET", "/v1/forecast")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    (farmer_mock, forecast_mock)
}

#[tokio::test]
async fn test_cancel_planted_crop() {
    let mut server = Server::new_async().await;
    let (_farmer_mock, forecast_mock) = mock_farmer_without_forecast(
        &mut server,
        json!([
            {"cropName": "Tomato", "planMonth": "Nov", "Harvest": "Feb"},
            {"cropName": "Potato", "planMonth": "Nov", "Harvest": "Mar"}
        ]),
    )
    .await;

    let put_mock = server
        .mock("PUT", FARMER_PATH)
        .match_body(Matcher::Json(json!({
            "crops": [{"cropName": "Potato", "planMonth": "Nov", "Harvest": "Mar"}]
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let service = planting_service(&server);
    let outcome = service.cancel(FARMER_ID, "Tomato", rabi_now()).await.unwrap();
    assert_eq!(outcome, CancelOutcome::Cancelled);

    put_mock.assert_async().await;
    forecast_mock.assert_async().await;
}

#[tokio::test]
async fn test_cancel_crop_not_planted() {
    let mut server = Server::new_async().await;
    let (_farmer_mock, forecast_mock) =
        mock_farmer_without_forecast(&mut server, json!([])).await;

    let put_mock = server
        .mock("PUT", FARMER_PATH)
        .expect(0)
        .create_async()
        .await;

    let service = planting_service(&server);
    let outcome = service.cancel(FARMER_ID, "Tomato", rabi_now()).await.unwrap();
    assert_eq!(outcome, CancelOutcome::NotPlanted);

    put_mock.assert_async().await;
    forecast_mock.assert_async().await;
}

#[tokio::test]
async fn test_concurrent_plants_keep_both_crops() {
    let mut server = Server::new_async().await;

    // Farmer store that serves back whatever was last PUT
    let stored = Arc::new(Mutex::new(json!([])));

    let read_state = Arc::clone(&stored);
    let _farmer_mock = server
        .mock("GET", FARMER_PATH)
        .with_status(200)
        .with_body_from_request(move |_| {
            let crops = read_state.lock().unwrap().clone();
            farmer_json(crops).into_bytes()
        })
        .create_async()
        .await;

    let write_state = Arc::clone(&stored);
    let _put_mock = server
        .mock("PUT", FARMER_PATH)
        .with_status(200)
        .with_body_from_request(move |request| {
            let body: serde_json::Value =
                serde_json::from_slice(request.body().unwrap()).unwrap();
            *write_state.lock().unwrap() = body["crops"].clone();
            b"{}".to_vec()
        })
        .create_async()
        .await;

    let _forecast_mock = server
        .mock("GET", "/v1/forecast")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(forecast_json(70.0))
        .create_async()
        .await;

    let service = planting_service(&server);
    let (tomato, potato) = tokio::join!(
        service.plant(FARMER_ID, "Tomato", rabi_now()),
        service.plant(FARMER_ID, "Potato", rabi_now()),
    );
    assert!(matches!(tomato, Ok(PlantOutcome::Planted { .. })));
    assert!(matches!(potato, Ok(PlantOutcome::Planted { .. })));

    let crops = stored.lock().unwrap().clone();
    let mut names: Vec<&str> = crops
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["cropName"].as_str().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Potato", "Tomato"]);
}
