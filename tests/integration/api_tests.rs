//! HTTP API integration tests.
//!
//! Each test builds a router over a mock source and drives it with
//! `tower::ServiceExt::oneshot`.

use std::sync::atomic::Ordering;

use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use wsi_deepzoom::geometry::PixelRect;
use wsi_deepzoom::pyramid::PyramidConfig;
use wsi_deepzoom::region::OutputLimits;
use wsi_deepzoom::server::{create_router, RouterConfig};
use wsi_deepzoom::slide::LocalSlideSource;
use wsi_deepzoom::tile::TileService;

use super::test_utils::{
    gradient_image, is_valid_jpeg, jpeg_dimensions, sample_source, MockSlideSource,
};

// =============================================================================
// Helpers
// =============================================================================

fn router_for(source: MockSlideSource) -> Router {
    let service = TileService::new(source, PyramidConfig::default()).unwrap();
    create_router(service, RouterConfig::new())
}

fn sample_router() -> Router {
    router_for(sample_source())
}

async fn get(router: Router, uri: &str) -> axum::response::Response {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    router.oneshot(request).await.unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn header<'a>(response: &'a axum::response::Response, name: &str) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

// =============================================================================
// Health and Listing
// =============================================================================

#[tokio::test]
async fn test_health() {
    let response = get(sample_router(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_slides_list_sorted() {
    let source = MockSlideSource::new()
        .with_slide("b.png", gradient_image(10, 10))
        .with_slide("a.jpg", gradient_image(10, 10));

    let response = get(router_for(source), "/slides").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["slides"], serde_json::json!(["a.jpg", "b.png"]));
}

// =============================================================================
// Manifests
// =============================================================================

#[tokio::test]
async fn test_slide_manifest() {
    let response = get(sample_router(), "/slides/sample.jpg").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["slide_id"], "sample.jpg");
    assert_eq!(json["width"], 1000);
    assert_eq!(json["height"], 800);
    assert_eq!(json["tile_size"], 256);
    assert_eq!(json["overlap"], 0);
    assert_eq!(json["level_count"], 10);
    assert_eq!(json["deep_zoom_level_count"], 11);
    assert_eq!(json["bounds"]["width"], 1000);

    let levels = json["levels"].as_array().unwrap();
    assert_eq!(levels.len(), 10);
    assert_eq!(levels[0]["width"], 2);
    assert_eq!(levels[0]["height"], 2);
    assert_eq!(levels[0]["downsample"], 512);
    assert_eq!(levels[9]["width"], 1000);
    assert_eq!(levels[9]["height"], 800);
    assert_eq!(levels[9]["tiles_x"], 4);
    assert_eq!(levels[9]["tiles_y"], 4);
}

#[tokio::test]
async fn test_dzi_descriptor() {
    let response = get(sample_router(), "/slides/sample.jpg/dzi").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "application/xml");

    let xml = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(xml.contains(r#"TileSize="256""#));
    assert!(xml.contains(r#"Overlap="0""#));
    assert!(xml.contains(r#"Format="jpeg""#));
    assert!(xml.contains(r#"<Size Width="1000" Height="800" />"#));
}

#[tokio::test]
async fn test_manifest_missing_slide() {
    let response = get(sample_router(), "/slides/missing.jpg/dzi").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "not_found");
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_manifest_honours_bounds() {
    let image = gradient_image(1000, 800).with_bounds(PixelRect::new(100, 50, 612, 306));
    let source = MockSlideSource::new().with_slide("bounded.jpg", image);

    let response = get(router_for(source), "/slides/bounded.jpg").await;
    let json = body_json(response).await;
    assert_eq!(json["width"], 512);
    assert_eq!(json["height"], 256);
    assert_eq!(json["bounds"]["x"], 100);
    assert_eq!(json["bounds"]["y"], 50);
    assert_eq!(json["level_count"], 10);
}

// =============================================================================
// Tiles
// =============================================================================

#[tokio::test]
async fn test_full_resolution_tile() {
    let response = get(sample_router(), "/tiles/sample.jpg/9/0/0.jpg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "image/jpeg");
    assert_eq!(header(&response, "cache-control"), "public, max-age=3600");
    assert_eq!(header(&response, "x-tile-cache-hit"), "false");
    assert_eq!(header(&response, "x-tile-quality"), "80");

    let data = body_bytes(response).await;
    assert!(is_valid_jpeg(&data));
    assert_eq!(jpeg_dimensions(&data), (256, 256));
}

#[tokio::test]
async fn test_edge_tile_is_truncated() {
    let response = get(sample_router(), "/tiles/sample.jpg/9/3/3.jpg").await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_bytes(response).await;
    assert_eq!(jpeg_dimensions(&data), (232, 32));
}

#[tokio::test]
async fn test_coarsest_tile() {
    let response = get(sample_router(), "/tiles/sample.jpg/0/0/0").await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_bytes(response).await;
    assert_eq!(jpeg_dimensions(&data), (2, 2));
}

#[tokio::test]
async fn test_dzi_tile_path() {
    for filename in ["1_1.jpeg", "1_1.jpg", "1_1"] {
        let uri = format!("/slides/sample.jpg/dzi_files/9/{}", filename);
        let response = get(sample_router(), &uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", filename);

        // Deep Zoom level 9 is 500x400; tile (1, 1) covers 256..500 x 256..400
        let data = body_bytes(response).await;
        assert_eq!(jpeg_dimensions(&data), (244, 144));
    }
}

#[tokio::test]
async fn test_dzi_levels_follow_deep_zoom_numbering() {
    // 1000 wide: Deep Zoom puts full resolution at ceil(log2(1000)) = 10
    let response = get(sample_router(), "/slides/sample.jpg/dzi_files/10/3_3.jpeg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(jpeg_dimensions(&body_bytes(response).await), (232, 32));

    // Level 9 is 500x400, a 2x2 grid
    let response = get(sample_router(), "/slides/sample.jpg/dzi_files/9/2_0.jpeg").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "tile_not_found");

    let response = get(sample_router(), "/slides/sample.jpg/dzi_files/1/0_0.jpeg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(jpeg_dimensions(&body_bytes(response).await), (2, 2));

    for level in [0, 11] {
        let uri = format!("/slides/sample.jpg/dzi_files/{}/0_0.jpeg", level);
        let response = get(sample_router(), &uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body_json(response).await["error"], "tile_not_found");
    }
}

#[tokio::test]
async fn test_dzi_levels_on_power_of_two_image() {
    let source = MockSlideSource::new().with_slide("square.png", gradient_image(1024, 512));

    let response = get(router_for(source), "/slides/square.png/dzi_files/10/3_1.jpeg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(jpeg_dimensions(&body_bytes(response).await), (256, 256));
}

#[tokio::test]
async fn test_tile_with_overlap() {
    let service =
        TileService::new(sample_source(), PyramidConfig::new(254, 1, true)).unwrap();
    let router = create_router(service, RouterConfig::new());

    let response = get(router.clone(), "/slides/sample.jpg/dzi_files/10/0_0.jpeg").await;
    let data = body_bytes(response).await;
    assert_eq!(jpeg_dimensions(&data), (255, 255));

    let response = get(router, "/slides/sample.jpg/dzi_files/10/1_1.jpeg").await;
    let data = body_bytes(response).await;
    assert_eq!(jpeg_dimensions(&data), (256, 256));
}

#[tokio::test]
async fn test_tile_custom_quality() {
    let response = get(sample_router(), "/tiles/sample.jpg/9/1/1.jpg?quality=50").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-tile-quality"), "50");
}

#[tokio::test]
async fn test_router_default_quality() {
    let service = TileService::new(sample_source(), PyramidConfig::default()).unwrap();
    let router = create_router(service, RouterConfig::new().with_default_quality(95));

    let response = get(router, "/tiles/sample.jpg/9/1/1.jpg").await;
    assert_eq!(header(&response, "x-tile-quality"), "95");
}

#[tokio::test]
async fn test_invalid_level_is_not_found() {
    let response = get(sample_router(), "/tiles/sample.jpg/15/0/0.jpg").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "tile_not_found");
}

#[tokio::test]
async fn test_tile_outside_grid_is_not_found() {
    let response = get(sample_router(), "/tiles/sample.jpg/9/4/0.jpg").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "tile_not_found");
}

#[tokio::test]
async fn test_tile_missing_slide() {
    let response = get(sample_router(), "/tiles/missing.jpg/0/0/0.jpg").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_tile_invalid_quality() {
    let response = get(sample_router(), "/tiles/sample.jpg/9/0/0.jpg?quality=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_quality");
}

#[tokio::test]
async fn test_tile_malformed_parameters() {
    for uri in [
        "/tiles/sample.jpg/9/0/0.jpg?quality=abc",
        "/tiles/sample.jpg/9/0/abc.jpg",
        "/tiles/sample.jpg/x/0/0.jpg",
        "/slides/sample.jpg/dzi_files/9/00.jpeg",
    ] {
        let response = get(sample_router(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid_argument", "{}", uri);
    }
}

// =============================================================================
// Tile Cache
// =============================================================================

#[tokio::test]
async fn test_tiles_not_cached_by_default() {
    let source = sample_source();
    let opens = source.open_counter();
    let router = router_for(source);

    for _ in 0..2 {
        let response = get(router.clone(), "/tiles/sample.jpg/9/0/0.jpg").await;
        assert_eq!(header(&response, "x-tile-cache-hit"), "false");
    }
    assert_eq!(opens.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cache_hit_when_enabled() {
    let source = sample_source();
    let opens = source.open_counter();
    let service = TileService::new(source, PyramidConfig::default())
        .unwrap()
        .with_cache_capacity(4 * 1024 * 1024);
    let router = create_router(service, RouterConfig::new());

    let first = get(router.clone(), "/tiles/sample.jpg/9/0/0.jpg").await;
    assert_eq!(header(&first, "x-tile-cache-hit"), "false");
    let first = body_bytes(first).await;

    let second = get(router.clone(), "/tiles/sample.jpg/9/0/0.jpg").await;
    assert_eq!(header(&second, "x-tile-cache-hit"), "true");
    assert_eq!(body_bytes(second).await, first);
    assert_eq!(opens.load(Ordering::SeqCst), 1);

    // A different quality is a different entry
    let other = get(router, "/tiles/sample.jpg/9/0/0.jpg?quality=60").await;
    assert_eq!(header(&other, "x-tile-cache-hit"), "false");
    assert_eq!(opens.load(Ordering::SeqCst), 2);
}

// =============================================================================
// Regions
// =============================================================================

#[tokio::test]
async fn test_region_clamped_to_image() {
    let response = get(
        sample_router(),
        "/slides/sample.jpg/region?x=-50&y=-50&width=200&height=200",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "image/jpeg");
    assert_eq!(header(&response, "x-region-crop"), "0,0,150,150");
    assert_eq!(header(&response, "x-region-size"), "150x150");
    assert_eq!(header(&response, "x-view-center-x"), "0.075000");
    assert_eq!(header(&response, "x-view-center-y"), "0.093750");
    assert_eq!(header(&response, "x-view-zoom"), "6.666667");

    let data = body_bytes(response).await;
    assert_eq!(jpeg_dimensions(&data), (150, 150));
}

#[tokio::test]
async fn test_region_fitted_to_target() {
    let response = get(
        sample_router(),
        "/slides/sample.jpg/region?x=0&y=0&width=300&height=200&target_w=100&target_h=100",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-region-crop"), "0,0,300,200");
    assert_eq!(header(&response, "x-region-size"), "100x67");

    let data = body_bytes(response).await;
    assert_eq!(jpeg_dimensions(&data), (100, 67));
}

#[tokio::test]
async fn test_region_entirely_outside() {
    let response = get(
        sample_router(),
        "/slides/sample.jpg/region?x=5000&y=5000&width=100&height=100",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-region-crop"), "999,799,1000,800");
    assert_eq!(header(&response, "x-region-size"), "1x1");
}

#[tokio::test]
async fn test_region_non_positive_target_is_ignored() {
    let response = get(
        sample_router(),
        "/slides/sample.jpg/region?x=0&y=0&width=300&height=200&target_w=0&target_h=100",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-region-size"), "300x200");
}

#[tokio::test]
async fn test_region_invalid_arguments() {
    for uri in [
        "/slides/sample.jpg/region?x=0&y=0&width=100&height=100&target_w=50",
        "/slides/sample.jpg/region?y=0&width=100&height=100",
        "/slides/sample.jpg/region?x=a&y=0&width=100&height=100",
    ] {
        let response = get(sample_router(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid_argument", "{}", uri);
    }
}

#[tokio::test]
async fn test_region_oversized_target_rejected() {
    for target in ["1000000000000", "20000"] {
        let uri = format!(
            "/slides/sample.jpg/region?x=0&y=0&width=1000&height=800&target_w={0}&target_h={0}",
            target
        );
        let response = get(sample_router(), &uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid_argument", "{}", uri);
    }
}

#[tokio::test]
async fn test_region_limits_from_service() {
    let service = TileService::new(sample_source(), PyramidConfig::default())
        .unwrap()
        .with_region_limits(OutputLimits::new(4096, 4096 * 4096));
    let router = create_router(service, RouterConfig::new());

    let response = get(
        router.clone(),
        "/slides/sample.jpg/region?x=0&y=0&width=1000&height=800&target_w=5000&target_h=5000",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(
        router,
        "/slides/sample.jpg/region?x=0&y=0&width=1000&height=800&target_w=4000&target_h=4000",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-region-size"), "4000x3200");
}

#[tokio::test]
async fn test_region_missing_slide() {
    let response = get(
        sample_router(),
        "/slides/missing.jpg/region?x=0&y=0&width=10&height=10",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Local Directory Source
// =============================================================================

#[tokio::test]
async fn test_local_directory_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    image::RgbImage::from_fn(300, 200, |x, y| image::Rgb([x as u8, y as u8, 0]))
        .save(dir.path().join("scan.png"))
        .unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"not a slide").unwrap();

    let service =
        TileService::new(LocalSlideSource::new(dir.path()), PyramidConfig::default()).unwrap();
    let router = create_router(service, RouterConfig::new().with_tracing(false));

    let json = body_json(get(router.clone(), "/slides").await).await;
    assert_eq!(json["slides"], serde_json::json!(["scan.png"]));

    let json = body_json(get(router.clone(), "/slides/scan.png").await).await;
    assert_eq!(json["level_count"], 9);
    assert_eq!(json["deep_zoom_level_count"], 10);

    let response = get(router.clone(), "/slides/scan.png/dzi_files/9/1_0.jpeg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(jpeg_dimensions(&body_bytes(response).await), (44, 200));

    let response = get(router, "/slides/notes.txt/dzi").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
