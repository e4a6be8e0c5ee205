use crate::analysis::Analyzer;
use crate::error::ApiError;
use crate::storage::upload_store::{StoredUpload, UploadStore};
use crate::tasks::task_service::TaskService;
use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info, warn};
use shared::{AnalysisResult, StartAnalysisResponse, UPLOAD_FIELD};
use std::path::PathBuf;

pub fn configure_routes(cfg: &mut web::ServiceConfig, upload_dir: PathBuf, result_dir: PathBuf) {
    cfg.service(web::resource("/analyze").route(web::post().to(handle_analyze)))
        .service(web::resource("/start-analysis").route(web::post().to(start_analysis)))
        .service(web::resource("/check-status/{task_id}").route(web::get().to(check_status)))
        .service(Files::new("/uploads", upload_dir))
        .service(Files::new("/results", result_dir));
}

/// Reads the `file` field of the form. Other fields are skipped.
async fn read_upload(mut payload: Multipart) -> Result<(String, Vec<u8>), ApiError> {
    let mut upload = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let is_file = upload.is_none() && field.name() == Some(UPLOAD_FIELD);
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();

        let mut image_data = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| ApiError::BadRequest(e.to_string()))?;
            if !is_file {
                continue;
            }
            if image_data.len() + data.len() > UploadStore::MAX_SIZE {
                return Err(ApiError::PayloadTooLarge("File too large".into()));
            }
            image_data.extend_from_slice(&data);
        }

        if is_file {
            upload = Some((file_name, image_data));
        }
    }

    upload.ok_or_else(|| ApiError::BadRequest("No file part".into()))
}

async fn save_upload(
    uploads: web::Data<UploadStore>,
    file_name: String,
    image_data: Vec<u8>,
) -> Result<StoredUpload, ApiError> {
    let stored = web::block(move || uploads.save(&file_name, image_data))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(stored)
}

async fn run_analysis(
    analyzer: web::Data<Analyzer>,
    upload: StoredUpload,
) -> Result<AnalysisResult, ApiError> {
    let result = web::block(move || {
        analyzer.analyze(&upload.bytes, &upload.stamp, Some(upload.url()))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(result)
}

async fn handle_analyze(
    analyzer: web::Data<Analyzer>,
    uploads: web::Data<UploadStore>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let (file_name, image_data) = read_upload(payload).await?;
    let upload = save_upload(uploads, file_name, image_data).await?;
    info!("Analyzing {}", upload.file_name);

    let result = run_analysis(analyzer, upload).await.map_err(|e| {
        error!("Analysis failed: {}", e);
        e
    })?;
    Ok(HttpResponse::Ok().json(result))
}

async fn start_analysis(
    analyzer: web::Data<Analyzer>,
    uploads: web::Data<UploadStore>,
    tasks: web::Data<TaskService>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let (file_name, image_data) = read_upload(payload).await?;
    let upload = save_upload(uploads, file_name, image_data).await?;
    let task = tasks.create_task().await;
    let task_id = task.task_id.clone();
    info!("Task {} queued for {}", task_id, upload.file_name);

    let tasks = tasks.into_inner();
    actix_web::rt::spawn(async move {
        let finished = match run_analysis(analyzer, upload).await {
            Ok(result) => tasks.complete_task(&task.task_id, result).await,
            Err(e) => {
                error!("Task {} failed: {}", task.task_id, e);
                tasks.fail_task(&task.task_id, e.to_string()).await
            }
        };
        if let Err(e) = finished {
            warn!("Could not record outcome of task {}: {}", task.task_id, e);
        }
    });

    Ok(HttpResponse::Accepted().json(StartAnalysisResponse { task_id }))
}

async fn check_status(
    tasks: web::Data<TaskService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    let task = tasks
        .get_task(&task_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", task_id)))?;
    Ok(HttpResponse::Ok().json(task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test};
    use image::{ImageFormat, Rgb, RgbImage};
    use shared::{AnalysisTask, ErrorResponse, TaskStatus};
    use std::io::Cursor;
    use std::time::Duration;

    const BOUNDARY: &str = "mangrove-test-boundary";

    struct Dirs {
        root: PathBuf,
        uploads: PathBuf,
        results: PathBuf,
    }

    impl Dirs {
        fn new() -> Self {
            let root = std::env::temp_dir().join(format!("mangrove-routes-{}", uuid::Uuid::new_v4()));
            let uploads = root.join("uploads");
            let results = root.join("results");
            std::fs::create_dir_all(&uploads).unwrap();
            std::fs::create_dir_all(&results).unwrap();
            Self { root, uploads, results }
        }
    }

    impl Drop for Dirs {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.root).ok();
        }
    }

    fn png() -> Vec<u8> {
        let image = RgbImage::from_fn(20, 10, |x, _| {
            if x < 10 { Rgb([20, 180, 40]) } else { Rgb([200, 170, 90]) }
        });
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    fn multipart(field: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(uri: &str, body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri(uri)
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    macro_rules! service {
        ($dirs:expr, $tasks:expr) => {{
            let uploads = $dirs.uploads.clone();
            let results = $dirs.results.clone();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(Analyzer::new(AnalysisConfig::default(), &$dirs.results)))
                    .app_data(web::Data::new(UploadStore::new(&$dirs.uploads)))
                    .app_data(web::Data::new($tasks.clone()))
                    .configure(move |cfg| configure_routes(cfg, uploads.clone(), results.clone())),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn analyze_returns_result_and_serves_images() {
        let dirs = Dirs::new();
        let app = service!(dirs, TaskService::default());

        let req = upload_request("/analyze", multipart("file", "teluk bay.png", &png())).to_request();
        let result: AnalysisResult = test::call_and_read_body_json(&app, req).await;

        let original = result.original_image_url.clone().unwrap();
        assert!(original.starts_with("/uploads/original_"));
        assert!(original.ends_with("_telukbay.png"));
        assert_eq!(result.composition.mangrove, 50.0);
        assert_eq!(result.composition.land, 50.0);
        assert_eq!(result.total_stock, 2.0);
        assert_eq!(result.total_area, 0.02);

        let req = test::TestRequest::get().uri(&result.segmented_image_url).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn missing_file_field_is_rejected() {
        let dirs = Dirs::new();
        let app = service!(dirs, TaskService::default());

        let req = upload_request("/analyze", multipart("image", "bay.png", &png())).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "No file part");
    }

    #[actix_web::test]
    async fn empty_file_name_is_rejected() {
        let dirs = Dirs::new();
        let app = service!(dirs, TaskService::default());

        let req = upload_request("/analyze", multipart("file", "", &png())).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "No selected file");
    }

    #[actix_web::test]
    async fn undecodable_image_is_a_server_error() {
        let dirs = Dirs::new();
        let app = service!(dirs, TaskService::default());

        let req = upload_request("/analyze", multipart("file", "notes.png", b"plain text")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.error.starts_with("Failed to decode image"));
    }

    #[actix_web::test]
    async fn started_task_completes_in_background() {
        let dirs = Dirs::new();
        let tasks = TaskService::default();
        let app = service!(dirs, tasks);

        let req = upload_request("/start-analysis", multipart("file", "bay.png", &png())).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let started: StartAnalysisResponse = test::read_body_json(resp).await;

        let mut task = None;
        for _ in 0..200 {
            let req = test::TestRequest::get()
                .uri(&format!("/check-status/{}", started.task_id))
                .to_request();
            let polled: AnalysisTask = test::call_and_read_body_json(&app, req).await;
            if polled.status.is_terminal() {
                task = Some(polled);
                break;
            }
            actix_web::rt::time::sleep(Duration::from_millis(10)).await;
        }

        let task = task.expect("task should finish");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.result.unwrap().total_stock, 2.0);
    }

    #[actix_web::test]
    async fn failed_task_reports_error() {
        let dirs = Dirs::new();
        let tasks = TaskService::default();
        let app = service!(dirs, tasks);

        let req = upload_request("/start-analysis", multipart("file", "bad.png", b"garbage")).to_request();
        let started: StartAnalysisResponse = test::call_and_read_body_json(&app, req).await;

        let mut task = None;
        for _ in 0..200 {
            let current = tasks.get_task(&started.task_id).await.unwrap();
            if current.status.is_terminal() {
                task = Some(current);
                break;
            }
            actix_web::rt::time::sleep(Duration::from_millis(10)).await;
        }

        let task = task.expect("task should finish");
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.unwrap().starts_with("Failed to decode image"));
    }

    #[actix_web::test]
    async fn pending_task_uses_lowercase_status_on_the_wire() {
        let dirs = Dirs::new();
        let tasks = TaskService::default();
        let app = service!(dirs, tasks);
        let task = tasks.create_task().await;

        let req = test::TestRequest::get()
            .uri(&format!("/check-status/{}", task.task_id))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["task_id"], task.task_id.as_str());
        assert_eq!(body["status"], "pending");
        assert!(body["result"].is_null());
    }

    #[actix_web::test]
    async fn unknown_task_is_not_found() {
        let dirs = Dirs::new();
        let app = service!(dirs, TaskService::default());

        let req = test::TestRequest::get().uri("/check-status/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "Task not found: nope");
    }
}
