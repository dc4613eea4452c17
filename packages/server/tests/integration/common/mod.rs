use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;

// Leading `::` picks the image-store crate over this `common` test module.
use ::common::storage::FilesystemImageStore;
use server::config::{AppConfig, CorsConfig, DatabaseConfig, ServerConfig, StorageConfig};
use server::state::AppState;

pub mod routes {
    pub const COFFEES: &str = "/coffees/";

    pub fn coffee(id: i32) -> String {
        format!("/coffees/{id}")
    }

    pub fn upload(filename: &str) -> String {
        format!("/uploads/{filename}")
    }
}

/// A running test server backed by a tempdir SQLite database and upload
/// directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub upload_dir: PathBuf,
    _root: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> i32 {
        self.body["id"].as_i64().expect("response should contain an id") as i32
    }
}

/// The full create form with default values.
pub fn coffee_form() -> Vec<(&'static str, String)> {
    vec![
        ("coffeeName", "Latte".to_string()),
        ("coffeeType", "Espresso-based".to_string()),
        ("rate", "4.5".to_string()),
        ("commentCount", "12".to_string()),
        ("price", "4.5".to_string()),
        ("isLiked", "true".to_string()),
        ("desc", "Smooth and milky".to_string()),
        ("buyCount", "100".to_string()),
        ("coffeeShopLocation", "Downtown".to_string()),
        ("coffeeAddress", "12 Bean St".to_string()),
    ]
}

impl TestApp {
    pub async fn spawn() -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");

        let db_path = root.path().join("coffee.db");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let db = server::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");

        let upload_dir = root.path().join("uploads");
        let images = FilesystemImageStore::new(upload_dir.clone(), 16 * 1024 * 1024)
            .await
            .expect("Failed to create image store");

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig { url: db_url },
            storage: StorageConfig {
                upload_dir: upload_dir.clone(),
                max_upload_size: 16 * 1024 * 1024,
            },
        };

        let state = AppState {
            db: db.clone(),
            images: Arc::new(images),
            config,
        };

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            upload_dir,
            _root: root,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn put(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Send a multipart form, optionally including an `image` file part.
    pub async fn send_form(
        &self,
        method: reqwest::Method,
        path: &str,
        fields: &[(&str, String)],
        file: Option<(&str, Vec<u8>)>,
    ) -> TestResponse {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name.to_string(), value.clone());
        }
        if let Some((file_name, bytes)) = file {
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(file_name.to_string())
                .mime_str("image/png")
                .expect("Failed to set MIME type");
            form = form.part("image", part);
        }

        let res = self
            .client
            .request(method, self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart request");

        TestResponse::from_response(res).await
    }

    /// Create a coffee with the default form and the given name; returns
    /// the parsed response.
    pub async fn create_coffee(&self, name: &str) -> TestResponse {
        let mut fields = coffee_form();
        fields[0].1 = name.to_string();

        let res = self
            .send_form(
                reqwest::Method::POST,
                routes::COFFEES,
                &fields,
                Some(("latte.png", b"PNG_DATA".to_vec())),
            )
            .await;
        assert_eq!(res.status, 200, "create_coffee failed: {}", res.text);
        res
    }

    /// Basenames of the files currently stored in the upload directory,
    /// excluding the `.tmp` staging directory.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.upload_dir)
            .expect("Failed to read upload dir")
            .filter_map(|entry| {
                let name = entry.ok()?.file_name().to_string_lossy().into_owned();
                (!name.starts_with('.')).then_some(name)
            })
            .collect();
        names.sort();
        names
    }
}

/// Basename of a public image URL (`/uploads/<basename>`).
pub fn upload_basename(image_url: &str) -> &str {
    image_url
        .strip_prefix("/uploads/")
        .expect("image should be a public /uploads/ URL")
}
