use std::path::Path;

use axum::body::Body as AxumBody;
use http_body_util::BodyExt;
use hyper::{Method, Request, Response};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use crate::ports::file_system::{FileSystem, FileSystemError, FileSystemResult};

/// File system adapter serving the SPA shell with tower-http `ServeDir`.
///
/// Real files under the root are served as-is; any other path gets the index
/// file with status 200 so the client-side router can take over. Methods other
/// than GET and HEAD are answered as GET.
#[derive(Debug, Default, Clone)]
pub struct FileSystemAdapter;

impl FileSystemAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for FileSystemAdapter {
    async fn serve_spa(
        &self,
        root: &str,
        index_file: &str,
        mut req: Request<AxumBody>,
    ) -> FileSystemResult<Response<AxumBody>> {
        if index_file.contains("..") || Path::new(index_file).is_absolute() {
            return Err(FileSystemError::InvalidPath(format!(
                "Index file must be relative to the SPA root: {index_file}"
            )));
        }

        if req.method() != Method::GET && req.method() != Method::HEAD {
            *req.method_mut() = Method::GET;
        }

        let index_path = Path::new(root).join(index_file);
        let serve_dir = ServeDir::new(root)
            .append_index_html_on_directories(true)
            .fallback(ServeFile::new(index_path));

        let response = serve_dir.oneshot(req).await.map_err(|e| {
            FileSystemError::IoError(std::io::Error::other(format!("ServeDir error: {e}")))
        })?;

        let (parts, tower_body) = response.into_parts();
        let axum_body = AxumBody::new(tower_body.map_err(|e| {
            tracing::error!("Error reading static file body: {}", e);
            axum::Error::new(e)
        }));

        Ok(Response::from_parts(parts, axum_body))
    }
}
