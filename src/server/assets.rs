use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use include_dir::{include_dir, Dir};

static UI_DIST: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/ui/dist");

/// Serve the embedded pre-built UI.
///
/// Bare paths without a file extension (other than `/`) get `.html`
/// appended before lookup, so `/login` serves `login.html`.
pub(super) async fn serve(uri: Uri) -> Response<Body> {
    let mut path = uri.path().trim_start_matches('/').to_string();
    if path.is_empty() {
        path = "index.html".into();
    } else if std::path::Path::new(&path).extension().is_none() {
        path.push_str(".html");
    }

    match UI_DIST.get_file(&path) {
        Some(file) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                [(CONTENT_TYPE, mime.essence_str().to_string())],
                file.contents(),
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn status_for(path: &str) -> StatusCode {
        serve(path.parse().unwrap()).await.status()
    }

    #[tokio::test]
    async fn root_serves_index() {
        assert_eq!(status_for("/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn bare_path_gets_html_suffix() {
        assert_eq!(status_for("/login").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_asset_is_404() {
        assert_eq!(status_for("/no-such-page").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn html_content_type() {
        let response = serve("/login".parse().unwrap()).await;
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/html"
        );
    }
}
