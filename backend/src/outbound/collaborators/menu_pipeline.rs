//! Forwarding of menu photos to the processing pipeline.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};

use super::{success_body, transport_error};
use crate::domain::ports::{CollaboratorError, MenuImagePipeline, MenuImageSubmission};
use crate::outbound::http_support::{client_with_timeout, endpoint_url};

/// Posts `menu_image` and `restaurant_id` as multipart to `{base}/process-menu`.
pub struct HttpMenuImagePipeline {
    client: Client,
    endpoint: Url,
}

impl HttpMenuImagePipeline {
    /// # Errors
    ///
    /// Fails when the endpoint cannot be derived from `base` or the client
    /// cannot be built.
    pub fn new(base: &Url, timeout: Duration) -> color_eyre::Result<Self> {
        Ok(Self {
            client: client_with_timeout(timeout)?,
            endpoint: endpoint_url(base, "/process-menu")?,
        })
    }
}

#[async_trait]
impl MenuImagePipeline for HttpMenuImagePipeline {
    async fn submit_menu_image(
        &self,
        submission: &MenuImageSubmission,
    ) -> Result<(), CollaboratorError> {
        let image = Part::stream(submission.content.clone())
            .file_name(submission.filename.clone())
            .mime_str(&submission.mime_type)
            .map_err(|error| CollaboratorError::transport(error.to_string()))?;
        let form = Form::new()
            .part("menu_image", image)
            .text("restaurant_id", submission.restaurant_id.to_string());
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|error| transport_error(&error))?;
        success_body(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityId;
    use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
    use bytes::Bytes;
    use std::net::TcpListener;

    /// Echo the multipart field names back so the test can assert on them.
    async fn process(request: HttpRequest, body: Bytes) -> HttpResponse {
        let Some(boundary) = request
            .headers()
            .get(actix_web::http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| multer::parse_boundary(value).ok())
        else {
            return HttpResponse::BadRequest().finish();
        };
        let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);
        let mut seen = Vec::new();
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_owned();
            let text = field.text().await.unwrap_or_default();
            seen.push(format!("{name}={text}"));
        }
        let has_image = seen.iter().any(|entry| entry.starts_with("menu_image="));
        let has_restaurant = seen.iter().any(|entry| entry.starts_with("restaurant_id="));
        if has_image && has_restaurant {
            HttpResponse::Ok().json(seen)
        } else {
            HttpResponse::UnprocessableEntity().finish()
        }
    }

    fn spawn_pipeline() -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let server = HttpServer::new(|| App::new().route("/process-menu", web::post().to(process)))
            .disable_signals()
            .workers(1)
            .listen(listener)
            .expect("listen")
            .run();
        actix_web::rt::spawn(server);
        Url::parse(&format!("http://{addr}")).expect("base url")
    }

    fn submission(mime_type: &str) -> MenuImageSubmission {
        MenuImageSubmission {
            restaurant_id: EntityId::random(),
            filename: "menu.png".to_owned(),
            mime_type: mime_type.to_owned(),
            content: Bytes::from_static(b"not really a png"),
        }
    }

    #[actix_rt::test]
    async fn posts_the_image_and_restaurant() {
        let pipeline = HttpMenuImagePipeline::new(&spawn_pipeline(), Duration::from_secs(5))
            .expect("pipeline");
        pipeline
            .submit_menu_image(&submission("image/png"))
            .await
            .expect("forwarded");
    }

    #[actix_rt::test]
    async fn unreachable_pipeline_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        let base = Url::parse(&format!("http://{addr}")).expect("url");
        let pipeline = HttpMenuImagePipeline::new(&base, Duration::from_secs(2)).expect("pipeline");
        let error = pipeline
            .submit_menu_image(&submission("image/png"))
            .await
            .expect_err("nothing listening");
        assert!(matches!(
            error,
            CollaboratorError::Transport { .. } | CollaboratorError::Timeout { .. }
        ));
    }
}
