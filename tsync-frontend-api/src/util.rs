use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::{Error, Result};

pub fn auth_header_value(token: &str) -> String {
    format!("Bearer {token}")
}

fn encode(segment: &str) -> impl std::fmt::Display + '_ {
    utf8_percent_encode(segment, NON_ALPHANUMERIC)
}

pub fn context_comments_url(base: &str, context_id: &str) -> String {
    format!("{base}/contexts/{}/comments", encode(context_id))
}

pub fn comment_page_url(base: &str, context_id: &str, page: u32, limit: u32) -> String {
    format!(
        "{}?page={page}&limit={limit}",
        context_comments_url(base, context_id)
    )
}

pub fn replies_page_url(base: &str, parent_id: &str, page: u32, limit: u32) -> String {
    format!(
        "{}/replies?page={page}&limit={limit}",
        comment_url(base, parent_id)
    )
}

pub fn comment_url(base: &str, id: &str) -> String {
    format!("{base}/comments/{}", encode(id))
}

pub fn likes_url(base: &str) -> String {
    format!("{base}/likes")
}

/// Turns a non-2xx response into [`Error::Api`].
///
/// The message is taken from the `{ message }` body if present and
/// falls back to the reason phrase of the status code.
pub async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<tsync_boundary::Error>(&body)
        .ok()
        .and_then(|err| err.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_owned());
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

pub async fn into_json<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned,
{
    // ensure we've got 2xx status
    let response = ensure_success(response).await?;
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsync_boundary::LikeResponse;

    fn response(status: u16, body: &'static str) -> Response {
        http::Response::builder()
            .status(status)
            .body(body)
            .unwrap()
            .into()
    }

    #[test]
    fn build_urls() {
        let base = "https://api.example.com";
        assert_eq!(
            comment_page_url(base, "42", 2, 20),
            "https://api.example.com/contexts/42/comments?page=2&limit=20"
        );
        assert_eq!(
            replies_page_url(base, "7", 1, 10),
            "https://api.example.com/comments/7/replies?page=1&limit=10"
        );
        assert_eq!(comment_url(base, "a/b"), "https://api.example.com/comments/a%2Fb");
        assert_eq!(likes_url(base), "https://api.example.com/likes");
    }

    #[test]
    fn bearer_token() {
        assert_eq!(auth_header_value("secret"), "Bearer secret");
    }

    #[tokio::test]
    async fn decode_successful_response() {
        let liked: LikeResponse = into_json(response(200, r#"{"liked":true}"#))
            .await
            .unwrap();
        assert!(liked.liked);
    }

    #[tokio::test]
    async fn take_error_message_from_body() {
        let err = into_json::<LikeResponse>(response(429, r#"{"message":"Slow down"}"#))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::Api {
                status: 429,
                message: "Slow down".into()
            }
        );
    }

    #[tokio::test]
    async fn fall_back_to_reason_phrase() {
        let err = into_json::<LikeResponse>(response(404, ""))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::Api {
                status: 404,
                message: "Not Found".into()
            }
        );
    }
}
