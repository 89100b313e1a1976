use rocket::http::CookieJar;

pub const CSRF_COOKIE: &str = "csrf_token";
const TOKEN_LENGTH: usize = 32;

/// Token tying the send form to the browser it was served to.
/// It lives in a private cookie and is echoed back by the form, in a hidden field.
/// The same token is kept for the whole browser session.
pub fn issue_token(cookies: &CookieJar<'_>) -> String {
    if let Some(cookie) = cookies.get_private(CSRF_COOKIE) {
        return cookie.value().to_owned();
    }

    let token = generate_token();
    cookies.add_private((CSRF_COOKIE, token.clone()));
    token
}

pub fn is_token_valid(cookies: &CookieJar<'_>, submitted_token: Option<&str>) -> bool {
    match (cookies.get_private(CSRF_COOKIE), submitted_token) {
        (Some(cookie), Some(submitted_token)) => {
            !submitted_token.is_empty() && cookie.value() == submitted_token
        }
        _ => false,
    }
}

fn generate_token() -> String {
    let bytes: [u8; TOKEN_LENGTH] = rand::random();
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parameterized::{ide, parameterized};
    use rocket::http::Cookie;
    use rocket::local::asynchronous::Client;

    ide!();

    async fn client() -> Client {
        Client::untracked(rocket::build()).await.unwrap()
    }

    #[async_test]
    async fn should_issue_new_token() {
        let client = client().await;
        let request = client.get("/");
        let cookie_jar = request.guard::<&CookieJar<'_>>().await.unwrap();

        let token = issue_token(cookie_jar);

        assert_eq!(TOKEN_LENGTH * 2, token.len());
        let cookie = cookie_jar.get_pending(CSRF_COOKIE).unwrap();
        assert_eq!(token, cookie.value());
    }

    #[async_test]
    async fn should_keep_existing_token() {
        let client = client().await;
        let request = client
            .get("/")
            .private_cookie(Cookie::new(CSRF_COOKIE, "existing-token"));
        let cookie_jar = request.guard::<&CookieJar<'_>>().await.unwrap();

        assert_eq!("existing-token", issue_token(cookie_jar));
    }

    #[parameterized(
        submitted_token = {Some("existing-token"), Some("another-token"), Some(""), None},
        expected_result = {true, false, false, false}
    )]
    fn should_check_submitted_token(submitted_token: Option<&str>, expected_result: bool) {
        rocket::execute(async {
            let client = client().await;
            let request = client
                .get("/")
                .private_cookie(Cookie::new(CSRF_COOKIE, "existing-token"));
            let cookie_jar = request.guard::<&CookieJar<'_>>().await.unwrap();

            assert_eq!(expected_result, is_token_valid(cookie_jar, submitted_token));
        })
    }

    #[async_test]
    async fn should_refuse_token_without_cookie() {
        let client = client().await;
        let request = client.get("/");
        let cookie_jar = request.guard::<&CookieJar<'_>>().await.unwrap();

        assert!(!is_token_valid(cookie_jar, Some("existing-token")));
    }

    #[test]
    fn should_generate_different_tokens() {
        assert_ne!(generate_token(), generate_token());
    }
}
