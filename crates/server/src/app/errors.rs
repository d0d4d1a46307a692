use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use donation_core::LedgerError;

use crate::protocol;

/// Seconds before the error page sends the browser back home.
pub const REDIRECT_SECONDS: u32 = 5;

/// HTML error page with a meta refresh and a script fallback back to `/`.
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let millis = REDIRECT_SECONDS * 1000;
    let body = format!(
        r#"<html>
	<head>
		<title>Error</title>
		<meta http-equiv="refresh" content="{REDIRECT_SECONDS};url=/" />
	</head>
	<body>
		<h2>{message}</h2>
		<p>You will be redirected to the home page in {REDIRECT_SECONDS} seconds...</p>
		<script>
			setTimeout(function() {{
				window.location.href = "/";
			}}, {millis});
		</script>
	</body>
</html>
"#
    );
    (status, Html(body)).into_response()
}

pub fn ledger_error_page(err: &LedgerError) -> Response {
    error_page(ledger_error_status(err), protocol::ledger_error_message(err))
}

pub fn ledger_error_status(err: &LedgerError) -> StatusCode {
    if err.is_malformed_input() {
        StatusCode::BAD_REQUEST
    } else if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::CONFLICT
    }
}
