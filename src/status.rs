//! Pure HTTP status classification helpers shared by the request strategies.

/// Status code that tells a retrying strategy to stop hammering the server.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Returns `true` if the status code is in the successful range (2xx).
pub fn is_successful(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Returns `true` if the status code signals rate limiting (429).
pub fn is_too_many_requests(status: u16) -> bool {
    status == TOO_MANY_REQUESTS
}
