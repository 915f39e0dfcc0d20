//! HTTP status codes used by the service.
//!
//! ```rust
//! use agenda::{Response, Status};
//!
//! Response::status(Status::NoContent);
//! assert_eq!(u16::from(Status::UnprocessableContent), 422);
//! ```

/// The status codes handlers and the server answer with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx ───────────────────────────────────────────────────────────────────
    Ok,                   // 200
    Created,              // 201
    NoContent,            // 204

    // ── 3xx ───────────────────────────────────────────────────────────────────
    SeeOther,             // 303

    // ── 4xx ───────────────────────────────────────────────────────────────────
    BadRequest,           // 400
    NotFound,             // 404
    MethodNotAllowed,     // 405
    UnprocessableContent, // 422

    // ── 5xx ───────────────────────────────────────────────────────────────────
    InternalServerError,  // 500
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Self::Ok                   => 200,
            Self::Created              => 201,
            Self::NoContent            => 204,
            Self::SeeOther             => 303,
            Self::BadRequest           => 400,
            Self::NotFound             => 404,
            Self::MethodNotAllowed     => 405,
            Self::UnprocessableContent => 422,
            Self::InternalServerError  => 500,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Self::Ok                   => "OK",
            Self::Created              => "Created",
            Self::NoContent            => "No Content",
            Self::SeeOther             => "See Other",
            Self::BadRequest           => "Bad Request",
            Self::NotFound             => "Not Found",
            Self::MethodNotAllowed     => "Method Not Allowed",
            Self::UnprocessableContent => "Unprocessable Content",
            Self::InternalServerError  => "Internal Server Error",
        }
    }

    pub fn is_success(self) -> bool {
        (200..300).contains(&self.code())
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.code()
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> http::StatusCode {
        // Every variant is a registered code.
        http::StatusCode::from_u16(s.code()).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}
