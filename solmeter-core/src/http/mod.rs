//! Minimal HTTP responder logic
//!
//! Clients either fetch the dashboard page or poll `/data` for the latest
//! snapshot as JSON. Every response closes the connection.
//!
//! Request handling is deliberately shallow: the route is chosen by looking
//! for `GET /data` anywhere in the first request buffer.

use core::fmt::Write;

use heapless::String;

use crate::reading::Snapshot;

/// Dashboard page; polls `/data` once a second
pub const INDEX_HTML: &str = include_str!("index.html");

/// Largest request read from a client
pub const MAX_REQUEST_SIZE: usize = 1024;

/// Capacity of a rendered response head
pub const HEAD_CAPACITY: usize = 192;

/// Capacity of a rendered JSON snapshot
pub const JSON_CAPACITY: usize = 256;

const DATA_REQUEST: &[u8] = b"GET /data";

/// What a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    /// Latest snapshot as JSON
    Data,
    /// Dashboard page (any other request)
    Page,
}

impl Route {
    /// Pick the route for a raw request
    pub fn classify(request: &[u8]) -> Self {
        if request
            .windows(DATA_REQUEST.len())
            .any(|window| window == DATA_REQUEST)
        {
            Route::Data
        } else {
            Route::Page
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Route::Data => "application/json",
            Route::Page => "text/html",
        }
    }

    /// Data is fetched by pages served from other origins too
    pub fn allows_any_origin(&self) -> bool {
        matches!(self, Route::Data)
    }
}

/// Status line and headers for a `200 OK` response
pub fn response_head(route: Route, content_length: usize) -> String<HEAD_CAPACITY> {
    let mut head = String::new();
    let _ = write!(
        head,
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\n",
        route.content_type()
    );
    if route.allows_any_origin() {
        let _ = head.push_str("Access-Control-Allow-Origin: *\r\n");
    }
    let _ = write!(
        head,
        "Connection: close\r\nContent-Length: {}\r\n\r\n",
        content_length
    );
    head
}

/// JSON body for `/data`
///
/// Before the first publish there is nothing to report and the body is `{}`.
pub fn render_snapshot_json(snapshot: Option<&Snapshot>) -> String<JSON_CAPACITY> {
    let mut body = String::new();
    let Some(snapshot) = snapshot else {
        let _ = body.push_str("{}");
        return body;
    };

    let _ = body.push('{');
    let fields = [
        ("current", snapshot.current_ma),
        ("irradiance", snapshot.irradiance),
        ("temperature", snapshot.temperature),
        ("humidity", snapshot.humidity),
    ];
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            let _ = body.push_str(", ");
        }
        let _ = write!(body, "\"{}\": ", name);
        write_number(&mut body, *value);
    }
    let _ = body.push('}');
    body
}

/// JSON has no NaN or infinity
fn write_number(out: &mut String<JSON_CAPACITY>, value: f32) {
    if value.is_finite() {
        let _ = write!(out, "{}", value);
    } else {
        let _ = out.push_str("null");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_data() {
        let request = b"GET /data HTTP/1.1\r\nHost: 192.168.4.1\r\n\r\n";
        assert_eq!(Route::classify(request), Route::Data);
    }

    #[test]
    fn test_classify_page() {
        assert_eq!(Route::classify(b"GET / HTTP/1.1\r\n\r\n"), Route::Page);
        assert_eq!(Route::classify(b"GET /favicon.ico HTTP/1.1\r\n\r\n"), Route::Page);
        assert_eq!(Route::classify(b"POST /data HTTP/1.1\r\n\r\n"), Route::Page);
        assert_eq!(Route::classify(b""), Route::Page);
    }

    #[test]
    fn test_snapshot_json_values_exact() {
        let snapshot = Snapshot {
            current_ma: 12.3,
            irradiance: 450.0,
            temperature: 25.0,
            humidity: 60.0,
        };
        let body = render_snapshot_json(Some(&snapshot));
        assert_eq!(
            body.as_str(),
            r#"{"current": 12.3, "irradiance": 450, "temperature": 25, "humidity": 60}"#
        );
    }

    #[test]
    fn test_empty_snapshot_json() {
        assert_eq!(render_snapshot_json(None).as_str(), "{}");
    }

    #[test]
    fn test_non_finite_is_null() {
        let snapshot = Snapshot {
            current_ma: f32::NAN,
            irradiance: f32::INFINITY,
            temperature: -3.5,
            humidity: 0.0,
        };
        let body = render_snapshot_json(Some(&snapshot));
        assert_eq!(
            body.as_str(),
            r#"{"current": null, "irradiance": null, "temperature": -3.5, "humidity": 0}"#
        );
    }

    #[test]
    fn test_extreme_values_fit() {
        let snapshot = Snapshot {
            current_ma: f32::MAX,
            irradiance: f32::MIN,
            temperature: f32::MAX,
            humidity: f32::MIN,
        };
        let body = render_snapshot_json(Some(&snapshot));
        assert!(body.ends_with('}'));
    }

    #[test]
    fn test_data_head() {
        let head = response_head(Route::Data, 42);
        assert_eq!(
            head.as_str(),
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/json\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Connection: close\r\n\
             Content-Length: 42\r\n\
             \r\n"
        );
    }

    #[test]
    fn test_page_head() {
        let head = response_head(Route::Page, INDEX_HTML.len());
        assert!(head.starts_with("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n"));
        assert!(!head.contains("Access-Control-Allow-Origin"));
        assert!(head.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_page_polls_data_endpoint() {
        assert!(INDEX_HTML.contains("fetch('/data')"));
        assert!(INDEX_HTML.contains("setInterval(updateValues, 1000)"));
        for id in ["current", "irradiance", "temperature", "humidity"] {
            assert!(INDEX_HTML.contains(&format!("id=\"{}\"", id)));
        }
    }
}
