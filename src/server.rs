use crate::callback::{CallbackHandler, CallbackQuery, Login};
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

const CONFIRMATION: &str = "token received\ncharacter info received";

struct Response {
    status: u16,
    body: String,
}

impl Response {
    fn new(status: u16, body: impl Into<String>) -> Self {
        Response {
            status,
            body: body.into(),
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "Internal Server Error",
    }
}

/// Reads the request line and skips the headers, returning the request target.
fn read_request_target(stream: &TcpStream) -> Option<String> {
    let mut buf = BufReader::new(stream);

    let mut request_line = String::new();
    buf.read_line(&mut request_line).ok()?;

    let mut header = String::new();
    loop {
        header.clear();
        match buf.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) if header.trim_end().is_empty() => break,
            Ok(_) => {}
        }
    }

    let mut parts = request_line.split_whitespace();
    let _method = parts.next()?;
    parts.next().map(str::to_string)
}

fn respond(
    stream: &TcpStream,
    callback_path: &str,
    handler: &CallbackHandler,
    on_login: &(dyn Fn(&Login) + Send + Sync),
) -> Response {
    let query = match read_request_target(stream).and_then(|t| CallbackQuery::from_target(&t)) {
        Some(query) => query,
        None => return Response::new(400, "malformed request"),
    };
    if query.path != callback_path {
        return Response::new(404, "not found");
    }

    match handler.handle(&query) {
        Ok(login) => {
            on_login(&login);
            Response::new(200, CONFIRMATION)
        }
        Err(e) => {
            let status = e.status_code();
            if status >= 500 {
                tracing::error!(error = %e, "callback failed");
            } else {
                tracing::warn!(error = %e, "rejected callback");
            }
            Response::new(status, e.to_string())
        }
    }
}

fn write_response(mut stream: &TcpStream, response: &Response) -> std::io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason(response.status),
        response.body.len(),
        response.body
    )?;
    stream.flush()
}

/// Serves the callback route on `listener` from a background thread, one thread per connection.
///
/// Every successful login is passed to `on_login`; failures are answered with an error status
/// and leave the listener running.
pub fn start_callback_server(
    listener: TcpListener,
    callback_path: String,
    handler: CallbackHandler,
    on_login: impl Fn(&Login) + Send + Sync + 'static,
) {
    let handler = Arc::new(handler);
    let on_login: Arc<dyn Fn(&Login) + Send + Sync> = Arc::new(on_login);
    let callback_path = Arc::new(callback_path);

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let handler = Arc::clone(&handler);
                    let on_login = Arc::clone(&on_login);
                    let callback_path = Arc::clone(&callback_path);
                    std::thread::spawn(move || {
                        let response = respond(&stream, &callback_path, &handler, &*on_login);
                        if let Err(e) = write_response(&stream, &response) {
                            tracing::warn!(error = %e, "failed to write callback response");
                        }
                    });
                }
                Err(e) => tracing::error!(error = %e, "failed to listen"),
            }
        }
    });
}
