//! # Módulo HTTP
//!
//! Este módulo implementa la porción de HTTP/1.0 y HTTP/1.1 que el servidor
//! necesita, desde cero y sin librerías de alto nivel. Incluye:
//!
//! - Parsing del bloque de cabeceras de un request (hasta la línea en blanco)
//! - Construcción de cabeceras de response con orden fijo
//! - Manejo de status codes, incluidos los códigos de extensión del servidor
//!
//! ## Formato de Request
//!
//! ```text
//! GET /index.html HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! \r\n
//! ```
//!
//! ## Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Date: Mon, 18 Jul 2016 16:06:00 GMT\r\n
//! Server: RedUnix/0.1\r\n
//! Last-Modified: Mon, 18 Jul 2016 02:36:04 GMT\r\n
//! Accept-Ranges: bytes\r\n
//! Content-Length: 500\r\n
//! Content-Type: text/html\r\n
//! \r\n
//! <bytes crudos del archivo>
//! ```
//!
//! Sólo se soporta GET; el cuerpo de la respuesta lo envían los workers en
//! chunks, nunca este módulo.

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{HttpVersion, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
