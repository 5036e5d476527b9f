//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Este módulo implementa un parser mínimo del bloque de cabeceras de un
//! request HTTP, desde cero.
//!
//! El parser sólo exige lo que la admisión necesita: que la request line
//! tenga los tres tokens (método, path, versión) y que las cabeceras estén
//! disponibles por nombre. Toda otra validación (método GET, versión exacta,
//! presencia de Host) se hace en la capa de admisión, donde cada fallo tiene
//! su status code propio.
//!
//! ## Formato de un Request
//!
//! ```text
//! GET /index.html HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! User-Agent: curl/7.68.0\r\n
//! \r\n
//! ```

use std::collections::HashMap;

/// Versiones de protocolo que el servidor atiende
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVersion {
    /// HTTP/1.0 - la conexión se cierra al terminar la transferencia
    V10,

    /// HTTP/1.1 - keep-alive con presupuesto de inactividad adaptativo
    V11,
}

impl HttpVersion {
    /// Parsea el token de versión; cualquier otro valor es None
    ///
    /// La comparación es exacta: "http/1.1" o "HTTP/1.1 " no validan.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "HTTP/1.0" => Some(HttpVersion::V10),
            "HTTP/1.1" => Some(HttpVersion::V11),
            _ => None,
        }
    }

    /// Token de versión para la status line de la respuesta
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVersion::V10 => "HTTP/1.0",
            HttpVersion::V11 => "HTTP/1.1",
        }
    }

    /// Indica si la conexión puede quedar abierta tras la transferencia
    pub fn is_keep_alive(&self) -> bool {
        matches!(self, HttpVersion::V11)
    }
}

/// Representa el bloque de cabeceras de un request, ya parseado
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP tal como llegó (la admisión exige "GET")
    method: String,

    /// Target de la petición (ej: "/index.html")
    target: String,

    /// Token de versión crudo (ej: "HTTP/1.1")
    version_token: String,

    /// Headers HTTP (ej: {"Host": "localhost:8080"})
    headers: HashMap<String, String>,
}

/// Errores que pueden ocurrir durante el parsing
///
/// Todos se traducen a 400 en la admisión.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request vacío
    EmptyRequest,

    /// El request no es texto válido
    NotText,

    /// La request line no tiene método, path y versión
    MissingTokens,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::NotText => write!(f, "Request is not valid text"),
            ParseError::MissingTokens => {
                write!(f, "Request line must contain method, path and version")
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl Request {
    /// Parsea el bloque de cabeceras de un request desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use file_server::http::Request;
    ///
    /// let raw = b"GET /index.html HTTP/1.1\r\nHost: x\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), "GET");
    /// assert_eq!(request.target(), "/index.html");
    /// assert_eq!(request.header("Host"), Some("x"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let request_str = std::str::from_utf8(buffer).map_err(|_| ParseError::NotText)?;

        if request_str.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let mut lines = request_str.split("\r\n");

        // 1. Request line: exige los tres tokens
        let request_line = lines.next().ok_or(ParseError::MissingTokens)?;
        let mut parts = request_line.split_whitespace();
        let method = parts.next().ok_or(ParseError::MissingTokens)?.to_string();
        let target = parts.next().ok_or(ParseError::MissingTokens)?.to_string();
        let version_token = parts.next().ok_or(ParseError::MissingTokens)?.to_string();

        // 2. Headers hasta la línea en blanco; las líneas sin ':' se ignoran
        let mut headers = HashMap::new();
        for line in lines {
            if line.trim().is_empty() {
                break;
            }
            if let Some(colon_pos) = line.find(':') {
                let name = line[..colon_pos].trim().to_string();
                let value = line[colon_pos + 1..].trim().to_string();
                headers.insert(name, value);
            }
        }

        Ok(Request {
            method,
            target,
            version_token,
            headers,
        })
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método del request, sin validar
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Obtiene el target del request
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Obtiene el token de versión crudo
    pub fn version_token(&self) -> &str {
        &self.version_token
    }

    /// Obtiene la versión si el token es exactamente HTTP/1.0 o HTTP/1.1
    pub fn version(&self) -> Option<HttpVersion> {
        HttpVersion::from_token(&self.version_token)
    }

    /// Obtiene un header por nombre (insensible a mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}
