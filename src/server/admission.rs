//! # Admisión de Requests
//! src/server/admission.rs
//!
//! Valida un request recibido y lo convierte en exactamente una de dos
//! cosas: una cabecera 200 más una tarea de transferencia encolable, o una
//! cabecera de error tras la cual la conexión se cierra. Cada fallo es
//! terminal: no hay reintentos a nivel parser.
//!
//! El orden de validación es estricto y cada paso tiene su status code:
//!
//! 1. Request line con método, path y versión → 400
//! 2. Método exactamente GET → 400
//! 3. Confinamiento a la raíz por profundidad de traversal → 403
//! 4. Versión exactamente HTTP/1.0 o HTTP/1.1 → 399
//! 5. Header Host presente (contenido sin validar) → 398
//! 6. stat del archivo resuelto → 404
//! 7. Bit de lectura para "otros" → 403
//! 8. open de prueba (guarda la carrera stat/open) → 380

use crate::http::response::content_type_for;
use crate::http::{HttpVersion, Request, Response, StatusCode};
use crate::transfer::TransferTask;
use std::fs::{self, File};
use std::net::TcpStream;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::SystemTime;

/// Resultado exitoso de la admisión: cabecera 200 y tarea con cero enviados
#[derive(Debug)]
pub struct Admitted {
    pub response: Response,
    pub task: TransferTask,
}

/// Rechazo terminal: status code y versión para la status line del error
///
/// `version` es el token de versión del request cuando era reconocible; sin
/// él la status line del error usa "N/A".
#[derive(Debug)]
pub struct Rejection {
    pub status: StatusCode,
    pub version: Option<HttpVersion>,
    pub detail: String,
}

impl Rejection {
    fn new(status: StatusCode, version: Option<HttpVersion>, detail: String) -> Self {
        Self {
            status,
            version,
            detail,
        }
    }

    /// Construye la cabecera de error correspondiente
    pub fn to_response(&self, keep_alive_secs: u64) -> Response {
        Response::error_head(self.version, self.status, keep_alive_secs)
    }
}

/// Profundidad de traversal de un target de request
///
/// Cuenta niveles de directorio: cada separador suma uno y cada punto que
/// sigue a un separador resta uno ('..' tras '/' resta dos). Apenas la
/// cuenta se hace negativa se retorna: ningún prefijo del path puede salir
/// de la raíz.
pub(crate) fn traversal_depth(target: &str) -> i32 {
    let mut depth = 0;
    let mut follows_slash = false;

    for c in target.chars() {
        match c {
            '/' => {
                depth += 1;
                follows_slash = true;
            }
            '.' if follows_slash => {
                depth -= 1;
            }
            _ => {
                follows_slash = false;
            }
        }

        if depth < 0 {
            return depth;
        }
    }

    depth
}

/// Valida un request y produce la tarea de transferencia, o el rechazo
///
/// `stream` es un clon del socket del cliente; en caso de éxito queda en
/// manos de la tarea, y en caso de rechazo simplemente se suelta.
pub fn admit(
    raw: &[u8],
    conn_id: u64,
    stream: TcpStream,
    document_root: &Path,
    keep_alive_secs: u64,
) -> Result<Admitted, Rejection> {
    // 1. Los tres tokens de la request line
    let request = Request::parse(raw)
        .map_err(|e| Rejection::new(StatusCode::BadRequest, None, e.to_string()))?;

    // El token de versión, si es reconocible, sirve para la status line de
    // cualquier error posterior aunque su validación formal venga después
    let version_hint = request.version();

    // 2. Sólo GET
    if request.method() != "GET" {
        return Err(Rejection::new(
            StatusCode::BadRequest,
            version_hint,
            format!("método no soportado: {}", request.method()),
        ));
    }

    // 3. Confinamiento a la raíz, antes de tocar el filesystem
    let target = request.target();
    if traversal_depth(target) < 0 {
        return Err(Rejection::new(
            StatusCode::Forbidden,
            version_hint,
            format!("ruta fuera de la raíz de documentos: {}", target),
        ));
    }

    // "/" se traduce al documento por defecto; se tolera la ausencia de "/"
    // inicial
    let mut target = if target == "/" {
        "/index.html".to_string()
    } else {
        target.to_string()
    };
    if !target.starts_with('/') {
        target.insert(0, '/');
    }
    let resolved = document_root.join(&target[1..]);

    // 4. Versión exacta
    let version = version_hint.ok_or_else(|| {
        Rejection::new(
            StatusCode::VersionUnsupported,
            None,
            format!("versión desconocida: {}", request.version_token()),
        )
    })?;

    // 5. Host presente (el contenido no se valida)
    if request.header("Host").is_none() {
        return Err(Rejection::new(
            StatusCode::HostMissing,
            Some(version),
            "falta el header Host".to_string(),
        ));
    }

    // 6. El archivo debe existir
    let metadata = fs::metadata(&resolved).map_err(|_| {
        Rejection::new(
            StatusCode::NotFound,
            Some(version),
            format!("no existe: {}", resolved.display()),
        )
    })?;
    if !metadata.is_file() {
        return Err(Rejection::new(
            StatusCode::NotFound,
            Some(version),
            format!("no es un archivo regular: {}", resolved.display()),
        ));
    }

    // 7. Lectura para "otros" (o-read)
    if metadata.permissions().mode() & 0o004 == 0 {
        return Err(Rejection::new(
            StatusCode::Forbidden,
            Some(version),
            format!("sin permiso de lectura para otros: {}", resolved.display()),
        ));
    }

    // 8. Open de prueba: el archivo pudo desaparecer entre el stat y acá
    File::open(&resolved).map_err(|e| {
        Rejection::new(
            StatusCode::OpenRace,
            Some(version),
            format!("no se pudo abrir {}: {}", resolved.display(), e),
        )
    })?;

    let last_modified = metadata.accessed().unwrap_or_else(|_| SystemTime::now());
    let response = Response::file_head(
        version,
        content_type_for(&resolved),
        metadata.len(),
        last_modified,
        keep_alive_secs,
    );
    let task = TransferTask::new(conn_id, stream, version, metadata.len(), resolved);

    Ok(Admitted { response, task })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::Permissions;
    use std::net::{TcpListener, TcpStream};
    use std::path::PathBuf;

    fn loopback_stream() -> TcpStream {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).expect("connect");
        let _ = listener.accept().expect("accept");
        client
    }

    fn temp_root(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "file_server_admission_{}_{}",
            tag,
            std::process::id()
        ));
        fs::create_dir_all(&root).expect("create temp root");
        root
    }

    fn write_world_readable(path: &Path, contents: &[u8]) {
        fs::write(path, contents).expect("write file");
        fs::set_permissions(path, Permissions::from_mode(0o644)).expect("chmod");
    }

    fn try_admit(raw: &[u8], root: &Path) -> Result<Admitted, Rejection> {
        admit(raw, 1, loopback_stream(), root, 30)
    }

    // ==================== Profundidad de Traversal ====================

    #[test]
    fn test_depth_simple_paths() {
        assert!(traversal_depth("/") >= 0);
        assert!(traversal_depth("/index.html") >= 0);
        assert!(traversal_depth("/a/b/c.html") >= 0);
    }

    #[test]
    fn test_depth_parent_escapes_are_negative() {
        assert!(traversal_depth("/../") < 0);
        assert!(traversal_depth("/..") < 0);
        assert!(traversal_depth("/../secret") < 0);
        assert!(traversal_depth("/a/../../b") < 0);
    }

    #[test]
    fn test_depth_parent_within_root_is_fine() {
        assert!(traversal_depth("/a/b/../c") >= 0);
        assert!(traversal_depth("/a/../b") >= 0);
    }

    // ==================== Orden de Validación ====================

    #[test]
    fn test_garbage_is_bad_request_without_version() {
        let rejection = try_admit(b"GARBAGE\r\n\r\n", Path::new("/tmp")).unwrap_err();
        assert_eq!(rejection.status, StatusCode::BadRequest);
        assert_eq!(rejection.version, None);
    }

    #[test]
    fn test_non_get_method_is_bad_request() {
        let rejection =
            try_admit(b"POST /x HTTP/1.1\r\nHost: x\r\n\r\n", Path::new("/tmp")).unwrap_err();
        assert_eq!(rejection.status, StatusCode::BadRequest);
        assert_eq!(rejection.version, Some(HttpVersion::V11));
    }

    #[test]
    fn test_traversal_rejected_before_touching_fs() {
        // La raíz no existe: si el stat ocurriera primero daría 404.
        // El 403 prueba que el rechazo pasa antes de tocar el filesystem.
        let rejection = try_admit(
            b"GET /../secret HTTP/1.1\r\nHost: x\r\n\r\n",
            Path::new("/raiz/inexistente"),
        )
        .unwrap_err();
        assert_eq!(rejection.status, StatusCode::Forbidden);
        assert_eq!(rejection.version, Some(HttpVersion::V11));
    }

    #[test]
    fn test_unknown_version_is_399() {
        let root = temp_root("version");
        write_world_readable(&root.join("index.html"), b"hola");

        let rejection =
            try_admit(b"GET /index.html HTTP/2.0\r\nHost: x\r\n\r\n", &root).unwrap_err();
        assert_eq!(rejection.status, StatusCode::VersionUnsupported);
        assert_eq!(rejection.version, None);
    }

    #[test]
    fn test_missing_host_is_398_even_with_valid_path() {
        let root = temp_root("host");
        write_world_readable(&root.join("index.html"), b"hola");

        let rejection = try_admit(b"GET /index.html HTTP/1.1\r\n\r\n", &root).unwrap_err();
        assert_eq!(rejection.status, StatusCode::HostMissing);
        assert_eq!(rejection.version, Some(HttpVersion::V11));
    }

    #[test]
    fn test_missing_file_is_404() {
        let root = temp_root("missing");

        let rejection =
            try_admit(b"GET /no_existe.html HTTP/1.0\r\nHost: x\r\n\r\n", &root).unwrap_err();
        assert_eq!(rejection.status, StatusCode::NotFound);
        assert_eq!(rejection.version, Some(HttpVersion::V10));
    }

    #[test]
    fn test_no_world_read_is_403() {
        let root = temp_root("perms");
        let path = root.join("privado.html");
        fs::write(&path, b"secreto").unwrap();
        fs::set_permissions(&path, Permissions::from_mode(0o640)).unwrap();

        let rejection =
            try_admit(b"GET /privado.html HTTP/1.1\r\nHost: x\r\n\r\n", &root).unwrap_err();
        assert_eq!(rejection.status, StatusCode::Forbidden);
    }

    // ==================== Admisión Exitosa ====================

    #[test]
    fn test_success_produces_task_with_zero_sent() {
        let root = temp_root("exito");
        write_world_readable(&root.join("index.html"), b"0123456789");

        let admitted =
            try_admit(b"GET /index.html HTTP/1.1\r\nHost: x\r\n\r\n", &root).unwrap();

        assert_eq!(admitted.response.status(), StatusCode::Ok);
        assert_eq!(admitted.task.sent_bytes(), 0);
        assert_eq!(admitted.task.total_bytes(), 10);
        assert_eq!(admitted.task.version(), HttpVersion::V11);
        assert_eq!(admitted.task.path(), root.join("index.html"));

        let head = String::from_utf8(admitted.response.to_bytes()).unwrap();
        assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(head.contains("Content-Length: 10\r\n"));
        assert!(head.contains("Content-Type: text/html\r\n"));
    }

    #[test]
    fn test_root_slash_maps_to_index_html() {
        let root = temp_root("slash");
        write_world_readable(&root.join("index.html"), b"portada");

        let admitted = try_admit(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n", &root).unwrap();
        assert_eq!(admitted.task.path(), root.join("index.html"));
        assert_eq!(admitted.task.total_bytes(), 7);
    }

    #[test]
    fn test_missing_leading_slash_is_tolerated() {
        let root = temp_root("sin_barra");
        write_world_readable(&root.join("notas.txt"), b"abc");

        let admitted = try_admit(b"GET notas.txt HTTP/1.0\r\nHost: x\r\n\r\n", &root).unwrap();
        assert_eq!(admitted.task.path(), root.join("notas.txt"));
    }

    #[test]
    fn test_host_header_case_insensitive() {
        let root = temp_root("host_case");
        write_world_readable(&root.join("index.html"), b"x");

        let result = try_admit(b"GET /index.html HTTP/1.1\r\nhost: x\r\n\r\n", &root);
        assert!(result.is_ok());
    }
}
