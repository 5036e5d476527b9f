//! # Apagado Cooperativo por Señales
//! src/server/signal.rs
//!
//! SIGINT y SIGTERM no cancelan threads: sólo levantan un flag atómico que
//! el poller consulta en cada tick. El apagado real es cooperativo: dejar
//! de aceptar, cerrar la cola, drenar y joinear el pool.

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_interrupt(_signo: libc::c_int) {
    // Async-signal-safe: sólo un store atómico
    SHUTDOWN.store(true, Ordering::SeqCst);
}

/// Instala los manejadores de SIGINT y SIGTERM
pub fn install() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(handle_interrupt),
        SaFlags::empty(),
        SigSet::empty(),
    );

    unsafe {
        sigaction(Signal::SIGINT, &action)?;
        sigaction(Signal::SIGTERM, &action)?;
    }

    Ok(())
}

/// Indica si una señal pidió el apagado
pub fn requested() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_succeeds() {
        assert!(install().is_ok());
    }
}
