use godot::prelude::*;
use std::sync::Once;

mod session_bridge;
pub use session_bridge::GridironSession;

struct GridironRustExtension;

#[gdextension]
unsafe impl ExtensionLibrary for GridironRustExtension {}

static PANIC_HOOK: Once = Once::new();

/// Route Rust panics to the Godot console instead of stderr.
pub(crate) fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(s) = info.payload().downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = info.payload().downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            let loc = if let Some(l) = info.location() {
                format!("{}:{}:{}", l.file(), l.line(), l.column())
            } else {
                "unknown".to_string()
            };
            godot_error!("Rust panic at {}: {}", loc, msg);
        }));
    });
}
