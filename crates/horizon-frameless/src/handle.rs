//! Native identity of toolkit windows.

use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use winit::window::Window;

use horizon_frameless_core::WindowHandle;

/// The registry key for a winit window.
///
/// On Windows this is the `HWND`, so both strategies agree on identity.
/// Elsewhere the toolkit's window id is used.
pub fn window_handle_of(window: &Window) -> WindowHandle {
    match window.window_handle().map(|handle| handle.as_raw()) {
        Ok(RawWindowHandle::Win32(handle)) => WindowHandle::new(handle.hwnd.get() as usize),
        Ok(_) => WindowHandle::from(window.id()),
        Err(err) => {
            tracing::debug!(
                target: horizon_frameless_core::logging::targets::ROOT,
                %err,
                "window handle unavailable, using window id"
            );
            WindowHandle::from(window.id())
        }
    }
}
