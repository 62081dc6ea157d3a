//! Native message identifiers and style bits.
//!
//! Plain integer constants so the interceptor state machine can be driven
//! and tested on any platform. Values match the Win32 headers.

// Window messages
pub const WM_SIZE: u32 = 0x0005;
pub const WM_SETTEXT: u32 = 0x000C;
pub const WM_GETMINMAXINFO: u32 = 0x0024;
pub const WM_WINDOWPOSCHANGED: u32 = 0x0047;
pub const WM_SETICON: u32 = 0x0080;
pub const WM_NCDESTROY: u32 = 0x0082;
pub const WM_NCCALCSIZE: u32 = 0x0083;
pub const WM_NCHITTEST: u32 = 0x0084;
pub const WM_NCPAINT: u32 = 0x0085;
pub const WM_NCACTIVATE: u32 = 0x0086;
/// Undocumented: themed caption paint.
pub const WM_NCUAHDRAWCAPTION: u32 = 0x00AE;
/// Undocumented: themed frame paint.
pub const WM_NCUAHDRAWFRAME: u32 = 0x00AF;
pub const WM_DPICHANGED: u32 = 0x02E0;
pub const WM_THEMECHANGED: u32 = 0x031A;
pub const WM_DWMCOMPOSITIONCHANGED: u32 = 0x031E;

// Window styles
pub const WS_OVERLAPPEDWINDOW: u32 = 0x00CF_0000;
pub const WS_VISIBLE: u32 = 0x1000_0000;
pub const WS_CLIPCHILDREN: u32 = 0x0200_0000;
pub const WS_CLIPSIBLINGS: u32 = 0x0400_0000;
pub const WS_EX_APPWINDOW: u32 = 0x0004_0000;
pub const WS_EX_LAYERED: u32 = 0x0008_0000;

/// Style applied once to every managed window: a normal top-level window
/// whose frame is removed later through `WM_NCCALCSIZE`.
pub const FRAMELESS_STYLE: u32 = WS_OVERLAPPEDWINDOW | WS_CLIPCHILDREN | WS_CLIPSIBLINGS;

/// Extended style applied once to every managed window.
pub const FRAMELESS_EX_STYLE: u32 = WS_EX_APPWINDOW | WS_EX_LAYERED;

/// Magenta `COLORREF` (`0x00BBGGRR`) used as the layered-window colour key.
pub const COLOR_KEY: u32 = 0x00FF_00FF;

/// Low 16 bits of a message parameter.
pub fn loword(value: usize) -> u16 {
    (value & 0xFFFF) as u16
}

/// Bits 16..32 of a message parameter.
pub fn hiword(value: usize) -> u16 {
    ((value >> 16) & 0xFFFF) as u16
}

/// Signed x coordinate packed in an `lParam`.
pub fn get_x_lparam(lparam: isize) -> i32 {
    i32::from((lparam & 0xFFFF) as u16 as i16)
}

/// Signed y coordinate packed in an `lParam`.
pub fn get_y_lparam(lparam: isize) -> i32 {
    i32::from(((lparam >> 16) & 0xFFFF) as u16 as i16)
}

/// Pack screen coordinates into an `lParam`, as the OS does for `WM_NCHITTEST`.
pub fn make_point_lparam(x: i32, y: i32) -> isize {
    let low = (x as u16) as u32;
    let high = (y as u16) as u32;
    ((high << 16) | low) as i32 as isize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_lparam_signed() {
        let lparam = make_point_lparam(-8, 1032);
        assert_eq!(get_x_lparam(lparam), -8);
        assert_eq!(get_y_lparam(lparam), 1032);

        let lparam = make_point_lparam(2560, -1);
        assert_eq!(get_x_lparam(lparam), 2560);
        assert_eq!(get_y_lparam(lparam), -1);
    }

    #[test]
    fn test_words() {
        assert_eq!(loword(0x0090_0090), 144);
        assert_eq!(hiword(0x00C0_0090), 192);
    }

    #[test]
    fn test_style_values() {
        assert_eq!(FRAMELESS_STYLE, 0x06CF_0000);
        assert_eq!(FRAMELESS_EX_STYLE, 0x000C_0000);
    }
}
