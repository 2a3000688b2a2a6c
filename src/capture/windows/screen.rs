//! Windows screen capture using GDI BitBlt
//!
//! Each call copies the monitor rectangle out of the desktop DC into a top-down 32-bit
//! DIB and converts it to an RGBA frame.

use crate::capture::traits::{CaptureError, DisplayInfo, ScreenSource};
use crate::frame::{Frame, BYTES_PER_PIXEL};
use std::mem::zeroed;

use windows::{
    Win32::Foundation::{BOOL, LPARAM, RECT},
    Win32::Graphics::Gdi::{
        BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject,
        EnumDisplayMonitors, GetDC, GetDIBits, GetMonitorInfoW, ReleaseDC, SelectObject,
        BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HDC, HMONITOR, MONITORINFOEXW,
        SRCCOPY,
    },
    Win32::UI::WindowsAndMessaging::GetDesktopWindow,
};

/// Monitor geometry as reported by GDI, in virtual-screen coordinates
struct MonitorRect {
    info: DisplayInfo,
    left: i32,
    top: i32,
}

fn enumerate_monitors() -> Vec<MonitorRect> {
    let mut monitors: Vec<MonitorRect> = Vec::new();
    let monitors_ptr = &mut monitors as *mut Vec<MonitorRect>;

    unsafe extern "system" fn enum_monitors_callback(
        hmonitor: HMONITOR,
        _hdc: HDC,
        _rect: *mut RECT,
        lparam: LPARAM,
    ) -> BOOL {
        let monitors = &mut *(lparam.0 as *mut Vec<MonitorRect>);

        let mut monitor_info: MONITORINFOEXW = unsafe { zeroed() };
        monitor_info.monitorInfo.cbSize = std::mem::size_of::<MONITORINFOEXW>() as u32;

        if unsafe { GetMonitorInfoW(hmonitor, &mut monitor_info.monitorInfo) }.as_bool() {
            let rect = monitor_info.monitorInfo.rcMonitor;
            let is_primary = (monitor_info.monitorInfo.dwFlags & 1) != 0; // MONITORINFOF_PRIMARY

            let name_len = monitor_info
                .szDevice
                .iter()
                .position(|&c| c == 0)
                .unwrap_or(monitor_info.szDevice.len());
            let name = String::from_utf16_lossy(&monitor_info.szDevice[..name_len]);

            monitors.push(MonitorRect {
                info: DisplayInfo {
                    id: monitors.len() as u32,
                    name: if is_primary {
                        "Primary Display".to_string()
                    } else {
                        name
                    },
                    width: (rect.right - rect.left) as u32,
                    height: (rect.bottom - rect.top) as u32,
                    scale_factor: 1.0, // TODO: query per-monitor DPI via GetDpiForMonitor
                    is_primary,
                },
                left: rect.left,
                top: rect.top,
            });
        }

        BOOL::from(true)
    }

    unsafe {
        let _ = EnumDisplayMonitors(
            HDC::default(),
            None,
            Some(enum_monitors_callback),
            LPARAM(monitors_ptr as isize),
        );
    }

    monitors
}

/// Get list of available displays on Windows
pub fn get_displays() -> Vec<DisplayInfo> {
    enumerate_monitors().into_iter().map(|m| m.info).collect()
}

/// Copy one monitor's pixels out of the desktop DC as top-down BGRA
fn capture_monitor(monitor: &MonitorRect) -> Result<Vec<u8>, CaptureError> {
    let width = monitor.info.width;
    let height = monitor.info.height;

    unsafe {
        let hwnd = GetDesktopWindow();
        let hdc_screen = GetDC(hwnd);
        if hdc_screen.is_invalid() {
            return Err(CaptureError::Platform("GetDC failed for the desktop window".to_string()));
        }

        let hdc_mem = CreateCompatibleDC(hdc_screen);
        if hdc_mem.is_invalid() {
            ReleaseDC(hwnd, hdc_screen);
            return Err(CaptureError::Platform("CreateCompatibleDC failed".to_string()));
        }

        let hbitmap = CreateCompatibleBitmap(hdc_screen, width as i32, height as i32);
        if hbitmap.is_invalid() {
            DeleteDC(hdc_mem);
            ReleaseDC(hwnd, hdc_screen);
            return Err(CaptureError::Platform("CreateCompatibleBitmap failed".to_string()));
        }

        let old_bitmap = SelectObject(hdc_mem, hbitmap);

        let copied = BitBlt(
            hdc_mem,
            0,
            0,
            width as i32,
            height as i32,
            hdc_screen,
            monitor.left,
            monitor.top,
            SRCCOPY,
        );

        let mut buffer = vec![0u8; width as usize * height as usize * BYTES_PER_PIXEL];
        let mut lines = 0;

        if copied.as_bool() {
            let mut bmi: BITMAPINFO = zeroed();
            bmi.bmiHeader.biSize = std::mem::size_of::<BITMAPINFOHEADER>() as u32;
            bmi.bmiHeader.biWidth = width as i32;
            bmi.bmiHeader.biHeight = -(height as i32); // Negative for top-down
            bmi.bmiHeader.biPlanes = 1;
            bmi.bmiHeader.biBitCount = 32; // BGRA
            bmi.bmiHeader.biCompression = BI_RGB.0;

            lines = GetDIBits(
                hdc_mem,
                hbitmap,
                0,
                height,
                Some(buffer.as_mut_ptr() as *mut _),
                &mut bmi,
                DIB_RGB_COLORS,
            );
        }

        SelectObject(hdc_mem, old_bitmap);
        DeleteObject(hbitmap);
        DeleteDC(hdc_mem);
        ReleaseDC(hwnd, hdc_screen);

        if !copied.as_bool() {
            return Err(CaptureError::Platform("BitBlt failed".to_string()));
        }
        if lines == 0 {
            return Err(CaptureError::Platform("GetDIBits returned no scan lines".to_string()));
        }

        Ok(buffer)
    }
}

/// Captures a whole monitor through GDI
#[derive(Debug, Clone)]
pub struct DisplayScreenSource {
    /// Monitor index from [`get_displays`], `None` for the primary monitor
    display_id: Option<u32>,
}

impl DisplayScreenSource {
    pub fn new(display_id: Option<u32>) -> Self {
        Self { display_id }
    }
}

impl ScreenSource for DisplayScreenSource {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let monitors = enumerate_monitors();
        let monitor = match self.display_id {
            Some(id) => monitors
                .iter()
                .find(|m| m.info.id == id)
                .ok_or(CaptureError::DisplayNotFound(id))?,
            None => monitors
                .iter()
                .find(|m| m.info.is_primary)
                .or_else(|| monitors.first())
                .ok_or(CaptureError::DisplayNotFound(0))?,
        };

        let data = capture_monitor(monitor)?;
        let stride = monitor.info.width as usize * BYTES_PER_PIXEL;
        Ok(Frame::from_bgra(monitor.info.width, monitor.info.height, stride, &data)?)
    }
}
