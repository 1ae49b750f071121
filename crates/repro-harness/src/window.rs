use crate::config::HarnessConfig;
use eyre::Result;
use widestring::U16CString;
use windows::core::w;
use windows::core::PCWSTR;
use windows::Win32::Foundation::*;
use windows::Win32::System::LibraryLoader::*;
use windows::Win32::UI::WindowsAndMessaging::*;

const WINDOW_CLASS: PCWSTR = w!("ReproHarnessWindow");

/// State shared with the window procedure through `GWLP_USERDATA`.
struct WindowState {
    client_size: (u32, u32),
    min_track_size: (i32, i32),
}

pub struct Window {
    hwnd: HWND,
    state: Box<WindowState>,
    // Backing storage for the title passed to CreateWindowExW.
    _title: U16CString,
}

impl Window {
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        let instance = unsafe { GetModuleHandleW(None)? };

        let class = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wndproc),
            hInstance: instance.into(),
            hCursor: unsafe { LoadCursorW(None, IDC_ARROW)? },
            lpszClassName: WINDOW_CLASS,
            ..Default::default()
        };
        let atom = unsafe { RegisterClassExW(&class) };
        debug_assert_ne!(atom, 0, "Failed to register window class");

        let (width, height) = config.window_size;
        let mut window_rect = RECT {
            left: 0,
            top: 0,
            right: width as i32,
            bottom: height as i32,
        };
        // Grow the rectangle so the *client* area matches the requested size.
        unsafe { AdjustWindowRect(&mut window_rect, WS_OVERLAPPEDWINDOW, false)? };

        let mut state = Box::new(WindowState {
            client_size: config.window_size,
            min_track_size: config.min_track_size,
        });

        let title = U16CString::from_str(&config.title)?;
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                WINDOW_CLASS,
                PCWSTR(title.as_ptr()),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                window_rect.right - window_rect.left,
                window_rect.bottom - window_rect.top,
                None,
                None,
                Some(instance.into()),
                Some(state.as_mut() as *mut WindowState as _),
            )
        }?;

        Ok(Self {
            hwnd,
            state,
            _title: title,
        })
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    pub fn client_size(&self) -> (u32, u32) {
        self.state.client_size
    }

    pub fn show(&self) {
        unsafe { _ = ShowWindow(self.hwnd, SW_SHOW) };
    }
}

/// Drains the thread's message queue. Returns `false` once `WM_QUIT` has
/// been observed, which is the loop's only exit condition.
pub fn pump_messages() -> bool {
    let mut message = MSG::default();
    while unsafe { PeekMessageW(&mut message, None, 0, 0, PM_REMOVE) }.as_bool() {
        unsafe {
            _ = TranslateMessage(&message);
            DispatchMessageW(&message);
        }
        if message.message == WM_QUIT {
            return false;
        }
    }
    true
}

extern "system" fn wndproc(window: HWND, message: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if message == WM_CREATE {
        let create_struct: &CREATESTRUCTW = unsafe { &*(lparam.0 as *const CREATESTRUCTW) };
        unsafe { SetWindowLongPtrW(window, GWLP_USERDATA, create_struct.lpCreateParams as _) };
        return LRESULT(0);
    }

    // Messages can arrive before WM_CREATE or after WM_DESTROY.
    let user_data = unsafe { GetWindowLongPtrW(window, GWLP_USERDATA) };
    let state = std::ptr::NonNull::<WindowState>::new(user_data as *mut WindowState);

    match (message, state) {
        (WM_DESTROY, _) => {
            unsafe { PostQuitMessage(0) };
            return LRESULT(0);
        }
        (WM_GETMINMAXINFO, Some(state)) => {
            let state = unsafe { state.as_ref() };
            let info = unsafe { &mut *(lparam.0 as *mut MINMAXINFO) };
            info.ptMinTrackSize.x = state.min_track_size.0;
            info.ptMinTrackSize.y = state.min_track_size.1;
        }
        (WM_SIZE, Some(mut state)) => {
            let mut rect = RECT::default();
            if unsafe { GetClientRect(window, &mut rect) }.is_ok() {
                let state = unsafe { state.as_mut() };
                state.client_size = (rect.right as u32, rect.bottom as u32);
            }
        }
        _ => {}
    }

    unsafe { DefWindowProcW(window, message, wparam, lparam) }
}
