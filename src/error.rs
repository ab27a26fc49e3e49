use thiserror::Error;

/// Failures raised by the state/action stack machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error("no state registered under `{0}`")]
    UnknownState(String),
    #[error("state stack is empty")]
    Empty,
    #[error("`{0}` flag raised without a target state")]
    MissingTarget(&'static str),
    #[error("state `{0}` is already on the stack")]
    AlreadyOnStack(String),
    #[error("cannot pop {requested} state(s) from a stack of depth {depth}")]
    InvalidTransition { requested: usize, depth: usize },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stats store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stats store is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("user `{0}` already exists")]
    UserExists(String),
    #[error("username or password failed validation")]
    InvalidCredentials,
    #[error("no user with id {0}")]
    UnknownUser(u32),
    #[error("no user named `{0}`")]
    UnknownUsername(String),
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset i/o failed for {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("could not decode image {path}: {source}")]
    Image { path: String, source: image::ImageError },
    #[error("bad sheet metadata in {path}: {source}")]
    Metadata { path: String, source: serde_json::Error },
    #[error("frame {index} of `{animation}` lies outside sheet `{sheet}`")]
    FrameOutOfBounds { sheet: String, animation: String, index: usize },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not create window surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("could not create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported texture format")]
    NoSurfaceFormat,
}
