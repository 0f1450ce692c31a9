use thiserror::Error;

#[derive(Debug, Error)]
pub enum EffectError {
    #[error("no compatible GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("{frame} holds {actual} pixels, expected {expected}")]
    FrameSize {
        frame: String,
        expected: usize,
        actual: usize,
    },

    #[error("device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("buffer mapping failed: {0}")]
    Map(#[from] wgpu::BufferAsyncError),

    #[error("buffer mapping was dropped before completing")]
    MapCancelled,
}
