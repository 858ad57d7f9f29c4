use thiserror::Error;

/// Failures of the graphics/windowing substrate.
///
/// Anything raised before the event loop starts is fatal; the binary reports it and
/// exits with status 1.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("Failed to initialise event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Failed to create display: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("Failed to create frame buffer: {0}")]
    FrameBuffer(#[from] pixels::Error),

    #[error("Failed to create font: {0}")]
    Font(String),

    #[error("Failed to resize frame buffer: {0}")]
    Resize(#[from] pixels::TextureError),

    #[error("Failed to present frame: {0}")]
    Present(String),
}
