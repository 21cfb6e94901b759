#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to create the virtual UHID device: {0}")]
    Create(#[source] std::io::Error),
    #[error("failed to write a HID report: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to destroy the virtual UHID device: {0}")]
    Destroy(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InputError>;
