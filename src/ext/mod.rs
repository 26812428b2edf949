mod async_conversion;
mod system_time_ext;

pub use async_conversion::AsyncTryFrom;
pub use system_time_ext::SystemTimeExt;
