/// Async counterpart to the standard library's `TryFrom<T>` trait.
///
/// Used where building a value requires I/O, e.g. hashing the content behind
/// a deferred [`ContentHandle`](crate::items::ContentHandle).
///
/// # Examples
///
/// ```rust
/// use logdrop::ext::AsyncTryFrom;
/// use logdrop::selection::{ContentDigest, ExpandedFile};
///
/// async fn digest(file: &ExpandedFile) -> Option<ContentDigest> {
///     ContentDigest::async_try_from(file).await.ok()
/// }
/// ```
pub trait AsyncTryFrom<T>: Sized {
    /// The error type that can occur during conversion.
    type Error;

    /// Performs the fallible asynchronous conversion from `T` to `Self`.
    async fn async_try_from(value: T) -> Result<Self, Self::Error>;
}
